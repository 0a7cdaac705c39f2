use std::collections::BTreeMap;

use ratatui::layout::{Position, Rect};

use crate::region::Region;

/// What a zone is used for during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZoneKind {
    /// Where a drag may start: exactly the top card.
    PickUp,
    /// Where a drag may end: the pile's whole reachable area.
    Drop,
}

/// A rectangle on the table bound to a pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub kind: ZoneKind,
    pub region: Region,
    pub bounds: Rect,
}

/// Current zones, keyed by kind and region.
#[derive(Debug, Default, Clone)]
pub struct ZoneMap {
    zones: BTreeMap<(ZoneKind, Region), Rect>,
}

impl ZoneMap {
    /// Set or, with `None`, remove a zone.
    pub fn set(&mut self, kind: ZoneKind, region: Region, bounds: Option<Rect>) {
        match bounds {
            Some(bounds) if !bounds.is_empty() => {
                self.zones.insert((kind, region), bounds);
            }
            _ => {
                self.zones.remove(&(kind, region));
            }
        }
    }

    pub fn get(&self, kind: ZoneKind, region: Region) -> Option<Zone> {
        self.zones.get(&(kind, region)).map(|&bounds| Zone {
            kind,
            region,
            bounds,
        })
    }

    /// The zone of `kind` containing `position`.
    pub fn hit(&self, kind: ZoneKind, position: Position) -> Option<Zone> {
        self.iter()
            .filter(|zone| zone.kind == kind)
            .find(|zone| zone.bounds.contains(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = Zone> + '_ {
        self.zones
            .iter()
            .map(|(&(kind, region), &bounds)| Zone { kind, region, bounds })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }
}
