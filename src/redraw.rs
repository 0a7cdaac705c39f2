use std::collections::BTreeMap;

use ratatui::layout::{Position, Rect, Size};
use tracing::trace;

use crate::card_set::CardSet;
use crate::game::CardGame;
use crate::layout::TableLayout;
use crate::region::Region;

/// The table surface cards are drawn onto.
///
/// Implement this for:
/// - `TerminalSurface` – a ratatui buffer
/// - any recording or test surface
pub trait Surface {
    /// What a card face looks like to this surface.
    type Image;

    fn size(&self) -> Size;
    /// Paint `area` with the table background.
    fn clear(&mut self, area: Rect);
    fn draw_image(&mut self, image: &Self::Image, area: Rect);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PileState {
    dirty: bool,
    /// Draw the pile without its top card, which is being dragged.
    exclude_top: bool,
    /// What the pile covered when last drawn.
    drawn: Option<Rect>,
}

/// Which piles must be redrawn before the surface is current again.
#[derive(Debug, Default, Clone)]
pub struct DirtyTracker {
    piles: BTreeMap<Region, PileState>,
}

impl DirtyTracker {
    /// A tracker for `regions`, all dirty.
    pub fn new(regions: impl IntoIterator<Item = Region>) -> Self {
        let piles = regions
            .into_iter()
            .map(|region| {
                let state = PileState {
                    dirty: true,
                    ..PileState::default()
                };
                (region, state)
            })
            .collect();
        DirtyTracker { piles }
    }

    pub fn mark_all_dirty(&mut self) {
        for state in self.piles.values_mut() {
            state.dirty = true;
        }
    }

    pub fn mark_dirty(&mut self, region: Region) {
        self.piles.entry(region).or_default().dirty = true;
    }

    /// The top card has been lifted for a drag.
    pub fn mark_excluding_top(&mut self, region: Region) {
        let state = self.piles.entry(region).or_default();
        state.dirty = true;
        state.exclude_top = true;
    }

    /// The lifted card is back (or gone); draw the pile in full again.
    pub fn clear_exclusion(&mut self, region: Region) {
        let state = self.piles.entry(region).or_default();
        state.dirty = true;
        state.exclude_top = false;
    }

    /// The pile was just drawn.
    pub fn clear(&mut self, region: Region, drawn: Option<Rect>) {
        if let Some(state) = self.piles.get_mut(&region) {
            state.dirty = false;
            state.drawn = drawn;
        }
    }

    pub fn is_dirty(&self, region: Region) -> bool {
        self.piles.get(&region).is_some_and(|s| s.dirty)
    }

    pub fn excludes_top(&self, region: Region) -> bool {
        self.piles.get(&region).is_some_and(|s| s.exclude_top)
    }

    pub fn all_dirty(&self) -> bool {
        !self.piles.is_empty() && self.piles.values().all(|s| s.dirty)
    }

    pub fn any_dirty(&self) -> bool {
        self.piles.values().any(|s| s.dirty)
    }

    pub fn dirty_regions(&self) -> Vec<Region> {
        self.piles
            .iter()
            .filter(|(_, s)| s.dirty)
            .map(|(&region, _)| region)
            .collect()
    }

    fn last_drawn(&self, region: Region) -> Option<Rect> {
        self.piles.get(&region).and_then(|s| s.drawn)
    }
}

/// What a redraw pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RedrawReport {
    /// The whole surface was cleared first.
    pub full: bool,
    pub piles_drawn: usize,
}

/// Bring the surface up to date by drawing only dirty piles.
///
/// When every pile is dirty the whole surface is cleared once; otherwise each
/// dirty pile clears just what it covers now and what it covered last time.
pub fn redraw<S: Surface>(
    surface: &mut S,
    game: &dyn CardGame,
    layout: &TableLayout,
    cards: Option<&CardSet<S::Image>>,
    tracker: &mut DirtyTracker,
) -> RedrawReport {
    let mut report = RedrawReport::default();
    let Some(cards) = cards else {
        return report;
    };
    if !layout.is_ready() || !tracker.any_dirty() {
        return report;
    }

    if tracker.all_dirty() {
        surface.clear(Rect::from((Position::ORIGIN, surface.size())));
        report.full = true;
    }

    for region in tracker.dirty_regions() {
        let Some(pile) = game.pile(region) else {
            tracker.clear(region, None);
            continue;
        };
        let extent = layout.pile_extent(region, pile);
        if !report.full {
            let stale = match (extent, tracker.last_drawn(region)) {
                (Some(now), Some(before)) => Some(now.union(before)),
                (now, before) => now.or(before),
            };
            if let Some(area) = stale {
                surface.clear(area);
            }
        }

        let skip_top = usize::from(tracker.excludes_top(region) && !pile.is_empty());
        let rects = layout.card_rects(region, pile);
        for (card, area) in pile.iter().zip(rects).take(pile.len() - skip_top) {
            if area.is_empty() {
                continue;
            }
            if let Some(image) = cards.image(card.id()) {
                surface.draw_image(image, area);
            }
        }
        trace!(%region, cards = pile.len() - skip_top, "pile redrawn");
        tracker.clear(region, extent);
        report.piles_drawn += 1;
    }
    report
}
