//! Table geometry for the castle layout.
//!
//! The table is three card columns wide: four rows fanned out to the left,
//! four foundations stacked in the centre, four rows fanned out to the right.
//! Horizontally that is `2 | left lane | 3 | foundation | 3 | right lane | 2`
//! spaces; vertically four card heights separated by five spaces.

use std::collections::BTreeMap;

use ratatui::layout::{Rect, Size};
use tracing::debug;

use crate::game::CardGame;
use crate::pile::Pile;
use crate::region::{Region, RegionKind};
use crate::zone::{ZoneKind, ZoneMap};

/// Gap between piles on a table at least as large as the reference size.
pub const STANDARD_SPACE: u16 = 5;
/// Gaps never shrink below this.
pub const MIN_SPACE: u16 = 1;
/// A display work area no larger than this halves the spacing again.
pub const SMALL_WORK_AREA: Size = Size {
    width: 800,
    height: 600,
};
/// Horizontal spaces across the table.
pub const H_SPACES: u32 = 10;
/// Visible slivers across the table, sixteen per lane.
pub const SLIVERS: u32 = 32;
/// Full card widths across the table.
pub const CARD_COLUMNS: u32 = 3;
/// Vertical spaces down the table.
pub const V_SPACES: u32 = 5;
/// Card heights down the table.
pub const CARD_ROWS: u32 = 4;
/// Rows drawn on each side of the foundations.
pub const ROWS_PER_SIDE: usize = 4;
const OUTER_MARGIN: u32 = 2;
const INNER_GAP: u32 = 3;

/// Dimensions a card set reports, in table units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDimensions {
    pub width: u16,
    pub height: u16,
    pub min_width: u16,
    pub min_height: u16,
    /// How much of a fanned card must stay visible to identify it.
    pub min_visible: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spacing {
    pub horizontal: u16,
    pub vertical: u16,
}

impl Spacing {
    pub const STANDARD: Spacing = Spacing {
        horizontal: STANDARD_SPACE,
        vertical: STANDARD_SPACE,
    };
    pub const MIN: Spacing = Spacing {
        horizontal: MIN_SPACE,
        vertical: MIN_SPACE,
    };
}

fn saturate(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Table size needed for cards of `card` size at the given spacing.
pub fn client_size(card: Size, min_visible: u16, spacing: Spacing) -> Size {
    let width = CARD_COLUMNS * u32::from(card.width)
        + H_SPACES * u32::from(spacing.horizontal)
        + SLIVERS * u32::from(min_visible);
    let height = CARD_ROWS * u32::from(card.height) + V_SPACES * u32::from(spacing.vertical);
    Size::new(saturate(width), saturate(height))
}

/// Scale one gap with the table: the standard gap at the reference size or
/// larger, proportionally less below it, never under the minimum.
fn scaled_space(actual: u16, reference: u16) -> u16 {
    if reference == 0 {
        return STANDARD_SPACE;
    }
    let scaled = u32::from(STANDARD_SPACE) * u32::from(actual) / u32::from(reference);
    saturate(scaled).clamp(MIN_SPACE, STANDARD_SPACE)
}

impl CardDimensions {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    /// Table size that shows this card set at its natural size.
    pub fn client_size_for_card_set(&self) -> Size {
        client_size(self.size(), self.min_visible, Spacing::STANDARD)
    }

    /// Smallest usable table: minimum card size and minimum gaps.
    pub fn minimum_client_size_for_card_set(&self) -> Size {
        client_size(self.min_size(), self.min_visible, Spacing::MIN)
    }

    /// Table size that shows this card set scaled by `scale`.
    pub fn client_size_for_scaled_card_set(&self, scale: f64) -> Size {
        let scaled = |base: u16, min: u16| {
            let value = (f64::from(base) * scale).round();
            if value.is_finite() && value > 0.0 {
                (value.min(f64::from(u16::MAX)) as u16).max(min)
            } else {
                min
            }
        };
        let card = Size::new(
            scaled(self.width, self.min_width),
            scaled(self.height, self.min_height),
        );
        client_size(card, self.min_visible, Spacing::STANDARD)
    }

    /// Gaps to use on a table of `client` size.
    pub fn spacing_for(&self, client: Size, small_display: bool) -> Spacing {
        let reference = self.client_size_for_card_set();
        let mut spacing = Spacing {
            horizontal: scaled_space(client.width, reference.width),
            vertical: scaled_space(client.height, reference.height),
        };
        if small_display {
            spacing.horizontal = (spacing.horizontal / 2).max(MIN_SPACE);
            spacing.vertical = (spacing.vertical / 2).max(MIN_SPACE);
        }
        spacing
    }

    /// Largest card, in this set's proportions, that fits a table of `client`
    /// size with `spacing`. Never smaller than the set's minimum.
    pub fn card_size_for(&self, client: Size, spacing: Spacing) -> Size {
        let width_budget = u32::from(client.width).saturating_sub(
            H_SPACES * u32::from(spacing.horizontal) + SLIVERS * u32::from(self.min_visible),
        ) / CARD_COLUMNS;
        let height_budget = u32::from(client.height)
            .saturating_sub(V_SPACES * u32::from(spacing.vertical))
            / CARD_ROWS;

        let (base_w, base_h) = (u32::from(self.width.max(1)), u32::from(self.height.max(1)));
        let (width, height) = if width_budget * base_h <= height_budget * base_w {
            (width_budget, width_budget * base_h / base_w)
        } else {
            (height_budget * base_w / base_h, height_budget)
        };
        Size::new(
            saturate(width).max(self.min_width),
            saturate(height).max(self.min_height),
        )
    }

    /// Card size to use on a table of `client` size.
    pub fn card_set_size_for_client(&self, client: Size, small_display: bool) -> Size {
        self.card_size_for(client, self.spacing_for(client, small_display))
    }
}

/// Horizontal offset between consecutive cards of a fanned pile.
///
/// The largest offset that lets `count` cards fit in `lane_width`, but never
/// less than the visible sliver nor more than half a card. Piles of zero or
/// one card use half a card.
pub fn overlap_width(count: usize, lane_width: u16, card_width: u16, min_visible: u16) -> u16 {
    let half = card_width / 2;
    let sliver = min_visible.min(half);
    if count <= 1 {
        return half;
    }
    let gaps = u32::try_from(count - 1).unwrap_or(u32::MAX);
    let room = u32::from(lane_width.saturating_sub(card_width)) / gaps;
    saturate(room).clamp(sliver, half)
}

/// A rectangle whose left edge may lie off the table; the off-table part is
/// cut away.
fn clipped(x: i32, y: u16, width: u16, height: u16) -> Rect {
    let right = x + i32::from(width);
    let left = x.clamp(0, i32::from(u16::MAX));
    let width = (right - left).clamp(0, i32::from(u16::MAX));
    Rect::new(left as u16, y, width as u16, height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Cards fan leftwards, away from the foundations.
    Left,
    /// Cards fan rightwards.
    Right,
}

/// Where a pile sits on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Row { side: Side, slot: usize },
    Foundation { slot: usize },
}

impl Placement {
    pub fn of(region: Region) -> Option<Placement> {
        match region.kind {
            RegionKind::Row if region.index < ROWS_PER_SIDE => Some(Placement::Row {
                side: Side::Left,
                slot: region.index,
            }),
            RegionKind::Row if region.index < 2 * ROWS_PER_SIDE => Some(Placement::Row {
                side: Side::Right,
                slot: region.index - ROWS_PER_SIDE,
            }),
            RegionKind::Foundation if region.index < CARD_ROWS as usize => {
                Some(Placement::Foundation { slot: region.index })
            }
            _ => None,
        }
    }
}

/// Geometry derived from one surface size and card set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMetrics {
    pub surface: Size,
    pub spacing: Spacing,
    pub card: Size,
    pub min_visible: u16,
    pub lane_width: u16,
    pub left_lane_x: u16,
    pub foundation_x: u16,
    pub right_lane_x: u16,
}

impl TableMetrics {
    pub fn compute(surface: Size, dims: &CardDimensions, small_display: bool) -> Self {
        let spacing = dims.spacing_for(surface, small_display);
        let card = dims.card_size_for(surface, spacing);
        let hs = u32::from(spacing.horizontal);
        let cw = u32::from(card.width);

        let lane = (u32::from(surface.width).saturating_sub(H_SPACES * hs + cw) / 2).max(cw);
        let left_lane_x = OUTER_MARGIN * hs;
        let foundation_x = left_lane_x + lane + INNER_GAP * hs;
        let right_lane_x = foundation_x + cw + INNER_GAP * hs;

        TableMetrics {
            surface,
            spacing,
            card,
            min_visible: dims.min_visible,
            lane_width: saturate(lane),
            left_lane_x: saturate(left_lane_x),
            foundation_x: saturate(foundation_x),
            right_lane_x: saturate(right_lane_x),
        }
    }

    fn slot_y(&self, slot: usize) -> u16 {
        let vs = u32::from(self.spacing.vertical);
        let step = u32::from(self.card.height) + vs;
        saturate(vs + step * u32::try_from(slot).unwrap_or(u32::MAX))
    }

    /// The strip a row's cards are fanned across.
    pub fn lane(&self, side: Side, slot: usize) -> Rect {
        let x = match side {
            Side::Left => self.left_lane_x,
            Side::Right => self.right_lane_x,
        };
        Rect::new(x, self.slot_y(slot), self.lane_width, self.card.height)
    }

    pub fn foundation(&self, slot: usize) -> Rect {
        Rect::new(self.foundation_x, self.slot_y(slot), self.card.width, self.card.height)
    }

    /// Rectangle of the `k`th card (from the bottom) of a row.
    pub fn row_card(&self, side: Side, slot: usize, k: usize, overlap: u16) -> Rect {
        let offset = i32::try_from(k).unwrap_or(i32::MAX / 2).saturating_mul(i32::from(overlap));
        let lane = self.lane(side, slot);
        let x = match side {
            Side::Left => i32::from(lane.right()) - i32::from(self.card.width) - offset,
            Side::Right => i32::from(lane.x).saturating_add(offset),
        };
        clipped(x, lane.y, self.card.width, self.card.height)
    }
}

/// Computes and caches table geometry: card positions, fan overlaps and the
/// pick-up/drop zones of every pile.
///
/// Until both a card set and a surface size are known every operation is a
/// no-op.
#[derive(Debug, Default)]
pub struct TableLayout {
    dims: Option<CardDimensions>,
    surface: Option<Size>,
    small_display: bool,
    metrics: Option<TableMetrics>,
    overlaps: BTreeMap<Region, u16>,
    zones: ZoneMap,
}

impl TableLayout {
    pub fn new() -> Self {
        TableLayout::default()
    }

    pub fn card_dimensions(&self) -> Option<&CardDimensions> {
        self.dims.as_ref()
    }

    pub fn metrics(&self) -> Option<&TableMetrics> {
        self.metrics.as_ref()
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    pub fn is_ready(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn small_display(&self) -> bool {
        self.small_display
    }

    /// Record the display's usable work area; a small one halves the gaps.
    /// Returns whether the layout changed.
    pub fn set_work_area(&mut self, work_area: Size, game: &dyn CardGame) -> bool {
        let small = work_area.width <= SMALL_WORK_AREA.width && work_area.height <= SMALL_WORK_AREA.height;
        if small == self.small_display {
            return false;
        }
        self.small_display = small;
        self.recompute(game)
    }

    /// Returns whether the layout changed.
    pub fn set_card_set(&mut self, dims: CardDimensions, game: &dyn CardGame) -> bool {
        self.dims = Some(dims);
        self.recompute(game)
    }

    /// Returns whether the layout changed.
    pub fn resize(&mut self, surface: Size, game: &dyn CardGame) -> bool {
        if self.surface == Some(surface) {
            return false;
        }
        self.surface = Some(surface);
        self.recompute(game)
    }

    fn recompute(&mut self, game: &dyn CardGame) -> bool {
        let (Some(dims), Some(surface)) = (self.dims, self.surface) else {
            return false;
        };
        let metrics = TableMetrics::compute(surface, &dims, self.small_display);
        debug!(?surface, card = ?metrics.card, spacing = ?metrics.spacing, "layout recomputed");
        self.metrics = Some(metrics);
        self.refresh_all(game);
        true
    }

    /// Recompute overlap and zones of every pile.
    pub fn refresh_all(&mut self, game: &dyn CardGame) {
        if self.metrics.is_none() {
            return;
        }
        self.overlaps.clear();
        self.zones.clear();
        for region in game.regions() {
            self.refresh_pile(region, game);
        }
    }

    /// Recompute overlap and zones of one pile after its contents changed.
    pub fn refresh_pile(&mut self, region: Region, game: &dyn CardGame) {
        let Some(metrics) = self.metrics else {
            return;
        };
        let (Some(placement), Some(pile)) = (Placement::of(region), game.pile(region)) else {
            self.zones.set(ZoneKind::PickUp, region, None);
            self.zones.set(ZoneKind::Drop, region, None);
            return;
        };

        let (pick_up, drop) = match placement {
            Placement::Row { side, slot } => {
                let overlap = overlap_width(
                    pile.len(),
                    metrics.lane_width,
                    metrics.card.width,
                    metrics.min_visible,
                );
                self.overlaps.insert(region, overlap);
                let lane = metrics.lane(side, slot);
                let top = pile
                    .len()
                    .checked_sub(1)
                    .map(|k| metrics.row_card(side, slot, k, overlap));
                let drop = top.map_or(lane, |top| lane.union(top));
                (top, drop)
            }
            Placement::Foundation { slot } => {
                let bounds = metrics.foundation(slot);
                let top = (!pile.is_empty()).then_some(bounds);
                (top, grow(bounds, metrics.spacing))
            }
        };
        self.zones.set(ZoneKind::PickUp, region, pick_up);
        self.zones.set(ZoneKind::Drop, region, Some(drop));
    }

    /// Current fan offset of a row, if the layout is ready.
    pub fn overlap(&self, region: Region) -> Option<u16> {
        self.overlaps.get(&region).copied()
    }

    /// Where each card of the pile is drawn, bottom to top.
    pub fn card_rects(&self, region: Region, pile: &Pile) -> Vec<Rect> {
        let (Some(metrics), Some(placement)) = (self.metrics, Placement::of(region)) else {
            return Vec::new();
        };
        match placement {
            Placement::Row { side, slot } => {
                let overlap = self.overlap(region).unwrap_or_else(|| {
                    overlap_width(pile.len(), metrics.lane_width, metrics.card.width, metrics.min_visible)
                });
                (0..pile.len())
                    .map(|k| metrics.row_card(side, slot, k, overlap))
                    .collect()
            }
            Placement::Foundation { slot } => vec![metrics.foundation(slot); pile.len()],
        }
    }

    /// Everything a pile currently covers: its lane or slot plus any card
    /// spilling outside it.
    pub fn pile_extent(&self, region: Region, pile: &Pile) -> Option<Rect> {
        let metrics = self.metrics?;
        let base = match Placement::of(region)? {
            Placement::Row { side, slot } => metrics.lane(side, slot),
            Placement::Foundation { slot } => metrics.foundation(slot),
        };
        Some(
            self.card_rects(region, pile)
                .into_iter()
                .filter(|r| !r.is_empty())
                .fold(base, |acc, r| acc.union(r)),
        )
    }

    pub fn client_size_for_card_set(&self) -> Option<Size> {
        self.dims.map(|d| d.client_size_for_card_set())
    }

    pub fn minimum_client_size_for_card_set(&self) -> Option<Size> {
        self.dims.map(|d| d.minimum_client_size_for_card_set())
    }

    pub fn client_size_for_scaled_card_set(&self, scale: f64) -> Option<Size> {
        self.dims.map(|d| d.client_size_for_scaled_card_set(scale))
    }

    pub fn card_set_size_for_client(&self, client: Size) -> Option<Size> {
        self.dims
            .map(|d| d.card_set_size_for_client(client, self.small_display))
    }
}

/// Enlarge a drop target by the gap around it, keeping clear of neighbours.
fn grow(bounds: Rect, spacing: Spacing) -> Rect {
    let dx = spacing.horizontal;
    let dy = spacing.vertical / 2;
    let x = bounds.x.saturating_sub(dx);
    let y = bounds.y.saturating_sub(dy);
    Rect::new(
        x,
        y,
        bounds.right().saturating_add(dx) - x,
        bounds.bottom().saturating_add(dy) - y,
    )
}
