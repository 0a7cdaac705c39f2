use ratatui::layout::{Position, Size};
use tracing::{debug, info, warn};

use crate::autofinish::{self, Step};
use crate::card::CardId;
use crate::card_set::CardSet;
use crate::deck::SeedPolicy;
use crate::game::{CardGame, GameInfo};
use crate::layout::TableLayout;
use crate::redraw::{self, DirtyTracker, RedrawReport, Surface};
use crate::region::{Move, Region};
use crate::zone::{Zone, ZoneKind};

/// A card lifted off the table by a drag.
#[derive(Debug)]
pub struct PickedUp<'a, I> {
    pub card: CardId,
    /// `None` when the card set has no face for this card.
    pub image: Option<&'a I>,
}

/// One game on one table: the rules, where everything is drawn, and what
/// needs drawing again.
///
/// The game is injected so the table stays variant-agnostic.
pub struct Table<G: CardGame, I> {
    game: G,
    cards: Option<CardSet<I>>,
    layout: TableLayout,
    tracker: DirtyTracker,
    held: Option<Region>,
    moves: usize,
}

impl<G: CardGame, I> Table<G, I> {
    pub fn new(game: G) -> Self {
        let tracker = DirtyTracker::new(game.regions());
        Table {
            game,
            cards: None,
            layout: TableLayout::new(),
            tracker,
            held: None,
            moves: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn info(&self) -> &'static GameInfo {
        self.game.info()
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    /// The pile whose top card is being dragged.
    pub fn held(&self) -> Option<Region> {
        self.held
    }

    /// Moves committed since the last restart.
    pub fn moves_made(&self) -> usize {
        self.moves
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Load a card set and deal a new game under `seed`.
    pub fn initialise(&mut self, cards: CardSet<I>, seed: SeedPolicy) {
        self.set_card_set(cards);
        self.game.set_seed(seed);
        self.restart();
    }

    pub fn set_seed(&mut self, seed: SeedPolicy) {
        self.game.set_seed(seed);
    }

    /// Gather, shuffle and deal afresh.
    pub fn restart(&mut self) {
        self.game.restart();
        self.held = None;
        self.moves = 0;
        self.tracker = DirtyTracker::new(self.game.regions());
        self.layout.refresh_all(&self.game);
        info!(game = self.info().title, "new deal");
    }

    pub fn set_card_set(&mut self, cards: CardSet<I>) {
        self.layout.set_card_set(cards.dimensions(), &self.game);
        self.cards = Some(cards);
        self.tracker.mark_all_dirty();
    }

    pub fn resize(&mut self, surface: Size) {
        if self.layout.resize(surface, &self.game) {
            self.tracker.mark_all_dirty();
        }
    }

    pub fn set_work_area(&mut self, work_area: Size) {
        if self.layout.set_work_area(work_area, &self.game) {
            self.tracker.mark_all_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Dragging
    // -------------------------------------------------------------------------

    pub fn zone_at(&self, kind: ZoneKind, position: Position) -> Option<Zone> {
        self.layout.zones().hit(kind, position)
    }

    /// Lift the top card of the zone's pile. The pile is redrawn without it
    /// until the card is moved or replaced.
    pub fn pick_up_cards(&mut self, zone: &Zone) -> Option<PickedUp<'_, I>> {
        if zone.kind != ZoneKind::PickUp {
            return None;
        }
        let card = self.game.pile(zone.region)?.last()?.id();
        if let Some(previous) = self.held.replace(zone.region) {
            self.tracker.clear_exclusion(previous);
        }
        self.tracker.mark_excluding_top(zone.region);
        debug!(region = %zone.region, %card, "picked up");
        let image = self.cards.as_ref().and_then(|cards| cards.image(card));
        Some(PickedUp { card, image })
    }

    /// Drop the lifted card on `to`. An illegal drop puts it back.
    pub fn move_card(&mut self, from: &Zone, to: &Zone) -> bool {
        self.release(from.region);
        if to.kind != ZoneKind::Drop {
            return false;
        }
        self.commit(Move::new(from.region, to.region))
    }

    /// Cancel a drag: the card goes back where it came from.
    pub fn replace_card(&mut self, from: &Zone) {
        self.release(from.region);
    }

    fn release(&mut self, region: Region) {
        if self.held == Some(region) {
            self.held = None;
        }
        self.tracker.clear_exclusion(region);
    }

    /// Send the top card of `from` to its best destination.
    pub fn play_to_best(&mut self, from: Region) -> Option<Region> {
        let to = self.game.best_destination(from)?;
        self.commit(Move::new(from, to)).then_some(to)
    }

    fn commit(&mut self, mv: Move) -> bool {
        if let Err(err) = self.game.try_move(mv.from, mv.to) {
            debug!(%mv, %err, "drop refused");
            return false;
        }
        self.moves += 1;
        for region in [mv.from, mv.to] {
            self.layout.refresh_pile(region, &self.game);
            self.tracker.mark_dirty(region);
        }
        if self.game.is_game_won() {
            info!(moves = self.moves, "game won");
        }
        true
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    pub fn redraw<S: Surface<Image = I>>(&mut self, surface: &mut S) -> RedrawReport {
        redraw::redraw(
            surface,
            &self.game,
            &self.layout,
            self.cards.as_ref(),
            &mut self.tracker,
        )
    }

    // -------------------------------------------------------------------------
    // Auto-finish
    // -------------------------------------------------------------------------

    pub fn auto_finish_available(&self) -> bool {
        autofinish::available(&self.game)
    }

    /// Play one greedy foundation move. The caller redraws.
    pub fn auto_finish_step(&mut self) -> Step {
        let step = autofinish::next_step(&self.game);
        if let Step::Moved(mv) = step {
            if !self.commit(mv) {
                return Step::Stalled;
            }
        }
        step
    }

    /// Play the game out, redrawing after every move. Returns whether the game
    /// was won; an unsorted table is left untouched.
    pub fn auto_finish<S: Surface<Image = I>>(&mut self, surface: &mut S) -> bool {
        if !self.auto_finish_available() {
            return false;
        }
        let budget = autofinish::move_budget(&self.game);
        for _ in 0..=budget {
            match self.auto_finish_step() {
                Step::Moved(_) => {
                    self.redraw(surface);
                }
                Step::Won => return true,
                Step::Unavailable | Step::Stalled => break,
            }
        }
        warn!(moves = self.moves, "auto-finish stopped before the game was won");
        false
    }

    // -------------------------------------------------------------------------
    // Sizing queries
    // -------------------------------------------------------------------------

    pub fn minimum_client_size_for_card_set(&self) -> Option<Size> {
        self.layout.minimum_client_size_for_card_set()
    }

    pub fn client_size_for_card_set(&self) -> Option<Size> {
        self.layout.client_size_for_card_set()
    }

    pub fn client_size_for_scaled_card_set(&self, scale: f64) -> Option<Size> {
        self.layout.client_size_for_scaled_card_set(scale)
    }

    pub fn card_set_size_for_client(&self, client: Size) -> Option<Size> {
        self.layout.card_set_size_for_client(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};
    use crate::castle::tests::{card, foundations_up_to};
    use crate::castle::{Castle, Variant};
    use crate::pile::Pile;
    use crate::redraw::tests::{DIMS, RecordingSurface, full_card_set};

    fn table(game: Castle) -> (Table<Castle, CardId>, RecordingSurface) {
        let size = DIMS.client_size_for_card_set();
        let mut table = Table::new(game);
        table.set_card_set(full_card_set());
        table.resize(size);
        let surface = RecordingSurface {
            size,
            ..Default::default()
        };
        (table, surface)
    }

    fn dealt(seed: i64) -> (Table<Castle, CardId>, RecordingSurface) {
        let (mut table, surface) = table(Castle::new(Variant::BeleagueredCastle));
        table.initialise(full_card_set(), SeedPolicy::from(seed));
        (table, surface)
    }

    fn pick_up(table: &Table<Castle, CardId>, region: Region) -> Zone {
        table
            .layout()
            .zones()
            .get(ZoneKind::PickUp, region)
            .expect("pick-up zone")
    }

    fn drop_zone(table: &Table<Castle, CardId>, region: Region) -> Zone {
        table
            .layout()
            .zones()
            .get(ZoneKind::Drop, region)
            .expect("drop zone")
    }

    #[test]
    fn same_seed_end_to_end() {
        let (a, _) = dealt(12345);
        let (b, _) = dealt(12345);
        let top = |t: &Table<Castle, CardId>| t.game().rows()[0].last().map(|c| c.id());
        assert!(top(&a).is_some());
        assert_eq!(top(&a), top(&b));
        let piles = |t: &Table<Castle, CardId>| {
            let game = t.game();
            game.regions()
                .into_iter()
                .map(|r| game.pile(r).map(Pile::ids))
                .collect::<Vec<_>>()
        };
        assert_eq!(piles(&a), piles(&b));
    }

    #[test]
    fn foundation_move_through_zones() {
        let (mut table, _) = table(Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![
                vec![card(Rank::Nine, Suit::Clubs)],
                vec![card(Rank::King, Suit::Spades), card(Rank::Two, Suit::Hearts)],
            ],
            foundations_up_to([None, None, Some(Rank::Ace), None]),
        ));
        let mv = table
            .game()
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to.kind == crate::region::RegionKind::Foundation)
            .expect("2♥ can go up");
        assert_eq!(mv, Move::new(Region::row(1), Region::foundation(2)));

        let source_len = table.game().rows()[1].len();
        let target_len = table.game().foundations()[2].len();
        let from = pick_up(&table, mv.from);
        let to = drop_zone(&table, mv.to);
        assert!(table.pick_up_cards(&from).is_some());
        assert!(table.move_card(&from, &to));
        assert_eq!(table.game().rows()[1].len(), source_len - 1);
        assert_eq!(table.game().foundations()[2].len(), target_len + 1);
        assert_eq!(table.moves_made(), 1);
    }

    #[test]
    fn drag_lifecycle_marks_piles() {
        let (mut table, mut surface) = table(Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![
                vec![card(Rank::Nine, Suit::Clubs), card(Rank::Five, Suit::Hearts)],
                vec![card(Rank::Six, Suit::Spades)],
            ],
            foundations_up_to([Some(Rank::Ace); 4]),
        ));
        table.redraw(&mut surface);
        assert!(!table.tracker().any_dirty());

        let from = pick_up(&table, Region::row(0));
        let lifted = table.pick_up_cards(&from).expect("card");
        assert_eq!(lifted.card, CardId::new(Rank::Five, Suit::Hearts));
        assert_eq!(lifted.image, Some(&CardId::new(Rank::Five, Suit::Hearts)));
        assert_eq!(table.held(), Some(Region::row(0)));
        assert!(table.tracker().excludes_top(Region::row(0)));

        // Cancelled.
        table.replace_card(&from);
        assert_eq!(table.held(), None);
        assert!(table.tracker().is_dirty(Region::row(0)));
        assert!(!table.tracker().excludes_top(Region::row(0)));
        table.redraw(&mut surface);

        // Illegal drop: 5♥ onto a foundation.
        table.pick_up_cards(&from);
        assert!(!table.move_card(&from, &drop_zone(&table, Region::foundation(0))));
        assert_eq!(table.game().rows()[0].len(), 2);
        assert!(!table.tracker().excludes_top(Region::row(0)));
        table.redraw(&mut surface);

        // Legal drop: 5♥ onto 6♠.
        table.pick_up_cards(&from);
        assert!(table.move_card(&from, &drop_zone(&table, Region::row(1))));
        assert!(table.tracker().is_dirty(Region::row(0)));
        assert!(table.tracker().is_dirty(Region::row(1)));
        assert!(!table.tracker().excludes_top(Region::row(1)));
        assert_eq!(
            pick_up(&table, Region::row(1)).bounds,
            *table
                .layout()
                .card_rects(Region::row(1), &table.game().rows()[1])
                .last()
                .expect("two cards")
        );
    }

    #[test]
    fn empty_pile_cannot_be_picked_up() {
        let (mut table, _) = table(Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![card(Rank::Two, Suit::Clubs)]],
            vec![],
        ));
        let zone = Zone {
            kind: ZoneKind::PickUp,
            region: Region::row(3),
            bounds: ratatui::layout::Rect::new(0, 0, 1, 1),
        };
        assert!(table.pick_up_cards(&zone).is_none());
        assert_eq!(table.held(), None);
        assert!(table.zone_at(ZoneKind::PickUp, Position::new(0, 0)).is_none());
    }

    #[test]
    fn resize_marks_everything_dirty() {
        let (mut table, mut surface) = dealt(3);
        table.redraw(&mut surface);
        assert!(!table.tracker().any_dirty());
        table.resize(Size::new(900, 700));
        assert!(table.tracker().all_dirty());
        assert!(table.redraw(&mut surface).full);
        // Same size again: nothing to do.
        table.resize(Size::new(900, 700));
        assert!(!table.tracker().any_dirty());
    }

    #[test]
    fn auto_finish_refuses_unsorted_rows() {
        let (mut table, mut surface) = table(Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![card(Rank::Two, Suit::Clubs), card(Rank::Three, Suit::Clubs)]],
            foundations_up_to([Some(Rank::Ace), None, None, None]),
        ));
        assert!(!table.auto_finish_available());
        assert!(!table.auto_finish(&mut surface));
        assert_eq!(table.moves_made(), 0);
        assert_eq!(table.game().rows()[0].len(), 2);
    }

    #[test]
    fn auto_finish_plays_out_and_redraws() {
        let mut tops = [Some(Rank::Ten); 4];
        tops[0] = Some(Rank::King);
        let rows = [Suit::Diamonds, Suit::Hearts, Suit::Spades]
            .iter()
            .map(|&suit| {
                [Rank::King, Rank::Queen, Rank::Jack]
                    .iter()
                    .map(|&rank| card(rank, suit))
                    .collect()
            })
            .collect();
        let (mut table, mut surface) =
            table(Castle::from_piles(Variant::BeleagueredCastle, rows, foundations_up_to(tops)));
        table.redraw(&mut surface);
        surface.draws.clear();

        assert!(table.auto_finish_available());
        assert!(table.auto_finish(&mut surface));
        assert!(table.game().is_game_won());
        assert_eq!(table.moves_made(), 9);
        // Each move redrew its two piles.
        assert!(!table.tracker().any_dirty());
        assert!(!surface.draws.is_empty());
    }

    #[test]
    fn play_to_best_uses_the_variant_preference() {
        let (mut table, _) = table(Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![card(Rank::Two, Suit::Hearts)], vec![card(Rank::Three, Suit::Clubs)]],
            foundations_up_to([None, None, Some(Rank::Ace), None]),
        ));
        assert_eq!(table.play_to_best(Region::row(0)), Some(Region::foundation(2)));
        assert_eq!(table.play_to_best(Region::row(1)), None);
        assert_eq!(table.moves_made(), 1);
    }

    #[test]
    fn restart_recreates_tracking() {
        let (mut table, mut surface) = dealt(77);
        table.redraw(&mut surface);
        let from = pick_up(&table, Region::row(2));
        table.pick_up_cards(&from);
        table.restart();
        assert_eq!(table.held(), None);
        assert!(table.tracker().all_dirty());
        assert!(!table.tracker().excludes_top(Region::row(2)));
        assert_eq!(table.game().cards_in_play(), 52);
    }

    #[test]
    fn sizing_queries_wait_for_a_card_set() {
        let table: Table<Castle, CardId> = Table::new(Castle::new(Variant::Citadel));
        assert!(table.client_size_for_card_set().is_none());
        let (table, _) = dealt(1);
        assert_eq!(table.client_size_for_card_set(), Some(Size::new(647, 409)));
        assert_eq!(table.minimum_client_size_for_card_set(), Some(Size::new(502, 197)));
        assert_eq!(
            table.card_set_size_for_client(Size::new(647, 409)),
            Some(Size::new(71, 96))
        );
        assert!(table.client_size_for_scaled_card_set(1.0).is_some());
    }
}
