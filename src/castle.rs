use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::card::{Card, CardId, Rank, full_deck};
use crate::deck::{Deck, SeedPolicy};
use crate::errors::IllegalMove;
use crate::game::{CardGame, GameInfo};
use crate::pile::Pile;
use crate::region::{Region, RegionKind};

/// Number of tableau rows; the first half is drawn left of the foundations.
pub const NUM_ROWS: usize = 8;
/// Number of foundation piles, one per suit.
pub const NUM_FOUNDATIONS: usize = 4;
/// Cards in a finished foundation.
const FOUNDATION_FULL: usize = 13;

/// The games played on the castle table. They share piles, building rules and
/// the win test, and differ only in how the cards are dealt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum Variant {
    /// Aces start on the foundations; 48 cards go to the rows, six each.
    BeleagueredCastle,
    /// All 52 cards are dealt to the rows.
    StreetsAndAlleys,
    /// Cards that can go to a foundation while dealing go there.
    Citadel,
}

const BELEAGUERED_CASTLE: GameInfo = GameInfo {
    title: "Beleaguered Castle",
    version: env!("CARGO_PKG_VERSION"),
    copyright: "Copyright (c) patience contributors",
    website: "",
    contact_email: "",
    additional_info: "Aces start on the foundations. Build rows down regardless of suit, one card at a time.",
};

const STREETS_AND_ALLEYS: GameInfo = GameInfo {
    title: "Streets and Alleys",
    additional_info: "Beleaguered Castle with the aces shuffled into the rows.",
    ..BELEAGUERED_CASTLE
};

const CITADEL: GameInfo = GameInfo {
    title: "Citadel",
    additional_info: "Cards are sent to the foundations as they are dealt, wherever they fit.",
    ..BELEAGUERED_CASTLE
};

impl Variant {
    pub const ALL: [Variant; 3] = [
        Variant::BeleagueredCastle,
        Variant::StreetsAndAlleys,
        Variant::Citadel,
    ];

    pub fn info(self) -> &'static GameInfo {
        match self {
            Variant::BeleagueredCastle => &BELEAGUERED_CASTLE,
            Variant::StreetsAndAlleys => &STREETS_AND_ALLEYS,
            Variant::Citadel => &CITADEL,
        }
    }
}

/// Does a foundation whose pile is `foundation` take `card` next?
fn foundation_accepts(foundation: &Pile, card: &Card) -> bool {
    match foundation.last() {
        None => card.rank() == Rank::Ace,
        Some(top) => top.suit() == card.suit() && top.rank().succ() == Some(card.rank()),
    }
}

/// Does a row whose pile is `row` take `card` next?
fn row_accepts(row: &Pile, card: &Card) -> bool {
    row.last().is_none_or(|top| card.can_build_on(top))
}

/// A castle-family game: eight rows flanking four foundations.
#[derive(Debug)]
pub struct Castle {
    variant: Variant,
    /// Tableau rows; 0..4 on the left, 4..8 on the right.
    rows: [Pile; NUM_ROWS],
    foundations: [Pile; NUM_FOUNDATIONS],
    deck: Deck,
    seed: SeedPolicy,
}

impl Castle {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// A game holding a full, undealt deck. Call [`CardGame::initialise`] or
    /// [`CardGame::restart`] to deal.
    pub fn new(variant: Variant) -> Self {
        Castle {
            variant,
            rows: Default::default(),
            foundations: Default::default(),
            deck: Deck::new(full_deck()),
            seed: SeedPolicy::Random,
        }
    }

    /// A game in a given position. Missing piles are left empty; every card
    /// not named in `rows` or `foundations` waits in the deck and is dealt
    /// again by the next restart.
    pub fn from_piles(variant: Variant, rows: Vec<Vec<Card>>, foundations: Vec<Vec<Card>>) -> Self {
        let named: BTreeSet<CardId> = rows.iter().chain(&foundations).flatten().map(Card::id).collect();
        let mut game = Castle {
            variant,
            rows: Default::default(),
            foundations: Default::default(),
            deck: Deck::new(full_deck().into_iter().filter(|c| !named.contains(&c.id())).collect()),
            seed: SeedPolicy::Random,
        };
        for (pile, cards) in game.rows.iter_mut().zip(rows) {
            cards.into_iter().for_each(|card| pile.push(card));
        }
        for (pile, cards) in game.foundations.iter_mut().zip(foundations) {
            cards.into_iter().for_each(|card| pile.push(card));
        }
        game
    }

    /// Cards held back from the piles.
    pub fn undealt(&self) -> usize {
        self.deck.len()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn rows(&self) -> &[Pile; NUM_ROWS] {
        &self.rows
    }

    pub fn foundations(&self) -> &[Pile; NUM_FOUNDATIONS] {
        &self.foundations
    }

    // -------------------------------------------------------------------------
    // Dealing
    // -------------------------------------------------------------------------

    fn deal_round_robin(&mut self, cards: Vec<Card>) {
        for (i, card) in cards.into_iter().enumerate() {
            self.rows[i % NUM_ROWS].push(card);
        }
    }

    fn deal_beleaguered_castle(&mut self, cards: Vec<Card>) {
        let (aces, rest): (Vec<Card>, Vec<Card>) =
            cards.into_iter().partition(|card| card.rank() == Rank::Ace);
        for ace in aces {
            self.foundations[ace.suit().index()].push(ace);
        }
        self.deal_round_robin(rest);
    }

    fn deal_citadel(&mut self, cards: Vec<Card>) {
        let mut next_row = 0;
        for card in cards {
            match self.foundations.iter_mut().find(|f| foundation_accepts(f, &card)) {
                Some(foundation) => foundation.push(card),
                None => {
                    self.rows[next_row % NUM_ROWS].push(card);
                    next_row += 1;
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn piles_of(&self, kind: RegionKind) -> Option<&[Pile]> {
        match kind {
            RegionKind::Row => Some(&self.rows),
            RegionKind::Foundation => Some(&self.foundations),
            RegionKind::Column | RegionKind::Reserve | RegionKind::Discard => None,
        }
    }

    /// Mutable access to the source and destination of a row move.
    fn move_piles(&mut self, from: Region, to: Region) -> Option<(&mut Pile, &mut Pile)> {
        match (from.kind, to.kind) {
            (RegionKind::Row, RegionKind::Row) => {
                let (a, b) = (from.index, to.index);
                if a == b || a >= NUM_ROWS || b >= NUM_ROWS {
                    return None;
                }
                if a < b {
                    let (low, high) = self.rows.split_at_mut(b);
                    Some((&mut low[a], &mut high[0]))
                } else {
                    let (low, high) = self.rows.split_at_mut(a);
                    Some((&mut high[0], &mut low[b]))
                }
            }
            (RegionKind::Row, RegionKind::Foundation) => Some((
                self.rows.get_mut(from.index)?,
                self.foundations.get_mut(to.index)?,
            )),
            _ => None,
        }
    }
}

impl CardGame for Castle {
    fn info(&self) -> &'static GameInfo {
        self.variant.info()
    }

    fn deck_size(&self) -> usize {
        52
    }

    fn regions(&self) -> Vec<Region> {
        (0..NUM_ROWS)
            .map(Region::row)
            .chain((0..NUM_FOUNDATIONS).map(Region::foundation))
            .collect()
    }

    fn pile(&self, region: Region) -> Option<&Pile> {
        self.piles_of(region.kind)?.get(region.index)
    }

    fn set_seed(&mut self, seed: SeedPolicy) {
        self.seed = seed;
    }

    fn gather_cards(&mut self) {
        let held = self.deck.cards_mut();
        for pile in self.rows.iter_mut().chain(self.foundations.iter_mut()) {
            pile.drain_into(held);
        }
    }

    fn shuffle(&mut self) {
        self.deck.shuffle(self.seed);
    }

    fn deal(&mut self) {
        let cards = self.deck.take_all();
        info!(variant = self.info().title, seed = ?self.seed, cards = cards.len(), "dealing");
        match self.variant {
            Variant::BeleagueredCastle => self.deal_beleaguered_castle(cards),
            Variant::StreetsAndAlleys => self.deal_round_robin(cards),
            Variant::Citadel => self.deal_citadel(cards),
        }
    }

    fn check_move(&self, from: Region, to: Region) -> Result<(), IllegalMove> {
        let source = self.pile(from).ok_or(IllegalMove::InvalidRegion(from))?;
        let target = self.pile(to).ok_or(IllegalMove::InvalidRegion(to))?;
        if from == to {
            return Err(IllegalMove::SameRegion(from));
        }
        if from.kind != RegionKind::Row {
            return Err(IllegalMove::Unsupported { from, to });
        }
        let card = source.last().ok_or(IllegalMove::EmptySource(from))?;

        let accepted = match to.kind {
            RegionKind::Row => row_accepts(target, card),
            RegionKind::Foundation => foundation_accepts(target, card),
            _ => return Err(IllegalMove::Unsupported { from, to }),
        };
        if accepted {
            Ok(())
        } else {
            Err(IllegalMove::Rejected { card: card.id(), to })
        }
    }

    fn try_move(&mut self, from: Region, to: Region) -> Result<(), IllegalMove> {
        if let Err(err) = self.check_move(from, to) {
            debug!(%from, %to, %err, "move refused");
            return Err(err);
        }
        let (source, target) = self
            .move_piles(from, to)
            .ok_or(IllegalMove::Unsupported { from, to })?;
        if !source.move_top_to(target) {
            return Err(IllegalMove::EmptySource(from));
        }
        debug!(%from, %to, "moved");
        Ok(())
    }

    /// Foundations first, then a row the card builds on, then an empty row.
    /// A lone card is never sent to an empty row.
    fn best_destination(&self, from: Region) -> Option<Region> {
        let source = self.pile(from)?;
        let card = source.last()?;
        if from.kind != RegionKind::Row {
            return None;
        }

        let foundation = (0..NUM_FOUNDATIONS)
            .map(Region::foundation)
            .find(|&to| self.is_legal_move(from, to));
        if foundation.is_some() {
            return foundation;
        }

        let rows = || (0..NUM_ROWS).map(Region::row).filter(move |&to| to != from);
        rows()
            .find(|&to| {
                self.pile(to)
                    .and_then(Pile::last)
                    .is_some_and(|top| card.can_build_on(top))
            })
            .or_else(|| {
                if source.len() == 1 {
                    return None;
                }
                rows().find(|&to| self.pile(to).is_some_and(Pile::is_empty))
            })
    }

    fn is_game_won(&self) -> bool {
        self.foundations.iter().all(|f| f.len() == FOUNDATION_FULL)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::card::Suit;

    pub(crate) fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Foundations filled up to (and including) `tops[suit]`; `None` leaves a
    /// foundation empty.
    pub(crate) fn foundations_up_to(tops: [Option<Rank>; 4]) -> Vec<Vec<Card>> {
        Suit::ALL
            .iter()
            .zip(tops)
            .map(|(&suit, top)| match top {
                None => Vec::new(),
                Some(top) => Rank::ALL
                    .iter()
                    .take_while(|&&r| r <= top)
                    .map(|&r| card(r, suit))
                    .collect(),
            })
            .collect()
    }

    fn snapshot(game: &Castle) -> Vec<Vec<CardId>> {
        game.regions()
            .into_iter()
            .map(|r| game.pile(r).map(Pile::ids).unwrap_or_default())
            .collect()
    }

    fn dealt(variant: Variant, seed: u64) -> Castle {
        let mut game = Castle::new(variant);
        game.initialise(SeedPolicy::Fixed(seed));
        game
    }

    #[test]
    fn beleaguered_castle_deal() {
        let game = dealt(Variant::BeleagueredCastle, 1);
        assert_eq!(game.cards_in_play(), 52);
        for (i, foundation) in game.foundations().iter().enumerate() {
            assert_eq!(foundation.ids(), vec![CardId::new(Rank::Ace, Suit::ALL[i])]);
        }
        for row in game.rows() {
            assert_eq!(row.len(), 6);
            assert!(row.iter().all(|c| c.rank() != Rank::Ace));
        }
    }

    #[test]
    fn streets_and_alleys_deal() {
        let game = dealt(Variant::StreetsAndAlleys, 1);
        let lens: Vec<usize> = game.rows().iter().map(Pile::len).collect();
        assert_eq!(lens, vec![7, 7, 7, 7, 6, 6, 6, 6]);
        assert!(game.foundations().iter().all(Pile::is_empty));
    }

    #[test]
    fn citadel_deal_sends_aces_to_foundations() {
        let game = dealt(Variant::Citadel, 3);
        assert_eq!(game.cards_in_play(), 52);
        for row in game.rows() {
            assert!(row.iter().all(|c| c.rank() != Rank::Ace));
        }
    }

    #[test]
    fn same_seed_same_deal() {
        for variant in Variant::ALL {
            let a = dealt(variant, 12345);
            let mut b = dealt(variant, 12345);
            assert_eq!(snapshot(&a), snapshot(&b));

            // Restarting mid-game returns to the same deal.
            let moves = b.legal_moves();
            if let Some(mv) = moves.first() {
                assert!(b.move_card(mv.from, mv.to));
            }
            b.restart();
            assert_eq!(snapshot(&a), snapshot(&b));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = dealt(Variant::BeleagueredCastle, 1);
        let b = dealt(Variant::BeleagueredCastle, 2);
        assert_ne!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn row_and_foundation_rules() {
        let mut game = Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![
                vec![card(Rank::King, Suit::Clubs), card(Rank::Two, Suit::Hearts)],
                vec![card(Rank::Three, Suit::Spades)],
                vec![],
                vec![card(Rank::Four, Suit::Diamonds)],
            ],
            foundations_up_to([None, None, Some(Rank::Ace), None]),
        );

        // 2♥ on the 3♠: rows ignore suit.
        assert!(game.is_legal_move(Region::row(0), Region::row(1)));
        // 3♠ on 4♦.
        assert!(game.is_legal_move(Region::row(1), Region::row(3)));
        // 4♦ on 3♠: wrong direction.
        assert_eq!(
            game.check_move(Region::row(3), Region::row(1)),
            Err(IllegalMove::Rejected {
                card: CardId::new(Rank::Four, Suit::Diamonds),
                to: Region::row(1)
            })
        );
        // Anything to an empty row.
        assert!(game.is_legal_move(Region::row(3), Region::row(2)));
        // 2♥ onto A♥.
        assert!(game.is_legal_move(Region::row(0), Region::foundation(2)));
        assert!(!game.is_legal_move(Region::row(0), Region::foundation(0)));
        // Nothing leaves a foundation.
        assert!(matches!(
            game.check_move(Region::foundation(2), Region::row(2)),
            Err(IllegalMove::Unsupported { .. })
        ));
        assert_eq!(
            game.check_move(Region::row(5), Region::row(2)),
            Err(IllegalMove::EmptySource(Region::row(5)))
        );
        assert_eq!(
            game.check_move(Region::row(1), Region::row(1)),
            Err(IllegalMove::SameRegion(Region::row(1)))
        );
        assert_eq!(
            game.check_move(Region::row(8), Region::row(1)),
            Err(IllegalMove::InvalidRegion(Region::row(8)))
        );
        assert_eq!(
            game.check_move(Region::row(0), Region::new(RegionKind::Reserve, 0)),
            Err(IllegalMove::InvalidRegion(Region::new(RegionKind::Reserve, 0)))
        );

        assert!(game.move_card(Region::row(0), Region::foundation(2)));
        assert_eq!(game.foundations()[2].len(), 2);
        assert_eq!(game.rows()[0].len(), 1);
    }

    #[test]
    fn restarting_a_set_position_deals_the_full_deck() {
        let mut game = Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![card(Rank::King, Suit::Spades)]],
            vec![],
        );
        assert_eq!(game.cards_in_play(), 1);
        assert_eq!(game.undealt(), 51);

        game.set_seed(SeedPolicy::Fixed(3));
        game.restart();
        assert_eq!(game.cards_in_play(), game.deck_size());
        assert_eq!(game.undealt(), 0);
        assert_eq!(snapshot(&game), snapshot(&dealt(Variant::BeleagueredCastle, 3)));
    }

    #[test]
    fn lookup_out_of_range_is_none() {
        let game = Castle::new(Variant::BeleagueredCastle);
        assert!(game.pile(Region::row(7)).is_some());
        assert!(game.pile(Region::row(8)).is_none());
        assert!(game.pile(Region::foundation(4)).is_none());
        assert!(game.pile(Region::new(RegionKind::Discard, 0)).is_none());
    }

    #[test]
    fn best_destination_prefers_foundation_then_build_then_empty_row() {
        let game = Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![
                vec![card(Rank::Nine, Suit::Clubs), card(Rank::Two, Suit::Clubs)],
                vec![card(Rank::Seven, Suit::Clubs), card(Rank::Six, Suit::Hearts)],
                vec![card(Rank::Eight, Suit::Spades)],
                vec![],
                vec![card(Rank::Seven, Suit::Diamonds)],
            ],
            foundations_up_to([Some(Rank::Ace), None, None, None]),
        );
        assert_eq!(game.best_destination(Region::row(0)), Some(Region::foundation(0)));
        // 6♥ builds on 7♦ (row 4).
        assert_eq!(game.best_destination(Region::row(1)), Some(Region::row(4)));
        // 8♠ alone: nothing to build on, and never moved to an empty row.
        assert_eq!(game.best_destination(Region::row(2)), None);
        assert_eq!(game.best_destination(Region::row(3)), None);
        assert_eq!(game.best_destination(Region::foundation(0)), None);
    }

    #[test]
    fn won_when_all_foundations_full() {
        let king = Some(Rank::King);
        let game = Castle::from_piles(Variant::Citadel, vec![], foundations_up_to([king; 4]));
        assert!(game.is_game_won());
        assert!(!dealt(Variant::Citadel, 5).is_game_won());
    }

    quickcheck! {
        fn conservation_under_random_play(seed: u64, picks: Vec<usize>) -> bool {
            let mut game = dealt(Variant::StreetsAndAlleys, seed.max(1));
            for pick in picks {
                let moves = game.legal_moves();
                if moves.is_empty() {
                    break;
                }
                let mv = moves[pick % moves.len()];
                if !game.move_card(mv.from, mv.to) {
                    return false;
                }
            }
            game.cards_in_play() == game.deck_size()
        }

        fn refused_moves_change_nothing(seed: u64, from: Region, to: Region) -> bool {
            let mut game = dealt(Variant::BeleagueredCastle, seed.max(1));
            if game.is_legal_move(from, to) {
                return true;
            }
            let before = snapshot(&game);
            !game.move_card(from, to) && snapshot(&game) == before
        }
    }
}
