use crate::deck::SeedPolicy;
use crate::errors::IllegalMove;
use crate::pile::Pile;
use crate::region::{Move, Region, RegionKind};

/// Descriptive strings a game module shows in its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    pub title: &'static str,
    pub version: &'static str,
    pub copyright: &'static str,
    pub website: &'static str,
    pub contact_email: &'static str,
    pub additional_info: &'static str,
}

/// The capability every patience variant provides.
///
/// `check_move` is pure, so hosts and automation can probe moves freely;
/// `try_move` either relocates a card or leaves every pile untouched.
pub trait CardGame {
    fn info(&self) -> &'static GameInfo;

    /// Number of cards in a complete deal of this variant.
    fn deck_size(&self) -> usize;

    /// Every pile the game owns, in a stable order.
    fn regions(&self) -> Vec<Region>;

    /// The pile at `region`, or `None` if the game has no such pile.
    fn pile(&self, region: Region) -> Option<&Pile>;

    /// Replace the seed used by the next shuffle.
    fn set_seed(&mut self, seed: SeedPolicy);

    /// Return every card, from every pile, to the deck.
    fn gather_cards(&mut self);

    /// Sort the deck into canonical order, then permute it under the seed.
    fn shuffle(&mut self);

    /// Distribute the deck into the piles.
    fn deal(&mut self);

    fn check_move(&self, from: Region, to: Region) -> Result<(), IllegalMove>;

    fn try_move(&mut self, from: Region, to: Region) -> Result<(), IllegalMove>;

    /// The preferred destination for the top card of `from`, if any.
    fn best_destination(&self, from: Region) -> Option<Region>;

    fn is_game_won(&self) -> bool;

    fn initialise(&mut self, seed: SeedPolicy) {
        self.set_seed(seed);
        self.restart();
    }

    /// Gather, shuffle and deal.
    fn restart(&mut self) {
        self.gather_cards();
        self.shuffle();
        self.deal();
    }

    fn is_legal_move(&self, from: Region, to: Region) -> bool {
        self.check_move(from, to).is_ok()
    }

    /// Boolean form of [`CardGame::try_move`].
    fn move_card(&mut self, from: Region, to: Region) -> bool {
        self.try_move(from, to).is_ok()
    }

    /// Every legal move, ordered by source then destination.
    fn legal_moves(&self) -> Vec<Move> {
        let regions = self.regions();
        let mut moves = Vec::new();
        for &from in &regions {
            for &to in &regions {
                if self.is_legal_move(from, to) {
                    moves.push(Move::new(from, to));
                }
            }
        }
        moves
    }

    /// Regions of one kind, in index order.
    fn regions_of(&self, kind: RegionKind) -> Vec<Region> {
        self.regions().into_iter().filter(|r| r.kind == kind).collect()
    }

    /// Total cards currently in piles.
    fn cards_in_play(&self) -> usize {
        self.regions()
            .into_iter()
            .filter_map(|r| self.pile(r))
            .map(Pile::len)
            .sum()
    }
}
