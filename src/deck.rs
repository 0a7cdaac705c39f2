use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::card::Card;

/// How the next shuffle obtains its random generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Keep drawing from the generator used by the previous shuffle.
    Continue,
    /// Start a fresh generator seeded by the operating system.
    Random,
    /// Start a generator seeded with this value; the same value always yields
    /// the same deal.
    Fixed(u64),
}

impl From<i64> for SeedPolicy {
    /// `-1` (or any negative) continues, `0` is random, anything else is fixed.
    fn from(seed: i64) -> Self {
        match seed {
            0 => SeedPolicy::Random,
            s if s > 0 => SeedPolicy::Fixed(s as u64),
            _ => SeedPolicy::Continue,
        }
    }
}

/// Cards not currently in any pile, plus the generator that shuffles them.
#[derive(Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
    rng: Option<SmallRng>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Deck { cards, rng: None }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Where gathered cards are collected.
    pub fn cards_mut(&mut self) -> &mut Vec<Card> {
        &mut self.cards
    }

    /// Hand out every card, in deck order.
    pub fn take_all(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    /// Sort the deck into its canonical order, then permute it.
    ///
    /// The sort makes a fixed seed independent of whatever order the cards
    /// were gathered in.
    pub fn shuffle(&mut self, policy: SeedPolicy) {
        self.cards.sort_by_key(Card::id);

        let rng = match policy {
            SeedPolicy::Fixed(seed) => self.rng.insert(SmallRng::seed_from_u64(seed)),
            SeedPolicy::Random => self.rng.insert(SmallRng::from_os_rng()),
            SeedPolicy::Continue => self.rng.get_or_insert_with(SmallRng::from_os_rng),
        };
        self.cards.shuffle(rng);
    }
}
