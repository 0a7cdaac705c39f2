use crate::card::{Card, CardId};

/// An ordered stack of cards, bottom first.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Pile {
    cards: Vec<Card>,
}

impl Pile {
    pub fn new() -> Self {
        Pile::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn last(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards from bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    /// Move the top card onto `to`. Returns `false` if this pile is empty.
    pub fn move_top_to(&mut self, to: &mut Pile) -> bool {
        match self.cards.pop() {
            Some(card) => {
                to.push(card);
                true
            }
            None => false,
        }
    }

    /// Move every card into `to`, keeping their order.
    pub fn drain_into(&mut self, to: &mut Vec<Card>) {
        to.append(&mut self.cards);
    }

    /// The identities of the cards, bottom to top.
    pub fn ids(&self) -> Vec<CardId> {
        self.cards.iter().map(Card::id).collect()
    }

    /// True when ranks never increase from bottom to top.
    pub fn is_descending(&self) -> bool {
        self.cards.windows(2).all(|w| w[0].rank() >= w[1].rank())
    }
}

impl<'a> IntoIterator for &'a Pile {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    #[test]
    fn move_top_transfers_ownership() {
        let mut a = Pile::new();
        let mut b = Pile::new();
        a.push(Card::new(Rank::Two, Suit::Clubs));
        a.push(Card::new(Rank::Five, Suit::Hearts));

        assert!(a.move_top_to(&mut b));
        assert_eq!(a.len(), 1);
        assert_eq!(b.last().map(Card::id), Some(CardId::new(Rank::Five, Suit::Hearts)));

        assert!(a.move_top_to(&mut b));
        assert!(!a.move_top_to(&mut b));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn descending_detector() {
        let mut pile = Pile::new();
        assert!(pile.is_descending());
        pile.push(Card::new(Rank::King, Suit::Spades));
        pile.push(Card::new(Rank::Nine, Suit::Hearts));
        pile.push(Card::new(Rank::Nine, Suit::Clubs));
        assert!(pile.is_descending());
        pile.push(Card::new(Rank::Ten, Suit::Clubs));
        assert!(!pile.is_descending());
    }
}
