use std::fmt;

/// The four French suits, in the order used to sort a deck before shuffling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// All four suits, in canonical order.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamonds | Suit::Hearts)
    }

    /// Position of the suit in [`Suit::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Card rank, ordered Ace (low) to King (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Numeric value, 1 for Ace through 13 for King.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// The rank directly below this one, `None` for an Ace.
    pub fn pred(self) -> Option<Rank> {
        Rank::ALL.get((self.value() as usize).checked_sub(2)?).copied()
    }

    /// The rank directly above this one, `None` for a King.
    pub fn succ(self) -> Option<Rank> {
        Rank::ALL.get(self.value() as usize).copied()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

/// The identity of a card: what is printed on its face.
///
/// The derived ordering (suit, then rank) is the total order a deck is sorted
/// into before a seeded shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId {
    pub suit: Suit,
    pub rank: Rank,
}

impl CardId {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        CardId { suit, rank }
    }

    pub fn label(self) -> String {
        format!("{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// A physical card.
///
/// Deliberately neither `Clone` nor `Copy`: a card is moved from pile to pile
/// and is therefore held by exactly one owner at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct Card {
    id: CardId,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card {
            id: CardId::new(rank, suit),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn rank(&self) -> Rank {
        self.id.rank
    }

    pub fn suit(&self) -> Suit {
        self.id.suit
    }

    /// Can this card be placed on a tableau row whose top card is `other`?
    /// Rows build down by one rank regardless of suit.
    pub fn can_build_on(&self, other: &Card) -> bool {
        other.rank().pred() == Some(self.rank())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// A standard 52-card deck in canonical order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);

    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            deck.push(Card::new(rank, suit));
        }
    }

    debug_assert_eq!(deck.len(), 52, "Deck must have exactly 52 cards");
    deck
}
