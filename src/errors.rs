use crate::card::CardId;
use crate::region::Region;

/// Why a move was refused. Refusal never mutates the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    /// The region names no pile of this game.
    InvalidRegion(Region),
    /// There is no card to move.
    EmptySource(Region),
    /// Source and destination are the same pile.
    SameRegion(Region),
    /// The game defines no moves between these kinds of pile.
    Unsupported { from: Region, to: Region },
    /// The destination does not accept the card.
    Rejected { card: CardId, to: Region },
}

impl std::error::Error for IllegalMove {}

impl std::fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalMove::InvalidRegion(region) => write!(f, "There is no {}", region),
            IllegalMove::EmptySource(region) => write!(f, "The {} is empty", region),
            IllegalMove::SameRegion(region) => {
                write!(f, "A card cannot be moved from the {} onto itself", region)
            }
            IllegalMove::Unsupported { from, to } => {
                write!(f, "Cards cannot be moved from a {} to a {}", from, to)
            }
            IllegalMove::Rejected { card, to } => write!(f, "{} cannot be placed on the {}", card, to),
        }
    }
}
