//! Patience games on the castle table.
//!
//! The engine is split the way a host uses it:
//! - [`game::CardGame`] and its [`castle`] variants own the cards and the rules,
//! - [`layout::TableLayout`] turns piles into rectangles and drag zones,
//! - [`redraw`] keeps per-pile dirty flags and repaints only what changed,
//! - [`autofinish`] plays out a game whose rows are already in order,
//! - [`table::Table`] ties them together behind pick-up / move / replace.

pub mod autofinish;
pub mod card;
pub mod card_set;
pub mod castle;
pub mod deck;
pub mod errors;
pub mod game;
pub mod layout;
pub mod pile;
pub mod redraw;
pub mod region;
pub mod table;
pub mod zone;

pub use card::{Card, CardId, Rank, Suit};
pub use card_set::CardSet;
pub use castle::{Castle, Variant};
pub use deck::SeedPolicy;
pub use errors::IllegalMove;
pub use game::{CardGame, GameInfo};
pub use layout::{CardDimensions, TableLayout};
pub use pile::Pile;
pub use redraw::{DirtyTracker, Surface};
pub use region::{Move, Region, RegionKind};
pub use table::Table;
pub use zone::{Zone, ZoneKind, ZoneMap};
