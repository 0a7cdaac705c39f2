use std::collections::HashMap;

use crate::card::CardId;
use crate::layout::CardDimensions;

/// Card faces plus the dimensions they are drawn at.
///
/// The image type is whatever the drawing surface understands; the engine
/// never looks inside it.
#[derive(Debug, Clone)]
pub struct CardSet<I> {
    dimensions: CardDimensions,
    images: HashMap<CardId, I>,
}

impl<I> CardSet<I> {
    pub fn with_images(dimensions: CardDimensions, images: impl IntoIterator<Item = (CardId, I)>) -> Self {
        CardSet {
            dimensions,
            images: images.into_iter().collect(),
        }
    }

    pub fn dimensions(&self) -> CardDimensions {
        self.dimensions
    }

    /// The face of `card`; `None` means there is nothing to draw for it.
    pub fn image(&self, card: CardId) -> Option<&I> {
        self.images.get(&card)
    }
}
