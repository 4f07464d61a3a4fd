//! Positioned text types.
//!
//! This module provides the [`Word`] struct, the unit of text the assembler
//! places into grid cells, and [`WordPosition`] for the optional reading
//! position metadata carried by upstream text extractors.

use serde::{Deserialize, Serialize};

use crate::document::bounds::Bounds;

/// Position of a word within the extractor's block/line structure.
///
/// This metadata is passed through untouched; the assembly core does not
/// read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPosition {
    /// Index of the text block on the page.
    pub block: usize,
    /// Index of the line within its block.
    pub line: usize,
    /// Index of the word within its line.
    pub word: usize,
}

/// A single word with its bounding box in table-local coordinates.
///
/// Words are consumed in the order the extractor yields them. That order is
/// also the order in which texts sharing a cell are joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Bounding box, offset so `(0, 0)` is the table's top-left corner.
    pub bounds: Bounds,
    /// The word's text content.
    pub text: String,
    /// Optional block/line/word indices from the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WordPosition>,
}

impl Word {
    /// Creates a new `Word` without position metadata.
    ///
    /// # Arguments
    ///
    /// * `bounds` - The word's bounding box
    /// * `text` - The word's text content
    #[must_use]
    pub fn new(bounds: Bounds, text: impl Into<String>) -> Self {
        Self {
            bounds,
            text: text.into(),
            position: None,
        }
    }

    /// Creates a `Word` from the `(xmin, ymin, xmax, ymax, text)` tuple shape
    /// produced by page text extractors.
    #[must_use]
    pub fn from_tuple(xmin: f64, ymin: f64, xmax: f64, ymax: f64, text: impl Into<String>) -> Self {
        Self::new(Bounds::new(xmin, ymin, xmax, ymax), text)
    }

    /// Attaches block/line/word position metadata.
    #[must_use]
    pub fn with_position(mut self, position: WordPosition) -> Self {
        self.position = Some(position);
        self
    }
}
