//! Fixed-width sequence encoding.
//!
//! The classification model was trained on sequences of exactly one width.
//! Anything shorter is right-padded, anything longer loses its tail, matching
//! `padding='post', truncating='post'` at training time.

/// Sequence width the reference model was trained with.
pub const DEFAULT_SEQUENCE_WIDTH: usize = 100;

/// Id reserved for padding. Vocabulary ids start at 1.
pub const DEFAULT_PAD_ID: u32 = 0;

/// A token sequence normalized to the model's input width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthSequence {
    ids: Vec<u32>,
    /// Number of real (non-padding) ids kept from the input.
    kept: usize,
    /// Number of ids dropped from the tail of an overlong input.
    dropped: usize,
}

impl FixedWidthSequence {
    /// Truncate or right-pad `ids` to exactly `width` entries.
    pub fn fit(mut ids: Vec<u32>, width: usize, pad_id: u32) -> Self {
        let dropped = ids.len().saturating_sub(width);
        ids.truncate(width);
        let kept = ids.len();
        ids.resize(width, pad_id);

        Self { ids, kept, dropped }
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn width(&self) -> usize {
        self.ids.len()
    }

    pub fn kept(&self) -> usize {
        self.kept
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }
}
