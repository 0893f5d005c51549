//! Byte-range safe source rewriter.
//!
//! Applies a batch of edits addressed by byte offsets into the original
//! text, so every edit can be computed against the unmodified source.
//!
//! # Usage
//!
//! ```
//! use rmlogs::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "console.log(a); run();";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(Edit::replace(0..16, ""));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "run();");
//! ```

use std::ops::Range;
use thiserror::Error;

/// A single edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
}

impl Edit {
    /// Create a replacement edit.
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
        }
    }

    /// Create a replacement edit from a byte range.
    #[must_use]
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self::new(range.start, range.end, replacement)
    }

    /// Check if this edit overlaps with another.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two edits cover the same bytes.
    #[error("overlapping edits at indices {edit_a} and {edit_b}")]
    OverlappingEdits {
        /// Index of first overlapping edit
        edit_a: usize,
        /// Index of second overlapping edit
        edit_b: usize,
    },
    /// Edit range is out of bounds or reversed.
    #[error("edit {edit_index} out of bounds: {start_byte}..{end_byte} in source of length {source_len}")]
    OutOfBounds {
        /// Index of the bad edit
        edit_index: usize,
        /// Start byte of the edit
        start_byte: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// An edit boundary splits a UTF-8 character.
    #[error("edit {edit_index} does not fall on a character boundary")]
    NotCharBoundary {
        /// Index of the bad edit
        edit_index: usize,
    },
}

/// Applies non-overlapping byte-range edits to a source string.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    source: String,
    edits: Vec<Edit>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list.
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Add multiple edits.
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Validate edits without applying them.
    ///
    /// # Errors
    /// Returns error if edits overlap, are out of bounds, or split a character.
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (i, edit) in self.edits.iter().enumerate() {
            if edit.start_byte > edit.end_byte || edit.end_byte > self.source.len() {
                return Err(RewriteError::OutOfBounds {
                    edit_index: i,
                    start_byte: edit.start_byte,
                    end_byte: edit.end_byte,
                    source_len: self.source.len(),
                });
            }
            if !self.source.is_char_boundary(edit.start_byte)
                || !self.source.is_char_boundary(edit.end_byte)
            {
                return Err(RewriteError::NotCharBoundary { edit_index: i });
            }
        }

        let mut order: Vec<usize> = (0..self.edits.len()).collect();
        order.sort_by_key(|&i| (self.edits[i].start_byte, self.edits[i].end_byte));
        for pair in order.windows(2) {
            if self.edits[pair[0]].overlaps(&self.edits[pair[1]]) {
                return Err(RewriteError::OverlappingEdits {
                    edit_a: pair[0].min(pair[1]),
                    edit_b: pair[0].max(pair[1]),
                });
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source.
    ///
    /// The output is built in one pass over the edits in source order, so
    /// the cost is linear in the source length plus the replacement text.
    ///
    /// # Errors
    /// Returns error if the edits do not validate.
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut sorted_edits = self.edits;
        sorted_edits.sort_by_key(|edit| (edit.start_byte, edit.end_byte));

        let mut result = String::with_capacity(self.source.len());
        let mut copied = 0;
        for edit in &sorted_edits {
            result.push_str(&self.source[copied..edit.start_byte]);
            result.push_str(&edit.replacement);
            copied = edit.end_byte;
        }
        result.push_str(&self.source[copied..]);

        Ok(result)
    }
}
