//! Utilities module for rmlogs.
//!
//! Line bookkeeping for reports and the path helpers used by the file
//! enumerator and the persistence adapter.

mod paths;

pub use paths::{
    collect_source_files, has_allowed_extension, is_excluded, normalize_display_path,
    validate_path_within_root, WalkOptions,
};

/// Converts byte offsets to line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source for newlines.
    /// '\n' is always a single byte in UTF-8, so bytes are scanned directly.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-indexed line containing the byte at `offset`.
    #[must_use]
    pub fn line_number(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Number of lines in the source.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
