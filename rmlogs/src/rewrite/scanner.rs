//! Lexical region scanner.
//!
//! A single left-to-right pass that tags every byte of the source as code,
//! comment, or literal. Only the non-code spans are stored; anything not
//! covered by a span is code.

use std::ops::Range;

/// Lexical class of a span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalRegion {
    /// Ordinary code.
    Code,
    /// `// ...` up to (not including) the newline.
    LineComment,
    /// `/* ... */`, delimiters included.
    BlockComment,
    /// `'...'` or `"..."`, quotes included.
    StringLiteral,
    /// `` `...` ``, backticks included. Interpolations are not code.
    TemplateLiteral,
}

/// A non-code span of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// What kind of text the span holds.
    pub kind: LexicalRegion,
    /// Byte range of the span. Unterminated spans end at end of input.
    pub range: Range<usize>,
}

/// Sorted, non-overlapping list of the non-code regions of a source.
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    /// Scans `source` and records every comment and literal.
    #[must_use]
    pub fn scan(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut regions = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let start = i;
            let kind = match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = find_byte(bytes, i + 2, b'\n');
                    LexicalRegion::LineComment
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = find_block_end(bytes, i + 2);
                    LexicalRegion::BlockComment
                }
                quote @ (b'\'' | b'"') => {
                    i = find_quote_end(bytes, i + 1, quote);
                    LexicalRegion::StringLiteral
                }
                b'`' => {
                    i = find_quote_end(bytes, i + 1, b'`');
                    LexicalRegion::TemplateLiteral
                }
                _ => {
                    i += 1;
                    continue;
                }
            };
            regions.push(Region {
                kind,
                range: start..i,
            });
        }

        Self { regions }
    }

    /// Region kind of the byte at `offset`. Offsets past the end are `Code`.
    #[must_use]
    pub fn kind_at(&self, offset: usize) -> LexicalRegion {
        self.region_containing(offset)
            .map_or(LexicalRegion::Code, |r| r.kind)
    }

    /// Whether the byte at `offset` is ordinary code.
    #[must_use]
    pub fn is_code(&self, offset: usize) -> bool {
        self.region_containing(offset).is_none()
    }

    /// The non-code region containing `offset`, if any.
    #[must_use]
    pub fn region_containing(&self, offset: usize) -> Option<&Region> {
        let idx = self.regions.partition_point(|r| r.range.end <= offset);
        self.regions
            .get(idx)
            .filter(|r| r.range.start <= offset && offset < r.range.end)
    }

    /// All recorded non-code regions, ordered by start offset.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map_or(bytes.len(), |p| from + p)
}

fn find_block_end(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// Offset just past the closing `quote`, honoring backslash escapes.
fn find_quote_end(bytes: &[u8], from: usize, quote: u8) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
