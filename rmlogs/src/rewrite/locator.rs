//! Call-site locator.
//!
//! Finds call statements of the target function in code regions and
//! resolves their full extent with balanced-parenthesis matching.

use super::classifier::BlockCursor;
use super::scanner::{LexicalRegion, RegionMap};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A located call statement of the target function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence<'a> {
    /// Offset of the first byte of the function name.
    pub start: usize,
    /// End of the statement (exclusive): after `)`, or after `;` when present.
    pub end: usize,
    /// Raw text between the call's parentheses.
    pub arguments: &'a str,
    /// Whether the statement carried its own `;`.
    pub has_semicolon: bool,
    /// Offset of the first byte of the line holding the call.
    pub line_start: usize,
    /// Whether only indentation precedes the call on its line.
    pub starts_line: bool,
    /// Span removed when the call is deleted.
    pub removal: Range<usize>,
}

/// Why a textual match was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No matching `)` before the end of input.
    Unbalanced,
    /// The call is part of a larger expression or an unbraced body.
    NotStatement,
    /// The call result is used by whatever follows it.
    TrailingExpression,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unbalanced => "unbalanced parentheses",
            Self::NotStatement => "not a statement",
            Self::TrailingExpression => "result is used",
        })
    }
}

/// A textual match of the target that is not safe to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedCall {
    /// Offset of the function name.
    pub start: usize,
    /// Reason the call was skipped.
    pub reason: SkipReason,
}

/// Result of locating call sites in one source.
#[derive(Debug, Clone, Default)]
pub struct Located<'a> {
    /// Ordered, non-overlapping occurrences.
    pub occurrences: Vec<Occurrence<'a>>,
    /// Matches that were left untouched.
    pub skipped: Vec<SkippedCall>,
}

/// Bytes that make the next line continue the previous expression.
const CONTINUATION_BYTES: &[u8] = b".([?,+-*/%=&|<>";

/// Locates every call statement of `target` in the code regions of `source`.
#[must_use]
pub fn locate<'a>(source: &'a str, regions: &RegionMap, target: &str) -> Located<'a> {
    let mut located = Located::default();
    if target.is_empty() {
        return located;
    }

    let bytes = source.as_bytes();
    let checks_boundary = target.bytes().next().is_some_and(is_ident_byte);
    let mut cursor = BlockCursor::new(source, regions, "");
    let mut from = 0;

    while let Some(rel) = source[from..].find(target) {
        let start = from + rel;
        let after_name = start + target.len();
        from = after_name;

        if !regions.is_code(start) {
            continue;
        }
        if checks_boundary && start > 0 && is_name_continuation(bytes[start - 1]) {
            continue;
        }
        let open = skip_whitespace(bytes, after_name);
        if bytes.get(open) != Some(&b'(') {
            continue;
        }

        let Some(close) = matching_paren(bytes, regions, open) else {
            located.skipped.push(SkippedCall {
                start,
                reason: SkipReason::Unbalanced,
            });
            continue;
        };

        cursor.advance_to(start);
        let previous = located.occurrences.last().map(|o| o.start..o.end);
        if !is_statement_position(bytes, &cursor, previous) {
            located.skipped.push(SkippedCall {
                start,
                reason: SkipReason::NotStatement,
            });
            continue;
        }

        let Some((end, has_semicolon)) = statement_end(bytes, regions, close) else {
            located.skipped.push(SkippedCall {
                start,
                reason: SkipReason::TrailingExpression,
            });
            continue;
        };

        let line_start = cursor.line_start();
        let starts_line = bytes[line_start..start].iter().all(|&b| is_hspace(b));
        let removal = removal_span(bytes, start, end, line_start, starts_line);

        from = removal.end.max(end);
        located.occurrences.push(Occurrence {
            start,
            end,
            arguments: &source[open + 1..close],
            has_semicolon,
            line_start,
            starts_line,
            removal,
        });
    }

    located
}

/// Offset of the `)` matching the `(` at `open`, counting only code bytes.
fn matching_paren(bytes: &[u8], regions: &RegionMap, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(region) = regions.region_containing(i) {
            i = region.range.end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// A call is a statement when the previous code byte ends a statement,
/// opens a block, or closes the previously accepted call statement, and no
/// bracket group is left open around it.
fn is_statement_position(
    bytes: &[u8],
    cursor: &BlockCursor<'_>,
    previous: Option<Range<usize>>,
) -> bool {
    let previous_ok = match cursor.last_code() {
        None => true,
        Some(i) if previous.is_some_and(|span| span.contains(&i)) => true,
        Some(i) => matches!(bytes[i], b';' | b'{' | b'}'),
    };
    previous_ok && !cursor.inside_open_group()
}

/// Resolves where the statement ends after the closing paren at `close`.
///
/// Returns `None` when the call's value flows into a larger expression.
fn statement_end(bytes: &[u8], regions: &RegionMap, close: usize) -> Option<(usize, bool)> {
    let after = close + 1;
    let next = skip_hspace(bytes, after);
    match bytes.get(next) {
        Some(b';') => Some((next + 1, true)),
        Some(b'}') | None => Some((after, false)),
        Some(b'\n' | b'\r' | b'/') => {
            if bytes[next] == b'/' && regions.is_code(next) {
                return None;
            }
            match next_significant(bytes, regions, next) {
                Some(i) if continues_expression(bytes, regions, i) => None,
                _ => Some((after, false)),
            }
        }
        Some(_) => None,
    }
}

fn continues_expression(bytes: &[u8], regions: &RegionMap, i: usize) -> bool {
    if regions.kind_at(i) == LexicalRegion::TemplateLiteral {
        return true;
    }
    regions.is_code(i) && CONTINUATION_BYTES.contains(&bytes[i])
}

fn removal_span(
    bytes: &[u8],
    start: usize,
    end: usize,
    line_start: usize,
    starts_line: bool,
) -> Range<usize> {
    let rest = skip_hspace(bytes, end);
    let line_end = match bytes.get(rest) {
        None => Some(rest),
        Some(b'\n') => Some(rest + 1),
        Some(b'\r') if bytes.get(rest + 1) == Some(&b'\n') => Some(rest + 2),
        _ => None,
    };
    match line_end {
        Some(line_end) if starts_line => line_start..line_end,
        Some(_) => start..rest,
        None => start..end,
    }
}

fn next_significant(bytes: &[u8], regions: &RegionMap, from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match regions.region_containing(i) {
            Some(region) if region.kind != LexicalRegion::StringLiteral
                && region.kind != LexicalRegion::TemplateLiteral =>
            {
                i = region.range.end;
            }
            Some(_) => return Some(i),
            None if bytes[i].is_ascii_whitespace() => i += 1,
            None => return Some(i),
        }
    }
    None
}

fn skip_whitespace(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn skip_hspace(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() && is_hspace(bytes[i]) {
        i += 1;
    }
    i
}

const fn is_hspace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Identifier byte; non-ASCII bytes count so `ñconsole.log` is not a match.
pub(crate) const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_name_continuation(b: u8) -> bool {
    is_ident_byte(b) || b == b'.'
}
