//! Log call rewriting.
//!
//! Removes calls to the target logging function from a source text, and
//! turns the ones inside error-handling blocks into calls to the
//! replacement function. The pipeline is:
//!
//! 1. [`scanner`] tags comments and literals so they are never touched;
//! 2. [`locator`] finds call statements and their exact extent;
//! 3. [`classifier`] decides whether each call sits inside a handler;
//! 4. the edits are applied with [`crate::fix::ByteRangeRewriter`].
//!
//! Single-file components are handled by [`component`], which runs the
//! same pipeline over each `<script>` body.
//!
//! Everything here is a pure function of the text and the rules. Anything
//! ambiguous is left as it was.
//!
//! ```
//! use rmlogs::rewrite::{transform, RewriteRules};
//!
//! let result = transform("try { f(); } catch (e) { console.log(e); }", &RewriteRules::default());
//! assert_eq!(result.rewritten_text, "try { f(); } catch (e) { \n console.error(e); }");
//! assert_eq!(result.rewritten_count, 1);
//! ```

pub mod classifier;
pub mod component;
pub mod locator;
pub mod scanner;

pub use classifier::{classify, BlockCursor, EnclosingBlock, Placement};
pub use component::{script_blocks, transform_component};
pub use locator::{locate, Located, Occurrence, SkipReason, SkippedCall};
pub use scanner::{LexicalRegion, Region, RegionMap};

use crate::constants::{
    get_function_name_re, get_keyword_re, DEFAULT_ERROR_HANDLER_KEYWORD,
    DEFAULT_REPLACEMENT_FUNCTION, DEFAULT_TARGET_FUNCTION,
};
use crate::fix::{ByteRangeRewriter, Edit};
use crate::utils::LineIndex;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// What to look for and what to turn it into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRules {
    /// Function whose call statements are removed, e.g. `console.log`.
    pub target_function: String,
    /// Function used inside error handlers, e.g. `console.error`.
    pub replacement_function: String,
    /// Keyword introducing an error-handling block, e.g. `catch`.
    pub error_handler_keyword: String,
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self {
            target_function: DEFAULT_TARGET_FUNCTION.to_owned(),
            replacement_function: DEFAULT_REPLACEMENT_FUNCTION.to_owned(),
            error_handler_keyword: DEFAULT_ERROR_HANDLER_KEYWORD.to_owned(),
        }
    }
}

/// Rule combinations the command line refuses to run with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// Nothing to search for.
    #[error("target function must not be empty")]
    EmptyTarget,
    /// Rewriting a call into itself would never settle.
    #[error("replacement function must differ from target function '{0}'")]
    SameFunction(String),
    /// Not a dotted identifier path.
    #[error("'{0}' is not a function name (expected something like console.log)")]
    InvalidFunctionName(String),
    /// Not a single identifier.
    #[error("'{0}' is not a keyword (expected something like catch)")]
    InvalidKeyword(String),
}

impl RewriteRules {
    /// Checks that the rules describe a meaningful rewrite.
    ///
    /// # Errors
    /// Returns an error for an empty target, a replacement equal to the
    /// target, or names that are not identifiers.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.target_function.trim().is_empty() {
            return Err(RulesError::EmptyTarget);
        }
        for name in [&self.target_function, &self.replacement_function] {
            if !get_function_name_re().is_match(name) {
                return Err(RulesError::InvalidFunctionName(name.clone()));
            }
        }
        if !get_keyword_re().is_match(&self.error_handler_keyword) {
            return Err(RulesError::InvalidKeyword(
                self.error_handler_keyword.clone(),
            ));
        }
        if self.target_function == self.replacement_function {
            return Err(RulesError::SameFunction(self.target_function.clone()));
        }
        Ok(())
    }
}

/// What happened to one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The statement was removed.
    Deleted,
    /// The call was redirected to the replacement function.
    Rewritten,
}

/// One applied change, located in the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// 1-indexed line of the call in the original text.
    pub line: usize,
    /// Deleted or rewritten.
    pub kind: ChangeKind,
    /// Handler parameter in scope, for rewrites.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_parameter: Option<String>,
}

/// A match left untouched, located in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// 1-indexed line of the match.
    pub line: usize,
    /// Why it was left alone.
    pub reason: SkipReason,
}

/// Outcome of transforming one source text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformResult {
    /// Output text; equal to the input when nothing changed.
    pub rewritten_text: String,
    /// Number of statements removed.
    pub deleted_count: usize,
    /// Number of calls redirected to the replacement function.
    pub rewritten_count: usize,
    /// Applied changes in source order.
    pub changes: Vec<Change>,
    /// Matches left untouched because they could not be resolved safely.
    pub skipped: Vec<Skipped>,
}

impl TransformResult {
    fn unchanged(source: &str) -> Self {
        Self {
            rewritten_text: source.to_owned(),
            ..Self::default()
        }
    }

    /// Whether the output differs from the input.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.deleted_count + self.rewritten_count > 0
    }
}

/// How a file's text is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The whole file is script.
    Script,
    /// A single-file component; only `<script>` bodies are script.
    Component,
}

impl SourceKind {
    /// `.vue` files are components, everything else is script.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let is_component = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("vue"));
        if is_component {
            Self::Component
        } else {
            Self::Script
        }
    }
}

/// Rewrites log calls according to a fixed set of rules.
#[derive(Debug, Clone, Default)]
pub struct LogRewriter {
    rules: RewriteRules,
}

impl LogRewriter {
    /// Creates a rewriter for `rules`.
    #[must_use]
    pub fn new(rules: RewriteRules) -> Self {
        Self { rules }
    }

    /// The rules this rewriter applies.
    #[must_use]
    pub fn rules(&self) -> &RewriteRules {
        &self.rules
    }

    /// Transforms `source`. Never fails; see [`transform`].
    #[must_use]
    pub fn rewrite(&self, source: &str) -> TransformResult {
        transform(source, &self.rules)
    }

    /// Transforms `source` laid out as `kind`.
    #[must_use]
    pub fn rewrite_as(&self, source: &str, kind: SourceKind) -> TransformResult {
        match kind {
            SourceKind::Script => transform(source, &self.rules),
            SourceKind::Component => transform_component(source, &self.rules),
        }
    }
}

/// Transforms one source text.
///
/// Calls inside an error handler become calls to the replacement function
/// with their argument text untouched; all other call statements are
/// removed. Text outside the affected statements is copied byte for byte.
#[must_use]
pub fn transform(source: &str, rules: &RewriteRules) -> TransformResult {
    let regions = RegionMap::scan(source);
    let located = locate(source, &regions, &rules.target_function);
    let line_index = LineIndex::new(source);
    let skipped: Vec<Skipped> = located
        .skipped
        .iter()
        .map(|call| Skipped {
            line: line_index.line_number(call.start),
            reason: call.reason,
        })
        .collect();
    if located.occurrences.is_empty() {
        return TransformResult {
            skipped,
            ..TransformResult::unchanged(source)
        };
    }

    let mut edits = Vec::with_capacity(located.occurrences.len());
    let mut changes = Vec::with_capacity(located.occurrences.len());
    let mut cursor = BlockCursor::new(source, &regions, &rules.error_handler_keyword);

    for occurrence in &located.occurrences {
        let line = line_index.line_number(occurrence.start);
        cursor.advance_to(occurrence.start);
        match cursor.placement() {
            Placement::InsideHandler(block) => {
                edits.push(Edit::new(
                    occurrence.start,
                    occurrence.end,
                    replacement_call(source, occurrence, &rules.replacement_function),
                ));
                changes.push(Change {
                    line,
                    kind: ChangeKind::Rewritten,
                    handler_parameter: block.parameter,
                });
            }
            Placement::Elsewhere => {
                edits.push(Edit::replace(occurrence.removal.clone(), ""));
                changes.push(Change {
                    line,
                    kind: ChangeKind::Deleted,
                    handler_parameter: None,
                });
            }
        }
    }

    let mut rewriter = ByteRangeRewriter::new(source);
    rewriter.add_edits(edits);
    let Ok(rewritten_text) = rewriter.apply() else {
        return TransformResult {
            skipped,
            ..TransformResult::unchanged(source)
        };
    };

    let rewritten_count = changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Rewritten)
        .count();
    TransformResult {
        rewritten_text,
        deleted_count: changes.len() - rewritten_count,
        rewritten_count,
        changes,
        skipped,
    }
}

/// Text replacing a call inside a handler.
///
/// A call sharing its line with earlier code moves to a new line, indented
/// one space past the line it came from, using that line's terminator.
fn replacement_call(source: &str, occurrence: &Occurrence<'_>, function: &str) -> String {
    let semicolon = if occurrence.has_semicolon { ";" } else { "" };
    let call = format!("{function}({}){semicolon}", occurrence.arguments);
    if occurrence.starts_line {
        return call;
    }
    let indent: String = source[occurrence.line_start..occurrence.start]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    let newline = line_break(source.as_bytes(), occurrence);
    format!("{newline}{indent} {call}")
}

/// Terminator of the occurrence's line, or of the line above it when the
/// occurrence is on the last line.
fn line_break(bytes: &[u8], occurrence: &Occurrence<'_>) -> &'static str {
    let crlf_at = |nl: usize| nl > 0 && bytes[nl - 1] == b'\r';
    let is_crlf = match bytes[occurrence.end..].iter().position(|&b| b == b'\n') {
        Some(rel) => crlf_at(occurrence.end + rel),
        None => occurrence.line_start > 0 && crlf_at(occurrence.line_start - 1),
    };
    if is_crlf {
        "\r\n"
    } else {
        "\n"
    }
}
