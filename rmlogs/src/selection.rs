//! Interactive file selection.
//!
//! Presents the discovered files as a numbered list and reads an answer
//! such as `1,3-5` (keep those) or `!2` (keep everything but those). An
//! empty answer keeps every file.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::utils::normalize_display_path;

/// Which entries of a numbered list the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every entry.
    All,
    /// Only these 0-based indices.
    Include(Vec<usize>),
    /// Every entry except these 0-based indices.
    Exclude(Vec<usize>),
}

/// An answer that does not describe a selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// A part that is neither a number nor a range.
    #[error("'{0}' is not a number or range")]
    NotANumber(String),
    /// A number outside `1..=count`.
    #[error("{index} is out of range (1-{count})")]
    OutOfRange {
        /// The offending 1-based number.
        index: usize,
        /// Number of entries in the list.
        count: usize,
    },
    /// A range whose start is past its end.
    #[error("range '{0}' is reversed")]
    ReversedRange(String),
}

impl Selection {
    /// Parses an answer against a list of `count` entries.
    ///
    /// # Errors
    /// Returns an error for malformed parts or numbers outside the list.
    pub fn parse(answer: &str, count: usize) -> Result<Self, SelectionError> {
        let answer = answer.trim();
        if answer.is_empty() || answer == "*" || answer.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let (negated, body) = match answer.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, answer),
        };

        let mut indices = Vec::new();
        for part in body.split(|c: char| c == ',' || c.is_whitespace()) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((from, to)) = part.split_once('-') {
                let from = parse_index(from, count)?;
                let to = parse_index(to, count)?;
                if from > to {
                    return Err(SelectionError::ReversedRange(part.to_owned()));
                }
                indices.extend(from..=to);
            } else {
                indices.push(parse_index(part, count)?);
            }
        }
        indices.sort_unstable();
        indices.dedup();

        Ok(if negated {
            Self::Exclude(indices)
        } else {
            Self::Include(indices)
        })
    }

    /// Keeps the picked entries of `items`, preserving their order.
    #[must_use]
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        match self {
            Self::All => items.to_vec(),
            Self::Include(picked) => items
                .iter()
                .enumerate()
                .filter(|(i, _)| picked.binary_search(i).is_ok())
                .map(|(_, item)| item.clone())
                .collect(),
            Self::Exclude(dropped) => items
                .iter()
                .enumerate()
                .filter(|(i, _)| dropped.binary_search(i).is_err())
                .map(|(_, item)| item.clone())
                .collect(),
        }
    }
}

/// Parses a 1-based number into a 0-based index.
fn parse_index(text: &str, count: usize) -> Result<usize, SelectionError> {
    let text = text.trim();
    let index: usize = text
        .parse()
        .map_err(|_| SelectionError::NotANumber(text.to_owned()))?;
    if index == 0 || index > count {
        return Err(SelectionError::OutOfRange { index, count });
    }
    Ok(index - 1)
}

/// Prints `files` as a numbered list and asks which to process.
///
/// Invalid answers are reported and asked again. End of input selects
/// nothing.
///
/// # Errors
/// Returns an error if reading the answer or writing the prompt fails.
pub fn prompt_selection<R: BufRead, W: Write>(
    files: &[PathBuf],
    reader: &mut R,
    writer: &mut W,
) -> anyhow::Result<Vec<PathBuf>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    writeln!(writer, "Files to process:")?;
    let width = files.len().to_string().len();
    for (i, file) in files.iter().enumerate() {
        writeln!(
            writer,
            "  {:>width$}) {}",
            i + 1,
            normalize_display_path(file)
        )?;
    }

    loop {
        write!(
            writer,
            "Select files (e.g. 1,3-5 or !2; empty for all): "
        )?;
        writer.flush()?;

        let mut answer = String::new();
        if reader.read_line(&mut answer)? == 0 {
            writeln!(writer)?;
            return Ok(Vec::new());
        }
        match Selection::parse(&answer, files.len()) {
            Ok(selection) => return Ok(selection.apply(files)),
            Err(e) => writeln!(writer, "Invalid selection: {e}")?,
        }
    }
}
