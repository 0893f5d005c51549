use crate::persist::read_source;
use crate::rewrite::{LogRewriter, RewriteRules, SourceKind};
use crate::utils::{normalize_display_path, LineIndex};

use anyhow::Result;
use comfy_table::Table;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// One row of the `files` listing.
#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    /// Display path.
    pub file: String,
    /// Number of lines.
    pub lines: usize,
    /// Call statements a sweep would remove or rewrite.
    pub calls: usize,
    /// Matches a sweep would leave alone.
    pub skipped: usize,
    /// File size in KiB.
    pub size_kb: f64,
}

/// Executes the files command - lists candidate files with their call counts.
///
/// Unreadable files are listed with zero counts.
///
/// # Errors
///
/// Returns an error if writing to the output or JSON serialization fails.
#[allow(clippy::cast_precision_loss)]
pub fn run_files<W: Write>(
    files: &[PathBuf],
    rules: &RewriteRules,
    json: bool,
    mut writer: W,
) -> Result<Vec<FileListing>> {
    let rewriter = LogRewriter::new(rules.clone());
    let listings: Vec<FileListing> = files
        .par_iter()
        .map(|path| {
            let (lines, calls, skipped) = match read_source(path) {
                Ok(source) => {
                    let result = rewriter.rewrite_as(&source, SourceKind::from_path(path));
                    (
                        LineIndex::new(&source).line_count(),
                        result.changes.len(),
                        result.skipped.len(),
                    )
                }
                Err(_) => (0, 0, 0),
            };
            let size_bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            FileListing {
                file: normalize_display_path(path),
                lines,
                calls,
                skipped,
                size_kb: size_bytes as f64 / 1024.0,
            }
        })
        .collect();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&listings)?)?;
    } else if listings.is_empty() {
        writeln!(writer, "No matching files found.")?;
    } else {
        let mut table = Table::new();
        table.set_header(vec!["File", "Lines", "Calls", "Skipped", "Size (KB)"]);
        for f in &listings {
            table.add_row(vec![
                f.file.clone(),
                f.lines.to_string(),
                f.calls.to_string(),
                f.skipped.to_string(),
                format!("{:.2}", f.size_kb),
            ]);
        }
        writeln!(writer, "{table}")?;
        writeln!(writer, "{} files", listings.len())?;
    }

    Ok(listings)
}
