use crate::output;
use crate::persist::{read_source, write_source, FileError};
use crate::rewrite::{Change, ChangeKind, LogRewriter, RewriteRules, SourceKind, TransformResult};
use crate::utils::normalize_display_path;

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag telling a running sweep to stop picking up files.
///
/// Checked before each file; a file that is already being transformed
/// always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every sweep sharing this flag to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`CancelFlag::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What happened to one file during the transform phase.
#[derive(Debug)]
pub enum FileStatus {
    /// The file was read and transformed (possibly without changes).
    Transformed(TransformResult),
    /// The file could not be read.
    Failed(FileError),
    /// The sweep was cancelled before this file was read.
    Cancelled,
}

/// Per-file result of [`sweep_files`].
#[derive(Debug)]
pub struct FileOutcome {
    /// File that was processed.
    pub path: PathBuf,
    /// Result of processing it.
    pub status: FileStatus,
}

impl FileOutcome {
    /// Whether writing this file back would change it.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        matches!(&self.status, FileStatus::Transformed(result) if result.is_modified())
    }
}

/// Reads and transforms `files` in parallel, returning outcomes in input order.
///
/// `.vue` files are transformed as components, everything else as script.
/// Nothing is written; see [`run_sweep`] for the full sweep.
#[must_use]
pub fn sweep_files(files: &[PathBuf], rules: &RewriteRules, cancel: &CancelFlag) -> Vec<FileOutcome> {
    sweep_files_with_progress(files, rules, cancel, &ProgressBar::hidden())
}

fn sweep_files_with_progress(
    files: &[PathBuf],
    rules: &RewriteRules,
    cancel: &CancelFlag,
    progress: &ProgressBar,
) -> Vec<FileOutcome> {
    let rewriter = LogRewriter::new(rules.clone());
    files
        .par_iter()
        .map(|path| {
            let status = if cancel.is_cancelled() {
                FileStatus::Cancelled
            } else {
                match read_source(path) {
                    Ok(source) => FileStatus::Transformed(
                        rewriter.rewrite_as(&source, SourceKind::from_path(path)),
                    ),
                    Err(e) => FileStatus::Failed(e),
                }
            };
            progress.inc(1);
            FileOutcome {
                path: path.clone(),
                status,
            }
        })
        .collect()
}

/// Options for a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Report what would change without writing.
    pub dry_run: bool,
    /// Emit the report as JSON instead of text.
    pub json: bool,
    /// Print only the summary.
    pub quiet: bool,
    /// Print `[VERBOSE]` diagnostics on stderr.
    pub verbose: bool,
    /// Directory no write may escape.
    pub root: Option<PathBuf>,
}

/// Final state of a file after a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// Changed (or would change, in a dry run).
    Changed,
    /// Nothing to change.
    Unchanged,
    /// Reading or writing failed.
    Failed,
    /// Not processed because the sweep was cancelled.
    Cancelled,
}

/// Report entry for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Display path.
    pub file: String,
    /// Final state.
    pub state: FileState,
    /// Statements removed.
    pub deleted: usize,
    /// Calls redirected to the replacement function.
    pub rewritten: usize,
    /// Matches left untouched.
    pub skipped: usize,
    /// Applied changes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    /// Error message for failed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn without_changes(file: String, state: FileState, error: Option<String>) -> Self {
        Self {
            file,
            state,
            deleted: 0,
            rewritten: 0,
            skipped: 0,
            changes: Vec::new(),
            error,
        }
    }
}

/// Totals over a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Files handed to the sweep.
    pub files_scanned: usize,
    /// Files changed (or that would change).
    pub files_changed: usize,
    /// Statements removed.
    pub deleted: usize,
    /// Calls rewritten.
    pub rewritten: usize,
    /// Matches left untouched.
    pub skipped: usize,
    /// Files that could not be read or written.
    pub failed: usize,
    /// Files not processed because of cancellation.
    pub cancelled: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Everything a sweep reports.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Function that was removed.
    pub target_function: String,
    /// Function used inside handlers.
    pub replacement_function: String,
    /// Totals.
    pub summary: SweepSummary,
    /// Files that changed, failed, were cancelled or had skipped matches.
    pub files: Vec<FileReport>,
}

impl SweepReport {
    fn new(rules: &RewriteRules, files_scanned: usize, dry_run: bool) -> Self {
        Self {
            target_function: rules.target_function.clone(),
            replacement_function: rules.replacement_function.clone(),
            summary: SweepSummary {
                files_scanned,
                dry_run,
                ..SweepSummary::default()
            },
            files: Vec::new(),
        }
    }

    fn push(&mut self, file: FileReport) {
        match file.state {
            FileState::Changed => self.summary.files_changed += 1,
            FileState::Failed => self.summary.failed += 1,
            FileState::Cancelled => self.summary.cancelled += 1,
            FileState::Unchanged => {}
        }
        self.summary.deleted += file.deleted;
        self.summary.rewritten += file.rewritten;
        self.summary.skipped += file.skipped;
        if file.state != FileState::Unchanged || file.skipped > 0 {
            self.files.push(file);
        }
    }

    /// Whether any file failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Whether any file changed (or would change).
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.summary.files_changed > 0
    }
}

/// Sweeps `files`: transforms them in parallel, then writes changed files
/// back one by one unless this is a dry run.
///
/// Failures are recorded in the report and never abort the sweep.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn run_sweep<W: Write>(
    files: &[PathBuf],
    rules: &RewriteRules,
    options: &SweepOptions,
    cancel: &CancelFlag,
    mut writer: W,
) -> Result<SweepReport> {
    let progress = if options.json || options.quiet {
        ProgressBar::hidden()
    } else {
        output::create_progress_bar(files.len() as u64)
    };
    let outcomes = sweep_files_with_progress(files, rules, cancel, &progress);
    progress.finish_and_clear();

    let verbose = options.verbose && !options.json;
    let preview = !options.json && !options.quiet;
    let mut report = SweepReport::new(rules, files.len(), options.dry_run);

    if preview && outcomes.iter().any(FileOutcome::is_modified) {
        if options.dry_run {
            writeln!(
                writer,
                "\n{}",
                "[DRY-RUN] Changes that would be made:".yellow()
            )?;
        } else {
            writeln!(writer, "\n{}", "Applying changes...".cyan())?;
        }
    }

    for outcome in outcomes {
        let display = normalize_display_path(&outcome.path);
        let entry = match outcome.status {
            FileStatus::Cancelled => {
                FileReport::without_changes(display, FileState::Cancelled, None)
            }
            FileStatus::Failed(e) => {
                if verbose {
                    eprintln!("[VERBOSE] {e}");
                }
                FileReport::without_changes(display, FileState::Failed, Some(e.to_string()))
            }
            FileStatus::Transformed(result) => {
                if verbose {
                    eprintln!("[VERBOSE] Processed {display}");
                    for skipped in &result.skipped {
                        eprintln!(
                            "[VERBOSE]   left {} at {display}:{} unchanged ({})",
                            rules.target_function, skipped.line, skipped.reason
                        );
                    }
                }
                finish_file(
                    &mut writer,
                    &outcome.path,
                    display,
                    result,
                    rules,
                    options,
                    preview,
                )?
            }
        };
        report.push(entry);
    }

    Ok(report)
}

/// Previews or writes one transformed file and builds its report entry.
fn finish_file<W: Write>(
    writer: &mut W,
    path: &Path,
    display: String,
    result: TransformResult,
    rules: &RewriteRules,
    options: &SweepOptions,
    preview: bool,
) -> Result<FileReport> {
    let mut entry = FileReport {
        file: display,
        state: FileState::Unchanged,
        deleted: result.deleted_count,
        rewritten: result.rewritten_count,
        skipped: result.skipped.len(),
        changes: Vec::new(),
        error: None,
    };
    if !result.is_modified() {
        return Ok(entry);
    }

    if options.dry_run {
        if preview {
            for change in &result.changes {
                print_change(writer, change, rules, &entry.file)?;
            }
        }
    } else if let Err(e) = write_source(path, options.root.as_deref(), &result.rewritten_text) {
        if preview {
            writeln!(writer, "  {} {}", "Failed:".red(), e)?;
        }
        entry.state = FileState::Failed;
        entry.error = Some(e.to_string());
        entry.deleted = 0;
        entry.rewritten = 0;
        return Ok(entry);
    } else if preview {
        writeln!(
            writer,
            "  {} {} ({} removed, {} rewritten)",
            "Fixed:".green(),
            entry.file,
            result.deleted_count,
            result.rewritten_count
        )?;
    }

    entry.state = FileState::Changed;
    entry.changes = result.changes;
    Ok(entry)
}

fn print_change<W: Write>(
    writer: &mut W,
    change: &Change,
    rules: &RewriteRules,
    file: &str,
) -> Result<()> {
    match change.kind {
        ChangeKind::Deleted => writeln!(
            writer,
            "  Would remove {} at {}:{}",
            rules.target_function, file, change.line
        )?,
        ChangeKind::Rewritten => writeln!(
            writer,
            "  Would rewrite {} to {} at {}:{}",
            rules.target_function, rules.replacement_function, file, change.line
        )?,
    }
    Ok(())
}
