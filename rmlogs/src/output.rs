use crate::commands::{FileState, SweepReport, SweepSummary};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let defaults = crate::constants::DEFAULT_EXCLUDE_FOLDERS();
        let mut sorted_defaults: Vec<&str> = defaults.iter().copied().collect();
        sorted_defaults.sort_unstable();
        let list = sorted_defaults.join(", ");
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            list.dimmed()
        )?;
    } else {
        let list = folders
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(writer, "{} {}", "Excluding:".yellow().bold(), list)?;
    }
    Ok(())
}

/// Create a progress bar with file count.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("sweeping...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick(); // Force initial draw
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write, dry_run: bool) -> std::io::Result<()> {
    let title = if dry_run {
        "║  Log Sweep Preview (dry run)           ║"
    } else {
        "║  Log Sweep Results                     ║"
    };
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(writer, "{}", title.cyan().bold())?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(
    writer: &mut impl Write,
    summary: &SweepSummary,
) -> std::io::Result<()> {
    fn pill(label: &str, count: usize, bad: bool) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().green())
        } else if bad {
            format!("{}: {}", label, count.to_string().red().bold())
        } else {
            format!("{}: {}", label, count.to_string().yellow().bold())
        }
    }

    writeln!(
        writer,
        "{}  {}  {}  {}",
        pill("Removed", summary.deleted, false),
        pill("Rewritten", summary.rewritten, false),
        pill("Skipped", summary.skipped, false),
        pill("Failed", summary.failed, true),
    )?;
    writeln!(
        writer,
        "{}",
        format!(
            "Scanned {} files, {} changed",
            summary.files_scanned.to_string().bold(),
            summary.files_changed.to_string().bold()
        )
        .dimmed()
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Helper to create a styled table
fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn state_cell(state: FileState) -> Cell {
    match state {
        FileState::Changed => Cell::new("changed").fg(Color::Green),
        FileState::Unchanged => Cell::new("unchanged"),
        FileState::Failed => Cell::new("failed")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        FileState::Cancelled => Cell::new("cancelled").fg(Color::Yellow),
    }
}

/// Print the per-file table of a sweep.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_table(writer: &mut impl Write, report: &SweepReport) -> std::io::Result<()> {
    if report.files.is_empty() {
        return Ok(());
    }

    let mut table = create_table(vec!["File", "State", "Removed", "Rewritten", "Skipped"]);
    for file in &report.files {
        table.add_row(vec![
            Cell::new(&file.file).add_attribute(Attribute::Bold),
            state_cell(file.state),
            Cell::new(file.deleted),
            Cell::new(file.rewritten),
            Cell::new(file.skipped),
        ]);
    }
    writeln!(writer, "{table}")?;

    let failures: Vec<_> = report
        .files
        .iter()
        .filter_map(|f| f.error.as_deref())
        .collect();
    if !failures.is_empty() {
        writeln!(writer, "\n{}", "Failures:".red().bold())?;
        for error in failures {
            writeln!(writer, "  {error}")?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

/// The closing summary line, e.g. `Removed console.log from 3 files.`
#[must_use]
pub fn summary_line(report: &SweepReport) -> String {
    let verb = if report.summary.dry_run {
        "Would remove"
    } else {
        "Removed"
    };
    format!(
        "{verb} {} from {} files.",
        report.target_function, report.summary.files_changed
    )
}

/// Print the full sweep report.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_report(writer: &mut impl Write, report: &SweepReport) -> std::io::Result<()> {
    print_header(writer, report.summary.dry_run)?;
    print_summary_pills(writer, &report.summary)?;
    print_file_table(writer, report)?;
    writeln!(writer, "{}", summary_line(report))?;
    Ok(())
}

/// Print a quiet report (summary line only) for CI/CD mode.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_report_quiet(writer: &mut impl Write, report: &SweepReport) -> std::io::Result<()> {
    writeln!(writer, "{}", summary_line(report))?;
    if report.has_failures() {
        writeln!(
            writer,
            "{} {} files failed",
            "[ERROR]".red().bold(),
            report.summary.failed
        )?;
    }
    Ok(())
}
