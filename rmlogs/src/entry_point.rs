use crate::cli::{Cli, Commands, RuleOverrides};
use crate::commands::{CancelFlag, SweepOptions};
use crate::config::Config;
use crate::rewrite::RewriteRules;
use crate::utils::{collect_source_files, WalkOptions};
use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Run rmlogs with the given arguments.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if the command execution fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    let stdin = std::io::stdin();
    run_with_args_io(args, &mut stdin.lock(), &mut std::io::stdout())
}

/// Run rmlogs with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Interactive selection reads from stdin.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if the command execution fails.
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let stdin = std::io::stdin();
    run_with_args_io(args, &mut stdin.lock(), writer)
}

/// Run rmlogs with the given arguments, reading answers from `reader` and
/// writing output to `writer`.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if the command execution fails.
pub fn run_with_args_io<R: BufRead, W: Write>(
    args: Vec<String>,
    reader: &mut R,
    writer: &mut W,
) -> Result<i32> {
    let mut program_args = vec!["rmlogs".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    if matches!(cli_var.command, Some(Commands::Init)) {
        crate::commands::run_init(writer)?;
        return Ok(0);
    }

    let targets = match &cli_var.command {
        Some(Commands::Files { paths, .. }) => paths.targets(),
        _ => cli_var.paths.targets(),
    };
    for path in &targets {
        if !path.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                path.display()
            );
            return Ok(1);
        }
    }

    // Load config from the first path or current directory
    let config_path = targets.first().map_or(Path::new("."), PathBuf::as_path);
    let config = Config::load_from_path(config_path);
    let rules = resolve_rules(&config, &cli_var.rules);
    if let Err(e) = rules.validate() {
        eprintln!("Error: {e}");
        return Ok(1);
    }

    let mut exclude_folders = config.rmlogs.exclude_folders.clone().unwrap_or_default();
    exclude_folders.extend(cli_var.rules.exclude_folders.iter().cloned());
    let mut include_folders = config.rmlogs.include_folders.clone().unwrap_or_default();
    include_folders.extend(cli_var.rules.include_folders.iter().cloned());
    let extensions = if cli_var.rules.extensions.is_empty() {
        config.rmlogs.extensions()
    } else {
        cli_var
            .rules
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_owned())
            .collect()
    };

    let json = match &cli_var.command {
        Some(Commands::Files { json, .. }) => *json,
        _ => cli_var.output.json,
    };
    let verbose = cli_var.output.verbose && !json;

    if verbose {
        eprintln!("[VERBOSE] rmlogs v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        if let Some(path) = &config.config_file_path {
            eprintln!("[VERBOSE] Config: {}", path.display());
        }
        eprintln!(
            "[VERBOSE] Rules: {} -> {} inside '{}' blocks",
            rules.target_function, rules.replacement_function, rules.error_handler_keyword
        );
        eprintln!("[VERBOSE] Extensions: {extensions:?}");
        eprintln!("[VERBOSE] Global Excludes: {exclude_folders:?}");
        eprintln!();
    }

    let mut walk = WalkOptions {
        extensions,
        exclude: exclude_folders,
        include: include_folders,
        only: cli_var.selection.only.clone(),
        skip: cli_var.selection.skip.clone(),
        verbose,
    };

    if let Some(Commands::Files { exclude, .. }) = &cli_var.command {
        walk.exclude.extend(exclude.iter().cloned());
        let files = match collect_files(&targets, &walk) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(1);
            }
        };
        crate::commands::run_files(&files, &rules, json, &mut *writer)?;
        return Ok(0);
    }

    if !json && !cli_var.output.quiet {
        crate::output::print_exclusion_list(writer, &walk.exclude)?;
    }

    let mut files = match collect_files(&targets, &walk) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(1);
        }
    };
    if files.is_empty() && !json {
        writeln!(writer, "No matching files found.")?;
        return Ok(0);
    }

    if cli_var.selection.select {
        files = crate::selection::prompt_selection(&files, reader, writer)?;
        if files.is_empty() {
            writeln!(writer, "No files selected.")?;
            return Ok(0);
        }
    }

    let dry_run = cli_var.dry_run || cli_var.check;
    let options = SweepOptions {
        dry_run,
        json,
        quiet: cli_var.output.quiet,
        verbose,
        root: sweep_root(cli_var.paths.root.as_deref(), &targets),
    };
    if verbose {
        eprintln!(
            "[VERBOSE] Sweeping {} files ({})",
            files.len(),
            if dry_run { "dry-run" } else { "write" }
        );
    }

    let report =
        crate::commands::run_sweep(&files, &rules, &options, &CancelFlag::new(), &mut *writer)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if cli_var.output.quiet {
        crate::output::print_report_quiet(writer, &report)?;
    } else {
        crate::output::print_report(writer, &report)?;
    }

    let mut exit_code = 0;
    if report.has_failures() {
        exit_code = 1;
    }
    if cli_var.check && report.has_changes() {
        if !json {
            eprintln!(
                "\n[CHECK] {} files contain {} - FAILED",
                report.summary.files_changed, rules.target_function
            );
        }
        exit_code = 1;
    }
    Ok(exit_code)
}

/// Config values overridden by command line flags.
fn resolve_rules(config: &Config, overrides: &RuleOverrides) -> RewriteRules {
    let mut rules = config.rmlogs.rules();
    if let Some(target) = &overrides.target {
        rules.target_function.clone_from(target);
    }
    if let Some(replacement) = &overrides.replacement {
        rules.replacement_function.clone_from(replacement);
    }
    if let Some(keyword) = &overrides.keyword {
        rules.error_handler_keyword.clone_from(keyword);
    }
    rules
}

/// Walks every target and merges the results, sorted and deduplicated.
fn collect_files(
    targets: &[PathBuf],
    walk: &WalkOptions,
) -> Result<Vec<PathBuf>, ignore::Error> {
    let mut files = Vec::new();
    for target in targets {
        files.extend(collect_source_files(target, walk)?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Writes are confined to `--root` when given, otherwise to the single
/// directory being swept.
fn sweep_root(root: Option<&Path>, targets: &[PathBuf]) -> Option<PathBuf> {
    if let Some(root) = root {
        return Some(root.to_path_buf());
    }
    match targets {
        [single] if single.is_dir() => Some(single.clone()),
        _ => None,
    }
}
