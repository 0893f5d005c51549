use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.rmlogs.toml):
  Create this file in your project root to set defaults,
  or put the same keys under an \"rmlogs\" object in package.json.

  [rmlogs]
  target_function = \"console.log\"        # Calls to remove
  replacement_function = \"console.error\" # Used inside error handlers
  error_handler_keyword = \"catch\"        # Keyword opening a handler block
  file_extensions = [\"js\", \"vue\"]        # Files to sweep

  # Path filters
  exclude_folders = [\"generated\"]
  include_folders = [\"build\"]  # Force-include these
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (shows files being processed).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary (no per-file table).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Shared path arguments (mutually exclusive paths/root).
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Paths to sweep (files or directories).
    /// Can be a single directory, multiple files, or a mix of both.
    /// When no paths are provided, defaults to the current directory.
    /// Cannot be used with --root.
    #[arg(conflicts_with = "root")]
    pub paths: Vec<PathBuf>,

    /// Project root for path containment and sweeping.
    /// When specified, this path is used as both the sweep target AND the
    /// boundary outside of which no file is written.
    /// Cannot be used together with positional path arguments.
    #[arg(long, conflicts_with = "paths")]
    pub root: Option<PathBuf>,
}

impl PathArgs {
    /// Paths to walk; the current directory when none were given.
    #[must_use]
    pub fn targets(&self) -> Vec<PathBuf> {
        if let Some(root) = &self.root {
            vec![root.clone()]
        } else if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}

/// Overrides for the rewrite rules and file filters from the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct RuleOverrides {
    /// Function whose call statements are removed (default: console.log).
    #[arg(long)]
    pub target: Option<String>,

    /// Function used for calls inside error handlers (default: console.error).
    #[arg(long)]
    pub replacement: Option<String>,

    /// Keyword introducing an error-handling block (default: catch).
    #[arg(long)]
    pub keyword: Option<String>,

    /// File extensions to sweep, without dot (repeatable; default: js, vue).
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Folders to exclude from the sweep.
    #[arg(long, alias = "exclude-folder")]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include (overrides default exclusions).
    #[arg(long, alias = "include-folder")]
    pub include_folders: Vec<String>,
}

/// Which of the discovered files to process.
#[derive(Args, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// Only process files matching this glob (repeatable, gitignore syntax).
    #[arg(long, value_name = "GLOB")]
    pub only: Vec<String>,

    /// Skip files matching this glob (repeatable, gitignore syntax).
    #[arg(long, value_name = "GLOB")]
    pub skip: Vec<String>,

    /// Pick files interactively from a numbered list.
    #[arg(long, conflicts_with = "json")]
    pub select: bool,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    name = "rmlogs",
    author,
    version,
    about = "rmlogs - Remove console.log calls, keeping the ones in catch blocks as console.error",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute (e.g., files, init).
    pub command: Option<Commands>,

    /// Global path options (paths vs root).
    #[command(flatten)]
    pub paths: PathArgs,

    /// Rule and filter overrides.
    #[command(flatten)]
    pub rules: RuleOverrides,

    /// File selection options.
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Show what would change without writing any file.
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Exit with code 1 if any file would change (implies --dry-run).
    #[arg(long)]
    pub check: bool,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// List the files a sweep would process
    Files {
        /// Path options (paths vs root).
        #[command(flatten)]
        paths: PathArgs,

        /// Output JSON.
        #[arg(long)]
        json: bool,

        /// Exclude folders.
        #[arg(long, alias = "exclude-folder")]
        exclude: Vec<String>,
    },
    /// Create a default .rmlogs.toml in the current directory
    Init,
}
