//! Commands module - CLI subcommand implementations.
//!
//! The default command sweeps files; `files` lists them and `init` writes
//! a configuration file.

mod files;
mod init;
mod sweep;

// Re-export all public items
pub use files::{run_files, FileListing};
pub use init::{run_init, run_init_in};
pub use sweep::{
    run_sweep, sweep_files, CancelFlag, FileOutcome, FileReport, FileState, FileStatus,
    SweepOptions, SweepReport, SweepSummary,
};
