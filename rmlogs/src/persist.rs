//! Reading and writing swept files.
//!
//! Every failure is reported per file so one unreadable or read-only file
//! never stops a sweep.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::validate_path_within_root;

/// Why a file could not be processed.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read as UTF-8 text.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The rewritten text could not be written back.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file resolves to a location outside the sweep root.
    #[error("refusing to write {} outside of {}", path.display(), root.display())]
    OutsideRoot {
        /// File that was refused.
        path: PathBuf,
        /// Root the sweep is confined to.
        root: PathBuf,
    },
}

/// Reads a source file.
///
/// # Errors
/// Returns [`FileError::Read`] when the file is missing or not UTF-8.
pub fn read_source(path: &Path) -> Result<String, FileError> {
    fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `contents` to `path`, refusing paths that resolve outside `root`.
///
/// # Errors
/// Returns [`FileError::OutsideRoot`] for paths escaping `root` and
/// [`FileError::Write`] when writing fails.
pub fn write_source(path: &Path, root: Option<&Path>, contents: &str) -> Result<(), FileError> {
    let target = match root {
        Some(root) => {
            validate_path_within_root(path, root).map_err(|_| FileError::OutsideRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })?
        }
        None => path.to_path_buf(),
    };
    fs::write(&target, contents).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
