//! Core library for the rmlogs log sweeper.
//!
//! This library removes calls to a logging function (`console.log` by
//! default) from JavaScript and Vue sources. Calls inside `catch` blocks
//! are kept as calls to a replacement function (`console.error`), and
//! anything inside comments or string literals is left alone.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the rewrite engine.
/// Scanning, call location, block classification and the transform itself.
pub mod rewrite;

/// Module containing the byte-range edit applier used by the rewrite engine.
pub mod fix;

/// Module for loading configuration.
pub mod config;

/// Module containing utility functions.
/// This includes path helpers and the line index.
pub mod utils;

/// Module defining the entry point logic shared by the binary and tests.
pub mod entry_point;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module for interactive file selection.
pub mod selection;

/// Module for reading and writing swept files.
pub mod persist;
