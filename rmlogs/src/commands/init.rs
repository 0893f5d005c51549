use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::constants::{CONFIG_FILENAME, PACKAGE_JSON_FILENAME};

/// Default configuration written by `rmlogs init`.
const DEFAULT_CONFIG: &str = r#"
[rmlogs]
# Rewrite rules
target_function = "console.log"        # Calls to remove
replacement_function = "console.error" # Used for calls inside error handlers
error_handler_keyword = "catch"        # Keyword opening an error handler

# Files
file_extensions = ["js", "vue"]

# Path filters (added to node_modules, dist, build, ...)
exclude_folders = []
include_folders = []  # Force-include these folders even if excluded by default
"#;

/// Executes the init command.
///
/// This creates a configuration file in the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined or the
/// file cannot be written.
pub fn run_init<W: Write>(writer: &mut W) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    run_init_in(&current_dir, writer)
}

/// Executes the init command in a specific directory.
///
/// This is primarily used for testing.
///
/// # Errors
///
/// Returns an error if an existing `package.json` cannot be read or the
/// configuration file cannot be written.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing rmlogs configuration...")?;

    handle_config_file(root, writer)?;

    writeln!(writer, "Initialization complete!")?;
    Ok(())
}

fn handle_config_file<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    let config_path = root.join(CONFIG_FILENAME);
    let package_json_path = root.join(PACKAGE_JSON_FILENAME);

    // 1. Check if .rmlogs.toml already exists (highest priority)
    if config_path.exists() {
        writeln!(writer, "  • {CONFIG_FILENAME} already exists - skipping.")?;
        return Ok(());
    }

    // 2. Check if package.json already carries an "rmlogs" section
    if package_json_path.exists() {
        let content = fs::read_to_string(&package_json_path)
            .with_context(|| format!("Failed to read {}", package_json_path.display()))?;
        let has_section = serde_json::from_str::<serde_json::Value>(&content)
            .ok()
            .is_some_and(|value| value.get("rmlogs").is_some());
        if has_section {
            writeln!(
                writer,
                "  • {PACKAGE_JSON_FILENAME} already contains an \"rmlogs\" section - skipping."
            )?;
            return Ok(());
        }
    }

    // 3. Create .rmlogs.toml
    let mut file = fs::File::create(&config_path)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    writeln!(file, "{}", DEFAULT_CONFIG.trim())?;
    writeln!(
        writer,
        "  • Created {CONFIG_FILENAME} with default configuration."
    )?;

    Ok(())
}
