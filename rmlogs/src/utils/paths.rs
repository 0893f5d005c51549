//! Path utilities for rmlogs.
//!
//! This module consolidates all path-related logic for:
//! - Cross-platform path normalization
//! - Path containment checks before writing
//! - Source file discovery with gitignore support

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use rmlogs::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\web\\app.js")), "web/app.js");
/// assert_eq!(normalize_display_path(Path::new("./src/main.js")), "src/main.js");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    for exclude in excludes {
        if let Some(suffix) = exclude.strip_prefix('*') {
            if exclude.starts_with("*.") && name.ends_with(suffix) {
                return true;
            }
        } else if name == exclude {
            return true;
        }
    }
    false
}

/// Whether `path` carries one of `extensions` (compared without the dot).
#[must_use]
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

/// Validates that a path is contained within an allowed root directory.
///
/// # Errors
///
/// Returns an error if the path or root cannot be canonicalized,
/// or if the path lies outside the root.
pub fn validate_path_within_root(path: &Path, root: &Path) -> anyhow::Result<PathBuf> {
    let canonical_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve path {}: {}", path.display(), e))?;
    let canonical_root = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve root {}: {}", root.display(), e))?;

    if canonical_path.starts_with(&canonical_root) {
        Ok(canonical_path)
    } else {
        anyhow::bail!(
            "Path traversal detected: {} is outside of {}",
            path.display(),
            root.display()
        )
    }
}

/// Filters applied while walking for source files.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Extensions (without dot) of files to collect.
    pub extensions: Vec<String>,
    /// Folder names to skip in addition to the defaults.
    pub exclude: Vec<String>,
    /// Folder names to walk even when excluded by default.
    pub include: Vec<String>,
    /// Gitignore-style globs; when non-empty only matching files are kept.
    pub only: Vec<String>,
    /// Gitignore-style globs of files to drop.
    pub skip: Vec<String>,
    /// Whether to print walk errors to stderr.
    pub verbose: bool,
}

/// Collects source files under `root` with gitignore support.
///
/// Uses the `ignore` crate to respect .gitignore, .git/info/exclude, and global gitignore
/// IN ADDITION to the hardcoded default exclusions (`node_modules`, `dist`, etc.).
/// When `root` is a file it is returned as-is if its extension matches.
///
/// # Errors
///
/// Returns an error if an `only` or `skip` glob does not parse.
pub fn collect_source_files(
    root: &Path,
    options: &WalkOptions,
) -> Result<Vec<PathBuf>, ignore::Error> {
    // Merge user excludes with default excludes
    let mut all_excludes: Vec<String> = options
        .exclude
        .iter()
        .cloned()
        .chain(DEFAULT_EXCLUDE_FOLDERS().iter().map(|&s| s.to_owned()))
        .collect();

    // Remove force-included folders from exclusion list
    all_excludes.retain(|ex| !options.include.iter().any(|inc| ex == inc));

    let root_for_filter = root.to_path_buf();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false) // Don't skip hidden files (we handle that with defaults)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            // Only filter directories - files are filtered by extension below
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !is_excluded(name, &all_excludes))
        });

    if !options.only.is_empty() || !options.skip.is_empty() {
        builder.overrides(build_overrides(root, options)?);
    }

    let mut files = Vec::new();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    continue;
                }
                if has_allowed_extension(path, &options.extensions) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => {
                if options.verbose {
                    eprintln!("[VERBOSE] Walk error: {e}");
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn build_overrides(
    root: &Path,
    options: &WalkOptions,
) -> Result<ignore::overrides::Override, ignore::Error> {
    let base = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    let mut builder = OverrideBuilder::new(base);
    for glob in &options.only {
        builder.add(glob)?;
    }
    for glob in &options.skip {
        builder.add(&format!("!{glob}"))?;
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn js_options() -> WalkOptions {
        WalkOptions {
            extensions: vec!["js".to_owned(), "vue".to_owned()],
            ..WalkOptions::default()
        }
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|f| f.to_str())
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_validate_path_within_root() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        let inside = root.join("src/app.js");
        fs::create_dir_all(root.join("src"))?;
        fs::write(&inside, "// app")?;

        assert!(validate_path_within_root(&inside, root).is_ok());
        assert!(validate_path_within_root(&root.join("../outside.js"), root).is_err());
        assert!(validate_path_within_root(&root.join("src/../../etc/passwd"), root).is_err());

        Ok(())
    }

    #[test]
    fn test_is_excluded_patterns() {
        let excludes = vec!["dist".to_owned(), "*.min".to_owned()];
        assert!(is_excluded("dist", &excludes));
        assert!(is_excluded("bundle.min", &excludes));
        assert!(!is_excluded("distribution", &excludes));
    }

    #[test]
    fn test_collect_source_files_filters_extensions_and_defaults() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::write(root.join("main.js"), "")?;
        fs::write(root.join("App.vue"), "")?;
        fs::write(root.join("readme.md"), "")?;
        fs::create_dir_all(root.join("node_modules/lib"))?;
        fs::write(root.join("node_modules/lib/index.js"), "")?;
        fs::create_dir_all(root.join("dist"))?;
        fs::write(root.join("dist/bundle.js"), "")?;
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/util.js"), "")?;

        let files = collect_source_files(root, &js_options())?;
        let found = names(&files);

        assert_eq!(files.len(), 3);
        assert!(found.contains(&"main.js".to_owned()));
        assert!(found.contains(&"App.vue".to_owned()));
        assert!(found.contains(&"util.js".to_owned()));
        assert!(!found.contains(&"index.js".to_owned()));
        assert!(!found.contains(&"bundle.js".to_owned()));

        Ok(())
    }

    #[test]
    fn test_collect_source_files_force_include() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("build"))?;
        fs::write(root.join("build/tool.js"), "")?;

        let mut options = js_options();
        assert!(collect_source_files(root, &options)?.is_empty());

        options.include = vec!["build".to_owned()];
        assert_eq!(collect_source_files(root, &options)?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_collect_source_files_only_and_skip() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/a.js"), "")?;
        fs::write(root.join("src/a.test.js"), "")?;
        fs::write(root.join("top.js"), "")?;

        let mut options = js_options();
        options.only = vec!["src/**".to_owned()];
        options.skip = vec!["*.test.js".to_owned()];

        let files = collect_source_files(root, &options)?;
        assert_eq!(names(&files), vec!["a.js".to_owned()]);

        Ok(())
    }

    #[test]
    fn test_collect_source_files_rejects_bad_glob() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::write(root.join("a.js"), "")?;

        let mut options = js_options();
        options.skip = vec!["legacy/{a.js".to_owned()];
        assert!(collect_source_files(root, &options).is_err());

        options.skip.clear();
        options.only = vec!["[".to_owned()];
        assert!(collect_source_files(root, &options).is_err());

        Ok(())
    }

    #[test]
    fn test_collect_single_file_root() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let file = temp.path().join("one.js");
        fs::write(&file, "")?;

        let files = collect_source_files(&file, &js_options())?;
        assert_eq!(files, vec![file]);

        Ok(())
    }
}
