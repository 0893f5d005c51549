use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_FILENAME, DEFAULT_ERROR_HANDLER_KEYWORD, DEFAULT_FILE_EXTENSIONS,
    DEFAULT_REPLACEMENT_FUNCTION, DEFAULT_TARGET_FUNCTION, PACKAGE_JSON_FILENAME,
};
use crate::rewrite::RewriteRules;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[rmlogs]` section.
    pub rmlogs: RmlogsConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
/// Configuration options for rmlogs. Unset keys fall back to defaults.
pub struct RmlogsConfig {
    /// Function whose call statements are removed.
    pub target_function: Option<String>,
    /// Function used for calls inside error handlers.
    pub replacement_function: Option<String>,
    /// Keyword introducing an error-handling block.
    pub error_handler_keyword: Option<String>,
    /// Extensions (without dot) of files to sweep.
    pub file_extensions: Option<Vec<String>>,
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to include.
    pub include_folders: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    rmlogs: Option<RmlogsConfig>,
}

impl RmlogsConfig {
    /// Rewrite rules with defaults filled in.
    #[must_use]
    pub fn rules(&self) -> RewriteRules {
        RewriteRules {
            target_function: self
                .target_function
                .clone()
                .unwrap_or_else(|| DEFAULT_TARGET_FUNCTION.to_owned()),
            replacement_function: self
                .replacement_function
                .clone()
                .unwrap_or_else(|| DEFAULT_REPLACEMENT_FUNCTION.to_owned()),
            error_handler_keyword: self
                .error_handler_keyword
                .clone()
                .unwrap_or_else(|| DEFAULT_ERROR_HANDLER_KEYWORD.to_owned()),
        }
    }

    /// File extensions with defaults filled in; leading dots are dropped.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.file_extensions.as_ref().map_or_else(
            || {
                DEFAULT_FILE_EXTENSIONS
                    .iter()
                    .map(|&ext| ext.to_owned())
                    .collect()
            },
            |exts| {
                exts.iter()
                    .map(|ext| ext.trim_start_matches('.').to_owned())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            },
        )
    }
}

impl Config {
    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// In each directory `.rmlogs.toml` is tried before `package.json`; a
    /// `package.json` without an `"rmlogs"` key does not stop the search.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }
        if let Ok(canonical) = current.canonicalize() {
            current = canonical;
        }

        loop {
            // 1. Try CONFIG_FILENAME
            let rmlogs_toml = current.join(CONFIG_FILENAME);
            if rmlogs_toml.exists() {
                if let Ok(content) = fs::read_to_string(&rmlogs_toml) {
                    if let Ok(mut config) = toml::from_str::<Config>(&content) {
                        config.config_file_path = Some(rmlogs_toml);
                        return config;
                    }
                }
            }

            // 2. Try PACKAGE_JSON_FILENAME
            let package_json = current.join(PACKAGE_JSON_FILENAME);
            if package_json.exists() {
                if let Ok(content) = fs::read_to_string(&package_json) {
                    if let Ok(PackageJson {
                        rmlogs: Some(rmlogs),
                    }) = serde_json::from_str::<PackageJson>(&content)
                    {
                        return Config {
                            rmlogs,
                            config_file_path: Some(package_json),
                        };
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}
