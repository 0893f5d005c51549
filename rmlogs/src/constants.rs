use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Function whose call statements are removed by default.
pub const DEFAULT_TARGET_FUNCTION: &str = "console.log";

/// Function used for calls kept inside error handlers.
pub const DEFAULT_REPLACEMENT_FUNCTION: &str = "console.error";

/// Keyword that introduces an error-handling block.
pub const DEFAULT_ERROR_HANDLER_KEYWORD: &str = "catch";

/// Dedicated configuration file name.
pub const CONFIG_FILENAME: &str = ".rmlogs.toml";

/// Node package manifest; an `"rmlogs"` key in it is read as configuration.
pub const PACKAGE_JSON_FILENAME: &str = "package.json";

/// File extensions swept when nothing else is configured.
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &["js", "vue"];

/// Dependency, vendor and build output folders never walked into.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert("node_modules");
        s.insert("bower_components");
        s.insert("jspm_packages");
        s.insert(".git");
        s.insert("dist");
        s.insert("build");
        s.insert("coverage");
        s.insert(".next");
        s.insert(".nuxt");
        s.insert(".cache");
        s.insert("vendor");
        s
    })
}

pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;

/// Regex for a dotted function path such as `console.log` or `$log.debug`.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_function_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*$")
            .expect("Invalid function name regex pattern")
    })
}

/// Regex for a single keyword such as `catch`.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("Invalid keyword regex pattern"))
}
