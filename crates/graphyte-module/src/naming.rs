//! Deterministic output naming.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Output file name for a module: `<model>_<module>_v<version>.html`.
///
/// Whitespace runs in the model and module names become `_`; the version
/// loses all whitespace.
pub fn module_file_name(model: &str, module: &str, version: &str) -> String {
    let model = WHITESPACE.replace_all(model.trim(), "_");
    let module = WHITESPACE.replace_all(module.trim(), "_");
    let version: String = version.split_whitespace().collect();
    format!("{model}_{module}_v{version}.html")
}

/// Menu label for a navigation item.
///
/// Navigation items may be given as diagram file names (`Overview.uml`) or
/// bare module names (`Overview`); both yield `Overview`.
pub fn module_label(item: &str) -> &str {
    let item = item.trim();
    match Path::new(item).extension().and_then(|e| e.to_str()) {
        Some("svg" | "uml" | "yang") => item
            .rsplit_once('.')
            .map_or(item, |(stem, _)| stem),
        _ => item,
    }
}
