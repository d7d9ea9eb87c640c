//! Module page skeleton and placeholder substitution.
//!
//! The skeleton carries `%name%` markers. Substitution is a single pass over
//! the skeleton: inserted fragments are never scanned again, and markers
//! without a value are left in place as static content.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Page skeleton shipped with the crate.
pub const MODULE_TEMPLATE: &str = include_str!("../assets/module.html");

/// Marker shown next to the title when a parameter failed authorization.
const ALERT_MARKER: &str = "(!)";

/// Initial viewer text for diagrams with clickable elements.
const VIEWER_HINT: &str = "<br>Click on a diagram element to display its contents on this viewer.";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%([A-Za-z_]+)%").unwrap());

/// Everything substituted into the skeleton for one module.
#[derive(Debug, Default)]
pub struct PageFragments {
    pub title: String,
    /// File name of the parameter table.
    pub params_csv: String,
    /// Normalized SVG.
    pub svg: String,
    /// Script arrays of linked files and the parameter table.
    pub templates: String,
    /// `<li>` navigation entries.
    pub menu: String,
    /// Script arrays of the authorization sheet.
    pub xls: String,
    pub menu_width: usize,
    /// An unauthorized parameter was found.
    pub alert: bool,
    /// The diagram links at least one file.
    pub has_links: bool,
    /// File name of the changes file.
    pub changes_file: Option<String>,
}

/// Replace `%name%` markers in `skeleton` with `values`.
pub fn fill_template(skeleton: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(skeleton, |caps: &Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a module page from the built-in skeleton.
pub fn render_module_page(page: &PageFragments) -> String {
    render_with(MODULE_TEMPLATE, page)
}

/// Render a module page from a custom skeleton.
pub fn render_with(skeleton: &str, page: &PageFragments) -> String {
    let changes_tab = if page.changes_file.is_some() {
        "<li id=\"changes\" style=\"float:right\">Changes</li><li id=\"separator\" style=\"float:right\">|</li>"
    } else {
        ""
    };

    let values = HashMap::from([
        ("webTitle", escape_html(&page.title)),
        ("title", escape_html(&page.title)),
        ("params_csv", page.params_csv.clone()),
        ("svg", page.svg.clone()),
        ("templates", page.templates.clone()),
        ("menu", page.menu.clone()),
        ("alert", if page.alert { ALERT_MARKER } else { "" }.to_owned()),
        (
            "viewer_init_content",
            if page.has_links { VIEWER_HINT } else { "" }.to_owned(),
        ),
        ("xls", page.xls.clone()),
        ("menuwidth", page.menu_width.to_string()),
        ("changes_tab", changes_tab.to_owned()),
        (
            "changes_file",
            page.changes_file.clone().unwrap_or_default(),
        ),
    ]);
    fill_template(skeleton, &values)
}
