//! Colored terminal output.

use std::path::Path;

use console::{Style, Term};

/// Writes user-facing build progress to stderr.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    err: Style,
    label: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            err: Style::new().red().bold(),
            label: Style::new().cyan().bold(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// `label: path`, with the label highlighted.
    pub(crate) fn path(&self, label: &str, path: &Path) {
        self.line(&format!("{} {}", self.label.apply_to(format!("{label}:")), path.display()));
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warn.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.err.apply_to(msg).to_string());
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.line(&self.label.apply_to(msg).to_string());
    }
}
