//! Authorized parameter sheet.
//!
//! The first worksheet of the file is read. Row 1 is a header and is kept
//! verbatim; every following row names one authorized parameter in its
//! first column. Rows whose name fails [`is_valid_parameter_name`] are
//! skipped with a warning.
//!
//! Spreadsheets (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`) are read with
//! `calamine`; `.csv` files with `csv`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use calamine::{Reader, open_workbook_auto};
use graphyte_module::ModuleContext;
use tracing::{info, warn};

use crate::name::is_valid_parameter_name;

/// Error loading a parameter sheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The spreadsheet could not be opened or decoded.
    #[error("Failed to read parameter sheet {}: {source}", .path.display())]
    Workbook {
        /// Sheet file.
        path: PathBuf,
        /// Underlying spreadsheet error.
        source: calamine::Error,
    },
    /// The CSV file could not be parsed.
    #[error("Failed to read parameter sheet {}: {source}", .path.display())]
    Csv {
        /// Sheet file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
    /// The workbook has no worksheet.
    #[error("Parameter sheet {} has no worksheet", .0.display())]
    NoWorksheet(PathBuf),
}

/// A loaded authorization sheet.
#[derive(Debug, Clone, Default)]
pub struct ParameterSheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    authorized: HashSet<String>,
}

impl ParameterSheet {
    /// Load the first worksheet of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError`] if the file can't be opened or parsed. Invalid
    /// rows are not errors.
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        info!(sheet = %path.display(), "Loading parameter sheet");
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        let rows = if is_csv {
            read_csv(path)?
        } else {
            read_workbook(path)?
        };
        Ok(Self::from_rows(rows))
    }

    /// Build a sheet from raw cell text, header row first.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let mut iter = rows.into_iter();
        let headers = iter.next().unwrap_or_default();
        let mut sheet = Self {
            headers,
            ..Self::default()
        };

        for (index, row) in iter.enumerate() {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            let name = row.first().map_or("", |c| c.trim());
            if !is_valid_parameter_name(name) {
                // Header is row 1, so data starts at row 2.
                warn!(row = index + 2, name, "Skipping invalid parameter name");
                continue;
            }
            sheet.authorized.insert(name.to_owned());
            sheet.rows.push(row);
        }

        info!(
            authorized = sheet.authorized.len(),
            "Parameter sheet loaded"
        );
        sheet
    }

    /// Header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Accepted parameter rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Authorized parameter names.
    pub fn authorized(&self) -> &HashSet<String> {
        &self.authorized
    }

    /// Whether `name` is authorized (exact match).
    pub fn contains(&self, name: &str) -> bool {
        self.authorized.contains(name)
    }

    /// Render the sheet as script arrays: `xls_headers` for the header row
    /// and one `p_<name>` array per accepted row.
    pub fn to_script(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        if !self.headers.is_empty() {
            out.push_str(&render_row("xls_headers", &self.headers, width));
        }
        for row in &self.rows {
            let name = row.first().map_or("", |c| c.trim());
            out.push_str(&render_row(&sheet_var_name(name), row, width));
        }
        out
    }
}

fn read_workbook(path: &Path) -> Result<Vec<Vec<String>>, SheetError> {
    let workbook_err = |source| SheetError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SheetError::NoWorksheet(path.to_path_buf()))?
        .map_err(workbook_err)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect())
}

fn read_csv(path: &Path) -> Result<Vec<Vec<String>>, SheetError> {
    let csv_err = |source| SheetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_owned).collect())
                .map_err(csv_err)
        })
        .collect()
}

/// Escape one cell for a script string.
fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for ch in cell.trim_end().chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '-' => out.push_str("\\-"),
            '<' => out.push_str("\\x3C"),
            '>' => out.push_str("\\x3E"),
            '\n' | '\u{a0}' => out.push(' '),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

fn render_row(var: &str, cells: &[String], width: usize) -> String {
    let mut out = format!("    var {var} = [");
    for i in 0..width.max(1) {
        if i > 0 {
            out.push(',');
        }
        out.push_str("\n\"");
        out.push_str(&escape_cell(cells.get(i).map_or("", String::as_str)));
        out.push('"');
    }
    out.push_str("];\n\n");
    out
}

/// Script variable name for a parameter row, e.g. `<vlan-id>` → `p_vlan_dash_id`.
pub fn sheet_var_name(name: &str) -> String {
    let mut out = String::from("p_");
    for ch in name.chars() {
        match ch {
            '<' | '>' | '(' | ')' | '{' | '}' | '[' | ']' => {}
            '-' => out.push_str("_dash_"),
            '$' => out.push_str("_dollarsign_"),
            '+' => out.push_str("_plus_"),
            '=' => out.push_str("_equal_"),
            '.' => out.push_str("_dot_"),
            '/' => out.push_str("_backslash_"),
            '\'' => out.push_str("_singlequote_"),
            c if c.is_whitespace() => out.push('_'),
            c => out.push(c),
        }
    }
    out
}

/// Load the context's parameter sheet, if any, and install its authorized
/// names on the context.
///
/// Returns the sheet's script rendering, empty when no sheet is configured.
///
/// # Errors
///
/// Returns [`SheetError`] if a configured sheet can't be read.
pub fn load_parameter_sheet(ctx: &mut ModuleContext) -> Result<String, SheetError> {
    let Some(path) = ctx.sheet_path().map(Path::to_path_buf) else {
        return Ok(String::new());
    };
    let sheet = ParameterSheet::load(&path)?;
    let script = sheet.to_script();
    ctx.set_authorized(sheet.authorized);
    Ok(script)
}

#[cfg(test)]
mod tests {
    use graphyte_module::{ModuleSettings, Verdict};
    use pretty_assertions::assert_eq;

    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
            .collect()
    }

    #[test]
    fn test_header_row_not_validated() {
        let sheet = ParameterSheet::from_rows(rows(&[
            &["Parameter Name", "Description"],
            &["<IF_NAME>", "Interface"],
        ]));
        assert_eq!(sheet.headers(), ["Parameter Name", "Description"]);
        assert!(sheet.contains("<IF_NAME>"));
        assert!(!sheet.contains("Parameter Name"));
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let sheet = ParameterSheet::from_rows(rows(&[
            &["Name"],
            &["<GOOD>"],
            &["<BAD NAME>"],
            &["plain"],
            &[" <{vlan-id}> "],
            &["", ""],
        ]));
        let mut names: Vec<_> = sheet.authorized().iter().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["<GOOD>".to_owned(), "<{vlan-id}>".to_owned()]);
        assert_eq!(sheet.rows().len(), 2);
    }

    #[test]
    fn test_membership_is_exact() {
        let sheet = ParameterSheet::from_rows(rows(&[&["H"], &["<IF_NAME>"]]));
        assert!(sheet.contains("<IF_NAME>"));
        assert!(!sheet.contains("<if_name>"));
        assert!(!sheet.contains("IF_NAME"));
    }

    #[test]
    fn test_sheet_var_name() {
        assert_eq!(sheet_var_name("<vlan-id>"), "p_vlan_dash_id");
        assert_eq!(sheet_var_name("<{$peer.ip}>"), "p__dollarsign_peer_dot_ip");
        assert_eq!(sheet_var_name("<[a/b='c']>"), "p_a_backslash_b_equal__singlequote_c_singlequote_");
    }

    #[test]
    fn test_to_script() {
        let sheet = ParameterSheet::from_rows(rows(&[
            &["Name", "Notes"],
            &["<IF_NAME>", "say \"hi\"\nnow"],
            &["<ID>"],
        ]));
        assert_eq!(
            sheet.to_script(),
            "    var xls_headers = [\n\"Name\",\n\"Notes\"];\n\n\
             \x20   var p_IF_NAME = [\n\"\\x3CIF_NAME\\x3E\",\n\"say \\\"hi\\\" now\"];\n\n\
             \x20   var p_ID = [\n\"\\x3CID\\x3E\",\n\"\"];\n\n"
        );
    }

    #[test]
    fn test_load_csv_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowed.csv");
        std::fs::write(&path, "Name,Description\n<IF_NAME>,\"Interface, physical\"\n<bad one>,x\n")
            .unwrap();
        let sheet = ParameterSheet::load(&path).unwrap();
        assert!(sheet.contains("<IF_NAME>"));
        assert_eq!(sheet.authorized().len(), 1);
        assert_eq!(sheet.rows()[0][1], "Interface, physical");
    }

    #[test]
    fn test_load_missing_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParameterSheet::load(&dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, SheetError::Workbook { .. }));
    }

    #[test]
    fn test_load_parameter_sheet_sets_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowed.csv");
        std::fs::write(&path, "Name\n<IF_NAME>\n").unwrap();
        let mut ctx = ModuleContext::new(ModuleSettings {
            model: "M".to_owned(),
            module: "A".to_owned(),
            version: "1".to_owned(),
            diagram_path: PathBuf::from("A.uml"),
            sheet_path: Some(path),
            ..Default::default()
        })
        .unwrap();

        let script = load_parameter_sheet(&mut ctx).unwrap();
        assert!(script.contains("var p_IF_NAME"));
        assert_eq!(ctx.check_parameter("<IF_NAME>"), Verdict::Legal);
        assert_eq!(ctx.check_parameter("<DESC>"), Verdict::Unauthorized);
    }

    #[test]
    fn test_no_sheet_configured() {
        let mut ctx = ModuleContext::new(ModuleSettings {
            model: "M".to_owned(),
            module: "A".to_owned(),
            version: "1".to_owned(),
            diagram_path: PathBuf::from("A.uml"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(load_parameter_sheet(&mut ctx).unwrap(), "");
        assert!(!ctx.has_authorized());
    }
}
