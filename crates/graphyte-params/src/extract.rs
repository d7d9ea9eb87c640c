//! Linked file embedding and parameter mining.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use graphyte_module::script::{render_array, var_name_for_file};
use graphyte_module::{ModuleContext, ParameterCategory, ParameterRecord};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::name::{PLACEHOLDER, is_false_positive};

/// Separator between the data columns of a decision row.
const DECISION_SEPARATOR: &str = " | ";

/// Error walking the linked-files directory.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The linked-files directory does not exist.
    #[error("Linked files directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

/// Result of processing the linked files of a module.
#[derive(Debug, Default)]
pub struct ExtractedTemplates {
    /// Script arrays for every embedded file, concatenated.
    pub script: String,
    /// Embedded file name → absolute path.
    pub files: BTreeMap<String, PathBuf>,
}

/// How a linked file is mined for parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mining {
    Decision,
    Template,
    Skip,
}

fn mining_for(ctx: &ModuleContext, file_name: &str, is_text: bool) -> Mining {
    if ctx.changes_file() == Some(file_name) {
        return Mining::Skip;
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Mining::Decision,
        Some("yang" | "xml") => Mining::Skip,
        _ if is_text => Mining::Template,
        _ => Mining::Skip,
    }
}

/// Embed every linked file found under the context's files directory and
/// mine it for parameters.
///
/// Files are visited in sorted order; when two files share a name the first
/// one wins. Findings are recorded on `ctx`.
///
/// # Errors
///
/// Returns [`ExtractError::MissingDirectory`] if the files directory is
/// absent. Unreadable files are skipped with a warning.
pub fn extract_templates(ctx: &mut ModuleContext) -> Result<ExtractedTemplates, ExtractError> {
    let root = ctx.files_dir().to_path_buf();
    if !root.is_dir() {
        return Err(ExtractError::MissingDirectory(root));
    }
    info!(dir = %root.display(), "Processing linked files");

    let mut result = ExtractedTemplates::default();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !ctx.is_embedded(&file_name) {
            continue;
        }
        if let Some(first) = result.files.get(&file_name) {
            warn!(
                file = %entry.path().display(),
                used = %first.display(),
                "Duplicate linked file name, ignoring"
            );
            continue;
        }

        let bytes = match std::fs::read(entry.path()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %entry.path().display(), error = %e, "Failed to read linked file");
                continue;
            }
        };
        let is_text = looks_like_text(&bytes);
        let content = String::from_utf8_lossy(&bytes).into_owned();
        info!(file = %file_name, "Embedding linked file");

        let var = var_name_for_file(&file_name);
        result.script.push_str(&render_array(
            &var,
            &file_name,
            content.lines().map(str::trim_end),
        ));

        match mining_for(ctx, &file_name, is_text) {
            Mining::Decision => mine_decisions(ctx, &file_name, &content),
            Mining::Template => mine_templates(ctx, &file_name, &content),
            Mining::Skip => debug!(file = %file_name, "Not mined for parameters"),
        }

        let path = std::path::absolute(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
        result.files.insert(file_name, path);
    }

    for missing in ctx
        .linked_files()
        .iter()
        .filter(|name| !result.files.contains_key(*name))
    {
        warn!(file = %missing, "Linked file not found in input directory");
    }

    Ok(result)
}

/// Valid UTF-8 with no NUL bytes. PDFs, images and spreadsheets fail this.
fn looks_like_text(bytes: &[u8]) -> bool {
    !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}

/// One decision record per non-empty CSV row: the first column is the
/// parameter, the rest is joined as data.
fn mine_decisions(ctx: &mut ModuleContext, file_name: &str, content: &str) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(file = file_name, row = index + 1, error = %e, "Skipping malformed CSV row");
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let name = record.get(0).unwrap_or("").trim();
        let data = record
            .iter()
            .skip(1)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(DECISION_SEPARATOR);
        let verdict = ctx.check_parameter(name);
        ctx.record(
            ParameterCategory::Decision,
            ParameterRecord::new(name, file_name, verdict, &data),
        );
    }
}

/// One template record per placeholder occurrence, with its line as data.
fn mine_templates(ctx: &mut ModuleContext, file_name: &str, content: &str) {
    for line in content.lines() {
        for found in PLACEHOLDER.find_iter(line) {
            let candidate = found.as_str();
            if is_false_positive(candidate) {
                continue;
            }
            let verdict = ctx.check_parameter(candidate);
            ctx.record(
                ParameterCategory::Template,
                ParameterRecord::new(candidate, file_name, verdict, line.trim()),
            );
        }
    }
}
