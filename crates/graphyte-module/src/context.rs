//! The per-module context record.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::naming::{module_file_name, module_label};
use crate::record::{ParameterCategory, ParameterRecord, Verdict};

/// Width in pixels reserved per character of the longest menu label.
const MENU_CHAR_WIDTH: usize = 9;

/// Error creating a module context.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A naming field is blank.
    #[error("Module {0} cannot be empty")]
    EmptyField(&'static str),
    /// The diagram extension is not one of `.svg`, `.uml`, `.yang`.
    #[error("Unsupported diagram type: {}", .0.display())]
    UnsupportedDiagram(PathBuf),
}

/// Source kind of a module's diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    /// YANG schema, converted to UML and then to SVG.
    Yang,
    /// `PlantUML` source, rendered to SVG.
    Uml,
    /// Ready-made SVG.
    Svg,
}

impl DiagramKind {
    /// Detect the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yang" => Some(Self::Yang),
            "uml" => Some(Self::Uml),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

/// Inputs for a module build.
#[derive(Debug, Clone, Default)]
pub struct ModuleSettings {
    /// Model name.
    pub model: String,
    /// Module name, usually the diagram file stem.
    pub module: String,
    /// Model version.
    pub version: String,
    /// Page title override.
    pub title: Option<String>,
    /// Directory the output page is written to.
    pub out_dir: PathBuf,
    /// Input diagram.
    pub diagram_path: PathBuf,
    /// Scratch directory for converter output.
    pub work_dir: PathBuf,
    /// Directory holding the linked files.
    pub files_dir: PathBuf,
    /// Authorized-parameter sheet.
    pub sheet_path: Option<PathBuf>,
    /// Navigation items, in menu order.
    pub nav_items: Vec<String>,
    /// File name of the changes file, embedded whether linked or not.
    pub changes_file: Option<String>,
}

/// Shared state of one module build.
///
/// Constructed once, mutated by each stage, dropped after the page is
/// written. Accumulated collections only grow; parameter lists are put in
/// their final order by [`finalize_parameters`](Self::finalize_parameters).
#[derive(Debug)]
pub struct ModuleContext {
    model: String,
    module: String,
    version: String,
    title: Option<String>,
    kind: DiagramKind,
    output_path: PathBuf,
    diagram_path: PathBuf,
    work_dir: PathBuf,
    files_dir: PathBuf,
    sheet_path: Option<PathBuf>,
    nav_items: Vec<String>,
    changes_file: Option<String>,
    linked_files: BTreeSet<String>,
    decisions: Vec<ParameterRecord>,
    templates: Vec<ParameterRecord>,
    authorized: Option<HashSet<String>>,
    invalid_param_found: bool,
}

impl ModuleContext {
    /// Create a context from build settings.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::EmptyField`] for a blank model, module or
    /// version, and [`ModuleError::UnsupportedDiagram`] for an unknown
    /// diagram extension.
    pub fn new(settings: ModuleSettings) -> Result<Self, ModuleError> {
        for (value, field) in [
            (&settings.model, "model"),
            (&settings.module, "name"),
            (&settings.version, "version"),
        ] {
            if value.trim().is_empty() {
                return Err(ModuleError::EmptyField(field));
            }
        }
        let kind = DiagramKind::from_path(&settings.diagram_path)
            .ok_or_else(|| ModuleError::UnsupportedDiagram(settings.diagram_path.clone()))?;

        let output_path = settings.out_dir.join(module_file_name(
            &settings.model,
            &settings.module,
            &settings.version,
        ));

        Ok(Self {
            model: settings.model.trim().to_owned(),
            module: settings.module.trim().to_owned(),
            version: settings.version.trim().to_owned(),
            title: settings.title.filter(|t| !t.trim().is_empty()),
            kind,
            output_path,
            diagram_path: settings.diagram_path,
            work_dir: settings.work_dir,
            files_dir: settings.files_dir,
            sheet_path: settings.sheet_path,
            nav_items: settings.nav_items,
            changes_file: settings.changes_file,
            linked_files: BTreeSet::new(),
            decisions: Vec::new(),
            templates: Vec::new(),
            authorized: None,
            invalid_param_found: false,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Page title, `<model> v<version> - <module>` unless overridden.
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            format!("{} v{} - {}", self.model, self.version, self.module)
        })
    }

    pub fn diagram_kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Output file name without its `.html` extension.
    pub fn output_stem(&self) -> &str {
        self.output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.module)
    }

    pub fn diagram_path(&self) -> &Path {
        &self.diagram_path
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn sheet_path(&self) -> Option<&Path> {
        self.sheet_path.as_deref()
    }

    pub fn nav_items(&self) -> &[String] {
        &self.nav_items
    }

    pub fn changes_file(&self) -> Option<&str> {
        self.changes_file.as_deref()
    }

    /// Record a locally linked file. Returns `false` if already recorded.
    pub fn push_link(&mut self, file_name: &str) -> bool {
        let added = self.linked_files.insert(file_name.to_owned());
        if added {
            debug!(file = file_name, "Linked file recorded");
        }
        added
    }

    /// Every local file the diagram links to.
    pub fn linked_files(&self) -> &BTreeSet<String> {
        &self.linked_files
    }

    /// Whether `file_name` is embedded in the page: linked from the
    /// diagram, or the configured changes file.
    pub fn is_embedded(&self, file_name: &str) -> bool {
        self.linked_files.contains(file_name) || self.changes_file() == Some(file_name)
    }

    /// Resolve a `mod:` link target to the output file of the first
    /// navigation item whose label contains `name`.
    pub fn resolve_module_link(&self, name: &str) -> Option<String> {
        self.nav_items
            .iter()
            .map(|item| module_label(item))
            .find(|label| label.contains(name))
            .map(|label| module_file_name(&self.model, label, &self.version))
    }

    /// Menu labels: the navigation items, or just this module when none
    /// were given.
    pub fn menu_labels(&self) -> Vec<&str> {
        if self.nav_items.is_empty() {
            vec![self.module.as_str()]
        } else {
            self.nav_items.iter().map(|item| module_label(item)).collect()
        }
    }

    /// Menu width in pixels, derived from the longest menu label.
    pub fn menu_width(&self) -> usize {
        self.menu_labels()
            .iter()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0)
            * MENU_CHAR_WIDTH
    }

    /// Install the authorized parameter set.
    pub fn set_authorized(&mut self, names: HashSet<String>) {
        self.authorized = Some(names);
    }

    /// Whether an authorized set has been loaded.
    pub fn has_authorized(&self) -> bool {
        self.authorized.is_some()
    }

    /// Check a parameter name, raising the invalid flag when it is not
    /// authorized.
    pub fn check_parameter(&mut self, name: &str) -> Verdict {
        match &self.authorized {
            None => Verdict::NotChecked,
            Some(set) if set.contains(name) => Verdict::Legal,
            Some(_) => {
                self.invalid_param_found = true;
                Verdict::Unauthorized
            }
        }
    }

    /// Whether any unauthorized parameter was observed.
    pub fn invalid_param_found(&self) -> bool {
        self.invalid_param_found
    }

    /// Append a parameter finding.
    pub fn record(&mut self, category: ParameterCategory, record: ParameterRecord) {
        match category {
            ParameterCategory::Decision => self.decisions.push(record),
            ParameterCategory::Template => self.templates.push(record),
        }
    }

    pub fn decisions(&self) -> &[ParameterRecord] {
        &self.decisions
    }

    pub fn templates(&self) -> &[ParameterRecord] {
        &self.templates
    }

    /// Deduplicate both parameter lists and sort them case-insensitively.
    pub fn finalize_parameters(&mut self) {
        finalize(&mut self.decisions);
        finalize(&mut self.templates);
    }
}

fn finalize(records: &mut Vec<ParameterRecord>) {
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.clone()));
    records.sort_by_cached_key(|r| {
        let row = r.to_row();
        (row.to_lowercase(), row)
    });
}
