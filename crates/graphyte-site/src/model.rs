//! Model build over an input directory.
//!
//! A model is a directory holding `graphyte.toml`, one or more diagrams and
//! the files they link to. Every diagram becomes a module page; all pages
//! share one navigation menu.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use graphyte_config::{CONFIG_FILENAME, CliSettings, ConfigError, ModelConfig};
use graphyte_diagrams::{PlantUml, Pyang, SchemaConverter, UmlFeature, UmlRenderer};
use graphyte_module::{DiagramKind, ModuleContext, ModuleError, ModuleSettings, module_label};
use tempfile::TempDir;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::builder::{BuildError, ModuleBuilder, ModuleOutput};
use crate::package::{PackageError, zip_dir};

/// Output directory name used without a job id.
pub const OUTPUT_DIRNAME: &str = "www";
/// Directory holding job trees.
pub const ARCHIVE_DIRNAME: &str = "archive";
/// Job history appended to after each job build.
pub const JOBS_LOG: &str = "jobs.log";
/// Human-readable build log written into the output directory.
pub const BUILD_LOG: &str = "graphyte.log";

/// Fatal model build error.
///
/// Variants with a numbered code render as `Error <code>: <message>`.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Error 100: {CONFIG_FILENAME} not found in {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("Error 101: bad configuration format: {0}")]
    ConfigFormat(String),
    #[error("Error 102: no \"model\" entry found in {CONFIG_FILENAME}")]
    MissingModel,
    #[error("Error 103: no \"version\" entry found in {CONFIG_FILENAME}")]
    MissingVersion,
    #[error("Error 104: no diagram files (.svg, .uml, .yang) found in {}", .0.display())]
    NoDiagrams(PathBuf),
    #[error("Error 105: diagram_order entries not found: {}", .0.join(", "))]
    UnresolvedOrder(Vec<String>),
    #[error("Error 106: {key} file \"{name}\" not found")]
    FileNotFound { key: &'static str, name: String },
    #[error("Error 107: invalid pyang_uml_no option \"{0}\"")]
    InvalidUmlNo(String),
    #[error(
        "Failed to convert {module}: {source} (add it to layout.diagram_ignore_list to skip it)"
    )]
    Conversion {
        module: String,
        source: graphyte_diagrams::ConversionError,
    },
    #[error("Failed to build {module}: {source}")]
    Build { module: String, source: BuildError },
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to scan {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl ModelError {
    /// Numbered code of the error, if it has one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::ConfigNotFound(_) => Some(100),
            Self::ConfigFormat(_) => Some(101),
            Self::MissingModel => Some(102),
            Self::MissingVersion => Some(103),
            Self::NoDiagrams(_) => Some(104),
            Self::UnresolvedOrder(_) => Some(105),
            Self::FileNotFound { .. } => Some(106),
            Self::InvalidUmlNo(_) => Some(107),
            _ => None,
        }
    }

    fn from_config(err: ConfigError, path: &Path) -> Self {
        match err {
            ConfigError::NotFound(_) => Self::ConfigNotFound(path.to_path_buf()),
            ConfigError::MissingKey("model") => Self::MissingModel,
            ConfigError::MissingKey("version") => Self::MissingVersion,
            other => Self::ConfigFormat(other.to_string()),
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ModelError + '_ {
    move |source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Directories used by one model build.
#[derive(Debug)]
pub struct ModelLayout {
    root: PathBuf,
    input_dir: PathBuf,
    out_dir: PathBuf,
    work_dir: PathBuf,
    archive: Option<PathBuf>,
    job_id: Option<String>,
    _work_guard: Option<TempDir>,
}

impl ModelLayout {
    /// Resolve and create the directories for a build of `dir`.
    ///
    /// Without a job id, inputs are read from `dir`, pages are written to
    /// `dir/www` and intermediate files go to a temporary directory removed
    /// on drop. With a job id everything lives under
    /// `dir/archive/<id>/{in,out,zip,work}` and the work directory is
    /// emptied first.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if a directory cannot be created.
    pub fn resolve(dir: &Path, job_id: Option<&str>, zip: bool) -> Result<Self, ModelError> {
        let layout = match job_id {
            Some(id) => {
                let job = dir.join(ARCHIVE_DIRNAME).join(id);
                let work_dir = job.join("work");
                if work_dir.exists() {
                    std::fs::remove_dir_all(&work_dir).map_err(io_err(&work_dir))?;
                }
                Self {
                    root: dir.to_path_buf(),
                    input_dir: job.join("in"),
                    out_dir: job.join("out"),
                    archive: Some(job.join("zip").join(format!("graphyte-{id}.zip"))),
                    work_dir,
                    job_id: Some(id.to_owned()),
                    _work_guard: None,
                }
            }
            None => {
                let guard = tempfile::Builder::new()
                    .prefix("graphyte-")
                    .tempdir()
                    .map_err(io_err(dir))?;
                Self {
                    root: dir.to_path_buf(),
                    input_dir: dir.to_path_buf(),
                    out_dir: dir.join(OUTPUT_DIRNAME),
                    archive: zip.then(|| dir.join("graphyte.zip")),
                    work_dir: guard.path().to_path_buf(),
                    job_id: None,
                    _work_guard: Some(guard),
                }
            }
        };

        for path in [&layout.input_dir, &layout.out_dir, &layout.work_dir] {
            std::fs::create_dir_all(path).map_err(io_err(path))?;
        }
        Ok(layout)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Zip archive written after the build, if packaging was requested.
    pub fn archive(&self) -> Option<&Path> {
        self.archive.as_deref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Path of the build log inside the output directory.
    pub fn log_path(&self) -> PathBuf {
        self.out_dir.join(BUILD_LOG)
    }

    fn excluded(&self, path: &Path) -> bool {
        path == self.out_dir
            || path == self.work_dir
            || (self.job_id.is_none() && path == self.root.join(ARCHIVE_DIRNAME))
    }
}

/// Files found in the input directory.
#[derive(Debug, Default)]
struct InputIndex {
    /// File name → first path found.
    files: BTreeMap<String, PathBuf>,
    /// Diagrams in discovery order.
    diagrams: Vec<PathBuf>,
}

fn scan_inputs(layout: &ModelLayout) -> Result<InputIndex, ModelError> {
    let mut index = InputIndex::default();
    let walker = WalkDir::new(layout.input_dir())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !layout.excluded(e.path()));

    for entry in walker {
        let entry = entry.map_err(|source| ModelError::Walk {
            path: layout.input_dir().to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.into_path();
        if let Some(first) = index.files.get(&name) {
            warn!(
                file = %name,
                kept = %first.display(),
                ignored = %path.display(),
                "Duplicate file name in input"
            );
            continue;
        }
        if DiagramKind::from_path(&path).is_some() {
            index.diagrams.push(path.clone());
        }
        index.files.insert(name, path);
    }
    Ok(index)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn matches_entry(path: &Path, entry: &str) -> bool {
    let entry = entry.trim();
    path.file_name().is_some_and(|n| n.to_string_lossy() == entry)
        || stem_of(path) == module_label(entry)
}

/// Order modules: declared `diagram_order` first, then the rest in
/// discovery order.
fn order_modules(diagrams: Vec<PathBuf>, order: &[String]) -> Result<Vec<PathBuf>, ModelError> {
    let mut remaining = diagrams;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut missing = Vec::new();

    for entry in order {
        match remaining.iter().position(|p| matches_entry(p, entry)) {
            Some(i) => ordered.push(remaining.remove(i)),
            None => missing.push(entry.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(ModelError::UnresolvedOrder(missing));
    }
    ordered.extend(remaining);
    Ok(ordered)
}

/// Everything a successful model build produced.
#[derive(Debug)]
pub struct ModelOutput {
    pub layout: ModelLayout,
    pub config: ModelConfig,
    pub modules: Vec<ModuleOutput>,
    /// Authorization sheet used by every module.
    pub sheet_path: Option<PathBuf>,
    /// Written zip archive.
    pub archive: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Builds every module of a model.
pub struct ModelBuilder {
    cli_settings: Option<CliSettings>,
    tools: Option<(Box<dyn SchemaConverter>, Box<dyn UmlRenderer>)>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            cli_settings: None,
            tools: None,
        }
    }

    /// Override configuration values from the command line.
    #[must_use]
    pub fn with_cli_settings(mut self, settings: CliSettings) -> Self {
        self.cli_settings = Some(settings);
        self
    }

    /// Use the given converters instead of the configured pyang and `PlantUML`.
    #[must_use]
    pub fn with_tools(
        mut self,
        converter: Box<dyn SchemaConverter>,
        renderer: Box<dyn UmlRenderer>,
    ) -> Self {
        self.tools = Some((converter, renderer));
        self
    }

    /// Build the model laid out by `layout`.
    ///
    /// When the layout requests an archive, the output directory is zipped
    /// whether or not the build succeeded; for job builds a line is
    /// appended to `jobs.log`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`ModelError`].
    pub fn build(&self, layout: ModelLayout) -> Result<ModelOutput, ModelError> {
        let started = Instant::now();
        info!(input = %layout.input_dir().display(), "Building model");

        let result = self.build_modules(&layout);

        let archive = layout
            .archive()
            .map(|dest| zip_dir(layout.out_dir(), dest).map_err(ModelError::from))
            .transpose();
        let job_log = match layout.job_id() {
            Some(id) => {
                let summary = match &result {
                    Ok(built) => format!(
                        "{} {} - {} modules",
                        built.config.main.model,
                        built.config.main.version,
                        built.modules.len()
                    ),
                    Err(err) => err.to_string(),
                };
                append_job_log(&layout.root, id, &summary)
            }
            None => Ok(()),
        };

        let elapsed = started.elapsed();
        match result {
            Ok(built) => {
                let archive = archive?;
                job_log?;
                info!(
                    modules = built.modules.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Model build complete"
                );
                Ok(ModelOutput {
                    layout,
                    config: built.config,
                    modules: built.modules,
                    sheet_path: built.sheet_path,
                    archive,
                    elapsed,
                })
            }
            Err(err) => {
                // The build error wins; packaging failures are only logged.
                if let Err(e) = archive {
                    warn!(error = %e, "Failed to package output of failed build");
                }
                if let Err(e) = job_log {
                    warn!(error = %e, "Failed to record failed build in jobs log");
                }
                error!(error = %err, elapsed_ms = elapsed.as_millis(), "Model build failed");
                Err(err)
            }
        }
    }

    fn build_modules(&self, layout: &ModelLayout) -> Result<BuiltModules, ModelError> {
        let index = scan_inputs(layout)?;

        let config_path = index
            .files
            .get(CONFIG_FILENAME)
            .ok_or_else(|| ModelError::ConfigNotFound(layout.input_dir().to_path_buf()))?;
        info!(config = %config_path.display(), "Reading configuration");
        let config = ModelConfig::load(config_path, self.cli_settings.as_ref())
            .and_then(|c| c.validate().map(|()| c))
            .map_err(|e| ModelError::from_config(e, config_path))?;
        config.log_values();

        let lookup = |key: &'static str, name: Option<&str>| -> Result<Option<PathBuf>, ModelError> {
            let Some(name) = name else {
                return Ok(None);
            };
            index
                .files
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| ModelError::FileNotFound {
                    key,
                    name: name.to_owned(),
                })
        };
        let sheet_path = lookup("auth_params", config.parameters.auth_params.as_deref())?;
        lookup("changes", config.main.changes.as_deref())?;

        let uml_no = UmlFeature::parse_list(&config.layout.pyang_uml_no)
            .map_err(|e| ModelError::InvalidUmlNo(e.0))?;

        let ignore = &config.layout.diagram_ignore_list;
        let diagrams: Vec<PathBuf> = index
            .diagrams
            .into_iter()
            .filter(|p| {
                let ignored = ignore.iter().any(|entry| matches_entry(p, entry));
                if ignored {
                    info!(diagram = %p.display(), "Ignoring diagram");
                }
                !ignored
            })
            .collect();
        if diagrams.is_empty() {
            return Err(ModelError::NoDiagrams(layout.input_dir().to_path_buf()));
        }

        let mut seen = HashSet::new();
        let modules: Vec<PathBuf> = order_modules(diagrams, &config.layout.diagram_order)?
            .into_iter()
            .filter(|p| {
                let fresh = seen.insert(stem_of(p));
                if !fresh {
                    warn!(diagram = %p.display(), "Another diagram already uses this module name, skipping");
                }
                fresh
            })
            .collect();
        let nav_items: Vec<String> = modules.iter().map(|p| stem_of(p)).collect();
        info!(modules = ?nav_items, "Module order");

        let default_tools;
        let (converter, renderer): (&dyn SchemaConverter, &dyn UmlRenderer) = match &self.tools {
            Some((c, r)) => (c.as_ref(), r.as_ref()),
            None => {
                let tools = &config.tools;
                default_tools = (
                    Pyang::new(tools.pyang.clone(), tools.timeout),
                    PlantUml::new(tools.java.clone(), tools.plantuml_jar.clone(), tools.timeout),
                );
                (&default_tools.0, &default_tools.1)
            }
        };
        let builder = ModuleBuilder::new(converter, renderer).with_uml_no(uml_no);

        let mut outputs = Vec::with_capacity(modules.len());
        for diagram in modules {
            let module = stem_of(&diagram);
            let work_dir = layout.work_dir().join(&module);
            std::fs::create_dir_all(&work_dir).map_err(io_err(&work_dir))?;

            let ctx = ModuleContext::new(ModuleSettings {
                model: config.main.model.clone(),
                module: module.clone(),
                version: config.main.version.clone(),
                title: config.main.title.as_ref().map(|t| format!("{t} - {module}")),
                out_dir: layout.out_dir().to_path_buf(),
                diagram_path: diagram,
                work_dir,
                files_dir: layout.input_dir().to_path_buf(),
                sheet_path: sheet_path.clone(),
                nav_items: nav_items.clone(),
                changes_file: config.main.changes.clone(),
            })?;

            let output = builder.build(ctx).map_err(|source| match source {
                BuildError::Conversion(source) => ModelError::Conversion {
                    module: module.clone(),
                    source,
                },
                source => ModelError::Build {
                    module: module.clone(),
                    source,
                },
            })?;
            outputs.push(output);
        }

        Ok(BuiltModules {
            config,
            modules: outputs,
            sheet_path,
        })
    }
}

struct BuiltModules {
    config: ModelConfig,
    modules: Vec<ModuleOutput>,
    sheet_path: Option<PathBuf>,
}

fn append_job_log(root: &Path, id: &str, summary: &str) -> Result<(), ModelError> {
    let path = root.join(JOBS_LOG);
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(io_err(&path))?;
    writeln!(file, "{id}\n    {summary}").map_err(io_err(&path))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use graphyte_diagrams::ToolError;
    use pretty_assertions::assert_eq;

    use super::*;

    struct FakePyang;

    impl SchemaConverter for FakePyang {
        fn to_uml(&self, yang: &Path, output: &Path, _: &[UmlFeature]) -> Result<(), ToolError> {
            let stem = stem_of(yang);
            std::fs::write(output, format!("@startuml {stem}.svg\nTitle {stem}\nclass A\n@enduml\n")).unwrap();
            Ok(())
        }
    }

    /// Writes a minimal SVG and records every rendered UML file.
    #[derive(Clone, Default)]
    struct FakePlantUml {
        rendered: Rc<RefCell<Vec<String>>>,
    }

    impl UmlRenderer for FakePlantUml {
        fn to_svg(&self, uml: &Path, out_dir: &Path) -> Result<(), ToolError> {
            let stem = stem_of(uml);
            self.rendered.borrow_mut().push(stem.clone());
            std::fs::write(
                out_dir.join(format!("{stem}.svg")),
                "<svg width=\"10\" height=\"10\"><a href=\"cmds.txt\"><text>c</text></a></svg>",
            )
            .unwrap();
            Ok(())
        }
    }

    /// Succeeds without writing anything.
    struct SilentPlantUml;

    impl UmlRenderer for SilentPlantUml {
        fn to_svg(&self, _: &Path, _: &Path) -> Result<(), ToolError> {
            Ok(())
        }
    }

    fn write_model(dir: &Path, config: &str) {
        std::fs::write(dir.join(CONFIG_FILENAME), config).unwrap();
        std::fs::write(dir.join("Core.uml"), "@startuml\nclass Core\n@enduml\n").unwrap();
        std::fs::write(dir.join("Access.uml"), "@startuml\nclass Access\n@enduml\n").unwrap();
        std::fs::write(dir.join("cmds.txt"), "set vlan <VLAN_ID>\n").unwrap();
    }

    fn builder(renderer: FakePlantUml) -> ModelBuilder {
        ModelBuilder::new().with_tools(Box::new(FakePyang), Box::new(renderer))
    }

    const BASIC: &str = "[main]\nmodel = \"L3VPN\"\nversion = \"1.0\"\n";

    #[test]
    fn test_build_model_default_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), BASIC);
        let renderer = FakePlantUml::default();

        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        let out = builder(renderer.clone()).build(layout).unwrap();

        assert_eq!(out.modules.len(), 2);
        assert_eq!(*renderer.rendered.borrow(), vec!["Access", "Core"]);
        let www = dir.path().join("www");
        assert!(www.join("L3VPN_Access_v1.0.html").is_file());
        assert!(www.join("L3VPN_Core_v1.0.html").is_file());
        assert!(out.archive.is_none());

        let html = std::fs::read_to_string(www.join("L3VPN_Core_v1.0.html")).unwrap();
        assert!(html.contains("<a href=\"L3VPN_Access_v1.0.html\">Access</a>"));
        assert!(html.contains("<a href=\"L3VPN_Core_v1.0.html\">Core</a>"));
        assert!(html.contains("<VLAN_ID>,cmds.txt,not checked"));
    }

    #[test]
    fn test_diagram_order_and_title() {
        let dir = tempfile::tempdir().unwrap();
        write_model(
            dir.path(),
            "[main]\nmodel = \"M\"\nversion = \"2\"\ntitle = \"Ring\"\n\
             [layout]\ndiagram_order = [\"Core.uml\"]\n",
        );
        let renderer = FakePlantUml::default();
        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        builder(renderer.clone()).build(layout).unwrap();

        assert_eq!(*renderer.rendered.borrow(), vec!["Core", "Access"]);
        let html = std::fs::read_to_string(dir.path().join("www/M_Core_v2.html")).unwrap();
        assert!(html.contains("<title>Ring - Core</title>"));
        let core = html.find(">Core</a>").unwrap();
        let access = html.find(">Access</a>").unwrap();
        assert!(core < access);
    }

    #[test]
    fn test_yang_module_and_ignore_list() {
        let dir = tempfile::tempdir().unwrap();
        write_model(
            dir.path(),
            "[main]\nmodel = \"M\"\nversion = \"1\"\n[layout]\ndiagram_ignore_list = \"Access.uml\"\n",
        );
        std::fs::write(dir.path().join("ietf.yang"), "module ietf {}").unwrap();
        let renderer = FakePlantUml::default();
        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        let out = builder(renderer.clone()).build(layout).unwrap();

        assert_eq!(*renderer.rendered.borrow(), vec!["Core", "ietf"]);
        let ietf = out.modules.iter().find(|m| m.module == "ietf").unwrap();
        let uml = std::fs::read_to_string(ietf.rendered_svg.as_ref().unwrap().with_extension("uml")).unwrap();
        assert_eq!(uml, "@startuml\nclass A\n@enduml\n");
    }

    #[test]
    fn test_output_dir_excluded_from_discovery() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), BASIC);
        std::fs::create_dir_all(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("www/Stale.svg"), "<svg/>").unwrap();
        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        let out = builder(FakePlantUml::default()).build(layout).unwrap();
        assert_eq!(out.modules.len(), 2);
    }

    fn build_err(config: Option<&str>) -> ModelError {
        let dir = tempfile::tempdir().unwrap();
        if let Some(config) = config {
            write_model(dir.path(), config);
        }
        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        builder(FakePlantUml::default()).build(layout).unwrap_err()
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(build_err(None).code(), Some(100));
        assert_eq!(build_err(Some("[main\n")).code(), Some(101));
        assert_eq!(build_err(Some("[main]\nversion = \"1\"\n")).code(), Some(102));
        assert_eq!(build_err(Some("[main]\nmodel = \"M\"\n")).code(), Some(103));
        assert_eq!(
            build_err(Some(&format!("{BASIC}[parameters]\nauth_params = \"missing.xlsx\"\n"))).code(),
            Some(106)
        );
        assert_eq!(
            build_err(Some(&format!("{BASIC}[layout]\npyang_uml_no = [\"bogus\"]\n"))).code(),
            Some(107)
        );
    }

    #[test]
    fn test_no_diagrams() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), BASIC).unwrap();
        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        let err = builder(FakePlantUml::default()).build(layout).unwrap_err();
        assert_eq!(err.code(), Some(104));
    }

    #[test]
    fn test_unresolved_order_lists_all_entries() {
        let err = build_err(Some(&format!(
            "{BASIC}[layout]\ndiagram_order = [\"Core\", \"Edge\", \"Metro.uml\"]\n"
        )));
        assert_eq!(err.code(), Some(105));
        assert_eq!(
            err.to_string(),
            "Error 105: diagram_order entries not found: Edge, Metro.uml"
        );
    }

    #[test]
    fn test_missing_converter_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), BASIC);
        let layout = ModelLayout::resolve(dir.path(), None, false).unwrap();
        let err = ModelBuilder::new()
            .with_tools(Box::new(FakePyang), Box::new(SilentPlantUml))
            .build(layout)
            .unwrap_err();
        assert!(matches!(err, ModelError::Conversion { .. }));
        assert!(err.to_string().contains("diagram_ignore_list"));
    }

    #[test]
    fn test_job_layout_zip_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("archive/42/in");
        std::fs::create_dir_all(&input).unwrap();
        write_model(&input, BASIC);

        let layout = ModelLayout::resolve(dir.path(), Some("42"), false).unwrap();
        let out = builder(FakePlantUml::default()).build(layout).unwrap();

        let archive = dir.path().join("archive/42/zip/graphyte-42.zip");
        assert_eq!(out.archive.as_deref(), Some(archive.as_path()));
        assert!(archive.is_file());
        assert!(dir.path().join("archive/42/out/L3VPN_Core_v1.0.html").is_file());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(JOBS_LOG)).unwrap(),
            "42\n    L3VPN 1.0 - 2 modules\n"
        );
    }

    #[test]
    fn test_job_failure_still_zipped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ModelLayout::resolve(dir.path(), Some("7"), false).unwrap();
        std::fs::write(layout.log_path(), "log").unwrap();
        let err = builder(FakePlantUml::default()).build(layout).unwrap_err();

        assert_eq!(err.code(), Some(100));
        assert!(dir.path().join("archive/7/zip/graphyte-7.zip").is_file());
        let jobs = std::fs::read_to_string(dir.path().join(JOBS_LOG)).unwrap();
        assert!(jobs.starts_with("7\n    Error 100:"));
    }

    #[test]
    fn test_job_failure_keeps_build_error_when_packaging_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ModelLayout::resolve(dir.path(), Some("8"), false).unwrap();
        std::fs::create_dir_all(dir.path().join("archive/8/zip/graphyte-8.zip")).unwrap();
        std::fs::create_dir_all(dir.path().join(JOBS_LOG)).unwrap();

        let err = builder(FakePlantUml::default()).build(layout).unwrap_err();
        assert_eq!(err.code(), Some(100));
    }

    #[test]
    fn test_job_work_dir_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("archive/1/work/old.svg");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "x").unwrap();
        let layout = ModelLayout::resolve(dir.path(), Some("1"), false).unwrap();
        assert!(!stale.exists());
        assert!(layout.work_dir().is_dir());
    }

    #[test]
    fn test_zip_without_job() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), BASIC);
        let layout = ModelLayout::resolve(dir.path(), None, true).unwrap();
        let out = builder(FakePlantUml::default()).build(layout).unwrap();
        assert_eq!(out.archive, Some(dir.path().join("graphyte.zip")));
        assert!(!dir.path().join(JOBS_LOG).exists());
    }
}
