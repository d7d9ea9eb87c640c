//! `graphyte module` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use graphyte_config::ToolsConfig;
use graphyte_diagrams::{PlantUml, Pyang, UmlFeature};
use graphyte_module::{DiagramKind, ModuleContext, ModuleSettings};
use graphyte_site::ModuleBuilder;

use crate::error::CliError;
use crate::logging::with_logging;
use crate::output::Output;

/// Arguments for the module command.
#[derive(Args)]
pub(crate) struct ModuleArgs {
    /// Path to the SVG/UML/YANG diagram.
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory.
    #[arg(short, long)]
    output: PathBuf,

    /// Model name shared by all modules, e.g. "L3VPN".
    #[arg(short = 'M', long)]
    model: String,

    /// Model version, e.g. "1.0".
    #[arg(short = 'V', long = "model-version")]
    version: String,

    /// Module name, e.g. "Routing".
    #[arg(short, long)]
    module: String,

    /// Directory containing the files linked from the diagram.
    #[arg(short = 'd', long)]
    files_dir: PathBuf,

    /// Page title.
    #[arg(short, long)]
    title: Option<String>,

    /// Comma separated navigation menu items.
    #[arg(short, long, value_delimiter = ',')]
    nav: Vec<String>,

    /// Authorized parameters sheet (.xlsx, .xls, .ods or .csv).
    #[arg(short, long)]
    sheet: Option<PathBuf>,

    /// Directory for intermediate files (default: a temporary directory).
    #[arg(short, long)]
    work_dir: Option<PathBuf>,

    /// Write a build log to this file.
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Comma separated pyang --uml-no options (YANG diagrams only).
    #[arg(short, long, value_delimiter = ',')]
    uml_no: Vec<String>,

    /// Changes file, embedded verbatim and shown in its own tab.
    #[arg(short, long)]
    changes: Option<String>,

    /// Java executable used to run PlantUML.
    #[arg(long, env = "GRAPHYTE_JAVA")]
    java: Option<String>,

    /// Path to plantuml.jar.
    #[arg(long, env = "GRAPHYTE_PLANTUML_JAR")]
    plantuml_jar: Option<PathBuf>,

    /// pyang executable.
    #[arg(long, env = "GRAPHYTE_PYANG")]
    pyang: Option<String>,

    /// Timeout in seconds for each external tool run.
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl ModuleArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let kind = DiagramKind::from_path(&self.input).ok_or_else(|| {
            CliError::Validation(format!(
                "{} is not a .svg, .uml or .yang diagram",
                self.input.display()
            ))
        })?;
        let uml_no = if self.uml_no.is_empty() {
            vec![UmlFeature::Annotation]
        } else if kind == DiagramKind::Yang {
            UmlFeature::parse_list(&self.uml_no)
                .map_err(|e| CliError::Validation(e.to_string()))?
        } else {
            return Err(CliError::Validation(
                "--uml-no is only valid for .yang diagrams".to_owned(),
            ));
        };

        let defaults = ToolsConfig::default();
        let timeout = self.timeout.map_or(defaults.timeout, Duration::from_secs);
        let pyang = Pyang::new(self.pyang.unwrap_or(defaults.pyang), timeout);
        let plantuml = PlantUml::new(
            self.java.unwrap_or(defaults.java),
            self.plantuml_jar.unwrap_or(defaults.plantuml_jar),
            timeout,
        );

        // Kept alive until the build finishes.
        let temp_work;
        let work_dir = match self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                dir
            }
            None => {
                temp_work = tempfile::Builder::new().prefix("graphyte-").tempdir()?;
                temp_work.path().to_path_buf()
            }
        };

        let ctx = ModuleContext::new(ModuleSettings {
            model: self.model.trim().to_owned(),
            module: self.module.trim().to_owned(),
            version: self.version.trim().to_owned(),
            title: self.title,
            out_dir: self.output,
            diagram_path: self.input,
            work_dir,
            files_dir: self.files_dir,
            sheet_path: self.sheet,
            nav_items: self.nav.iter().map(|n| n.trim().to_owned()).collect(),
            changes_file: self.changes,
        })?;

        let module = with_logging(self.verbose, self.log_file.as_deref(), || {
            ModuleBuilder::new(&pyang, &plantuml)
                .with_uml_no(uml_no)
                .build(ctx)
        })??;

        if module.invalid_parameters {
            output.warning("Unauthorized parameters found");
        }
        output.path("Page", &module.output_path);
        output.success(&format!("Module {} built", module.module));
        Ok(())
    }
}
