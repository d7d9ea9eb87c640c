//! `graphyte build` command implementation.

use std::path::PathBuf;

use clap::Args;
use graphyte_config::CliSettings;
use graphyte_confluence::publish_model;
use graphyte_site::{ModelBuilder, ModelLayout};

use crate::error::CliError;
use crate::logging::with_logging;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Model directory containing graphyte.toml and the diagrams.
    dir: PathBuf,

    /// Job id; inputs and outputs live under <dir>/archive/<id>/.
    #[arg(short, long)]
    id: Option<String>,

    /// Zip the output directory.
    #[arg(short, long)]
    zip: bool,

    /// Publish the built model to Confluence (implies --zip).
    #[arg(long)]
    publish: bool,

    /// Page title (overrides config).
    #[arg(short, long)]
    title: Option<String>,

    /// Java executable used to run PlantUML (overrides config).
    #[arg(long, env = "GRAPHYTE_JAVA")]
    java: Option<String>,

    /// Path to plantuml.jar (overrides config).
    #[arg(long, env = "GRAPHYTE_PLANTUML_JAR")]
    plantuml_jar: Option<PathBuf>,

    /// pyang executable (overrides config).
    #[arg(long, env = "GRAPHYTE_PYANG")]
    pyang: Option<String>,

    /// Timeout in seconds for each external tool run (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if let Some(id) = &self.id
            && (id.is_empty() || id.contains(['/', '\\']) || id == "..")
        {
            return Err(CliError::Validation(format!("invalid job id \"{id}\"")));
        }

        let layout = ModelLayout::resolve(&self.dir, self.id.as_deref(), self.zip || self.publish)?;
        let log_path = layout.log_path();
        output.path("Input", layout.input_dir());
        output.path("Output", layout.out_dir());

        let cli_settings = CliSettings {
            title: self.title,
            java: self.java,
            plantuml_jar: self.plantuml_jar,
            pyang: self.pyang,
            timeout_secs: self.timeout,
        };
        let builder = ModelBuilder::new().with_cli_settings(cli_settings);

        let publish = self.publish;
        let result = with_logging(self.verbose, Some(&log_path), || -> Result<_, CliError> {
            let model = builder.build(layout)?;
            let url = if publish {
                Some(publish_model(&model)?.url)
            } else {
                None
            };
            Ok((model, url))
        })?;

        let (model, url) = match result {
            Ok(built) => built,
            Err(err) => {
                output.path("Build log", &log_path);
                return Err(err);
            }
        };

        for module in &model.modules {
            output.info(&format!("  {}", module.output_path.display()));
            if module.invalid_parameters {
                output.warning(&format!("  unauthorized parameters in {}", module.module));
            }
        }
        if let Some(archive) = &model.archive {
            output.path("Archive", archive);
        }
        output.success(&format!(
            "Built {} modules of {} v{} in {:.1}s",
            model.modules.len(),
            model.config.main.model,
            model.config.main.version,
            model.elapsed.as_secs_f64()
        ));
        if let Some(url) = url {
            output.highlight(&format!("Published: {url}"));
        }
        Ok(())
    }
}
