//! Model configuration for Graphyte.
//!
//! Parses the `graphyte.toml` file that sits in a model's input directory.
//! The file names the model and its version, optionally points at an
//! authorized-parameters sheet and a changes file, controls navigation
//! ordering, and configures the external diagram tools.
//!
//! ```toml
//! [main]
//! model = "L3VPN"
//! version = "1.0"
//!
//! [parameters]
//! auth_params = "allowed_parameters.xlsx"
//!
//! [layout]
//! diagram_order = ["Overview.uml", "Routing.svg"]
//! diagram_ignore_list = ["draft.yang"]
//! pyang_uml_no = ["annotation", "typedef"]
//! ```
//!
//! ## Environment Variable Expansion
//!
//! Tool paths and `[confluence]` values support `${VAR}` and
//! `${VAR:-default}` expansion.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::info;

/// Configuration filename searched for in the model input directory.
pub const CONFIG_FILENAME: &str = "graphyte.toml";

/// Default timeout for one external tool invocation.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;

/// pyang exclusion applied when the config names none.
const DEFAULT_UML_NO: &str = "annotation";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the page title.
    pub title: Option<String>,
    /// Override the java executable.
    pub java: Option<String>,
    /// Override the `PlantUML` jar location.
    pub plantuml_jar: Option<PathBuf>,
    /// Override the pyang executable.
    pub pyang: Option<String>,
    /// Override the external tool timeout.
    pub timeout_secs: Option<u64>,
}

/// Model configuration.
#[derive(Debug)]
pub struct ModelConfig {
    /// `[main]` section.
    pub main: MainConfig,
    /// `[parameters]` section.
    pub parameters: ParametersConfig,
    /// `[layout]` section.
    pub layout: LayoutConfig,
    /// `[tools]` section.
    pub tools: ToolsConfig,
    /// `[confluence]` section, present only when publishing is configured.
    pub confluence: Option<ConfluenceConfig>,
    /// Path to the config file (set after loading from disk).
    pub config_path: Option<PathBuf>,
}

/// Model identity.
#[derive(Debug, Clone)]
pub struct MainConfig {
    /// Model name shared by every module.
    pub model: String,
    /// Model version.
    pub version: String,
    /// Page title; defaults to `<model> v<version> - <module>` per module.
    pub title: Option<String>,
    /// File name of the changes/release-notes file embedded in every page.
    pub changes: Option<String>,
}

/// Authorized parameter settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParametersConfig {
    /// File name of the authorized-parameters sheet.
    pub auth_params: Option<String>,
}

/// Navigation and module selection.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Diagram file names listed first in the navigation menu.
    pub diagram_order: Vec<String>,
    /// Diagram file names excluded from the build.
    pub diagram_ignore_list: Vec<String>,
    /// pyang `--uml-no` exclusions (validated by the model builder).
    pub pyang_uml_no: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            diagram_order: Vec::new(),
            diagram_ignore_list: Vec::new(),
            pyang_uml_no: vec![DEFAULT_UML_NO.to_owned()],
        }
    }
}

/// External converter locations.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Java executable used to run `PlantUML`.
    pub java: String,
    /// `PlantUML` jar.
    pub plantuml_jar: PathBuf,
    /// pyang executable.
    pub pyang: String,
    /// Upper bound for a single converter run.
    pub timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            java: "java".to_owned(),
            plantuml_jar: PathBuf::from("plantuml.jar"),
            pyang: "pyang".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }
}

/// Confluence publishing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: String,
    /// Account used for basic authentication.
    pub username: String,
    /// Password or API token.
    pub password: String,
    /// Page under which the model page tree is created.
    pub parent_page_id: String,
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        require_non_empty(&self.password, "confluence.password")?;
        require_non_empty(&self.parent_page_id, "confluence.parent_page_id")?;
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// A required key is absent or empty.
    #[error("No \"{0}\" entry found in {CONFIG_FILENAME}")]
    MissingKey(&'static str),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.password`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_PASSWORD`} not set").
        message: String,
    },
}

/// Raw file layout as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigRaw {
    main: MainRaw,
    parameters: ParametersConfig,
    layout: LayoutRaw,
    tools: ToolsRaw,
    confluence: Option<ConfluenceConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MainRaw {
    model: Option<String>,
    version: Option<String>,
    title: Option<String>,
    changes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayoutRaw {
    #[serde(deserialize_with = "list_or_csv")]
    diagram_order: Vec<String>,
    #[serde(deserialize_with = "list_or_csv")]
    diagram_ignore_list: Vec<String>,
    #[serde(deserialize_with = "list_or_csv")]
    pyang_uml_no: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolsRaw {
    java: Option<String>,
    plantuml_jar: Option<String>,
    pyang: Option<String>,
    timeout_secs: Option<u64>,
}

/// Accept either a TOML array or a comma-separated string.
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    let items = match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(s) => s.split(',').map(str::to_owned).collect(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Take a required, non-blank string.
fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(ConfigError::MissingKey(key)),
    }
}

impl ModelConfig {
    /// Load configuration from `graphyte.toml` at `path`.
    ///
    /// CLI settings are applied after loading, taking precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is absent, [`ConfigError::Parse`]
    /// for malformed TOML and [`ConfigError::MissingKey`] when `main.model` or
    /// `main.version` is missing.
    pub fn load(path: &Path, cli_settings: Option<&CliSettings>) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file-system cases.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut raw: ConfigRaw = toml::from_str(content)?;
        raw.expand_env_vars()?;

        let model = required(raw.main.model, "model")?;
        let version = required(raw.main.version, "version")?;

        let pyang_uml_no = if raw.layout.pyang_uml_no.is_empty() {
            vec![DEFAULT_UML_NO.to_owned()]
        } else {
            raw.layout.pyang_uml_no
        };

        let defaults = ToolsConfig::default();
        let tools = ToolsConfig {
            java: raw.tools.java.unwrap_or(defaults.java),
            plantuml_jar: raw
                .tools
                .plantuml_jar
                .map_or(defaults.plantuml_jar, PathBuf::from),
            pyang: raw.tools.pyang.unwrap_or(defaults.pyang),
            timeout: raw
                .tools
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
        };

        let config = Self {
            main: MainConfig {
                model,
                version,
                title: raw.main.title.filter(|t| !t.trim().is_empty()),
                changes: raw.main.changes.filter(|c| !c.trim().is_empty()),
            },
            parameters: raw.parameters,
            layout: LayoutConfig {
                diagram_order: raw.layout.diagram_order,
                diagram_ignore_list: raw.layout.diagram_ignore_list,
                pyang_uml_no,
            },
            tools,
            confluence: raw.confluence,
            config_path: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tools.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "tools.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(&self.tools.java, "tools.java")?;
        require_non_empty(&self.tools.pyang, "tools.pyang")?;
        Ok(())
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(format!("[confluence] section required in {CONFIG_FILENAME}"))
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(title) = &settings.title {
            self.main.title = Some(title.clone());
        }
        if let Some(java) = &settings.java {
            self.tools.java.clone_from(java);
        }
        if let Some(jar) = &settings.plantuml_jar {
            self.tools.plantuml_jar.clone_from(jar);
        }
        if let Some(pyang) = &settings.pyang {
            self.tools.pyang.clone_from(pyang);
        }
        if let Some(secs) = settings.timeout_secs {
            self.tools.timeout = Duration::from_secs(secs);
        }
    }

    /// Write every configuration value to the build log.
    pub fn log_values(&self) {
        info!(model = %self.main.model, "main.model");
        info!(version = %self.main.version, "main.version");
        if let Some(title) = &self.main.title {
            info!(title = %title, "main.title");
        }
        if let Some(changes) = &self.main.changes {
            info!(changes = %changes, "main.changes");
        }
        if let Some(auth_params) = &self.parameters.auth_params {
            info!(auth_params = %auth_params, "parameters.auth_params");
        }
        info!(diagram_order = ?self.layout.diagram_order, "layout.diagram_order");
        info!(diagram_ignore_list = ?self.layout.diagram_ignore_list, "layout.diagram_ignore_list");
        info!(pyang_uml_no = ?self.layout.pyang_uml_no, "layout.pyang_uml_no");
        info!(
            java = %self.tools.java,
            plantuml_jar = %self.tools.plantuml_jar.display(),
            pyang = %self.tools.pyang,
            timeout_secs = self.tools.timeout.as_secs(),
            "tools"
        );
        if let Some(conf) = &self.confluence {
            info!(base_url = %conf.base_url, parent_page_id = %conf.parent_page_id, "confluence");
        }
    }
}

impl ConfigRaw {
    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.tools.java, "tools.java")?;
        expand::expand_opt(&mut self.tools.plantuml_jar, "tools.plantuml_jar")?;
        expand::expand_opt(&mut self.tools.pyang, "tools.pyang")?;

        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.username = expand::expand_env(&confluence.username, "confluence.username")?;
            confluence.password = expand::expand_env(&confluence.password, "confluence.password")?;
            confluence.parent_page_id =
                expand::expand_env(&confluence.parent_page_id, "confluence.parent_page_id")?;
        }

        Ok(())
    }
}
