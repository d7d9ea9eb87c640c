//! Publishing a built model as a Confluence page tree.
//!
//! The model page sits under the configured parent and carries the zipped
//! site, a children listing and the authorization sheet. Each module gets a
//! child page with its diagram and templates.
//!
//! Page bodies reference attachments by file name, so a page is created with
//! its final body first and its attachments are uploaded afterwards.

use std::path::{Path, PathBuf};

use graphyte_config::ModelConfig;
use graphyte_params::ParameterSheet;
use graphyte_site::{ModelOutput, ModuleOutput};
use tracing::{info, warn};

use crate::client::ConfluenceClient;
use crate::error::PublishError;
use crate::storage;
use crate::types::Page;

/// Timestamp suffix of module page titles.
const TITLE_TIMESTAMP: &str = "(%Y-%m-%d@%H:%M:%S)";

/// A file to attach to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPlan {
    pub path: PathBuf,
    pub filename: String,
    pub content_type: &'static str,
}

impl AttachmentPlan {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            filename: file_name(path),
            content_type: content_type(path),
        }
    }
}

/// A page to create and the files to attach to it.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub title: String,
    /// Storage format body.
    pub body: String,
    pub attachments: Vec<AttachmentPlan>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn content_type(path: &Path) -> &'static str {
    match extension(path).as_str() {
        "zip" => "application/zip",
        "svg" => "image/svg+xml",
        "xlsx" | "xlsm" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "csv" => "text/csv",
        "txt" | "cfg" | "conf" => "text/plain",
        "xml" | "yang" => "application/xml",
        _ => "application/octet-stream",
    }
}

fn read_lossy(path: &Path) -> Result<String, PublishError> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn csv_rows(content: &str) -> Result<Vec<Vec<String>>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_owned).collect()))
        .collect()
}

/// Title of the model page.
pub fn model_page_title(config: &ModelConfig) -> String {
    config
        .main
        .title
        .clone()
        .unwrap_or_else(|| format!("{} v{}", config.main.model, config.main.version))
}

/// Plan the model page: archive link, module listing and the
/// authorization sheet rendered as tables.
///
/// # Errors
///
/// Returns [`PublishError::Sheet`] if the sheet cannot be read.
pub fn plan_model_page(
    config: &ModelConfig,
    archive: &Path,
    sheet: Option<&Path>,
) -> Result<PagePlan, PublishError> {
    let zip = AttachmentPlan::new(archive);
    let mut body = storage::heading(1, "Full Model Documentation");
    body.push_str("<p>");
    body.push_str(&storage::attachment_link(
        &zip.filename,
        "Full interactive documentation attached.",
    ));
    body.push_str("</p>");
    body.push_str(&storage::heading(1, "Modules"));
    body.push_str(storage::children_macro());

    let mut attachments = vec![zip];
    if let Some(sheet_path) = sheet {
        let sheet = ParameterSheet::load(sheet_path)?;
        let mut rows = vec![sheet.headers().to_vec()];
        rows.extend(sheet.rows().iter().cloned());

        let attachment = AttachmentPlan::new(sheet_path);
        body.push_str(&storage::heading(1, "Model Variables"));
        body.push_str(&storage::titled_table(&attachment.filename, &rows));
        attachments.push(attachment);
    }

    Ok(PagePlan {
        title: model_page_title(config),
        body,
        attachments,
    })
}

/// Plan one module page titled `<page stem> <timestamp>`.
///
/// CSV templates become tables; other templates are attached and shown in
/// a code block.
///
/// # Errors
///
/// Returns [`PublishError::Io`] if a template cannot be read.
pub fn plan_module_page(module: &ModuleOutput, timestamp: &str) -> Result<PagePlan, PublishError> {
    let stem = module
        .output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| module.module.clone());

    let diagram = AttachmentPlan::new(&module.diagram);
    let mut body = storage::toc_with_header("Table of Contents");
    body.push_str(&storage::heading(1, &module.module));
    body.push_str(&storage::heading(2, "Diagram"));
    body.push_str(&storage::attached_image(&diagram.filename));

    let mut attachments = vec![diagram];
    if !module.templates.is_empty() {
        body.push_str(&storage::heading(2, "Module Templates"));
    }
    for (name, path) in &module.templates {
        let content = read_lossy(path)?;
        if extension(path) == "csv" {
            match csv_rows(&content) {
                Ok(rows) => {
                    body.push_str(&storage::titled_table(name, &rows));
                    continue;
                }
                Err(e) => warn!(file = %name, error = %e, "Malformed CSV template, publishing as text"),
            }
        }
        body.push_str("<h3>");
        body.push_str(&storage::attachment_link(name, name));
        body.push_str("</h3>");
        body.push_str(&storage::code_block(name, &content));
        attachments.push(AttachmentPlan::new(path));
    }

    Ok(PagePlan {
        title: format!("{stem} {timestamp}"),
        body,
        attachments,
    })
}

/// Pages created by a publish run.
#[derive(Debug)]
pub struct PublishResult {
    pub model_page: Page,
    pub module_pages: Vec<Page>,
    /// Web URL of the model page.
    pub url: String,
}

/// Publishes models under one parent page.
pub struct Publisher<'a> {
    client: &'a ConfluenceClient,
    parent_id: &'a str,
}

impl<'a> Publisher<'a> {
    pub fn new(client: &'a ConfluenceClient, parent_id: &'a str) -> Self {
        Self { client, parent_id }
    }

    /// Create the model page and one child page per module.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingArchive`] if the model was not zipped,
    /// or the first API, sheet or file error.
    pub fn publish(&self, output: &ModelOutput) -> Result<PublishResult, PublishError> {
        let archive = output.archive.as_deref().ok_or(PublishError::MissingArchive)?;
        let space_key = self.client.get_space_key(self.parent_id)?;

        let plan = plan_model_page(&output.config, archive, output.sheet_path.as_deref())?;
        let model_page = self.create(&space_key, self.parent_id, &plan)?;

        let timestamp = chrono::Local::now().format(TITLE_TIMESTAMP).to_string();
        let mut module_pages = Vec::with_capacity(output.modules.len());
        for module in &output.modules {
            let plan = plan_module_page(module, &timestamp)?;
            module_pages.push(self.create(&space_key, &model_page.id, &plan)?);
        }

        let url = self.client.page_url(&model_page);
        info!(url = %url, modules = module_pages.len(), "Model published");
        Ok(PublishResult {
            model_page,
            module_pages,
            url,
        })
    }

    fn create(&self, space_key: &str, parent_id: &str, plan: &PagePlan) -> Result<Page, PublishError> {
        let page = self
            .client
            .create_page(space_key, parent_id, &plan.title, &plan.body)?;
        for attachment in &plan.attachments {
            let data = std::fs::read(&attachment.path).map_err(|source| PublishError::Io {
                path: attachment.path.clone(),
                source,
            })?;
            self.client.upload_attachment(
                &page.id,
                &attachment.filename,
                &data,
                attachment.content_type,
            )?;
        }
        Ok(page)
    }
}

/// Publish `output` using its `[confluence]` configuration.
///
/// # Errors
///
/// Returns [`PublishError::Config`] if the section is missing or invalid.
pub fn publish_model(output: &ModelOutput) -> Result<PublishResult, PublishError> {
    let conf = output.config.require_confluence()?;
    let client = ConfluenceClient::from_config(conf);
    Publisher::new(&client, &conf.parent_page_id).publish(output)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use pretty_assertions::assert_eq;

    use super::*;

    fn config(title: Option<&str>) -> ModelConfig {
        let title = title.map(|t| format!("title = \"{t}\"\n")).unwrap_or_default();
        ModelConfig::from_toml(&format!("[main]\nmodel = \"L3VPN\"\nversion = \"1.0\"\n{title}")).unwrap()
    }

    #[test]
    fn test_model_page_title() {
        assert_eq!(model_page_title(&config(None)), "L3VPN v1.0");
        assert_eq!(model_page_title(&config(Some("Metro Ring"))), "Metro Ring");
    }

    #[test]
    fn test_plan_model_page_without_sheet() {
        let plan = plan_model_page(&config(None), Path::new("/jobs/zip/graphyte-9.zip"), None).unwrap();
        assert_eq!(plan.title, "L3VPN v1.0");
        assert_eq!(
            plan.attachments,
            vec![AttachmentPlan {
                path: PathBuf::from("/jobs/zip/graphyte-9.zip"),
                filename: "graphyte-9.zip".to_owned(),
                content_type: "application/zip",
            }]
        );
        assert!(plan.body.contains("ri:filename=\"graphyte-9.zip\""));
        assert!(plan.body.contains("<h1>Modules</h1>"));
        assert!(!plan.body.contains("Model Variables"));
    }

    #[test]
    fn test_plan_model_page_with_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("params.csv");
        std::fs::write(&sheet, "Name,Description\n<VLAN_ID>,vlan\n").unwrap();

        let plan = plan_model_page(&config(None), Path::new("m.zip"), Some(&sheet)).unwrap();
        assert!(plan.body.contains("<h1>Model Variables</h1>"));
        assert!(plan.body.contains("<th>Name</th><th>Description</th>"));
        assert!(plan.body.contains("<td>&lt;VLAN_ID&gt;</td><td>vlan</td>"));
        assert_eq!(plan.attachments[1].content_type, "text/csv");
    }

    #[test]
    fn test_plan_module_page() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("Core.svg");
        let txt = dir.path().join("cmds.txt");
        let csv = dir.path().join("rules.csv");
        std::fs::write(&svg, "<svg/>").unwrap();
        std::fs::write(&txt, "set vlan <VLAN_ID>\n").unwrap();
        std::fs::write(&csv, "a,b\n\"x, y\",z\n").unwrap();

        let module = ModuleOutput {
            module: "Core".to_owned(),
            output_path: dir.path().join("www/L3VPN_Core_v1.0.html"),
            diagram: svg,
            rendered_svg: None,
            templates: BTreeMap::from([
                ("cmds.txt".to_owned(), txt),
                ("rules.csv".to_owned(), csv),
            ]),
            linked_files: BTreeSet::new(),
            invalid_parameters: false,
        };

        let plan = plan_module_page(&module, "(2024-05-01@10:00:00)").unwrap();
        assert_eq!(plan.title, "L3VPN_Core_v1.0 (2024-05-01@10:00:00)");
        let names: Vec<_> = plan.attachments.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["Core.svg", "cmds.txt"]);
        assert!(plan.body.contains("<h2>Module Templates</h2>"));
        assert!(plan.body.contains("<![CDATA[set vlan <VLAN_ID>\n]]>"));
        assert!(plan.body.contains("<td>x, y</td><td>z</td>"));
    }

    #[test]
    fn test_module_page_without_templates() {
        let module = ModuleOutput {
            module: "Solo".to_owned(),
            output_path: PathBuf::from("M_Solo_v1.html"),
            diagram: PathBuf::from("work/Solo.svg"),
            rendered_svg: Some(PathBuf::from("work/Solo.svg")),
            templates: BTreeMap::new(),
            linked_files: BTreeSet::new(),
            invalid_parameters: false,
        };
        let plan = plan_module_page(&module, "(t)").unwrap();
        assert!(!plan.body.contains("Module Templates"));
        assert_eq!(plan.attachments.len(), 1);
        assert_eq!(plan.attachments[0].content_type, "image/svg+xml");
    }
}
