//! Single module build.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use graphyte_diagrams::{
    ConversionError, NormalizeError, SchemaConverter, UmlFeature, UmlRenderer, process_svg,
    render_diagram,
};
use graphyte_module::{DiagramKind, ModuleContext};
use graphyte_params::{
    ExtractError, SheetError, extract_templates, load_parameter_sheet,
    parameter_table_file_name, render_parameter_table,
};
use tracing::{info, info_span, warn};

use crate::menu::build_menu;
use crate::template::{PageFragments, render_module_page};

/// Error building one module page.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The parameter sheet could not be read.
    #[error(transparent)]
    Sheet(#[from] SheetError),
    /// The diagram could not be converted to SVG.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The SVG could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// The linked files could not be processed.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// Writing the page failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// What a module build produced.
#[derive(Debug)]
pub struct ModuleOutput {
    /// Module name.
    pub module: String,
    /// Written page.
    pub output_path: PathBuf,
    /// SVG the page was built from.
    pub diagram: PathBuf,
    /// SVG rendered from UML or YANG, absent for SVG sources.
    pub rendered_svg: Option<PathBuf>,
    /// Embedded linked files, name → path.
    pub templates: BTreeMap<String, PathBuf>,
    /// Local files the diagram links to.
    pub linked_files: BTreeSet<String>,
    /// An unauthorized parameter was found.
    pub invalid_parameters: bool,
}

/// Builds module pages using a schema converter and UML renderer.
pub struct ModuleBuilder<'t> {
    converter: &'t dyn SchemaConverter,
    renderer: &'t dyn UmlRenderer,
    uml_no: Vec<UmlFeature>,
}

impl<'t> ModuleBuilder<'t> {
    pub fn new(converter: &'t dyn SchemaConverter, renderer: &'t dyn UmlRenderer) -> Self {
        Self {
            converter,
            renderer,
            uml_no: vec![UmlFeature::Annotation],
        }
    }

    /// Set the pyang `--uml-no` exclusions used for YANG diagrams.
    #[must_use]
    pub fn with_uml_no(mut self, features: Vec<UmlFeature>) -> Self {
        self.uml_no = features;
        self
    }

    /// Build the page for `ctx`.
    ///
    /// Stages run in order: parameter sheet, diagram conversion, SVG
    /// normalization, linked file extraction, page assembly.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] for the first stage that fails.
    pub fn build(&self, mut ctx: ModuleContext) -> Result<ModuleOutput, BuildError> {
        let span = info_span!("module", name = %ctx.module());
        let _guard = span.enter();
        info!(diagram = %ctx.diagram_path().display(), "Building module");

        let xls = load_parameter_sheet(&mut ctx)?;

        let svg_path = render_diagram(&ctx, self.converter, self.renderer, &self.uml_no)?;
        let rendered_svg = (ctx.diagram_kind() != DiagramKind::Svg).then(|| svg_path.clone());

        let svg = process_svg(&svg_path, &mut ctx)?;
        let extracted = extract_templates(&mut ctx)?;

        let mut templates = extracted.script;
        templates.push_str(&render_parameter_table(&mut ctx));

        if ctx.invalid_param_found() {
            warn!("Unauthorized parameters found");
        }

        let page = PageFragments {
            title: ctx.title(),
            params_csv: parameter_table_file_name(&ctx),
            svg,
            templates,
            menu: build_menu(&ctx),
            xls,
            menu_width: ctx.menu_width(),
            alert: ctx.invalid_param_found(),
            has_links: !ctx.linked_files().is_empty(),
            changes_file: ctx.changes_file().map(str::to_owned),
        };
        let html = render_module_page(&page);

        let output_path = ctx.output_path().to_path_buf();
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&output_path, html).map_err(|source| BuildError::Io {
            path: output_path.clone(),
            source,
        })?;
        info!(output = %output_path.display(), "Module written");

        Ok(ModuleOutput {
            module: ctx.module().to_owned(),
            output_path,
            diagram: svg_path,
            rendered_svg,
            templates: extracted.files,
            linked_files: ctx.linked_files().clone(),
            invalid_parameters: ctx.invalid_param_found(),
        })
    }
}
