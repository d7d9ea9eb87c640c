//! Diagram handling for Graphyte.
//!
//! - [`convert`]: YANG → UML → SVG through pyang and `PlantUML`, each run
//!   as a bounded child process behind a trait
//! - [`svg`]: the normalizer that makes an SVG safe to embed inline and
//!   turns its hyperlinks into module links, literal links or viewer
//!   wrappers for linked files

mod consts;
pub mod convert;
mod plantuml;
pub mod svg;
pub mod tools;

pub use convert::{
    ConversionError, PlantUml, Pyang, SchemaConverter, UmlFeature, UmlRenderer,
    UnknownUmlFeature, render_diagram,
};
pub use plantuml::{strip_pyang_banner, strip_startuml_args};
pub use svg::{NormalizeError, SourceFormat, normalize_svg, process_svg};
pub use tools::{ToolError, ToolOutput, run_with_timeout};
