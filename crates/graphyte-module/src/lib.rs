//! Per-module build state for Graphyte.
//!
//! A [`ModuleContext`] is created once per diagram and threaded by reference
//! through every stage of a module build:
//!
//! 1. the parameter sheet loader stores the authorized names,
//! 2. the SVG normalizer records local links and resolves `mod:` targets,
//! 3. the parameter extractor records decision and template parameters,
//! 4. page assembly reads the naming fields, menu and parameter table.
//!
//! Nothing in here touches the file system; the context only holds paths.

mod context;
mod naming;
mod record;
pub mod script;

pub use context::{DiagramKind, ModuleContext, ModuleError, ModuleSettings};
pub use naming::{module_file_name, module_label};
pub use record::{ParameterCategory, ParameterRecord, Verdict};
