//! Page assembly and model builds for Graphyte.
//!
//! [`ModuleBuilder`] turns one diagram and its linked files into a
//! self-contained HTML page. [`ModelBuilder`] does the same for every
//! diagram of a model directory, sharing one navigation menu, and can
//! package the result with [`zip_dir`].
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use graphyte_site::{ModelBuilder, ModelLayout};
//!
//! let layout = ModelLayout::resolve(Path::new("models/l3vpn"), None, false)?;
//! let output = ModelBuilder::new().build(layout)?;
//! println!("{} pages", output.modules.len());
//! ```

mod builder;
mod menu;
mod model;
mod package;
mod template;

pub use builder::{BuildError, ModuleBuilder, ModuleOutput};
pub use menu::build_menu;
pub use model::{
    ARCHIVE_DIRNAME, BUILD_LOG, JOBS_LOG, ModelBuilder, ModelError, ModelLayout, ModelOutput,
    OUTPUT_DIRNAME,
};
pub use package::{PackageError, zip_dir};
pub use template::{MODULE_TEMPLATE, PageFragments, fill_template, render_module_page, render_with};
