//! Parameter handling for Graphyte.
//!
//! - [`sheet`]: the authorization sheet of legal parameter names
//! - [`extract`]: embedding of linked files and placeholder mining
//! - [`table`]: the sorted parameter table embedded in every page

pub mod extract;
mod name;
pub mod sheet;
pub mod table;

pub use extract::{ExtractError, ExtractedTemplates, extract_templates};
pub use name::{is_false_positive, is_valid_parameter_name};
pub use sheet::{ParameterSheet, SheetError, load_parameter_sheet};
pub use table::{parameter_table_file_name, render_parameter_table};
