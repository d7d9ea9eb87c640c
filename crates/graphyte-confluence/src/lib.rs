//! Confluence publishing for Graphyte.
//!
//! - [`ConfluenceClient`]: REST API client with basic authentication
//! - [`Publisher`]: creates the page tree for a built model
//!
//! ```ignore
//! use graphyte_confluence::publish_model;
//!
//! let result = publish_model(&output)?;
//! println!("Published to {}", result.url);
//! ```

mod client;
pub mod error;
mod publish;
pub mod storage;
mod types;

pub use client::ConfluenceClient;
pub use error::{ConfluenceError, PublishError};
pub use publish::{
    AttachmentPlan, PagePlan, PublishResult, Publisher, model_page_title, plan_model_page,
    plan_module_page, publish_model,
};
pub use types::{Attachment, AttachmentsResponse, Links, Page, Space};
