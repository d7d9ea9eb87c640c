//! Confluence REST types.
//!
//! Only the fields the publisher reads are modelled; serde ignores the rest.

use serde::Deserialize;

/// Confluence page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Space the page lives in, present when expanded.
    #[serde(default)]
    pub space: Option<Space>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

/// Confluence space.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Confluence attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_space() {
        let page: Page = serde_json::from_str(
            r#"{"id":"42","type":"page","title":"Models","space":{"key":"NET","name":"Network"},
                "_links":{"webui":"/display/NET/Models"}}"#,
        )
        .unwrap();
        assert_eq!(page.space.unwrap().key, "NET");
        assert_eq!(page.links.unwrap().webui.as_deref(), Some("/display/NET/Models"));
    }

    #[test]
    fn test_page_minimal() {
        let page: Page = serde_json::from_str(r#"{"id":"1","title":"T"}"#).unwrap();
        assert!(page.space.is_none());
        assert!(page.links.is_none());
    }
}
