//! Page operations for Confluence API.

use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::Page;

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let mut url = format!("{}/content/{}", self.api_url(), page_id);

        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }

        info!(page_id, "Getting page");

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        Ok(check_status(response)?.read_json()?)
    }

    /// Space key of an existing page.
    pub fn get_space_key(&self, page_id: &str) -> Result<String, ConfluenceError> {
        self.get_page(page_id, &["space"])?
            .space
            .map(|s| s.key)
            .ok_or_else(|| ConfluenceError::UnexpectedResponse(format!("page {page_id} has no space")))
    }

    /// Create a page under `parent_id` with a storage-format body.
    pub fn create_page(
        &self,
        space_key: &str,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "ancestors": [{"id": parent_id}],
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        info!(title, parent_id, "Creating page");

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = check_status(response)?.read_json()?;
        info!(page_id = %page.id, "Created page");
        Ok(page)
    }

    /// Get web URL for page.
    pub fn page_url(&self, page: &Page) -> String {
        if let Some(links) = &page.links
            && let Some(webui) = &links.webui
        {
            return format!("{}{}", self.base_url, webui);
        }

        format!(
            "{}/pages/viewpage.action?pageId={}",
            self.base_url, page.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Links;

    #[test]
    fn test_page_url_prefers_webui() {
        let client = ConfluenceClient::new("https://wiki.example.com", "u", "p");
        let mut page = Page {
            id: "7".to_owned(),
            title: "T".to_owned(),
            space: None,
            links: Some(Links {
                webui: Some("/display/NET/T".to_owned()),
            }),
        };
        assert_eq!(client.page_url(&page), "https://wiki.example.com/display/NET/T");

        page.links = None;
        assert_eq!(
            client.page_url(&page),
            "https://wiki.example.com/pages/viewpage.action?pageId=7"
        );
    }
}
