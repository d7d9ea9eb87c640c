//! Confluence REST API client.
//!
//! Sync HTTP client for Confluence Server/Data Center REST API with basic
//! authentication.

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use graphyte_config::ConfluenceConfig;
use ureq::Agent;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client for `base_url` authenticating as `username`.
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: basic_auth(username, password),
        }
    }

    /// Create a client from the `[confluence]` section.
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        Self::new(&config.base_url, &config.username, &config.password)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Turn an error status into [`ConfluenceError::HttpResponse`].
fn check_status(
    response: ureq::http::Response<ureq::Body>,
) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();
    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_basic_auth_header() {
        assert_eq!(basic_auth("Aladdin", "open sesame"), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = ConfluenceClient::new("https://wiki.example.com/conf/", "u", "p");
        assert_eq!(client.base_url(), "https://wiki.example.com/conf");
        assert_eq!(client.api_url(), "https://wiki.example.com/conf/rest/api");
    }
}
