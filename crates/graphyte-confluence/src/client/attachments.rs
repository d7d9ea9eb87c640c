//! Attachment operations for Confluence API.

use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

impl ConfluenceClient {
    /// Attach `data` to a page as `filename`, replacing the data of an
    /// existing attachment with the same name.
    pub fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let collection = format!("{}/content/{page_id}/child/attachment", self.api_url());
        let existing = self
            .get_attachments(page_id)?
            .results
            .into_iter()
            .find(|a| a.title == filename);

        let url = match &existing {
            Some(att) => format!("{collection}/{}/data", att.id),
            None => collection,
        };
        info!(
            page_id,
            filename,
            bytes = data.len(),
            replace = existing.is_some(),
            "Uploading attachment"
        );

        let boundary = format!("graphyte-{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, filename, content_type, data);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", &format!("multipart/form-data; boundary={boundary}"))
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;
        let mut reader = check_status(response)?;

        // Replacing returns the attachment, creating returns a result list.
        if existing.is_some() {
            return Ok(reader.read_json()?);
        }
        let created: AttachmentsResponse = reader.read_json()?;
        created.results.into_iter().next().ok_or_else(|| {
            ConfluenceError::UnexpectedResponse(format!("no attachment returned for {filename}"))
        })
    }

    /// List attachments on a page.
    pub fn get_attachments(&self, page_id: &str) -> Result<AttachmentsResponse, ConfluenceError> {
        let url = format!("{}/content/{page_id}/child/attachment", self.api_url());
        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;
        Ok(check_status(response)?.read_json()?)
    }
}

/// Single-file `multipart/form-data` body.
fn multipart_body(boundary: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let head = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--\r\n");

    let mut body = Vec::with_capacity(head.len() + data.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(tail.as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_multipart_body() {
        let body = multipart_body("XYZ", "a.svg", "image/svg+xml", b"<svg/>");
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"a.svg\"\r\n\
             Content-Type: image/svg+xml\r\n\r\n\
             <svg/>\r\n\
             --XYZ--\r\n"
        );
    }
}
