//! PDF extraction collaborator client
//!
//! Forwards an uploaded report to the external extraction service's
//! `POST /extract` endpoint as a multipart form and returns the extracted
//! plain text verbatim. One call per request, no retries.

use crate::models::UploadedFile;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Extraction client errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The call did not complete within the configured deadline
    #[error("Extraction call exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),

    /// Extraction service returned an error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to decode the service response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// `POST /extract` success body; the human-readable `message` field is
/// accepted but unused
#[derive(Debug, Deserialize)]
struct ExtractResponse {
    extracted_text: String,
}

/// Client for the PDF text-extraction collaborator
pub struct ExtractionClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ExtractionClient {
    /// Create a new client for the collaborator at `base_url`
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Forward one PDF and return the extracted text verbatim
    pub async fn extract(&self, document: &UploadedFile) -> Result<String, ExtractError> {
        let url = format!("{}/extract", self.base_url);

        let part = reqwest::multipart::Part::bytes(document.bytes.to_vec())
            .file_name(
                document
                    .file_name
                    .clone()
                    .unwrap_or_else(|| "report.pdf".to_string()),
            )
            .mime_str(&document.mime_type)
            .map_err(|e| ExtractError::NetworkError(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("pdf", part);

        tracing::debug!(
            url = %url,
            size_bytes = document.size_bytes(),
            "Forwarding report to extraction service"
        );

        let response = self.client.post(&url).multipart(form).send().await.map_err(|e| {
            if e.is_timeout() {
                ExtractError::DeadlineExceeded(self.timeout)
            } else {
                ExtractError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::ApiError(status.as_u16(), body));
        }

        let decoded: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::ParseError(e.to_string()))?;

        Ok(decoded.extracted_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_decodes_extracted_text() {
        let decoded: ExtractResponse = serde_json::from_str(
            r#"{"message":"Text and image data extracted successfully.","extracted_text":"Annual sustainability report..."}"#,
        )
        .unwrap();
        assert_eq!(decoded.extracted_text, "Annual sustainability report...");
    }

    #[test]
    fn body_without_extracted_text_is_a_parse_error() {
        let decoded = serde_json::from_str::<ExtractResponse>(r#"{"error":"no file"}"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn base_url_trailing_slash_normalized() {
        let client = ExtractionClient::new(
            "http://127.0.0.1:5000/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
    }
}
