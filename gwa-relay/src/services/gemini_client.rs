//! Gemini generative model client
//!
//! Thin wrapper over the `generateContent` REST endpoint. Carries the
//! system instruction on every call, supports mixed text + inline-image
//! parts, and applies an explicit per-request deadline. A single call is
//! made per operation; failures are never retried.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use base64::{engine::general_purpose, Engine as _};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for the image-analysis operation
pub const IMAGE_ANALYSIS_MODEL: &str = "models/gemini-1.5-pro";

/// Model used for the verdict-synthesis operation
pub const VERDICT_MODEL: &str = "models/gemini-1.5-flash";

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The call did not complete within the configured deadline
    #[error("Model call exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),

    /// Gemini API returned an error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to decode the API response JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The model answered but produced no text
    #[error("Model reply contained no text")]
    EmptyReply,
}

/// One part of a model request: either prompt text or inline binary data
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Inline binary payload, base64-encoded and tagged with its MIME type
#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini API client
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client with the given credential and per-call deadline
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, timeout, GEMINI_BASE_URL.to_string())
    }

    /// Create a client against a non-default endpoint (tests)
    pub fn with_base_url(
        api_key: String,
        timeout: Duration,
        base_url: String,
    ) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            timeout,
        })
    }

    /// Build a text part from prompt text
    pub fn text_part(text: impl Into<String>) -> GeminiPart {
        GeminiPart::Text { text: text.into() }
    }

    /// Build an inline-image part from raw bytes
    pub fn inline_image_part(mime_type: &str, bytes: &[u8]) -> GeminiPart {
        GeminiPart::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.to_string(),
                data: general_purpose::STANDARD.encode(bytes),
            },
        }
    }

    /// Send one `generateContent` call and return the reply text.
    ///
    /// `model` is a full model resource name, e.g. [`IMAGE_ANALYSIS_MODEL`].
    /// The reply is the concatenated text of the first candidate's parts.
    pub async fn generate(
        &self,
        model: &str,
        parts: Vec<GeminiPart>,
    ) -> Result<String, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: crate::services::prompts::SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![Content { parts }],
        };

        tracing::debug!(model = %model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError::DeadlineExceeded(self.timeout)
                } else {
                    GeminiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiError(status.as_u16(), truncate(&body, 500)));
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ParseError(e.to_string()))?;

        let text = extract_reply_text(&decoded);
        if text.is_empty() {
            return Err(GeminiError::EmptyReply);
        }
        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_reply_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .as_deref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.as_deref())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
