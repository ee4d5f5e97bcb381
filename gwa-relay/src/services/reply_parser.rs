//! Model reply parser
//!
//! The image-analysis prompt asks the model for a bare JSON object, but
//! replies routinely arrive wrapped in a Markdown code fence, with or
//! without a language tag. This parser is total over arbitrary model
//! output: it strips an optional surrounding fence, then requires a strict
//! JSON parse of the remainder. Anything else (empty input, prose,
//! truncated braces, trailing text) is an explicit parse error, never a
//! panic and never partially-decoded data.

use crate::models::ImageAnalysisRecord;
use thiserror::Error;

/// Reply parse failures
#[derive(Debug, Error)]
pub enum ReplyParseError {
    /// Reply was empty or whitespace-only
    #[error("Model reply was empty")]
    Empty,

    /// Reply did not contain a well-formed JSON object of the expected shape
    #[error("Model reply was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Parse a raw model reply into an [`ImageAnalysisRecord`].
///
/// Accepts both fenced and unfenced JSON; fence stripping is best-effort
/// and never fails on its own. A reply that still isn't valid JSON after
/// stripping fails the strict parse.
pub fn parse_analysis_reply(raw: &str) -> Result<ImageAnalysisRecord, ReplyParseError> {
    let stripped = strip_code_fence(raw);
    if stripped.is_empty() {
        return Err(ReplyParseError::Empty);
    }
    let record = serde_json::from_str(stripped)?;
    Ok(record)
}

/// Remove a surrounding triple-backtick fence, if present.
///
/// Handles an optional language tag on the opening fence (```json). Input
/// without a fence is returned trimmed and otherwise untouched.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag: everything up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        // Opening fence with no newline, e.g. "```{...}```"
        None => rest,
    };

    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}
