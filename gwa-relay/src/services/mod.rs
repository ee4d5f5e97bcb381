//! External-service clients and pure helpers

pub mod extraction_client;
pub mod gemini_client;
pub mod prompts;
pub mod reply_parser;

pub use extraction_client::{ExtractError, ExtractionClient};
pub use gemini_client::{GeminiClient, GeminiError, GeminiPart};
pub use reply_parser::{parse_analysis_reply, ReplyParseError};
