//! # GWA Common Library
//!
//! Shared code for the greenwashing-analyzer services including:
//! - Common error types
//! - Configuration loading

pub mod config;
pub mod error;

pub use config::RelayConfig;
pub use error::{Error, Result};
