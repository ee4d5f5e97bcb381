//! Configuration loading for the relay service
//!
//! Each setting is resolved following the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`<config-dir>/gwa/config.toml`)
//! 4. Compiled default (fallback)
//!
//! CLI and environment values are parsed by the binary (clap) and handed in
//! as overrides; this module supplies the TOML and default layers.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default listening port for the relay
pub const DEFAULT_PORT: u16 = 3000;

/// Default base URL of the PDF extraction collaborator
pub const DEFAULT_EXTRACTOR_URL: &str = "http://127.0.0.1:5000";

/// Default deadline for a single upstream call, in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Resolved relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port the relay listens on
    pub port: u16,
    /// API credential for the generative model
    pub gemini_api_key: String,
    /// Base URL of the PDF extraction collaborator
    pub extractor_base_url: String,
    /// Deadline applied to each upstream call
    pub upstream_timeout: Duration,
}

/// TOML config file shape (all fields optional)
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    port: Option<u16>,
    gemini_api_key: Option<String>,
    extractor_base_url: Option<String>,
    upstream_timeout_secs: Option<u64>,
}

impl RelayConfig {
    /// Resolve configuration from CLI/env overrides plus the TOML/default layers.
    ///
    /// `api_key_override`, `port_override`, `extractor_override`, and
    /// `timeout_override` come from clap (CLI flag or env var). A missing
    /// API key after all layers is a startup error.
    pub fn resolve(
        port_override: Option<u16>,
        api_key_override: Option<String>,
        extractor_override: Option<String>,
        timeout_override: Option<u64>,
    ) -> Result<Self> {
        let file = load_config_file()
            .and_then(|path| read_config_file(&path))
            .unwrap_or_default();

        let gemini_api_key = api_key_override
            .or(file.gemini_api_key)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "No Gemini API key configured (set GEMINI_API_KEY or gemini_api_key in config.toml)"
                        .to_string(),
                )
            })?;

        let timeout_secs = timeout_override
            .or(file.upstream_timeout_secs)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "upstream_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            port: port_override.or(file.port).unwrap_or(DEFAULT_PORT),
            gemini_api_key,
            extractor_base_url: extractor_override
                .or(file.extractor_base_url)
                .unwrap_or_else(|| DEFAULT_EXTRACTOR_URL.to_string()),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Locate the configuration file for the platform, if one exists
fn load_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("gwa").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/gwa/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a config file, tolerating a missing or unreadable file
fn read_config_file(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<ConfigFile>(&content) {
        Ok(cfg) => Some(cfg),
        Err(_) => None,
    }
}
