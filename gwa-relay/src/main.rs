//! gwa-relay - Greenwashing Analyzer relay service
//!
//! HTTP relay between the four-step assessment UI and its two external
//! collaborators: the Gemini generative model (image analysis, verdict
//! synthesis) and the PDF text-extraction service.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gwa_common::RelayConfig;
use gwa_relay::services::{ExtractionClient, GeminiClient};
use gwa_relay::AppState;

/// Command-line arguments for gwa-relay
#[derive(Parser, Debug)]
#[command(name = "gwa-relay")]
#[command(about = "Greenwashing Analyzer relay service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "GWA_PORT")]
    port: Option<u16>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Base URL of the PDF extraction service
    #[arg(long, env = "GWA_EXTRACTOR_URL")]
    extractor_url: Option<String>,

    /// Deadline for each upstream call, in seconds
    #[arg(long, env = "GWA_UPSTREAM_TIMEOUT_SECS")]
    upstream_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gwa_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = RelayConfig::resolve(
        args.port,
        args.gemini_api_key,
        args.extractor_url,
        args.upstream_timeout_secs,
    )
    .context("Failed to resolve configuration")?;

    info!("Starting gwa-relay (Greenwashing Analyzer)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Extraction service: {}", config.extractor_base_url);
    info!("Upstream deadline: {:?}", config.upstream_timeout);

    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.upstream_timeout)
        .context("Failed to initialize Gemini client")?;
    let extractor = ExtractionClient::new(
        config.extractor_base_url.clone(),
        config.upstream_timeout,
    )
    .context("Failed to initialize extraction client")?;

    let state = AppState::new(gemini, extractor);
    let app = gwa_relay::build_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
