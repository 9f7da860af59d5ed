//! Transcript Compliance Server
//!
//! Flags words from a compliance word list in video transcripts. Provides
//! REST endpoints for:
//!
//! - Transcript analysis by video id (captions are fetched) or raw text
//! - Listing the configured compliance terms
//!
//! Every analysis returns the matching terms with their risk ratings plus a
//! byte-offset index of each occurrence for client-side highlighting.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use compliance_engine::TermListConfig;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
#[cfg(test)]
mod tests;
mod transcript;

use api::{handle_analyze, handle_analyze_form, handle_health, handle_index, handle_list_terms};
use transcript::{FallbackSource, TranscriptSource};

/// Command-line arguments for the compliance server
#[derive(Parser, Debug)]
#[command(name = "compliance-server")]
#[command(about = "Flags compliance words in video transcripts")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// CSV file with the compliance word list
    #[arg(long, env = "COMPLIANCE_WORD_LIST", default_value = "Compliant Word List.csv")]
    word_list: PathBuf,

    /// Header of the word column in the word list
    #[arg(long, env = "WORD_COLUMN", default_value = "Name")]
    word_column: String,

    /// Header of the risk column in the word list
    #[arg(long, env = "RISK_COLUMN", default_value = "Risk Rating")]
    risk_column: String,

    /// Caption language to request
    #[arg(long, env = "CAPTION_LANG", default_value = "en")]
    caption_lang: String,

    /// Transcript fetch timeout in milliseconds
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value = "10000")]
    fetch_timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Word list path, re-read on every analysis
    pub word_list: PathBuf,
    pub term_config: TermListConfig,
    pub transcripts: Arc<dyn TranscriptSource>,
    /// Transcript fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,
}

/// Routes shared by the binary and the endpoint tests
pub fn router(state: AppState) -> Router {
    Router::new()
        // Analysis form page
        .route("/", get(handle_index))
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/terms", get(handle_list_terms))
        .route("/api/analyze", post(handle_analyze))
        // Form-encoded variant for plain HTML forms
        .route("/analyze", post(handle_analyze_form))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting compliance server on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Rate limit must be greater than zero")?,
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("compliance-server/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_millis(args.fetch_timeout_ms))
        .build()
        .context("Failed to build HTTP client")?;

    // Create shared state
    let state = AppState {
        word_list: args.word_list.clone(),
        term_config: TermListConfig {
            word_column: args.word_column,
            risk_column: args.risk_column,
        },
        transcripts: Arc::new(FallbackSource::default_chain(client, &args.caption_lang)),
        fetch_timeout_ms: args.fetch_timeout_ms,
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        // Apply middleware
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Word list: {}", args.word_list.display());
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Transcript fetch timeout: {}ms", args.fetch_timeout_ms);

    // Peer addresses are needed for per-IP rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
