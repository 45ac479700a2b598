//! Quote Engine - API Server Binary
//!
//! This binary starts the HTTP API server for the quoting core.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration (empty catalog)
//! cargo run --bin quote-api
//!
//! # Serve a rule file
//! API_RULES_PATH=./rules.json API_PORT=8080 cargo run --bin quote-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_RULES_PATH` - JSON file with the stored pricing rules
//! * `API_TABLES_PATH` - JSON file with rating table overrides
//! * `API_CURRENCY` - ISO 4217 code stamped on quotes (default: INR)
//! * `API_DEFAULT_TAX_PERCENT` - Tax for full quotes that name none (default: 18)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_quote::{InMemoryRuleSource, PricingRuleSource, QuoteService};
use interface_api::{config::ApiConfig, create_router, rule_source::JsonFileRuleSource, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration and rating tables, loads the
/// pricing rule catalog, and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration or rating tables are invalid
/// - The rule source cannot be read
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("reading API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting quote engine API server"
    );

    let tables = config.rating_tables().context("building rating tables")?;
    let currency = config.currency().context("parsing API_CURRENCY")?;
    let service = QuoteService::new(Arc::new(tables), Arc::new(SystemClock)).with_currency(currency);

    let source = rule_source(&config);
    let state = AppState::initialize(config.clone(), source, service)
        .await
        .context("loading pricing rules")?;

    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Picks the rule source from configuration
fn rule_source(config: &ApiConfig) -> Arc<dyn PricingRuleSource> {
    match &config.rules_path {
        Some(path) => Arc::new(JsonFileRuleSource::new(path)),
        None => {
            tracing::warn!("API_RULES_PATH not set, serving an empty pricing rule catalog");
            Arc::new(InMemoryRuleSource::default())
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
