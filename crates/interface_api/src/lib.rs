//! HTTP API Layer
//!
//! This crate exposes the quoting core over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: full quotes, quick quotes, catalog reporting and reload
//! - **Middleware**: request ids, tracing and audit logging
//! - **DTOs**: camelCase request/response shapes
//! - **Rule source**: JSON file adapter for the stored pricing rules
//! - **Error Handling**: consistent `{error, message}` responses
//!
//! The rule catalog is held as an `Arc` snapshot. A reload builds a new
//! catalog and swaps the pointer; requests already running keep the
//! snapshot they read.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::initialize(config, source, service).await?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod rule_source;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::PortError;
use domain_quote::{PricingRuleSource, QuoteService, RuleCatalog};

use crate::config::ApiConfig;
use crate::handlers::{health, quote, rules};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<Arc<RuleCatalog>>>,
    reload_lock: Arc<Mutex<()>>,
    pub source: Arc<dyn PricingRuleSource>,
    pub service: QuoteService,
    pub config: ApiConfig,
}

impl AppState {
    /// Loads the first catalog snapshot from the source
    ///
    /// # Errors
    ///
    /// Returns the source's `PortError` if the rules cannot be read.
    pub async fn initialize(
        config: ApiConfig,
        source: Arc<dyn PricingRuleSource>,
        service: QuoteService,
    ) -> Result<Self, PortError> {
        let catalog = source.load_catalog().await?;
        tracing::info!(
            source = %source.describe(),
            rules = catalog.len(),
            excluded = catalog.excluded_count(),
            "initial pricing rule catalog loaded"
        );

        Ok(Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            reload_lock: Arc::new(Mutex::new(())),
            source,
            service,
            config,
        })
    }

    /// The current catalog snapshot
    pub async fn catalog(&self) -> Arc<RuleCatalog> {
        self.catalog.read().await.clone()
    }

    /// Re-reads the source and swaps in the new snapshot
    ///
    /// Reloads run one at a time so the snapshot installed last is always
    /// the one read last. Quotes keep reading the old snapshot meanwhile.
    /// On failure the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<Arc<RuleCatalog>, PortError> {
        let _reloading = self.reload_lock.lock().await;
        let fresh = Arc::new(self.source.load_catalog().await?);
        *self.catalog.write().await = fresh.clone();
        tracing::info!(catalog_id = %fresh.id(), rules = fresh.len(), "pricing rule catalog reloaded");
        Ok(fresh)
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared state with the loaded catalog and quote service
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Quote routes
    let quote_routes = Router::new()
        .route("/full", post(quote::full_quote))
        .route("/quick", post(quote::quick_quote));

    // Pricing rule routes
    let rule_routes = Router::new()
        .route("/issues", get(rules::catalog_issues))
        .route("/reload", post(rules::reload_catalog));

    let api_routes = Router::new()
        .nest("/quotes", quote_routes)
        .nest("/pricing-rules", rule_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
