//! Pricing rule catalog handlers

use axum::{extract::State, Json};

use crate::dto::rules::CatalogReport;
use crate::{error::ApiError, AppState};

/// Reports the current snapshot and its load-time issues
pub async fn catalog_issues(State(state): State<AppState>) -> Json<CatalogReport> {
    let catalog = state.catalog().await;
    Json(CatalogReport::from(catalog.as_ref()))
}

/// Re-reads the rule source and swaps in the new snapshot
///
/// In-flight quotes keep the snapshot they started with.
pub async fn reload_catalog(State(state): State<AppState>) -> Result<Json<CatalogReport>, ApiError> {
    let catalog = state.reload().await?;
    Ok(Json(CatalogReport::from(catalog.as_ref())))
}
