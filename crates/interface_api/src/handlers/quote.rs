//! Quote handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use validator::Validate;

use domain_quote::{QuickQuote, QuoteOutcome};

use crate::dto::quote::{FullQuoteRequest, QuickQuotePayload};
use crate::{error::ApiError, AppState};

/// Prices a full quote against the current catalog snapshot
///
/// A selection miss is a 200 response carrying the `{"error": ...}` sentinel.
pub async fn full_quote(
    State(state): State<AppState>,
    payload: Result<Json<FullQuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteOutcome>, ApiError> {
    let Json(body) = payload?;
    body.validate()?;
    let request = body.into_domain()?;

    let catalog = state.catalog().await;
    let outcome = state.service.full_quote(&catalog, &request)?;
    Ok(Json(outcome))
}

/// Prices a quick quote from the rating tables
pub async fn quick_quote(
    State(state): State<AppState>,
    payload: Result<Json<QuickQuotePayload>, JsonRejection>,
) -> Result<Json<QuickQuote>, ApiError> {
    let Json(body) = payload?;
    body.validate()?;
    let quote = state.service.quick_quote(&body.into_domain())?;
    Ok(Json(quote))
}
