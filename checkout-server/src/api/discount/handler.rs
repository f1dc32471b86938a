//! Discount API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::models::DiscountTerms;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountTerms>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validate a discount code against the ledger.
///
/// An unknown or exhausted code is a normal `success: false` response,
/// not an error status.
pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<ValidateResponse>> {
    payload.validate()?;
    let validation = state.checkout.validate_discount(&payload.code).await?;
    Ok(Json(ValidateResponse {
        success: validation.valid,
        discount: validation.terms,
        error: validation.error,
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IncrementRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    /// Payment the redemption settles against; the idempotency key is
    /// derived from it
    #[validate(length(min = 1, max = 128))]
    pub payment_id: String,
}

#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub success: bool,
}

/// Keyed usage increment for a confirmed payment
pub async fn increment(
    State(state): State<ServerState>,
    Json(payload): Json<IncrementRequest>,
) -> AppResult<Json<IncrementResponse>> {
    payload.validate()?;
    state
        .checkout
        .increment_discount(&payload.code, &payload.payment_id)
        .await?;
    Ok(Json(IncrementResponse { success: true }))
}
