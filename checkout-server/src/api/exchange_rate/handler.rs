//! Exchange Rate API Handlers

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::ServerState;

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub success: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    /// True when the rate came from the cache slot
    pub cached: bool,
    /// True when the fallback constant was substituted because the
    /// upstream source could not be reached
    pub fallback: bool,
}

/// Current FX rate from the single-slot cache.
///
/// Never fails: a broken upstream degrades to the fallback constant.
pub async fn current_rate(State(state): State<ServerState>) -> Json<RateResponse> {
    let quote = state.checkout.exchange_rate().await;
    Json(RateResponse {
        success: true,
        rate: quote.rate,
        cached: quote.cached,
        fallback: quote.degraded,
    })
}
