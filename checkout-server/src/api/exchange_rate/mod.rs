//! Exchange Rate API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Exchange rate router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/checkout/exchange-rate", get(handler::current_rate))
}
