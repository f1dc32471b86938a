//! Discount API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Discount router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout/discount", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/validate", post(handler::validate))
        .route("/increment", post(handler::increment))
}
