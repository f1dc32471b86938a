//! Order API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/checkout/orders",
        Router::new().route("/create", post(handler::create)),
    )
}
