//! Payment API Module
//!
//! Initiation may return raw 3-DS HTML meant to be rendered and
//! auto-submitted by the client browser; the verify call finalizes the
//! payment once the challenge completed.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout/payment", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/initiate", post(handler::initiate))
        .route("/verify", post(handler::verify))
}
