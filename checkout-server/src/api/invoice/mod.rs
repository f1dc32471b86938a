//! Invoice API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/checkout/invoice",
        Router::new().route("/download/{ettn}", get(handler::download)),
    )
}
