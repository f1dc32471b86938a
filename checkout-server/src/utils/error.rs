//! Unified Error Handling
//!
//! Application-wide error taxonomy and response envelope.
//!
//! # Error classes
//!
//! | Variant | Status | Meaning |
//! |---------|--------|---------|
//! | `Validation` | 400 | missing/malformed required fields, no retry |
//! | `NotFound` | 404 | resource does not exist |
//! | `GatewayDecline` | 402 | payment business decline, user-actionable |
//! | `GatewayError` | 502 | transport failure talking to the gateway, retryable as a new attempt |
//! | `UpstreamUnavailable` | 503 | discount/order/invoice/FX backend unreachable |
//! | `Reconciliation` | 500 | money moved but records disagree; never downgraded to generic |
//! | `Internal` | 500 | everything else; generic body, full diagnostics in logs |
//!
//! Propagation policy: transport and validation failures are translated
//! to a generic, non-leaking message for the caller while full
//! diagnostics stay in the server logs. Reconciliation failures keep a
//! dedicated log target so alerts can tell them apart from ordinary
//! validation noise.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response envelope
///
/// Success payloads are endpoint-specific; every failure shares this
/// shape:
///
/// ```json
/// { "success": false, "error": "...", "errorCode": "..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl AppResponse {
    pub fn failure(message: impl Into<String>, error_code: Option<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            error_code,
        }
    }
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Caller Errors ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // ========== Payment Gateway ==========
    /// Business decline from the gateway; code/message are the gateway's
    /// verbatim diagnostics
    #[error("Payment declined")]
    GatewayDecline {
        error_code: Option<String>,
        error_message: Option<String>,
    },

    /// Transport-level failure talking to the gateway; never conflated
    /// with a decline
    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    // ========== Other Upstreams ==========
    #[error("Upstream {upstream} unavailable: {detail}")]
    UpstreamUnavailable {
        upstream: &'static str,
        detail: String,
    },

    // ========== Reconciliation ==========
    /// Payment captured but order not recorded, or order recorded but
    /// discount not incremented
    #[error("Reconciliation required: {context}")]
    Reconciliation { context: String },

    // ========== System ==========
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn upstream(upstream: &'static str, detail: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            upstream,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),

            AppError::GatewayDecline {
                error_code,
                error_message,
            } => {
                // Decline diagnostics go back verbatim: user-actionable
                let code = error_code.clone().unwrap_or_else(|| "DECLINED".to_string());
                let message = error_message
                    .clone()
                    .unwrap_or_else(|| "Payment was declined".to_string());
                let body = Json(AppResponse::failure(message, Some(code)));
                return (StatusCode::PAYMENT_REQUIRED, body).into_response();
            }

            AppError::GatewayError(msg) => {
                error!(target: "gateway", error = %msg, "Payment gateway transport failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "GATEWAY_ERROR",
                    "Payment service is temporarily unavailable".to_string(),
                )
            }

            AppError::UpstreamUnavailable { upstream, detail } => {
                error!(target: "upstream", upstream = %upstream, error = %detail, "Upstream unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_UNAVAILABLE",
                    "A required service is temporarily unavailable".to_string(),
                )
            }

            AppError::Reconciliation { context } => {
                // Dedicated target: must stay distinguishable from
                // ordinary failures in logs/alerts
                error!(target: "reconciliation", context = %context, "Reconciliation required");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RECONCILIATION_REQUIRED",
                    "Your payment was received but the order could not be finalized; support has been notified".to_string(),
                )
            }

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(AppResponse::failure(message, Some(code.to_string())));
        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result type for API handlers
pub type AppResult<T> = Result<T, AppError>;
