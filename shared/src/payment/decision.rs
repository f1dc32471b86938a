//! Payment approval decision rule
//!
//! The approve/decline decision is isolated here as one pure function so
//! it can be unit-tested without any network call. Transport failures are
//! not represented in [`PaymentDecision`]: a timeout or malformed gateway
//! response is a gateway error at the client layer, distinct from a
//! business decline.

use serde::{Deserialize, Serialize};

/// Gateway fraud flag value that means "cleared for capture"
pub const CLEARED_FRAUD_STATUS: i32 = 1;

/// Lifecycle phase of one payment attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPhase {
    /// Gateway call issued, no 3-DS challenge demanded yet
    Initiated,
    /// 3-DS challenge handed to the client, finalize pending
    Awaiting3ds,
    /// Finalize call in flight
    Verifying,
    Approved,
    Declined,
    /// Transport-level failure; retryable as a new attempt
    Error,
}

/// Business outcome of a finalized payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "outcome")]
pub enum PaymentDecision {
    Approved,
    /// Gateway declined; code and message are the gateway's verbatim
    /// diagnostics for the caller
    Declined {
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_message: Option<String>,
    },
}

impl PaymentDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentDecision::Approved)
    }
}

/// Decide approval from the two gateway-reported fields.
///
/// `Approved` iff `status == "success"` and `fraud_status == 1`; every
/// other combination is a decline carrying the gateway diagnostics.
pub fn decide(
    status: &str,
    fraud_status: i32,
    error_code: Option<&str>,
    error_message: Option<&str>,
) -> PaymentDecision {
    if status == "success" && fraud_status == CLEARED_FRAUD_STATUS {
        PaymentDecision::Approved
    } else {
        PaymentDecision::Declined {
            error_code: error_code.map(str::to_string),
            error_message: error_message.map(str::to_string),
        }
    }
}
