//! Payment Receipt Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Card metadata echoed by the gateway on a finalized payment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_four_digits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_association: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_family: Option<String>,
}

/// Finalized payment as reported by the gateway.
///
/// Authoritative source of the amount actually captured: order monetary
/// fields are derived from here, never from client-echoed cart totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub conversation_id: String,
    /// Gateway result string ("success" | "failure")
    pub status: String,
    /// Gateway risk flag; 1 means cleared for capture
    pub fraud_status: i32,
    /// Amount captured, in the capture currency
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_price: Decimal,
    /// Capture currency code
    pub currency: String,
    #[serde(default)]
    pub card: CardMetadata,
}
