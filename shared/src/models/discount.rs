//! Discount Model
//!
//! Terms of a discount code as reported by the discount ledger. The
//! usage counter is owned exclusively by the remote ledger; nothing here
//! holds an authoritative count.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the discount value is applied to a subtotal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// Percentage off the subtotal (value is 0..=100)
    Percent,
    /// Fixed amount off the subtotal, in the origin currency
    Amount,
}

/// Validated discount code terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountTerms {
    pub code: String,
    pub kind: DiscountKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl DiscountTerms {
    /// Apply the discount to a subtotal, clamping at zero.
    pub fn apply(&self, subtotal: Decimal) -> Decimal {
        let discounted = match self.kind {
            DiscountKind::Percent => subtotal - subtotal * self.value / Decimal::from(100),
            DiscountKind::Amount => subtotal - self.value,
        };
        discounted.max(Decimal::ZERO)
    }
}
