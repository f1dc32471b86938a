//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single cart line as submitted by the client.
///
/// Immutable once submitted: the unit price here is a display snapshot
/// only and is never used to derive the captured amount of an order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItem {
    /// Product reference (String ID)
    #[validate(length(min = 1, max = 64))]
    pub product_id: String,
    /// Variant reference, if the product has variants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Quantity (decimal: weight-priced products allow fractions)
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Unit price snapshot in the origin currency
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Display name at the time the cart was built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CartItem {
    /// Line total in the origin currency (display only)
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Subtotal of a cart in the origin currency (display only)
pub fn cart_subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}
