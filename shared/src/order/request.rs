//! Order request assembly
//!
//! [`assemble`] is the single place an order payload is built. It is pure
//! and deterministic, and its monetary fields come exclusively from the
//! payment receipt. Client-echoed cart prices never reach the paid
//! amount, which closes the price-manipulation avenue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Address, CartItem, DiscountTerms, RateQuote, cart::cart_subtotal};
use crate::payment::{CardMetadata, PaymentReceipt};

/// One line of a submitted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            variant_id: item.variant_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Canonical order payload submitted to the order ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub delivery_address: Address,
    pub billing_address: Address,

    /// Gateway payment reference the order settles against
    pub payment_id: String,
    pub conversation_id: String,

    /// Origin currency of the cart prices
    pub original_currency: String,
    /// Validated (post-discount) price in the origin currency
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,

    /// Capture currency reported by the gateway
    pub paid_currency: String,
    /// Amount actually captured, from the payment receipt
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,

    /// FX rate snapshot the price was quoted with
    #[serde(with = "rust_decimal::serde::float")]
    pub fx_rate: Decimal,
    /// True when the quote used the fallback rate
    pub fx_degraded: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub card: CardMetadata,
}

/// Build the canonical order payload.
///
/// Pricing invariant: `paid_amount` / `paid_currency` are copied from the
/// receipt, `original_price` is the discounted cart subtotal. Nothing is
/// recomputed from client-supplied totals.
pub fn assemble(
    items: &[CartItem],
    delivery_address: &Address,
    billing_address: &Address,
    receipt: &PaymentReceipt,
    discount: Option<&DiscountTerms>,
    original_currency: &str,
    rate: &RateQuote,
) -> OrderRequest {
    let subtotal = cart_subtotal(items);
    let original_price = match discount {
        Some(terms) => terms.apply(subtotal),
        None => subtotal,
    };

    OrderRequest {
        items: items.iter().map(OrderLine::from).collect(),
        delivery_address: delivery_address.clone(),
        billing_address: billing_address.clone(),
        payment_id: receipt.payment_id.clone(),
        conversation_id: receipt.conversation_id.clone(),
        original_currency: original_currency.to_string(),
        original_price,
        paid_currency: receipt.currency.clone(),
        paid_amount: receipt.paid_price,
        fx_rate: rate.rate,
        fx_degraded: rate.degraded,
        discount_code: discount.map(|d| d.code.clone()),
        card: receipt.card.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscountKind;

    fn dec(v: f64) -> Decimal {
        Decimal::try_from(v).unwrap()
    }

    fn address() -> Address {
        Address {
            title: "Home".to_string(),
            address: "1 Main St".to_string(),
            city: "Istanbul".to_string(),
            country: "TR".to_string(),
            phone: None,
        }
    }

    fn receipt(paid: f64, currency: &str) -> PaymentReceipt {
        PaymentReceipt {
            payment_id: "pay-1".to_string(),
            conversation_id: "conv-1".to_string(),
            status: "success".to_string(),
            fraud_status: 1,
            paid_price: dec(paid),
            currency: currency.to_string(),
            card: CardMetadata::default(),
        }
    }

    fn cart(subtotal: f64) -> Vec<CartItem> {
        vec![CartItem {
            product_id: "p1".to_string(),
            variant_id: None,
            quantity: Decimal::ONE,
            unit_price: dec(subtotal),
            name: None,
        }]
    }

    #[test]
    fn paid_fields_come_only_from_receipt() {
        // Cart claims wildly different prices; the receipt wins.
        let items = cart(9999.0);
        let rate = RateQuote {
            rate: dec(34.5),
            degraded: false,
            cached: true,
        };
        let order = assemble(
            &items,
            &address(),
            &address(),
            &receipt(3105.0, "TRY"),
            None,
            "USD",
            &rate,
        );
        assert_eq!(order.paid_amount, dec(3105.0));
        assert_eq!(order.paid_currency, "TRY");
    }

    #[test]
    fn welcome10_scenario() {
        // 100 USD cart, 10% discount, FX 34.5, gateway captured 3105 TRY
        let items = cart(100.0);
        let discount = DiscountTerms {
            code: "WELCOME10".to_string(),
            kind: DiscountKind::Percent,
            value: dec(10.0),
        };
        let rate = RateQuote {
            rate: dec(34.5),
            degraded: false,
            cached: false,
        };
        let order = assemble(
            &items,
            &address(),
            &address(),
            &receipt(3105.0, "TRY"),
            Some(&discount),
            "USD",
            &rate,
        );
        assert_eq!(order.original_currency, "USD");
        assert_eq!(order.original_price, dec(90.0));
        assert_eq!(order.paid_currency, "TRY");
        assert_eq!(order.paid_amount, dec(3105.0));
        assert_eq!(order.discount_code.as_deref(), Some("WELCOME10"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let items = cart(50.0);
        let rate = RateQuote {
            rate: dec(30.0),
            degraded: true,
            cached: false,
        };
        let a = assemble(
            &items,
            &address(),
            &address(),
            &receipt(1500.0, "TRY"),
            None,
            "USD",
            &rate,
        );
        let b = assemble(
            &items,
            &address(),
            &address(),
            &receipt(1500.0, "TRY"),
            None,
            "USD",
            &rate,
        );
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
        assert!(a.fx_degraded);
    }
}
