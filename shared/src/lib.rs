//! Shared types for the storefront checkout service
//!
//! Domain and wire types used across the workspace: cart and address
//! models, payment receipts and the payment decision rule, order
//! assembly and discount terms.

pub mod models;
pub mod order;
pub mod payment;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{Address, CartItem, DiscountKind, DiscountTerms, ExchangeRateSnapshot, RateQuote};
pub use order::{OrderLine, OrderRecord, OrderRequest, assemble};
pub use payment::{PaymentDecision, PaymentPhase, PaymentReceipt, decide};
