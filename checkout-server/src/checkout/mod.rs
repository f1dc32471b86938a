//! Checkout orchestration core
//!
//! # Components
//!
//! - [`ExchangeRateCache`] - single-slot TTL cache over the FX source
//! - [`PendingPaymentStore`] - server-side 3-DS pending records
//! - [`ReconciliationJournal`] - money-moved-but-records-disagree ledger
//! - [`CheckoutService`] - the sequential checkout flow itself

pub mod pending;
pub mod rate_cache;
pub mod reconciliation;
pub mod service;

#[cfg(test)]
mod tests;

pub use pending::{PendingPayment, PendingPaymentStore};
pub use rate_cache::ExchangeRateCache;
pub use reconciliation::{ReconciliationEntry, ReconciliationJournal, ReconciliationKind};
pub use service::{CheckoutService, CreateOrder, increment_key, submission_key};
