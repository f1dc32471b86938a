//! Pending payment store
//!
//! Server-side record of payments handed to a 3-DS challenge, keyed by
//! payment id. The client browser used to be the sole carrier of state
//! between initiation and completion; with this store an abandoned flow
//! (funds possibly captured, `complete` never called) is detected by the
//! expiry sweep and journaled for reconciliation instead of silently
//! vanishing.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use shared::payment::{PaymentPhase, PaymentReceipt};

/// One tracked payment attempt
#[derive(Debug, Clone)]
pub struct PendingPayment {
    pub payment_id: String,
    pub conversation_id: String,
    pub phase: PaymentPhase,
    /// Capture amount the gateway was asked for
    pub amount: Decimal,
    pub currency: String,
    pub discount_code: Option<String>,
    /// Receipt, present once the finalize call approved the payment
    pub receipt: Option<PaymentReceipt>,
    /// Ledger order id, present once the checkout consumed this payment.
    /// A retried order-create finds the entry again and resubmits under
    /// the same idempotency key.
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// In-memory pending payment store with expiry
pub struct PendingPaymentStore {
    entries: DashMap<String, PendingPayment>,
    ttl: Duration,
}

impl PendingPaymentStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_std(ttl).unwrap_or(Duration::seconds(900)),
        }
    }

    pub fn insert(&self, payment: PendingPayment) {
        self.entries.insert(payment.payment_id.clone(), payment);
    }

    pub fn get(&self, payment_id: &str) -> Option<PendingPayment> {
        self.entries.get(payment_id).map(|e| e.clone())
    }

    pub fn remove(&self, payment_id: &str) -> Option<PendingPayment> {
        self.entries.remove(payment_id).map(|(_, v)| v)
    }

    /// Record the finalize outcome for a tracked payment
    pub fn set_phase(&self, payment_id: &str, phase: PaymentPhase, receipt: Option<PaymentReceipt>) {
        if let Some(mut entry) = self.entries.get_mut(payment_id) {
            entry.phase = phase;
            if receipt.is_some() {
                entry.receipt = receipt;
            }
        }
    }

    /// Mark a tracked payment as consumed by an order
    pub fn set_order(&self, payment_id: &str, order_id: &str) {
        if let Some(mut entry) = self.entries.get_mut(payment_id) {
            entry.order_id = Some(order_id.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry older than the TTL. The caller
    /// decides which of them need reconciliation; consumed entries are
    /// just garbage collected.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<PendingPayment> {
        let mut expired = Vec::new();
        self.entries.retain(|_, entry| {
            let old = now - entry.created_at >= self.ttl;
            if old {
                expired.push(entry.clone());
            }
            !old
        });
        expired
    }
}
