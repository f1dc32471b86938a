//! Reconciliation journal
//!
//! The payment gateway, the order ledger and the discount ledger share no
//! transaction boundary. When money moved but the records disagree, the
//! failure is appended here with enough context (payment id, code, cart)
//! for manual or automated repair, and logged under the dedicated
//! `reconciliation` target so alerts can tell it apart from ordinary
//! validation noise.
//!
//! The recoverable case (order recorded, discount not incremented) is
//! retried by a background sweep; the others wait for an operator.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// What went out of sync
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum ReconciliationKind {
    /// Funds captured, order submission failed
    CapturedNoOrder,
    /// Order recorded, discount increment failed - retryable
    OrderNoIncrement {
        code: String,
        idempotency_key: String,
    },
    /// 3-DS flow abandoned after initiation; funds may be captured with
    /// no local record
    AbandonedThreeDs,
}

/// One journal entry
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationEntry {
    pub payment_id: String,
    #[serde(flatten)]
    pub kind: ReconciliationKind,
    /// Free-form context for the operator
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

/// Append-only in-memory journal
pub struct ReconciliationJournal {
    entries: Mutex<Vec<ReconciliationEntry>>,
}

impl ReconciliationJournal {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append an entry and emit the reconciliation log line
    pub fn record(&self, payment_id: &str, kind: ReconciliationKind, context: impl Into<String>) {
        let context = context.into();
        tracing::error!(
            target: "reconciliation",
            payment_id = %payment_id,
            kind = ?kind,
            context = %context,
            "Reconciliation entry recorded"
        );
        self.entries.lock().push(ReconciliationEntry {
            payment_id: payment_id.to_string(),
            kind,
            context,
            created_at: Utc::now(),
            resolved: false,
        });
    }

    /// Unresolved entries, cloned for the sweep or for diagnostics
    pub fn unresolved(&self) -> Vec<ReconciliationEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| !e.resolved)
            .cloned()
            .collect()
    }

    /// Mark every unresolved entry of the same payment and kind resolved
    pub fn mark_resolved(&self, payment_id: &str, kind: &ReconciliationKind) {
        let mut entries = self.entries.lock();
        for entry in entries.iter_mut() {
            if !entry.resolved && entry.payment_id == payment_id && &entry.kind == kind {
                entry.resolved = true;
                tracing::info!(
                    target: "reconciliation",
                    payment_id = %payment_id,
                    kind = ?kind,
                    "Reconciliation entry resolved"
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ReconciliationJournal {
    fn default() -> Self {
        Self::new()
    }
}
