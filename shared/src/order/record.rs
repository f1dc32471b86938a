//! Order Record Model

use serde::{Deserialize, Serialize};

/// Order as acknowledged by the order ledger.
///
/// The identifier and order number are server-assigned; the lifecycle
/// beyond creation is owned by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: String,
    pub order_number: String,
    /// Invoice reference, present once the ledger has invoiced the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ettn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
