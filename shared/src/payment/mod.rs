//! Payment types and the approval decision rule

pub mod decision;
pub mod receipt;

pub use decision::{CLEARED_FRAUD_STATUS, PaymentDecision, PaymentPhase, decide};
pub use receipt::{CardMetadata, PaymentReceipt};
