//! Address Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Free-form delivery or billing address.
///
/// No cross-validation against location data is enforced at this layer;
/// the fields are forwarded to the order ledger as given.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Address {
    /// Short label ("Home", "Office")
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    /// Street address lines
    #[validate(length(min = 1, max = 512))]
    pub address: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 1, max = 120))]
    pub country: String,
    /// Contact phone, free-form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
