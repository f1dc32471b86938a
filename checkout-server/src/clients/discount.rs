//! Discount ledger client
//!
//! The remote ledger owns the usage counter; this client only reads
//! (validate) and requests keyed increments. `validate` is a pure read
//! and safe to retry; `increment` is only ever called after an order was
//! submitted for an approved payment, and carries an idempotency key so
//! a retried call cannot double-count usage. The ledger answering
//! "already incremented for this key" counts as success.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use shared::models::DiscountTerms;

use crate::core::Config;
use crate::utils::AppError;

/// Result of a code validation - an invalid code is a normal outcome,
/// not an error
#[derive(Debug, Clone)]
pub struct DiscountValidation {
    pub valid: bool,
    pub terms: Option<DiscountTerms>,
    pub error: Option<String>,
}

/// Discount authority capability
#[async_trait]
pub trait DiscountLedger: Send + Sync {
    /// Validate a code. Idempotent, safe to retry with backoff.
    async fn validate(&self, code: &str) -> Result<DiscountValidation, AppError>;

    /// Increment the usage counter for a redeemed code.
    ///
    /// `idempotency_key` is derived from the payment id; repeat calls
    /// with the same key must collapse into one effect.
    async fn increment(&self, code: &str, idempotency_key: &str) -> Result<(), AppError>;
}

// ========== Wire types ==========

#[derive(Debug, Serialize)]
struct ValidateRequestBody<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponseBody {
    success: bool,
    discount: Option<DiscountTerms>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncrementRequestBody<'a> {
    code: &'a str,
    idempotency_key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncrementResponseBody {
    success: bool,
    /// True when the ledger had already applied this key
    #[serde(default)]
    already_applied: bool,
    error: Option<String>,
}

/// HTTP implementation against the store backend
pub struct HttpDiscountLedger {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpDiscountLedger {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: super::build_http_client(config)?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.backend_api_key.clone(),
        })
    }
}

#[async_trait]
impl DiscountLedger for HttpDiscountLedger {
    async fn validate(&self, code: &str) -> Result<DiscountValidation, AppError> {
        let url = format!("{}/discounts/validate", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&ValidateRequestBody { code })
            .send()
            .await
            .map_err(|e| AppError::upstream("discount", format!("validate failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                "discount",
                format!("validate returned {status}"),
            ));
        }

        let parsed: ValidateResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::upstream("discount", format!("validate malformed body: {e}")))?;

        Ok(DiscountValidation {
            valid: parsed.success,
            terms: parsed.discount,
            error: parsed.error,
        })
    }

    async fn increment(&self, code: &str, idempotency_key: &str) -> Result<(), AppError> {
        let url = format!("{}/discounts/increment", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&IncrementRequestBody {
                code,
                idempotency_key,
            })
            .send()
            .await
            .map_err(|e| AppError::upstream("discount", format!("increment failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                "discount",
                format!("increment returned {status}"),
            ));
        }

        let parsed: IncrementResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::upstream("discount", format!("increment malformed body: {e}")))?;

        if parsed.success || parsed.already_applied {
            if parsed.already_applied {
                tracing::debug!(code = %code, key = %idempotency_key, "Increment already applied, treating as success");
            }
            Ok(())
        } else {
            Err(AppError::upstream(
                "discount",
                parsed
                    .error
                    .unwrap_or_else(|| "increment rejected".to_string()),
            ))
        }
    }
}
