//! Order ledger client
//!
//! One POST per order, carrying an idempotency key derived from the
//! payment id. The ledger treats a repeat submission with the same key
//! as a no-op and returns the original record, so a network retry by the
//! caller cannot create duplicate orders for a single captured payment.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use shared::order::{OrderRecord, OrderRequest};

use crate::core::Config;
use crate::utils::AppError;

/// Order store capability
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Submit an assembled order under the given idempotency key.
    async fn submit(
        &self,
        idempotency_key: &str,
        order: &OrderRequest,
    ) -> Result<OrderRecord, AppError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponseBody {
    success: bool,
    order: Option<OrderRecord>,
    error: Option<String>,
}

/// HTTP implementation against the store backend
pub struct HttpOrderLedger {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpOrderLedger {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: super::build_http_client(config)?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.backend_api_key.clone(),
        })
    }
}

#[async_trait]
impl OrderLedger for HttpOrderLedger {
    async fn submit(
        &self,
        idempotency_key: &str,
        order: &OrderRequest,
    ) -> Result<OrderRecord, AppError> {
        let url = format!("{}/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Idempotency-Key", idempotency_key)
            .json(order)
            .send()
            .await
            .map_err(|e| AppError::upstream("orders", format!("submit failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                "orders",
                format!("submit returned {status}"),
            ));
        }

        let parsed: SubmitResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::upstream("orders", format!("submit malformed body: {e}")))?;

        if !parsed.success {
            return Err(AppError::upstream(
                "orders",
                parsed
                    .error
                    .unwrap_or_else(|| "order rejected".to_string()),
            ));
        }

        parsed
            .order
            .ok_or_else(|| AppError::upstream("orders", "submit response missing order"))
    }
}
