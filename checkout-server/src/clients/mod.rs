//! External collaborator clients
//!
//! Each of the four independently-owned systems is modeled as a narrow
//! capability trait with a reqwest-backed implementation, so every one of
//! them can be substituted with a test double without network access.
//!
//! # Collaborators
//!
//! - [`PaymentGateway`] - card payment gateway (initiate / finalize, 3-DS)
//! - [`DiscountLedger`] - discount code authority (validate / increment)
//! - [`OrderLedger`] - order store (keyed submit)
//! - [`RateSource`] - currency exchange-rate source
//! - [`InvoiceService`] - invoicing / document service
//!
//! All outbound calls use the bounded timeout from [`Config`]; only
//! side-effect-free calls go through [`with_retry`].

pub mod discount;
pub mod fx;
pub mod invoice;
pub mod orders;
pub mod payment;

pub use discount::{DiscountLedger, DiscountValidation, HttpDiscountLedger};
pub use fx::{HttpRateSource, RateSource};
pub use invoice::{HttpInvoiceService, InvoiceService, LinkResolution};
pub use orders::{HttpOrderLedger, OrderLedger};
pub use payment::{FinalizeResponse, HttpPaymentGateway, InitiateOutcome, PaymentGateway};

use std::future::Future;
use std::time::Duration;

use crate::core::Config;
use crate::utils::AppError;

/// Retry an idempotent operation with doubling backoff.
///
/// Only for side-effect-free calls (FX fetch, discount validate, invoice
/// link resolution). Write calls carry idempotency keys instead and are
/// never blindly retried here.
pub async fn with_retry<T, F, Fut>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut delay = base_delay;
    let mut last_err = None;
    for attempt in 0..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::debug!(attempt = attempt + 1, error = %e, "Retryable call failed");
                last_err = Some(e);
                if attempt + 1 < attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
    // attempts >= 1 is guaranteed by callers
    Err(last_err.unwrap_or_else(|| AppError::internal("retry called with zero attempts")))
}

/// Build the shared outbound HTTP client with the configured timeout
pub(crate) fn build_http_client(config: &Config) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(3, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 1 {
                    Err(AppError::upstream("fx", "down"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::upstream("fx", "down")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
