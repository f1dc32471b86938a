//! Exchange-rate source client
//!
//! Single GET against the configured rate source. Timeout, non-2xx and
//! malformed bodies all surface as `UpstreamUnavailable`; the cache layer
//! above decides whether to degrade to the fallback constant.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::Config;
use crate::utils::AppError;

/// Currency rate source capability
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the current rate for the one tracked currency pair.
    async fn fetch(&self) -> Result<Decimal, AppError>;
}

#[derive(Debug, Deserialize)]
struct RateResponseBody {
    #[serde(with = "rust_decimal::serde::float")]
    rate: Decimal,
}

/// HTTP implementation against the configured FX source
pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: super::build_http_client(config)?,
            url: config.fx_source_url.clone(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> Result<Decimal, AppError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::upstream("fx", format!("fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream("fx", format!("fetch returned {status}")));
        }

        let parsed: RateResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::upstream("fx", format!("malformed body: {e}")))?;

        if parsed.rate <= Decimal::ZERO {
            return Err(AppError::upstream(
                "fx",
                format!("non-positive rate: {}", parsed.rate),
            ));
        }

        Ok(parsed.rate)
    }
}
