//! Server configuration
//!
//! All settings come from environment variables (a `.env` file is loaded
//! at startup). Base URLs and credentials for the four external
//! collaborators are required: if any is absent the server refuses to
//! start instead of surfacing a 500 on first use.
//!
//! | Environment variable | Default | Description |
//! |----------------------|---------|-------------|
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | LOG_DIR | (none) | daily-rotating file logs when set |
//! | PAYMENT_GATEWAY_URL | required | card payment gateway base URL |
//! | PAYMENT_GATEWAY_API_KEY | required | gateway API key |
//! | PAYMENT_GATEWAY_SECRET | required | gateway secret |
//! | BACKEND_URL | required | order/discount/invoice backend base URL |
//! | BACKEND_API_KEY | required | backend credential |
//! | ORIGIN_CURRENCY | USD | currency the catalog quotes in |
//! | CAPTURE_CURRENCY | TRY | currency the gateway captures in |
//! | FX_SOURCE_URL | required | currency rate source URL |
//! | FX_CACHE_TTL_SECS | 3600 | rate snapshot TTL |
//! | FX_FALLBACK_RATE | 34.0 | rate substituted when the source is down |
//! | REQUEST_TIMEOUT_MS | 15000 | outbound HTTP timeout |
//! | PENDING_PAYMENT_TTL_SECS | 900 | 3-DS pending record expiry |
//! | RECONCILIATION_SWEEP_SECS | 60 | retry sweep interval |

use rust_decimal::Decimal;
use std::time::Duration;

/// Configuration error - reported at startup, never at request time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Log directory for rotating file logs (console only when unset)
    pub log_dir: Option<String>,

    // === Payment gateway ===
    pub payment_gateway_url: String,
    pub payment_gateway_api_key: String,
    pub payment_gateway_secret: String,

    // === Order / discount / invoice backend ===
    pub backend_url: String,
    pub backend_api_key: String,

    // === Currencies ===
    /// Currency the catalog quotes prices in
    pub origin_currency: String,
    /// Currency the gateway captures in
    pub capture_currency: String,

    // === FX source ===
    pub fx_source_url: String,
    /// TTL of a cached rate snapshot
    pub fx_cache_ttl: Duration,
    /// Fixed rate substituted when the source cannot be reached
    pub fx_fallback_rate: Decimal,

    // === Timeouts and sweeps ===
    /// Bounded timeout for all outbound calls
    pub request_timeout: Duration,
    /// How long a 3-DS pending payment record is kept before it is
    /// considered abandoned
    pub pending_payment_ttl: Duration,
    /// Interval of the reconciliation retry sweep
    pub reconciliation_sweep_interval: Duration,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional_parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast on any missing or unparseable required setting.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            http_port: optional_parsed("HTTP_PORT", 3000)?,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_dir: std::env::var("LOG_DIR").ok(),

            payment_gateway_url: required("PAYMENT_GATEWAY_URL")?,
            payment_gateway_api_key: required("PAYMENT_GATEWAY_API_KEY")?,
            payment_gateway_secret: required("PAYMENT_GATEWAY_SECRET")?,

            backend_url: required("BACKEND_URL")?,
            backend_api_key: required("BACKEND_API_KEY")?,

            origin_currency: std::env::var("ORIGIN_CURRENCY").unwrap_or_else(|_| "USD".into()),
            capture_currency: std::env::var("CAPTURE_CURRENCY").unwrap_or_else(|_| "TRY".into()),

            fx_source_url: required("FX_SOURCE_URL")?,
            fx_cache_ttl: Duration::from_secs(optional_parsed("FX_CACHE_TTL_SECS", 3600u64)?),
            fx_fallback_rate: optional_parsed(
                "FX_FALLBACK_RATE",
                Decimal::from_str_exact("34.0").unwrap_or(Decimal::from(34)),
            )?,

            request_timeout: Duration::from_millis(optional_parsed(
                "REQUEST_TIMEOUT_MS",
                15_000u64,
            )?),
            pending_payment_ttl: Duration::from_secs(optional_parsed(
                "PENDING_PAYMENT_TTL_SECS",
                900u64,
            )?),
            reconciliation_sweep_interval: Duration::from_secs(optional_parsed(
                "RECONCILIATION_SWEEP_SECS",
                60u64,
            )?),
        })
    }

    /// Whether we run in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Configuration for tests: local URLs, dummy credentials
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            environment: "development".to_string(),
            log_dir: None,
            payment_gateway_url: "http://localhost:0".to_string(),
            payment_gateway_api_key: "test-key".to_string(),
            payment_gateway_secret: "test-secret".to_string(),
            backend_url: "http://localhost:0".to_string(),
            backend_api_key: "test-key".to_string(),
            origin_currency: "USD".to_string(),
            capture_currency: "TRY".to_string(),
            fx_source_url: "http://localhost:0".to_string(),
            fx_cache_ttl: Duration::from_secs(3600),
            fx_fallback_rate: Decimal::from(34),
            request_timeout: Duration::from_millis(500),
            pending_payment_ttl: Duration::from_secs(900),
            reconciliation_sweep_interval: Duration::from_secs(60),
        }
    }
}
