//! Exchange Rate Model

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A successfully fetched FX rate together with its fetch time.
///
/// A snapshot older than the cache TTL must not be reused without
/// revalidation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExchangeRateSnapshot {
    /// Conversion factor from the origin currency to the capture currency
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    /// When the rate was fetched from the upstream source
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRateSnapshot {
    /// Whether the snapshot is still within `ttl` of its fetch time
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < ttl
    }
}

/// What the cache hands out: a rate plus a degraded marker.
///
/// `degraded` is true when the upstream fetch failed and the fixed
/// fallback constant was substituted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    pub degraded: bool,
    /// True when the rate came from the cache slot rather than a fresh fetch
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_freshness_respects_ttl() {
        let now = Utc::now();
        let snap = ExchangeRateSnapshot {
            rate: Decimal::from(34),
            fetched_at: now - Duration::seconds(3599),
        };
        assert!(snap.is_fresh(Duration::seconds(3600), now));

        let stale = ExchangeRateSnapshot {
            rate: Decimal::from(34),
            fetched_at: now - Duration::seconds(3600),
        };
        assert!(!stale.is_fresh(Duration::seconds(3600), now));
    }
}
