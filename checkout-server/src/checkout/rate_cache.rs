//! Exchange-rate cache
//!
//! Single-slot, time-bounded cache over the FX source. Owned by the
//! service instance and constructed with an injected TTL, fallback rate
//! and fetch source, so it is independently testable and never global
//! state.
//!
//! A snapshot within its TTL is returned as-is with no upstream call.
//! A stale or missing snapshot triggers exactly one fetch attempt: on
//! success the slot is replaced atomically, on failure the fixed
//! fallback is returned marked degraded and the slot is left untouched
//! (no poisoning with a bad value, no early invalidation of an old one).
//!
//! Concurrent refreshes during the race window are tolerated, last
//! writer wins: any fetch within the TTL is equally valid, so no
//! single-flight suppression is needed for correctness.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;

use shared::models::{ExchangeRateSnapshot, RateQuote};

use crate::clients::RateSource;

pub struct ExchangeRateCache {
    source: Arc<dyn RateSource>,
    ttl: Duration,
    fallback: Decimal,
    slot: RwLock<Option<ExchangeRateSnapshot>>,
}

impl ExchangeRateCache {
    pub fn new(source: Arc<dyn RateSource>, ttl: std::time::Duration, fallback: Decimal) -> Self {
        Self {
            source,
            ttl: Duration::from_std(ttl).unwrap_or(Duration::seconds(3600)),
            fallback,
            slot: RwLock::new(None),
        }
    }

    /// Current rate quote; fetches upstream only when the slot is stale.
    pub async fn get_rate(&self) -> RateQuote {
        self.get_rate_at(Utc::now()).await
    }

    async fn get_rate_at(&self, now: DateTime<Utc>) -> RateQuote {
        if let Some(snapshot) = *self.slot.read()
            && snapshot.is_fresh(self.ttl, now)
        {
            return RateQuote {
                rate: snapshot.rate,
                degraded: false,
                cached: true,
            };
        }

        match self.source.fetch().await {
            Ok(rate) => {
                *self.slot.write() = Some(ExchangeRateSnapshot {
                    rate,
                    fetched_at: now,
                });
                tracing::debug!(rate = %rate, "FX rate refreshed");
                RateQuote {
                    rate,
                    degraded: false,
                    cached: false,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, fallback = %self.fallback, "FX fetch failed, using fallback rate");
                RateQuote {
                    rate: self.fallback,
                    degraded: true,
                    cached: false,
                }
            }
        }
    }

    /// Snapshot currently held, if any (diagnostics)
    pub fn snapshot(&self) -> Option<ExchangeRateSnapshot> {
        *self.slot.read()
    }
}
