use std::sync::Arc;

use crate::checkout::{
    CheckoutService, ExchangeRateCache, PendingPaymentStore, ReconciliationJournal,
};
use crate::clients::{
    HttpDiscountLedger, HttpInvoiceService, HttpOrderLedger, HttpPaymentGateway, HttpRateSource,
};
use crate::core::{Config, Result};

/// Shared application state.
///
/// Cloning is cheap: the checkout service behind the Arc is the single
/// owner of every client, cache and store.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | configuration (immutable) |
/// | checkout | Arc<CheckoutService> | checkout orchestrator |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub checkout: Arc<CheckoutService>,
}

impl ServerState {
    /// Wire up the HTTP clients and in-memory stores from configuration.
    ///
    /// All four upstream clients share one timeout policy; failures to
    /// build them are startup errors, not request-time 500s.
    pub fn initialize(config: &Config) -> Result<Self> {
        let gateway = Arc::new(HttpPaymentGateway::new(config)?);
        let discounts = Arc::new(HttpDiscountLedger::new(config)?);
        let orders = Arc::new(HttpOrderLedger::new(config)?);
        let invoices = Arc::new(HttpInvoiceService::new(config)?);

        let rates = Arc::new(ExchangeRateCache::new(
            Arc::new(HttpRateSource::new(config)?),
            config.fx_cache_ttl,
            config.fx_fallback_rate,
        ));
        let pending = Arc::new(PendingPaymentStore::new(config.pending_payment_ttl));
        let journal = Arc::new(ReconciliationJournal::new());

        let checkout = Arc::new(CheckoutService::new(
            gateway,
            discounts,
            orders,
            invoices,
            rates,
            pending,
            journal,
            config.origin_currency.clone(),
            config.capture_currency.clone(),
        ));

        Ok(Self {
            config: config.clone(),
            checkout,
        })
    }
}
