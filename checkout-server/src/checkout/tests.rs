//! Checkout flow tests against in-memory collaborators
//!
//! Every external system is substituted with a scripted double, so the
//! orchestration ordering, the idempotency behavior and the
//! reconciliation paths are exercised without any network access.

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use shared::models::{Address, CartItem, DiscountKind, DiscountTerms};
use shared::order::{OrderRecord, OrderRequest};
use shared::payment::CardMetadata;

use crate::clients::{
    DiscountLedger, DiscountValidation, FinalizeResponse, InitiateOutcome, InvoiceService,
    LinkResolution, OrderLedger, PaymentGateway, RateSource,
};
use crate::checkout::{CheckoutService, CreateOrder, ExchangeRateCache, PendingPaymentStore,
    ReconciliationJournal, ReconciliationKind};
use crate::utils::AppError;

fn dec(v: f64) -> Decimal {
    Decimal::try_from(v).unwrap()
}

fn address() -> Address {
    Address {
        title: "Home".to_string(),
        address: "1 Main St".to_string(),
        city: "Istanbul".to_string(),
        country: "TR".to_string(),
        phone: Some("+90 555 000 0000".to_string()),
    }
}

fn cart(subtotal: f64) -> Vec<CartItem> {
    vec![CartItem {
        product_id: "p1".to_string(),
        variant_id: None,
        quantity: Decimal::ONE,
        unit_price: dec(subtotal),
        name: Some("Widget".to_string()),
    }]
}

// ========== Doubles ==========

struct StubGateway {
    three_ds: bool,
    /// Next finalize result; None simulates a transport failure
    finalize_result: Mutex<Option<FinalizeResponse>>,
    finalize_calls: AtomicU32,
}

impl StubGateway {
    fn approving(paid_price: f64, currency: &str) -> Self {
        Self {
            three_ds: true,
            finalize_result: Mutex::new(Some(FinalizeResponse {
                status: "success".to_string(),
                fraud_status: 1,
                paid_price: dec(paid_price),
                currency: currency.to_string(),
                error_code: None,
                error_message: None,
                card: CardMetadata::default(),
            })),
            finalize_calls: AtomicU32::new(0),
        }
    }

    fn declining(code: &str, message: &str) -> Self {
        Self {
            three_ds: true,
            finalize_result: Mutex::new(Some(FinalizeResponse {
                status: "failure".to_string(),
                fraud_status: 0,
                paid_price: Decimal::ZERO,
                currency: String::new(),
                error_code: Some(code.to_string()),
                error_message: Some(message.to_string()),
                card: CardMetadata::default(),
            })),
            finalize_calls: AtomicU32::new(0),
        }
    }

    fn broken() -> Self {
        Self {
            three_ds: true,
            finalize_result: Mutex::new(None),
            finalize_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn initiate(
        &self,
        conversation_id: &str,
        _items: &[CartItem],
        _billing_address: &Address,
        _amount: Decimal,
        _currency: &str,
    ) -> Result<InitiateOutcome, AppError> {
        if self.three_ds {
            Ok(InitiateOutcome::ThreeDsRequired {
                payment_id: "pay-1".to_string(),
                conversation_id: conversation_id.to_string(),
                html_content: "<form id=\"threeds\"></form>".to_string(),
            })
        } else {
            Ok(InitiateOutcome::Captured {
                payment_id: "pay-1".to_string(),
                conversation_id: conversation_id.to_string(),
            })
        }
    }

    async fn finalize(
        &self,
        _payment_id: &str,
        _conversation_id: &str,
    ) -> Result<FinalizeResponse, AppError> {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);
        self.finalize_result
            .lock()
            .clone()
            .ok_or_else(|| AppError::GatewayError("connect timeout".to_string()))
    }
}

#[derive(Default)]
struct StubDiscounts {
    codes: HashMap<String, DiscountTerms>,
    /// Applied idempotency keys and how often each was requested
    increments: Mutex<HashMap<String, u32>>,
    fail_increment: AtomicBool,
    fail_validate: AtomicBool,
}

impl StubDiscounts {
    fn with_welcome10() -> Self {
        let mut codes = HashMap::new();
        codes.insert(
            "WELCOME10".to_string(),
            DiscountTerms {
                code: "WELCOME10".to_string(),
                kind: DiscountKind::Percent,
                value: dec(10.0),
            },
        );
        Self {
            codes,
            ..Default::default()
        }
    }

    fn distinct_increments(&self) -> usize {
        self.increments.lock().len()
    }
}

#[async_trait]
impl DiscountLedger for StubDiscounts {
    async fn validate(&self, code: &str) -> Result<DiscountValidation, AppError> {
        if self.fail_validate.load(Ordering::SeqCst) {
            return Err(AppError::upstream("discount", "stubbed outage"));
        }
        match self.codes.get(code) {
            Some(terms) => Ok(DiscountValidation {
                valid: true,
                terms: Some(terms.clone()),
                error: None,
            }),
            None => Ok(DiscountValidation {
                valid: false,
                terms: None,
                error: Some("unknown code".to_string()),
            }),
        }
    }

    async fn increment(&self, _code: &str, idempotency_key: &str) -> Result<(), AppError> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(AppError::upstream("discount", "stubbed outage"));
        }
        // Repeat keys collapse into one effect
        *self
            .increments
            .lock()
            .entry(idempotency_key.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}

#[derive(Default)]
struct StubOrders {
    /// Records by idempotency key
    records: Mutex<HashMap<String, (OrderRecord, OrderRequest)>>,
    submit_calls: AtomicU32,
    fail: AtomicBool,
}

impl StubOrders {
    fn record_count(&self) -> usize {
        self.records.lock().len()
    }

    fn last_request(&self, key: &str) -> Option<OrderRequest> {
        self.records.lock().get(key).map(|(_, req)| req.clone())
    }
}

#[async_trait]
impl OrderLedger for StubOrders {
    async fn submit(
        &self,
        idempotency_key: &str,
        order: &OrderRequest,
    ) -> Result<OrderRecord, AppError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::upstream("orders", "stubbed outage"));
        }
        let mut records = self.records.lock();
        if let Some((record, _)) = records.get(idempotency_key) {
            // Repeat key: return the original record, no new order
            return Ok(record.clone());
        }
        let record = OrderRecord {
            id: format!("ord-{}", records.len() + 1),
            order_number: format!("2024-{:04}", records.len() + 1),
            ettn: None,
            created_at: None,
        };
        records.insert(idempotency_key.to_string(), (record.clone(), order.clone()));
        Ok(record)
    }
}

#[derive(Default)]
struct StubInvoices {
    links: HashMap<String, String>,
    documents: HashMap<String, Vec<u8>>,
    fetch_calls: AtomicU32,
}

#[async_trait]
impl InvoiceService for StubInvoices {
    async fn resolve_document_link(&self, ettn: &str) -> Result<LinkResolution, AppError> {
        match self.links.get(ettn) {
            Some(link) => Ok(LinkResolution {
                ok: true,
                document_viewer_link: Some(link.clone()),
                error: None,
            }),
            None => Ok(LinkResolution {
                ok: false,
                document_viewer_link: None,
                error: Some("document not generated".to_string()),
            }),
        }
    }

    async fn fetch_bytes(&self, link: &str) -> Result<Vec<u8>, AppError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(link)
            .cloned()
            .ok_or_else(|| AppError::upstream("invoice", "download failed"))
    }
}

struct FixedRate(Decimal);

#[async_trait]
impl RateSource for FixedRate {
    async fn fetch(&self) -> Result<Decimal, AppError> {
        Ok(self.0)
    }
}

// ========== Harness ==========

struct Harness {
    service: CheckoutService,
    gateway: Arc<StubGateway>,
    discounts: Arc<StubDiscounts>,
    orders: Arc<StubOrders>,
    invoices: Arc<StubInvoices>,
}

fn harness(gateway: StubGateway, discounts: StubDiscounts, orders: StubOrders, invoices: StubInvoices) -> Harness {
    let gateway = Arc::new(gateway);
    let discounts = Arc::new(discounts);
    let orders = Arc::new(orders);
    let invoices = Arc::new(invoices);
    let rates = Arc::new(ExchangeRateCache::new(
        Arc::new(FixedRate(dec(34.5))),
        std::time::Duration::from_secs(3600),
        dec(34.0),
    ));
    let service = CheckoutService::new(
        gateway.clone(),
        discounts.clone(),
        orders.clone(),
        invoices.clone(),
        rates,
        Arc::new(PendingPaymentStore::new(std::time::Duration::from_secs(900))),
        Arc::new(ReconciliationJournal::new()),
        "USD".to_string(),
        "TRY".to_string(),
    );
    Harness {
        service,
        gateway,
        discounts,
        orders,
        invoices,
    }
}

async fn run_checkout(h: &Harness, discount_code: Option<&str>) -> Result<OrderRecord, AppError> {
    let items = cart(100.0);
    let outcome = h
        .service
        .initiate_payment(&items, &address(), discount_code)
        .await?;
    let (payment_id, conversation_id) = match outcome {
        InitiateOutcome::ThreeDsRequired {
            payment_id,
            conversation_id,
            ..
        } => (payment_id, conversation_id),
        InitiateOutcome::Captured {
            payment_id,
            conversation_id,
        } => (payment_id, conversation_id),
    };
    h.service.verify_payment(&payment_id, &conversation_id).await?;
    h.service
        .create_order(CreateOrder {
            payment_id,
            items,
            delivery_address: address(),
            billing_address: address(),
            discount_code: discount_code.map(str::to_string),
        })
        .await
}

// ========== Tests ==========

#[tokio::test]
async fn welcome10_end_to_end() {
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::with_welcome10(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let record = run_checkout(&h, Some("WELCOME10")).await.unwrap();
    assert_eq!(record.id, "ord-1");

    let submitted = h
        .orders
        .last_request(&crate::checkout::submission_key("pay-1"))
        .unwrap();
    assert_eq!(submitted.original_currency, "USD");
    assert_eq!(submitted.original_price, dec(90.0));
    assert_eq!(submitted.paid_currency, "TRY");
    assert_eq!(submitted.paid_amount, dec(3105.0));
    assert_eq!(submitted.discount_code.as_deref(), Some("WELCOME10"));

    assert_eq!(h.discounts.distinct_increments(), 1);
    assert!(h.service.journal().is_empty());
}

#[tokio::test]
async fn duplicate_order_create_yields_one_record_and_one_increment() {
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::with_welcome10(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let first = run_checkout(&h, Some("WELCOME10")).await.unwrap();

    // Client retry of the create call with the same payment and cart
    let second = h
        .service
        .create_order(CreateOrder {
            payment_id: "pay-1".to_string(),
            items: cart(100.0),
            delivery_address: address(),
            billing_address: address(),
            discount_code: Some("WELCOME10".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(h.orders.record_count(), 1);
    assert_eq!(h.discounts.distinct_increments(), 1);
    assert_eq!(h.orders.submit_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn declined_payment_never_reaches_the_order_ledger() {
    let h = harness(
        StubGateway::declining("10051", "Insufficient funds"),
        StubDiscounts::with_welcome10(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let err = run_checkout(&h, None).await.unwrap_err();
    match err {
        AppError::GatewayDecline {
            error_code,
            error_message,
        } => {
            assert_eq!(error_code.as_deref(), Some("10051"));
            assert_eq!(error_message.as_deref(), Some("Insufficient funds"));
        }
        other => panic!("expected decline, got {other:?}"),
    }
    assert_eq!(h.orders.submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.discounts.distinct_increments(), 0);
}

#[tokio::test]
async fn gateway_transport_failure_is_an_error_not_a_decline() {
    let h = harness(
        StubGateway::broken(),
        StubDiscounts::default(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let err = run_checkout(&h, None).await.unwrap_err();
    assert!(matches!(err, AppError::GatewayError(_)));
    // The pending record stays so the sweep can pick it up
    assert_eq!(h.service.pending().len(), 1);
    assert_eq!(h.gateway.finalize_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn submit_failure_after_capture_is_reconciliation_class() {
    let orders = StubOrders::default();
    orders.fail.store(true, Ordering::SeqCst);
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::with_welcome10(),
        orders,
        StubInvoices::default(),
    );

    let err = run_checkout(&h, Some("WELCOME10")).await.unwrap_err();
    assert!(matches!(err, AppError::Reconciliation { .. }));

    let unresolved = h.service.journal().unresolved();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].payment_id, "pay-1");
    assert_eq!(unresolved[0].kind, ReconciliationKind::CapturedNoOrder);
    // No increment when no order was recorded
    assert_eq!(h.discounts.distinct_increments(), 0);
}

#[tokio::test]
async fn failed_increment_is_journaled_and_retried_by_the_sweep() {
    let discounts = StubDiscounts::with_welcome10();
    discounts.fail_increment.store(true, Ordering::SeqCst);
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        discounts,
        StubOrders::default(),
        StubInvoices::default(),
    );

    // Checkout succeeds from the user's point of view
    let record = run_checkout(&h, Some("WELCOME10")).await.unwrap();
    assert_eq!(record.id, "ord-1");
    assert_eq!(h.discounts.distinct_increments(), 0);
    assert_eq!(h.service.journal().unresolved().len(), 1);

    // Ledger comes back; the sweep resolves the entry
    h.discounts.fail_increment.store(false, Ordering::SeqCst);
    let resolved = h.service.retry_pending_increments().await;
    assert_eq!(resolved, 1);
    assert_eq!(h.discounts.distinct_increments(), 1);
    assert!(h.service.journal().unresolved().is_empty());
}

#[tokio::test]
async fn abandoned_three_ds_flow_is_journaled_by_the_sweep() {
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::default(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let items = cart(100.0);
    h.service
        .initiate_payment(&items, &address(), None)
        .await
        .unwrap();
    // Client never calls verify; entry expires
    let later = chrono::Utc::now() + chrono::Duration::seconds(3600);
    let journaled = h.service.sweep_abandoned(later);

    assert_eq!(journaled, 1);
    assert!(h.service.pending().is_empty());
    let unresolved = h.service.journal().unresolved();
    assert_eq!(unresolved[0].kind, ReconciliationKind::AbandonedThreeDs);
}

#[tokio::test]
async fn consumed_payment_is_garbage_collected_quietly() {
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::default(),
        StubOrders::default(),
        StubInvoices::default(),
    );
    run_checkout(&h, None).await.unwrap();

    let later = chrono::Utc::now() + chrono::Duration::seconds(3600);
    let journaled = h.service.sweep_abandoned(later);
    assert_eq!(journaled, 0);
    assert!(h.service.pending().is_empty());
    assert!(h.service.journal().is_empty());
}

#[tokio::test]
async fn invalid_discount_code_fails_before_the_gateway() {
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::default(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let err = h
        .service
        .initiate_payment(&cart(100.0), &address(), Some("NOPE"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.service.pending().is_empty());
}

#[tokio::test]
async fn unknown_ettn_is_not_found_and_skips_the_byte_fetch() {
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::default(),
        StubOrders::default(),
        StubInvoices::default(),
    );

    let err = h.service.invoice_pdf("unknown-ettn").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(h.invoices.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resolved_invoice_is_downloaded() {
    let mut invoices = StubInvoices::default();
    invoices
        .links
        .insert("ettn-1".to_string(), "https://docs/ettn-1".to_string());
    invoices
        .documents
        .insert("https://docs/ettn-1".to_string(), b"%PDF-1.7".to_vec());
    let h = harness(
        StubGateway::approving(3105.0, "TRY"),
        StubDiscounts::default(),
        StubOrders::default(),
        invoices,
    );

    let bytes = h.service.invoice_pdf("ettn-1").await.unwrap();
    assert_eq!(bytes, b"%PDF-1.7");
}
