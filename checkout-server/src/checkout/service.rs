//! Checkout orchestration
//!
//! Coordinates the four independently-owned external systems behind one
//! service. Within one checkout the steps are strictly sequential:
//! payment must reach `Approved` before order submission is attempted,
//! and the discount increment happens only after submission succeeded.
//! That ordering is a correctness requirement, not an optimization.
//!
//! Both write calls carry deterministic idempotency keys derived from
//! the payment id, so a client retry can never double-submit an order or
//! double-count a discount.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use shared::models::{Address, CartItem, DiscountTerms, RateQuote, cart::cart_subtotal};
use shared::order::{OrderRecord, assemble};
use shared::payment::{PaymentPhase, PaymentReceipt, decide};

use crate::clients::{
    DiscountLedger, DiscountValidation, InitiateOutcome, InvoiceService, OrderLedger,
    PaymentGateway, with_retry,
};
use crate::checkout::pending::{PendingPayment, PendingPaymentStore};
use crate::checkout::rate_cache::ExchangeRateCache;
use crate::checkout::reconciliation::{ReconciliationJournal, ReconciliationKind};
use crate::utils::{AppError, AppResult};

/// Backoff base for retryable read calls
const READ_RETRY_DELAY: Duration = Duration::from_millis(200);
const READ_RETRY_ATTEMPTS: u32 = 3;

/// Idempotency key for the order submission of a payment
pub fn submission_key(payment_id: &str) -> String {
    hex::encode(Sha256::digest(format!("order-submit:{payment_id}")))
}

/// Idempotency key for the discount increment of a payment
pub fn increment_key(payment_id: &str) -> String {
    hex::encode(Sha256::digest(format!("discount-increment:{payment_id}")))
}

/// Order creation input, validated at the API boundary
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub payment_id: String,
    pub items: Vec<CartItem>,
    pub delivery_address: Address,
    pub billing_address: Address,
    pub discount_code: Option<String>,
}

/// Checkout orchestrator over the external collaborators
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    discounts: Arc<dyn DiscountLedger>,
    orders: Arc<dyn OrderLedger>,
    invoices: Arc<dyn InvoiceService>,
    rates: Arc<ExchangeRateCache>,
    pending: Arc<PendingPaymentStore>,
    journal: Arc<ReconciliationJournal>,
    origin_currency: String,
    capture_currency: String,
}

impl CheckoutService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        discounts: Arc<dyn DiscountLedger>,
        orders: Arc<dyn OrderLedger>,
        invoices: Arc<dyn InvoiceService>,
        rates: Arc<ExchangeRateCache>,
        pending: Arc<PendingPaymentStore>,
        journal: Arc<ReconciliationJournal>,
        origin_currency: String,
        capture_currency: String,
    ) -> Self {
        Self {
            gateway,
            discounts,
            orders,
            invoices,
            rates,
            pending,
            journal,
            origin_currency,
            capture_currency,
        }
    }

    pub fn pending(&self) -> &PendingPaymentStore {
        &self.pending
    }

    pub fn journal(&self) -> &ReconciliationJournal {
        &self.journal
    }

    // ========== Discount ==========

    /// Validate a discount code. Pure read, retried with backoff.
    pub async fn validate_discount(&self, code: &str) -> AppResult<DiscountValidation> {
        with_retry(READ_RETRY_ATTEMPTS, READ_RETRY_DELAY, || {
            self.discounts.validate(code)
        })
        .await
    }

    /// Keyed increment passthrough for a confirmed payment
    pub async fn increment_discount(&self, code: &str, payment_id: &str) -> AppResult<()> {
        self.discounts
            .increment(code, &increment_key(payment_id))
            .await
    }

    // ========== Exchange rate ==========

    pub async fn exchange_rate(&self) -> RateQuote {
        self.rates.get_rate().await
    }

    // ========== Payment ==========

    /// Initiate a payment for the cart.
    ///
    /// The capture amount is the discounted subtotal converted with the
    /// cached FX rate. A 3-DS demand is recorded in the pending store so
    /// an abandoned flow can be reconciled later.
    pub async fn initiate_payment(
        &self,
        items: &[CartItem],
        billing_address: &Address,
        discount_code: Option<&str>,
    ) -> AppResult<InitiateOutcome> {
        if items.is_empty() {
            return Err(AppError::validation("cart is empty"));
        }

        let terms = match discount_code {
            Some(code) => {
                let validation = self.validate_discount(code).await?;
                if !validation.valid {
                    return Err(AppError::validation(format!(
                        "discount code {code} is not valid"
                    )));
                }
                validation.terms
            }
            None => None,
        };

        let subtotal = cart_subtotal(items);
        let original_price = terms
            .as_ref()
            .map(|t| t.apply(subtotal))
            .unwrap_or(subtotal);
        let quote = self.rates.get_rate().await;
        let capture_amount = (original_price * quote.rate).round_dp(2);

        let conversation_id = Uuid::new_v4().to_string();
        let outcome = self
            .gateway
            .initiate(
                &conversation_id,
                items,
                billing_address,
                capture_amount,
                &self.capture_currency,
            )
            .await?;

        let (payment_id, conversation_id, phase) = match &outcome {
            InitiateOutcome::ThreeDsRequired {
                payment_id,
                conversation_id,
                ..
            } => (payment_id.clone(), conversation_id.clone(), PaymentPhase::Awaiting3ds),
            InitiateOutcome::Captured {
                payment_id,
                conversation_id,
            } => (payment_id.clone(), conversation_id.clone(), PaymentPhase::Initiated),
        };

        self.pending.insert(PendingPayment {
            payment_id: payment_id.clone(),
            conversation_id,
            phase,
            amount: capture_amount,
            currency: self.capture_currency.clone(),
            discount_code: discount_code.map(str::to_string),
            receipt: None,
            order_id: None,
            created_at: chrono::Utc::now(),
        });

        tracing::info!(
            payment_id = %payment_id,
            amount = %capture_amount,
            currency = %self.capture_currency,
            degraded_rate = quote.degraded,
            "Payment initiated"
        );

        Ok(outcome)
    }

    /// Finalize a payment after the 3-DS challenge.
    ///
    /// Never blindly retried: a transport failure surfaces as
    /// `GatewayError` and the pending record stays for the sweep.
    pub async fn verify_payment(
        &self,
        payment_id: &str,
        conversation_id: &str,
    ) -> AppResult<PaymentReceipt> {
        self.pending
            .set_phase(payment_id, PaymentPhase::Verifying, None);

        let response = self.gateway.finalize(payment_id, conversation_id).await?;

        let decision = decide(
            &response.status,
            response.fraud_status,
            response.error_code.as_deref(),
            response.error_message.as_deref(),
        );

        if !decision.is_approved() {
            // Business decline is terminal for this attempt; nothing was
            // captured, so the pending record can go
            self.pending
                .set_phase(payment_id, PaymentPhase::Declined, None);
            self.pending.remove(payment_id);
            tracing::info!(
                payment_id = %payment_id,
                error_code = ?response.error_code,
                "Payment declined by gateway"
            );
            return Err(AppError::GatewayDecline {
                error_code: response.error_code,
                error_message: response.error_message,
            });
        }

        let receipt = PaymentReceipt {
            payment_id: payment_id.to_string(),
            conversation_id: conversation_id.to_string(),
            status: response.status,
            fraud_status: response.fraud_status,
            paid_price: response.paid_price,
            currency: response.currency,
            card: response.card,
        };
        self.pending
            .set_phase(payment_id, PaymentPhase::Approved, Some(receipt.clone()));

        tracing::info!(
            payment_id = %payment_id,
            paid_price = %receipt.paid_price,
            currency = %receipt.currency,
            "Payment approved"
        );

        Ok(receipt)
    }

    // ========== Order ==========

    /// Assemble and submit the order for an approved payment, then
    /// increment the discount usage.
    pub async fn create_order(&self, input: CreateOrder) -> AppResult<OrderRecord> {
        // 1. The payment must have been verified server-side
        let tracked = self
            .pending
            .get(&input.payment_id)
            .ok_or_else(|| AppError::validation("payment is not known or already consumed"))?;
        let receipt = match (&tracked.phase, tracked.receipt.clone()) {
            (PaymentPhase::Approved, Some(receipt)) => receipt,
            _ => return Err(AppError::validation("payment has not been approved")),
        };

        // 2. Discount terms for the informational origin-currency price;
        //    the code was already validated at initiation
        let terms = self.discount_terms_for_order(input.discount_code.as_deref()).await;

        // 3. Rate snapshot the order is annotated with
        let quote = self.rates.get_rate().await;

        // 4. Pure assembly: paid fields come from the receipt alone
        let order_request = assemble(
            &input.items,
            &input.delivery_address,
            &input.billing_address,
            &receipt,
            terms.as_ref(),
            &self.origin_currency,
            &quote,
        );

        // 5. Keyed submission
        let key = submission_key(&input.payment_id);
        let record = match self.orders.submit(&key, &order_request).await {
            Ok(record) => record,
            Err(e) => {
                // Funds are captured, the order is not recorded: this is
                // reconciliation-class, never a generic failure
                let context = format!(
                    "captured {} {} for payment {}, submit failed: {e}; code={:?}, items={}",
                    receipt.paid_price,
                    receipt.currency,
                    input.payment_id,
                    input.discount_code,
                    input.items.len(),
                );
                self.journal.record(
                    &input.payment_id,
                    ReconciliationKind::CapturedNoOrder,
                    context.clone(),
                );
                return Err(AppError::Reconciliation { context });
            }
        };

        // Keep the entry, marked consumed: a client retry finds it again
        // and resubmits under the same key, getting the original record
        self.pending.set_order(&input.payment_id, &record.id);

        // 6. Increment only after submission succeeded
        if let Some(code) = &input.discount_code {
            let key = increment_key(&input.payment_id);
            if let Err(e) = self.discounts.increment(code, &key).await {
                // The order exists; journal the increment for the retry
                // sweep instead of failing the checkout
                self.journal.record(
                    &input.payment_id,
                    ReconciliationKind::OrderNoIncrement {
                        code: code.clone(),
                        idempotency_key: key,
                    },
                    format!("order {} recorded, increment failed: {e}", record.id),
                );
            }
        }

        tracing::info!(
            order_id = %record.id,
            order_number = %record.order_number,
            payment_id = %input.payment_id,
            "Order created"
        );

        Ok(record)
    }

    async fn discount_terms_for_order(&self, code: Option<&str>) -> Option<DiscountTerms> {
        let code = code?;
        match self.validate_discount(code).await {
            Ok(validation) if validation.valid => validation.terms,
            Ok(_) => {
                tracing::warn!(code = %code, "Discount code no longer valid at order time");
                None
            }
            Err(e) => {
                tracing::warn!(code = %code, error = %e, "Discount revalidation failed, assembling without terms");
                None
            }
        }
    }

    // ========== Invoice ==========

    /// Resolve an ettn and download the invoice document.
    ///
    /// "No invoice yet" (`NotFound`) is reported distinctly from
    /// "invoice exists but could not be downloaded"
    /// (`UpstreamUnavailable`).
    pub async fn invoice_pdf(&self, ettn: &str) -> AppResult<Vec<u8>> {
        let resolution = with_retry(READ_RETRY_ATTEMPTS, READ_RETRY_DELAY, || {
            self.invoices.resolve_document_link(ettn)
        })
        .await?;

        if !resolution.ok {
            return Err(AppError::not_found(format!(
                "invoice for {ettn} is not available yet"
            )));
        }

        let link = resolution
            .document_viewer_link
            .ok_or_else(|| AppError::upstream("invoice", "resolution succeeded without a link"))?;

        self.invoices.fetch_bytes(&link).await
    }

    // ========== Background sweeps ==========

    /// Journal and drop abandoned payment flows. Returns how many were
    /// journaled. Entries consumed by an order are garbage collected
    /// quietly.
    pub fn sweep_abandoned(&self, now: chrono::DateTime<chrono::Utc>) -> usize {
        let expired = self.pending.sweep_expired(now);
        let mut journaled = 0;
        for entry in &expired {
            if entry.order_id.is_some() {
                continue;
            }
            journaled += 1;
            if entry.phase == PaymentPhase::Approved {
                // Verified capture that never became an order
                self.journal.record(
                    &entry.payment_id,
                    ReconciliationKind::CapturedNoOrder,
                    format!(
                        "payment approved for {} {} but no order was created",
                        entry.amount, entry.currency
                    ),
                );
            } else {
                self.journal.record(
                    &entry.payment_id,
                    ReconciliationKind::AbandonedThreeDs,
                    format!(
                        "3-DS flow abandoned in phase {:?}; asked gateway for {} {}",
                        entry.phase, entry.amount, entry.currency
                    ),
                );
            }
        }
        journaled
    }

    /// Retry journaled discount increments. Returns how many resolved.
    pub async fn retry_pending_increments(&self) -> usize {
        let mut resolved = 0;
        for entry in self.journal.unresolved() {
            if let ReconciliationKind::OrderNoIncrement {
                code,
                idempotency_key,
            } = &entry.kind
            {
                match self.discounts.increment(code, idempotency_key).await {
                    Ok(()) => {
                        self.journal.mark_resolved(&entry.payment_id, &entry.kind);
                        resolved += 1;
                    }
                    Err(e) => {
                        tracing::debug!(
                            payment_id = %entry.payment_id,
                            error = %e,
                            "Increment retry failed, keeping journal entry"
                        );
                    }
                }
            }
        }
        resolved
    }
}
