//! Payment gateway client
//!
//! Drives the card payment gateway through initiation and finalization.
//! When the gateway demands 3-D Secure the initiate response carries raw
//! HTML meant to be rendered and auto-submitted by the client browser.
//!
//! Transport failures map to [`AppError::GatewayError`]; a parsed
//! business response is always returned to the caller so the approval
//! decision stays in one place (`shared::payment::decide`).

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{Address, CartItem};
use shared::payment::{CLEARED_FRAUD_STATUS, CardMetadata};

use crate::core::Config;
use crate::utils::AppError;

/// Outcome of a payment initiation
#[derive(Debug, Clone)]
pub enum InitiateOutcome {
    /// Gateway demands a 3-DS challenge; the HTML must be handed to the
    /// client browser for auto-submit
    ThreeDsRequired {
        payment_id: String,
        conversation_id: String,
        html_content: String,
    },
    /// Gateway captured without a challenge; finalize still decides
    Captured {
        payment_id: String,
        conversation_id: String,
    },
}

/// Parsed finalize response - gateway wire fields, business decision not
/// yet applied
#[derive(Debug, Clone)]
pub struct FinalizeResponse {
    pub status: String,
    pub fraud_status: i32,
    pub paid_price: Decimal,
    pub currency: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub card: CardMetadata,
}

/// Card payment gateway capability
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment for the given cart, billed to `billing_address`.
    async fn initiate(
        &self,
        conversation_id: &str,
        items: &[CartItem],
        billing_address: &Address,
        amount: Decimal,
        currency: &str,
    ) -> Result<InitiateOutcome, AppError>;

    /// Finalize a payment after the 3-DS challenge completed.
    async fn finalize(
        &self,
        payment_id: &str,
        conversation_id: &str,
    ) -> Result<FinalizeResponse, AppError>;
}

// ========== Wire types ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateRequestBody<'a> {
    conversation_id: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    currency: &'a str,
    billing_address: &'a Address,
    basket_items: &'a [CartItem],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateResponseBody {
    status: String,
    payment_id: Option<String>,
    conversation_id: Option<String>,
    three_ds_html_content: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinalizeRequestBody<'a> {
    payment_id: &'a str,
    conversation_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinalizeResponseBody {
    status: String,
    #[serde(default)]
    fraud_status: i32,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    paid_price: Option<Decimal>,
    currency: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    bin_number: Option<String>,
    last_four_digits: Option<String>,
    card_association: Option<String>,
    card_family: Option<String>,
}

/// HTTP implementation against the configured gateway
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let credentials = format!(
            "{}:{}",
            config.payment_gateway_api_key, config.payment_gateway_secret
        );
        let auth_header = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );
        Ok(Self {
            client: super::build_http_client(config)?,
            base_url: config.payment_gateway_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_header)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::GatewayError(format!("POST {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::GatewayError(format!(
                "POST {path} returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GatewayError(format!("POST {path} malformed body: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initiate(
        &self,
        conversation_id: &str,
        items: &[CartItem],
        billing_address: &Address,
        amount: Decimal,
        currency: &str,
    ) -> Result<InitiateOutcome, AppError> {
        let body = InitiateRequestBody {
            conversation_id,
            price: amount,
            currency,
            billing_address,
            basket_items: items,
        };
        let parsed: InitiateResponseBody = self.post_json("/payment/3ds/initialize", &body).await?;

        if parsed.status != "success" {
            // Initiation declines are business declines, nothing captured yet
            return Err(AppError::GatewayDecline {
                error_code: parsed.error_code,
                error_message: parsed.error_message,
            });
        }

        let payment_id = parsed
            .payment_id
            .ok_or_else(|| AppError::GatewayError("initiate response missing paymentId".into()))?;
        let conversation_id = parsed
            .conversation_id
            .unwrap_or_else(|| conversation_id.to_string());

        match parsed.three_ds_html_content {
            Some(html_content) => Ok(InitiateOutcome::ThreeDsRequired {
                payment_id,
                conversation_id,
                html_content,
            }),
            None => Ok(InitiateOutcome::Captured {
                payment_id,
                conversation_id,
            }),
        }
    }

    async fn finalize(
        &self,
        payment_id: &str,
        conversation_id: &str,
    ) -> Result<FinalizeResponse, AppError> {
        let body = FinalizeRequestBody {
            payment_id,
            conversation_id,
        };
        let parsed: FinalizeResponseBody = self.post_json("/payment/3ds/complete", &body).await?;
        finalize_from_body(parsed)
    }
}

/// Convert the finalize wire body into a response.
///
/// A body claiming approval must carry the captured amount and currency:
/// the receipt is the authoritative amount an order is recorded with, so
/// an approval without them is a malformed response, not a zero-value
/// capture.
fn finalize_from_body(parsed: FinalizeResponseBody) -> Result<FinalizeResponse, AppError> {
    let approved = parsed.status == "success" && parsed.fraud_status == CLEARED_FRAUD_STATUS;
    let (paid_price, currency) = match (parsed.paid_price, parsed.currency) {
        (Some(price), Some(currency)) => (price, currency),
        _ if approved => {
            return Err(AppError::GatewayError(
                "finalize response missing paidPrice/currency on an approved payment".to_string(),
            ));
        }
        (price, currency) => (price.unwrap_or(Decimal::ZERO), currency.unwrap_or_default()),
    };

    Ok(FinalizeResponse {
        status: parsed.status,
        fraud_status: parsed.fraud_status,
        paid_price,
        currency,
        error_code: parsed.error_code,
        error_message: parsed.error_message,
        card: CardMetadata {
            bin_number: parsed.bin_number,
            last_four_digits: parsed.last_four_digits,
            card_association: parsed.card_association,
            card_family: parsed.card_family,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> FinalizeResponseBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn approval_without_captured_amount_is_a_gateway_error() {
        // Gateway said success/cleared but the body was truncated before
        // the amount fields; this must not become a zero-value receipt
        let parsed = body(r#"{"status":"success","fraudStatus":1}"#);
        let err = finalize_from_body(parsed).unwrap_err();
        assert!(matches!(err, AppError::GatewayError(_)));
    }

    #[test]
    fn approval_with_amount_and_currency_passes_through() {
        let parsed = body(
            r#"{"status":"success","fraudStatus":1,"paidPrice":3105.0,"currency":"TRY"}"#,
        );
        let response = finalize_from_body(parsed).unwrap();
        assert_eq!(response.paid_price, Decimal::try_from(3105.0).unwrap());
        assert_eq!(response.currency, "TRY");
    }

    #[test]
    fn decline_without_amount_fields_is_still_a_decline() {
        let parsed = body(
            r#"{"status":"failure","fraudStatus":0,"errorCode":"10051","errorMessage":"Insufficient funds"}"#,
        );
        let response = finalize_from_body(parsed).unwrap();
        assert_eq!(response.status, "failure");
        assert_eq!(response.error_code.as_deref(), Some("10051"));
        assert_eq!(response.paid_price, Decimal::ZERO);
    }
}
