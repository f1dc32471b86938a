//! Payment API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::models::{Address, CartItem};
use shared::payment::PaymentReceipt;

use crate::clients::InitiateOutcome;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<CartItem>,
    #[validate(nested)]
    pub billing_address: Address,
    #[serde(default)]
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub success: bool,
    pub payment_id: String,
    pub conversation_id: String,
    /// Raw gateway HTML for the issuer challenge; absent when no
    /// challenge was demanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_ds_html_content: Option<String>,
}

/// Initiate a card payment for the cart
pub async fn initiate(
    State(state): State<ServerState>,
    Json(payload): Json<InitiateRequest>,
) -> AppResult<Json<InitiateResponse>> {
    payload.validate()?;
    let outcome = state
        .checkout
        .initiate_payment(
            &payload.items,
            &payload.billing_address,
            payload.discount_code.as_deref(),
        )
        .await?;

    let response = match outcome {
        InitiateOutcome::ThreeDsRequired {
            payment_id,
            conversation_id,
            html_content,
        } => InitiateResponse {
            success: true,
            payment_id,
            conversation_id,
            three_ds_html_content: Some(html_content),
        },
        InitiateOutcome::Captured {
            payment_id,
            conversation_id,
        } => InitiateResponse {
            success: true,
            payment_id,
            conversation_id,
            three_ds_html_content: None,
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[validate(length(min = 1, max = 128))]
    pub payment_id: String,
    #[validate(length(min = 1, max = 128))]
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub payment: PaymentReceipt,
}

/// Finalize a payment after the 3-DS challenge.
///
/// Declines come back as 402 with the gateway's code and message
/// verbatim; transport failures as 502, retryable by initiating a new
/// attempt.
pub async fn verify(
    State(state): State<ServerState>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<VerifyResponse>> {
    payload.validate()?;
    let receipt = state
        .checkout
        .verify_payment(&payload.payment_id, &payload.conversation_id)
        .await?;
    Ok(Json(VerifyResponse {
        success: true,
        payment: receipt,
    }))
}
