//! Order API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::models::{Address, CartItem};
use shared::order::OrderRecord;

use crate::checkout::CreateOrder;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 128))]
    pub payment_id: String,
    #[validate(length(min = 1), nested)]
    pub items: Vec<CartItem>,
    #[validate(nested)]
    pub delivery_address: Address,
    #[validate(nested)]
    pub billing_address: Address,
    #[serde(default)]
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderRecord,
}

/// Create the order backing an approved payment.
///
/// Safe to retry: the submission is keyed off the payment id, so a
/// resubmit returns the record created the first time.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    payload.validate()?;
    let order = state
        .checkout
        .create_order(CreateOrder {
            payment_id: payload.payment_id,
            items: payload.items,
            delivery_address: payload.delivery_address,
            billing_address: payload.billing_address,
            discount_code: payload.discount_code,
        })
        .await?;
    Ok(Json(CreateOrderResponse {
        success: true,
        order,
    }))
}
