use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::api::dto::{CheckoutBody, CouponAccepted, CouponBody, DeliveryBody, DeliveryCreated, SessionCreated};
use crate::api::AppState;
use crate::auth::Caller;
use crate::domain::aggregates::Order;
use crate::ports::StoreError;
use crate::presentation::OrderSummary;
use crate::services::{CouponOutcome, Rejection};
use crate::{Result, StorefrontError};

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(b)| b).map_err(|e| StorefrontError::Validation(e.body_text()))
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "storefront-orders"}))
}

pub async fn create_checkout_session(
    State(s): State<AppState>,
    payload: std::result::Result<Json<CheckoutBody>, JsonRejection>,
) -> Result<Json<SessionCreated>> {
    let request = body(payload)?.into_request()?;
    let session = s.checkout.create_session(request).await?;
    Ok(Json(SessionCreated { id: session.id, url: session.url }))
}

pub async fn create_delivery_order(
    State(s): State<AppState>,
    payload: std::result::Result<Json<DeliveryBody>, JsonRejection>,
) -> Result<(StatusCode, Json<DeliveryCreated>)> {
    let request = body(payload)?.into_request()?;
    let placed = s.delivery.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(DeliveryCreated { id: placed.id, status: placed.status })))
}

fn authorize(s: &AppState, caller: &Caller) -> Result<()> {
    if s.policy.may_list_orders(caller) {
        Ok(())
    } else {
        warn!(caller = %caller.email, "order listing denied");
        Err(StorefrontError::Forbidden)
    }
}

pub async fn list_orders(State(s): State<AppState>, caller: Caller) -> Result<Json<Vec<Order>>> {
    authorize(&s, &caller)?;
    Ok(Json(s.reconciler.list_orders().await?.orders))
}

pub async fn order_summaries(State(s): State<AppState>, caller: Caller) -> Result<Json<Vec<OrderSummary>>> {
    authorize(&s, &caller)?;
    let reconciled = s.reconciler.list_orders().await?;
    Ok(Json(reconciled.orders.iter().map(OrderSummary::from).collect()))
}

pub async fn validate_coupon(
    State(s): State<AppState>,
    payload: std::result::Result<Json<CouponBody>, JsonRejection>,
) -> Result<Json<CouponAccepted>> {
    let CouponBody { code } = body(payload)?;
    match s.coupons.validate(code.as_deref()).await {
        CouponOutcome::Applied { code, discount } => {
            Ok(Json(CouponAccepted { code: code.to_string(), discount_percentage: discount.value() }))
        }
        CouponOutcome::Rejected(Rejection::Absent) => Err(StorefrontError::MissingField("code")),
        CouponOutcome::Rejected(Rejection::NotFound | Rejection::Inactive) => Err(StorefrontError::CouponNotFound),
        CouponOutcome::Rejected(Rejection::Unavailable) => {
            Err(StoreError::Connection("coupon store unavailable".into()).into())
        }
    }
}
