//! HTTP API: shared state and the axum router.

pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AuthorizationPolicy;
use crate::infrastructure::EventPublisher;
use crate::ports::{Catalog, CouponStore, OrderStore, PaymentGateway};
use crate::services::{
    CheckoutSettings, CouponValidator, DeliveryOrders, GatewayCheckout, OrderReconciler, ProductResolver, ReconcileSettings,
};

#[derive(Clone)]
pub struct AppState {
    pub checkout: GatewayCheckout,
    pub delivery: DeliveryOrders,
    pub reconciler: OrderReconciler,
    pub coupons: CouponValidator,
    pub policy: Arc<dyn AuthorizationPolicy>,
}

impl AppState {
    /// Wires every service against one document store and one gateway.
    pub fn new<S>(
        store: Arc<S>,
        gateway: Arc<dyn PaymentGateway>,
        events: EventPublisher,
        policy: Arc<dyn AuthorizationPolicy>,
        checkout: CheckoutSettings,
        reconcile: ReconcileSettings,
    ) -> Self
    where
        S: Catalog + CouponStore + OrderStore + 'static,
    {
        let resolver = ProductResolver::new(store.clone());
        let coupons = CouponValidator::new(store.clone());
        Self {
            checkout: GatewayCheckout::new(resolver.clone(), coupons.clone(), gateway.clone(), events.clone(), checkout),
            delivery: DeliveryOrders::new(resolver.clone(), coupons.clone(), store.clone(), events),
            reconciler: OrderReconciler::new(store, gateway, resolver, reconcile),
            coupons,
            policy,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/create-checkout-session", post(handlers::create_checkout_session))
        .route("/api/v1/create-delivery-order", post(handlers::create_delivery_order))
        .route("/api/v1/orders", get(handlers::list_orders))
        .route("/api/v1/orders/summary", get(handlers::order_summaries))
        .route("/api/v1/coupons/validate", post(handlers::validate_coupon))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
