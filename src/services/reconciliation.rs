//! Order reconciliation: one newest-first feed out of both channels.
//!
//! Delivery orders come straight from storage. Gateway orders are rebuilt on every read from
//! the session list, the session's metadata bag and a best-effort product lookup. Each session
//! is an independent unit of work with its own timeout; a failing session yields a degraded
//! row plus a [`ReconcileFailure`], never a failed listing.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::aggregates::order::or_na;
use crate::domain::aggregates::{Channel, Customer, Order, OrderStatus, Product, ProductSnapshot, ProductSource};
use crate::domain::metadata::{CheckoutMetadata, MetadataError, MetadataView};
use crate::domain::value_objects::ProductId;
use crate::ports::{GatewaySession, OrderStore, PaymentGateway};
use crate::services::ProductResolver;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Gateway sessions read per listing.
    pub page_size: u32,
    pub lookup_timeout: Duration,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self { page_size: 100, lookup_timeout: Duration::from_secs(3) }
    }
}

/// Why one gateway session could only be partially reconstructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileFailure {
    #[error("session {session_id}: {source}")]
    Metadata { session_id: String, source: MetadataError },

    #[error("session {session_id}: product id '{product_id}' is malformed")]
    InvalidProductId { session_id: String, product_id: String },

    #[error("session {session_id}: product {product_id} lookup failed: {reason}")]
    ProductLookup { session_id: String, product_id: String, reason: String },

    #[error("session {session_id}: product {product_id} lookup timed out")]
    LookupTimedOut { session_id: String, product_id: String },
}

#[derive(Clone, Debug, Default)]
pub struct ReconciledOrders {
    pub orders: Vec<Order>,
    pub failures: Vec<ReconcileFailure>,
}

/// Result of reconciling one session: always an order, plus whatever went wrong.
#[derive(Clone, Debug)]
struct SessionOutcome {
    order: Order,
    failures: Vec<ReconcileFailure>,
}

#[derive(Clone)]
pub struct OrderReconciler {
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    resolver: ProductResolver,
    settings: ReconcileSettings,
}

impl OrderReconciler {
    pub fn new(orders: Arc<dyn OrderStore>, gateway: Arc<dyn PaymentGateway>, resolver: ProductResolver, settings: ReconcileSettings) -> Self {
        Self { orders, gateway, resolver, settings }
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<ReconciledOrders> {
        let (records, sessions) = tokio::try_join!(
            async { self.orders.list_delivery_orders().await.map_err(crate::StorefrontError::from) },
            async { self.gateway.list_sessions(self.settings.page_size).await.map_err(crate::StorefrontError::from) },
        )?;
        let delivery_count = records.len();
        let session_count = sessions.len();

        let outcomes = join_all(sessions.into_iter().map(|s| self.reconcile_session(s))).await;
        let (gateway_orders, failures) = partition(outcomes);

        let mut orders: Vec<Order> = records.into_iter().map(Order::from).collect();
        orders.extend(gateway_orders);
        sort_newest_first(&mut orders);

        info!(delivery = delivery_count, gateway = session_count, degraded = failures.len(), "orders reconciled");
        Ok(ReconciledOrders { orders, failures })
    }

    async fn reconcile_session(&self, session: GatewaySession) -> SessionOutcome {
        let mut failures = Vec::new();
        let view = match CheckoutMetadata::decode(&session.metadata) {
            Ok(meta) => MetadataView::from(&meta),
            Err(source) => {
                failures.push(ReconcileFailure::Metadata { session_id: session.id.clone(), source });
                MetadataView::lenient(&session.metadata)
            }
        };

        let product = match view.product_id.as_deref() {
            None => None,
            Some(raw) => match ProductId::parse(raw) {
                Err(_) => {
                    failures.push(ReconcileFailure::InvalidProductId { session_id: session.id.clone(), product_id: raw.to_string() });
                    None
                }
                Ok(id) => match self.lookup(&session.id, id, ProductSource::from_flag(view.is_custom_product)).await {
                    Ok(product) => Some(product),
                    Err(failure) => {
                        failures.push(failure);
                        None
                    }
                },
            },
        };

        for failure in &failures {
            warn!(error = %failure, "gateway session degraded");
        }
        SessionOutcome { order: gateway_order(&session, &view, product.as_ref()), failures }
    }

    async fn lookup(&self, session_id: &str, id: ProductId, source: ProductSource) -> std::result::Result<Product, ReconcileFailure> {
        match tokio::time::timeout(self.settings.lookup_timeout, self.resolver.resolve_id(id, source)).await {
            Ok(Ok(product)) => Ok(product),
            Ok(Err(e)) => Err(ReconcileFailure::ProductLookup {
                session_id: session_id.to_string(),
                product_id: id.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ReconcileFailure::LookupTimedOut { session_id: session_id.to_string(), product_id: id.to_string() }),
        }
    }
}

/// Every outcome contributes its order; failures are collected on the side.
fn partition(outcomes: Vec<SessionOutcome>) -> (Vec<Order>, Vec<ReconcileFailure>) {
    outcomes.into_iter().fold((Vec::new(), Vec::new()), |(mut orders, mut failures), outcome| {
        orders.push(outcome.order);
        failures.extend(outcome.failures);
        (orders, failures)
    })
}

/// Descending by creation second; stable, so equal seconds keep their input order.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created.cmp(&a.created));
}

/// Session total in minor units, falling back to the sum of its line items when the gateway
/// omitted the session-level figure.
fn session_amount(session: &GatewaySession) -> i64 {
    session
        .amount_total
        .or_else(|| session.line_items.iter().map(|li| li.amount_total).sum::<Option<i64>>())
        .unwrap_or(0)
}

/// Canonical order for a gateway session. `amount_total` is already in minor units.
fn gateway_order(session: &GatewaySession, view: &MetadataView, product: Option<&Product>) -> Order {
    let address = session
        .shipping_address
        .as_ref()
        .and_then(|a| a.flatten())
        .or_else(|| session.customer.address.as_ref().and_then(|a| a.flatten()));
    let line_description = session.line_items.first().and_then(|li| li.description.as_deref());

    Order {
        id: session.id.clone(),
        channel: Channel::Gateway,
        customer: Customer {
            name: or_na(view.customer_name.as_deref().or(session.customer.name.as_deref())),
            email: or_na(session.customer.email.as_deref().or(session.customer_email.as_deref())),
            phone: or_na(session.customer.phone.as_deref().or(view.customer_phone.as_deref())),
            address: or_na(address.as_deref()),
        },
        product: ProductSnapshot {
            id: or_na(view.product_id.as_deref()),
            name: or_na(product.map(Product::name).or(line_description)),
            category: or_na(product.and_then(Product::category)),
            is_custom_product: view.is_custom_product,
            custom_text: or_na(view.custom_text.as_deref()),
            custom_image: product.filter(|_| view.has_custom_design).and_then(Product::design_image).map(String::from),
        },
        selected_color: or_na(view.color.as_deref()),
        selected_size: or_na(view.size.as_deref()),
        quantity: view.quantity.value(),
        amount_total: session_amount(session),
        created: session.created,
        status: OrderStatus::Completed,
        preferred_method: None,
        additional_notes: None,
    }
}
