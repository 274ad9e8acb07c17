//! Collaborator ports.
//!
//! The document store and the payment gateway sit behind these traits so the core can be
//! driven by Postgres/Stripe in production and by in-memory doubles in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, DeliveryOrderRecord, NewDeliveryOrder, Product, ProductSource};
use crate::domain::value_objects::{CouponCode, ProductId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query failed: {0}")]
    Query(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway answered with an error status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The gateway could not be reached or answered with something unreadable.
    #[error("payment gateway unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Point lookup in the collection named by `source`. An id that only exists in the other
    /// collection is `None`.
    async fn find_product(&self, source: ProductSource, id: ProductId) -> Result<Option<Product>, StoreError>;
}

#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn find_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError>;
}

/// Identifier and timestamp assigned by the store on insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredOrder { pub id: Uuid, pub created_at: DateTime<Utc> }

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_delivery_order(&self, order: NewDeliveryOrder) -> Result<StoredOrder, StoreError>;
    async fn list_delivery_orders(&self) -> Result<Vec<DeliveryOrderRecord>, StoreError>;
}

/// One priced line item of a hosted checkout session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItemRequest {
    pub name: String,
    pub image: Option<String>,
    /// Post-discount unit price in minor units.
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub line_item: LineItemRequest,
    pub currency: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    pub allowed_countries: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHandle { pub id: String, pub url: Option<String> }

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    /// Single human-readable line, empty parts skipped.
    pub fn flatten(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.line1, &self.line2, &self.city, &self.state, &self.postal_code, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref().map(str::trim).filter(|p| !p.is_empty()))
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCustomer {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<PostalAddress>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionLineItem { pub description: Option<String>, pub amount_total: Option<i64> }

/// A checkout session as returned by the gateway's listing call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatewaySession {
    pub id: String,
    /// Already in minor units.
    pub amount_total: Option<i64>,
    /// Unix seconds.
    pub created: i64,
    pub customer_email: Option<String>,
    pub customer: SessionCustomer,
    pub shipping_address: Option<PostalAddress>,
    pub line_items: Vec<SessionLineItem>,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: SessionRequest) -> Result<SessionHandle, GatewayError>;
    async fn list_sessions(&self, limit: u32) -> Result<Vec<GatewaySession>, GatewayError>;
}
