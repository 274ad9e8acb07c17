//! In-memory doubles of the store and gateway ports, plus fixture builders.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, CustomProduct, DeliveryOrderRecord, NewDeliveryOrder, Product, ProductSource, StandardProduct};
use crate::domain::value_objects::{CouponCode, DiscountPercentage, ProductId};
use crate::ports::{
    Catalog, CouponStore, GatewayError, GatewaySession, OrderStore, PaymentGateway, PostalAddress, SessionCustomer,
    SessionHandle, SessionLineItem, SessionRequest, StoreError, StoredOrder,
};
use crate::services::CheckoutSettings;

#[derive(Default)]
pub struct InMemoryStore {
    products: Mutex<Vec<Product>>,
    delays: Mutex<HashMap<ProductId, Duration>>,
    coupons: Mutex<Vec<Coupon>>,
    records: Mutex<Vec<DeliveryOrderRecord>>,
    inserted: Mutex<Vec<NewDeliveryOrder>>,
    lookups: AtomicUsize,
    coupon_failures: Mutex<bool>,
    write_failures: Mutex<bool>,
}

impl InMemoryStore {
    pub fn add_product(&self, product: Product) { self.products.lock().unwrap().push(product); }
    pub fn add_coupon(&self, coupon: Coupon) { self.coupons.lock().unwrap().push(coupon); }
    pub fn add_delivery_record(&self, record: DeliveryOrderRecord) { self.records.lock().unwrap().push(record); }
    pub fn delay_product(&self, id: ProductId, delay: Duration) { self.delays.lock().unwrap().insert(id, delay); }
    pub fn fail_coupon_lookups(&self) { *self.coupon_failures.lock().unwrap() = true; }
    pub fn fail_order_writes(&self) { *self.write_failures.lock().unwrap() = true; }
    pub fn product_lookups(&self) -> usize { self.lookups.load(Ordering::SeqCst) }
    pub fn inserted_orders(&self) -> Vec<NewDeliveryOrder> { self.inserted.lock().unwrap().clone() }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn find_product(&self, source: ProductSource, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay { tokio::time::sleep(delay).await; }
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id() == id && p.source() == source).cloned())
    }
}

#[async_trait]
impl CouponStore for InMemoryStore {
    async fn find_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError> {
        if *self.coupon_failures.lock().unwrap() { return Err(StoreError::Connection("coupons offline".into())); }
        Ok(self.coupons.lock().unwrap().iter().find(|c| &c.code == code).cloned())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_delivery_order(&self, order: NewDeliveryOrder) -> Result<StoredOrder, StoreError> {
        if *self.write_failures.lock().unwrap() { return Err(StoreError::Query("insert failed".into())); }
        let stored = StoredOrder { id: Uuid::now_v7(), created_at: Utc::now() };
        self.records.lock().unwrap().push(DeliveryOrderRecord {
            id: stored.id,
            customer_name: Some(order.customer.name.clone()),
            customer_email: Some(order.customer.email.clone()),
            customer_phone: Some(order.customer.phone.clone()),
            customer_address: Some(order.customer.address.clone()),
            product_id: Some(order.product_id.as_uuid()),
            product_name: Some(order.product_name.clone()),
            product_category: order.product_category.clone(),
            is_custom_product: Some(order.is_custom_product),
            custom_text: order.custom_text.clone(),
            custom_image: order.custom_image.clone(),
            selected_color: order.selected_color.clone(),
            selected_size: order.selected_size.clone(),
            quantity: i32::try_from(order.quantity.value()).ok(),
            amount_total: Some(order.amount_total),
            preferred_method: Some(order.preferred_method.clone()),
            additional_notes: order.additional_notes.clone(),
            status: Some(order.status.as_str().to_string()),
            created_at: stored.created_at,
        });
        self.inserted.lock().unwrap().push(order);
        Ok(stored)
    }

    async fn list_delivery_orders(&self) -> Result<Vec<DeliveryOrderRecord>, StoreError> {
        Ok(self.records.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeGateway {
    created: Mutex<Vec<SessionRequest>>,
    sessions: Mutex<Vec<GatewaySession>>,
    rejection: Mutex<Option<(u16, String)>>,
    listing_down: Mutex<bool>,
}

impl FakeGateway {
    pub fn created_sessions(&self) -> Vec<SessionRequest> { self.created.lock().unwrap().clone() }
    pub fn add_session(&self, session: GatewaySession) { self.sessions.lock().unwrap().push(session); }
    pub fn reject_with(&self, status: u16, message: &str) { *self.rejection.lock().unwrap() = Some((status, message.to_string())); }
    pub fn fail_listing(&self) { *self.listing_down.lock().unwrap() = true; }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<SessionHandle, GatewayError> {
        if let Some((status, message)) = self.rejection.lock().unwrap().clone() {
            return Err(GatewayError::Rejected { status, message });
        }
        let mut created = self.created.lock().unwrap();
        created.push(request);
        let id = format!("cs_test_{}", created.len());
        Ok(SessionHandle { url: Some(format!("https://checkout.example/pay/{id}")), id })
    }

    async fn list_sessions(&self, limit: u32) -> Result<Vec<GatewaySession>, GatewayError> {
        if *self.listing_down.lock().unwrap() { return Err(GatewayError::Transport("connection reset".into())); }
        Ok(self.sessions.lock().unwrap().iter().take(limit as usize).cloned().collect())
    }
}

pub fn standard_product(name: &str, price: Decimal) -> Product {
    Product::Standard(StandardProduct {
        id: ProductId::from_uuid(Uuid::new_v4()), name: name.into(), price, category: Some("Apparel".into()),
        colors: vec!["Red".into(), "Green".into()], sizes: vec!["M".into(), "L".into()], published: true,
    })
}

pub fn custom_product(name: &str, price: Decimal, final_image: Option<&str>) -> Product {
    Product::Custom(CustomProduct {
        id: ProductId::from_uuid(Uuid::new_v4()), name: name.into(), price, category: Some("Prints".into()),
        design_image: None, final_design_image: final_image.map(String::from), published: true,
    })
}

pub fn coupon(code: &str, percentage: i64, is_active: bool) -> Coupon {
    Coupon {
        code: CouponCode::new(code).unwrap(),
        discount_percentage: DiscountPercentage::new(Decimal::new(percentage, 0)).unwrap(),
        is_active,
        description: format!("{percentage}% off"),
        created_at: Utc::now(),
    }
}

pub fn delivery_record(created_secs: i64) -> DeliveryOrderRecord {
    DeliveryOrderRecord {
        id: Uuid::new_v4(),
        customer_name: Some("Ana Ruiz".into()),
        customer_email: Some("ana@example.com".into()),
        product_name: Some("Mug".into()),
        quantity: Some(1),
        amount_total: Some(1200),
        status: Some("pending".into()),
        created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        ..Default::default()
    }
}

/// A completed session worth 120.00 shipped to a fixed address.
pub fn gateway_session(id: &str, created: i64, metadata: BTreeMap<String, String>) -> GatewaySession {
    GatewaySession {
        id: id.into(),
        amount_total: Some(12_000),
        created,
        customer_email: None,
        customer: SessionCustomer { email: Some("buyer@example.com".into()), ..Default::default() },
        shipping_address: Some(PostalAddress {
            line1: Some("1 Main St".into()), city: Some("Springfield".into()), country: Some("US".into()), ..Default::default()
        }),
        line_items: vec![SessionLineItem { description: Some(format!("Line item for {id}")), amount_total: Some(12_000) }],
        metadata: metadata.into_iter().collect(),
    }
}

pub fn checkout_settings() -> CheckoutSettings {
    CheckoutSettings {
        public_base_url: "https://shop.example".into(),
        currency: "usd".into(),
        allowed_countries: vec!["US".into(), "CA".into()],
    }
}
