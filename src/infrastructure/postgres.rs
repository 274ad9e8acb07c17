//! Postgres-backed document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, CustomProduct, DeliveryOrderRecord, NewDeliveryOrder, Product, ProductSource, StandardProduct};
use crate::domain::value_objects::{CouponCode, DiscountPercentage, ProductId};
use crate::ports::{Catalog, CouponStore, OrderStore, StoreError, StoredOrder};

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

fn query_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => StoreError::Connection(e.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow { id: Uuid, name: String, price: Decimal, category: Option<String>, colors: Vec<String>, sizes: Vec<String>, is_published: bool }

#[derive(Debug, sqlx::FromRow)]
struct CustomProductRow {
    id: Uuid, name: String, price: Decimal, category: Option<String>,
    design_image: Option<String>, final_design_image: Option<String>, is_published: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow { code: String, discount_percentage: Decimal, is_active: bool, description: String, created_at: DateTime<Utc> }

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid, customer_name: Option<String>, customer_email: Option<String>, customer_phone: Option<String>,
    customer_address: Option<String>, product_id: Option<Uuid>, product_name: Option<String>,
    product_category: Option<String>, is_custom_product: Option<bool>, custom_text: Option<String>,
    custom_image: Option<String>, selected_color: Option<String>, selected_size: Option<String>,
    quantity: Option<i32>, amount_total: Option<i64>, preferred_method: Option<String>,
    additional_notes: Option<String>, status: Option<String>, created_at: DateTime<Utc>,
}

impl From<OrderRow> for DeliveryOrderRecord {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id, customer_name: r.customer_name, customer_email: r.customer_email, customer_phone: r.customer_phone,
            customer_address: r.customer_address, product_id: r.product_id, product_name: r.product_name,
            product_category: r.product_category, is_custom_product: r.is_custom_product, custom_text: r.custom_text,
            custom_image: r.custom_image, selected_color: r.selected_color, selected_size: r.selected_size,
            quantity: r.quantity, amount_total: r.amount_total, preferred_method: r.preferred_method,
            additional_notes: r.additional_notes, status: r.status, created_at: r.created_at,
        }
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn find_product(&self, source: ProductSource, id: ProductId) -> Result<Option<Product>, StoreError> {
        match source {
            ProductSource::Standard => {
                let row = sqlx::query_as::<_, ProductRow>("SELECT id, name, price, category, colors, sizes, is_published FROM products WHERE id = $1")
                    .bind(id.as_uuid()).fetch_optional(&self.pool).await.map_err(query_error)?;
                Ok(row.map(|r| Product::Standard(StandardProduct {
                    id: ProductId::from_uuid(r.id), name: r.name, price: r.price, category: r.category,
                    colors: r.colors, sizes: r.sizes, published: r.is_published,
                })))
            }
            ProductSource::Custom => {
                let row = sqlx::query_as::<_, CustomProductRow>("SELECT id, name, price, category, design_image, final_design_image, is_published FROM custom_products WHERE id = $1")
                    .bind(id.as_uuid()).fetch_optional(&self.pool).await.map_err(query_error)?;
                Ok(row.map(|r| Product::Custom(CustomProduct {
                    id: ProductId::from_uuid(r.id), name: r.name, price: r.price, category: r.category,
                    design_image: r.design_image, final_design_image: r.final_design_image, published: r.is_published,
                })))
            }
        }
    }
}

#[async_trait]
impl CouponStore for PgStore {
    async fn find_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError> {
        let row = sqlx::query_as::<_, CouponRow>("SELECT code, discount_percentage, is_active, description, created_at FROM coupons WHERE code = $1")
            .bind(code.as_str()).fetch_optional(&self.pool).await.map_err(query_error)?;
        row.map(|r| {
            Ok(Coupon {
                code: CouponCode::new(r.code).map_err(|e| StoreError::Query(format!("stored coupon code: {e}")))?,
                discount_percentage: DiscountPercentage::new(r.discount_percentage).map_err(|e| StoreError::Query(format!("stored coupon: {e}")))?,
                is_active: r.is_active,
                description: r.description,
                created_at: r.created_at,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_delivery_order(&self, o: NewDeliveryOrder) -> Result<StoredOrder, StoreError> {
        let quantity = i32::try_from(o.quantity.value()).map_err(|_| StoreError::Query(format!("quantity {} out of range", o.quantity)))?;
        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "INSERT INTO orders (id, payment_channel, customer_name, customer_email, customer_phone, customer_address, \
             product_id, product_name, product_category, is_custom_product, custom_text, custom_image, selected_color, \
             selected_size, quantity, unit_price, amount_total, preferred_method, additional_notes, status, created_at) \
             VALUES ($1, 'delivery', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, NOW()) \
             RETURNING id, created_at",
        )
        .bind(Uuid::now_v7()).bind(&o.customer.name).bind(&o.customer.email).bind(&o.customer.phone).bind(&o.customer.address)
        .bind(o.product_id.as_uuid()).bind(&o.product_name).bind(&o.product_category).bind(o.is_custom_product)
        .bind(&o.custom_text).bind(&o.custom_image).bind(&o.selected_color).bind(&o.selected_size).bind(quantity)
        .bind(o.unit_price).bind(o.amount_total).bind(&o.preferred_method).bind(&o.additional_notes).bind(o.status.as_str())
        .fetch_one(&self.pool).await.map_err(query_error)?;
        Ok(StoredOrder { id, created_at })
    }

    async fn list_delivery_orders(&self) -> Result<Vec<DeliveryOrderRecord>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_name, customer_email, customer_phone, customer_address, product_id, product_name, \
             product_category, is_custom_product, custom_text, custom_image, selected_color, selected_size, quantity, \
             amount_total, preferred_method, additional_notes, status, created_at \
             FROM orders WHERE payment_channel = 'delivery' ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool).await.map_err(query_error)?;
        Ok(rows.into_iter().map(DeliveryOrderRecord::from).collect())
    }
}
