//! Order Aggregate
//!
//! [`Order`] is the channel-independent shape both payment channels are normalized into.
//! [`DeliveryOrderRecord`] is the persisted delivery-channel document, every field optional
//! so that legacy rows still load.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::{ProductId, Quantity};

/// Placeholder for any field a partial or legacy record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

pub const DEFAULT_PREFERRED_METHOD: &str = "cash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel { Gateway, Delivery }

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self { Self::Gateway => "gateway", Self::Delivery => "delivery" }
    }
}

/// Lifecycle status. Delivery orders may be moved to any status by admin tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus { Pending, Completed, Other(String) }

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self { Self::Pending => "pending", Self::Completed => "completed", Self::Other(s) => s }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() { "pending" => Self::Pending, "completed" => Self::Completed, _ => Self::Other(value) }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> String { status.as_str().to_string() }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer { pub name: String, pub email: String, pub phone: String, pub address: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub is_custom_product: bool,
    pub custom_text: String,
    pub custom_image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub channel: Channel,
    pub customer: Customer,
    pub product: ProductSnapshot,
    pub selected_color: String,
    pub selected_size: String,
    pub quantity: u32,
    /// Minor currency units, identical meaning on both channels.
    pub amount_total: i64,
    /// Unix seconds.
    pub created: i64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

/// A delivery order as it is about to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewDeliveryOrder {
    pub customer: Customer,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_category: Option<String>,
    pub is_custom_product: bool,
    pub custom_text: Option<String>,
    pub custom_image: Option<String>,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub quantity: Quantity,
    pub unit_price: Decimal,
    pub amount_total: i64,
    pub preferred_method: String,
    pub additional_notes: Option<String>,
    pub status: OrderStatus,
}

/// A delivery order as read back from storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeliveryOrderRecord {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub is_custom_product: Option<bool>,
    pub custom_text: Option<String>,
    pub custom_image: Option<String>,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub quantity: Option<i32>,
    pub amount_total: Option<i64>,
    pub preferred_method: Option<String>,
    pub additional_notes: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn or_na(value: Option<&str>) -> String {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE).to_string()
}

impl From<DeliveryOrderRecord> for Order {
    fn from(r: DeliveryOrderRecord) -> Self {
        Self {
            id: r.id.to_string(),
            channel: Channel::Delivery,
            customer: Customer {
                name: or_na(r.customer_name.as_deref()),
                email: or_na(r.customer_email.as_deref()),
                phone: or_na(r.customer_phone.as_deref()),
                address: or_na(r.customer_address.as_deref()),
            },
            product: ProductSnapshot {
                id: r.product_id.map(|id| id.to_string()).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                name: or_na(r.product_name.as_deref()),
                category: or_na(r.product_category.as_deref()),
                is_custom_product: r.is_custom_product.unwrap_or(false),
                custom_text: or_na(r.custom_text.as_deref()),
                custom_image: r.custom_image,
            },
            selected_color: or_na(r.selected_color.as_deref()),
            selected_size: or_na(r.selected_size.as_deref()),
            quantity: r.quantity.and_then(|q| u32::try_from(q).ok()).filter(|q| *q > 0).unwrap_or(1),
            amount_total: r.amount_total.unwrap_or(0),
            created: r.created_at.timestamp(),
            status: r.status.map(OrderStatus::from).unwrap_or(OrderStatus::Pending),
            preferred_method: Some(r.preferred_method.unwrap_or_else(|| DEFAULT_PREFERRED_METHOD.to_string())),
            additional_notes: r.additional_notes,
        }
    }
}
