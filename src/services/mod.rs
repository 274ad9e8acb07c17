//! Core services: one per checkout component.

pub mod checkout;
pub mod coupons;
pub mod delivery;
pub mod reconciliation;
pub mod resolver;

pub use checkout::{CheckoutRequest, CheckoutSettings, GatewayCheckout, OpenedSession};
pub use coupons::{CouponOutcome, CouponValidator, Rejection};
pub use delivery::{DeliveryOrderRequest, DeliveryOrders, PlacedOrder};
pub use reconciliation::{OrderReconciler, ReconcileFailure, ReconcileSettings, ReconciledOrders};
pub use resolver::ProductResolver;

use serde_json::Value;

use crate::{Result, StorefrontError};

/// Customer contact as typed at checkout. Which fields are mandatory depends on the channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Options picked for the cart line. `quantity` is kept raw until required fields are checked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<Value>,
    pub custom_text: Option<String>,
}

pub(crate) fn require<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).ok_or(StorefrontError::MissingField(field))
}

/// Blank strings from forms count as absent.
pub(crate) fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}
