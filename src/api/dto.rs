//! Wire shapes for the HTTP surface (camelCase JSON).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::OrderStatus;
use crate::services::{present, CheckoutRequest, ContactDetails, DeliveryOrderRequest, Selection};
use crate::{Result, StorefrontError};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub product_id: Option<String>,
    #[serde(default)]
    pub is_custom_product: bool,
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub custom_text: Option<String>,
    /// Integer or numeric string.
    pub quantity: Option<Value>,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub has_custom_design: bool,
}

impl CheckoutBody {
    /// Blank strings become absent; a present e-mail must be well formed.
    fn normalize(mut self) -> Result<Self> {
        for field in [
            &mut self.product_id, &mut self.name, &mut self.email, &mut self.phone, &mut self.address,
            &mut self.color, &mut self.size, &mut self.custom_text, &mut self.coupon_code,
        ] {
            *field = present(field);
        }
        self.validate().map_err(|e| StorefrontError::Validation(e.to_string()))?;
        Ok(self)
    }

    fn split(self) -> (Option<String>, ContactDetails, Selection) {
        let customer = ContactDetails { name: self.name, email: self.email, phone: self.phone, address: self.address };
        let selection = Selection { color: self.color, size: self.size, quantity: self.quantity, custom_text: self.custom_text };
        (self.product_id, customer, selection)
    }

    pub fn into_request(self) -> Result<CheckoutRequest> {
        let body = self.normalize()?;
        let (is_custom_product, coupon_code, has_custom_design) = (body.is_custom_product, body.coupon_code.clone(), body.has_custom_design);
        let (product_id, customer, selection) = body.split();
        Ok(CheckoutRequest { product_id, is_custom_product, customer, selection, coupon_code, has_custom_design })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBody {
    #[serde(flatten)]
    pub checkout: CheckoutBody,
    pub preferred_method: Option<String>,
    pub additional_notes: Option<String>,
    /// Unit price the shopper saw.
    pub price: Option<Decimal>,
}

impl DeliveryBody {
    pub fn into_request(self) -> Result<DeliveryOrderRequest> {
        let body = self.checkout.normalize()?;
        let (is_custom_product, coupon_code) = (body.is_custom_product, body.coupon_code.clone());
        let (product_id, customer, selection) = body.split();
        Ok(DeliveryOrderRequest {
            product_id,
            is_custom_product,
            customer,
            selection,
            preferred_method: present(&self.preferred_method),
            additional_notes: present(&self.additional_notes),
            coupon_code,
            quoted_price: self.price,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryCreated {
    pub id: Uuid,
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct CouponBody {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponAccepted {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
}
