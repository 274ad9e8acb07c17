//! Gateway checkout: builds a hosted card-payment session.
//!
//! The metadata bag attached here is the only durable record of the order until it is
//! reconciled, so every input that the order feed needs is encoded before the gateway is
//! called and an encoding failure aborts the checkout.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::aggregates::ProductSource;
use crate::domain::events::OrderEvent;
use crate::domain::metadata::CheckoutMetadata;
use crate::domain::pricing::PriceBreakdown;
use crate::domain::value_objects::{ProductId, Quantity};
use crate::infrastructure::events::EventPublisher;
use crate::ports::{LineItemRequest, PaymentGateway, SessionRequest};
use crate::services::{present, require, ContactDetails, CouponValidator, ProductResolver, Selection};
use crate::Result;

/// Placeholder the gateway replaces with the session id in redirect URLs.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub public_base_url: String,
    pub currency: String,
    pub allowed_countries: Vec<String>,
}

impl CheckoutSettings {
    pub fn success_url(&self) -> String {
        format!("{}/success?session_id={}", self.public_base_url.trim_end_matches('/'), SESSION_ID_PLACEHOLDER)
    }

    pub fn cancel_url(&self, product_id: ProductId, source: ProductSource) -> String {
        let page = match source { ProductSource::Standard => "product", ProductSource::Custom => "custom-product" };
        format!(
            "{}/{}/{}?canceled=true&session_id={}",
            self.public_base_url.trim_end_matches('/'), page, product_id, SESSION_ID_PLACEHOLDER
        )
    }
}

/// A created hosted session and the amount the gateway will charge for it, in minor units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedSession {
    pub id: String,
    pub url: Option<String>,
    pub amount_total: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckoutRequest {
    pub product_id: Option<String>,
    pub is_custom_product: bool,
    pub customer: ContactDetails,
    pub selection: Selection,
    pub coupon_code: Option<String>,
    pub has_custom_design: bool,
}

/// `"<name> (<color> - <size>)"`, `"<name> (<color>)"` or `"<name>"`.
pub fn line_item_name(name: &str, color: Option<&str>, size: Option<&str>) -> String {
    match (color, size) {
        (Some(c), Some(s)) => format!("{} ({} - {})", name, c, s),
        (Some(c), None) => format!("{} ({})", name, c),
        _ => name.to_string(),
    }
}

#[derive(Clone)]
pub struct GatewayCheckout {
    resolver: ProductResolver,
    coupons: CouponValidator,
    gateway: Arc<dyn PaymentGateway>,
    events: EventPublisher,
    settings: CheckoutSettings,
}

impl GatewayCheckout {
    pub fn new(
        resolver: ProductResolver,
        coupons: CouponValidator,
        gateway: Arc<dyn PaymentGateway>,
        events: EventPublisher,
        settings: CheckoutSettings,
    ) -> Self {
        Self { resolver, coupons, gateway, events, settings }
    }

    #[instrument(skip_all, fields(product_id = ?request.product_id, custom = request.is_custom_product))]
    pub async fn create_session(&self, request: CheckoutRequest) -> Result<OpenedSession> {
        let raw_id = require("productId", &request.product_id)?;
        let email = require("email", &request.customer.email)?.to_string();
        let quantity = Quantity::from_json(request.selection.quantity.as_ref())?;

        let product = self.resolver.resolve(raw_id, request.is_custom_product).await?;
        let coupon = self.coupons.validate(request.coupon_code.as_deref()).await;
        let price = PriceBreakdown::compute(product.price(), quantity, coupon.discount())?;
        let unit_amount = price.unit_minor()?;
        let charged = price.charged_minor(quantity)?;

        let color = present(&request.selection.color);
        let size = present(&request.selection.size);
        let metadata = CheckoutMetadata {
            product_id: product.id(),
            is_custom_product: request.is_custom_product,
            quantity,
            has_custom_design: request.has_custom_design || product.design_image().is_some(),
            color: color.clone(),
            size: size.clone(),
            custom_text: present(&request.selection.custom_text),
            customer_name: present(&request.customer.name),
            customer_phone: present(&request.customer.phone),
            coupon_code: coupon.applied_code().map(|c| c.to_string()),
        }
        .encode()?;

        let session = SessionRequest {
            line_item: LineItemRequest {
                name: line_item_name(product.name(), color.as_deref(), size.as_deref()),
                image: product.design_image().map(String::from),
                unit_amount,
                quantity: quantity.value(),
            },
            currency: self.settings.currency.clone(),
            customer_email: email,
            success_url: self.settings.success_url(),
            cancel_url: self.settings.cancel_url(product.id(), product.source()),
            allowed_countries: self.settings.allowed_countries.clone(),
            metadata,
        };

        let handle = self.gateway.create_session(session).await?;
        info!(session_id = %handle.id, amount_total = charged, "checkout session created");
        self.events
            .publish(OrderEvent::CheckoutSessionCreated {
                session_id: handle.id.clone(),
                product_id: product.id().to_string(),
                amount_total: charged,
            })
            .await;
        Ok(OpenedSession { id: handle.id, url: handle.url, amount_total: charged })
    }
}
