//! Pay-on-delivery orders, persisted directly with no gateway round trip.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::order::DEFAULT_PREFERRED_METHOD;
use crate::domain::aggregates::{Customer, NewDeliveryOrder, OrderStatus};
use crate::domain::events::OrderEvent;
use crate::domain::pricing::PriceBreakdown;
use crate::domain::value_objects::Quantity;
use crate::infrastructure::events::EventPublisher;
use crate::ports::OrderStore;
use crate::services::{present, require, ContactDetails, CouponValidator, ProductResolver, Selection};
use crate::Result;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeliveryOrderRequest {
    pub product_id: Option<String>,
    pub is_custom_product: bool,
    pub customer: ContactDetails,
    pub selection: Selection,
    pub preferred_method: Option<String>,
    pub additional_notes: Option<String>,
    pub coupon_code: Option<String>,
    /// Unit price the client displayed. Informational only.
    pub quoted_price: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlacedOrder { pub id: Uuid, pub status: OrderStatus, pub amount_total: i64 }

#[derive(Clone)]
pub struct DeliveryOrders {
    resolver: ProductResolver,
    coupons: CouponValidator,
    orders: Arc<dyn OrderStore>,
    events: EventPublisher,
}

impl DeliveryOrders {
    pub fn new(resolver: ProductResolver, coupons: CouponValidator, orders: Arc<dyn OrderStore>, events: EventPublisher) -> Self {
        Self { resolver, coupons, orders, events }
    }

    #[instrument(skip_all, fields(product_id = ?request.product_id, custom = request.is_custom_product))]
    pub async fn create_order(&self, request: DeliveryOrderRequest) -> Result<PlacedOrder> {
        let raw_id = require("productId", &request.product_id)?;
        let customer = Customer {
            email: require("email", &request.customer.email)?.to_string(),
            name: require("name", &request.customer.name)?.to_string(),
            phone: require("phone", &request.customer.phone)?.to_string(),
            address: require("address", &request.customer.address)?.to_string(),
        };
        let quantity = Quantity::from_json(request.selection.quantity.as_ref())?;

        let product = self.resolver.resolve(raw_id, request.is_custom_product).await?;
        let coupon = self.coupons.validate(request.coupon_code.as_deref()).await;
        let price = PriceBreakdown::compute(product.price(), quantity, coupon.discount())?;
        if let Some(quoted) = request.quoted_price.filter(|q| *q != price.discounted_unit_price && *q != price.unit_price) {
            warn!(%quoted, expected = %price.discounted_unit_price, "client price differs from catalog, using catalog");
        }

        let new_order = NewDeliveryOrder {
            customer,
            product_id: product.id(),
            product_name: product.name().to_string(),
            product_category: product.category().map(String::from),
            is_custom_product: request.is_custom_product,
            custom_text: present(&request.selection.custom_text),
            custom_image: product.design_image().map(String::from),
            selected_color: present(&request.selection.color),
            selected_size: present(&request.selection.size),
            quantity,
            unit_price: price.discounted_unit_price,
            amount_total: price.total_minor,
            preferred_method: present(&request.preferred_method).unwrap_or_else(|| DEFAULT_PREFERRED_METHOD.to_string()),
            additional_notes: present(&request.additional_notes),
            status: OrderStatus::Pending,
        };

        let stored = self.orders.insert_delivery_order(new_order).await?;
        info!(order_id = %stored.id, amount_total = price.total_minor, "delivery order placed");
        self.events
            .publish(OrderEvent::DeliveryOrderPlaced {
                order_id: stored.id.to_string(),
                product_id: product.id().to_string(),
                amount_total: price.total_minor,
            })
            .await;
        Ok(PlacedOrder { id: stored.id, status: OrderStatus::Pending, amount_total: price.total_minor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{coupon, custom_product, standard_product, InMemoryStore};
    use crate::StorefrontError;
    use serde_json::json;

    fn service(store: &Arc<InMemoryStore>) -> DeliveryOrders {
        DeliveryOrders::new(
            ProductResolver::new(store.clone()),
            CouponValidator::new(store.clone()),
            store.clone(),
            EventPublisher::disabled(),
        )
    }

    fn request(product_id: &str) -> DeliveryOrderRequest {
        DeliveryOrderRequest {
            product_id: Some(product_id.to_string()),
            customer: ContactDetails {
                name: Some("Ana Ruiz".into()),
                email: Some("ana@example.com".into()),
                phone: Some("+1 555 0100".into()),
                address: Some("12 Elm St, Portland".into()),
            },
            selection: Selection { color: Some("Blue".into()), size: None, quantity: Some(json!("2")), custom_text: None },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_places_pending_order_in_minor_units() {
        let store = Arc::new(InMemoryStore::default());
        let product = standard_product("Mug", Decimal::new(2500, 2));
        store.add_product(product.clone());

        let placed = service(&store).create_order(request(&product.id().to_string())).await.unwrap();
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.amount_total, 5000);

        let saved = store.inserted_orders();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].amount_total, 5000);
        assert_eq!(saved[0].preferred_method, "cash");
        assert_eq!(saved[0].selected_color.as_deref(), Some("Blue"));
        assert_eq!(saved[0].selected_size, None);
        assert_eq!(saved[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_applies_coupon_and_custom_image() {
        let store = Arc::new(InMemoryStore::default());
        let product = custom_product("Poster", Decimal::new(1999, 2), Some("final.png"));
        store.add_product(product.clone());
        store.add_coupon(coupon("TENOFF", 10, true));

        let mut req = request(&product.id().to_string());
        req.is_custom_product = true;
        req.coupon_code = Some("tenoff".into());
        req.preferred_method = Some("transfer".into());
        req.selection.quantity = None;
        service(&store).create_order(req).await.unwrap();

        let saved = store.inserted_orders();
        // 19.99 * 0.9 = 17.991 -> 1799
        assert_eq!(saved[0].amount_total, 1799);
        assert_eq!(saved[0].custom_image.as_deref(), Some("final.png"));
        assert_eq!(saved[0].preferred_method, "transfer");
        assert!(saved[0].is_custom_product);
    }

    #[tokio::test]
    async fn test_every_contact_field_is_mandatory() {
        let store = Arc::new(InMemoryStore::default());
        let svc = service(&store);
        for field in ["email", "name", "phone", "address"] {
            let mut req = request(&Uuid::new_v4().to_string());
            match field {
                "email" => req.customer.email = None,
                "name" => req.customer.name = Some(" ".into()),
                "phone" => req.customer.phone = None,
                _ => req.customer.address = None,
            }
            let err = svc.create_order(req).await.unwrap_err();
            assert!(matches!(err, StorefrontError::MissingField(f) if f == field));
        }
        assert!(store.inserted_orders().is_empty());
    }

    #[tokio::test]
    async fn test_bad_quantity_writes_nothing() {
        let store = Arc::new(InMemoryStore::default());
        let product = standard_product("Mug", Decimal::new(2500, 2));
        store.add_product(product.clone());
        for bad in [json!(0), json!(-3), json!("abc"), json!(2.5)] {
            let mut req = request(&product.id().to_string());
            req.selection.quantity = Some(bad);
            let err = service(&store).create_order(req).await.unwrap_err();
            assert!(matches!(err, StorefrontError::InvalidQuantity(_)));
        }
        assert!(store.inserted_orders().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_upstream_error() {
        let store = Arc::new(InMemoryStore::default());
        let product = standard_product("Mug", Decimal::new(2500, 2));
        store.add_product(product.clone());
        store.fail_order_writes();
        let err = service(&store).create_order(request(&product.id().to_string())).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Upstream);
    }
}
