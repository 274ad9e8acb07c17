//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    CheckoutSessionCreated { session_id: String, product_id: String, amount_total: i64 },
    DeliveryOrderPlaced { order_id: String, product_id: String, amount_total: i64 },
}

impl OrderEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCreated { .. } => "orders.checkout.session_created",
            Self::DeliveryOrderPlaced { .. } => "orders.delivery.placed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_is_tagged() {
        let event = OrderEvent::DeliveryOrderPlaced { order_id: "o1".into(), product_id: "p1".into(), amount_total: 5000 };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "delivery_order_placed");
        assert_eq!(value["amount_total"], 5000);
        assert_eq!(event.subject(), "orders.delivery.placed");
    }
}
