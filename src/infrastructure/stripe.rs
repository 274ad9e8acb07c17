//! Stripe Checkout via REST API (no SDK dependency)

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::ports::{
    GatewayError, GatewaySession, PaymentGateway, PostalAddress, SessionCustomer, SessionHandle, SessionLineItem,
    SessionRequest,
};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn read<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T, GatewayError> {
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| GatewayError::Transport(format!("unreadable Stripe response: {e}")));
        }
        let body: ErrorBody = resp.json().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message: body.error.message.unwrap_or_else(|| format!("Stripe returned {status}")),
        })
    }
}

/// Bracketed form fields for `POST /v1/checkout/sessions`.
pub fn session_form(req: &SessionRequest) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("customer_email".into(), req.customer_email.clone()),
        ("success_url".into(), req.success_url.clone()),
        ("cancel_url".into(), req.cancel_url.clone()),
        ("phone_number_collection[enabled]".into(), "true".into()),
        ("line_items[0][quantity]".into(), req.line_item.quantity.to_string()),
        ("line_items[0][price_data][currency]".into(), req.currency.clone()),
        ("line_items[0][price_data][unit_amount]".into(), req.line_item.unit_amount.to_string()),
        ("line_items[0][price_data][product_data][name]".into(), req.line_item.name.clone()),
    ];
    if let Some(image) = &req.line_item.image {
        form.push(("line_items[0][price_data][product_data][images][0]".into(), image.clone()));
    }
    for (i, country) in req.allowed_countries.iter().enumerate() {
        form.push((format!("shipping_address_collection[allowed_countries][{i}]"), country.clone()));
    }
    for (key, value) in &req.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    form
}

/// Query for `GET /v1/checkout/sessions`: completed sessions only, with line items and
/// customer expanded. Stripe accepts a page size of 1 to 100.
pub fn list_query(limit: u32) -> Vec<(&'static str, String)> {
    vec![
        ("limit", limit.clamp(1, 100).to_string()),
        ("status", "complete".to_string()),
        ("expand[]", "data.line_items".to_string()),
        ("expand[]", "data.customer".to_string()),
    ]
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip_all)]
    async fn create_session(&self, request: SessionRequest) -> Result<SessionHandle, GatewayError> {
        let resp = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&session_form(&request))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let created: CreatedSession = Self::read(resp).await?;
        debug!(session_id = %created.id, "Stripe session created");
        Ok(SessionHandle { id: created.id, url: created.url })
    }

    #[instrument(skip(self))]
    async fn list_sessions(&self, limit: u32) -> Result<Vec<GatewaySession>, GatewayError> {
        let resp = self
            .client
            .get(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(&list_query(limit))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let list: SessionList = Self::read(resp).await?;
        Ok(list.data.into_iter().map(GatewaySession::from).collect())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody { #[serde(default)] error: ErrorDetail }

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail { message: Option<String> }

#[derive(Debug, Deserialize)]
struct CreatedSession { id: String, url: Option<String> }

#[derive(Debug, Deserialize)]
struct SessionList { data: Vec<StripeSession> }

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    amount_total: Option<i64>,
    created: i64,
    customer_email: Option<String>,
    customer_details: Option<StripeCustomerDetails>,
    shipping_details: Option<StripeShipping>,
    collected_information: Option<StripeCollected>,
    line_items: Option<StripeLineItems>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails { email: Option<String>, name: Option<String>, phone: Option<String>, address: Option<StripeAddress> }

#[derive(Debug, Deserialize)]
struct StripeShipping { address: Option<StripeAddress> }

#[derive(Debug, Deserialize)]
struct StripeCollected { shipping_details: Option<StripeShipping> }

#[derive(Debug, Deserialize)]
struct StripeLineItems { #[serde(default)] data: Vec<StripeLineItem> }

#[derive(Debug, Deserialize)]
struct StripeLineItem { description: Option<String>, amount_total: Option<i64> }

#[derive(Debug, Deserialize)]
struct StripeAddress {
    line1: Option<String>,
    line2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl From<StripeAddress> for PostalAddress {
    fn from(a: StripeAddress) -> Self {
        Self { line1: a.line1, line2: a.line2, city: a.city, state: a.state, postal_code: a.postal_code, country: a.country }
    }
}

impl From<StripeSession> for GatewaySession {
    fn from(s: StripeSession) -> Self {
        // Newer API versions moved shipping details under collected_information.
        let shipping = s.shipping_details.or_else(|| s.collected_information.and_then(|c| c.shipping_details));
        let customer = s.customer_details.map(|c| SessionCustomer {
            email: c.email,
            name: c.name,
            phone: c.phone,
            address: c.address.map(PostalAddress::from),
        });
        Self {
            id: s.id,
            amount_total: s.amount_total,
            created: s.created,
            customer_email: s.customer_email,
            customer: customer.unwrap_or_default(),
            shipping_address: shipping.and_then(|sh| sh.address).map(PostalAddress::from),
            line_items: s
                .line_items
                .map(|li| li.data)
                .unwrap_or_default()
                .into_iter()
                .map(|li| SessionLineItem { description: li.description, amount_total: li.amount_total })
                .collect(),
            metadata: s.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::LineItemRequest;
    use std::collections::BTreeMap;

    #[test]
    fn test_session_form_fields() {
        let mut metadata = BTreeMap::new();
        metadata.insert("quantity".to_string(), "2".to_string());
        let req = SessionRequest {
            line_item: LineItemRequest { name: "Tee (Red - M)".into(), image: None, unit_amount: 2000, quantity: 2 },
            currency: "usd".into(),
            customer_email: "sam@example.com".into(),
            success_url: "https://shop.example/success?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://shop.example/product/x".into(),
            allowed_countries: vec!["US".into(), "CA".into()],
            metadata,
        };
        let form: HashMap<String, String> = session_form(&req).into_iter().collect();
        assert_eq!(form["line_items[0][price_data][unit_amount]"], "2000");
        assert_eq!(form["line_items[0][quantity]"], "2");
        assert_eq!(form["line_items[0][price_data][product_data][name]"], "Tee (Red - M)");
        assert_eq!(form["shipping_address_collection[allowed_countries][1]"], "CA");
        assert_eq!(form["metadata[quantity]"], "2");
        assert_eq!(form["customer_email"], "sam@example.com");
        assert!(!form.contains_key("line_items[0][price_data][product_data][images][0]"));
    }

    #[test]
    fn test_list_query_asks_for_completed_sessions() {
        let query = list_query(25);
        assert_eq!(query[0], ("limit", "25".to_string()));
        assert!(query.contains(&("status", "complete".to_string())));
        let expands: Vec<&str> = query.iter().filter(|(k, _)| *k == "expand[]").map(|(_, v)| v.as_str()).collect();
        assert_eq!(expands, vec!["data.line_items", "data.customer"]);

        assert_eq!(list_query(0)[0].1, "1");
        assert_eq!(list_query(500)[0].1, "100");
    }

    #[test]
    fn test_session_list_parsing() {
        let body = serde_json::json!({
            "object": "list",
            "has_more": false,
            "data": [{
                "id": "cs_test_a1",
                "amount_total": 4000,
                "created": 1_717_000_000,
                "customer_email": null,
                "customer_details": { "email": "sam@example.com", "name": null, "phone": "+15550100", "address": null },
                "collected_information": { "shipping_details": { "name": "Sam", "address": {
                    "line1": "1 Main St", "line2": null, "city": "Springfield", "state": "IL", "postal_code": "62701", "country": "US"
                }}},
                "line_items": { "object": "list", "data": [{ "description": "Tee (Red - M)", "quantity": 2, "amount_total": 4000 }] },
                "metadata": { "productId": "abc", "quantity": "2" }
            }]
        });
        let list: SessionList = serde_json::from_value(body).unwrap();
        let session = GatewaySession::from(list.data.into_iter().next().unwrap());
        assert_eq!(session.amount_total, Some(4000));
        assert_eq!(session.customer.phone.as_deref(), Some("+15550100"));
        assert_eq!(session.shipping_address.unwrap().flatten().as_deref(), Some("1 Main St, Springfield, IL, 62701, US"));
        assert_eq!(session.line_items[0].description.as_deref(), Some("Tee (Red - M)"));
        assert_eq!(session.metadata["quantity"], "2");
    }

    #[test]
    fn test_error_body_parsing() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "error": { "type": "invalid_request_error", "message": "Invalid email address: x" }
        }))
        .unwrap();
        assert_eq!(body.error.message.as_deref(), Some("Invalid email address: x"));
    }
}
