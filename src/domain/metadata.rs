//! Checkout session metadata bag (schema version 1).
//!
//! The gateway keeps no structured order, so this flat string map is the only record of a
//! gateway-channel order until it is reconciled. Anything not encoded here is lost for good,
//! which is why [`CheckoutMetadata::decode`] reports exactly which keys are missing instead of
//! defaulting them.
//!
//! Gateway limits: at most 50 keys, keys up to 40 characters, values up to 500 characters.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use crate::domain::value_objects::{ProductId, Quantity};

pub const SCHEMA_VERSION: &str = "1";
pub const MAX_KEYS: usize = 50;
pub const MAX_VALUE_LEN: usize = 500;

pub mod keys {
    pub const SCHEMA_VERSION: &str = "schemaVersion";
    pub const PRODUCT_ID: &str = "productId";
    pub const IS_CUSTOM_PRODUCT: &str = "isCustomProduct";
    pub const QUANTITY: &str = "quantity";
    pub const HAS_CUSTOM_DESIGN: &str = "hasCustomDesign";
    pub const COLOR: &str = "color";
    pub const SIZE: &str = "size";
    pub const CUSTOM_TEXT: &str = "customText";
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const CUSTOMER_PHONE: &str = "customerPhone";
    pub const COUPON_CODE: &str = "couponCode";
}

pub const REQUIRED_KEYS: [&str; 5] = [
    keys::SCHEMA_VERSION,
    keys::PRODUCT_ID,
    keys::IS_CUSTOM_PRODUCT,
    keys::QUANTITY,
    keys::HAS_CUSTOM_DESIGN,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("missing metadata fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("metadata field {key} has invalid value '{value}'")]
    InvalidField { key: &'static str, value: String },

    #[error("metadata field {key} is {len} characters, limit is 500")]
    ValueTooLong { key: &'static str, len: usize },

    #[error("unsupported metadata schema version '{0}'")]
    UnsupportedVersion(String),
}

/// Everything needed to rebuild a gateway order later. The design image itself is never
/// stored, only whether one exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub product_id: ProductId,
    pub is_custom_product: bool,
    pub quantity: Quantity,
    pub has_custom_design: bool,
    pub color: Option<String>,
    pub size: Option<String>,
    pub custom_text: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub coupon_code: Option<String>,
}

impl CheckoutMetadata {
    pub fn encode(&self) -> Result<BTreeMap<String, String>, MetadataError> {
        let mut bag = BTreeMap::new();
        let mut put = |key: &'static str, value: String| -> Result<(), MetadataError> {
            let len = value.chars().count();
            if len > MAX_VALUE_LEN { return Err(MetadataError::ValueTooLong { key, len }); }
            bag.insert(key.to_string(), value);
            Ok(())
        };
        put(keys::SCHEMA_VERSION, SCHEMA_VERSION.to_string())?;
        put(keys::PRODUCT_ID, self.product_id.to_string())?;
        put(keys::IS_CUSTOM_PRODUCT, self.is_custom_product.to_string())?;
        put(keys::QUANTITY, self.quantity.to_string())?;
        put(keys::HAS_CUSTOM_DESIGN, self.has_custom_design.to_string())?;
        let optional = [
            (keys::COLOR, &self.color),
            (keys::SIZE, &self.size),
            (keys::CUSTOM_TEXT, &self.custom_text),
            (keys::CUSTOMER_NAME, &self.customer_name),
            (keys::CUSTOMER_PHONE, &self.customer_phone),
            (keys::COUPON_CODE, &self.coupon_code),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) { put(key, v.to_string())?; }
        }
        debug_assert!(bag.len() <= MAX_KEYS);
        Ok(bag)
    }

    pub fn decode(bag: &HashMap<String, String>) -> Result<Self, MetadataError> {
        let missing: Vec<&'static str> = REQUIRED_KEYS.iter().copied().filter(|k| !bag.contains_key(*k)).collect();
        if !missing.is_empty() { return Err(MetadataError::MissingFields(missing)); }

        let get = |key: &'static str| bag.get(key).map(String::as_str).unwrap_or_default();
        let invalid = |key: &'static str| MetadataError::InvalidField { key, value: get(key).to_string() };
        let product_id = ProductId::parse(get(keys::PRODUCT_ID)).map_err(|_| invalid(keys::PRODUCT_ID))?;
        let is_custom_product = parse_flag(get(keys::IS_CUSTOM_PRODUCT)).ok_or_else(|| invalid(keys::IS_CUSTOM_PRODUCT))?;
        let quantity = Quantity::parse(get(keys::QUANTITY)).map_err(|_| invalid(keys::QUANTITY))?;
        let has_custom_design = parse_flag(get(keys::HAS_CUSTOM_DESIGN)).ok_or_else(|| invalid(keys::HAS_CUSTOM_DESIGN))?;
        let version = get(keys::SCHEMA_VERSION);
        if version != SCHEMA_VERSION { return Err(MetadataError::UnsupportedVersion(version.to_string())); }
        let optional = |key: &'static str| bag.get(key).filter(|v| !v.is_empty()).cloned();

        Ok(Self {
            product_id,
            is_custom_product,
            quantity,
            has_custom_design,
            color: optional(keys::COLOR),
            size: optional(keys::SIZE),
            custom_text: optional(keys::CUSTOM_TEXT),
            customer_name: optional(keys::CUSTOMER_NAME),
            customer_phone: optional(keys::CUSTOMER_PHONE),
            coupon_code: optional(keys::COUPON_CODE),
        })
    }
}

/// Best-effort reading of a bag that failed strict decoding, used to render a degraded row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataView {
    pub product_id: Option<String>,
    pub is_custom_product: bool,
    pub quantity: Quantity,
    pub has_custom_design: bool,
    pub color: Option<String>,
    pub size: Option<String>,
    pub custom_text: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

impl MetadataView {
    pub fn lenient(bag: &HashMap<String, String>) -> Self {
        let text = |key: &str| bag.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()).map(String::from);
        let flag = |key: &str| bag.get(key).and_then(|v| parse_flag(v)).unwrap_or(false);
        Self {
            product_id: text(keys::PRODUCT_ID),
            is_custom_product: flag(keys::IS_CUSTOM_PRODUCT),
            quantity: bag.get(keys::QUANTITY).and_then(|q| Quantity::parse(q).ok()).unwrap_or_default(),
            has_custom_design: flag(keys::HAS_CUSTOM_DESIGN),
            color: text(keys::COLOR),
            size: text(keys::SIZE),
            custom_text: text(keys::CUSTOM_TEXT),
            customer_name: text(keys::CUSTOMER_NAME),
            customer_phone: text(keys::CUSTOMER_PHONE),
        }
    }
}

impl From<&CheckoutMetadata> for MetadataView {
    fn from(m: &CheckoutMetadata) -> Self {
        Self {
            product_id: Some(m.product_id.to_string()),
            is_custom_product: m.is_custom_product,
            quantity: m.quantity,
            has_custom_design: m.has_custom_design,
            color: m.color.clone(),
            size: m.size.clone(),
            custom_text: m.custom_text.clone(),
            customer_name: m.customer_name.clone(),
            customer_phone: m.customer_phone.clone(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() { "true" => Some(true), "false" => Some(false), _ => None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample() -> CheckoutMetadata {
        CheckoutMetadata {
            product_id: ProductId::from_uuid(Uuid::new_v4()),
            is_custom_product: true,
            quantity: Quantity::new(2).unwrap(),
            has_custom_design: true,
            color: Some("Red".into()),
            size: Some("M".into()),
            custom_text: Some("Happy birthday".into()),
            customer_name: Some("Sam Doe".into()),
            customer_phone: None,
            coupon_code: Some("SAVE20".into()),
        }
    }

    fn to_hash(bag: BTreeMap<String, String>) -> HashMap<String, String> { bag.into_iter().collect() }

    #[test]
    fn test_encode_then_decode() {
        let meta = sample();
        let bag = meta.encode().unwrap();
        assert_eq!(bag[keys::QUANTITY], "2");
        assert_eq!(bag[keys::IS_CUSTOM_PRODUCT], "true");
        assert!(!bag.contains_key(keys::CUSTOMER_PHONE));
        assert_eq!(CheckoutMetadata::decode(&to_hash(bag)).unwrap(), meta);
    }

    #[test]
    fn test_decode_reports_every_missing_field() {
        let mut bag = to_hash(sample().encode().unwrap());
        bag.remove(keys::QUANTITY);
        bag.remove(keys::SCHEMA_VERSION);
        let err = CheckoutMetadata::decode(&bag).unwrap_err();
        assert_eq!(err, MetadataError::MissingFields(vec![keys::SCHEMA_VERSION, keys::QUANTITY]));
    }

    #[test]
    fn test_decode_rejects_bad_values() {
        let mut bag = to_hash(sample().encode().unwrap());
        bag.insert(keys::QUANTITY.into(), "0".into());
        assert!(matches!(CheckoutMetadata::decode(&bag), Err(MetadataError::InvalidField { key: keys::QUANTITY, .. })));
        bag.insert(keys::QUANTITY.into(), "2".into());
        bag.insert(keys::SCHEMA_VERSION.into(), "7".into());
        assert_eq!(CheckoutMetadata::decode(&bag), Err(MetadataError::UnsupportedVersion("7".into())));
    }

    #[test]
    fn test_encode_refuses_to_truncate() {
        let mut meta = sample();
        meta.custom_text = Some("x".repeat(MAX_VALUE_LEN + 1));
        assert_eq!(meta.encode(), Err(MetadataError::ValueTooLong { key: keys::CUSTOM_TEXT, len: MAX_VALUE_LEN + 1 }));
    }

    #[test]
    fn test_lenient_view_of_legacy_bag() {
        let bag: HashMap<String, String> = [("productId", "abc"), ("quantity", "three"), ("color", "Blue")]
            .into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let view = MetadataView::lenient(&bag);
        assert_eq!(view.product_id.as_deref(), Some("abc"));
        assert_eq!(view.quantity, Quantity::ONE);
        assert_eq!(view.color.as_deref(), Some("Blue"));
        assert!(!view.is_custom_product);
    }
}
