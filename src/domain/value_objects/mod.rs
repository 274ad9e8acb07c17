//! Value Objects for the storefront checkout

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Document-store identifier of a product.
///
/// Parsing happens before any I/O so that a malformed id never reaches the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let value = value.trim();
        if value.is_empty() { return Err(IdentifierError::Empty); }
        Uuid::parse_str(value).map(Self).map_err(|_| IdentifierError::Malformed(value.to_string()))
    }
    pub fn from_uuid(id: Uuid) -> Self { Self(id) }
    pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum IdentifierError { Empty, Malformed(String) }
impl std::error::Error for IdentifierError {}
impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier is empty"),
            Self::Malformed(v) => write!(f, "'{}' is not a valid identifier", v),
        }
    }
}

/// Quantity of one cart line. Always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 { return Err(QuantityError::NotPositive(value)); }
        u32::try_from(value).map(Self).map_err(|_| QuantityError::TooLarge(value))
    }

    pub fn parse(raw: &str) -> Result<Self, QuantityError> {
        let value = raw.trim().parse::<i64>().map_err(|_| QuantityError::NotAnInteger(raw.to_string()))?;
        Self::new(value)
    }

    /// Accepts a JSON integer or a numeric string; an absent value means one.
    pub fn from_json(value: Option<&Value>) -> Result<Self, QuantityError> {
        match value {
            None | Some(Value::Null) => Ok(Self::ONE),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) => Self::new(v),
                None => Err(QuantityError::NotAnInteger(n.to_string())),
            },
            Some(Value::String(s)) => Self::parse(s),
            Some(other) => Err(QuantityError::NotAnInteger(other.to_string())),
        }
    }

    pub fn value(&self) -> u32 { self.0 }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(i64::from(value)) }
}

impl From<Quantity> for u32 { fn from(q: Quantity) -> u32 { q.0 } }

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum QuantityError { NotPositive(i64), NotAnInteger(String), TooLarge(i64) }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive(v) => write!(f, "quantity must be at least 1, got {}", v),
            Self::NotAnInteger(v) => write!(f, "quantity must be a whole number, got {}", v),
            Self::TooLarge(v) => write!(f, "quantity {} is too large", v),
        }
    }
}

/// Coupon code, trimmed and upper-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(value: impl Into<String>) -> Result<Self, CouponCodeError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(CouponCodeError::Empty); }
        if value.len() > 64 { return Err(CouponCodeError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CouponCodeError { Empty, TooLong }
impl std::error::Error for CouponCodeError {}
impl fmt::Display for CouponCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "coupon code empty"), Self::TooLong => write!(f, "coupon code too long") }
    }
}

/// Discount percentage in (0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountPercentage(Decimal);

impl DiscountPercentage {
    pub fn new(value: Decimal) -> Result<Self, PercentageError> {
        if value <= Decimal::ZERO || value > Decimal::ONE_HUNDRED { return Err(PercentageError::OutOfRange(value)); }
        Ok(Self(value))
    }
    pub fn value(&self) -> Decimal { self.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum PercentageError { OutOfRange(Decimal) }
impl std::error::Error for PercentageError {}
impl fmt::Display for PercentageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::OutOfRange(v) => write!(f, "discount {}% is outside (0, 100]", v) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_id() {
        let id = ProductId::parse(" 0190f5a4-8c1e-7b3a-9f00-2a1b3c4d5e6f ").unwrap();
        assert_eq!(id.to_string(), "0190f5a4-8c1e-7b3a-9f00-2a1b3c4d5e6f");
        assert_eq!(ProductId::parse(""), Err(IdentifierError::Empty));
        assert!(matches!(ProductId::parse("64b7f0c2e1"), Err(IdentifierError::Malformed(_))));
    }

    #[test]
    fn test_quantity_from_json() {
        assert_eq!(Quantity::from_json(None).unwrap().value(), 1);
        assert_eq!(Quantity::from_json(Some(&json!(3))).unwrap().value(), 3);
        assert_eq!(Quantity::from_json(Some(&json!(" 4 "))).unwrap().value(), 4);
        assert_eq!(Quantity::from_json(Some(&json!(0))), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::from_json(Some(&json!(-2))), Err(QuantityError::NotPositive(-2)));
        assert!(matches!(Quantity::from_json(Some(&json!(1.5))), Err(QuantityError::NotAnInteger(_))));
        assert!(matches!(Quantity::from_json(Some(&json!("two"))), Err(QuantityError::NotAnInteger(_))));
        assert!(matches!(Quantity::from_json(Some(&json!(true))), Err(QuantityError::NotAnInteger(_))));
    }

    #[test]
    fn test_coupon_code() {
        assert_eq!(CouponCode::new("  save20 ").unwrap().as_str(), "SAVE20");
        assert_eq!(CouponCode::new("   "), Err(CouponCodeError::Empty));
    }

    #[test]
    fn test_discount_percentage() {
        assert!(DiscountPercentage::new(Decimal::new(20, 0)).is_ok());
        assert!(DiscountPercentage::new(Decimal::ONE_HUNDRED).is_ok());
        assert!(DiscountPercentage::new(Decimal::ZERO).is_err());
        assert!(DiscountPercentage::new(Decimal::new(101, 0)).is_err());
    }
}
