//! Product Aggregate
//!
//! Products live in two collections. Which one holds a given id is decided by the caller's
//! `isCustomProduct` flag, never by looking at the record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::ProductId;

/// Collection a product is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource { Standard, Custom }

impl ProductSource {
    pub fn from_flag(is_custom_product: bool) -> Self {
        if is_custom_product { Self::Custom } else { Self::Standard }
    }
    pub fn collection(self) -> &'static str {
        match self { Self::Standard => "products", Self::Custom => "customProducts" }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub published: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub design_image: Option<String>,
    pub final_design_image: Option<String>,
    pub published: bool,
}

/// A persisted catalog entry from either collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Product {
    Standard(StandardProduct),
    Custom(CustomProduct),
}

impl Product {
    pub fn id(&self) -> ProductId {
        match self { Self::Standard(p) => p.id, Self::Custom(p) => p.id }
    }
    pub fn name(&self) -> &str {
        match self { Self::Standard(p) => &p.name, Self::Custom(p) => &p.name }
    }
    pub fn price(&self) -> Decimal {
        match self { Self::Standard(p) => p.price, Self::Custom(p) => p.price }
    }
    pub fn category(&self) -> Option<&str> {
        match self { Self::Standard(p) => p.category.as_deref(), Self::Custom(p) => p.category.as_deref() }
    }
    pub fn source(&self) -> ProductSource {
        match self { Self::Standard(_) => ProductSource::Standard, Self::Custom(_) => ProductSource::Custom }
    }

    /// The final rendered design wins over the uploaded draft.
    pub fn design_image(&self) -> Option<&str> {
        match self {
            Self::Standard(_) => None,
            Self::Custom(p) => p.final_design_image.as_deref().or(p.design_image.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn custom(final_image: Option<&str>) -> Product {
        Product::Custom(CustomProduct {
            id: ProductId::from_uuid(Uuid::new_v4()), name: "Tee".into(), price: Decimal::new(1500, 2),
            category: Some("Apparel".into()), design_image: Some("draft.png".into()),
            final_design_image: final_image.map(String::from), published: true,
        })
    }

    #[test]
    fn test_source_from_flag() {
        assert_eq!(ProductSource::from_flag(true).collection(), "customProducts");
        assert_eq!(ProductSource::from_flag(false).collection(), "products");
    }

    #[test]
    fn test_design_image_prefers_final() {
        assert_eq!(custom(Some("final.png")).design_image(), Some("final.png"));
        assert_eq!(custom(None).design_image(), Some("draft.png"));
        assert_eq!(custom(None).source(), ProductSource::Custom);
    }
}
