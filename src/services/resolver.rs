//! Product resolution against the collection selected by the custom-product flag.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::aggregates::{Product, ProductSource};
use crate::domain::value_objects::ProductId;
use crate::ports::Catalog;
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct ProductResolver {
    catalog: Arc<dyn Catalog>,
}

impl ProductResolver {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Parses the id before touching the store, then reads the full record.
    pub async fn resolve(&self, raw_id: &str, is_custom_product: bool) -> Result<Product> {
        let id = ProductId::parse(raw_id)?;
        self.resolve_id(id, ProductSource::from_flag(is_custom_product)).await
    }

    #[instrument(skip(self), fields(collection = source.collection()))]
    pub async fn resolve_id(&self, id: ProductId, source: ProductSource) -> Result<Product> {
        let product = self.catalog.find_product(source, id).await?.ok_or(StorefrontError::ProductNotFound)?;
        // A record from the other collection is never a match.
        if product.source() != source || product.id() != id {
            debug!(found = ?product.source(), "catalog returned a product from the wrong source");
            return Err(StorefrontError::ProductNotFound);
        }
        Ok(product)
    }
}
