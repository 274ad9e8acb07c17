//! Storefront Orders
//!
//! Dual-channel checkout and order reconciliation for a small storefront.
//!
//! ## Features
//! - Catalog and custom product resolution
//! - Coupon validation and decimal-safe pricing
//! - Hosted card checkout sessions (gateway channel)
//! - Pay-on-delivery orders (delivery channel)
//! - One merged, newest-first order feed for administrators

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod presentation;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

use crate::domain::metadata::MetadataError;
use crate::domain::pricing::PricingError;
use crate::domain::value_objects::{IdentifierError, QuantityError};
use crate::ports::{GatewayError, StoreError};

// =============================================================================
// Error Types
// =============================================================================

/// Coarse category of a [`StorefrontError`], used for status mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind { Validation, NotFound, Authorization, Upstream }

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid product identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("That product no longer exists")]
    ProductNotFound,

    #[error("Invalid or inactive coupon code")]
    CouponNotFound,

    #[error("Not authorized to list orders")]
    Forbidden,

    #[error("We could not reach payment processing: {message}")]
    Gateway { status: Option<u16>, message: String },

    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl StorefrontError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) | Self::InvalidIdentifier(_) | Self::InvalidQuantity(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::ProductNotFound | Self::CouponNotFound => ErrorKind::NotFound,
            Self::Forbidden => ErrorKind::Authorization,
            Self::Gateway { .. } | Self::StorageError(_) => ErrorKind::Upstream,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::Validation(_) => "invalid_request",
            Self::ProductNotFound => "product_not_found",
            Self::CouponNotFound => "coupon_not_found",
            Self::Forbidden => "forbidden",
            Self::Gateway { .. } => "gateway_error",
            Self::StorageError(_) => "storage_error",
        }
    }
}

impl From<GatewayError> for StorefrontError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status, message } => Self::Gateway { status: Some(status), message },
            GatewayError::Transport(message) => Self::Gateway { status: None, message },
        }
    }
}

impl From<PricingError> for StorefrontError {
    fn from(err: PricingError) -> Self { Self::Validation(err.to_string()) }
}

impl From<MetadataError> for StorefrontError {
    fn from(err: MetadataError) -> Self { Self::Validation(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
