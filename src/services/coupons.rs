//! Coupon validation. Every checkout attempt re-reads the coupon; nothing is cached.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::value_objects::{CouponCode, DiscountPercentage};
use crate::ports::CouponStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection { Absent, NotFound, Inactive, Unavailable }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouponOutcome {
    Applied { code: CouponCode, discount: DiscountPercentage },
    Rejected(Rejection),
}

impl CouponOutcome {
    pub fn discount(&self) -> Option<DiscountPercentage> {
        match self { Self::Applied { discount, .. } => Some(*discount), Self::Rejected(_) => None }
    }

    pub fn applied_code(&self) -> Option<&CouponCode> {
        match self { Self::Applied { code, .. } => Some(code), Self::Rejected(_) => None }
    }

    /// Discount percentage to price with; a rejection means no discount.
    pub fn percentage(&self) -> Decimal {
        self.discount().map(|d| d.value()).unwrap_or(Decimal::ZERO)
    }
}

#[derive(Clone)]
pub struct CouponValidator {
    coupons: Arc<dyn CouponStore>,
}

impl CouponValidator {
    pub fn new(coupons: Arc<dyn CouponStore>) -> Self {
        Self { coupons }
    }

    /// Never fails: store errors are logged and treated as a rejection so checkout proceeds
    /// at full price.
    pub async fn validate(&self, raw: Option<&str>) -> CouponOutcome {
        let Some(code) = raw.and_then(|c| CouponCode::new(c).ok()) else {
            return CouponOutcome::Rejected(Rejection::Absent);
        };
        match self.coupons.find_coupon(&code).await {
            Ok(Some(coupon)) => match coupon.active_discount() {
                Some(discount) => CouponOutcome::Applied { code, discount },
                None => {
                    debug!(%code, "coupon inactive");
                    CouponOutcome::Rejected(Rejection::Inactive)
                }
            },
            Ok(None) => CouponOutcome::Rejected(Rejection::NotFound),
            Err(e) => {
                warn!(%code, error = %e, "coupon lookup failed, continuing without discount");
                CouponOutcome::Rejected(Rejection::Unavailable)
            }
        }
    }
}
