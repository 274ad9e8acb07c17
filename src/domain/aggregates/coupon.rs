//! Coupon Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{CouponCode, DiscountPercentage};

/// Administrator-managed discount. Read-only to checkout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: CouponCode,
    pub discount_percentage: DiscountPercentage,
    pub is_active: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// The discount this coupon grants right now, if any.
    pub fn active_discount(&self) -> Option<DiscountPercentage> {
        self.is_active.then_some(self.discount_percentage)
    }
}
