//! Pricing calculator.
//!
//! All arithmetic stays in [`Decimal`]; the only rounding step is the conversion of the final
//! major-unit total into integer minor units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;
use crate::domain::value_objects::{DiscountPercentage, Quantity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub unit_price: Decimal,
    pub discounted_unit_price: Decimal,
    pub total_major: Decimal,
    pub total_minor: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("unit price {0} is negative")]
    NegativePrice(Decimal),

    #[error("amount {0} does not fit in minor units")]
    Overflow(Decimal),
}

impl PriceBreakdown {
    pub fn compute(unit_price: Decimal, quantity: Quantity, discount: Option<DiscountPercentage>) -> Result<Self, PricingError> {
        if unit_price.is_sign_negative() && !unit_price.is_zero() { return Err(PricingError::NegativePrice(unit_price)); }
        let pct = discount.map(|d| d.value()).unwrap_or(Decimal::ZERO);
        let discounted_unit_price = unit_price * (Decimal::ONE - pct / Decimal::ONE_HUNDRED);
        let total_major = discounted_unit_price * Decimal::from(quantity.value());
        let total_minor = to_minor_units(total_major)?;
        Ok(Self { unit_price, discounted_unit_price, total_major, total_minor })
    }

    /// Post-discount price of one unit in minor units, as sent to the gateway line item.
    pub fn unit_minor(&self) -> Result<i64, PricingError> { to_minor_units(self.discounted_unit_price) }

    /// What a gateway charges for the line: the rounded unit amount times the quantity.
    /// Differs from `total_minor` by under a cent per unit when the discounted unit price
    /// has a fractional cent.
    pub fn charged_minor(&self, quantity: Quantity) -> Result<i64, PricingError> {
        self.unit_minor()?
            .checked_mul(i64::from(quantity.value()))
            .ok_or(PricingError::Overflow(self.total_major))
    }
}

/// `round(major * 100)`, halves away from zero.
pub fn to_minor_units(major: Decimal) -> Result<i64, PricingError> {
    (major * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Overflow(major))
}
