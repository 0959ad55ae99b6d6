//! Closed-form bond metrics: periodic coupon, current yield, total interest
//! and premium/discount classification. No iteration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BondError;
use crate::types::{Money, Percent, Years};
use crate::BondResult;

/// Price differences smaller than one cent are treated as par.
pub const PAR_TOLERANCE: Money = dec!(0.01);

const HUNDRED: Decimal = dec!(100);

/// Whether the bond trades above, below, or at face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumDiscount {
    Premium,
    Discount,
    Par,
}

impl std::fmt::Display for PremiumDiscount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PremiumDiscount::Premium => "premium",
            PremiumDiscount::Discount => "discount",
            PremiumDiscount::Par => "par",
        })
    }
}

/// Classification of market price against face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceClassification {
    pub premium_discount: PremiumDiscount,
    /// Signed `market_price - face_value`; zero when at par.
    pub difference: Money,
}

/// Coupon paid each period: `face * (rate / 100) / payments_per_year`.
pub fn coupon_payment(
    face_value: Money,
    coupon_rate: Percent,
    payments_per_year: u32,
) -> BondResult<Money> {
    face_value
        .checked_mul(coupon_rate / HUNDRED)
        .and_then(|annual| annual.checked_div(Decimal::from(payments_per_year)))
        .ok_or_else(|| overflow("face_value", "Coupon payment"))
}

/// Annual coupon income over market price, as a percentage.
///
/// The caller guarantees `market_price > 0`.
pub fn current_yield(
    coupon_rate: Percent,
    face_value: Money,
    market_price: Money,
) -> BondResult<Percent> {
    (coupon_rate / HUNDRED)
        .checked_mul(face_value)
        .and_then(|annual_coupon| annual_coupon.checked_div(market_price))
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or_else(|| overflow("market_price", "Current yield"))
}

/// Undiscounted sum of all coupons over the life of the bond. Independent of
/// payment frequency.
pub fn total_interest(
    face_value: Money,
    coupon_rate: Percent,
    years_to_maturity: Years,
) -> BondResult<Money> {
    (coupon_rate / HUNDRED)
        .checked_mul(face_value)
        .and_then(|annual_coupon| annual_coupon.checked_mul(years_to_maturity))
        .ok_or_else(|| overflow("face_value", "Total interest"))
}

fn overflow(field: &str, metric: &str) -> BondError {
    BondError::InvalidInput {
        field: field.into(),
        reason: format!("{metric} exceeds the representable decimal range"),
    }
}

pub fn classify_price(face_value: Money, market_price: Money) -> PriceClassification {
    let difference = market_price - face_value;

    if difference.abs() < PAR_TOLERANCE {
        PriceClassification {
            premium_discount: PremiumDiscount::Par,
            difference: Decimal::ZERO,
        }
    } else if difference > Decimal::ZERO {
        PriceClassification {
            premium_discount: PremiumDiscount::Premium,
            difference,
        }
    } else {
        PriceClassification {
            premium_discount: PremiumDiscount::Discount,
            difference,
        }
    }
}
