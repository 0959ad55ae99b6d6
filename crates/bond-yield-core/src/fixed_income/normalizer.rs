use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BondError;
use crate::types::Years;
use crate::BondResult;

/// Coupon payment frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CouponFrequency {
    /// One coupon per year
    Annual,
    /// Two coupons per year
    SemiAnnual,
}

impl CouponFrequency {
    pub fn payments_per_year(self) -> u32 {
        match self {
            CouponFrequency::Annual => 1,
            CouponFrequency::SemiAnnual => 2,
        }
    }

    pub fn months_per_period(self) -> u32 {
        12 / self.payments_per_year()
    }

    /// Wire name, as accepted in requests.
    pub fn as_str(self) -> &'static str {
        match self {
            CouponFrequency::Annual => "annual",
            CouponFrequency::SemiAnnual => "semi-annual",
        }
    }
}

impl std::fmt::Display for CouponFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CouponFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual" => Ok(CouponFrequency::Annual),
            "semi-annual" => Ok(CouponFrequency::SemiAnnual),
            other => Err(format!(
                "unknown coupon frequency '{other}' (expected \"annual\" or \"semi-annual\")"
            )),
        }
    }
}

/// Period structure shared by the closed-form calculator, the YTM solver and
/// the cash-flow scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedBond {
    pub payments_per_year: u32,
    pub months_per_period: u32,
    pub total_periods: u32,
}

/// Raw period count `years * payments_per_year`, possibly fractional.
pub fn period_count(years_to_maturity: Years, frequency: CouponFrequency) -> Decimal {
    years_to_maturity * Decimal::from(frequency.payments_per_year())
}

/// Derive payments per year and the whole number of coupon periods.
///
/// Fractional period counts (e.g. 10.25 years paid semi-annually) are
/// rejected rather than truncated.
pub fn normalize(
    years_to_maturity: Years,
    frequency: CouponFrequency,
) -> BondResult<NormalizedBond> {
    let periods = period_count(years_to_maturity, frequency);

    if periods <= Decimal::ZERO {
        return Err(BondError::InvalidInput {
            field: "years_to_maturity".into(),
            reason: "Computed number of periods is zero".into(),
        });
    }
    if !periods.fract().is_zero() {
        return Err(BondError::InvalidInput {
            field: "years_to_maturity".into(),
            reason: format!(
                "Years to maturity must span a whole number of {frequency} coupon periods (got {} periods)",
                periods.normalize()
            ),
        });
    }

    let total_periods = periods.to_u32().ok_or_else(|| BondError::InvalidInput {
        field: "years_to_maturity".into(),
        reason: format!("Period count {periods} is out of range"),
    })?;

    Ok(NormalizedBond {
        payments_per_year: frequency.payments_per_year(),
        months_per_period: frequency.months_per_period(),
        total_periods,
    })
}
