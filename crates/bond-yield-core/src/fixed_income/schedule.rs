//! Coupon schedule projected forward from the valuation date.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BondError;
use crate::fixed_income::normalizer::NormalizedBond;
use crate::types::{round_money, Money};
use crate::BondResult;

/// One coupon period of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    /// 1-based period number
    pub period: u32,
    /// Serialized as `YYYY-MM-DD`
    pub payment_date: NaiveDate,
    pub coupon_payment: Money,
    /// Running sum of coupons paid up to and including this period
    pub cumulative_interest: Money,
    /// Face value still outstanding after this payment; zero at maturity
    pub remaining_principal: Money,
}

/// Build one row per coupon period.
///
/// `cumulative_interest` is accumulated from the unrounded coupon and only the
/// emitted figure is rounded, so the final row matches total interest.
pub fn build_cash_flow_schedule(
    face_value: Money,
    coupon_payment: Money,
    periods: &NormalizedBond,
    valuation_date: NaiveDate,
) -> BondResult<Vec<CashFlow>> {
    let mut cash_flows = Vec::with_capacity(periods.total_periods as usize);
    let mut cumulative_interest = Decimal::ZERO;

    for period in 1..=periods.total_periods {
        let payment_date = payment_date(valuation_date, period, periods.months_per_period)?;
        cumulative_interest = cumulative_interest
            .checked_add(coupon_payment)
            .ok_or_else(|| BondError::InvalidInput {
                field: "face_value".into(),
                reason: format!("Cumulative interest overflows at period {period}"),
            })?;

        let is_last = period == periods.total_periods;
        let remaining_principal = if is_last { Decimal::ZERO } else { face_value };

        cash_flows.push(CashFlow {
            period,
            payment_date,
            coupon_payment: round_money(coupon_payment),
            cumulative_interest: round_money(cumulative_interest),
            remaining_principal: round_money(remaining_principal),
        });
    }

    Ok(cash_flows)
}

/// Total coupon income across a schedule, i.e. the final cumulative figure.
pub fn total_interest_paid(cash_flows: &[CashFlow]) -> Money {
    cash_flows
        .last()
        .map(|cf| cf.cumulative_interest)
        .unwrap_or(Decimal::ZERO)
}

/// `valuation_date + period * months_per_period` months, clamped to the end of
/// the target month.
fn payment_date(
    valuation_date: NaiveDate,
    period: u32,
    months_per_period: u32,
) -> BondResult<NaiveDate> {
    let months = period
        .checked_mul(months_per_period)
        .ok_or_else(|| BondError::DateError(format!("Month offset for period {period} overflows")))?;

    valuation_date
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            BondError::DateError(format!(
                "Payment date for period {period} ({months} months after {valuation_date}) is out of range"
            ))
        })
}
