//! Bond yield calculator.
//!
//! Normalises the request into a period structure, then runs the closed-form
//! metrics, the YTM solver and the cash-flow scheduler off that structure and
//! assembles one result record.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::BondError;
use crate::fixed_income::closed_form::{self, PremiumDiscount};
use crate::fixed_income::normalizer::{self, CouponFrequency};
use crate::fixed_income::schedule::{self, CashFlow};
use crate::fixed_income::ytm::{self, SolverConfig, SolverMethod, YtmProblem};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Percent, Years};
use crate::validation::validate_input;
use crate::BondResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The five bond terms a calculation is based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BondInput {
    /// Par value repaid at maturity
    pub face_value: Money,
    /// Nominal annual coupon rate in percent (5 = 5%)
    pub coupon_rate: Percent,
    /// Current trading price
    pub market_price: Money,
    /// Time to maturity in years, at most 100
    pub years_to_maturity: Years,
    pub coupon_frequency: CouponFrequency,
}

/// How the reported yield to maturity was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtmDiagnostics {
    pub method: SolverMethod,
    pub iterations: u32,
    /// Pricing error at the reported yield, in currency units
    pub residual: Decimal,
}

/// Output of a bond calculation. Money and percentage figures are rounded to
/// two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondCalculationResult {
    /// Annual coupon / market price, percent
    pub current_yield: Percent,
    /// Annualised yield to maturity, percent
    pub yield_to_maturity: Percent,
    /// Undiscounted sum of all coupons
    pub total_interest: Money,
    pub premium_discount: PremiumDiscount,
    /// `|market_price - face_value|`, zero at par
    pub discount_amount: Money,
    /// Coupon paid each period
    pub coupon_payment: Money,
    pub payments_per_year: u32,
    pub total_periods: u32,
    pub solver: YtmDiagnostics,
    pub cash_flows: Vec<CashFlow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate current yield, yield to maturity, total interest, premium/discount
/// status and the coupon schedule. Payment dates are projected from
/// `valuation_date`.
pub fn calculate_bond(
    input: &BondInput,
    valuation_date: NaiveDate,
) -> BondResult<ComputationOutput<BondCalculationResult>> {
    calculate_bond_with_config(input, valuation_date, &SolverConfig::default())
}

/// [`calculate_bond`] with explicit solver tuning.
pub fn calculate_bond_with_config(
    input: &BondInput,
    valuation_date: NaiveDate,
    config: &SolverConfig,
) -> BondResult<ComputationOutput<BondCalculationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validate ---
    let errors = validate_input(input);
    if !errors.is_empty() {
        return Err(BondError::Validation(errors));
    }

    // --- Normalise ---
    let periods = normalizer::normalize(input.years_to_maturity, input.coupon_frequency)?;

    // --- Closed-form metrics ---
    let coupon_payment = closed_form::coupon_payment(
        input.face_value,
        input.coupon_rate,
        periods.payments_per_year,
    )?;
    let current_yield =
        closed_form::current_yield(input.coupon_rate, input.face_value, input.market_price)?;
    let total_interest = closed_form::total_interest(
        input.face_value,
        input.coupon_rate,
        input.years_to_maturity,
    )?;
    let classification = closed_form::classify_price(input.face_value, input.market_price);

    // --- Yield to maturity ---
    let problem = YtmProblem::from_terms(
        coupon_payment,
        input.face_value,
        input.market_price,
        &periods,
    )?;
    let solution = ytm::solve_ytm(&problem, config, &mut warnings)?;
    let yield_to_maturity = ytm::yield_percent_decimal(&solution)?;

    // --- Cash-flow schedule ---
    let cash_flows = schedule::build_cash_flow_schedule(
        input.face_value,
        coupon_payment,
        &periods,
        valuation_date,
    )?;

    if input.coupon_rate.is_zero() {
        warnings.push("Zero-coupon bond: schedule carries principal repayment only".into());
    }

    debug!(
        total_periods = periods.total_periods,
        ytm_iterations = solution.iterations,
        method = ?solution.method,
        "bond calculation complete"
    );

    let output = BondCalculationResult {
        current_yield: round_money(current_yield),
        yield_to_maturity: round_money(yield_to_maturity),
        total_interest: round_money(total_interest),
        premium_discount: classification.premium_discount,
        discount_amount: round_money(classification.difference.abs()),
        coupon_payment: round_money(coupon_payment),
        payments_per_year: periods.payments_per_year,
        total_periods: periods.total_periods,
        solver: YtmDiagnostics {
            method: solution.method,
            iterations: solution.iterations,
            residual: Decimal::from_f64(solution.residual).unwrap_or_default(),
        },
        cash_flows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "valuation_date": valuation_date,
        "ytm_method": "Newton-Raphson with bisection fallback",
        "max_iterations": config.max_iterations,
        "price_tolerance": config.price_tolerance,
        "bisection_bracket": [config.bracket_low, config.bracket_high],
        "par_tolerance": closed_form::PAR_TOLERANCE,
        "rounding": "2dp, half away from zero",
        "cumulative_interest": "accumulated unrounded"
    });

    Ok(with_metadata(
        "Bond Yield Analysis — closed-form metrics, Newton-Raphson YTM, periodic cash-flow schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
