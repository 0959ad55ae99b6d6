use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{debug, info};

use bond_yield_core::fixed_income::schedule::{build_cash_flow_schedule, total_interest_paid};
use bond_yield_core::fixed_income::{
    calculate_bond_with_config, closed_form, normalizer, BondInput, CouponFrequency, SolverConfig,
};
use bond_yield_core::validation::{parse_bond_input, range_errors};
use bond_yield_core::{BondError, FieldError};

use crate::input;

/// Bond terms, from a JSON request (file or stdin) or individual flags
#[derive(Args)]
pub struct TermsArgs {
    /// Path to JSON input file
    #[arg(
        long,
        conflicts_with_all = ["face_value", "coupon_rate", "market_price", "years", "frequency"]
    )]
    pub input: Option<String>,

    /// Par value repaid at maturity
    #[arg(long, allow_negative_numbers = true)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate in percent (5 = 5%)
    #[arg(long, allow_negative_numbers = true)]
    pub coupon_rate: Option<Decimal>,

    /// Current market price
    #[arg(long, allow_negative_numbers = true)]
    pub market_price: Option<Decimal>,

    /// Years to maturity
    #[arg(long, allow_negative_numbers = true)]
    pub years: Option<Decimal>,

    /// Coupon frequency: annual or semi-annual
    #[arg(long)]
    pub frequency: Option<CouponFrequency>,
}

impl TermsArgs {
    fn has_flags(&self) -> bool {
        self.face_value.is_some()
            || self.coupon_rate.is_some()
            || self.market_price.is_some()
            || self.years.is_some()
            || self.frequency.is_some()
    }
}

/// Arguments shared by commands that project payment dates
#[derive(Args)]
pub struct BondArgs {
    #[command(flatten)]
    pub terms: TermsArgs,

    /// Valuation date (YYYY-MM-DD) payment dates are projected from. Defaults to today.
    #[arg(long)]
    pub valuation_date: Option<NaiveDate>,
}

/// Arguments for the full bond calculation
#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    /// Path to a JSON file overriding YTM solver settings
    #[arg(long)]
    pub solver_config: Option<String>,
}

/// Arguments for request validation
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub terms: TermsArgs,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = resolve_terms(&args.bond.terms)?;
    let valuation_date = resolve_valuation_date(args.bond.valuation_date);
    let config: SolverConfig = match args.solver_config {
        Some(ref path) => input::file::read_json(path)?,
        None => SolverConfig::default(),
    };

    info!(
        %valuation_date,
        frequency = %bond.coupon_frequency,
        "calculating bond metrics"
    );
    let result = calculate_bond_with_config(&bond, valuation_date, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = resolve_terms(&args.terms)?;
    let valuation_date = resolve_valuation_date(args.valuation_date);

    let periods = normalizer::normalize(bond.years_to_maturity, bond.coupon_frequency)?;
    let coupon_payment = closed_form::coupon_payment(
        bond.face_value,
        bond.coupon_rate,
        periods.payments_per_year,
    )?;
    let cash_flows =
        build_cash_flow_schedule(bond.face_value, coupon_payment, &periods, valuation_date)?;

    Ok(json!({
        "valuation_date": valuation_date,
        "total_periods": periods.total_periods,
        "total_interest_paid": total_interest_paid(&cash_flows),
        "cash_flows": cash_flows,
    }))
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    match resolve_terms(&args.terms) {
        Ok(_) => Ok(json!({ "valid": true, "errors": [] })),
        Err(e) => match e.downcast::<BondError>() {
            Ok(bond_error) => match *bond_error {
                BondError::Validation(errors) => Ok(json!({ "valid": false, "errors": errors })),
                other => Err(other.into()),
            },
            Err(e) => Err(e),
        },
    }
}

fn resolve_valuation_date(explicit: Option<NaiveDate>) -> NaiveDate {
    explicit.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        debug!(%today, "no valuation date given; using today");
        today
    })
}

/// Read bond terms from `--input`, the individual flags, or piped stdin, in
/// that order.
fn resolve_terms(terms: &TermsArgs) -> Result<BondInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = terms.input {
        let value = input::file::read_json_value(path)?;
        return Ok(parse_bond_input(&value)?);
    }
    if terms.has_flags() {
        return Ok(terms_from_flags(terms)?);
    }
    if let Some(value) = input::stdin::read_stdin()? {
        return Ok(parse_bond_input(&value)?);
    }
    Err("--input <file.json>, stdin, or --face-value/--coupon-rate/--market-price/--years/--frequency required".into())
}

/// Missing flags are reported alongside range errors on the flags that were
/// given.
fn terms_from_flags(terms: &TermsArgs) -> Result<BondInput, BondError> {
    let mut errors = Vec::new();
    let mut require = |present: bool, field: &str, flag: &str| {
        if !present {
            errors.push(FieldError::new(field, format!("{flag} is required")));
        }
    };
    require(terms.face_value.is_some(), "face_value", "--face-value");
    require(terms.coupon_rate.is_some(), "coupon_rate", "--coupon-rate");
    require(terms.market_price.is_some(), "market_price", "--market-price");
    require(terms.years.is_some(), "years_to_maturity", "--years");
    require(terms.frequency.is_some(), "coupon_frequency", "--frequency");

    errors.extend(range_errors(
        terms.face_value,
        terms.coupon_rate,
        terms.market_price,
        terms.years,
        terms.frequency,
    ));

    match (
        terms.face_value,
        terms.coupon_rate,
        terms.market_price,
        terms.years,
        terms.frequency,
    ) {
        (
            Some(face_value),
            Some(coupon_rate),
            Some(market_price),
            Some(years_to_maturity),
            Some(coupon_frequency),
        ) if errors.is_empty() => Ok(BondInput {
            face_value,
            coupon_rate,
            market_price,
            years_to_maturity,
            coupon_frequency,
        }),
        _ => Err(BondError::Validation(errors)),
    }
}
