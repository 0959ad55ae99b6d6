//! Boundary contract for bond requests.
//!
//! Requests are checked field by field and every violation is reported, not
//! just the first. Unknown properties are rejected.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};

use crate::error::{BondError, FieldError};
use crate::fixed_income::calculator::BondInput;
use crate::fixed_income::normalizer::{period_count, CouponFrequency};
use crate::types::{Money, Percent, Years};
use crate::BondResult;

/// The only properties a bond request may carry.
pub const BOND_INPUT_FIELDS: [&str; 5] = [
    "face_value",
    "coupon_rate",
    "market_price",
    "years_to_maturity",
    "coupon_frequency",
];

pub const MAX_COUPON_RATE: Percent = dec!(100);
pub const MAX_YEARS_TO_MATURITY: Years = dec!(100);

/// Range-check an already typed request. An empty vector means the input is
/// safe to hand to the engine.
pub fn validate_input(input: &BondInput) -> Vec<FieldError> {
    range_errors(
        Some(input.face_value),
        Some(input.coupon_rate),
        Some(input.market_price),
        Some(input.years_to_maturity),
        Some(input.coupon_frequency),
    )
}

/// Parse an untyped JSON request into a [`BondInput`], collecting whitelist,
/// presence, type and range violations into a single
/// [`BondError::Validation`].
pub fn parse_bond_input(value: &Value) -> BondResult<BondInput> {
    let map = match value.as_object() {
        Some(map) => map,
        None => {
            return Err(BondError::Validation(vec![FieldError::new(
                "body",
                "Request body must be a JSON object",
            )]))
        }
    };

    let mut errors = Vec::new();

    for key in map.keys() {
        if !BOND_INPUT_FIELDS.contains(&key.as_str()) {
            errors.push(FieldError::new(
                key.as_str(),
                format!("property {key} should not exist"),
            ));
        }
    }

    let face_value = decimal_field(map, "face_value", "Face value", &mut errors);
    let coupon_rate = decimal_field(map, "coupon_rate", "Coupon rate", &mut errors);
    let market_price = decimal_field(map, "market_price", "Market price", &mut errors);
    let years_to_maturity =
        decimal_field(map, "years_to_maturity", "Years to maturity", &mut errors);
    let coupon_frequency = frequency_field(map, &mut errors);

    errors.extend(range_errors(
        face_value,
        coupon_rate,
        market_price,
        years_to_maturity,
        coupon_frequency,
    ));

    match (
        face_value,
        coupon_rate,
        market_price,
        years_to_maturity,
        coupon_frequency,
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

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

/// Range checks on whichever terms are present. Absent terms are skipped, so
/// callers report missing fields themselves.
pub fn range_errors(
    face_value: Option<Money>,
    coupon_rate: Option<Percent>,
    market_price: Option<Money>,
    years_to_maturity: Option<Years>,
    coupon_frequency: Option<CouponFrequency>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Some(v) = face_value {
        if v <= Decimal::ZERO {
            errors.push(FieldError::new("face_value", "Face value must be positive"));
        }
    }

    if let Some(v) = coupon_rate {
        if v < Decimal::ZERO {
            errors.push(FieldError::new("coupon_rate", "Coupon rate cannot be negative"));
        } else if v > MAX_COUPON_RATE {
            errors.push(FieldError::new("coupon_rate", "Coupon rate cannot exceed 100%"));
        }
    }

    if let Some(v) = market_price {
        if v <= Decimal::ZERO {
            errors.push(FieldError::new("market_price", "Market price must be positive"));
        }
    }

    if let Some(years) = years_to_maturity {
        if years <= Decimal::ZERO {
            errors.push(FieldError::new(
                "years_to_maturity",
                "Years to maturity must be positive",
            ));
        } else if years > MAX_YEARS_TO_MATURITY {
            errors.push(FieldError::new(
                "years_to_maturity",
                "Years to maturity cannot exceed 100",
            ));
        } else if let Some(frequency) = coupon_frequency {
            let periods = period_count(years, frequency);
            if !periods.fract().is_zero() {
                errors.push(FieldError::new(
                    "years_to_maturity",
                    format!(
                        "Years to maturity must span a whole number of {frequency} coupon periods (got {} periods)",
                        periods.normalize()
                    ),
                ));
            }
        }
    }

    errors
}

fn decimal_field(
    map: &Map<String, Value>,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    match map.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, format!("{label} is required")));
            None
        }
        Some(v @ Value::Number(_)) => match serde_json::from_value::<Decimal>(v.clone()) {
            Ok(d) => Some(d),
            Err(_) => {
                errors.push(FieldError::new(
                    field,
                    format!("{label} is not representable as a decimal"),
                ));
                None
            }
        },
        Some(_) => {
            errors.push(FieldError::new(field, format!("{label} must be a number")));
            None
        }
    }
}

fn frequency_field(
    map: &Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<CouponFrequency> {
    const FIELD: &str = "coupon_frequency";
    const INVALID: &str = "Coupon frequency must be either \"annual\" or \"semi-annual\"";

    match map.get(FIELD) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(FIELD, "Coupon frequency is required"));
            None
        }
        Some(Value::String(s)) => match s.parse::<CouponFrequency>() {
            Ok(f) => Some(f),
            Err(_) => {
                errors.push(FieldError::new(FIELD, INVALID));
                None
            }
        },
        Some(_) => {
            errors.push(FieldError::new(FIELD, INVALID));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
