use bond_yield_core::fixed_income::{
    calculate_bond, BondInput, CouponFrequency, PremiumDiscount, SolverMethod,
};
use bond_yield_core::validation::parse_bond_input;
use bond_yield_core::BondError;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn valuation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
}

fn bond(
    face: Decimal,
    coupon: Decimal,
    price: Decimal,
    years: Decimal,
    freq: CouponFrequency,
) -> BondInput {
    BondInput {
        face_value: face,
        coupon_rate: coupon,
        market_price: price,
        years_to_maturity: years,
        coupon_frequency: freq,
    }
}

// ===========================================================================
// Reference bond
// ===========================================================================

#[test]
fn test_reference_discount_bond_end_to_end() {
    let request = json!({
        "face_value": 1000,
        "coupon_rate": 5,
        "market_price": 950,
        "years_to_maturity": 10,
        "coupon_frequency": "semi-annual"
    });
    let input = parse_bond_input(&request).unwrap();
    let result = calculate_bond(&input, valuation_date()).unwrap();
    let out = &result.result;

    assert_eq!(out.total_periods, 20);
    assert_eq!(out.coupon_payment, dec!(25));
    assert_eq!(out.current_yield, dec!(5.26));
    assert!(out.yield_to_maturity > out.current_yield);
    assert_eq!(out.premium_discount, PremiumDiscount::Discount);
    assert_eq!(out.discount_amount, dec!(50));
    assert_eq!(out.total_interest, dec!(500));
}

#[test]
fn test_result_serializes_with_wire_names() {
    let input = bond(dec!(1000), dec!(5), dec!(950), dec!(10), CouponFrequency::SemiAnnual);
    let result = calculate_bond(&input, valuation_date()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["result"]["premium_discount"], "discount");
    assert_eq!(json["result"]["solver"]["method"], "newton_raphson");
    // Month-end valuation date clamps into September
    assert_eq!(json["result"]["cash_flows"][0]["payment_date"], "2025-09-30");
    assert_eq!(json["result"]["cash_flows"][0]["period"], 1);
}

// ===========================================================================
// Par / premium / discount classification
// ===========================================================================

#[test]
fn test_par_tolerance_boundary() {
    for price in [dec!(1000.005), dec!(999.995), dec!(1000)] {
        let input = bond(dec!(1000), dec!(4), price, dec!(5), CouponFrequency::Annual);
        let out = calculate_bond(&input, valuation_date()).unwrap().result;
        assert_eq!(out.premium_discount, PremiumDiscount::Par, "price {price}");
        assert_eq!(out.discount_amount, Decimal::ZERO);
    }

    let input = bond(dec!(1000), dec!(4), dec!(1000.02), dec!(5), CouponFrequency::Annual);
    let out = calculate_bond(&input, valuation_date()).unwrap().result;
    assert_eq!(out.premium_discount, PremiumDiscount::Premium);
    assert_eq!(out.discount_amount, dec!(0.02));
}

#[test]
fn test_par_bond_yield_matches_coupon() {
    for freq in [CouponFrequency::Annual, CouponFrequency::SemiAnnual] {
        let input = bond(dec!(5000), dec!(7.25), dec!(5000), dec!(12), freq);
        let out = calculate_bond(&input, valuation_date()).unwrap().result;
        assert_eq!(out.yield_to_maturity, dec!(7.25), "{freq}");
        assert_eq!(out.premium_discount, PremiumDiscount::Par);
    }
}

// ===========================================================================
// Cash-flow schedule
// ===========================================================================

#[test]
fn test_schedule_invariants() {
    let input = bond(dec!(1000), dec!(6.5), dec!(1040), dec!(7.5), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, valuation_date()).unwrap().result;
    let flows = &out.cash_flows;

    assert_eq!(flows.len() as u32, out.total_periods);
    assert_eq!(flows.len(), 15);

    for (i, cf) in flows.iter().enumerate() {
        assert_eq!(cf.period as usize, i + 1);
        let expected_principal = if i == flows.len() - 1 {
            Decimal::ZERO
        } else {
            dec!(1000)
        };
        assert_eq!(cf.remaining_principal, expected_principal);
    }

    for w in flows.windows(2) {
        assert!(w[1].cumulative_interest > w[0].cumulative_interest);
    }

    let last = flows.last().unwrap();
    assert_eq!(last.cumulative_interest, out.total_interest);
}

#[test]
fn test_single_period_bond() {
    let input = bond(dec!(100), dec!(10), dec!(95), dec!(1), CouponFrequency::Annual);
    let out = calculate_bond(&input, valuation_date()).unwrap().result;
    assert_eq!(out.cash_flows.len(), 1);
    assert_eq!(out.cash_flows[0].remaining_principal, Decimal::ZERO);
    assert_eq!(out.cash_flows[0].coupon_payment, dec!(10));
    // (10 + 100) / 95 - 1 = 15.789...%
    assert_eq!(out.yield_to_maturity, dec!(15.79));
}

#[test]
fn test_longest_maturity_semi_annual() {
    let input = bond(dec!(1000), dec!(3), dec!(700), dec!(100), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, valuation_date()).unwrap().result;
    assert_eq!(out.total_periods, 200);
    assert_eq!(out.cash_flows.len(), 200);
    assert_eq!(
        out.cash_flows[199].payment_date,
        NaiveDate::from_ymd_opt(2125, 3, 31).unwrap()
    );
}

// ===========================================================================
// Sovereign-sized issues
// ===========================================================================

fn power_of_ten(exp: u32) -> Decimal {
    Decimal::from_i128_with_scale(10i128.pow(exp), 0)
}

#[test]
fn test_large_face_values_match_reference_yield() {
    // Same terms as the reference bond, scaled up: the yield must not move.
    for exp in [11, 12, 14, 16] {
        let face = power_of_ten(exp);
        let input = bond(
            face,
            dec!(5),
            face * dec!(0.95),
            dec!(10),
            CouponFrequency::SemiAnnual,
        );
        let result = calculate_bond(&input, valuation_date()).unwrap();
        assert_eq!(result.result.yield_to_maturity, dec!(5.66), "face 1e{exp}");
        assert_eq!(result.result.solver.method, SolverMethod::NewtonRaphson, "face 1e{exp}");
        assert!(result.warnings.is_empty(), "face 1e{exp}: {:?}", result.warnings);
    }
}

// ===========================================================================
// Purity
// ===========================================================================

#[test]
fn test_identical_inputs_give_identical_results() {
    let input = bond(dec!(1000), dec!(5), dec!(950), dec!(10), CouponFrequency::SemiAnnual);
    let a = calculate_bond(&input, valuation_date()).unwrap();
    let b = calculate_bond(&input, valuation_date()).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.warnings, b.warnings);
}

#[test]
fn test_concurrent_calls_are_independent() {
    let inputs: Vec<BondInput> = (1..=8)
        .map(|y| {
            bond(
                dec!(1000),
                dec!(4),
                dec!(980),
                Decimal::from(y),
                CouponFrequency::SemiAnnual,
            )
        })
        .collect();

    let sequential: Vec<_> = inputs
        .iter()
        .map(|i| calculate_bond(i, valuation_date()).unwrap().result)
        .collect();

    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|i| s.spawn(move || calculate_bond(i, valuation_date()).unwrap().result))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

// ===========================================================================
// Failure modes
// ===========================================================================

#[test]
fn test_fractional_period_count_is_rejected() {
    let input = bond(dec!(1000), dec!(5), dec!(950), dec!(10.5), CouponFrequency::Annual);
    match calculate_bond(&input, valuation_date()) {
        Err(BondError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "years_to_maturity");
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
}

#[test]
fn test_pathological_price_never_yields_nan() {
    // Zero coupon priced at 50x face: Newton's starting point is below -100%.
    let input = bond(dec!(1000), Decimal::ZERO, dec!(50000), dec!(1), CouponFrequency::Annual);
    let result = calculate_bond(&input, valuation_date()).unwrap();
    assert_eq!(result.result.solver.method, SolverMethod::Bisection);
    assert_eq!(result.result.yield_to_maturity, dec!(-98));
    assert!(result.warnings.iter().any(|w| w.contains("bisection")));
}

#[test]
fn test_current_yield_overflow_is_an_error_not_a_panic() {
    let input = bond(
        power_of_ten(27),
        dec!(100),
        dec!(0.001),
        dec!(1),
        CouponFrequency::Annual,
    );
    match calculate_bond(&input, valuation_date()) {
        Err(BondError::InvalidInput { field, .. }) => assert_eq!(field, "market_price"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_total_interest_overflow_is_an_error_not_a_panic() {
    let input = bond(
        power_of_ten(28),
        dec!(100),
        dec!(1000),
        dec!(100),
        CouponFrequency::Annual,
    );
    match calculate_bond(&input, valuation_date()) {
        Err(BondError::InvalidInput { field, .. }) => assert_eq!(field, "face_value"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}
