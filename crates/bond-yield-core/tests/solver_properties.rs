use bond_yield_core::fixed_income::normalizer::normalize;
use bond_yield_core::fixed_income::ytm::{solve_ytm, SolverConfig, SolverMethod, YtmProblem};
use bond_yield_core::fixed_income::{closed_form, CouponFrequency};
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Prices within ±50% of face and maturities of 1-30 years converge by
    /// Newton-Raphson, and the solved yield reprices the bond to the cent.
    #[test]
    fn ytm_reprices_market_price(
        face in 100u32..=10_000,
        coupon_bp in 0i64..=2_000,
        price_pct in 50u32..=150,
        years in 1u32..=30,
        semi_annual in any::<bool>(),
    ) {
        let frequency = if semi_annual {
            CouponFrequency::SemiAnnual
        } else {
            CouponFrequency::Annual
        };
        let face_value = Decimal::from(face);
        let coupon_rate = Decimal::new(coupon_bp, 2);
        let market_price = face_value * Decimal::from(price_pct) / Decimal::from(100);

        let periods = normalize(Decimal::from(years), frequency).unwrap();
        let coupon =
            closed_form::coupon_payment(face_value, coupon_rate, periods.payments_per_year)
                .unwrap();
        let problem = YtmProblem::from_terms(coupon, face_value, market_price, &periods).unwrap();

        let mut warnings = Vec::new();
        let solution = solve_ytm(&problem, &SolverConfig::default(), &mut warnings).unwrap();

        prop_assert_eq!(solution.method, SolverMethod::NewtonRaphson);
        prop_assert!(solution.iterations < 100);
        prop_assert!(warnings.is_empty());

        let repriced = problem.price(solution.annual_yield);
        prop_assert!(
            (repriced - problem.market_price).abs() < 0.01,
            "repriced {} vs market {}", repriced, problem.market_price
        );
    }

    /// Discount bonds yield more than their coupon, premium bonds less.
    #[test]
    fn ytm_orders_against_coupon(
        coupon_bp in 100i64..=1_500,
        price_pct in 60u32..=140,
        years in 2u32..=30,
    ) {
        prop_assume!(price_pct != 100);
        let face_value = Decimal::from(1000);
        let coupon_rate = Decimal::new(coupon_bp, 2);
        let market_price = face_value * Decimal::from(price_pct) / Decimal::from(100);

        let periods = normalize(Decimal::from(years), CouponFrequency::SemiAnnual).unwrap();
        let coupon =
            closed_form::coupon_payment(face_value, coupon_rate, periods.payments_per_year)
                .unwrap();
        let problem = YtmProblem::from_terms(coupon, face_value, market_price, &periods).unwrap();
        let solution = solve_ytm(&problem, &SolverConfig::default(), &mut Vec::new()).unwrap();

        let coupon_decimal = coupon_bp as f64 / 10_000.0;
        if price_pct < 100 {
            prop_assert!(solution.annual_yield > coupon_decimal);
        } else {
            prop_assert!(solution.annual_yield < coupon_decimal);
        }
    }
}
