//! Bond analytics engine: parameter normalisation, closed-form metrics,
//! yield-to-maturity solving and coupon schedule generation.

pub mod calculator;
pub mod closed_form;
pub mod normalizer;
pub mod schedule;
pub mod ytm;

pub use calculator::{
    calculate_bond, calculate_bond_with_config, BondCalculationResult, BondInput, YtmDiagnostics,
};
pub use closed_form::{PremiumDiscount, PriceClassification};
pub use normalizer::{CouponFrequency, NormalizedBond};
pub use schedule::CashFlow;
pub use ytm::{SolverConfig, SolverMethod, YtmProblem, YtmSolution};
