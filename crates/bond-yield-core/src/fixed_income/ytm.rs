//! Yield-to-maturity solver.
//!
//! Solves `P(y) = market_price` for the annual yield `y`, where
//!
//! ```text
//! P(y) = sum_{t=1}^{N} C / (1+r)^t + F / (1+r)^N,    r = y / payments_per_year
//! ```
//!
//! Newton-Raphson runs first from the approximate-YTM starting point. If it
//! leaves the domain, stalls on a zero derivative or exhausts its budget, the
//! solver falls back to bisection over a bounded yield bracket. Arithmetic is
//! IEEE-754 `f64`; the decimal inputs are converted once at construction.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BondError;
use crate::fixed_income::normalizer::NormalizedBond;
use crate::types::Money;
use crate::BondResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum Newton-Raphson iterations for the YTM solve.
pub const MAX_NEWTON_ITERATIONS: u32 = 100;

/// Convergence tolerance on the pricing error, in currency units.
pub const PRICE_TOLERANCE: f64 = 1e-5;

/// Residual accepted (with a warning) once bisection has exhausted its budget.
const RELAXED_PRICE_TOLERANCE: f64 = 0.01;

/// Newton-Raphson also stops once a step moves the annual yield by less than
/// this, since the pricing error is then at the level of rounding noise.
const YIELD_STEP_TOLERANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Solver tuning. All fields fall back to their defaults when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Newton-Raphson iteration budget
    pub max_iterations: u32,
    /// Stop once `|P(y) - market_price|` falls below this
    pub price_tolerance: f64,
    /// Lower end of the bisection bracket, annual yield as a decimal
    pub bracket_low: f64,
    /// Upper end of the bisection bracket, annual yield as a decimal
    pub bracket_high: f64,
    /// Bisection iteration budget
    pub max_bisection_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iterations: MAX_NEWTON_ITERATIONS,
            price_tolerance: PRICE_TOLERANCE,
            bracket_low: -0.99,
            bracket_high: 10.0,
            max_bisection_iterations: 200,
        }
    }
}

/// Root-finding method that produced the yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    NewtonRaphson,
    Bisection,
}

/// A solved yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YtmSolution {
    /// Annual yield as a decimal (0.05 = 5%)
    pub annual_yield: f64,
    /// Iterations spent by the method that produced the answer
    pub iterations: u32,
    /// `P(annual_yield) - market_price`
    pub residual: f64,
    pub method: SolverMethod,
}

impl YtmSolution {
    /// Annual yield as a percentage (5.0 = 5%).
    pub fn yield_percent(&self) -> f64 {
        self.annual_yield * 100.0
    }
}

/// The pricing equation for one bond, in `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YtmProblem {
    pub coupon_payment: f64,
    pub face_value: f64,
    pub market_price: f64,
    pub total_periods: u32,
    pub payments_per_year: u32,
}

/// Why Newton-Raphson was abandoned.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NewtonStall {
    OutOfDomain { iteration: u32, annual_yield: f64 },
    ZeroDerivative { iteration: u32 },
    Exhausted { residual: f64 },
}

impl std::fmt::Display for NewtonStall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NewtonStall::OutOfDomain {
                iteration,
                annual_yield,
            } => write!(
                f,
                "Newton-Raphson left the valid yield domain at iteration {iteration} (y = {annual_yield})"
            ),
            NewtonStall::ZeroDerivative { iteration } => write!(
                f,
                "Newton-Raphson derivative vanished at iteration {iteration}"
            ),
            NewtonStall::Exhausted { residual } => write!(
                f,
                "Newton-Raphson did not converge within its iteration budget (residual {residual:.6})"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Pricing equation
// ---------------------------------------------------------------------------

impl YtmProblem {
    pub fn new(
        coupon_payment: f64,
        face_value: f64,
        market_price: f64,
        total_periods: u32,
        payments_per_year: u32,
    ) -> Self {
        YtmProblem {
            coupon_payment,
            face_value,
            market_price,
            total_periods,
            payments_per_year,
        }
    }

    /// Build the problem from decimal bond terms and the normalised period
    /// structure.
    pub fn from_terms(
        coupon_payment: Money,
        face_value: Money,
        market_price: Money,
        periods: &NormalizedBond,
    ) -> BondResult<Self> {
        Ok(YtmProblem::new(
            to_f64("coupon_payment", coupon_payment)?,
            to_f64("face_value", face_value)?,
            to_f64("market_price", market_price)?,
            periods.total_periods,
            periods.payments_per_year,
        ))
    }

    /// Pricing-error tolerance actually used by the solver.
    ///
    /// `config.price_tolerance` is absolute, but `P(y)` summed over `N`
    /// periods carries about `N` ulps of rounding error, so for large face
    /// values the tolerance is widened to that noise floor.
    pub fn price_tolerance(&self, config: &SolverConfig) -> f64 {
        let scale = self.market_price.abs().max(self.face_value.abs());
        let noise_floor = scale * 4.0 * f64::EPSILON * f64::from(self.total_periods.max(1));
        config.price_tolerance.max(noise_floor)
    }

    /// Approximate YTM, annualised:
    /// `(C*m + (F-P)/N*m) / ((F+P)/2)`.
    pub fn initial_guess(&self) -> f64 {
        let m = f64::from(self.payments_per_year);
        let n = f64::from(self.total_periods);
        (self.coupon_payment * m + (self.face_value - self.market_price) / n * m)
            / ((self.face_value + self.market_price) / 2.0)
    }

    /// Present value of the remaining cash flows at annual yield `y`.
    pub fn price(&self, annual_yield: f64) -> f64 {
        self.price_and_derivative(annual_yield).0
    }

    /// `P(y)` and `dP/dy`, with the derivative taken w.r.t. the annual yield.
    ///
    /// Discount factors are built by repeated multiplication. Zero coupons are
    /// skipped so an underflowed discount factor cannot produce `0/0`.
    fn price_and_derivative(&self, annual_yield: f64) -> (f64, f64) {
        let m = f64::from(self.payments_per_year);
        let one_plus_r = 1.0 + annual_yield / m;

        let mut price = 0.0;
        let mut dprice = 0.0;
        let mut discount = 1.0;

        for t in 1..=self.total_periods {
            discount *= one_plus_r;
            if self.coupon_payment != 0.0 {
                price += self.coupon_payment / discount;
                dprice -= f64::from(t) * self.coupon_payment / (discount * one_plus_r);
            }
        }

        let n = f64::from(self.total_periods);
        price += self.face_value / discount;
        dprice -= n * self.face_value / (discount * one_plus_r);

        (price, dprice / m)
    }

    fn pricing_error(&self, annual_yield: f64) -> f64 {
        self.price(annual_yield) - self.market_price
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for the annual yield to maturity.
///
/// Returns the Newton-Raphson root when it converges. Otherwise a warning
/// naming the reason is pushed and bisection over
/// `[config.bracket_low, config.bracket_high]` is tried. Fails with
/// [`BondError::ConvergenceFailure`] when neither method finds a root.
pub fn solve_ytm(
    problem: &YtmProblem,
    config: &SolverConfig,
    warnings: &mut Vec<String>,
) -> BondResult<YtmSolution> {
    match newton_raphson(problem, config) {
        Ok(solution) => Ok(solution),
        Err(stall) => {
            warn!(%stall, "falling back to bisection");
            warnings.push(format!("{stall}; fell back to bisection"));
            bisection(problem, config, warnings)
        }
    }
}

/// Convert a solved yield into the percentage reported to callers.
pub fn yield_percent_decimal(solution: &YtmSolution) -> BondResult<Decimal> {
    Decimal::from_f64(solution.yield_percent()).ok_or_else(|| BondError::ConvergenceFailure {
        function: "YTM".into(),
        iterations: solution.iterations,
        last_delta: Decimal::from_f64(solution.residual).unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// Internal helpers: root finding
// ---------------------------------------------------------------------------

fn newton_raphson(problem: &YtmProblem, config: &SolverConfig) -> Result<YtmSolution, NewtonStall> {
    let m = f64::from(problem.payments_per_year);
    let tolerance = problem.price_tolerance(config);
    let mut y = problem.initial_guess();
    let mut residual = f64::NAN;

    debug!(initial_guess = y, "starting YTM Newton-Raphson");

    for iteration in 0..config.max_iterations {
        if !y.is_finite() || 1.0 + y / m <= 0.0 {
            return Err(NewtonStall::OutOfDomain {
                iteration,
                annual_yield: y,
            });
        }

        let (price, dprice) = problem.price_and_derivative(y);
        residual = price - problem.market_price;

        if !residual.is_finite() {
            return Err(NewtonStall::OutOfDomain {
                iteration,
                annual_yield: y,
            });
        }

        if residual.abs() < tolerance {
            debug!(iterations = iteration, annual_yield = y, "YTM converged");
            return Ok(YtmSolution {
                annual_yield: y,
                iterations: iteration,
                residual,
                method: SolverMethod::NewtonRaphson,
            });
        }

        if dprice == 0.0 || !dprice.is_finite() {
            return Err(NewtonStall::ZeroDerivative { iteration });
        }

        let step = residual / dprice;
        y -= step;

        if step.abs() < YIELD_STEP_TOLERANCE
            && y.is_finite()
            && residual.abs() < RELAXED_PRICE_TOLERANCE.max(tolerance)
        {
            debug!(iterations = iteration + 1, annual_yield = y, "YTM step converged");
            return Ok(YtmSolution {
                annual_yield: y,
                iterations: iteration + 1,
                residual: problem.pricing_error(y),
                method: SolverMethod::NewtonRaphson,
            });
        }
    }

    Err(NewtonStall::Exhausted { residual })
}

/// `P(y)` is strictly decreasing on the bracket, so a root exists iff the
/// pricing error is non-negative at the low end and non-positive at the high
/// end.
fn bisection(
    problem: &YtmProblem,
    config: &SolverConfig,
    warnings: &mut Vec<String>,
) -> BondResult<YtmSolution> {
    let tolerance = problem.price_tolerance(config);
    let mut lo = config.bracket_low.min(config.bracket_high);
    let mut hi = config.bracket_low.max(config.bracket_high);

    let f_lo = problem.pricing_error(lo);
    let f_hi = problem.pricing_error(hi);

    if f_lo.is_nan() || f_hi.is_nan() || f_lo < 0.0 || f_hi > 0.0 {
        let last_delta = if f_lo < 0.0 { f_lo } else { f_hi };
        return Err(BondError::ConvergenceFailure {
            function: format!("YTM bisection (no root in [{lo}, {hi}])"),
            iterations: 0,
            last_delta: Decimal::from_f64(last_delta).unwrap_or_default(),
        });
    }

    let mut mid = (lo + hi) / 2.0;
    let mut f_mid = problem.pricing_error(mid);

    for iteration in 0..config.max_bisection_iterations {
        mid = (lo + hi) / 2.0;
        f_mid = problem.pricing_error(mid);

        if f_mid.abs() < tolerance {
            debug!(iterations = iteration + 1, annual_yield = mid, "YTM bisection converged");
            return Ok(YtmSolution {
                annual_yield: mid,
                iterations: iteration + 1,
                residual: f_mid,
                method: SolverMethod::Bisection,
            });
        }

        if f_mid > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if f_mid.abs() < RELAXED_PRICE_TOLERANCE.max(tolerance) {
        warnings.push(format!(
            "YTM bisection converged with relaxed tolerance (residual: {f_mid:.6})"
        ));
        return Ok(YtmSolution {
            annual_yield: mid,
            iterations: config.max_bisection_iterations,
            residual: f_mid,
            method: SolverMethod::Bisection,
        });
    }

    Err(BondError::ConvergenceFailure {
        function: "YTM bisection".into(),
        iterations: config.max_bisection_iterations,
        last_delta: Decimal::from_f64(f_mid).unwrap_or_default(),
    })
}

fn to_f64(field: &str, value: Decimal) -> BondResult<f64> {
    value.to_f64().ok_or_else(|| BondError::InvalidInput {
        field: field.into(),
        reason: format!("{value} cannot be represented as a double"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
