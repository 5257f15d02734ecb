//! Newton-Raphson and bisection root finders

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Iteration limits shared by every root finder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_iterations: u32,
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// A converged root with iteration statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub root: f64,
    pub iterations: u32,
    pub residual: f64,
}

/// Newton-Raphson iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)`.
///
/// `f` returns the function value and its derivative together, since both
/// usually share the same discounting work. Iteration stops once `|f(x)|` or
/// the step size drops below the tolerance, so `f` should be scaled to a
/// dimensionless residual when the root is a rate.
pub fn newton_raphson<F>(f: F, initial_guess: f64, config: &SolverConfig) -> CalcResult<SolverOutcome>
where
    F: Fn(f64) -> (f64, f64),
{
    newton_raphson_bounded(f, initial_guess, (f64::NEG_INFINITY, f64::INFINITY), config)
}

/// Newton-Raphson with each iterate clamped into `[low, high]`
pub fn newton_raphson_bounded<F>(
    f: F,
    initial_guess: f64,
    (low, high): (f64, f64),
    config: &SolverConfig,
) -> CalcResult<SolverOutcome>
where
    F: Fn(f64) -> (f64, f64),
{
    let mut x = initial_guess;

    for iteration in 0..config.max_iterations {
        let (fx, dfx) = f(x);

        if !fx.is_finite() {
            return Err(CalcError::NonConvergence {
                iterations: iteration,
                residual: fx,
            });
        }

        if fx.abs() < config.tolerance {
            return Ok(SolverOutcome {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if dfx.abs() < 1e-15 || !dfx.is_finite() {
            return Err(CalcError::DivisionByZero { what: "derivative" });
        }

        let next = (x - fx / dfx).clamp(low, high);
        trace!("newton iteration {}: x = {:.10}, f(x) = {:.3e}", iteration, x, fx);

        // Pinned against a bound: the root lies outside [low, high]
        if next == x && (next == low || next == high) {
            return Err(CalcError::NonConvergence {
                iterations: iteration + 1,
                residual: fx.abs(),
            });
        }

        if (next - x).abs() < config.tolerance {
            let (residual, _) = f(next);
            return Ok(SolverOutcome {
                root: next,
                iterations: iteration + 1,
                residual,
            });
        }

        x = next;
    }

    let (residual, _) = f(x);
    Err(CalcError::NonConvergence {
        iterations: config.max_iterations,
        residual: residual.abs(),
    })
}

/// Bisection on a bracket whose endpoints straddle a root
pub fn bisection<F>(f: F, low: f64, high: f64, config: &SolverConfig) -> CalcResult<SolverOutcome>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (low, high);
    let mut fa = f(a);
    let fb = f(b);

    if fa == 0.0 {
        return Ok(SolverOutcome { root: a, iterations: 0, residual: 0.0 });
    }
    if fb == 0.0 {
        return Ok(SolverOutcome { root: b, iterations: 0, residual: 0.0 });
    }
    if fa * fb > 0.0 || !(fa * fb).is_finite() {
        return Err(CalcError::InvalidBracket {
            low,
            high,
            f_low: fa,
            f_high: fb,
        });
    }

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (a + b);
        let fm = f(mid);

        if fm.abs() < config.tolerance || 0.5 * (b - a) < config.tolerance {
            return Ok(SolverOutcome {
                root: mid,
                iterations: iteration + 1,
                residual: fm,
            });
        }

        if fa * fm < 0.0 {
            b = mid;
        } else {
            a = mid;
            fa = fm;
        }
    }

    let mid = 0.5 * (a + b);
    Err(CalcError::NonConvergence {
        iterations: config.max_iterations,
        residual: f(mid).abs(),
    })
}
