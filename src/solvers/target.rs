//! Rate and horizon needed to grow a present value into a target

use log::debug;
use serde::{Deserialize, Serialize};

use super::irr::{SolveMethod, RATE_CEILING, RATE_FLOOR};
use super::newton::{bisection, newton_raphson_bounded, SolverConfig};
use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// Periodic rate turning `present_value` into `future_value` over `periods`:
/// `(FV/PV)^(1/n) - 1`
pub fn required_rate(present_value: f64, future_value: f64, periods: f64) -> CalcResult<f64> {
    if present_value == 0.0 {
        return Err(CalcError::DivisionByZero { what: "present value" });
    }
    ensure_positive("present_value", present_value)?;
    ensure_positive("future_value", future_value)?;
    if periods == 0.0 {
        return Err(CalcError::DivisionByZero { what: "periods" });
    }
    ensure_positive("periods", periods)?;

    Ok((future_value / present_value).powf(1.0 / periods) - 1.0)
}

/// Periods needed for `present_value` to reach `future_value` at `rate` per period
pub fn periods_to_target(present_value: f64, future_value: f64, rate: f64) -> CalcResult<f64> {
    ensure_positive("present_value", present_value)?;
    ensure_positive("future_value", future_value)?;
    if rate <= -1.0 || !rate.is_finite() {
        return Err(CalcError::invalid("rate", "must be greater than -100%"));
    }
    let growth = (1.0 + rate).ln();
    if growth.abs() < 1e-15 {
        return Err(CalcError::DivisionByZero { what: "rate" });
    }
    Ok((future_value / present_value).ln() / growth)
}

fn default_periods_per_year() -> u32 {
    12
}

/// Target-savings problem: what rate grows `present_value` plus level
/// contributions into `future_value` within `years`?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRateParams {
    pub present_value: f64,
    pub future_value: f64,
    pub years: f64,
    /// Contribution at the end of every period
    #[serde(default)]
    pub contribution: f64,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
}

impl TargetRateParams {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("present_value", self.present_value)?;
        ensure_positive("future_value", self.future_value)?;
        ensure_positive("years", self.years)?;
        ensure_non_negative("contribution", self.contribution)?;
        if self.periods_per_year == 0 {
            return Err(CalcError::invalid("periods_per_year", "must be at least one"));
        }
        if self.present_value == 0.0 && self.contribution == 0.0 {
            return Err(CalcError::invalid(
                "present_value",
                "either a present value or a contribution is required",
            ));
        }
        Ok(())
    }

    fn periods(&self) -> f64 {
        (self.years * self.periods_per_year as f64).round().max(1.0)
    }

    /// Future value of the position at periodic rate `i`, and its derivative
    fn future_value_at(&self, i: f64) -> (f64, f64) {
        let n = self.periods();
        let (pv, c) = (self.present_value, self.contribution);

        if i.abs() < 1e-10 {
            // Limits of the annuity factor and its derivative as i -> 0
            return (pv + c * n, pv * n + c * n * (n - 1.0) / 2.0);
        }

        let growth = (1.0 + i).powf(n);
        let annuity = (growth - 1.0) / i;
        let d_growth = n * (1.0 + i).powf(n - 1.0);
        let d_annuity = (d_growth * i - (growth - 1.0)) / (i * i);

        (pv * growth + c * annuity, pv * d_growth + c * d_annuity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRateResult {
    pub periodic_rate: f64,
    /// Nominal annual rate, `periodic * periods_per_year`
    pub nominal_rate: f64,
    /// Effective annual rate
    pub annual_rate: f64,
    pub iterations: u32,
    pub method: SolveMethod,
}

/// Solve for the growth rate that reaches the target.
///
/// Closed form without contributions; Newton-Raphson over the annuity
/// future-value equation otherwise, with bisection as the fallback.
pub fn required_rate_for_target(
    params: &TargetRateParams,
    config: &SolverConfig,
) -> CalcResult<TargetRateResult> {
    params.validate()?;
    let n = params.periods();
    let ppy = params.periods_per_year as f64;

    let (periodic_rate, iterations, method) = if params.contribution == 0.0 {
        (required_rate(params.present_value, params.future_value, n)?, 0, SolveMethod::ClosedForm)
    } else {
        // Residual relative to the target
        let scale = params.future_value;
        let objective = |i: f64| {
            let (fv, dfv) = params.future_value_at(i);
            ((fv - params.future_value) / scale, dfv / scale)
        };
        match newton_raphson_bounded(objective, 0.005, (RATE_FLOOR, RATE_CEILING), config) {
            Ok(outcome) => (outcome.root, outcome.iterations, SolveMethod::Newton),
            Err(e) => {
                debug!("target rate: Newton-Raphson failed ({}), trying bisection", e);
                let outcome = bisection(|i| objective(i).0, RATE_FLOOR, RATE_CEILING, config)?;
                (outcome.root, outcome.iterations, SolveMethod::Bisection)
            }
        }
    };

    Ok(TargetRateResult {
        periodic_rate,
        nominal_rate: periodic_rate * ppy,
        annual_rate: (1.0 + periodic_rate).powf(ppy) - 1.0,
        iterations,
        method,
    })
}
