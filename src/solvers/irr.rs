//! Internal Rate of Return (IRR) and its variants
//!
//! Newton-Raphson is tried first, bisection second, and a ratio-based
//! approximation last. Cash-flow series with several sign changes can have
//! more than one IRR; whichever root the iteration reaches first is returned
//! and `method` records how it was found.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::newton::{bisection, newton_raphson_bounded, SolverConfig, SolverOutcome};
use crate::error::{CalcError, CalcResult};

/// Periodic rates are searched within these bounds
pub const RATE_FLOOR: f64 = -0.99;
pub const RATE_CEILING: f64 = 10.0;

pub const DEFAULT_GUESS: f64 = 0.1;

/// Which stage of the solver produced the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    Newton,
    Bisection,
    Approximation,
    /// Direct formula, no iteration
    ClosedForm,
    /// No sign change in the cash flows; no IRR exists
    #[default]
    NoSolution,
}

fn default_periods_per_year() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrParams {
    /// Cash flows at the end of each period; `cash_flows[0]` is at time zero.
    /// Negative = outflow, positive = inflow.
    pub cash_flows: Vec<f64>,
    /// 12 for monthly flows; used only to annualize the periodic rate
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    #[serde(default)]
    pub guess: Option<f64>,
}

impl IrrParams {
    pub fn new(cash_flows: Vec<f64>) -> Self {
        Self {
            cash_flows,
            periods_per_year: 1,
            guess: None,
        }
    }

    pub fn monthly(cash_flows: Vec<f64>) -> Self {
        Self {
            cash_flows,
            periods_per_year: 12,
            guess: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    /// Rate per cash-flow period
    pub periodic_rate: f64,
    /// Effective annual rate `(1 + periodic)^periods_per_year - 1`
    pub annual_rate: f64,
    pub iterations: u32,
    pub method: SolveMethod,
}

impl IrrResult {
    pub fn converged(&self) -> bool {
        matches!(
            self.method,
            SolveMethod::Newton | SolveMethod::Bisection | SolveMethod::ClosedForm
        )
    }

    fn from_periodic(rate: f64, periods_per_year: u32, iterations: u32, method: SolveMethod) -> Self {
        Self {
            periodic_rate: rate,
            annual_rate: (1.0 + rate).powi(periods_per_year.max(1) as i32) - 1.0,
            iterations,
            method,
        }
    }
}

/// Net present value of `cash_flows` at a periodic `rate`, first flow undiscounted
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut derivative = 0.0;

    for (t, &cf) in cash_flows.iter().enumerate() {
        value += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            derivative -= t as f64 * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (value, derivative)
}

/// Sum of absolute flows; residuals are measured relative to it so the
/// tolerance bounds the rate, not a currency amount
fn flow_scale(amounts: impl Iterator<Item = f64>) -> f64 {
    let scale: f64 = amounts.map(f64::abs).sum();
    if scale > 0.0 { scale } else { 1.0 }
}

fn has_sign_change(amounts: impl Iterator<Item = f64> + Clone) -> bool {
    let has_positive = amounts.clone().any(|cf| cf > 1e-10);
    let has_negative = amounts.clone().any(|cf| cf < -1e-10);
    has_positive && has_negative
}

/// Solve for the rate at which the NPV of the cash flows is zero
pub fn irr(params: &IrrParams) -> IrrResult {
    irr_with_config(params, &SolverConfig::default())
}

pub fn irr_with_config(params: &IrrParams, config: &SolverConfig) -> IrrResult {
    let flows = &params.cash_flows;
    if !has_sign_change(flows.iter().copied()) {
        debug!("IRR undefined: cash flows have no sign change");
        return IrrResult::default();
    }

    let guess = params.guess.unwrap_or(DEFAULT_GUESS);
    let scale = flow_scale(flows.iter().copied());
    let (rate, iterations, method) = solve_rate(
        |r| {
            let (value, derivative) = npv_and_derivative(flows, r);
            (value / scale, derivative / scale)
        },
        |r| npv(r, flows) / scale,
        guess,
        config,
    )
    .unwrap_or_else(|| {
        let timed = flows.iter().enumerate().map(|(t, &cf)| (t as f64, cf));
        (approximate_rate(timed), 0, SolveMethod::Approximation)
    });

    IrrResult::from_periodic(rate, params.periods_per_year, iterations, method)
}

/// Newton first, bisection over the rate bounds second
fn solve_rate<F, G>(f_and_df: F, f: G, guess: f64, config: &SolverConfig) -> Option<(f64, u32, SolveMethod)>
where
    F: Fn(f64) -> (f64, f64),
    G: Fn(f64) -> f64,
{
    match newton_raphson_bounded(&f_and_df, guess, (RATE_FLOOR, RATE_CEILING), config) {
        Ok(SolverOutcome { root, iterations, .. }) => return Some((root, iterations, SolveMethod::Newton)),
        Err(e) => debug!("Newton-Raphson failed ({}), trying bisection", e),
    }

    match bisection(&f, RATE_FLOOR, RATE_CEILING, config) {
        Ok(SolverOutcome { root, iterations, .. }) => Some((root, iterations, SolveMethod::Bisection)),
        Err(e) => {
            warn!("IRR did not converge ({}); falling back to approximation", e);
            None
        }
    }
}

/// Rough rate from the ratio of total inflows to total outflows, compounded
/// over the gap between their amount-weighted mean times.
///
/// `timed` yields `(time, amount)` pairs, time in rate periods.
fn approximate_rate(timed: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (mut inflow, mut outflow, mut t_in, mut t_out) = (0.0, 0.0, 0.0, 0.0);
    for (t, cf) in timed {
        if cf > 0.0 {
            inflow += cf;
            t_in += t * cf;
        } else {
            outflow -= cf;
            t_out -= t * cf;
        }
    }
    if inflow <= 0.0 || outflow <= 0.0 {
        return 0.0;
    }

    let span = t_in / inflow - t_out / outflow;
    if span.abs() < 1e-12 {
        return 0.0;
    }
    ((inflow / outflow).powf(1.0 / span) - 1.0).clamp(RATE_FLOOR, RATE_CEILING)
}

/// A cash flow on a specific date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedCashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl DatedCashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// IRR for irregularly dated cash flows (actual/365 from the earliest date).
///
/// The returned `periodic_rate` and `annual_rate` are both the annual rate.
pub fn xirr(cash_flows: &[DatedCashFlow], config: &SolverConfig) -> IrrResult {
    if !has_sign_change(cash_flows.iter().map(|cf| cf.amount)) {
        debug!("XIRR undefined: cash flows have no sign change");
        return IrrResult::default();
    }

    let Some(origin) = cash_flows.iter().map(|cf| cf.date).min() else {
        return IrrResult::default();
    };
    let timed: Vec<(f64, f64)> = cash_flows
        .iter()
        .map(|cf| ((cf.date - origin).num_days() as f64 / 365.0, cf.amount))
        .collect();

    let scale = flow_scale(timed.iter().map(|&(_, a)| a));

    let value = |r: f64| -> f64 {
        timed.iter().map(|&(t, a)| a / (1.0 + r).powf(t)).sum::<f64>() / scale
    };
    let value_and_derivative = |r: f64| -> (f64, f64) {
        let (v, d) = timed.iter().fold((0.0, 0.0), |(v, d), &(t, a)| {
            (v + a / (1.0 + r).powf(t), d - t * a / (1.0 + r).powf(t + 1.0))
        });
        (v / scale, d / scale)
    };

    let (rate, iterations, method) = solve_rate(value_and_derivative, value, DEFAULT_GUESS, config)
        .unwrap_or_else(|| (approximate_rate(timed.iter().copied()), 0, SolveMethod::Approximation));

    IrrResult {
        periodic_rate: rate,
        annual_rate: rate,
        iterations,
        method,
    }
}

/// Modified IRR: outflows financed at `finance_rate`, inflows reinvested at
/// `reinvest_rate`, all rates per period
pub fn mirr(cash_flows: &[f64], finance_rate: f64, reinvest_rate: f64) -> CalcResult<f64> {
    if cash_flows.len() < 2 {
        return Err(CalcError::invalid("cash_flows", "need at least two cash flows"));
    }
    let n = cash_flows.len() - 1;

    let pv_outflows: f64 = cash_flows
        .iter()
        .enumerate()
        .filter(|&(_, &cf)| cf < 0.0)
        .map(|(t, &cf)| cf / (1.0 + finance_rate).powi(t as i32))
        .sum();
    let fv_inflows: f64 = cash_flows
        .iter()
        .enumerate()
        .filter(|&(_, &cf)| cf > 0.0)
        .map(|(t, &cf)| cf * (1.0 + reinvest_rate).powi((n - t) as i32))
        .sum();

    if pv_outflows == 0.0 {
        return Err(CalcError::DivisionByZero { what: "present value of outflows" });
    }
    if fv_inflows <= 0.0 {
        return Err(CalcError::invalid("cash_flows", "need at least one inflow"));
    }

    Ok((fv_inflows / -pv_outflows).powf(1.0 / n as f64) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_flow_irr_matches_closed_form() {
        for years in [1_usize, 3, 10] {
            let mut flows = vec![-10_000.0];
            flows.extend(vec![0.0; years - 1]);
            flows.push(15_000.0);

            let result = irr(&IrrParams::new(flows));
            let expected = 1.5_f64.powf(1.0 / years as f64) - 1.0;
            assert!(result.converged());
            assert!(
                (result.periodic_rate - expected).abs() < 1e-6,
                "{} years: expected {}, got {}",
                years,
                expected,
                result.periodic_rate
            );
        }
    }

    #[test]
    fn test_monthly_irr_annualized() {
        // Invest 1000, receive 1100 after 12 months
        let mut flows = vec![-1_000.0];
        flows.extend(vec![0.0; 11]);
        flows.push(1_100.0);

        let result = irr(&IrrParams::monthly(flows));
        assert!((result.annual_rate - 0.10).abs() < 1e-5);
    }

    #[test]
    fn test_uneven_flows() {
        let result = irr(&IrrParams::new(vec![-100.0, 39.0, 59.0, 55.0, 20.0]));
        assert!((result.periodic_rate - 0.2809484).abs() < 1e-5);
        assert!(npv(result.periodic_rate, &[-100.0, 39.0, 59.0, 55.0, 20.0]).abs() < 1e-4);
    }

    #[test]
    fn test_no_sign_change() {
        let result = irr(&IrrParams::new(vec![100.0, 50.0]));
        assert_eq!(result.method, SolveMethod::NoSolution);
        assert_eq!(result.periodic_rate, 0.0);

        let result = irr(&IrrParams::new(vec![]));
        assert_eq!(result.method, SolveMethod::NoSolution);
    }

    #[test]
    fn test_loan_flows_irr_equals_loan_rate() {
        // Borrow 10000, repay 12 level payments at 1% per month
        let rate = 0.01_f64;
        let payment = 10_000.0 * rate / (1.0 - (1.0 + rate).powi(-12));
        let mut flows = vec![10_000.0];
        flows.extend(vec![-payment; 12]);

        let result = irr(&IrrParams::monthly(flows));
        assert_relative_eq!(result.periodic_rate, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_bad_guess_still_finds_a_root() {
        let mut params = IrrParams::new(vec![-1_000.0, 300.0, 400.0, 500.0]);
        params.guess = Some(9.0);
        let result = irr(&params);

        assert_ne!(result.method, SolveMethod::NoSolution);
        assert!(npv(result.periodic_rate, &params.cash_flows).abs() < 1e-2);
    }

    #[test]
    fn test_approximate_rate() {
        fn timed(flows: &[f64]) -> impl Iterator<Item = (f64, f64)> + '_ {
            flows.iter().enumerate().map(|(t, &cf)| (t as f64, cf))
        }
        assert!((approximate_rate(timed(&[-100.0, 0.0, 121.0])) - 0.1).abs() < 1e-12);
        assert_eq!(approximate_rate(timed(&[100.0, 50.0])), 0.0);
    }

    #[test]
    fn test_small_flows_match_closed_form() {
        // Accuracy must not depend on the currency magnitude of the flows
        for scale in [1e-6, 1e-4, 1e-3, 1.0, 1e6] {
            let result = irr(&IrrParams::new(vec![-scale, 1.5 * scale]));
            assert_eq!(result.method, SolveMethod::Newton);
            assert!(
                (result.periodic_rate - 0.5).abs() < 1e-8,
                "scale {}: got {}",
                scale,
                result.periodic_rate
            );

            let result = irr(&IrrParams::new(vec![-scale, 0.0, 0.0, 2.0 * scale]));
            let expected = 2.0_f64.powf(1.0 / 3.0) - 1.0;
            assert!((result.periodic_rate - expected).abs() < 1e-8);
        }
    }

    #[test]
    fn test_falls_back_to_bisection() {
        // A guess on the -100% pole makes NPV infinite, so Newton cannot start
        let mut params = IrrParams::new(vec![-100.0, 110.0]);
        params.guess = Some(-1.0);
        let result = irr(&params);

        assert_eq!(result.method, SolveMethod::Bisection);
        assert!(result.converged());
        assert!((result.periodic_rate - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_falls_back_to_approximation() {
        // Root at 9900% lies beyond the rate ceiling for both solvers
        let result = irr(&IrrParams::new(vec![-1.0, 100.0]));

        assert_eq!(result.method, SolveMethod::Approximation);
        assert!(!result.converged());
        assert_eq!(result.periodic_rate, RATE_CEILING);
    }

    #[test]
    fn test_xirr_falls_back_to_approximation() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let flows = [
            DatedCashFlow::new(d(2023, 1, 1), -1.0),
            DatedCashFlow::new(d(2024, 1, 1), 100.0),
        ];

        let result = xirr(&flows, &SolverConfig::default());
        assert_eq!(result.method, SolveMethod::Approximation);
        assert_eq!(result.annual_rate, RATE_CEILING);
    }

    #[test]
    fn test_xirr_small_flows() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let flows = [
            DatedCashFlow::new(d(2023, 1, 1), -1e-4),
            DatedCashFlow::new(d(2024, 1, 1), 1.5e-4),
        ];

        let result = xirr(&flows, &SolverConfig::default());
        assert_eq!(result.method, SolveMethod::Newton);
        assert!((result.annual_rate - 0.5).abs() < 1e-8);
    }

    #[test]
    fn test_npv() {
        assert_relative_eq!(npv(0.1, &[-100.0, 110.0]), 0.0, epsilon = 1e-12);
        assert_relative_eq!(npv(0.0, &[-100.0, 40.0, 70.0]), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_xirr() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let flows = [
            DatedCashFlow::new(d(2008, 1, 1), -10_000.0),
            DatedCashFlow::new(d(2008, 3, 1), 2_750.0),
            DatedCashFlow::new(d(2008, 10, 30), 4_250.0),
            DatedCashFlow::new(d(2009, 2, 15), 3_250.0),
            DatedCashFlow::new(d(2009, 4, 1), 2_750.0),
        ];

        let result = xirr(&flows, &SolverConfig::default());
        assert!((result.annual_rate - 0.373362535).abs() < 1e-5);
    }

    #[test]
    fn test_mirr() {
        let flows = [-120_000.0, 39_000.0, 30_000.0, 21_000.0, 37_000.0, 46_000.0];
        let rate = mirr(&flows, 0.10, 0.12).unwrap();
        assert!((rate - 0.1260941).abs() < 1e-6);

        assert!(mirr(&[100.0, 200.0], 0.1, 0.1).is_err());
        assert!(mirr(&[100.0], 0.1, 0.1).is_err());
    }
}
