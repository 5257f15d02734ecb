//! Fixed-rate loan amortization

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::schedule::{summarize_by_year, AmortizationRow, YearSummary};
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::frequency::{periodic_rate, Compounding, Frequency};

/// Balances below this are treated as paid off
pub const BALANCE_EPSILON: f64 = 1e-8;

/// Longest loan term accepted
pub const MAX_TERM_YEARS: f64 = 100.0;

/// Input parameters for a fixed-rate loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParams {
    pub principal: f64,

    /// Nominal annual rate as a decimal (0.045 for 4.5%)
    pub annual_rate: f64,

    /// Term in years; may be fractional (e.g. 2.5 years of monthly payments)
    pub term_years: f64,

    #[serde(default)]
    pub frequency: Frequency,

    /// Compounding convention; defaults to the payment frequency
    #[serde(default)]
    pub compounding: Option<Compounding>,

    /// Additional principal paid every period
    #[serde(default)]
    pub extra_payment: f64,

    /// Loan origination date; payment `k` falls `k` periods after it
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl LoanParams {
    /// Monthly-payment loan with no extras
    pub fn new(principal: f64, annual_rate: f64, term_years: f64) -> Self {
        Self {
            principal,
            annual_rate,
            term_years,
            frequency: Frequency::Monthly,
            compounding: None,
            extra_payment: 0.0,
            start_date: None,
        }
    }

    pub fn with_extra_payment(mut self, extra: f64) -> Self {
        self.extra_payment = extra;
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Check parameter ranges before calculating
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual_rate", self.annual_rate)?;
        ensure_positive("term_years", self.term_years)?;
        if self.term_years > MAX_TERM_YEARS {
            return Err(CalcError::invalid(
                "term_years",
                format!("term exceeds {} years", MAX_TERM_YEARS),
            ));
        }
        ensure_non_negative("extra_payment", self.extra_payment)?;
        ensure_finite("extra_payment", self.extra_payment)?;
        if self.scheduled_payments() == 0 {
            return Err(CalcError::invalid(
                "term_years",
                "term is shorter than one payment period",
            ));
        }
        Ok(())
    }

    /// Interest rate per payment period
    pub fn periodic_rate(&self) -> f64 {
        let compounding = self.compounding.unwrap_or_else(|| self.frequency.into());
        periodic_rate(self.annual_rate, compounding, self.frequency)
    }

    /// Number of scheduled payments over the term
    pub fn scheduled_payments(&self) -> u32 {
        (self.term_years * self.frequency.periods_per_year() as f64).round() as u32
    }
}

/// Complete loan result with schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    /// Level scheduled payment (excluding extra principal)
    pub periodic_payment: f64,
    pub periodic_rate: f64,
    pub scheduled_payments: u32,
    /// Payments actually made; fewer than scheduled when extra principal is paid
    pub actual_payments: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    /// Interest avoided relative to the schedule without extra payments
    pub interest_saved: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub schedule: Vec<AmortizationRow>,
    pub yearly: Vec<YearSummary>,
}

impl LoanResult {
    /// Sum of all principal retired, scheduled plus extra
    pub fn total_principal(&self) -> f64 {
        self.schedule.iter().map(AmortizationRow::total_principal).sum()
    }

    /// Balance after the final payment
    pub fn ending_balance(&self) -> f64 {
        self.schedule.last().map(|r| r.ending_balance).unwrap_or(0.0)
    }
}

/// Level payment that amortizes `principal` over `n` periods at `rate` per period.
///
/// `P·r / (1 - (1+r)^-n)`, or `P / n` at a zero rate.
pub fn payment_amount(principal: f64, rate: f64, n: u32) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if rate.abs() < 1e-12 {
        return principal / n as f64;
    }
    principal * rate / (1.0 - (1.0 + rate).powf(-(n as f64)))
}

/// Largest principal a level `payment` can amortize over `n` periods
pub fn max_principal_for_payment(payment: f64, rate: f64, n: u32) -> f64 {
    if rate.abs() < 1e-12 {
        return payment * n as f64;
    }
    payment * (1.0 - (1.0 + rate).powf(-(n as f64))) / rate
}

/// Outstanding balance after `k` level payments, floored at zero
pub fn remaining_balance(principal: f64, rate: f64, payment: f64, k: u32) -> f64 {
    let balance = if rate.abs() < 1e-12 {
        principal - payment * k as f64
    } else {
        let growth = (1.0 + rate).powf(k as f64);
        principal * growth - payment * (growth - 1.0) / rate
    };
    balance.max(0.0)
}

/// Build the full amortization schedule for a loan.
///
/// Degenerate parameters produce a zeroed result with an empty schedule.
pub fn calculate_loan(params: &LoanParams) -> LoanResult {
    if let Err(e) = params.validate() {
        debug!("loan parameters rejected: {}", e);
        return LoanResult::default();
    }

    let rate = params.periodic_rate();
    let n = params.scheduled_payments();
    let payment = payment_amount(params.principal, rate, n);

    let mut schedule = Vec::with_capacity(n as usize);
    let mut balance = params.principal;
    let mut cumulative_interest = 0.0;
    let mut cumulative_principal = 0.0;
    let periods_per_year = params.frequency.periods_per_year();

    for period in 1..=n {
        let interest = balance * rate;

        // Final scheduled period absorbs rounding residue
        let principal = if period == n {
            balance
        } else {
            (payment - interest).min(balance)
        };
        let extra = params.extra_payment.min(balance - principal).max(0.0);

        let beginning_balance = balance;
        balance -= principal + extra;
        if balance < BALANCE_EPSILON {
            balance = 0.0;
        }

        cumulative_interest += interest;
        cumulative_principal += principal + extra;

        schedule.push(AmortizationRow {
            period,
            year: (period - 1) / periods_per_year + 1,
            payment_date: params
                .start_date
                .and_then(|d| params.frequency.advance(d, period)),
            beginning_balance,
            payment: interest + principal + extra,
            principal,
            interest,
            extra_principal: extra,
            ending_balance: balance,
            cumulative_interest,
            cumulative_principal,
        });

        if balance == 0.0 {
            break;
        }
    }

    if balance > 0.0 {
        warn!("loan schedule ended with residual balance {:.6}", balance);
    }

    let total_paid: f64 = schedule.iter().map(|r| r.payment).sum();
    let baseline_interest = payment * n as f64 - params.principal;
    let payoff_date = schedule.last().and_then(|r| r.payment_date);
    let yearly = summarize_by_year(&schedule);

    LoanResult {
        periodic_payment: payment,
        periodic_rate: rate,
        scheduled_payments: n,
        actual_payments: schedule.len() as u32,
        total_interest: cumulative_interest,
        total_paid,
        interest_saved: (baseline_interest - cumulative_interest).max(0.0),
        payoff_date,
        schedule,
        yearly,
    }
}
