//! Savings depletion: how long a balance lasts under monthly withdrawals

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::payment_amount;
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// Simulation cap (100 years)
pub const MAX_DEPLETION_MONTHS: u32 = 1200;

/// Sentinel for a balance that outlasts the simulation cap
pub const NEVER_DEPLETED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionParams {
    pub starting_balance: f64,
    /// Nominal annual rate, compounded monthly
    pub annual_rate: f64,
    pub monthly_withdrawal: f64,
    /// Yearly increase applied to the withdrawal (inflation adjustment)
    #[serde(default)]
    pub annual_withdrawal_increase: f64,
}

impl DepletionParams {
    pub fn new(starting_balance: f64, annual_rate: f64, monthly_withdrawal: f64) -> Self {
        Self {
            starting_balance,
            annual_rate,
            monthly_withdrawal,
            annual_withdrawal_increase: 0.0,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("starting_balance", self.starting_balance)?;
        ensure_finite("annual_rate", self.annual_rate)?;
        ensure_positive("monthly_withdrawal", self.monthly_withdrawal)?;
        ensure_finite("annual_withdrawal_increase", self.annual_withdrawal_increase)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepletionRow {
    pub month: u32,
    pub beginning_balance: f64,
    pub interest: f64,
    pub withdrawal: f64,
    pub ending_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepletionResult {
    /// Month in which the balance reaches zero, or [`NEVER_DEPLETED`]
    pub months_until_depleted: i32,
    /// `months_until_depleted / 12`, `None` when the balance outlasts the cap
    pub years_until_depleted: Option<f64>,
    pub total_withdrawn: f64,
    pub total_interest: f64,
    pub ending_balance: f64,
    pub schedule: Vec<DepletionRow>,
}

impl DepletionResult {
    pub fn depletes(&self) -> bool {
        self.months_until_depleted > 0
    }
}

/// Simulate monthly interest then withdrawal until the balance runs out.
///
/// The final withdrawal is clamped to whatever balance remains.
pub fn calculate_depletion(params: &DepletionParams) -> DepletionResult {
    if let Err(e) = params.validate() {
        debug!("depletion parameters rejected: {}", e);
        return DepletionResult::default();
    }

    let monthly_rate = params.annual_rate / 12.0;
    let mut balance = params.starting_balance;
    let mut total_withdrawn = 0.0;
    let mut total_interest = 0.0;
    let mut months_until_depleted = NEVER_DEPLETED;
    let mut schedule = Vec::new();

    for month in 1..=MAX_DEPLETION_MONTHS {
        let beginning_balance = balance;
        let interest = balance * monthly_rate;
        balance += interest;

        let year_index = (month - 1) / 12;
        let requested = params.monthly_withdrawal
            * (1.0 + params.annual_withdrawal_increase).powi(year_index as i32);
        let withdrawal = requested.min(balance).max(0.0);
        balance -= withdrawal;

        total_interest += interest;
        total_withdrawn += withdrawal;

        schedule.push(DepletionRow {
            month,
            beginning_balance,
            interest,
            withdrawal,
            ending_balance: balance,
        });

        if balance <= 1e-8 {
            balance = 0.0;
            months_until_depleted = month as i32;
            break;
        }
    }

    if months_until_depleted == NEVER_DEPLETED {
        debug!(
            "balance not depleted within {} months (ending balance {:.2})",
            MAX_DEPLETION_MONTHS, balance
        );
    }

    DepletionResult {
        months_until_depleted,
        years_until_depleted: (months_until_depleted > 0)
            .then(|| months_until_depleted as f64 / 12.0),
        total_withdrawn,
        total_interest,
        ending_balance: balance,
        schedule,
    }
}

/// Level monthly withdrawal that exhausts `balance` exactly after `years`
pub fn sustainable_withdrawal(balance: f64, annual_rate: f64, years: f64) -> CalcResult<f64> {
    ensure_non_negative("balance", balance)?;
    ensure_finite("annual_rate", annual_rate)?;
    ensure_positive("years", years)?;
    if years * 12.0 > MAX_DEPLETION_MONTHS as f64 {
        return Err(CalcError::invalid(
            "years",
            format!("horizon exceeds {} months", MAX_DEPLETION_MONTHS),
        ));
    }
    let months = (years * 12.0).round() as u32;
    Ok(payment_amount(balance, annual_rate / 12.0, months.max(1)))
}
