//! Compound interest simulation with scheduled deposits and withdrawals

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::state::{events_in_step, GrowthState};
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::frequency::{Compounding, Frequency};

/// Longest horizon a projection will simulate
pub const MAX_PROJECTION_YEARS: f64 = 500.0;

/// When in its period a deposit is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTiming {
    /// Deposited before interest accrues for the period
    Beginning,
    #[default]
    End,
}

/// Recurring deposits into the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositPlan {
    pub amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub timing: ContributionTiming,
    /// Yearly increase applied to the deposit amount (0.03 for 3%)
    #[serde(default)]
    pub annual_growth: f64,
}

/// How a withdrawal amount is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalKind {
    /// `amount` in currency, grown yearly by `annual_growth`
    #[default]
    FixedAmount,
    /// `amount` is an annual fraction of the balance, split evenly across events
    PercentOfBalance,
    /// `amount` is the fraction of interest earned since the previous withdrawal
    PercentOfInterest,
}

/// Recurring withdrawals out of the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    pub amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub kind: WithdrawalKind,
    #[serde(default)]
    pub annual_growth: f64,
}

/// Input parameters for a compound interest projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestParams {
    pub principal: f64,
    pub annual_rate: f64,
    /// Horizon in years; fractional horizons end with a partial compounding period
    pub years: f64,
    #[serde(default)]
    pub compounding: Compounding,
    #[serde(default)]
    pub deposit: Option<DepositPlan>,
    #[serde(default)]
    pub withdrawal: Option<WithdrawalPlan>,
}

impl CompoundInterestParams {
    pub fn new(principal: f64, annual_rate: f64, years: f64, compounding: Compounding) -> Self {
        Self {
            principal,
            annual_rate,
            years,
            compounding,
            deposit: None,
            withdrawal: None,
        }
    }

    pub fn with_deposit(mut self, plan: DepositPlan) -> Self {
        self.deposit = Some(plan);
        self
    }

    pub fn with_withdrawal(mut self, plan: WithdrawalPlan) -> Self {
        self.withdrawal = Some(plan);
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("principal", self.principal)?;
        ensure_finite("annual_rate", self.annual_rate)?;
        if self.annual_rate <= -1.0 {
            return Err(CalcError::invalid("annual_rate", "must be greater than -100%"));
        }
        ensure_positive("years", self.years)?;
        if self.years > MAX_PROJECTION_YEARS {
            return Err(CalcError::invalid(
                "years",
                format!("horizon exceeds {} years", MAX_PROJECTION_YEARS),
            ));
        }
        if let Some(deposit) = &self.deposit {
            ensure_non_negative("deposit.amount", deposit.amount)?;
            ensure_finite("deposit.annual_growth", deposit.annual_growth)?;
        }
        if let Some(withdrawal) = &self.withdrawal {
            ensure_non_negative("withdrawal.amount", withdrawal.amount)?;
            ensure_finite("withdrawal.annual_growth", withdrawal.annual_growth)?;
        }
        Ok(())
    }
}

/// One compounding step of the simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub step: u32,
    pub year: u32,
    /// Time at the end of the step, in years
    pub time_years: f64,
    pub beginning_balance: f64,
    pub deposits: f64,
    pub interest: f64,
    pub withdrawals: f64,
    pub ending_balance: f64,
    pub cumulative_interest: f64,
}

/// Totals for one simulation year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthYear {
    pub year: u32,
    pub deposits: f64,
    pub interest: f64,
    pub withdrawals: f64,
    pub ending_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub final_balance: f64,
    pub principal: f64,
    /// Sum of scheduled deposits, excluding the opening principal
    pub total_deposits: f64,
    /// Principal plus deposits
    pub total_contributions: f64,
    pub total_interest: f64,
    pub total_withdrawals: f64,
    pub steps: u32,
    pub breakdown: Vec<GrowthRow>,
    pub yearly: Vec<GrowthYear>,
}

/// Simulate the account balance step by step.
///
/// Each compounding period is one step; a fractional horizon adds a final
/// partial step whose interest uses `factor^fraction`. Continuous compounding
/// is stepped monthly. Deposits and withdrawals that fall inside a step are
/// applied in that step; withdrawals never exceed the available balance.
pub fn calculate_compound_interest(params: &CompoundInterestParams) -> CompoundInterestResult {
    if let Err(e) = params.validate() {
        debug!("compound interest parameters rejected: {}", e);
        return CompoundInterestResult::default();
    }

    let steps_per_year = params.compounding.steps_per_year() as f64;
    let factor = params.compounding.step_factor(params.annual_rate);

    let total_steps = params.years * steps_per_year;
    let whole_steps = (total_steps + 1e-9).floor() as u32;
    let fraction = total_steps - whole_steps as f64;
    let fraction = if fraction > 1e-9 { fraction } else { 0.0 };
    let Some(step_count) = whole_steps.checked_add(u32::from(fraction > 0.0)) else {
        warn!("step count overflows for a {} year horizon", params.years);
        return CompoundInterestResult::default();
    };

    let mut state = GrowthState::new(params.principal);
    let mut breakdown = Vec::with_capacity(step_count as usize);

    for step in 1..=step_count {
        let length = if step > whole_steps { fraction } else { 1.0 };
        state.advance(steps_per_year, length);
        let row = simulate_step(params, &mut state, factor, length);
        breakdown.push(row);
    }

    let yearly = summarize_growth_by_year(&breakdown);

    CompoundInterestResult {
        final_balance: state.balance,
        principal: params.principal,
        total_deposits: state.total_deposits,
        total_contributions: params.principal + state.total_deposits,
        total_interest: state.total_interest,
        total_withdrawals: state.total_withdrawals,
        steps: step_count,
        breakdown,
        yearly,
    }
}

/// Apply deposits, interest and withdrawals for one step
fn simulate_step(
    params: &CompoundInterestParams,
    state: &mut GrowthState,
    factor: f64,
    length: f64,
) -> GrowthRow {
    let year_index = state.year_index();
    let mut deposits = 0.0;

    let deposit_amount = |plan: &DepositPlan| {
        plan.amount * (1.0 + plan.annual_growth).powi(year_index as i32)
    };

    if let Some(plan) = params
        .deposit
        .as_ref()
        .filter(|p| p.timing == ContributionTiming::Beginning)
    {
        let count = events_in_step(state.t_start, state.t_end, plan.frequency.periods_per_year(), true);
        let amount = deposit_amount(plan) * count as f64;
        state.deposit(amount);
        deposits += amount;
    }

    let interest = state.balance * (factor.powf(length) - 1.0);
    state.credit_interest(interest);

    if let Some(plan) = params
        .deposit
        .as_ref()
        .filter(|p| p.timing == ContributionTiming::End)
    {
        let count = events_in_step(state.t_start, state.t_end, plan.frequency.periods_per_year(), false);
        let amount = deposit_amount(plan) * count as f64;
        state.deposit(amount);
        deposits += amount;
    }

    let mut withdrawals = 0.0;
    if let Some(plan) = &params.withdrawal {
        let per_year = plan.frequency.periods_per_year();
        let count = events_in_step(state.t_start, state.t_end, per_year, false);
        for _ in 0..count {
            let requested = match plan.kind {
                WithdrawalKind::FixedAmount => {
                    plan.amount * (1.0 + plan.annual_growth).powi(year_index as i32)
                }
                WithdrawalKind::PercentOfBalance => state.balance * plan.amount / per_year as f64,
                WithdrawalKind::PercentOfInterest => state.interest_since_withdrawal * plan.amount,
            };
            let taken = state.withdraw(requested);
            if taken < requested {
                trace!(
                    "step {}: withdrawal of {:.2} clamped to balance {:.2}",
                    state.step,
                    requested,
                    taken
                );
            }
            withdrawals += taken;
        }
    }

    GrowthRow {
        step: state.step,
        year: year_index + 1,
        time_years: state.t_end,
        beginning_balance: state.bop_balance,
        deposits,
        interest,
        withdrawals,
        ending_balance: state.balance,
        cumulative_interest: state.total_interest,
    }
}

/// Roll simulation steps up into per-year totals
pub fn summarize_growth_by_year(rows: &[GrowthRow]) -> Vec<GrowthYear> {
    let mut years: Vec<GrowthYear> = Vec::new();

    for row in rows {
        if years.last().map(|y| y.year) != Some(row.year) {
            years.push(GrowthYear {
                year: row.year,
                ..Default::default()
            });
        }
        if let Some(summary) = years.last_mut() {
            summary.deposits += row.deposits;
            summary.interest += row.interest;
            summary.withdrawals += row.withdrawals;
            summary.ending_balance = row.ending_balance;
        }
    }

    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn monthly_deposit(amount: f64, timing: ContributionTiming) -> DepositPlan {
        DepositPlan {
            amount,
            frequency: Frequency::Monthly,
            timing,
            annual_growth: 0.0,
        }
    }

    #[test]
    fn test_matches_closed_form_without_flows() {
        let params = CompoundInterestParams::new(10_000.0, 0.05, 10.0, Compounding::Monthly);
        let result = calculate_compound_interest(&params);

        let expected = 10_000.0 * (1.0 + 0.05 / 12.0_f64).powi(120);
        assert_relative_eq!(result.final_balance, expected, max_relative = 1e-12);
        assert_eq!(result.steps, 120);
        assert_relative_eq!(result.total_interest, expected - 10_000.0, max_relative = 1e-9);
        assert_eq!(result.yearly.len(), 10);
    }

    #[test]
    fn test_fractional_period() {
        let params = CompoundInterestParams::new(1_000.0, 0.05, 1.5, Compounding::Annually);
        let result = calculate_compound_interest(&params);

        assert_eq!(result.steps, 2);
        assert_relative_eq!(result.final_balance, 1_000.0 * 1.05_f64.powf(1.5), max_relative = 1e-12);
        assert!((result.breakdown[1].time_years - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_continuous_compounding() {
        let params = CompoundInterestParams::new(1_000.0, 0.05, 2.0, Compounding::Continuously);
        let result = calculate_compound_interest(&params);

        assert_relative_eq!(result.final_balance, 1_000.0 * 0.1_f64.exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_end_of_period_deposits_match_annuity() {
        let params = CompoundInterestParams::new(0.0, 0.06, 1.0, Compounding::Monthly)
            .with_deposit(monthly_deposit(100.0, ContributionTiming::End));
        let result = calculate_compound_interest(&params);

        let i = 0.005_f64;
        let expected = 100.0 * ((1.0 + i).powi(12) - 1.0) / i;
        assert_relative_eq!(result.final_balance, expected, max_relative = 1e-12);
        assert_relative_eq!(result.total_deposits, 1_200.0, max_relative = 1e-12);
    }

    #[test]
    fn test_beginning_of_period_deposits_earn_one_more_period() {
        let params = CompoundInterestParams::new(0.0, 0.06, 1.0, Compounding::Monthly)
            .with_deposit(monthly_deposit(100.0, ContributionTiming::Beginning));
        let result = calculate_compound_interest(&params);

        let i = 0.005_f64;
        let expected = 100.0 * ((1.0 + i).powi(12) - 1.0) / i * (1.0 + i);
        assert_relative_eq!(result.final_balance, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_deposit_growth() {
        let params = CompoundInterestParams::new(0.0, 0.0, 3.0, Compounding::Annually).with_deposit(
            DepositPlan {
                amount: 1_000.0,
                frequency: Frequency::Annually,
                timing: ContributionTiming::End,
                annual_growth: 0.10,
            },
        );
        let result = calculate_compound_interest(&params);

        assert_relative_eq!(result.final_balance, 3_310.0, max_relative = 1e-12);
    }

    #[test]
    fn test_percent_of_interest_withdrawal_preserves_principal() {
        let params = CompoundInterestParams::new(1_000.0, 0.05, 5.0, Compounding::Annually)
            .with_withdrawal(WithdrawalPlan {
                amount: 1.0,
                frequency: Frequency::Annually,
                kind: WithdrawalKind::PercentOfInterest,
                annual_growth: 0.0,
            });
        let result = calculate_compound_interest(&params);

        assert_relative_eq!(result.final_balance, 1_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.total_withdrawals, 250.0, max_relative = 1e-12);
    }

    #[test]
    fn test_percent_of_balance_never_overdraws() {
        // 2400% a year in monthly events asks for twice the balance each month
        let params = CompoundInterestParams::new(5_000.0, 0.07, 3.0, Compounding::Monthly)
            .with_deposit(monthly_deposit(50.0, ContributionTiming::End))
            .with_withdrawal(WithdrawalPlan {
                amount: 24.0,
                frequency: Frequency::Monthly,
                kind: WithdrawalKind::PercentOfBalance,
                annual_growth: 0.0,
            });
        let result = calculate_compound_interest(&params);

        assert!(result.breakdown.iter().all(|r| r.ending_balance >= 0.0));
        assert_eq!(result.final_balance, 0.0);
        let inflows = result.total_contributions + result.total_interest;
        assert_relative_eq!(result.total_withdrawals, inflows, max_relative = 1e-12);
    }

    #[test]
    fn test_fixed_withdrawal_clamped_to_balance() {
        let params = CompoundInterestParams::new(1_000.0, 0.0, 2.0, Compounding::Annually)
            .with_withdrawal(WithdrawalPlan {
                amount: 800.0,
                frequency: Frequency::Annually,
                kind: WithdrawalKind::FixedAmount,
                annual_growth: 0.0,
            });
        let result = calculate_compound_interest(&params);

        assert_eq!(result.breakdown[0].withdrawals, 800.0);
        assert_eq!(result.breakdown[1].withdrawals, 200.0);
        assert_eq!(result.final_balance, 0.0);
    }

    #[test]
    fn test_balance_identity() {
        let params = CompoundInterestParams::new(2_500.0, 0.045, 7.25, Compounding::Quarterly)
            .with_deposit(DepositPlan {
                amount: 200.0,
                frequency: Frequency::Monthly,
                timing: ContributionTiming::Beginning,
                annual_growth: 0.02,
            })
            .with_withdrawal(WithdrawalPlan {
                amount: 0.04,
                frequency: Frequency::Quarterly,
                kind: WithdrawalKind::PercentOfBalance,
                annual_growth: 0.0,
            });
        let result = calculate_compound_interest(&params);

        let identity = result.total_contributions + result.total_interest - result.total_withdrawals;
        assert_relative_eq!(result.final_balance, identity, max_relative = 1e-10);
        assert_eq!(result.steps, 29);
    }

    #[test]
    fn test_horizon_beyond_cap_is_rejected() {
        let params = CompoundInterestParams::new(1_000.0, 0.05, 2e7, Compounding::Daily);
        assert!(params.validate().is_err());
        assert_eq!(calculate_compound_interest(&params), CompoundInterestResult::default());

        let params = CompoundInterestParams::new(1_000.0, 0.05, MAX_PROJECTION_YEARS, Compounding::Annually);
        assert_eq!(calculate_compound_interest(&params).steps, 500);
    }

    #[test]
    fn test_degenerate_inputs() {
        let zero_years = CompoundInterestParams::new(1_000.0, 0.05, 0.0, Compounding::Monthly);
        assert_eq!(calculate_compound_interest(&zero_years), CompoundInterestResult::default());

        let negative = CompoundInterestParams::new(-1.0, 0.05, 1.0, Compounding::Monthly);
        assert!(negative.validate().is_err());
        assert_eq!(calculate_compound_interest(&negative).final_balance, 0.0);
    }
}
