//! Period-by-period balance simulations: compounding with deposits and
//! withdrawals, savings depletion and credit card payoff

mod state;
mod compound;
mod depletion;
mod credit_card;

pub use state::{GrowthState, events_in_step};
pub use compound::{
    CompoundInterestParams, CompoundInterestResult, ContributionTiming, DepositPlan, GrowthRow,
    GrowthYear, WithdrawalKind, WithdrawalPlan, calculate_compound_interest,
    summarize_growth_by_year, MAX_PROJECTION_YEARS,
};
pub use depletion::{
    DepletionParams, DepletionResult, DepletionRow, calculate_depletion, sustainable_withdrawal,
    MAX_DEPLETION_MONTHS, NEVER_DEPLETED,
};
pub use credit_card::{
    CreditCardParams, PayoffResult, PayoffRow, calculate_payoff, payment_for_payoff,
    MAX_PAYOFF_MONTHS, NEVER_PAID_OFF,
};
