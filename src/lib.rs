//! Financial calculator engine
//!
//! This library provides:
//! - Loan and mortgage amortization schedules (extra payments, PMI, escrow)
//! - Compound growth with scheduled deposits and withdrawals
//! - Savings depletion and credit card payoff simulations
//! - IRR / XIRR / MIRR and target-rate solvers (Newton-Raphson with fallbacks)
//! - Closed-form converters: CAGR, APY, margin/markup, units, currency
//! - CSV loading of loan portfolios and CSV export of schedules

pub mod error;
pub mod frequency;
pub mod amortization;
pub mod growth;
pub mod solvers;
pub mod converters;
pub mod export;
pub mod batch;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use frequency::{Compounding, Frequency};
pub use amortization::{calculate_loan, calculate_mortgage, LoanParams, LoanResult, MortgageParams, MortgageResult};
pub use growth::{
    calculate_compound_interest, calculate_depletion, calculate_payoff, CompoundInterestParams,
    CompoundInterestResult, CreditCardParams, DepletionParams, DepletionResult, PayoffResult,
};
pub use solvers::{irr, required_rate, IrrParams, IrrResult, SolverConfig};
