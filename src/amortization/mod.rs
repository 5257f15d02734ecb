//! Loan and mortgage amortization

mod schedule;
mod loan;
mod mortgage;

pub use schedule::{AmortizationRow, YearSummary, summarize_by_year};
pub use loan::{
    LoanParams, LoanResult, calculate_loan, payment_amount, max_principal_for_payment,
    remaining_balance, BALANCE_EPSILON, MAX_TERM_YEARS,
};
pub use mortgage::{MortgageParams, MortgageResult, calculate_mortgage, PMI_CANCEL_LTV, PMI_FREE_EQUITY};
