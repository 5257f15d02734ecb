//! Credit card payoff under a fixed monthly payment

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::amortization::payment_amount;
use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// Iteration cap for payoff simulation (50 years)
pub const MAX_PAYOFF_MONTHS: u32 = 600;

/// Sentinel returned when the payment never retires the balance
pub const NEVER_PAID_OFF: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardParams {
    pub balance: f64,
    /// APR as a decimal, accrued monthly at `apr / 12`
    pub annual_rate: f64,
    pub monthly_payment: f64,
}

impl CreditCardParams {
    pub fn new(balance: f64, annual_rate: f64, monthly_payment: f64) -> Self {
        Self {
            balance,
            annual_rate,
            monthly_payment,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("balance", self.balance)?;
        ensure_non_negative("annual_rate", self.annual_rate)?;
        ensure_positive("monthly_payment", self.monthly_payment)?;
        Ok(())
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoffRow {
    pub month: u32,
    pub beginning_balance: f64,
    pub interest: f64,
    pub payment: f64,
    pub ending_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoffResult {
    /// Months until the balance is cleared, or [`NEVER_PAID_OFF`]
    pub months_to_payoff: i32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub schedule: Vec<PayoffRow>,
}

impl PayoffResult {
    pub fn pays_off(&self) -> bool {
        self.months_to_payoff > 0
    }

    fn never() -> Self {
        Self {
            months_to_payoff: NEVER_PAID_OFF,
            ..Default::default()
        }
    }
}

/// Simulate paying a card down month by month.
///
/// Returns [`NEVER_PAID_OFF`] when the payment does not exceed the first
/// month's interest, or when the balance survives [`MAX_PAYOFF_MONTHS`].
pub fn calculate_payoff(params: &CreditCardParams) -> PayoffResult {
    if let Err(e) = params.validate() {
        debug!("credit card parameters rejected: {}", e);
        return PayoffResult::default();
    }

    let monthly_rate = params.monthly_rate();
    let first_interest = params.balance * monthly_rate;
    if params.monthly_payment <= first_interest {
        warn!(
            "payment {:.2} does not cover monthly interest {:.2}; balance never pays off",
            params.monthly_payment, first_interest
        );
        return PayoffResult::never();
    }

    let mut balance = params.balance;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut schedule = Vec::new();

    for month in 1..=MAX_PAYOFF_MONTHS {
        let beginning_balance = balance;
        let interest = balance * monthly_rate;
        balance += interest;

        let payment = params.monthly_payment.min(balance);
        balance -= payment;

        total_interest += interest;
        total_paid += payment;

        let paid_off = balance <= 1e-8;
        schedule.push(PayoffRow {
            month,
            beginning_balance,
            interest,
            payment,
            ending_balance: if paid_off { 0.0 } else { balance },
        });

        if paid_off {
            return PayoffResult {
                months_to_payoff: month as i32,
                total_interest,
                total_paid,
                schedule,
            };
        }
    }

    warn!(
        "balance {:.2} remains after {} months; treating as never paid off",
        balance, MAX_PAYOFF_MONTHS
    );
    PayoffResult::never()
}

/// Fixed monthly payment needed to clear `balance` in `months`
pub fn payment_for_payoff(balance: f64, annual_rate: f64, months: u32) -> CalcResult<f64> {
    ensure_non_negative("balance", balance)?;
    ensure_non_negative("annual_rate", annual_rate)?;
    if months == 0 {
        return Err(CalcError::invalid("months", "must be at least one month"));
    }
    if months > MAX_PAYOFF_MONTHS {
        return Err(CalcError::invalid(
            "months",
            format!("payoff horizon exceeds {} months", MAX_PAYOFF_MONTHS),
        ));
    }
    Ok(payment_amount(balance, annual_rate / 12.0, months))
}
