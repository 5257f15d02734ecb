//! Mortgage payment breakdown: principal and interest plus escrow, PMI and HOA

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::loan::{calculate_loan, LoanParams, LoanResult};
use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::frequency::Frequency;

/// Down payment share at or above which no PMI is charged
pub const PMI_FREE_EQUITY: f64 = 0.20;

/// PMI is cancelled once the balance falls to this share of the purchase price
pub const PMI_CANCEL_LTV: f64 = 0.78;

fn default_term() -> f64 {
    30.0
}

/// Input parameters for a monthly-payment mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageParams {
    pub home_price: f64,
    pub down_payment: f64,
    pub annual_rate: f64,
    #[serde(default = "default_term")]
    pub term_years: f64,

    /// Annual property tax as a fraction of the home price
    #[serde(default)]
    pub property_tax_rate: f64,
    #[serde(default)]
    pub annual_insurance: f64,
    /// Annual PMI premium as a fraction of the original loan amount
    #[serde(default)]
    pub pmi_rate: f64,
    #[serde(default)]
    pub monthly_hoa: f64,
    #[serde(default)]
    pub extra_payment: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl MortgageParams {
    pub fn new(home_price: f64, down_payment: f64, annual_rate: f64, term_years: f64) -> Self {
        Self {
            home_price,
            down_payment,
            annual_rate,
            term_years,
            property_tax_rate: 0.0,
            annual_insurance: 0.0,
            pmi_rate: 0.0,
            monthly_hoa: 0.0,
            extra_payment: 0.0,
            start_date: None,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("home_price", self.home_price)?;
        ensure_non_negative("down_payment", self.down_payment)?;
        if self.down_payment >= self.home_price {
            return Err(CalcError::invalid(
                "down_payment",
                "must be less than the home price",
            ));
        }
        ensure_non_negative("property_tax_rate", self.property_tax_rate)?;
        ensure_non_negative("annual_insurance", self.annual_insurance)?;
        ensure_non_negative("pmi_rate", self.pmi_rate)?;
        ensure_non_negative("monthly_hoa", self.monthly_hoa)?;
        self.loan_params().validate()
    }

    pub fn loan_amount(&self) -> f64 {
        self.home_price - self.down_payment
    }

    fn loan_params(&self) -> LoanParams {
        LoanParams {
            principal: self.loan_amount(),
            annual_rate: self.annual_rate,
            term_years: self.term_years,
            frequency: Frequency::Monthly,
            compounding: None,
            extra_payment: self.extra_payment,
            start_date: self.start_date,
        }
    }

    fn requires_pmi(&self) -> bool {
        self.pmi_rate > 0.0 && self.down_payment < PMI_FREE_EQUITY * self.home_price
    }
}

/// Monthly mortgage costs and lifetime totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub loan_amount: f64,
    pub principal_and_interest: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    /// PMI charged in the first month (zero when not required)
    pub monthly_pmi: f64,
    pub monthly_hoa: f64,
    /// First-month total housing payment
    pub total_monthly_payment: f64,

    pub pmi_months: u32,
    pub total_pmi: f64,
    pub total_interest: f64,
    /// Every dollar paid over the life of the loan, down payment included
    pub total_cost: f64,

    pub loan: LoanResult,
}

/// Calculate the monthly payment breakdown and lifetime cost of a mortgage
pub fn calculate_mortgage(params: &MortgageParams) -> MortgageResult {
    if let Err(e) = params.validate() {
        debug!("mortgage parameters rejected: {}", e);
        return MortgageResult::default();
    }

    let loan = calculate_loan(&params.loan_params());
    let months = loan.actual_payments as f64;

    let monthly_tax = params.home_price * params.property_tax_rate / 12.0;
    let monthly_insurance = params.annual_insurance / 12.0;

    let (monthly_pmi, pmi_months) = if params.requires_pmi() {
        let cancel_balance = PMI_CANCEL_LTV * params.home_price;
        let months_charged = loan
            .schedule
            .iter()
            .take_while(|row| row.beginning_balance > cancel_balance)
            .count() as u32;
        (params.loan_amount() * params.pmi_rate / 12.0, months_charged)
    } else {
        (0.0, 0)
    };
    let total_pmi = monthly_pmi * pmi_months as f64;

    let total_cost = params.down_payment
        + loan.total_paid
        + (monthly_tax + monthly_insurance + params.monthly_hoa) * months
        + total_pmi;

    MortgageResult {
        loan_amount: params.loan_amount(),
        principal_and_interest: loan.periodic_payment,
        monthly_tax,
        monthly_insurance,
        monthly_pmi,
        monthly_hoa: params.monthly_hoa,
        total_monthly_payment: loan.periodic_payment
            + monthly_tax
            + monthly_insurance
            + monthly_pmi
            + params.monthly_hoa,
        pmi_months,
        total_pmi,
        total_interest: loan.total_interest,
        total_cost,
        loan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_mortgage() {
        let mut params = MortgageParams::new(250_000.0, 50_000.0, 0.045, 30.0);
        params.property_tax_rate = 0.012;
        params.annual_insurance = 1_200.0;
        params.monthly_hoa = 50.0;

        let result = calculate_mortgage(&params);

        assert_eq!(result.loan_amount, 200_000.0);
        assert!((result.principal_and_interest - 1013.37).abs() < 0.01);
        assert!((result.monthly_tax - 250.0).abs() < 1e-9);
        assert!((result.monthly_insurance - 100.0).abs() < 1e-9);
        assert_eq!(result.monthly_pmi, 0.0);
        assert!((result.total_monthly_payment - (result.principal_and_interest + 400.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pmi_until_78_percent() {
        let mut params = MortgageParams::new(300_000.0, 15_000.0, 0.06, 30.0);
        params.pmi_rate = 0.005;

        let result = calculate_mortgage(&params);

        assert!((result.monthly_pmi - 285_000.0 * 0.005 / 12.0).abs() < 1e-9);
        assert!(result.pmi_months > 0 && result.pmi_months < 360);

        // First month after cancellation is at or below the threshold
        let next = &result.loan.schedule[result.pmi_months as usize];
        assert!(next.beginning_balance <= PMI_CANCEL_LTV * 300_000.0);
        assert!((result.total_pmi - result.monthly_pmi * result.pmi_months as f64).abs() < 1e-9);
    }

    #[test]
    fn test_no_pmi_with_twenty_percent_down() {
        let mut params = MortgageParams::new(300_000.0, 60_000.0, 0.06, 30.0);
        params.pmi_rate = 0.005;

        let result = calculate_mortgage(&params);
        assert_eq!(result.pmi_months, 0);
        assert_eq!(result.total_pmi, 0.0);
    }

    #[test]
    fn test_total_cost_includes_down_payment() {
        let params = MortgageParams::new(100_000.0, 20_000.0, 0.05, 15.0);
        let result = calculate_mortgage(&params);

        let expected = 20_000.0 + result.loan.total_paid;
        assert!((result.total_cost - expected).abs() < 1e-6);
    }

    #[test]
    fn test_down_payment_exceeding_price() {
        let params = MortgageParams::new(100_000.0, 120_000.0, 0.05, 30.0);
        assert!(params.validate().is_err());
        assert_eq!(calculate_mortgage(&params), MortgageResult::default());
    }
}
