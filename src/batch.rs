//! Load loan portfolios from CSV and summarize each loan

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, Trim};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::amortization::{calculate_loan, LoanParams};
use crate::error::{CalcError, CalcResult};
use crate::frequency::Frequency;

/// Raw CSV row. Only `loan_id`, `principal`, `annual_rate` and `term_years`
/// are required.
#[derive(Debug, Deserialize)]
struct CsvRow {
    loan_id: String,
    principal: f64,
    annual_rate: f64,
    term_years: f64,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default)]
    extra_payment: Option<f64>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
}

impl CsvRow {
    fn into_loan(self) -> CalcResult<LoanRecord> {
        let frequency = match self.frequency.as_deref().map(str::trim) {
            None | Some("") => Frequency::Monthly,
            Some(other) => other.parse()?,
        };

        let params = LoanParams {
            principal: self.principal,
            annual_rate: self.annual_rate,
            term_years: self.term_years,
            frequency,
            compounding: None,
            extra_payment: self.extra_payment.unwrap_or(0.0),
            start_date: self.start_date,
        };
        params.validate().map_err(|e| {
            CalcError::invalid("loan", format!("loan {}: {}", self.loan_id, e))
        })?;

        Ok(LoanRecord {
            loan_id: self.loan_id,
            params,
        })
    }
}

/// One loan of a portfolio
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    pub loan_id: String,
    pub params: LoanParams,
}

/// Per-loan summary row, suitable for CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: String,
    pub principal: f64,
    pub periodic_payment: f64,
    pub scheduled_payments: u32,
    pub actual_payments: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub interest_saved: f64,
    pub payoff_date: Option<NaiveDate>,
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> CalcResult<Vec<LoanRecord>> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let loans = read_loans(reader)?;
    info!("loaded {} loans from {}", loans.len(), path.display());
    Ok(loans)
}

/// Load loans from any reader (e.g., string buffer, network stream)
pub fn load_loans_from_reader<R: Read>(reader: R) -> CalcResult<Vec<LoanRecord>> {
    read_loans(ReaderBuilder::new().trim(Trim::All).from_reader(reader))
}

fn read_loans<R: Read>(mut reader: Reader<R>) -> CalcResult<Vec<LoanRecord>> {
    let mut loans = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.into_loan()?);
    }
    Ok(loans)
}

/// Amortize every loan and return one summary row per loan
pub fn summarize_loans(loans: &[LoanRecord]) -> Vec<LoanSummary> {
    loans
        .iter()
        .map(|loan| {
            let result = calculate_loan(&loan.params);
            debug!(
                "loan {}: payment {:.2}, {} payments",
                loan.loan_id, result.periodic_payment, result.actual_payments
            );
            LoanSummary {
                loan_id: loan.loan_id.clone(),
                principal: loan.params.principal,
                periodic_payment: result.periodic_payment,
                scheduled_payments: result.scheduled_payments,
                actual_payments: result.actual_payments,
                total_interest: result.total_interest,
                total_paid: result.total_paid,
                interest_saved: result.interest_saved,
                payoff_date: result.payoff_date,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTFOLIO: &str = "\
loan_id,principal,annual_rate,term_years,frequency,extra_payment,start_date
A-1,200000,0.045,30,,,
A-2,25000,0.06,5,monthly,100,2024-01-01
A-3,10000,0.05,2,biweekly,,
";

    #[test]
    fn test_load_loans_from_reader() {
        let loans = load_loans_from_reader(PORTFOLIO.as_bytes()).unwrap();
        assert_eq!(loans.len(), 3);

        assert_eq!(loans[0].loan_id, "A-1");
        assert_eq!(loans[0].params.frequency, Frequency::Monthly);
        assert_eq!(loans[0].params.extra_payment, 0.0);

        assert_eq!(loans[1].params.extra_payment, 100.0);
        assert_eq!(loans[1].params.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(loans[2].params.frequency, Frequency::BiWeekly);
    }

    #[test]
    fn test_summarize_loans() {
        let loans = load_loans_from_reader(PORTFOLIO.as_bytes()).unwrap();
        let summaries = summarize_loans(&loans);

        assert_eq!(summaries.len(), 3);
        assert!((summaries[0].periodic_payment - 1013.37).abs() < 0.01);
        assert_eq!(summaries[0].actual_payments, 360);

        // Extra principal shortens the loan
        assert!(summaries[1].actual_payments < summaries[1].scheduled_payments);
        assert!(summaries[1].interest_saved > 0.0);
        assert!(summaries[1].payoff_date.is_some());
        assert_eq!(summaries[2].scheduled_payments, 52);
    }

    #[test]
    fn test_invalid_rows_are_rejected() {
        let bad_frequency = "loan_id,principal,annual_rate,term_years,frequency\nX,1000,0.05,1,hourly\n";
        assert!(load_loans_from_reader(bad_frequency.as_bytes()).is_err());

        let bad_principal = "loan_id,principal,annual_rate,term_years\nX,0,0.05,1\n";
        assert!(matches!(
            load_loans_from_reader(bad_principal.as_bytes()),
            Err(CalcError::InvalidInput { .. })
        ));

        let not_a_number = "loan_id,principal,annual_rate,term_years\nX,abc,0.05,1\n";
        assert!(matches!(
            load_loans_from_reader(not_a_number.as_bytes()),
            Err(CalcError::Csv(_))
        ));
    }
}
