//! Amortization schedule rows and yearly roll-ups

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single row of an amortization schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number (1-indexed)
    pub period: u32,
    /// Loan year the payment falls in (1-indexed)
    pub year: u32,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,

    pub beginning_balance: f64,
    /// Total cash paid this period (interest + scheduled principal + extra)
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub extra_principal: f64,
    pub ending_balance: f64,

    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

impl AmortizationRow {
    /// Principal retired this period, including any extra payment
    pub fn total_principal(&self) -> f64 {
        self.principal + self.extra_principal
    }
}

/// Totals for one loan year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub payments: f64,
    pub principal: f64,
    pub interest: f64,
    pub extra_principal: f64,
    pub ending_balance: f64,
}

/// Roll schedule rows up into per-year totals
pub fn summarize_by_year(rows: &[AmortizationRow]) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();

    for row in rows {
        if years.last().map(|y| y.year) != Some(row.year) {
            years.push(YearSummary {
                year: row.year,
                ..Default::default()
            });
        }
        if let Some(summary) = years.last_mut() {
            summary.payments += row.payment;
            summary.principal += row.principal;
            summary.interest += row.interest;
            summary.extra_principal += row.extra_principal;
            summary.ending_balance = row.ending_balance;
        }
    }

    years
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(period: u32, year: u32, interest: f64, principal: f64, balance: f64) -> AmortizationRow {
        AmortizationRow {
            period,
            year,
            payment: interest + principal,
            principal,
            interest,
            ending_balance: balance,
            ..Default::default()
        }
    }

    #[test]
    fn test_summarize_by_year() {
        let rows = vec![
            row(1, 1, 10.0, 90.0, 910.0),
            row(2, 1, 9.0, 91.0, 819.0),
            row(3, 2, 8.0, 92.0, 727.0),
        ];

        let years = summarize_by_year(&rows);
        assert_eq!(years.len(), 2);
        assert!((years[0].interest - 19.0).abs() < 1e-12);
        assert!((years[0].principal - 181.0).abs() < 1e-12);
        assert!((years[0].ending_balance - 819.0).abs() < 1e-12);
        assert!((years[1].payments - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize_by_year(&[]).is_empty());
    }
}
