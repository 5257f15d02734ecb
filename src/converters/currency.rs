//! Currency conversion over a supplied exchange-rate table.
//!
//! The table mirrors the JSON body returned by `GET /latest?from=<code>` on
//! the usual public rate services:
//!
//! ```json
//! { "amount": 1.0, "base": "USD", "date": "2024-03-01", "rates": { "EUR": 0.92 } }
//! ```
//!
//! Fetching is left to the caller.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, CalcError, CalcResult};

/// Exchange rates quoted as units of each currency per one unit of `base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub date: NaiveDate,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            base: base.into().to_ascii_uppercase(),
            date,
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, code: &str, rate: f64) -> Self {
        self.rates.insert(code.to_ascii_uppercase(), rate);
        self
    }

    pub fn from_json(json: &str) -> CalcResult<Self> {
        let table: RateTable = serde_json::from_str(json)?;
        table.normalized()
    }

    pub fn from_reader<R: Read>(reader: R) -> CalcResult<Self> {
        let table: RateTable = serde_json::from_reader(reader)?;
        table.normalized()
    }

    fn normalized(mut self) -> CalcResult<Self> {
        self.base = self.base.to_ascii_uppercase();
        let mut rates = HashMap::with_capacity(self.rates.len());
        for (code, rate) in self.rates {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(CalcError::invalid("rates", format!("{code} rate {rate} must be positive")));
            }
            rates.insert(code.to_ascii_uppercase(), rate);
        }
        self.rates = rates;
        debug!("loaded {} rates against {} for {}", self.rates.len(), self.base, self.date);
        Ok(self)
    }

    /// Units of `code` per one unit of the base currency
    pub fn rate(&self, code: &str) -> CalcResult<f64> {
        let code = code.trim().to_ascii_uppercase();
        if code == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(&code)
            .copied()
            .ok_or(CalcError::UnknownCurrency(code))
    }

    /// Units of `to` received for one unit of `from`
    pub fn cross_rate(&self, from: &str, to: &str) -> CalcResult<f64> {
        Ok(self.rate(to)? / self.rate(from)?)
    }

    /// Convert `amount` of `from` into `to`, crossing through the base currency
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> CalcResult<f64> {
        ensure_finite("amount", amount)?;
        Ok(amount * self.cross_rate(from, to)?)
    }

    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.push(&self.base);
        codes.sort_unstable();
        codes.dedup();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LATEST: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "date": "2024-03-01",
        "rates": { "EUR": 0.92, "GBP": 0.79, "JPY": 150.0 }
    }"#;

    #[test]
    fn test_parse_latest_response() {
        let table = RateTable::from_json(LATEST).unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(table.currencies(), vec!["EUR", "GBP", "JPY", "USD"]);
    }

    #[test]
    fn test_convert_from_base() {
        let table = RateTable::from_json(LATEST).unwrap();
        assert_relative_eq!(table.convert(100.0, "USD", "EUR").unwrap(), 92.0, epsilon = 1e-10);
        assert_relative_eq!(table.convert(92.0, "eur", "usd").unwrap(), 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_cross_conversion() {
        let table = RateTable::from_json(LATEST).unwrap();
        let jpy = table.convert(1.0, "EUR", "JPY").unwrap();
        assert_relative_eq!(jpy, 150.0 / 0.92, epsilon = 1e-10);

        let back = table.convert(jpy, "JPY", "EUR").unwrap();
        assert_relative_eq!(back, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_currency() {
        let table = RateTable::new("usd", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .with_rate("eur", 0.92);
        let err = table.convert(1.0, "USD", "CHF");
        assert!(matches!(err, Err(CalcError::UnknownCurrency(code)) if code == "CHF"));
    }

    #[test]
    fn test_rejects_non_positive_rates() {
        let json = r#"{ "base": "USD", "date": "2024-03-01", "rates": { "EUR": 0.0 } }"#;
        assert!(RateTable::from_json(json).is_err());
        assert!(matches!(RateTable::from_json("not json"), Err(CalcError::Json(_))));
    }
}
