//! Payment and compounding frequencies, and the rate conversions between them

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// How often a payment, deposit or withdrawal occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Annually,
    SemiAnnually,
    Quarterly,
    #[default]
    Monthly,
    SemiMonthly,
    BiWeekly,
    Weekly,
    Daily,
}

impl Frequency {
    pub const ALL: [Frequency; 8] = [
        Frequency::Annually,
        Frequency::SemiAnnually,
        Frequency::Quarterly,
        Frequency::Monthly,
        Frequency::SemiMonthly,
        Frequency::BiWeekly,
        Frequency::Weekly,
        Frequency::Daily,
    ];

    /// Number of periods in one year
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Annually => 1,
            Frequency::SemiAnnually => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::SemiMonthly => 24,
            Frequency::BiWeekly => 26,
            Frequency::Weekly => 52,
            Frequency::Daily => 365,
        }
    }

    /// Calendar months per period, for frequencies that divide the year into whole months
    pub fn months_per_period(self) -> Option<u32> {
        match self {
            Frequency::Annually => Some(12),
            Frequency::SemiAnnually => Some(6),
            Frequency::Quarterly => Some(3),
            Frequency::Monthly => Some(1),
            _ => None,
        }
    }

    /// Date of the `k`-th period after `start`.
    ///
    /// Month-based frequencies step by calendar months (clamping to month end),
    /// semi-monthly alternates between the same day and fifteen days later,
    /// and the rest step by a fixed number of days.
    pub fn advance(self, start: NaiveDate, k: u32) -> Option<NaiveDate> {
        if let Some(months) = self.months_per_period() {
            return start.checked_add_months(Months::new(months * k));
        }
        match self {
            Frequency::SemiMonthly => {
                let date = start.checked_add_months(Months::new(k / 2))?;
                if k % 2 == 1 {
                    date.checked_add_days(Days::new(15))
                } else {
                    Some(date)
                }
            }
            Frequency::BiWeekly => start.checked_add_days(Days::new(14 * k as u64)),
            Frequency::Weekly => start.checked_add_days(Days::new(7 * k as u64)),
            _ => start.checked_add_days(Days::new(k as u64)),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Frequency::Annually => "annually",
            Frequency::SemiAnnually => "semi_annually",
            Frequency::Quarterly => "quarterly",
            Frequency::Monthly => "monthly",
            Frequency::SemiMonthly => "semi_monthly",
            Frequency::BiWeekly => "bi_weekly",
            Frequency::Weekly => "weekly",
            Frequency::Daily => "daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            "semi_annually" | "semiannually" | "semi_annual" => Ok(Frequency::SemiAnnually),
            "quarterly" => Ok(Frequency::Quarterly),
            "monthly" => Ok(Frequency::Monthly),
            "semi_monthly" | "semimonthly" => Ok(Frequency::SemiMonthly),
            "bi_weekly" | "biweekly" | "fortnightly" => Ok(Frequency::BiWeekly),
            "weekly" => Ok(Frequency::Weekly),
            "daily" => Ok(Frequency::Daily),
            _ => Err(CalcError::invalid("frequency", format!("unknown frequency '{s}'"))),
        }
    }
}

/// How interest is compounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    Annually,
    SemiAnnually,
    Quarterly,
    #[default]
    Monthly,
    SemiMonthly,
    BiWeekly,
    Weekly,
    Daily,
    Continuously,
}

/// Simulation step count per year used for continuous compounding
pub const CONTINUOUS_STEPS_PER_YEAR: u32 = 12;

impl Compounding {
    /// Periodic frequency, or `None` for continuous compounding
    pub fn frequency(self) -> Option<Frequency> {
        match self {
            Compounding::Annually => Some(Frequency::Annually),
            Compounding::SemiAnnually => Some(Frequency::SemiAnnually),
            Compounding::Quarterly => Some(Frequency::Quarterly),
            Compounding::Monthly => Some(Frequency::Monthly),
            Compounding::SemiMonthly => Some(Frequency::SemiMonthly),
            Compounding::BiWeekly => Some(Frequency::BiWeekly),
            Compounding::Weekly => Some(Frequency::Weekly),
            Compounding::Daily => Some(Frequency::Daily),
            Compounding::Continuously => None,
        }
    }

    /// Simulation steps per year (continuous compounding is stepped monthly)
    pub fn steps_per_year(self) -> u32 {
        self.frequency()
            .map(Frequency::periods_per_year)
            .unwrap_or(CONTINUOUS_STEPS_PER_YEAR)
    }

    /// Balance multiplier for one simulation step
    pub fn step_factor(self, annual_rate: f64) -> f64 {
        let steps = self.steps_per_year() as f64;
        match self {
            Compounding::Continuously => (annual_rate / steps).exp(),
            _ => 1.0 + annual_rate / steps,
        }
    }
}

impl From<Frequency> for Compounding {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Annually => Compounding::Annually,
            Frequency::SemiAnnually => Compounding::SemiAnnually,
            Frequency::Quarterly => Compounding::Quarterly,
            Frequency::Monthly => Compounding::Monthly,
            Frequency::SemiMonthly => Compounding::SemiMonthly,
            Frequency::BiWeekly => Compounding::BiWeekly,
            Frequency::Weekly => Compounding::Weekly,
            Frequency::Daily => Compounding::Daily,
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frequency() {
            Some(freq) => freq.fmt(f),
            None => f.write_str("continuously"),
        }
    }
}

impl FromStr for Compounding {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuously" | "continuous" => Ok(Compounding::Continuously),
            _ => s
                .parse::<Frequency>()
                .map(Compounding::from)
                .map_err(|_| CalcError::invalid("compounding", format!("unknown compounding '{s}'"))),
        }
    }
}

/// Rate per payment period equivalent to a nominal annual rate.
///
/// `(1 + r/m)^(m/p) - 1` for periodic compounding, `e^(r/p) - 1` for continuous.
/// When compounding matches the payment frequency this is simply `r/p`.
pub fn periodic_rate(annual_rate: f64, compounding: Compounding, payment: Frequency) -> f64 {
    let p = payment.periods_per_year() as f64;
    match compounding.frequency() {
        Some(freq) if freq == payment => annual_rate / p,
        Some(freq) => {
            let m = freq.periods_per_year() as f64;
            (1.0 + annual_rate / m).powf(m / p) - 1.0
        }
        None => (annual_rate / p).exp() - 1.0,
    }
}

/// Effective annual rate produced by a nominal rate under the given compounding
pub fn effective_annual_rate(annual_rate: f64, compounding: Compounding) -> f64 {
    match compounding.frequency() {
        Some(freq) => {
            let m = freq.periods_per_year() as f64;
            (1.0 + annual_rate / m).powf(m) - 1.0
        }
        None => annual_rate.exp() - 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_periods_per_year() {
        assert_eq!(Frequency::Monthly.periods_per_year(), 12);
        assert_eq!(Frequency::BiWeekly.periods_per_year(), 26);
        assert_eq!(Compounding::Continuously.steps_per_year(), 12);
    }

    #[test]
    fn test_periodic_rate_matching_frequency() {
        let r = periodic_rate(0.06, Compounding::Monthly, Frequency::Monthly);
        assert_relative_eq!(r, 0.005, epsilon = 1e-15);
    }

    #[test]
    fn test_periodic_rate_cross_frequency() {
        // Annual compounding, monthly payments: 12 periods must reproduce the annual rate
        let r = periodic_rate(0.06, Compounding::Annually, Frequency::Monthly);
        assert_relative_eq!((1.0 + r).powi(12), 1.06, epsilon = 1e-12);

        let r = periodic_rate(0.05, Compounding::Continuously, Frequency::Quarterly);
        assert_relative_eq!((1.0 + r).powi(4), 0.05_f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_effective_annual_rate() {
        let ear = effective_annual_rate(0.12, Compounding::Monthly);
        assert!((ear - 0.126825).abs() < 1e-6);
        let ear = effective_annual_rate(0.10, Compounding::Continuously);
        assert!((ear - 0.105171).abs() < 1e-6);
    }

    #[test]
    fn test_advance_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            Frequency::Monthly.advance(start, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            Frequency::Quarterly.advance(start, 2),
            NaiveDate::from_ymd_opt(2024, 7, 31)
        );
        assert_eq!(
            Frequency::BiWeekly.advance(start, 1),
            NaiveDate::from_ymd_opt(2024, 2, 14)
        );

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            Frequency::SemiMonthly.advance(start, 3),
            NaiveDate::from_ymd_opt(2024, 2, 16)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("Bi-Weekly".parse::<Frequency>().unwrap(), Frequency::BiWeekly);
        assert_eq!("continuous".parse::<Compounding>().unwrap(), Compounding::Continuously);
        assert_eq!("quarterly".parse::<Compounding>().unwrap(), Compounding::Quarterly);
        assert!("hourly".parse::<Frequency>().is_err());
    }
}
