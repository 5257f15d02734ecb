//! Closed-form growth and interest conversions

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::frequency::{effective_annual_rate, Compounding};

/// Compound annual growth rate: `(end / begin)^(1 / years) - 1`
pub fn cagr(begin_value: f64, end_value: f64, years: f64) -> CalcResult<f64> {
    if begin_value == 0.0 {
        return Err(CalcError::DivisionByZero { what: "beginning value" });
    }
    if years == 0.0 {
        return Err(CalcError::DivisionByZero { what: "years" });
    }
    ensure_positive("begin_value", begin_value)?;
    ensure_non_negative("end_value", end_value)?;
    ensure_positive("years", years)?;

    Ok((end_value / begin_value).powf(1.0 / years) - 1.0)
}

/// Annual percentage yield of a nominal rate
pub fn apy(nominal_rate: f64, compounding: Compounding) -> CalcResult<f64> {
    ensure_finite("nominal_rate", nominal_rate)?;
    Ok(effective_annual_rate(nominal_rate, compounding))
}

/// Nominal rate that yields `apy` under the given compounding
pub fn nominal_rate_from_apy(apy: f64, compounding: Compounding) -> CalcResult<f64> {
    ensure_finite("apy", apy)?;
    if apy <= -1.0 {
        return Err(CalcError::invalid("apy", "must be greater than -100%"));
    }
    Ok(match compounding.frequency() {
        Some(freq) => {
            let m = freq.periods_per_year() as f64;
            m * ((1.0 + apy).powf(1.0 / m) - 1.0)
        }
        None => (1.0 + apy).ln(),
    })
}

/// Interest earned without compounding: `P * r * t`
pub fn simple_interest(principal: f64, annual_rate: f64, years: f64) -> CalcResult<f64> {
    ensure_non_negative("principal", principal)?;
    ensure_finite("annual_rate", annual_rate)?;
    ensure_non_negative("years", years)?;
    Ok(principal * annual_rate * years)
}

/// Value of a lump sum after `years` of compounding
pub fn future_value(
    present_value: f64,
    annual_rate: f64,
    years: f64,
    compounding: Compounding,
) -> CalcResult<f64> {
    ensure_finite("present_value", present_value)?;
    ensure_non_negative("years", years)?;
    let ear = apy(annual_rate, compounding)?;
    if ear <= -1.0 {
        return Err(CalcError::invalid("annual_rate", "wipes out the balance"));
    }
    Ok(present_value * (1.0 + ear).powf(years))
}

/// Amount that grows to `future_value` after `years` of compounding
pub fn present_value(
    future_value: f64,
    annual_rate: f64,
    years: f64,
    compounding: Compounding,
) -> CalcResult<f64> {
    ensure_finite("future_value", future_value)?;
    ensure_non_negative("years", years)?;
    let ear = apy(annual_rate, compounding)?;
    if ear <= -1.0 {
        return Err(CalcError::invalid("annual_rate", "must be greater than -100%"));
    }
    Ok(future_value / (1.0 + ear).powf(years))
}

/// Return on investment: `(final - cost) / cost`
pub fn roi(cost: f64, final_value: f64) -> CalcResult<f64> {
    if cost == 0.0 {
        return Err(CalcError::DivisionByZero { what: "cost" });
    }
    ensure_positive("cost", cost)?;
    ensure_finite("final_value", final_value)?;
    Ok((final_value - cost) / cost)
}

/// Inflation-adjusted rate by the Fisher relation `(1 + n) / (1 + i) - 1`
pub fn real_rate(nominal_rate: f64, inflation_rate: f64) -> CalcResult<f64> {
    ensure_finite("nominal_rate", nominal_rate)?;
    ensure_finite("inflation_rate", inflation_rate)?;
    if inflation_rate <= -1.0 {
        return Err(CalcError::invalid("inflation_rate", "must be greater than -100%"));
    }
    Ok((1.0 + nominal_rate) / (1.0 + inflation_rate) - 1.0)
}

/// Rule-of-72 estimate of doubling time in years
pub fn rule_of_72(annual_rate: f64) -> CalcResult<f64> {
    if annual_rate == 0.0 {
        return Err(CalcError::DivisionByZero { what: "rate" });
    }
    ensure_positive("annual_rate", annual_rate)?;
    Ok(72.0 / (annual_rate * 100.0))
}
