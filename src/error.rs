//! Error types for calculator operations

use thiserror::Error;

/// A specialized Result type for calculator operations.
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors raised by closed-form converters, solvers and the I/O helpers.
///
/// The period-simulation calculators never return these: degenerate input
/// there produces a zeroed result instead.
#[derive(Error, Debug)]
pub enum CalcError {
    /// A parameter is outside its valid domain.
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput {
        /// Name of the offending parameter.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// Division by zero or a near-zero denominator.
    #[error("Division by zero: {what} is zero")]
    DivisionByZero {
        /// The quantity that would be used as a divisor.
        what: &'static str,
    },

    /// Root-finding algorithm failed to converge.
    #[error("Convergence failed after {iterations} iterations (residual: {residual:.2e})")]
    NonConvergence {
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual value.
        residual: f64,
    },

    /// Bracket endpoints do not straddle a root.
    #[error("Invalid bracket: f({low}) = {f_low:.2e} and f({high}) = {f_high:.2e} have same sign")]
    InvalidBracket {
        low: f64,
        high: f64,
        f_low: f64,
        f_high: f64,
    },

    /// Units from different physical dimensions.
    #[error("Cannot convert {from} to {to}: different dimensions")]
    DimensionMismatch { from: String, to: String },

    /// Currency code not present in the rate table.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    /// Shorthand for [`CalcError::InvalidInput`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject non-finite or negative values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("must not be negative (got {value})")));
    }
    Ok(())
}

/// Reject non-finite, zero or negative values.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> CalcResult<()> {
    ensure_non_negative(field, value)?;
    if value == 0.0 {
        return Err(CalcError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

/// Reject non-finite values.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid(field, "must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CalcError::DivisionByZero { what: "cost" };
        assert_eq!(err.to_string(), "Division by zero: cost is zero");

        let err = CalcError::invalid("years", "must be greater than zero");
        assert_eq!(err.to_string(), "Invalid input for years: must be greater than zero");
    }

    #[test]
    fn test_guards() {
        assert!(ensure_positive("x", 1.0).is_ok());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_non_negative("x", 0.0).is_ok());
        assert!(ensure_non_negative("x", -1.0).is_err());
        assert!(ensure_finite("x", f64::NAN).is_err());
    }
}
