//! CSV export of schedules and summaries

use std::io::Write;
use std::path::Path;

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::error::CalcResult;

/// Write `rows` as CSV with a header taken from the row's field names
pub fn write_csv<W: Write, R: Serialize>(writer: W, rows: &[R]) -> CalcResult<()> {
    let mut wtr = Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `rows` to a CSV file, replacing it if it exists
pub fn write_csv_file<P: AsRef<Path>, R: Serialize>(path: P, rows: &[R]) -> CalcResult<()> {
    let path = path.as_ref();
    let mut wtr = Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{calculate_loan, LoanParams};
    use crate::growth::{calculate_payoff, CreditCardParams};

    #[test]
    fn test_loan_schedule_csv() {
        let result = calculate_loan(&LoanParams::new(1_200.0, 0.0, 1.0));
        let mut buf = Vec::new();
        write_csv(&mut buf, &result.schedule).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("period,year,payment_date,beginning_balance,payment"));
        assert_eq!(lines.count(), 12);
    }

    #[test]
    fn test_payoff_schedule_csv() {
        let result = calculate_payoff(&CreditCardParams::new(1_000.0, 0.0, 250.0));
        let mut buf = Vec::new();
        write_csv(&mut buf, &result.schedule).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().next().unwrap(), "month,beginning_balance,interest,payment,ending_balance");
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_empty_rows_write_nothing() {
        let rows: Vec<crate::growth::PayoffRow> = Vec::new();
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        assert!(buf.is_empty());
    }
}
