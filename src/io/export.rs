use anyhow::Result;
use std::io::Write;

use crate::application::SaldenlisteReport;
use crate::domain::{format_optional_cents, ReportRow};

/// Values of a row in column order. Figures that do not apply stay empty.
pub fn row_values(row: &ReportRow) -> [String; 10] {
    [
        row.account.clone(),
        row.account_currency.clone(),
        format_optional_cents(row.debit_opening_balance),
        format_optional_cents(row.credit_opening_balance),
        format_optional_cents(row.debit_until_evaluation_period),
        format_optional_cents(row.credit_until_evaluation_period),
        format_optional_cents(row.debit_in_evaluation_period),
        format_optional_cents(row.credit_in_evaluation_period),
        format_optional_cents(row.debit_closing_balance),
        format_optional_cents(row.credit_closing_balance),
    ]
}

/// Write a report as CSV with the localized column labels as header.
/// Returns the number of data rows written.
pub fn write_report_csv<W: Write>(report: &SaldenlisteReport, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(report.columns.iter().map(|c| c.label.as_str()))?;
    for row in &report.rows {
        csv_writer.write_record(row_values(row))?;
    }

    csv_writer.flush()?;
    Ok(report.rows.len())
}

/// Write a report as pretty-printed JSON.
pub fn write_report_json<W: Write>(report: &SaldenlisteReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
