use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

use crate::application::{AppError, LedgerService};
use crate::domain::{parse_cents, validate_amounts, Cents, NewLedgerEntry};

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred on one line of the input
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate every line without posting anything
    pub dry_run: bool,
}

/// One CSV line:
/// `company,account,account_currency,debit,credit,posting_date,voucher_type,voucher_no`
#[derive(Debug, Deserialize)]
struct EntryRecord {
    company: String,
    account: String,
    #[serde(default)]
    account_currency: Option<String>,
    #[serde(default)]
    debit: Option<String>,
    #[serde(default)]
    credit: Option<String>,
    posting_date: String,
    #[serde(default)]
    voucher_type: Option<String>,
    #[serde(default)]
    voucher_no: Option<String>,
}

/// Importer for posting ledger entries from CSV
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import ledger entries from CSV. Bad lines are collected, not fatal.
    pub async fn import_entries_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut result = ImportResult::default();

        for (line_num, record) in csv_reader.deserialize::<EntryRecord>().enumerate() {
            let line = line_num + 2; // header is line 1

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let new_entry = match parse_record(record) {
                Ok(entry) => entry,
                Err((field, error)) => {
                    result.errors.push(ImportError {
                        line,
                        field: Some(field.to_string()),
                        error,
                    });
                    continue;
                }
            };

            let outcome = if options.dry_run {
                self.check_entry(&new_entry).await
            } else {
                self.service.post_entry(new_entry).await.map(|_| ())
            };

            match outcome {
                Ok(()) => result.imported += 1,
                Err(e) => result.errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        tracing::info!(
            imported = result.imported,
            errors = result.errors.len(),
            dry_run = options.dry_run,
            "Imported ledger entries"
        );
        Ok(result)
    }

    /// The checks `post_entry` would run, without writing.
    async fn check_entry(&self, entry: &NewLedgerEntry) -> Result<(), AppError> {
        let account = self.service.get_account(&entry.account).await?;
        if account.company != entry.company {
            return Err(AppError::AccountCompanyMismatch {
                account: account.name,
                account_company: account.company,
                company: entry.company.clone(),
            });
        }
        validate_amounts(entry.debit, entry.credit)?;
        Ok(())
    }
}

fn parse_record(record: EntryRecord) -> Result<NewLedgerEntry, (&'static str, String)> {
    let debit = parse_amount(record.debit.as_deref()).map_err(|e| ("debit", e))?;
    let credit = parse_amount(record.credit.as_deref()).map_err(|e| ("credit", e))?;
    let posting_date = NaiveDate::parse_from_str(&record.posting_date, "%Y-%m-%d")
        .map_err(|e| ("posting_date", format!("Invalid date: {}", e)))?;

    Ok(NewLedgerEntry {
        company: record.company,
        account: record.account,
        account_currency: record.account_currency,
        debit,
        credit,
        posting_date,
        voucher_type: record.voucher_type,
        voucher_no: record.voucher_no,
    })
}

fn parse_amount(value: Option<&str>) -> Result<Cents, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(0),
        Some(s) => parse_cents(s).map_err(|e| format!("Invalid amount '{}': {}", s, e)),
    }
}
