use thiserror::Error;

use crate::domain::{EntryError, EntryId, PeriodError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Account {account} belongs to company {account_company}, not {company}")]
    AccountCompanyMismatch {
        account: String,
        account_company: String,
        company: String,
    },

    #[error("Fiscal year not found: {0}")]
    FiscalYearNotFound(String),

    #[error("Fiscal year already exists: {0}")]
    FiscalYearAlreadyExists(String),

    #[error("Ledger entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Ledger entry is already cancelled: {0}")]
    EntryAlreadyCancelled(EntryId),

    #[error("Invalid ledger entry: {0}")]
    InvalidEntry(#[from] EntryError),

    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
