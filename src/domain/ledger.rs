use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Cents;

pub type EntryId = Uuid;

/// Voucher type of the year-end entries that zero out income and expense
/// accounts. They are left out of the monthly movement sums.
pub const PERIOD_CLOSING_VOUCHER: &str = "Period Closing Voucher";

/// Voucher type used when none is given.
pub const JOURNAL_ENTRY: &str = "Journal Entry";

/// One line of the general ledger. Entries are append-only: a mistake is
/// undone by cancelling the entry, never by editing or deleting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub company: String,
    pub account: String,
    pub account_currency: String,
    /// Debit in account currency
    pub debit: Cents,
    /// Credit in account currency
    pub credit: Cents,
    pub posting_date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: Option<String>,
    pub is_cancelled: bool,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_period_closing(&self) -> bool {
        self.voucher_type == PERIOD_CLOSING_VOUCHER
    }
}

/// Input for posting a new ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub company: String,
    pub account: String,
    /// Falls back to the account's currency when absent.
    pub account_currency: Option<String>,
    pub debit: Cents,
    pub credit: Cents,
    pub posting_date: NaiveDate,
    pub voucher_type: Option<String>,
    pub voucher_no: Option<String>,
}

impl NewLedgerEntry {
    pub fn debit(
        company: impl Into<String>,
        account: impl Into<String>,
        amount: Cents,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            company: company.into(),
            account: account.into(),
            account_currency: None,
            debit: amount,
            credit: 0,
            posting_date,
            voucher_type: None,
            voucher_no: None,
        }
    }

    pub fn credit(
        company: impl Into<String>,
        account: impl Into<String>,
        amount: Cents,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            credit: amount,
            debit: 0,
            ..Self::debit(company, account, 0, posting_date)
        }
    }

    pub fn with_voucher_type(mut self, voucher_type: impl Into<String>) -> Self {
        self.voucher_type = Some(voucher_type.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.account_currency = Some(currency.into());
        self
    }

    pub fn with_voucher_no(mut self, voucher_no: impl Into<String>) -> Self {
        self.voucher_no = Some(voucher_no.into());
        self
    }

    /// Check amounts and build the stored entry.
    pub fn into_entry(self, default_currency: &str) -> Result<LedgerEntry, EntryError> {
        validate_amounts(self.debit, self.credit)?;

        Ok(LedgerEntry {
            id: Uuid::new_v4(),
            company: self.company,
            account: self.account,
            account_currency: self
                .account_currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| default_currency.to_string()),
            debit: self.debit,
            credit: self.credit,
            posting_date: self.posting_date,
            voucher_type: self
                .voucher_type
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| JOURNAL_ENTRY.to_string()),
            voucher_no: self.voucher_no,
            is_cancelled: false,
            recorded_at: Utc::now(),
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Debit and credit must not be negative (debit {debit}, credit {credit})")]
    NegativeAmount { debit: Cents, credit: Cents },

    #[error("Entry has neither a debit nor a credit amount")]
    ZeroAmount,
}

pub fn validate_amounts(debit: Cents, credit: Cents) -> Result<(), EntryError> {
    if debit < 0 || credit < 0 {
        return Err(EntryError::NegativeAmount { debit, credit });
    }
    if debit == 0 && credit == 0 {
        return Err(EntryError::ZeroAmount);
    }
    Ok(())
}
