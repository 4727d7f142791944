// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use saldenliste::application::{Language, LedgerService, ReportFilters, SaldenlisteReport};
use saldenliste::domain::{Cents, LedgerEntry, NewLedgerEntry, ReportRow, RootType};
use tempfile::TempDir;

pub const COMPANY: &str = "Musterfirma GmbH";

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: a small SKR-style chart of accounts and calendar fiscal years
pub struct StandardChart;

impl StandardChart {
    pub const CASH: &'static str = "1000 - Kasse";
    pub const BANK: &'static str = "1200 - Bank";
    pub const PAYABLES: &'static str = "3300 - Verbindlichkeiten";
    pub const CAPITAL: &'static str = "2000 - Eigenkapital";
    pub const REVENUE: &'static str = "8400 - Erlöse";
    pub const RENT: &'static str = "4210 - Miete";

    pub async fn create(service: &LedgerService) -> Result<()> {
        for (name, root_type, number) in [
            (Self::CASH, RootType::Asset, "1000"),
            (Self::BANK, RootType::Asset, "1200"),
            (Self::CAPITAL, RootType::Equity, "2000"),
            (Self::PAYABLES, RootType::Liability, "3300"),
            (Self::RENT, RootType::Expense, "4210"),
            (Self::REVENUE, RootType::Income, "8400"),
        ] {
            service
                .create_account(
                    name.into(),
                    COMPANY.into(),
                    root_type,
                    Some(number.into()),
                    "EUR".into(),
                )
                .await?;
        }

        service
            .create_fiscal_year("2022".into(), date("2022-01-01"), date("2022-12-31"))
            .await?;
        service
            .create_fiscal_year("2023".into(), date("2023-01-01"), date("2023-12-31"))
            .await?;
        Ok(())
    }
}

pub async fn post_debit(
    service: &LedgerService,
    account: &str,
    amount: Cents,
    on: &str,
) -> Result<LedgerEntry> {
    Ok(service
        .post_entry(NewLedgerEntry::debit(COMPANY, account, amount, date(on)))
        .await?)
}

pub async fn post_credit(
    service: &LedgerService,
    account: &str,
    amount: Cents,
    on: &str,
) -> Result<LedgerEntry> {
    Ok(service
        .post_entry(NewLedgerEntry::credit(COMPANY, account, amount, date(on)))
        .await?)
}

/// Run the report for `COMPANY` in English.
pub async fn report(
    service: &LedgerService,
    month: u32,
    fiscal_year: &str,
) -> Result<SaldenlisteReport> {
    let filters = ReportFilters {
        company: COMPANY.into(),
        month,
        fiscal_year: fiscal_year.into(),
    };
    Ok(service
        .execute(&filters, Language::En.locale(), &Language::En)
        .await?)
}

pub fn find_row<'a>(report: &'a SaldenlisteReport, account: &str) -> &'a ReportRow {
    report
        .rows
        .iter()
        .find(|r| r.account == account)
        .unwrap_or_else(|| panic!("no row for {}", account))
}
