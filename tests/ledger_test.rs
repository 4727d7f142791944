mod common;

use anyhow::Result;
use common::{date, post_debit, test_service, StandardChart, COMPANY};
use saldenliste::application::AppError;
use saldenliste::domain::{EntryError, NewLedgerEntry, PeriodError, RootType, JOURNAL_ENTRY};
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_list_accounts() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardChart::create(&service).await?;
    service
        .create_account(
            "1200 - Bank - Other".into(),
            "Other AG".into(),
            RootType::Asset,
            None,
            "CHF".into(),
        )
        .await?;

    let all = service.list_accounts(None).await?;
    assert_eq!(all.len(), 7);

    let ours = service.list_accounts(Some(COMPANY)).await?;
    assert_eq!(ours.len(), 6);

    let other = service.get_account("1200 - Bank - Other").await?;
    assert_eq!(other.account_number, None);
    assert_eq!(other.account_currency, "CHF");
    assert_eq!(other.root_type, RootType::Asset);

    let bank = service.get_account(StandardChart::BANK).await?;
    assert_eq!(bank.account_number.as_deref(), Some("1200"));
    assert_eq!(bank.numeric_number(), Some(1200));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_account_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardChart::create(&service).await?;

    let result = service
        .create_account(
            StandardChart::BANK.into(),
            COMPANY.into(),
            RootType::Asset,
            None,
            "EUR".into(),
        )
        .await;
    assert!(matches!(result, Err(AppError::AccountAlreadyExists(_))));

    Ok(())
}

#[tokio::test]
async fn test_fiscal_years() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardChart::create(&service).await?;

    let years = service.list_fiscal_years().await?;
    let names: Vec<&str> = years.iter().map(|fy| fy.name.as_str()).collect();
    assert_eq!(names, vec!["2022", "2023"]);

    let duplicate = service
        .create_fiscal_year("2023".into(), date("2023-01-01"), date("2023-12-31"))
        .await;
    assert!(matches!(duplicate, Err(AppError::FiscalYearAlreadyExists(_))));

    let backwards = service
        .create_fiscal_year("bad".into(), date("2024-12-31"), date("2024-01-01"))
        .await;
    assert!(matches!(
        backwards,
        Err(AppError::InvalidPeriod(PeriodError::EndBeforeStart { .. }))
    ));

    Ok(())
}

#[tokio::test]
async fn test_shifted_fiscal_year_resolves_in_start_year() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service
        .create_fiscal_year("2023/24".into(), date("2023-07-01"), date("2024-06-30"))
        .await?;

    let period = service.resolve_period(9, "2023/24").await?;
    assert_eq!(period.fy_start, date("2023-07-01"));
    assert_eq!(period.month_start, date("2023-09-01"));
    assert_eq!(period.month_end, date("2023-09-30"));

    Ok(())
}

#[tokio::test]
async fn test_post_entry_defaults_and_roundtrip() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardChart::create(&service).await?;

    let posted = post_debit(&service, StandardChart::BANK, 12345, "2023-03-10").await?;
    assert_eq!(posted.account_currency, "EUR");
    assert_eq!(posted.voucher_type, JOURNAL_ENTRY);

    let stored = service.get_entry(posted.id).await?;
    assert_eq!(stored.id, posted.id);
    assert_eq!(stored.debit, 12345);
    assert_eq!(stored.credit, 0);
    assert_eq!(stored.posting_date, date("2023-03-10"));
    assert!(!stored.is_cancelled);

    let entries = service.list_entries(COMPANY).await?;
    assert_eq!(entries.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_post_entry_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardChart::create(&service).await?;

    let unknown = service
        .post_entry(NewLedgerEntry::debit(COMPANY, "9999 - Nope", 100, date("2023-01-01")))
        .await;
    assert!(matches!(unknown, Err(AppError::AccountNotFound(_))));

    let wrong_company = service
        .post_entry(NewLedgerEntry::debit(
            "Other AG",
            StandardChart::BANK,
            100,
            date("2023-01-01"),
        ))
        .await;
    assert!(matches!(
        wrong_company,
        Err(AppError::AccountCompanyMismatch { .. })
    ));

    let zero = service
        .post_entry(NewLedgerEntry::debit(
            COMPANY,
            StandardChart::BANK,
            0,
            date("2023-01-01"),
        ))
        .await;
    assert!(matches!(
        zero,
        Err(AppError::InvalidEntry(EntryError::ZeroAmount))
    ));

    let negative = service
        .post_entry(NewLedgerEntry::credit(
            COMPANY,
            StandardChart::BANK,
            -5,
            date("2023-01-01"),
        ))
        .await;
    assert!(matches!(
        negative,
        Err(AppError::InvalidEntry(EntryError::NegativeAmount { .. }))
    ));

    assert!(service.list_entries(COMPANY).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_cancel_entry() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardChart::create(&service).await?;

    let entry = post_debit(&service, StandardChart::BANK, 100, "2023-03-10").await?;

    let cancelled = service.cancel_entry(entry.id).await?;
    assert!(cancelled.is_cancelled);
    assert!(service.get_entry(entry.id).await?.is_cancelled);

    let again = service.cancel_entry(entry.id).await;
    assert!(matches!(again, Err(AppError::EntryAlreadyCancelled(id)) if id == entry.id));

    let missing = service.cancel_entry(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::EntryNotFound(_))));

    // Cancelled entries stay in the ledger.
    assert_eq!(service.list_entries(COMPANY).await?.len(), 1);

    Ok(())
}
