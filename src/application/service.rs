use chrono::{Locale, NaiveDate};
use tracing::{debug, info};

use crate::domain::{
    combine, Account, EntryId, EvaluationPeriod, FiscalYear, LedgerEntry, NewLedgerEntry,
    ReportRow, RootType,
};
use crate::storage::Repository;

use super::reporting::{build_columns, month_name, ReportFilters, SaldenlisteReport, Translate};
use super::AppError;

/// Application service providing high-level operations on the ledger.
/// This is the primary interface for any client (CLI, tests, other front ends).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Chart of accounts
    // ========================

    pub async fn create_account(
        &self,
        name: String,
        company: String,
        root_type: RootType,
        account_number: Option<String>,
        currency: String,
    ) -> Result<Account, AppError> {
        if self.repo.get_account(&name).await?.is_some() {
            return Err(AppError::AccountAlreadyExists(name));
        }

        let mut account = Account::new(name, company, root_type, currency);
        if let Some(number) = account_number {
            account = account.with_number(number);
        }

        self.repo.save_account(&account).await?;
        info!(account = %account.name, company = %account.company, root_type = %account.root_type, "Created account");
        Ok(account)
    }

    pub async fn get_account(&self, name: &str) -> Result<Account, AppError> {
        self.repo
            .get_account(name)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(name.to_string()))
    }

    pub async fn list_accounts(&self, company: Option<&str>) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts(company).await?)
    }

    // ========================
    // Fiscal years
    // ========================

    pub async fn create_fiscal_year(
        &self,
        name: String,
        year_start_date: NaiveDate,
        year_end_date: NaiveDate,
    ) -> Result<FiscalYear, AppError> {
        if self.repo.get_fiscal_year(&name).await?.is_some() {
            return Err(AppError::FiscalYearAlreadyExists(name));
        }

        let fiscal_year = FiscalYear::new(name, year_start_date, year_end_date)?;
        self.repo.save_fiscal_year(&fiscal_year).await?;
        info!(fiscal_year = %fiscal_year.name, start = %fiscal_year.year_start_date, "Created fiscal year");
        Ok(fiscal_year)
    }

    pub async fn get_fiscal_year(&self, name: &str) -> Result<FiscalYear, AppError> {
        self.repo
            .get_fiscal_year(name)
            .await?
            .ok_or_else(|| AppError::FiscalYearNotFound(name.to_string()))
    }

    pub async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, AppError> {
        Ok(self.repo.list_fiscal_years().await?)
    }

    // ========================
    // Ledger entries
    // ========================

    /// Post a new entry. The account must exist and belong to the entry's company.
    pub async fn post_entry(&self, new_entry: NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        let account = self.get_account(&new_entry.account).await?;
        if account.company != new_entry.company {
            return Err(AppError::AccountCompanyMismatch {
                account: account.name,
                account_company: account.company,
                company: new_entry.company,
            });
        }

        let entry = new_entry.into_entry(&account.account_currency)?;
        self.repo.save_entry(&entry).await?;
        info!(
            id = %entry.id,
            account = %entry.account,
            debit = entry.debit,
            credit = entry.credit,
            posting_date = %entry.posting_date,
            "Posted ledger entry"
        );
        Ok(entry)
    }

    /// Cancel an entry. Cancelled entries stay in the ledger but no longer count.
    pub async fn cancel_entry(&self, id: EntryId) -> Result<LedgerEntry, AppError> {
        let entry = self
            .repo
            .get_entry(id)
            .await?
            .ok_or(AppError::EntryNotFound(id))?;
        if entry.is_cancelled || !self.repo.cancel_entry(id).await? {
            return Err(AppError::EntryAlreadyCancelled(id));
        }

        info!(id = %id, account = %entry.account, "Cancelled ledger entry");
        Ok(LedgerEntry {
            is_cancelled: true,
            ..entry
        })
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<LedgerEntry, AppError> {
        self.repo
            .get_entry(id)
            .await?
            .ok_or(AppError::EntryNotFound(id))
    }

    pub async fn list_entries(&self, company: &str) -> Result<Vec<LedgerEntry>, AppError> {
        Ok(self.repo.list_entries(company).await?)
    }

    // ========================
    // Summen- und Saldenliste
    // ========================

    /// Look up the fiscal year and resolve the evaluation month inside it.
    pub async fn resolve_period(
        &self,
        month: u32,
        fiscal_year: &str,
    ) -> Result<EvaluationPeriod, AppError> {
        let fiscal_year = self.get_fiscal_year(fiscal_year).await?;
        Ok(EvaluationPeriod::resolve(month, &fiscal_year)?)
    }

    /// Compute the report rows of a company for a resolved period.
    pub async fn compute_rows(
        &self,
        company: &str,
        period: &EvaluationPeriod,
    ) -> Result<Vec<ReportRow>, AppError> {
        let aggregates = self.repo.aggregates(company, period).await?;
        debug!(
            company,
            opening = aggregates.opening.len(),
            until_month = aggregates.until_month.len(),
            in_month = aggregates.in_month.len(),
            "Aggregated ledger windows"
        );

        let accounts = self.repo.account_map().await?;
        Ok(combine(aggregates, &accounts))
    }

    /// Build the full report: localized columns plus rows.
    pub async fn execute(
        &self,
        filters: &ReportFilters,
        locale: Locale,
        translator: &dyn Translate,
    ) -> Result<SaldenlisteReport, AppError> {
        let period = self
            .resolve_period(filters.month, &filters.fiscal_year)
            .await?;
        let month_name = month_name(period.month_start, locale);
        let rows = self.compute_rows(&filters.company, &period).await?;

        info!(
            company = %filters.company,
            fiscal_year = %filters.fiscal_year,
            month = filters.month,
            rows = rows.len(),
            "Computed Summen- und Saldenliste"
        );

        Ok(SaldenlisteReport {
            company: filters.company.clone(),
            fiscal_year: filters.fiscal_year.clone(),
            columns: build_columns(&month_name, translator),
            month_name,
            period,
            rows,
        })
    }
}
