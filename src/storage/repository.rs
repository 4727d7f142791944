use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Account, Aggregates, EntryId, EvaluationPeriod, FiscalYear, LedgerEntry, MonthMovement,
    Movement, PERIOD_CLOSING_VOUCHER, RootType,
};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

const ENTRY_COLUMNS: &str = "id, company, account, account_currency, debit_cents, credit_cents, posting_date, voucher_type, voucher_no, is_cancelled, recorded_at";

/// Repository for persisting and querying accounts, fiscal years and ledger entries.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (name, company, root_type, account_number, account_currency)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.name)
        .bind(&account.company)
        .bind(account.root_type.as_str())
        .bind(&account.account_number)
        .bind(&account.account_currency)
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    pub async fn get_account(&self, name: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT name, company, root_type, account_number, account_currency
            FROM accounts
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// List accounts, optionally restricted to one company.
    pub async fn list_accounts(&self, company: Option<&str>) -> Result<Vec<Account>> {
        let rows = match company {
            Some(company) => {
                sqlx::query(
                    "SELECT name, company, root_type, account_number, account_currency FROM accounts WHERE company = ? ORDER BY name",
                )
                .bind(company)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT name, company, root_type, account_number, account_currency FROM accounts ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    /// All accounts keyed by name, for joining metadata onto aggregates.
    pub async fn account_map(&self) -> Result<HashMap<String, Account>> {
        Ok(self
            .list_accounts(None)
            .await?
            .into_iter()
            .map(|a| (a.name.clone(), a))
            .collect())
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let root_type_str: String = row.get("root_type");

        Ok(Account {
            name: row.get("name"),
            company: row.get("company"),
            root_type: RootType::from_str(&root_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid root type: {}", root_type_str))?,
            account_number: row.get("account_number"),
            account_currency: row.get("account_currency"),
        })
    }

    // ========================
    // Fiscal year operations
    // ========================

    pub async fn save_fiscal_year(&self, fiscal_year: &FiscalYear) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fiscal_years (name, year_start_date, year_end_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&fiscal_year.name)
        .bind(format_date(fiscal_year.year_start_date))
        .bind(format_date(fiscal_year.year_end_date))
        .execute(&self.pool)
        .await
        .context("Failed to save fiscal year")?;
        Ok(())
    }

    pub async fn get_fiscal_year(&self, name: &str) -> Result<Option<FiscalYear>> {
        let row = sqlx::query(
            "SELECT name, year_start_date, year_end_date FROM fiscal_years WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch fiscal year")?;

        row.as_ref().map(Self::row_to_fiscal_year).transpose()
    }

    pub async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>> {
        let rows = sqlx::query(
            "SELECT name, year_start_date, year_end_date FROM fiscal_years ORDER BY year_start_date",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list fiscal years")?;

        rows.iter().map(Self::row_to_fiscal_year).collect()
    }

    fn row_to_fiscal_year(row: &sqlx::sqlite::SqliteRow) -> Result<FiscalYear> {
        let start: String = row.get("year_start_date");
        let end: String = row.get("year_end_date");

        Ok(FiscalYear {
            name: row.get("name"),
            year_start_date: parse_date(&start).context("Invalid year_start_date")?,
            year_end_date: parse_date(&end).context("Invalid year_end_date")?,
        })
    }

    // ========================
    // Ledger entry operations
    // ========================

    pub async fn save_entry(&self, entry: &LedgerEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO gl_entries (id, company, account, account_currency, debit_cents, credit_cents, posting_date, voucher_type, voucher_no, is_cancelled, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.company)
        .bind(&entry.account)
        .bind(&entry.account_currency)
        .bind(entry.debit)
        .bind(entry.credit)
        .bind(format_date(entry.posting_date))
        .bind(&entry.voucher_type)
        .bind(&entry.voucher_no)
        .bind(entry.is_cancelled)
        .bind(entry.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save ledger entry")?;
        Ok(())
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>> {
        let query = format!("SELECT {} FROM gl_entries WHERE id = ?", ENTRY_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch ledger entry")?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    /// List the entries of a company in posting order.
    pub async fn list_entries(&self, company: &str) -> Result<Vec<LedgerEntry>> {
        let query = format!(
            "SELECT {} FROM gl_entries WHERE company = ? ORDER BY posting_date, recorded_at",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(company)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list ledger entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Mark an entry as cancelled. Returns false if no active entry matched.
    pub async fn cancel_entry(&self, id: EntryId) -> Result<bool> {
        let result =
            sqlx::query("UPDATE gl_entries SET is_cancelled = 1 WHERE id = ? AND is_cancelled = 0")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .context("Failed to cancel ledger entry")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let id_str: String = row.get("id");
        let posting_date_str: String = row.get("posting_date");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(LedgerEntry {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            company: row.get("company"),
            account: row.get("account"),
            account_currency: row.get("account_currency"),
            debit: row.get("debit_cents"),
            credit: row.get("credit_cents"),
            posting_date: parse_date(&posting_date_str).context("Invalid posting_date")?,
            voucher_type: row.get("voucher_type"),
            voucher_no: row.get("voucher_no"),
            is_cancelled: row.get::<i32, _>("is_cancelled") != 0,
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Trial balance aggregation
    // ========================

    /// Raw sums per account of everything posted before the fiscal year.
    /// Period closing vouchers are included here.
    pub async fn sum_opening(
        &self,
        company: &str,
        fy_start: NaiveDate,
    ) -> Result<HashMap<String, Movement>> {
        let rows = sqlx::query(
            r#"
            SELECT account, SUM(debit_cents) AS debit, SUM(credit_cents) AS credit
            FROM gl_entries
            WHERE company = ? AND is_cancelled = 0 AND posting_date < ?
            GROUP BY account
            "#,
        )
        .bind(company)
        .bind(format_date(fy_start))
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum opening balances")?;

        Ok(rows.iter().map(Self::row_to_account_movement).collect())
    }

    /// Raw sums per account from the fiscal year start up to (excluding) the
    /// evaluation month.
    pub async fn sum_until_month(
        &self,
        company: &str,
        fy_start: NaiveDate,
        month_start: NaiveDate,
    ) -> Result<HashMap<String, Movement>> {
        let rows = sqlx::query(
            r#"
            SELECT account, SUM(debit_cents) AS debit, SUM(credit_cents) AS credit
            FROM gl_entries
            WHERE company = ? AND is_cancelled = 0
              AND posting_date >= ? AND posting_date < ?
              AND voucher_type != ?
            GROUP BY account
            "#,
        )
        .bind(company)
        .bind(format_date(fy_start))
        .bind(format_date(month_start))
        .bind(PERIOD_CLOSING_VOUCHER)
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum movements until evaluation month")?;

        Ok(rows.iter().map(Self::row_to_account_movement).collect())
    }

    /// Sums per account and currency inside the evaluation month.
    pub async fn sum_in_month(
        &self,
        company: &str,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<Vec<MonthMovement>> {
        let rows = sqlx::query(
            r#"
            SELECT account, account_currency, SUM(debit_cents) AS debit, SUM(credit_cents) AS credit
            FROM gl_entries
            WHERE company = ? AND is_cancelled = 0
              AND posting_date >= ? AND posting_date <= ?
              AND voucher_type != ?
            GROUP BY account, account_currency
            ORDER BY account, account_currency
            "#,
        )
        .bind(company)
        .bind(format_date(month_start))
        .bind(format_date(month_end))
        .bind(PERIOD_CLOSING_VOUCHER)
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum movements in evaluation month")?;

        Ok(rows
            .iter()
            .map(|row| MonthMovement {
                account: row.get("account"),
                account_currency: row.get("account_currency"),
                movement: Movement::new(row.get("debit"), row.get("credit")),
            })
            .collect())
    }

    /// Run the three window queries for a company and period.
    pub async fn aggregates(
        &self,
        company: &str,
        period: &EvaluationPeriod,
    ) -> Result<Aggregates> {
        Ok(Aggregates {
            opening: self.sum_opening(company, period.fy_start).await?,
            until_month: self
                .sum_until_month(company, period.fy_start, period.month_start)
                .await?,
            in_month: self
                .sum_in_month(company, period.month_start, period.month_end)
                .await?,
        })
    }

    fn row_to_account_movement(row: &sqlx::sqlite::SqliteRow) -> (String, Movement) {
        (
            row.get("account"),
            Movement::new(row.get("debit"), row.get("credit")),
        )
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("Invalid date: {}", s))
}
