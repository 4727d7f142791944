use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{Language, LedgerService, ReportFilters, SaldenlisteReport};
use crate::domain::{format_cents, parse_cents, Cents, NewLedgerEntry, RootType};

/// Saldenliste - general ledger with a monthly trial balance
#[derive(Parser)]
#[command(name = "saldenliste")]
#[command(about = "Keep a general ledger and print the Summen- und Saldenliste for a month")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SALDENLISTE_DB", default_value = "saldenliste.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Chart of accounts
    #[command(subcommand)]
    Account(AccountCommands),

    /// Fiscal years
    #[command(subcommand)]
    FiscalYear(FiscalYearCommands),

    /// Ledger entries
    #[command(subcommand)]
    Entry(EntryCommands),

    /// Import ledger entries from CSV
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without posting
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the Summen- und Saldenliste for one month
    Report {
        /// Company name
        #[arg(long)]
        company: String,

        /// Evaluation month (1-12)
        #[arg(long)]
        month: u32,

        /// Fiscal year name
        #[arg(long)]
        fiscal_year: String,

        /// Report language: de, en
        #[arg(long, env = "SALDENLISTE_LANG", default_value = "de")]
        lang: String,

        /// Output format: table, csv, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name (must be unique)
        name: String,

        /// Company the account belongs to
        #[arg(long)]
        company: String,

        /// Root type: asset, liability, equity, income, expense
        #[arg(short = 't', long = "type")]
        root_type: String,

        /// Account number, e.g. 1200
        #[arg(short, long)]
        number: Option<String>,

        /// Account currency
        #[arg(short, long, default_value = "EUR")]
        currency: String,
    },

    /// List accounts
    List {
        /// Only accounts of this company
        #[arg(long)]
        company: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum FiscalYearCommands {
    /// Create a fiscal year
    Create {
        /// Fiscal year name, e.g. 2023
        name: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },

    /// List fiscal years
    List,
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Post a ledger entry
    Post {
        #[arg(long)]
        company: String,

        #[arg(long)]
        account: String,

        /// Debit amount (e.g. "150.00" or "150,00")
        #[arg(long)]
        debit: Option<String>,

        /// Credit amount
        #[arg(long)]
        credit: Option<String>,

        /// Posting date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Currency (defaults to the account currency)
        #[arg(long)]
        currency: Option<String>,

        /// Voucher type, e.g. "Journal Entry" or "Period Closing Voucher"
        #[arg(long)]
        voucher_type: Option<String>,

        /// Voucher number
        #[arg(long)]
        voucher_no: Option<String>,
    },

    /// Cancel a ledger entry
    Cancel {
        /// Entry ID
        id: String,
    },

    /// List the entries of a company
    List {
        #[arg(long)]
        company: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Account(cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_account_command(&service, cmd).await?;
            }

            Commands::FiscalYear(cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_fiscal_year_command(&service, cmd).await?;
            }

            Commands::Entry(cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_entry_command(&service, cmd).await?;
            }

            Commands::Import { input, dry_run } => {
                let service = LedgerService::connect(&self.database).await?;
                run_import_command(&service, input.as_deref(), dry_run).await?;
            }

            Commands::Report {
                company,
                month,
                fiscal_year,
                lang,
                format,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let language = Language::from_str(&lang)
                    .with_context(|| format!("Unsupported language '{}'. Use de or en", lang))?;
                let filters = ReportFilters {
                    company,
                    month,
                    fiscal_year,
                };
                let report = service
                    .execute(&filters, language.locale(), &language)
                    .await?;
                write_report(&report, &format, output.as_deref())?;
            }
        }

        Ok(())
    }
}

async fn run_account_command(service: &LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            name,
            company,
            root_type,
            number,
            currency,
        } => {
            let root_type = RootType::from_str(&root_type).with_context(|| {
                format!(
                    "Invalid root type '{}'. Use asset, liability, equity, income or expense",
                    root_type
                )
            })?;
            let account = service
                .create_account(name, company, root_type, number, currency)
                .await?;
            println!("Created account: {} ({})", account.name, account.root_type);
        }

        AccountCommands::List { company } => {
            let accounts = service.list_accounts(company.as_deref()).await?;
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }
            println!(
                "{:<10} {:<30} {:<10} {:<8} {}",
                "NUMBER", "NAME", "TYPE", "CURRENCY", "COMPANY"
            );
            println!("{}", "-".repeat(72));
            for account in accounts {
                println!(
                    "{:<10} {:<30} {:<10} {:<8} {}",
                    account.account_number.as_deref().unwrap_or("-"),
                    account.name,
                    account.root_type,
                    account.account_currency,
                    account.company
                );
            }
        }
    }
    Ok(())
}

async fn run_fiscal_year_command(service: &LedgerService, cmd: FiscalYearCommands) -> Result<()> {
    match cmd {
        FiscalYearCommands::Create { name, start, end } => {
            let fiscal_year = service
                .create_fiscal_year(name, parse_date(&start)?, parse_date(&end)?)
                .await?;
            println!(
                "Created fiscal year: {} ({} - {})",
                fiscal_year.name, fiscal_year.year_start_date, fiscal_year.year_end_date
            );
        }

        FiscalYearCommands::List => {
            let fiscal_years = service.list_fiscal_years().await?;
            if fiscal_years.is_empty() {
                println!("No fiscal years found.");
                return Ok(());
            }
            println!("{:<12} {:<12} {:<12}", "NAME", "START", "END");
            println!("{}", "-".repeat(38));
            for fy in fiscal_years {
                println!(
                    "{:<12} {:<12} {:<12}",
                    fy.name, fy.year_start_date, fy.year_end_date
                );
            }
        }
    }
    Ok(())
}

async fn run_entry_command(service: &LedgerService, cmd: EntryCommands) -> Result<()> {
    match cmd {
        EntryCommands::Post {
            company,
            account,
            debit,
            credit,
            date,
            currency,
            voucher_type,
            voucher_no,
        } => {
            let entry = service
                .post_entry(NewLedgerEntry {
                    company,
                    account,
                    account_currency: currency,
                    debit: parse_optional_amount(debit.as_deref())?,
                    credit: parse_optional_amount(credit.as_deref())?,
                    posting_date: parse_date(&date)?,
                    voucher_type,
                    voucher_no,
                })
                .await?;
            println!(
                "Posted entry: {} Dr {} Cr {} {} on {} ({})",
                entry.account,
                format_cents(entry.debit),
                format_cents(entry.credit),
                entry.account_currency,
                entry.posting_date,
                entry.id
            );
        }

        EntryCommands::Cancel { id } => {
            let id = Uuid::parse_str(&id).context("Invalid entry ID format (expected UUID)")?;
            let entry = service.cancel_entry(id).await?;
            println!("Cancelled entry: {} ({})", entry.id, entry.account);
        }

        EntryCommands::List { company } => {
            let entries = service.list_entries(&company).await?;
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            println!(
                "{:<12} {:<30} {:>14} {:>14} {:<5} {:<24} {}",
                "DATE", "ACCOUNT", "DEBIT", "CREDIT", "CUR", "VOUCHER TYPE", "ID"
            );
            println!("{}", "-".repeat(140));
            for entry in entries {
                let marker = if entry.is_cancelled { " (cancelled)" } else { "" };
                println!(
                    "{:<12} {:<30} {:>14} {:>14} {:<5} {:<24} {}{}",
                    entry.posting_date,
                    entry.account,
                    format_cents(entry.debit),
                    format_cents(entry.credit),
                    entry.account_currency,
                    entry.voucher_type,
                    entry.id,
                    marker
                );
            }
        }
    }
    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::stdin;

    let importer = Importer::new(service);
    let options = ImportOptions { dry_run };

    let result = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            importer.import_entries_csv(file, options).await?
        }
        None => importer.import_entries_csv(stdin(), options).await?,
    };

    if dry_run {
        println!("Validation complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}{}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!(" ({})", f))
                    .unwrap_or_default(),
                error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

fn write_report(report: &SaldenlisteReport, format: &str, output: Option<&str>) -> Result<()> {
    use crate::io::{write_report_csv, write_report_json};
    use std::fs::File;
    use std::io::{stdout, Write};

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create output file: {}", path))?,
        ),
        None => Box::new(stdout()),
    };

    match format {
        "json" => write_report_json(report, writer)?,
        "csv" => {
            let count = write_report_csv(report, writer)?;
            if output.is_some() {
                eprintln!("Exported {} rows", count);
            }
        }
        "table" => print_report_table(report, writer)?,
        other => bail!("Unknown format '{}'. Use table, csv or json", other),
    }
    Ok(())
}

fn print_report_table(report: &SaldenlisteReport, mut writer: impl std::io::Write) -> Result<()> {
    use crate::io::row_values;
    use std::io::Write;

    writeln!(
        writer,
        "Summen- und Saldenliste: {} / {} / {} ({} - {})",
        report.company,
        report.fiscal_year,
        report.month_name,
        report.period.month_start,
        report.period.month_end
    )?;
    writeln!(writer)?;

    if report.rows.is_empty() {
        writeln!(writer, "No movements in {}.", report.month_name)?;
        return Ok(());
    }

    let header: Vec<String> = report.columns.iter().map(|c| c.label.clone()).collect();
    let rows: Vec<[String; 10]> = report.rows.iter().map(row_values).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(value.chars().count());
        }
    }

    let format_line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (value, width))| {
                // account and currency left aligned, amounts right aligned
                let pad = width.saturating_sub(value.chars().count());
                if i < 2 {
                    format!("{}{}", value, " ".repeat(pad))
                } else {
                    format!("{}{}", " ".repeat(pad), value)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(writer, "{}", format_line(header.as_slice()))?;
    writeln!(
        writer,
        "{}",
        "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1))
    )?;
    for row in &rows {
        writeln!(writer, "{}", format_line(&row[..]))?;
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", s))
}

fn parse_optional_amount(s: Option<&str>) -> Result<Cents> {
    match s {
        Some(amount) => {
            parse_cents(amount).with_context(|| format!("Invalid amount '{}'", amount))
        }
        None => Ok(0),
    }
}
