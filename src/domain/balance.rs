//! Trial balance aggregation.
//!
//! Ledger entries are split into three windows relative to an
//! [`EvaluationPeriod`]: before the fiscal year (opening), from the fiscal year
//! start up to the evaluation month (until), and the evaluation month itself.
//! The windows are summed independently and then joined onto the in-month
//! movements, which decide which rows the report has.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Account, AccountOrder, Cents, EvaluationPeriod, LedgerEntry, RootType};

/// Raw debit and credit sums of a group of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub debit: Cents,
    pub credit: Cents,
}

impl Movement {
    pub fn new(debit: Cents, credit: Cents) -> Self {
        Self { debit, credit }
    }

    fn add(&mut self, entry: &LedgerEntry) {
        self.debit += entry.debit;
        self.credit += entry.credit;
    }
}

/// A balance that sits on at most one side. `None` means the side does not
/// apply to the account's root type, which is different from a zero balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidedBalance {
    pub debit: Option<Cents>,
    pub credit: Option<Cents>,
}

impl SidedBalance {
    fn on_debit(amount: Cents) -> Self {
        Self {
            debit: Some(amount),
            credit: None,
        }
    }

    fn on_credit(amount: Cents) -> Self {
        Self {
            debit: None,
            credit: Some(amount),
        }
    }
}

/// Balance carried in from prior fiscal years.
///
/// Income and expense accounts start every fiscal year at nothing, so only
/// balance-sheet accounts get an opening balance.
pub fn opening_balance(root_type: Option<RootType>, sums: Movement) -> SidedBalance {
    match root_type {
        Some(RootType::Asset) => SidedBalance::on_debit(sums.debit - sums.credit),
        Some(RootType::Liability | RootType::Equity) => {
            SidedBalance::on_credit(sums.credit - sums.debit)
        }
        Some(RootType::Income | RootType::Expense) | None => SidedBalance::default(),
    }
}

/// Balance at the end of the evaluation month. Absent figures count as zero.
pub fn closing_balance(
    root_type: Option<RootType>,
    opening: SidedBalance,
    until_month: Option<Movement>,
    in_month: Movement,
) -> SidedBalance {
    let until_month = until_month.unwrap_or_default();
    let debit = opening.debit.unwrap_or(0) + until_month.debit + in_month.debit;
    let credit = opening.credit.unwrap_or(0) + until_month.credit + in_month.credit;

    match root_type {
        Some(RootType::Asset | RootType::Expense) => SidedBalance::on_debit(debit - credit),
        Some(RootType::Liability | RootType::Equity | RootType::Income) => {
            SidedBalance::on_credit(credit - debit)
        }
        None => SidedBalance::default(),
    }
}

/// In-month movement of one account in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthMovement {
    pub account: String,
    pub account_currency: String,
    pub movement: Movement,
}

/// The three window sums a report is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    /// Raw sums before the fiscal year, by account.
    pub opening: HashMap<String, Movement>,
    /// Raw sums from fiscal year start to the evaluation month, by account.
    pub until_month: HashMap<String, Movement>,
    /// Sums inside the evaluation month, by account and currency.
    pub in_month: Vec<MonthMovement>,
}

impl Aggregates {
    /// Aggregate an in-memory slice of entries for one company.
    ///
    /// Cancelled entries are skipped everywhere; period closing vouchers are
    /// skipped in the until and in-month windows only.
    pub fn from_entries(entries: &[LedgerEntry], company: &str, period: &EvaluationPeriod) -> Self {
        let mut opening: HashMap<String, Movement> = HashMap::new();
        let mut until_month: HashMap<String, Movement> = HashMap::new();
        let mut in_month: BTreeMap<(String, String), Movement> = BTreeMap::new();

        let relevant = entries
            .iter()
            .filter(|e| e.company == company && !e.is_cancelled);

        for entry in relevant {
            let date = entry.posting_date;
            // A month before the fiscal year start overlaps the opening window.
            if period.is_opening(date) {
                opening.entry(entry.account.clone()).or_default().add(entry);
            }
            if entry.is_period_closing() {
                continue;
            }
            if period.is_until_month(date) {
                until_month
                    .entry(entry.account.clone())
                    .or_default()
                    .add(entry);
            } else if period.is_in_month(date) {
                in_month
                    .entry((entry.account.clone(), entry.account_currency.clone()))
                    .or_default()
                    .add(entry);
            }
        }

        Self {
            opening,
            until_month,
            in_month: in_month
                .into_iter()
                .map(|((account, account_currency), movement)| MonthMovement {
                    account,
                    account_currency,
                    movement,
                })
                .collect(),
        }
    }
}

/// One line of the Summen- und Saldenliste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub account: String,
    pub account_currency: String,
    pub debit_opening_balance: Option<Cents>,
    pub credit_opening_balance: Option<Cents>,
    pub debit_until_evaluation_period: Option<Cents>,
    pub credit_until_evaluation_period: Option<Cents>,
    pub debit_in_evaluation_period: Option<Cents>,
    pub credit_in_evaluation_period: Option<Cents>,
    pub debit_closing_balance: Option<Cents>,
    pub credit_closing_balance: Option<Cents>,
}

/// Sort in-month movements into report order: by account (see
/// [`AccountOrder`]) and then by currency.
pub fn sort_movements(movements: &mut [MonthMovement], accounts: &HashMap<String, Account>) {
    movements.sort_by(|a, b| {
        AccountOrder::new(&a.account, accounts.get(&a.account))
            .cmp(&AccountOrder::new(&b.account, accounts.get(&b.account)))
            .then_with(|| a.account_currency.cmp(&b.account_currency))
    });
}

/// Join the window sums into report rows.
///
/// Every in-month (account, currency) pair yields exactly one row; accounts
/// without in-month movement yield none. Opening and until sums are per
/// account and repeat on each currency row of that account.
pub fn combine(aggregates: Aggregates, accounts: &HashMap<String, Account>) -> Vec<ReportRow> {
    let Aggregates {
        opening,
        until_month,
        mut in_month,
    } = aggregates;
    sort_movements(&mut in_month, accounts);

    in_month
        .into_iter()
        .map(|month| {
            let root_type = accounts.get(&month.account).map(|a| a.root_type);
            let opening = opening
                .get(&month.account)
                .map(|sums| opening_balance(root_type, *sums))
                .unwrap_or_default();
            let until = until_month.get(&month.account).copied();
            let closing = closing_balance(root_type, opening, until, month.movement);

            ReportRow {
                account: month.account,
                account_currency: month.account_currency,
                debit_opening_balance: opening.debit,
                credit_opening_balance: opening.credit,
                debit_until_evaluation_period: until.map(|m| m.debit),
                credit_until_evaluation_period: until.map(|m| m.credit),
                debit_in_evaluation_period: Some(month.movement.debit),
                credit_in_evaluation_period: Some(month.movement.credit),
                debit_closing_balance: closing.debit,
                credit_closing_balance: closing.credit,
            }
        })
        .collect()
}
