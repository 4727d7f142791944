use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Top-level classification of an account. Decides on which side (debit or
/// credit) the account normally carries its balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootType {
    /// Bank accounts, receivables, fixed assets
    Asset,
    /// Payables, loans, provisions
    Liability,
    /// Capital and retained earnings
    Equity,
    /// Revenue accounts, reset every fiscal year
    Income,
    /// Cost accounts, reset every fiscal year
    Expense,
}

impl RootType {
    pub const ALL: [RootType; 5] = [
        RootType::Asset,
        RootType::Liability,
        RootType::Equity,
        RootType::Income,
        RootType::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RootType::Asset => "Asset",
            RootType::Liability => "Liability",
            RootType::Equity => "Equity",
            RootType::Income => "Income",
            RootType::Expense => "Expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Some(RootType::Asset),
            "liability" => Some(RootType::Liability),
            "equity" => Some(RootType::Equity),
            "income" => Some(RootType::Income),
            "expense" => Some(RootType::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for RootType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier, e.g. "1200 - Bank - MC".
    pub name: String,
    pub company: String,
    pub root_type: RootType,
    pub account_number: Option<String>,
    pub account_currency: String,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        root_type: RootType,
        account_currency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            root_type,
            account_number: None,
            account_currency: account_currency.into(),
        }
    }

    pub fn with_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    /// The account number as an integer, if it is one.
    pub fn numeric_number(&self) -> Option<i64> {
        self.account_number
            .as_deref()
            .and_then(|n| n.trim().parse().ok())
    }
}

/// Sort key for report rows.
///
/// Accounts with an integer account number come first in ascending order.
/// Accounts without one (missing, non-numeric, or no account metadata at all)
/// follow, ordered by name. Equal numbers fall back to the account name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOrder<'a> {
    number: Option<i64>,
    name: &'a str,
}

impl<'a> AccountOrder<'a> {
    pub fn new(name: &'a str, account: Option<&Account>) -> Self {
        Self {
            number: account.and_then(Account::numeric_number),
            name,
        }
    }
}

impl Ord for AccountOrder<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_number = match (self.number, other.number) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_number.then_with(|| self.name.cmp(other.name))
    }
}

impl PartialOrd for AccountOrder<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
