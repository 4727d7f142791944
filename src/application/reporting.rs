use std::borrow::Cow;

use chrono::{Locale, NaiveDate};
use serde::Serialize;

use crate::domain::{EvaluationPeriod, ReportRow};

/// Input of the Summen- und Saldenliste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilters {
    pub company: String,
    /// Evaluation month, 1 to 12
    pub month: u32,
    pub fiscal_year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaldenlisteReport {
    pub company: String,
    pub fiscal_year: String,
    pub month_name: String,
    pub period: EvaluationPeriod,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// Reference to another record (account, currency)
    Link,
    /// Amount shown in the currency named by `options`
    Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub fieldname: &'static str,
    pub label: String,
    pub fieldtype: ColumnType,
    pub options: &'static str,
    pub width: u32,
}

/// Looks up the display text for a label.
///
/// Labels may contain a `{0}` placeholder which is substituted after
/// translation, so translations can move it.
pub trait Translate {
    fn translate<'a>(&self, message: &'a str) -> Cow<'a, str>;
}

/// Report languages with a month-name locale and a label catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    De,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    /// Accepts plain codes and POSIX style tags such as `de_DE` or `en-GB`.
    pub fn from_str(s: &str) -> Option<Self> {
        let code = s.trim().split(['_', '-', '.']).next()?.to_lowercase();
        match code.as_str() {
            "de" => Some(Language::De),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn locale(&self) -> Locale {
        match self {
            Language::De => Locale::de_DE,
            Language::En => Locale::en_US,
        }
    }

    pub fn month_name(&self, date: NaiveDate) -> String {
        month_name(date, self.locale())
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Translate for Language {
    fn translate<'a>(&self, message: &'a str) -> Cow<'a, str> {
        match self {
            Language::En => Cow::Borrowed(message),
            Language::De => match german(message) {
                Some(translated) => Cow::Borrowed(translated),
                None => Cow::Borrowed(message),
            },
        }
    }
}

/// Full name of the month of `date`, e.g. "März" or "March".
pub fn month_name(date: NaiveDate, locale: Locale) -> String {
    date.format_localized("%B", locale).to_string()
}

fn german(message: &str) -> Option<&'static str> {
    let translated = match message {
        "Account" => "Konto",
        "Currency" => "Währung",
        "Debit Opening Balance" => "EB-Wert Soll",
        "Credit Opening Balance" => "EB-Wert Haben",
        "Debit until {0}" => "Soll bis {0}",
        "Credit until {0}" => "Haben bis {0}",
        "Debit in {0}" => "Soll im {0}",
        "Credit in {0}" => "Haben im {0}",
        "Debit Closing Balance" => "Saldo Soll",
        "Credit Closing Balance" => "Saldo Haben",
        _ => return None,
    };
    Some(translated)
}

/// The ten report columns. `month_name` ends up in the until and in-month labels.
pub fn build_columns(month_name: &str, translator: &dyn Translate) -> Vec<Column> {
    let label = |message: &str| translator.translate(message).replace("{0}", month_name);
    let amount = |fieldname: &'static str, message: &str| Column {
        fieldname,
        label: label(message),
        fieldtype: ColumnType::Currency,
        options: "account_currency",
        width: 170,
    };

    vec![
        Column {
            fieldname: "account",
            label: label("Account"),
            fieldtype: ColumnType::Link,
            options: "Account",
            width: 400,
        },
        Column {
            fieldname: "account_currency",
            label: label("Currency"),
            fieldtype: ColumnType::Link,
            options: "Currency",
            width: 100,
        },
        amount("debit_opening_balance", "Debit Opening Balance"),
        amount("credit_opening_balance", "Credit Opening Balance"),
        amount("debit_until_evaluation_period", "Debit until {0}"),
        amount("credit_until_evaluation_period", "Credit until {0}"),
        amount("debit_in_evaluation_period", "Debit in {0}"),
        amount("credit_in_evaluation_period", "Credit in {0}"),
        amount("debit_closing_balance", "Debit Closing Balance"),
        amount("credit_closing_balance", "Credit Closing Balance"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouting;

    impl Translate for Shouting {
        fn translate<'a>(&self, message: &'a str) -> Cow<'a, str> {
            Cow::Owned(message.to_uppercase())
        }
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str("de"), Some(Language::De));
        assert_eq!(Language::from_str("de_DE.UTF-8"), Some(Language::De));
        assert_eq!(Language::from_str("EN-gb"), Some(Language::En));
        assert_eq!(Language::from_str("fr"), None);
    }

    #[test]
    fn test_month_name_is_localized() {
        let march = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        assert_eq!(Language::De.month_name(march), "März");
        assert_eq!(Language::En.month_name(march), "March");
    }

    #[test]
    fn test_build_columns_english() {
        let columns = build_columns("March", &Language::En);

        let fieldnames: Vec<&str> = columns.iter().map(|c| c.fieldname).collect();
        assert_eq!(
            fieldnames,
            vec![
                "account",
                "account_currency",
                "debit_opening_balance",
                "credit_opening_balance",
                "debit_until_evaluation_period",
                "credit_until_evaluation_period",
                "debit_in_evaluation_period",
                "credit_in_evaluation_period",
                "debit_closing_balance",
                "credit_closing_balance",
            ]
        );
        assert_eq!(columns[4].label, "Debit until March");
        assert_eq!(columns[7].label, "Credit in March");
        assert_eq!(columns[0].fieldtype, ColumnType::Link);
        assert_eq!(columns[0].width, 400);
        assert_eq!(columns[9].options, "account_currency");
    }

    #[test]
    fn test_build_columns_german() {
        let columns = build_columns("März", &Language::De);
        assert_eq!(columns[0].label, "Konto");
        assert_eq!(columns[5].label, "Haben bis März");
        assert_eq!(columns[6].label, "Soll im März");
    }

    #[test]
    fn test_build_columns_custom_translator() {
        let columns = build_columns("May", &Shouting);
        // The month name is inserted after translation.
        assert_eq!(columns[4].label, "DEBIT UNTIL May");
    }
}
