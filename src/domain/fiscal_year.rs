use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Identifier such as "2023" or "2023/24".
    pub name: String,
    pub year_start_date: NaiveDate,
    pub year_end_date: NaiveDate,
}

impl FiscalYear {
    pub fn new(
        name: impl Into<String>,
        year_start_date: NaiveDate,
        year_end_date: NaiveDate,
    ) -> Result<Self, PeriodError> {
        if year_end_date < year_start_date {
            return Err(PeriodError::EndBeforeStart {
                start: year_start_date,
                end: year_end_date,
            });
        }
        Ok(Self {
            name: name.into(),
            year_start_date,
            year_end_date,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid month {0}: expected a value between 1 and 12")]
    InvalidMonth(u32),

    #[error("Month {month} does not form a valid date in year {year}")]
    InvalidDate { year: i32, month: u32 },

    #[error("Fiscal year ends ({end}) before it starts ({start})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// The three date windows a trial balance is computed over.
///
/// * opening: everything posted before `fy_start`
/// * until: `fy_start <= date < month_start`
/// * in month: `month_start <= date <= month_end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPeriod {
    pub fy_start: NaiveDate,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
}

impl EvaluationPeriod {
    /// Resolve the evaluation month within a fiscal year.
    ///
    /// The month is placed in the calendar year of the fiscal year start; it
    /// does not roll over into the following year for fiscal years that span
    /// a year boundary.
    pub fn resolve(month: u32, fiscal_year: &FiscalYear) -> Result<Self, PeriodError> {
        Self::from_start(month, fiscal_year.year_start_date)
    }

    pub fn from_start(month: u32, fy_start: NaiveDate) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        let year = fy_start.year();
        let invalid = || PeriodError::InvalidDate { year, month };

        let month_start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_month_start = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let month_end = next_month_start
            .and_then(|d| d.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self {
            fy_start,
            month_start,
            month_end,
        })
    }

    pub fn is_opening(&self, date: NaiveDate) -> bool {
        date < self.fy_start
    }

    pub fn is_until_month(&self, date: NaiveDate) -> bool {
        date >= self.fy_start && date < self.month_start
    }

    pub fn is_in_month(&self, date: NaiveDate) -> bool {
        date >= self.month_start && date <= self.month_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fy(start: NaiveDate, end: NaiveDate) -> FiscalYear {
        FiscalYear::new("FY", start, end).unwrap()
    }

    #[test]
    fn test_resolve_calendar_fiscal_year() {
        let fiscal_year = fy(date(2023, 1, 1), date(2023, 12, 31));
        let period = EvaluationPeriod::resolve(3, &fiscal_year).unwrap();

        assert_eq!(period.fy_start, date(2023, 1, 1));
        assert_eq!(period.month_start, date(2023, 3, 1));
        assert_eq!(period.month_end, date(2023, 3, 31));
    }

    #[test]
    fn test_resolve_month_end_handles_leap_years_and_december() {
        let leap = EvaluationPeriod::from_start(2, date(2024, 1, 1)).unwrap();
        assert_eq!(leap.month_end, date(2024, 2, 29));

        let common = EvaluationPeriod::from_start(2, date(2023, 1, 1)).unwrap();
        assert_eq!(common.month_end, date(2023, 2, 28));

        let december = EvaluationPeriod::from_start(12, date(2023, 1, 1)).unwrap();
        assert_eq!(december.month_start, date(2023, 12, 1));
        assert_eq!(december.month_end, date(2023, 12, 31));
    }

    #[test]
    fn test_resolve_keeps_start_year_for_shifted_fiscal_year() {
        let fiscal_year = fy(date(2023, 7, 1), date(2024, 6, 30));
        let period = EvaluationPeriod::resolve(9, &fiscal_year).unwrap();
        assert_eq!(period.month_start, date(2023, 9, 1));

        let period = EvaluationPeriod::resolve(2, &fiscal_year).unwrap();
        assert_eq!(period.month_start, date(2023, 2, 1));
    }

    #[test]
    fn test_resolve_rejects_invalid_month() {
        let fiscal_year = fy(date(2023, 1, 1), date(2023, 12, 31));
        assert_eq!(
            EvaluationPeriod::resolve(0, &fiscal_year),
            Err(PeriodError::InvalidMonth(0))
        );
        assert_eq!(
            EvaluationPeriod::resolve(13, &fiscal_year),
            Err(PeriodError::InvalidMonth(13))
        );
    }

    #[test]
    fn test_fiscal_year_rejects_end_before_start() {
        let result = FiscalYear::new("bad", date(2023, 12, 31), date(2023, 1, 1));
        assert!(matches!(result, Err(PeriodError::EndBeforeStart { .. })));
    }

    #[test]
    fn test_windows_partition_dates() {
        let period = EvaluationPeriod::from_start(3, date(2023, 1, 1)).unwrap();

        assert!(period.is_opening(date(2022, 12, 31)));
        assert!(!period.is_opening(date(2023, 1, 1)));

        assert!(period.is_until_month(date(2023, 1, 1)));
        assert!(period.is_until_month(date(2023, 2, 28)));
        assert!(!period.is_until_month(date(2023, 3, 1)));

        assert!(period.is_in_month(date(2023, 3, 1)));
        assert!(period.is_in_month(date(2023, 3, 31)));
        assert!(!period.is_in_month(date(2023, 4, 1)));
    }
}
