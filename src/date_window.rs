//! Month boundary math for activity queries.

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A calendar month as picked in the date range UI. `month_index` is
/// zero-based (0 = January); values past 11 roll into following years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSelection {
    pub year: i32,
    pub month_index: u32,
}

impl MonthSelection {
    pub fn new(year: i32, month_index: u32) -> Self {
        Self { year, month_index }
    }

    fn first_day(self) -> Option<NaiveDate> {
        let year = self.year.checked_add(i32::try_from(self.month_index / 12).ok()?)?;
        NaiveDate::from_ymd_opt(year, self.month_index % 12 + 1, 1)
    }
}

/// Unix seconds at a month boundary.
///
/// The start boundary is UTC midnight on the 1st. The end boundary is day 0
/// of the following month, i.e. UTC midnight on the month's last day, which
/// handles month lengths and leap years without a table.
pub fn month_boundary_unix_time(selection: MonthSelection, is_end: bool) -> Result<i64> {
    let first = selection
        .first_day()
        .with_context(|| format!("Invalid month selection: {:?}", selection))?;

    let date = if is_end {
        first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .with_context(|| format!("Month end out of range: {:?}", selection))?
    } else {
        first
    };

    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("Failed to build midnight timestamp")?;
    Ok(Utc.from_utc_datetime(&midnight).timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_month() {
        // 2024-02-01T00:00:00Z
        assert_eq!(month_boundary_unix_time(MonthSelection::new(2024, 1), false).unwrap(), 1706745600);
    }

    #[test]
    fn test_end_of_february_leap_year() {
        // 2024-02-29T00:00:00Z
        assert_eq!(month_boundary_unix_time(MonthSelection::new(2024, 1), true).unwrap(), 1709164800);
    }

    #[test]
    fn test_end_of_february_common_year() {
        // 2023-02-28T00:00:00Z
        assert_eq!(month_boundary_unix_time(MonthSelection::new(2023, 1), true).unwrap(), 1677542400);
    }

    #[test]
    fn test_end_of_december_rolls_year() {
        // 2023-12-31T00:00:00Z
        assert_eq!(month_boundary_unix_time(MonthSelection::new(2023, 11), true).unwrap(), 1703980800);
    }

    #[test]
    fn test_month_index_overflow() {
        assert_eq!(
            month_boundary_unix_time(MonthSelection::new(2023, 12), false).unwrap(),
            month_boundary_unix_time(MonthSelection::new(2024, 0), false).unwrap()
        );
    }

    #[test]
    fn test_invalid_year() {
        assert!(month_boundary_unix_time(MonthSelection::new(i32::MAX, 0), false).is_err());
    }
}
