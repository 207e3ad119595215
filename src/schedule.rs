//! Pure date calculations: next occurrence for a recurrence period and the
//! early-reminder date derived from it. Both take an explicit anchor date so
//! the engine never reads the wall clock inside a calculation.

use chrono::{Duration, Months, NaiveDate};

use crate::error::ScheduleError;
use crate::models::alert::AlertPeriod;

pub const MIN_EARLY_OFFSET_DAYS: i32 = 1;
pub const MAX_EARLY_OFFSET_DAYS: i32 = 365;

/// Next occurrence date for a period, anchored at `from`.
///
/// Fixed periods are plain calendar arithmetic on the anchor. A `custom`
/// period ignores the anchor entirely: its single occurrence is one month
/// before the contract end date. That date may already lie in the past, in
/// which case the alert is simply immediately due — no correction is applied.
pub fn next_occurrence(
    period: AlertPeriod,
    end_date: Option<NaiveDate>,
    from: NaiveDate,
) -> Result<NaiveDate, ScheduleError> {
    match period.months() {
        Some(months) => Ok(from + Months::new(months)),
        None => {
            let end = end_date.ok_or(ScheduleError::MissingEndDate)?;
            Ok(end - Months::new(1))
        }
    }
}

/// Early-reminder date: `occurrence - offset_days`, or `None` when early
/// reminders are off.
///
/// The offset is re-validated to [1, 365] on every use. An out-of-range value
/// is an error for the caller to surface (the engine disables the early
/// reminder with a warning); it is never silently clamped.
pub fn early_reminder_date(
    occurrence: NaiveDate,
    offset_days: i32,
    enabled: bool,
) -> Result<Option<NaiveDate>, ScheduleError> {
    if !enabled {
        return Ok(None);
    }
    if !(MIN_EARLY_OFFSET_DAYS..=MAX_EARLY_OFFSET_DAYS).contains(&offset_days) {
        return Err(ScheduleError::InvalidOffset(offset_days));
    }
    Ok(Some(occurrence - Duration::days(i64::from(offset_days))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn one_month_from_mid_january() {
        let next = next_occurrence(AlertPeriod::OneMonth, None, d(2024, 1, 15)).unwrap();
        assert_eq!(next, d(2024, 2, 15));
    }

    #[test]
    fn twelve_chained_months_do_not_drift() {
        let mut anchor = d(2024, 1, 15);
        for i in 1..=12u32 {
            anchor = next_occurrence(AlertPeriod::OneMonth, None, anchor).unwrap();
            let expected_month = (1 + i - 1) % 12 + 1;
            assert_eq!(anchor.day(), 15, "iteration {i}");
            assert_eq!(anchor.month(), expected_month, "iteration {i}");
        }
        assert_eq!(anchor, d(2025, 1, 15));
    }

    #[test]
    fn month_end_clamps_instead_of_overflowing() {
        let next = next_occurrence(AlertPeriod::OneMonth, None, d(2024, 1, 31)).unwrap();
        assert_eq!(next, d(2024, 2, 29));
    }

    #[test]
    fn fixed_year_periods() {
        let anchor = d(2024, 3, 1);
        assert_eq!(
            next_occurrence(AlertPeriod::OneYear, None, anchor).unwrap(),
            d(2025, 3, 1)
        );
        assert_eq!(
            next_occurrence(AlertPeriod::TwoYears, None, anchor).unwrap(),
            d(2026, 3, 1)
        );
        assert_eq!(
            next_occurrence(AlertPeriod::ThreeYears, None, anchor).unwrap(),
            d(2027, 3, 1)
        );
        assert_eq!(
            next_occurrence(AlertPeriod::ThreeMonths, None, anchor).unwrap(),
            d(2024, 6, 1)
        );
    }

    #[test]
    fn custom_period_is_one_month_before_end_date() {
        // The anchor must not influence the result.
        for anchor in [d(2020, 1, 1), d(2030, 1, 1)] {
            let next =
                next_occurrence(AlertPeriod::Custom, Some(d(2025, 9, 24)), anchor).unwrap();
            assert_eq!(next, d(2025, 8, 24));
        }
    }

    #[test]
    fn custom_period_requires_end_date() {
        assert_eq!(
            next_occurrence(AlertPeriod::Custom, None, d(2025, 1, 1)),
            Err(ScheduleError::MissingEndDate)
        );
    }

    #[test]
    fn sixty_day_early_reminder() {
        let early = early_reminder_date(d(2025, 8, 24), 60, true).unwrap();
        assert_eq!(early, Some(d(2025, 6, 25)));
    }

    #[test]
    fn disabled_early_reminder_is_none() {
        assert_eq!(early_reminder_date(d(2025, 8, 24), 60, false).unwrap(), None);
    }

    #[test]
    fn offset_bounds_are_enforced() {
        assert_eq!(
            early_reminder_date(d(2025, 8, 24), 0, true),
            Err(ScheduleError::InvalidOffset(0))
        );
        assert_eq!(
            early_reminder_date(d(2025, 8, 24), 366, true),
            Err(ScheduleError::InvalidOffset(366))
        );
        assert!(early_reminder_date(d(2025, 8, 24), 1, true).is_ok());
        assert!(early_reminder_date(d(2025, 8, 24), 365, true).is_ok());
    }
}
