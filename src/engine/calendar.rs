use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::model::attendance::AttendanceRecord;
use crate::model::summary::{CalendarDay, YearMonth};

/// Six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// Builds the Sunday-first month grid, padded with the neighbouring months.
///
/// Cells are annotated with the matching record only when `employee_id` is given.
pub fn calendar_grid(
    month: YearMonth,
    today: NaiveDate,
    records: &[AttendanceRecord],
    employee_id: Option<&str>,
) -> Vec<CalendarDay> {
    let first = month.first_day();
    let leading = u64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(leading)).unwrap_or(first);

    start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| {
            let is_current_month = month.contains(date);
            CalendarDay {
                date,
                day_of_month: date.day(),
                is_current_month,
                is_today: is_current_month && date == today,
                is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                attendance: employee_id.and_then(|id| {
                    records
                        .iter()
                        .find(|r| r.employee_id == id && r.date == date)
                        .cloned()
                }),
            }
        })
        .collect()
}
