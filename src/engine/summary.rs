use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::summary::{MonthlyAttendanceSummary, TodayStats, YearMonth};

/// Summary of one employee's month, or `None` when there are no records for it.
pub fn monthly_summary(
    records: &[AttendanceRecord],
    employee_id: &str,
    month: YearMonth,
) -> Option<MonthlyAttendanceSummary> {
    let matched: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|r| r.employee_id == employee_id && month.contains(r.date))
        .collect();

    if matched.is_empty() {
        return None;
    }

    let count = |status: AttendanceStatus| matched.iter().filter(|r| r.status == status).count() as u32;
    let total_days = matched.len() as u32;
    let total_working_hours: u64 = matched.iter().map(|r| u64::from(r.working_hours)).sum();
    let attended = matched
        .iter()
        .filter(|r| r.status != AttendanceStatus::Absent)
        .count();

    Some(MonthlyAttendanceSummary {
        employee_id: employee_id.to_string(),
        employee_name: matched[0]
            .employee_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        month,
        total_days,
        present_days: count(AttendanceStatus::Present),
        late_days: count(AttendanceStatus::Late),
        absent_days: count(AttendanceStatus::Absent),
        early_leave_days: count(AttendanceStatus::EarlyLeave),
        half_days: count(AttendanceStatus::HalfDay),
        total_working_hours,
        total_late_minutes: matched.iter().map(|r| u64::from(r.late_minutes)).sum(),
        total_early_leave_minutes: matched
            .iter()
            .map(|r| u64::from(r.early_leave_minutes))
            .sum(),
        average_working_hours: total_working_hours as f64 / f64::from(total_days),
        attendance_percentage: attended as f64 / f64::from(total_days) * 100.0,
    })
}

pub fn day_stats(records: &[AttendanceRecord], day: NaiveDate) -> TodayStats {
    records
        .iter()
        .filter(|r| r.date == day)
        .fold(TodayStats::default(), |mut stats, r| {
            stats.total += 1;
            match r.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::EarlyLeave => stats.early_leave += 1,
                AttendanceStatus::HalfDay => stats.half_day += 1,
            }
            match (r.check_in, r.check_out) {
                (Some(_), None) => stats.checked_in += 1,
                (Some(_), Some(_)) => stats.checked_out += 1,
                _ => {}
            }
            stats
        })
}
