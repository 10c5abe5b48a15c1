use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::engine::{Assessment, assess, assess_checked_in};
use crate::model::attendance::AttendanceRecord;
use crate::model::config::AttendanceConfig;
use crate::model::employee::Employee;
use crate::model::summary::YearMonth;

/// Demo roster used to populate a first run.
pub static ROSTER: Lazy<Vec<Employee>> = Lazy::new(|| {
    [
        "Alice Thompson",
        "Bob Martinez",
        "Carol Williams",
        "Daniel Lee",
        "Eva Rodriguez",
        "Frank Anderson",
        "Grace Kim",
        "Henry Taylor",
        "Isabella Garcia",
        "James Wilson",
        "Karen White",
        "Liam Johnson",
        "Mia Brown",
        "Noah Davis",
        "Olivia Moore",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Employee::new(format!("emp-{}", i + 1), *name))
    .collect()
});

pub fn find_employee(id: &str) -> Option<&'static Employee> {
    ROSTER.iter().find(|e| e.id == id)
}

/// History for the current and previous month plus the demo records for today.
pub fn seed_records<R: Rng + ?Sized>(
    now: DateTime<FixedOffset>,
    config: &AttendanceConfig,
    rng: &mut R,
) -> Vec<AttendanceRecord> {
    let today = now.date_naive();
    let offset = *now.offset();
    let current = YearMonth::of(today);

    let mut records = Vec::new();
    for employee in ROSTER.iter() {
        for month in [current, current.previous()] {
            records.extend(employee_history(employee, month, today, offset, config, rng));
        }
    }
    records.extend(today_records(today, offset, config));

    log::info!(
        "Attendance seed generated: {} records for {} employees",
        records.len(),
        ROSTER.len()
    );
    records
}

/// Weekdays of `month` strictly before `today`.
fn employee_history<R: Rng + ?Sized>(
    employee: &Employee,
    month: YearMonth,
    today: NaiveDate,
    offset: FixedOffset,
    config: &AttendanceConfig,
    rng: &mut R,
) -> Vec<AttendanceRecord> {
    month
        .first_day()
        .iter_days()
        .take_while(|d| month.contains(*d) && *d < today)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|date| {
            let (check_in, check_out) = match rng.gen_range(0.0..1.0) {
                p if p < 0.03 => (None, None),
                p if p < 0.08 => (
                    Some(stamp(date, 9, rng.gen_range(16..60), offset)),
                    Some(stamp(date, 17, rng.gen_range(0..60), offset)),
                ),
                p if p < 0.10 => (
                    Some(stamp(date, 8, rng.gen_range(45..60), offset)),
                    Some(stamp(date, rng.gen_range(14..16), rng.gen_range(30..60), offset)),
                ),
                _ => (
                    Some(stamp(date, 8, rng.gen_range(45..60), offset)),
                    Some(stamp(date, 17, rng.gen_range(0..30), offset)),
                ),
            };
            let assessment = assess(check_in, check_out, config);
            build(
                AttendanceRecord::generate_id(),
                employee,
                date,
                check_in,
                check_out,
                assessment,
                offset,
            )
        })
        .collect()
}

fn today_records(
    today: NaiveDate,
    offset: FixedOffset,
    config: &AttendanceConfig,
) -> Vec<AttendanceRecord> {
    ROSTER
        .iter()
        .enumerate()
        .map(|(index, employee)| {
            let (check_in, check_out) = match index {
                0..=4 => (Some(stamp(today, 8, 55, offset)), Some(stamp(today, 17, 5, offset))),
                5..=9 => (Some(stamp(today, 8, 55, offset)), None),
                10..=11 => (Some(stamp(today, 9, 35, offset)), None),
                12..=13 => (None, None),
                _ => (Some(stamp(today, 8, 50, offset)), Some(stamp(today, 15, 30, offset))),
            };
            let assessment = match (check_in, check_out) {
                (Some(i), None) => assess_checked_in(i, config),
                _ => assess(check_in, check_out, config),
            };
            build(
                format!("att-today-{}", employee.id),
                employee,
                today,
                check_in,
                check_out,
                assessment,
                offset,
            )
        })
        .collect()
}

fn build(
    id: String,
    employee: &Employee,
    date: NaiveDate,
    check_in: Option<DateTime<FixedOffset>>,
    check_out: Option<DateTime<FixedOffset>>,
    assessment: Assessment,
    offset: FixedOffset,
) -> AttendanceRecord {
    let created_at = check_in.unwrap_or_else(|| stamp(date, 8, 0, offset));
    let updated_at = check_out.unwrap_or(created_at);

    AttendanceRecord {
        id,
        employee_id: employee.id.clone(),
        employee_name: Some(employee.name.clone()),
        date,
        check_in,
        check_out,
        status: assessment.status,
        working_hours: assessment.working_hours,
        late_minutes: assessment.late_minutes,
        early_leave_minutes: assessment.early_leave_minutes,
        notes: None,
        is_overridden: false,
        override_by: None,
        override_reason: None,
        override_notes: None,
        override_at: None,
        created_at,
        updated_at,
    }
}

fn stamp(date: NaiveDate, hour: u32, minute: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = date
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::default()));
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}
