use chrono::{DateTime, Duration, FixedOffset};

use crate::model::config::AttendanceConfig;

/// Minutes between check-in and check-out minus the break. Zero when either is missing.
pub fn working_hours(
    check_in: Option<DateTime<FixedOffset>>,
    check_out: Option<DateTime<FixedOffset>>,
    break_minutes: u32,
) -> u32 {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return 0;
    };

    let worked = floor_minutes(check_out - check_in) - i64::from(break_minutes);
    clamp_minutes(worked)
}

/// Minutes past the scheduled start plus the grace period, on the check-in's own date.
pub fn late_minutes(check_in: DateTime<FixedOffset>, config: &AttendanceConfig) -> u32 {
    let local = check_in.naive_local();
    let boundary = local.date().and_time(config.work_start_time)
        + Duration::minutes(i64::from(config.late_threshold_minutes));

    if local <= boundary {
        return 0;
    }
    clamp_minutes(floor_minutes(local - boundary))
}

/// Minutes before the scheduled end minus the early-leave threshold, on the check-out's own date.
pub fn early_leave_minutes(check_out: DateTime<FixedOffset>, config: &AttendanceConfig) -> u32 {
    let local = check_out.naive_local();
    let boundary = local.date().and_time(config.work_end_time)
        - Duration::minutes(i64::from(config.early_leave_threshold_minutes));

    if local >= boundary {
        return 0;
    }
    clamp_minutes(floor_minutes(boundary - local))
}

fn floor_minutes(d: Duration) -> i64 {
    d.num_seconds().div_euclid(60)
}

fn clamp_minutes(minutes: i64) -> u32 {
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}
