use chrono::{DateTime, FixedOffset};

use crate::engine::time::{early_leave_minutes, late_minutes, working_hours};
use crate::model::attendance::AttendanceStatus;
use crate::model::config::AttendanceConfig;

/// Status and minute fields derived from a pair of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub status: AttendanceStatus,
    pub working_hours: u32,
    pub late_minutes: u32,
    pub early_leave_minutes: u32,
}

/// Half-day is checked first, then early-leave, then late.
pub fn classify(
    check_in: Option<DateTime<FixedOffset>>,
    check_out: Option<DateTime<FixedOffset>>,
    config: &AttendanceConfig,
) -> AttendanceStatus {
    assess(check_in, check_out, config).status
}

pub fn assess(
    check_in: Option<DateTime<FixedOffset>>,
    check_out: Option<DateTime<FixedOffset>>,
    config: &AttendanceConfig,
) -> Assessment {
    let (check_in, check_out) = match (check_in, check_out) {
        (None, None) => return Assessment::without_times(AttendanceStatus::Absent),
        (Some(i), Some(o)) => (i, o),
        _ => return Assessment::without_times(AttendanceStatus::HalfDay),
    };

    let worked = working_hours(Some(check_in), Some(check_out), config.break_duration_minutes);
    let late = late_minutes(check_in, config);
    let early = early_leave_minutes(check_out, config);

    let status = if f64::from(worked) < config.min_working_minutes() {
        AttendanceStatus::HalfDay
    } else if early > 0 {
        AttendanceStatus::EarlyLeave
    } else if late > 0 {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };

    Assessment {
        status,
        working_hours: worked,
        late_minutes: late,
        early_leave_minutes: early,
    }
}

/// Fields of a day that has a check-in and no check-out yet.
pub fn assess_checked_in(check_in: DateTime<FixedOffset>, config: &AttendanceConfig) -> Assessment {
    let late = late_minutes(check_in, config);
    Assessment {
        status: if late > 0 {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        },
        working_hours: 0,
        late_minutes: late,
        early_leave_minutes: 0,
    }
}

impl Assessment {
    fn without_times(status: AttendanceStatus) -> Self {
        Self {
            status,
            working_hours: 0,
            late_minutes: 0,
            early_leave_minutes: 0,
        }
    }
}
