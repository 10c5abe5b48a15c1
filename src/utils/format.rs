use chrono::{DateTime, FixedOffset};
use strum::IntoEnumIterator;

use crate::model::attendance::AttendanceStatus;

/// `HH:mm` in the timestamp's own offset, `--:--` when absent.
pub fn format_time(timestamp: Option<DateTime<FixedOffset>>) -> String {
    match timestamp {
        Some(t) => t.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Minutes as `0m`, `45m`, `8h` or `7h 30m`.
pub fn format_duration(minutes: u32) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Key for the calendar markers, e.g. `P present  L late ...`.
pub fn status_legend() -> String {
    AttendanceStatus::iter()
        .map(|status| format!("{} {}", status.mark(), status.label().to_lowercase()))
        .collect::<Vec<_>>()
        .join("  ")
}
