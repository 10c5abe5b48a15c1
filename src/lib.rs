//! Attendance rules engine and record store for the HR dashboard.
//!
//! [`engine`] holds the pure rules (time arithmetic, status classification, monthly
//! summaries and the calendar grid). [`store::AttendanceStore`] owns the record
//! collection and applies check-in, check-out, override and manual-entry operations
//! on top of a pluggable [`store::kv::KeyValueStore`].

pub mod data;
pub mod engine;
pub mod model;
pub mod store;
pub mod utils;

pub use model::attendance::{
    AttendanceRecord, AttendanceStatus, ManualRecordRequest, OverrideReason, OverrideRequest,
};
pub use model::config::{AttendanceConfig, AttendanceConfigPatch};
pub use model::summary::{CalendarDay, MonthlyAttendanceSummary, TodayStats, YearMonth};
pub use store::{AttendanceStore, StoreOptions};
