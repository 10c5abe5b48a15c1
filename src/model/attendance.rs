use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Categorical outcome of one employee-day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    EarlyLeave,
    HalfDay,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::EarlyLeave => "Early Leave",
            AttendanceStatus::HalfDay => "Half Day",
        }
    }

    /// One-letter marker used in calendar views.
    pub fn mark(&self) -> char {
        match self {
            AttendanceStatus::Present => 'P',
            AttendanceStatus::Late => 'L',
            AttendanceStatus::Absent => 'A',
            AttendanceStatus::EarlyLeave => 'E',
            AttendanceStatus::HalfDay => 'H',
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OverrideReason {
    Correction,
    Emergency,
    ApprovedLeave,
    SystemError,
    Other,
}

impl OverrideReason {
    pub fn label(&self) -> &'static str {
        match self {
            OverrideReason::Correction => "Time Correction",
            OverrideReason::Emergency => "Emergency Situation",
            OverrideReason::ApprovedLeave => "Approved Leave",
            OverrideReason::SystemError => "System Error",
            OverrideReason::Other => "Other",
        }
    }
}

/// One attendance entry per (employee, date).
///
/// Minute fields are whole minutes. Unless `is_overridden` is set, `status` and the
/// minute fields are what the engine produced from `check_in`/`check_out` at the
/// last mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<DateTime<FixedOffset>>,
    pub status: AttendanceStatus,
    pub working_hours: u32,
    pub late_minutes: u32,
    pub early_leave_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_overridden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<OverrideReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl AttendanceRecord {
    pub fn generate_id() -> String {
        format!("att-{}", uuid::Uuid::new_v4())
    }

    /// Stamps all override metadata at once.
    pub(crate) fn mark_overridden(
        &mut self,
        by: Option<String>,
        reason: OverrideReason,
        notes: Option<String>,
        at: DateTime<FixedOffset>,
    ) {
        self.is_overridden = true;
        self.override_by = by;
        self.override_reason = Some(reason);
        self.override_notes = notes;
        self.override_at = Some(at);
        self.updated_at = at;
    }

    pub(crate) fn append_notes(&mut self, notes: Option<&str>) {
        let Some(extra) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
            return;
        };

        self.notes = Some(match self.notes.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, extra),
            _ => extra.to_string(),
        });
    }
}

/// HR correction of an existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub attendance_id: String,
    #[serde(default)]
    pub check_in: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub check_out: Option<DateTime<FixedOffset>>,
    /// When set, wins over reclassification.
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    pub reason: OverrideReason,
    pub notes: String,
    pub override_by: String,
    /// Appended to the record's plain notes.
    #[serde(default)]
    pub record_notes: Option<String>,
}

/// HR-created record for an arbitrary date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRecordRequest {
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub check_in: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub check_out: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub override_by: Option<String>,
}
