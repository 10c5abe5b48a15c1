use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Work schedule used by the attendance engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceConfig {
    #[serde(with = "hhmm")]
    pub work_start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub work_end_time: NaiveTime,
    /// Grace period after the scheduled start.
    pub late_threshold_minutes: u32,
    pub early_leave_threshold_minutes: u32,
    /// Below this many hours of work a day counts as a half-day.
    pub min_working_hours: f64,
    pub break_duration_minutes: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            work_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            work_end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            late_threshold_minutes: 15,
            early_leave_threshold_minutes: 30,
            min_working_hours: 4.0,
            break_duration_minutes: 60,
        }
    }
}

impl AttendanceConfig {
    pub fn min_working_minutes(&self) -> f64 {
        self.min_working_hours * 60.0
    }

    pub fn merge(&self, patch: &AttendanceConfigPatch) -> Self {
        Self {
            work_start_time: patch.work_start_time.unwrap_or(self.work_start_time),
            work_end_time: patch.work_end_time.unwrap_or(self.work_end_time),
            late_threshold_minutes: patch
                .late_threshold_minutes
                .unwrap_or(self.late_threshold_minutes),
            early_leave_threshold_minutes: patch
                .early_leave_threshold_minutes
                .unwrap_or(self.early_leave_threshold_minutes),
            min_working_hours: patch.min_working_hours.unwrap_or(self.min_working_hours),
            break_duration_minutes: patch
                .break_duration_minutes
                .unwrap_or(self.break_duration_minutes),
        }
    }
}

/// Partial update for [`AttendanceConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceConfigPatch {
    #[serde(default, with = "hhmm::option")]
    pub work_start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option")]
    pub work_end_time: Option<NaiveTime>,
    pub late_threshold_minutes: Option<u32>,
    pub early_leave_threshold_minutes: Option<u32>,
    pub min_working_hours: Option<f64>,
    pub break_duration_minutes: Option<u32>,
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value.trim(), FORMAT)
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| D::Error::custom(format!("invalid HH:mm time '{}': {}", raw, e)))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    super::parse(&raw).map_err(|e| {
                        D::Error::custom(format!("invalid HH:mm time '{}': {}", raw, e))
                    })
                })
                .transpose()
        }
    }
}
