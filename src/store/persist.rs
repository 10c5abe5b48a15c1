use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::data::seed::seed_records;
use crate::model::attendance::AttendanceRecord;
use crate::model::config::AttendanceConfig;
use crate::store::kv::{KeyValueStore, StorageError};

pub const RECORDS_KEY: &str = "hr_attendance_data";
pub const CONFIG_KEY: &str = "hr_attendance_config";

/// Reads and decodes a blob. Corrupt blobs are removed and read as missing.
/// Read failures are returned so callers never overwrite data they could not see.
fn load_blob<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError> {
    let Some(bytes) = kv.get(key).inspect_err(|e| {
        warn!(error = %e, key, "Failed to read attendance storage");
    })?
    else {
        return Ok(None);
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("Discarding corrupt attendance blob '{}': {}", key, e);
            if let Err(e) = kv.remove(key) {
                error!(error = %e, key, "Failed to remove corrupt attendance blob");
            }
            Ok(None)
        }
    }
}

pub fn save<T: Serialize + ?Sized>(kv: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_vec(value)
        .map_err(StorageError::from)
        .and_then(|bytes| kv.set(key, &bytes));

    if let Err(e) = result {
        error!(error = %e, key, "Failed to persist attendance data");
    }
}

pub fn load_config(kv: &dyn KeyValueStore) -> AttendanceConfig {
    load_blob(kv, CONFIG_KEY).ok().flatten().unwrap_or_default()
}

/// Stored records, or freshly generated seed data. Seed data is persisted only when
/// the blob was missing or corrupt, never after a failed read.
pub fn load_records(
    kv: &dyn KeyValueStore,
    now: DateTime<FixedOffset>,
    config: &AttendanceConfig,
) -> Vec<AttendanceRecord> {
    let persist_seed = match load_blob(kv, RECORDS_KEY) {
        Ok(Some(records)) => return records,
        Ok(None) => true,
        Err(_) => false,
    };

    let records = seed_records(now, config, &mut rand::thread_rng());
    if persist_seed {
        save(kv, RECORDS_KEY, &records);
    } else {
        warn!("Using seed data for this session; stored records left untouched");
    }
    records
}
