//! Session context owning the attendance records, the work schedule and the
//! current selection. Mutations wait out a simulated latency, then read, modify
//! and persist the collection under one lock.

pub mod clock;
pub mod kv;
pub mod persist;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::engine::{
    self, assess, assess_checked_in, early_leave_minutes, working_hours,
};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, ManualRecordRequest, OverrideReason, OverrideRequest,
};
use crate::model::config::{AttendanceConfig, AttendanceConfigPatch};
use crate::model::summary::{CalendarDay, MonthlyAttendanceSummary, TodayStats, YearMonth};

use clock::Clock;
use kv::KeyValueStore;
use persist::{CONFIG_KEY, RECORDS_KEY};

pub const MANUAL_ENTRY_NOTES: &str = "Manual entry by HR";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Delay before a record mutation commits. Config updates and refreshes wait 3/5 of it.
    pub latency: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
        }
    }
}

impl StoreOptions {
    pub fn immediate() -> Self {
        Self {
            latency: Duration::ZERO,
        }
    }

    fn short_latency(&self) -> Duration {
        self.latency * 3 / 5
    }
}

#[derive(Debug)]
struct AttendanceState {
    records: Vec<AttendanceRecord>,
    config: AttendanceConfig,
    selected_date: NaiveDate,
    selected_employee_id: Option<String>,
    selected_month: YearMonth,
}

impl AttendanceState {
    fn position(&self, employee_id: &str, date: NaiveDate) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.employee_id == employee_id && r.date == date)
    }
}

/// Counts in-flight mutations for [`AttendanceStore::is_loading`].
struct Loading<'a>(&'a AtomicUsize);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AttendanceStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    options: StoreOptions,
    state: Mutex<AttendanceState>,
    in_flight: AtomicUsize,
}

impl AttendanceStore {
    /// Loads config and records from `kv`, falling back to defaults and seed data.
    pub fn open(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, options: StoreOptions) -> Self {
        let now = clock.now();
        let config = persist::load_config(kv.as_ref());
        let records = persist::load_records(kv.as_ref(), now, &config);
        let today = now.date_naive();

        info!(records = records.len(), "Attendance store opened");

        Self {
            kv,
            clock,
            options,
            state: Mutex::new(AttendanceState {
                records,
                config,
                selected_date: today,
                selected_employee_id: None,
                selected_month: YearMonth::of(today),
            }),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AttendanceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self, latency: Duration) -> Loading<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let loading = Loading(&self.in_flight);
        if !latency.is_zero() {
            actix_rt::time::sleep(latency).await;
        }
        loading
    }

    fn persist_records(&self, records: &[AttendanceRecord]) {
        persist::save(self.kv.as_ref(), RECORDS_KEY, records);
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // ============================
    // CHECK-IN / CHECK-OUT
    // ============================

    /// Checks the employee in for today. `None` if today's record already has a check-in.
    pub async fn check_in(
        &self,
        employee_id: &str,
        employee_name: &str,
        notes: Option<&str>,
    ) -> Option<AttendanceRecord> {
        let _loading = self.simulate_latency(self.options.latency).await;

        let now = self.clock.now();
        let today = now.date_naive();
        let mut state = self.lock();
        let existing = state.position(employee_id, today);

        if let Some(idx) = existing {
            if state.records[idx].check_in.is_some() {
                debug!(employee_id, "Already checked in today");
                return None;
            }
        }

        let assessment = assess_checked_in(now, &state.config);
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        let record = match existing {
            Some(idx) => {
                let record = &mut state.records[idx];
                record.check_in = Some(now);
                record.status = assessment.status;
                record.late_minutes = assessment.late_minutes;
                record.updated_at = now;
                if let Some(notes) = notes {
                    record.notes = Some(notes.to_string());
                }
                record.clone()
            }
            None => {
                let record = AttendanceRecord {
                    id: AttendanceRecord::generate_id(),
                    employee_id: employee_id.to_string(),
                    employee_name: Some(employee_name.to_string()),
                    date: today,
                    check_in: Some(now),
                    check_out: None,
                    status: assessment.status,
                    working_hours: 0,
                    late_minutes: assessment.late_minutes,
                    early_leave_minutes: 0,
                    notes: notes.map(str::to_string),
                    is_overridden: false,
                    override_by: None,
                    override_reason: None,
                    override_notes: None,
                    override_at: None,
                    created_at: now,
                    updated_at: now,
                };
                state.records.push(record.clone());
                record
            }
        };

        self.persist_records(&state.records);
        info!(
            employee_id,
            record_id = %record.id,
            status = %record.status,
            late_minutes = record.late_minutes,
            "Checked in"
        );
        Some(record)
    }

    /// Checks the employee out for today. `None` without a prior check-in or after a check-out.
    pub async fn check_out(&self, employee_id: &str, notes: Option<&str>) -> Option<AttendanceRecord> {
        let _loading = self.simulate_latency(self.options.latency).await;

        let now = self.clock.now();
        let mut state = self.lock();
        let Some(idx) = state.position(employee_id, now.date_naive()) else {
            debug!(employee_id, "No attendance record for today");
            return None;
        };

        let config = state.config.clone();
        let record = &mut state.records[idx];
        let Some(check_in) = record.check_in else {
            debug!(employee_id, record_id = %record.id, "Check-out without check-in");
            return None;
        };
        if record.check_out.is_some() {
            debug!(employee_id, record_id = %record.id, "Already checked out today");
            return None;
        }

        let early = early_leave_minutes(now, &config);
        let worked = working_hours(Some(check_in), Some(now), config.break_duration_minutes);

        if early > 0 {
            record.status = AttendanceStatus::EarlyLeave;
        } else if f64::from(worked) < config.min_working_minutes() {
            record.status = AttendanceStatus::HalfDay;
        }
        record.check_out = Some(now);
        record.working_hours = worked;
        record.early_leave_minutes = early;
        record.updated_at = now;
        record.append_notes(notes);

        let record = record.clone();
        self.persist_records(&state.records);
        info!(
            employee_id,
            record_id = %record.id,
            status = %record.status,
            working_hours = record.working_hours,
            "Checked out"
        );
        Some(record)
    }

    // ============================
    // MANUAL OVERRIDE (HR)
    // ============================

    /// Applies an HR correction. `None` if the record id is unknown.
    ///
    /// A status supplied by the caller is kept even when the times imply another one.
    pub async fn override_record(&self, request: OverrideRequest) -> Option<AttendanceRecord> {
        let _loading = self.simulate_latency(self.options.latency).await;

        let now = self.clock.now();
        let mut state = self.lock();
        let config = state.config.clone();
        let Some(record) = state
            .records
            .iter_mut()
            .find(|r| r.id == request.attendance_id)
        else {
            debug!(record_id = %request.attendance_id, "Override target not found");
            return None;
        };

        record.check_in = request.check_in.or(record.check_in);
        record.check_out = request.check_out.or(record.check_out);

        if record.check_in.is_some() && record.check_out.is_some() {
            let assessment = assess(record.check_in, record.check_out, &config);
            record.working_hours = assessment.working_hours;
            record.late_minutes = assessment.late_minutes;
            record.early_leave_minutes = assessment.early_leave_minutes;
            record.status = request.status.unwrap_or(assessment.status);
        } else if let Some(status) = request.status {
            record.status = status;
        }

        record.append_notes(request.record_notes.as_deref());
        record.mark_overridden(
            Some(request.override_by.clone()),
            request.reason,
            Some(request.notes.clone()),
            now,
        );

        let record = record.clone();
        self.persist_records(&state.records);
        info!(
            record_id = %record.id,
            override_by = %request.override_by,
            reason = %request.reason,
            status = %record.status,
            "Attendance overridden"
        );
        Some(record)
    }

    /// Inserts an HR-authored record. No duplicate check is made against the same employee-day.
    pub async fn create_manual_record(&self, request: ManualRecordRequest) -> AttendanceRecord {
        let _loading = self.simulate_latency(self.options.latency).await;

        let now = self.clock.now();
        let mut state = self.lock();
        let assessment = assess(request.check_in, request.check_out, &state.config);
        let both_times = request.check_in.is_some() && request.check_out.is_some();

        let mut record = AttendanceRecord {
            id: AttendanceRecord::generate_id(),
            employee_id: request.employee_id,
            employee_name: Some(request.employee_name),
            date: request.date,
            check_in: request.check_in,
            check_out: request.check_out,
            status: request.status.unwrap_or(if both_times {
                assessment.status
            } else {
                AttendanceStatus::Absent
            }),
            working_hours: if both_times { assessment.working_hours } else { 0 },
            late_minutes: if both_times { assessment.late_minutes } else { 0 },
            early_leave_minutes: if both_times {
                assessment.early_leave_minutes
            } else {
                0
            },
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            is_overridden: false,
            override_by: None,
            override_reason: None,
            override_notes: None,
            override_at: None,
            created_at: now,
            updated_at: now,
        };
        record.mark_overridden(
            request.override_by,
            OverrideReason::Correction,
            Some(MANUAL_ENTRY_NOTES.to_string()),
            now,
        );

        if state.position(&record.employee_id, record.date).is_some() {
            warn!(
                employee_id = %record.employee_id,
                date = %record.date,
                "Manual record duplicates an existing employee-day"
            );
        }

        state.records.push(record.clone());
        self.persist_records(&state.records);
        info!(
            record_id = %record.id,
            employee_id = %record.employee_id,
            date = %record.date,
            "Manual attendance record created"
        );
        record
    }

    // ============================
    // CONFIGURATION
    // ============================

    pub async fn update_config(&self, patch: AttendanceConfigPatch) -> AttendanceConfig {
        let _loading = self.simulate_latency(self.options.short_latency()).await;

        let mut state = self.lock();
        state.config = state.config.merge(&patch);
        persist::save(self.kv.as_ref(), CONFIG_KEY, &state.config);
        info!(config = ?state.config, "Attendance config updated");
        state.config.clone()
    }

    pub fn config(&self) -> AttendanceConfig {
        self.lock().config.clone()
    }

    // ============================
    // SELECTION
    // ============================

    pub fn set_selected_date(&self, date: NaiveDate) {
        self.lock().selected_date = date;
    }

    pub fn set_selected_employee(&self, employee_id: Option<&str>) {
        self.lock().selected_employee_id = employee_id.map(str::to_string);
    }

    pub fn set_selected_month(&self, month: YearMonth) {
        self.lock().selected_month = month;
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.lock().selected_date
    }

    pub fn selected_employee_id(&self) -> Option<String> {
        self.lock().selected_employee_id.clone()
    }

    pub fn selected_month(&self) -> YearMonth {
        self.lock().selected_month
    }

    // ============================
    // DATA MANAGEMENT
    // ============================

    pub fn record_by_employee_and_date(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Option<AttendanceRecord> {
        let state = self.lock();
        state.position(employee_id, date).map(|idx| state.records[idx].clone())
    }

    pub fn is_checked_in(&self, employee_id: &str) -> bool {
        self.record_by_employee_and_date(employee_id, self.clock.today())
            .is_some_and(|r| r.check_in.is_some())
    }

    pub fn is_checked_out(&self, employee_id: &str) -> bool {
        self.record_by_employee_and_date(employee_id, self.clock.today())
            .is_some_and(|r| r.check_out.is_some())
    }

    /// Reloads records and config from storage. Selection is kept.
    pub async fn refresh(&self) {
        let _loading = self.simulate_latency(self.options.short_latency()).await;

        let config = persist::load_config(self.kv.as_ref());
        let records = persist::load_records(self.kv.as_ref(), self.clock.now(), &config);

        let mut state = self.lock();
        state.config = config;
        state.records = records;
        debug!(records = state.records.len(), "Attendance store refreshed");
    }

    /// Replaces everything with fresh seed data and the default schedule.
    pub fn reset(&self) {
        let now = self.clock.now();
        let config = AttendanceConfig::default();
        let records = crate::data::seed::seed_records(now, &config, &mut rand::thread_rng());

        persist::save(self.kv.as_ref(), RECORDS_KEY, &records);
        persist::save(self.kv.as_ref(), CONFIG_KEY, &config);

        let today = now.date_naive();
        let mut state = self.lock();
        *state = AttendanceState {
            records,
            config,
            selected_date: today,
            selected_employee_id: None,
            selected_month: YearMonth::of(today),
        };
        info!(records = state.records.len(), "Attendance data reset");
    }

    // ============================
    // DERIVED VIEWS
    // ============================

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.lock().records.clone()
    }

    pub fn today_records(&self) -> Vec<AttendanceRecord> {
        self.records_on(self.clock.today())
    }

    pub fn selected_date_records(&self) -> Vec<AttendanceRecord> {
        let date = self.selected_date();
        self.records_on(date)
    }

    fn records_on(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect()
    }

    /// Selected employee's records, newest first.
    pub fn selected_employee_history(&self) -> Vec<AttendanceRecord> {
        let state = self.lock();
        let Some(employee_id) = state.selected_employee_id.as_deref() else {
            return Vec::new();
        };

        let mut history: Vec<_> = state
            .records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }

    pub fn selected_month_records(&self) -> Vec<AttendanceRecord> {
        let state = self.lock();
        let Some(employee_id) = state.selected_employee_id.as_deref() else {
            return Vec::new();
        };

        state
            .records
            .iter()
            .filter(|r| r.employee_id == employee_id && state.selected_month.contains(r.date))
            .cloned()
            .collect()
    }

    pub fn monthly_summary(&self) -> Option<MonthlyAttendanceSummary> {
        let state = self.lock();
        let employee_id = state.selected_employee_id.as_deref()?;
        engine::monthly_summary(&state.records, employee_id, state.selected_month)
    }

    pub fn today_stats(&self) -> TodayStats {
        let today = self.clock.today();
        engine::day_stats(&self.lock().records, today)
    }

    pub fn calendar_days(&self) -> Vec<CalendarDay> {
        let today = self.clock.today();
        let state = self.lock();
        engine::calendar_grid(
            state.selected_month,
            today,
            &state.records,
            state.selected_employee_id.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::FixedClock;
    use crate::store::kv::MemoryStore;
    use chrono::{DateTime, FixedOffset};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    /// Store over an empty record set on Monday 2025-03-03.
    fn empty_store(now: &str) -> (AttendanceStore, Arc<FixedClock>, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        persist::save(kv.as_ref(), RECORDS_KEY, &Vec::<AttendanceRecord>::new());
        let clock = Arc::new(FixedClock::new(at(now)));
        let store = AttendanceStore::open(kv.clone(), clock.clone(), StoreOptions::immediate());
        (store, clock, kv)
    }

    fn stored_records(kv: &MemoryStore) -> Vec<AttendanceRecord> {
        serde_json::from_slice(&kv.get(RECORDS_KEY).unwrap().unwrap()).unwrap()
    }

    /// Serves an empty record set and rejects every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, kv::StorageError> {
            Ok((key == RECORDS_KEY).then(|| b"[]".to_vec()))
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), kv::StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove(&self, _key: &str) -> Result<(), kv::StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[actix_rt::test]
    async fn failed_persist_keeps_mutation_in_memory() {
        let clock = Arc::new(FixedClock::new(at("2025-03-03T08:55:00+00:00")));
        let store = AttendanceStore::open(Arc::new(ReadOnlyStore), clock.clone(), StoreOptions::immediate());
        assert!(store.records().is_empty());

        let record = store.check_in("emp-1", "Alice", None).await.unwrap();
        assert_eq!(store.records(), vec![record.clone()]);
        assert!(store.is_checked_in("emp-1"));

        clock.set(at("2025-03-03T17:05:00+00:00"));
        let done = store.check_out("emp-1", None).await.unwrap();
        assert_eq!(done.status, AttendanceStatus::Present);

        let config = store
            .update_config(AttendanceConfigPatch {
                break_duration_minutes: Some(30),
                ..Default::default()
            })
            .await;
        assert_eq!(config.break_duration_minutes, 30);
        assert_eq!(store.config().break_duration_minutes, 30);
    }

    #[actix_rt::test]
    async fn check_in_on_time_then_full_day() {
        let (store, clock, kv) = empty_store("2025-03-03T09:00:00+00:00");

        let record = store.check_in("emp-1", "Alice Thompson", None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.late_minutes, 0);
        assert!(store.is_checked_in("emp-1"));
        assert!(!store.is_checked_out("emp-1"));

        clock.set(at("2025-03-03T17:00:00+00:00"));
        let record = store.check_out("emp-1", None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.working_hours, 420);
        assert_eq!(record.early_leave_minutes, 0);
        assert!(store.is_checked_out("emp-1"));

        assert_eq!(stored_records(&kv), vec![record]);
    }

    #[actix_rt::test]
    async fn check_in_grace_boundary() {
        let (store, _clock, _kv) = empty_store("2025-03-03T09:14:00+00:00");
        let r = store.check_in("emp-1", "Alice", None).await.unwrap();
        assert_eq!((r.status, r.late_minutes), (AttendanceStatus::Present, 0));

        let (store, _clock, _kv) = empty_store("2025-03-03T09:16:00+00:00");
        let r = store.check_in("emp-1", "Alice", None).await.unwrap();
        assert_eq!((r.status, r.late_minutes), (AttendanceStatus::Late, 1));
    }

    #[actix_rt::test]
    async fn second_check_in_is_rejected_without_duplicates() {
        let (store, clock, _kv) = empty_store("2025-03-03T09:00:00+00:00");
        let first = store.check_in("emp-1", "Alice", Some("bus")).await.unwrap();

        clock.advance(chrono::Duration::minutes(5));
        assert!(store.check_in("emp-1", "Alice", Some("again")).await.is_none());

        let records = store.records();
        assert_eq!(records, vec![first]);
    }

    #[actix_rt::test]
    async fn check_in_fills_an_existing_record_without_times() {
        let (store, clock, _kv) = empty_store("2025-03-03T08:00:00+00:00");
        let absent = store
            .create_manual_record(ManualRecordRequest {
                employee_id: "emp-1".into(),
                employee_name: "Alice".into(),
                date: clock.today(),
                notes: Some("pre-filled".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(absent.status, AttendanceStatus::Absent);

        clock.set(at("2025-03-03T09:30:00+00:00"));
        let record = store.check_in("emp-1", "Alice", None).await.unwrap();
        assert_eq!(record.id, absent.id);
        assert_eq!(record.status, AttendanceStatus::Late);
        assert_eq!(record.late_minutes, 15);
        assert_eq!(record.notes.as_deref(), Some("pre-filled"));
        assert_eq!(store.records().len(), 1);
    }

    #[actix_rt::test]
    async fn check_out_preconditions() {
        let (store, clock, _kv) = empty_store("2025-03-03T09:00:00+00:00");
        assert!(store.check_out("emp-1", None).await.is_none());

        store.check_in("emp-1", "Alice", None).await.unwrap();
        clock.set(at("2025-03-03T17:00:00+00:00"));
        assert!(store.check_out("emp-1", None).await.is_some());
        assert!(store.check_out("emp-1", None).await.is_none());

        // yesterday's check-in does not count for today
        clock.set(at("2025-03-04T17:00:00+00:00"));
        assert!(store.check_out("emp-1", None).await.is_none());
    }

    #[actix_rt::test]
    async fn check_out_resolution_order() {
        // early leave wins over an already-late status
        let (store, clock, _kv) = empty_store("2025-03-03T09:40:00+00:00");
        store.check_in("emp-1", "Alice", None).await.unwrap();
        clock.set(at("2025-03-03T15:30:00+00:00"));
        let r = store.check_out("emp-1", None).await.unwrap();
        assert_eq!(r.status, AttendanceStatus::EarlyLeave);
        assert_eq!(r.late_minutes, 25);
        assert_eq!(r.early_leave_minutes, 60);

        // short day that ends after the early-leave boundary
        let (store, clock, _kv) = empty_store("2025-03-03T14:00:00+00:00");
        store.check_in("emp-1", "Alice", None).await.unwrap();
        clock.set(at("2025-03-03T17:00:00+00:00"));
        let r = store.check_out("emp-1", None).await.unwrap();
        assert_eq!(r.working_hours, 120);
        assert_eq!(r.status, AttendanceStatus::HalfDay);

        // late arrival keeps its status on a normal check-out
        let (store, clock, _kv) = empty_store("2025-03-03T09:20:00+00:00");
        store.check_in("emp-1", "Alice", None).await.unwrap();
        clock.set(at("2025-03-03T17:30:00+00:00"));
        let r = store.check_out("emp-1", None).await.unwrap();
        assert_eq!(r.status, AttendanceStatus::Late);
        assert_eq!(r.late_minutes, 5);
    }

    #[actix_rt::test]
    async fn check_out_appends_notes() {
        let (store, clock, _kv) = empty_store("2025-03-03T09:00:00+00:00");
        store.check_in("emp-1", "Alice", Some("train delay")).await.unwrap();
        clock.set(at("2025-03-03T17:00:00+00:00"));
        let r = store.check_out("emp-1", Some("stayed for release")).await.unwrap();
        assert_eq!(r.notes.as_deref(), Some("train delay stayed for release"));
    }

    #[actix_rt::test]
    async fn override_reclassifies_unless_status_supplied() {
        let (store, clock, _kv) = empty_store("2025-03-03T09:00:00+00:00");
        let original = store.check_in("emp-1", "Alice", None).await.unwrap();
        clock.set(at("2025-03-03T18:00:00+00:00"));

        let request = OverrideRequest {
            attendance_id: original.id.clone(),
            check_in: Some(at("2025-03-03T09:45:00+00:00")),
            check_out: Some(at("2025-03-03T17:30:00+00:00")),
            status: None,
            reason: OverrideReason::Correction,
            notes: "badge reader offline".into(),
            override_by: "hr-1".into(),
            record_notes: None,
        };
        let r = store.override_record(request.clone()).await.unwrap();
        assert_eq!(r.status, AttendanceStatus::Late);
        assert_eq!(r.late_minutes, 30);
        assert_eq!(r.working_hours, 405);
        assert!(r.is_overridden);
        assert_eq!(r.override_by.as_deref(), Some("hr-1"));
        assert_eq!(r.override_reason, Some(OverrideReason::Correction));
        assert_eq!(r.override_notes.as_deref(), Some("badge reader offline"));
        assert_eq!(r.override_at, Some(clock.now()));
        assert_eq!(r.updated_at, clock.now());

        let r = store
            .override_record(OverrideRequest {
                check_in: None,
                check_out: None,
                status: Some(AttendanceStatus::Present),
                reason: OverrideReason::ApprovedLeave,
                record_notes: Some("doctor visit".into()),
                ..request
            })
            .await
            .unwrap();
        // caller status wins, minutes still follow the times
        assert_eq!(r.status, AttendanceStatus::Present);
        assert_eq!(r.late_minutes, 30);
        assert_eq!(r.override_reason, Some(OverrideReason::ApprovedLeave));
        assert_eq!(r.notes.as_deref(), Some("doctor visit"));
    }

    #[actix_rt::test]
    async fn override_with_one_side_keeps_minutes() {
        let (store, _clock, _kv) = empty_store("2025-03-03T09:30:00+00:00");
        let original = store.check_in("emp-1", "Alice", None).await.unwrap();

        let r = store
            .override_record(OverrideRequest {
                attendance_id: original.id.clone(),
                check_in: None,
                check_out: None,
                status: None,
                reason: OverrideReason::Other,
                notes: "acknowledged".into(),
                override_by: "hr-1".into(),
                record_notes: None,
            })
            .await
            .unwrap();
        assert_eq!(r.status, AttendanceStatus::Late);
        assert_eq!(r.late_minutes, 15);
        assert!(r.is_overridden);
    }

    #[actix_rt::test]
    async fn override_unknown_record_is_none() {
        let (store, _clock, _kv) = empty_store("2025-03-03T09:00:00+00:00");
        let r = store
            .override_record(OverrideRequest {
                attendance_id: "att-missing".into(),
                check_in: None,
                check_out: None,
                status: Some(AttendanceStatus::Present),
                reason: OverrideReason::SystemError,
                notes: String::new(),
                override_by: "hr-1".into(),
                record_notes: None,
            })
            .await;
        assert!(r.is_none());
    }

    #[actix_rt::test]
    async fn manual_record_is_overridden_from_creation() {
        let (store, clock, _kv) = empty_store("2025-03-05T12:00:00+00:00");
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let request = ManualRecordRequest {
            employee_id: "emp-2".into(),
            employee_name: "Bob Martinez".into(),
            date,
            check_in: Some(at("2025-03-03T09:00:00+00:00")),
            check_out: Some(at("2025-03-03T16:00:00+00:00")),
            status: None,
            notes: Some("forgot badge".into()),
            override_by: Some("hr-1".into()),
        };

        let r = store.create_manual_record(request.clone()).await;
        assert_eq!(r.status, AttendanceStatus::EarlyLeave);
        assert_eq!(r.working_hours, 360);
        assert_eq!(r.early_leave_minutes, 30);
        assert!(r.is_overridden);
        assert_eq!(r.override_reason, Some(OverrideReason::Correction));
        assert_eq!(r.override_notes.as_deref(), Some(MANUAL_ENTRY_NOTES));
        assert_eq!(r.notes.as_deref(), Some("forgot badge"));
        assert_eq!(r.override_at, Some(clock.now()));

        // same employee-day again is accepted
        store.create_manual_record(request).await;
        let same_day = store
            .records()
            .into_iter()
            .filter(|r| r.employee_id == "emp-2" && r.date == date)
            .count();
        assert_eq!(same_day, 2);
    }

    #[actix_rt::test]
    async fn manual_record_with_one_time_defaults_to_absent() {
        let (store, _clock, _kv) = empty_store("2025-03-05T12:00:00+00:00");
        let r = store
            .create_manual_record(ManualRecordRequest {
                employee_id: "emp-2".into(),
                employee_name: "Bob".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                check_out: Some(at("2025-03-04T17:00:00+00:00")),
                ..Default::default()
            })
            .await;
        assert_eq!(r.status, AttendanceStatus::Absent);
        assert_eq!(r.working_hours, 0);

        let r = store
            .create_manual_record(ManualRecordRequest {
                employee_id: "emp-3".into(),
                employee_name: "Carol".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                check_in: Some(at("2025-03-04T09:00:00+00:00")),
                ..Default::default()
            })
            .await;
        assert_eq!(r.status, AttendanceStatus::Absent);
        assert_eq!(r.late_minutes, 0);

        let r = store
            .create_manual_record(ManualRecordRequest {
                employee_id: "emp-2".into(),
                employee_name: "Bob".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                status: Some(AttendanceStatus::Present),
                ..Default::default()
            })
            .await;
        assert_eq!(r.status, AttendanceStatus::Present);
    }

    #[actix_rt::test]
    async fn config_changes_are_not_retroactive() {
        let (store, clock, kv) = empty_store("2025-03-03T09:20:00+00:00");
        let before = store.check_in("emp-1", "Alice", None).await.unwrap();
        assert_eq!(before.late_minutes, 5);

        let config = store
            .update_config(AttendanceConfigPatch {
                late_threshold_minutes: Some(30),
                ..Default::default()
            })
            .await;
        assert_eq!(config.late_threshold_minutes, 30);
        assert_eq!(persist::load_config(kv.as_ref()), config);

        let after = store
            .record_by_employee_and_date("emp-1", clock.today())
            .unwrap();
        assert_eq!(after.late_minutes, 5);
        assert_eq!(after.status, AttendanceStatus::Late);
    }

    #[actix_rt::test]
    async fn refresh_reloads_from_storage() {
        let (store, _clock, kv) = empty_store("2025-03-03T09:00:00+00:00");
        store.check_in("emp-1", "Alice", None).await.unwrap();

        persist::save(kv.as_ref(), RECORDS_KEY, &Vec::<AttendanceRecord>::new());
        store.refresh().await;
        assert!(store.records().is_empty());
    }

    #[actix_rt::test]
    async fn selection_driven_views() {
        let (store, clock, _kv) = empty_store("2025-03-03T09:00:00+00:00");
        store.check_in("emp-1", "Alice", None).await.unwrap();
        store.check_in("emp-2", "Bob", None).await.unwrap();
        clock.set(at("2025-03-04T09:30:00+00:00"));
        store.check_in("emp-1", "Alice", None).await.unwrap();

        assert!(store.selected_employee_history().is_empty());
        assert!(store.monthly_summary().is_none());

        store.set_selected_employee(Some("emp-1"));
        let history = store.selected_employee_history();
        assert_eq!(history.len(), 2);
        assert!(history[0].date > history[1].date);
        assert_eq!(store.selected_month_records().len(), 2);

        let summary = store.monthly_summary().unwrap();
        assert_eq!(summary.total_days, 2);
        assert_eq!(summary.late_days, 1);

        store.set_selected_date(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(store.selected_date_records().len(), 2);
        assert_eq!(store.today_records().len(), 1);
        assert_eq!(store.today_stats().checked_in, 1);

        let grid = store.calendar_days();
        assert_eq!(grid.len(), 42);
        assert_eq!(grid.iter().filter(|d| d.is_today).count(), 1);
        assert_eq!(grid.iter().filter(|d| d.attendance.is_some()).count(), 2);

        store.set_selected_month(YearMonth::new(2025, 2).unwrap());
        assert!(store.monthly_summary().is_none());
        assert_eq!(store.calendar_days().iter().filter(|d| d.is_today).count(), 0);
    }

    #[actix_rt::test]
    async fn reset_restores_seed_and_defaults() {
        let (store, _clock, kv) = empty_store("2025-03-05T10:00:00+00:00");
        store
            .update_config(AttendanceConfigPatch {
                break_duration_minutes: Some(30),
                ..Default::default()
            })
            .await;
        store.set_selected_employee(Some("emp-1"));

        store.reset();
        assert_eq!(store.config(), AttendanceConfig::default());
        assert_eq!(store.selected_employee_id(), None);
        assert_eq!(store.today_records().len(), 15);
        assert_eq!(stored_records(&kv).len(), store.records().len());
    }

    #[actix_rt::test]
    async fn opening_an_empty_store_seeds_it() {
        let kv = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(at("2025-03-05T10:00:00+00:00")));
        let store = AttendanceStore::open(kv.clone(), clock, StoreOptions::immediate());

        assert!(!store.records().is_empty());
        assert_eq!(stored_records(&kv), store.records());
    }

    #[actix_rt::test]
    async fn loading_flag_spans_the_latency() {
        let kv = Arc::new(MemoryStore::new());
        persist::save(kv.as_ref(), RECORDS_KEY, &Vec::<AttendanceRecord>::new());
        let clock = Arc::new(FixedClock::new(at("2025-03-03T09:00:00+00:00")));
        let store = AttendanceStore::open(
            kv,
            clock,
            StoreOptions {
                latency: Duration::from_millis(20),
            },
        );

        assert!(!store.is_loading());
        let pending = store.check_in("emp-1", "Alice", None);
        let probe = async {
            actix_rt::time::sleep(Duration::from_millis(5)).await;
            store.is_loading()
        };
        let (record, was_loading) = futures::join!(pending, probe);
        assert!(record.is_some());
        assert!(was_loading);
        assert!(!store.is_loading());
    }
}
