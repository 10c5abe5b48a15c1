use std::io::Write;

use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;
use crate::utils::format::format_time;

const BASE_HEADER: [&str; 10] = [
    "Date",
    "Employee ID",
    "Employee Name",
    "Check In",
    "Check Out",
    "Status",
    "Working Hours",
    "Late Minutes",
    "Early Leave Minutes",
    "Notes",
];

const OVERRIDE_HEADER: [&str; 5] = [
    "Overridden",
    "Override Reason",
    "Override By",
    "Override Notes",
    "Override At",
];

#[derive(Debug, Clone)]
pub struct AttendanceExportOptions {
    pub employee_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Adds the override metadata columns.
    pub include_overrides: bool,
}

impl AttendanceExportOptions {
    fn matches(&self, record: &AttendanceRecord) -> bool {
        record.date >= self.start_date
            && record.date <= self.end_date
            && self
                .employee_id
                .as_deref()
                .is_none_or(|id| record.employee_id == id)
    }
}

/// Writes the matching records as CSV, ordered by date then employee id.
/// Returns the number of data rows written.
pub fn export_csv<W: Write>(
    records: &[AttendanceRecord],
    options: &AttendanceExportOptions,
    writer: W,
) -> anyhow::Result<usize> {
    let mut rows: Vec<&AttendanceRecord> = records.iter().filter(|r| options.matches(r)).collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.employee_id.cmp(&b.employee_id)));

    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = BASE_HEADER.to_vec();
    if options.include_overrides {
        header.extend(OVERRIDE_HEADER);
    }
    csv.write_record(&header)?;

    for r in &rows {
        let mut row = vec![
            r.date.to_string(),
            r.employee_id.clone(),
            r.employee_name.clone().unwrap_or_default(),
            format_time(r.check_in),
            format_time(r.check_out),
            r.status.label().to_string(),
            r.working_hours.to_string(),
            r.late_minutes.to_string(),
            r.early_leave_minutes.to_string(),
            r.notes.clone().unwrap_or_default(),
        ];
        if options.include_overrides {
            row.extend([
                if r.is_overridden { "yes" } else { "no" }.to_string(),
                r.override_reason
                    .map(|reason| reason.label().to_string())
                    .unwrap_or_default(),
                r.override_by.clone().unwrap_or_default(),
                r.override_notes.clone().unwrap_or_default(),
                r.override_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ]);
        }
        csv.write_record(&row)?;
    }

    csv.flush()?;
    tracing::debug!(rows = rows.len(), "Attendance CSV exported");
    Ok(rows.len())
}
