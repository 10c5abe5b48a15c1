use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hrm_attendance::{AttendanceStatus, OverrideReason, YearMonth};

#[derive(Parser)]
#[command(author, version, about = "Attendance tracking for the HR dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check an employee in for today
    CheckIn {
        /// Employee id (defaults to HRM_EMPLOYEE_ID)
        #[arg(long)]
        employee: Option<String>,

        /// Display name (defaults to HRM_EMPLOYEE_NAME or the demo roster)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Check an employee out for today
    CheckOut {
        #[arg(long)]
        employee: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Correct an existing record (HR)
    Override {
        /// Attendance record id
        #[arg(long)]
        record: String,

        /// New check-in, "HH:MM" on the record's date or RFC 3339
        #[arg(long)]
        check_in: Option<String>,

        /// New check-out, "HH:MM" on the record's date or RFC 3339
        #[arg(long)]
        check_out: Option<String>,

        /// Force a status instead of reclassifying
        #[arg(long)]
        status: Option<AttendanceStatus>,

        /// correction, emergency, approved-leave, system-error or other
        #[arg(long)]
        reason: OverrideReason,

        #[arg(long)]
        notes: String,

        #[arg(long)]
        by: String,

        /// Appended to the record's own notes
        #[arg(long)]
        record_notes: Option<String>,
    },

    /// Create a record for any date (HR)
    Manual {
        #[arg(long)]
        employee: String,

        #[arg(long)]
        name: Option<String>,

        /// Date in YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        check_in: Option<String>,

        #[arg(long)]
        check_out: Option<String>,

        #[arg(long)]
        status: Option<AttendanceStatus>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        by: Option<String>,
    },

    /// Show or change the work schedule
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Today's records and statistics
    Today,

    /// Records for one date
    Day {
        #[arg(long)]
        date: NaiveDate,
    },

    /// One employee's records, newest first
    History {
        #[arg(long)]
        employee: String,
    },

    /// Monthly summary for one employee
    Summary {
        #[arg(long)]
        employee: String,

        /// YYYY-MM, defaults to the current month
        #[arg(long)]
        month: Option<YearMonth>,
    },

    /// Month calendar, optionally annotated with one employee's records
    Calendar {
        #[arg(long)]
        month: Option<YearMonth>,

        #[arg(long)]
        employee: Option<String>,
    },

    /// Export a date range as CSV
    Export {
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        #[arg(long)]
        employee: Option<String>,

        #[arg(long, default_value_t = false)]
        include_overrides: bool,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with fresh demo data and the default schedule
    Reset,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set {
        /// HH:MM
        #[arg(long)]
        work_start: Option<String>,

        /// HH:MM
        #[arg(long)]
        work_end: Option<String>,

        #[arg(long)]
        late_threshold: Option<u32>,

        #[arg(long)]
        early_leave_threshold: Option<u32>,

        #[arg(long)]
        min_hours: Option<f64>,

        #[arg(long = "break")]
        break_minutes: Option<u32>,
    },
}
