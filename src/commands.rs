use std::fs::File;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime};
use tracing::info;

use hrm_attendance::data::seed::find_employee;
use hrm_attendance::model::config::hhmm;
use hrm_attendance::utils::export::{AttendanceExportOptions, export_csv};
use hrm_attendance::utils::format::{format_duration, format_time, status_legend};
use hrm_attendance::{
    AttendanceConfig, AttendanceConfigPatch, AttendanceRecord, AttendanceStore, ManualRecordRequest,
    OverrideRequest, YearMonth,
};

use crate::cli::{Commands, ConfigAction};
use crate::config::Config;

pub async fn run(command: Commands, store: &AttendanceStore, config: &Config) -> anyhow::Result<ExitCode> {
    match command {
        Commands::CheckIn {
            employee,
            name,
            notes,
        } => {
            let employee_id = employee_or_default(employee, config)?;
            let name = name
                .or_else(|| config.employee_name.clone())
                .or_else(|| find_employee(&employee_id).map(|e| e.name.clone()))
                .unwrap_or_else(|| employee_id.clone());

            match store.check_in(&employee_id, &name, notes.as_deref()).await {
                Some(record) => {
                    println!(
                        "Checked in {} at {} ({})",
                        name,
                        format_time(record.check_in),
                        record.status.label()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                None => rejected(&format!("{} is already checked in today", employee_id)),
            }
        }

        Commands::CheckOut { employee, notes } => {
            let employee_id = employee_or_default(employee, config)?;

            match store.check_out(&employee_id, notes.as_deref()).await {
                Some(record) => {
                    println!(
                        "Checked out {} at {}, worked {} ({})",
                        employee_id,
                        format_time(record.check_out),
                        format_duration(record.working_hours),
                        record.status.label()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                None => rejected(&format!(
                    "{} has no open check-in today or is already checked out",
                    employee_id
                )),
            }
        }

        Commands::Override {
            record,
            check_in,
            check_out,
            status,
            reason,
            notes,
            by,
            record_notes,
        } => {
            let Some(date) = store
                .records()
                .iter()
                .find(|r| r.id == record)
                .map(|r| r.date)
            else {
                return rejected(&format!("No attendance record with id {}", record));
            };

            let request = OverrideRequest {
                attendance_id: record,
                check_in: parse_stamp(check_in.as_deref(), date)?,
                check_out: parse_stamp(check_out.as_deref(), date)?,
                status,
                reason,
                notes,
                override_by: by,
                record_notes,
            };

            match store.override_record(request).await {
                Some(updated) => {
                    print_record(&updated);
                    Ok(ExitCode::SUCCESS)
                }
                None => rejected("Record disappeared before the override was applied"),
            }
        }

        Commands::Manual {
            employee,
            name,
            date,
            check_in,
            check_out,
            status,
            notes,
            by,
        } => {
            let employee_name = name
                .or_else(|| find_employee(&employee).map(|e| e.name.clone()))
                .unwrap_or_else(|| employee.clone());

            let request = ManualRecordRequest {
                employee_id: employee,
                employee_name,
                date,
                check_in: parse_stamp(check_in.as_deref(), date)?,
                check_out: parse_stamp(check_out.as_deref(), date)?,
                status,
                notes,
                override_by: by,
            };

            let record = store.create_manual_record(request).await;
            print_record(&record);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => print_config(&store.config()),
                ConfigAction::Set {
                    work_start,
                    work_end,
                    late_threshold,
                    early_leave_threshold,
                    min_hours,
                    break_minutes,
                } => {
                    let patch = AttendanceConfigPatch {
                        work_start_time: parse_hhmm(work_start.as_deref())?,
                        work_end_time: parse_hhmm(work_end.as_deref())?,
                        late_threshold_minutes: late_threshold,
                        early_leave_threshold_minutes: early_leave_threshold,
                        min_working_hours: min_hours,
                        break_duration_minutes: break_minutes,
                    };
                    let updated = store.update_config(patch).await;
                    print_config(&updated);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Today => {
            let stats = store.today_stats();
            println!(
                "Total {} | present {} | late {} | absent {} | early leave {} | half day {}",
                stats.total, stats.present, stats.late, stats.absent, stats.early_leave, stats.half_day
            );
            println!("Checked in {} | checked out {}", stats.checked_in, stats.checked_out);
            print_records(&store.today_records());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Day { date } => {
            store.set_selected_date(date);
            print_records(&store.selected_date_records());
            Ok(ExitCode::SUCCESS)
        }

        Commands::History { employee } => {
            store.set_selected_employee(Some(&employee));
            print_records(&store.selected_employee_history());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Summary { employee, month } => {
            store.set_selected_employee(Some(&employee));
            if let Some(month) = month {
                store.set_selected_month(month);
            }

            let Some(summary) = store.monthly_summary() else {
                println!("No records for {} in {}", employee, store.selected_month());
                return Ok(ExitCode::SUCCESS);
            };

            println!("{} ({}) {}", summary.employee_name, summary.employee_id, summary.month);
            println!(
                "Days {} | present {} | late {} | absent {} | early leave {} | half day {}",
                summary.total_days,
                summary.present_days,
                summary.late_days,
                summary.absent_days,
                summary.early_leave_days,
                summary.half_days
            );
            println!(
                "Worked {} (avg {}) | late {} | early leave {}",
                format_duration(clamp_minutes(summary.total_working_hours)),
                format_duration(summary.average_working_hours.round() as u32),
                format_duration(clamp_minutes(summary.total_late_minutes)),
                format_duration(clamp_minutes(summary.total_early_leave_minutes)),
            );
            println!("Attendance {:.1}%", summary.attendance_percentage);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Calendar { month, employee } => {
            store.set_selected_employee(employee.as_deref());
            if let Some(month) = month {
                store.set_selected_month(month);
            }
            print_calendar(store.selected_month(), store);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Export {
            from,
            to,
            employee,
            include_overrides,
            output,
        } => {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
            let options = AttendanceExportOptions {
                employee_id: employee,
                start_date: from,
                end_date: to,
                include_overrides,
            };
            let records = store.records();

            let rows = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    let rows = export_csv(&records, &options, file)?;
                    info!(rows, path = %path.display(), "Attendance exported");
                    rows
                }
                None => export_csv(&records, &options, io::stdout().lock())?,
            };
            eprintln!("Exported {} records", rows);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Reset => {
            store.reset();
            println!("Attendance data reset ({} records)", store.records().len());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn rejected(message: &str) -> anyhow::Result<ExitCode> {
    eprintln!("{}", message);
    Ok(ExitCode::FAILURE)
}

fn employee_or_default(employee: Option<String>, config: &Config) -> anyhow::Result<String> {
    employee
        .or_else(|| config.employee_id.clone())
        .ok_or_else(|| anyhow!("no employee given; pass --employee or set HRM_EMPLOYEE_ID"))
}

fn parse_hhmm(value: Option<&str>) -> anyhow::Result<Option<NaiveTime>> {
    value
        .map(|v| hhmm::parse(v).with_context(|| format!("invalid time '{}', expected HH:MM", v)))
        .transpose()
}

/// Accepts RFC 3339, or `HH:MM` placed on `date` in the local offset.
fn parse_stamp(value: Option<&str>, date: NaiveDate) -> anyhow::Result<Option<DateTime<FixedOffset>>> {
    let Some(value) = value else {
        return Ok(None);
    };

    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(stamp));
    }

    let time = hhmm::parse(value)
        .with_context(|| format!("invalid time '{}', expected HH:MM or RFC 3339", value))?;
    let local = date
        .and_time(time)
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| anyhow!("{} {} does not exist in the local timezone", date, value))?;
    Ok(Some(local.fixed_offset()))
}

fn clamp_minutes(minutes: u64) -> u32 {
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn print_config(config: &AttendanceConfig) {
    println!(
        "Work hours {}-{} | late after {}m | early leave before {}m | min {}h | break {}m",
        config.work_start_time.format(hhmm::FORMAT),
        config.work_end_time.format(hhmm::FORMAT),
        config.late_threshold_minutes,
        config.early_leave_threshold_minutes,
        config.min_working_hours,
        config.break_duration_minutes
    );
}

fn print_record(record: &AttendanceRecord) {
    let name = record.employee_name.as_deref().unwrap_or(&record.employee_id);
    let mut line = format!(
        "{} {} {:<20} {} - {} {:<11} worked {}",
        record.id,
        record.date,
        name,
        format_time(record.check_in),
        format_time(record.check_out),
        record.status.label(),
        format_duration(record.working_hours),
    );
    if record.late_minutes > 0 {
        line.push_str(&format!(" late {}", format_duration(record.late_minutes)));
    }
    if record.early_leave_minutes > 0 {
        line.push_str(&format!(" early {}", format_duration(record.early_leave_minutes)));
    }
    if record.is_overridden {
        line.push_str(" [overridden]");
    }
    println!("{}", line);
}

fn print_records(records: &[AttendanceRecord]) {
    if records.is_empty() {
        println!("No records");
        return;
    }
    for record in records {
        print_record(record);
    }
}

fn print_calendar(month: YearMonth, store: &AttendanceStore) {
    println!("{}", month);
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");

    for week in store.calendar_days().chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                if !day.is_current_month {
                    return "   .".to_string();
                }
                let mark = match &day.attendance {
                    Some(record) => record.status.mark(),
                    None if day.is_today => '*',
                    None => ' ',
                };
                format!("{:>3}{}", day.day_of_month, mark)
            })
            .collect();
        println!("{}", row.join(" "));
    }
    println!("{}  * today", status_legend());
}
