//! Flat text export.
//!
//! Layout:
//!
//! ```text
//! <title>
//! Generated: YYYY-MM-DD HH:MM:SS
//! <column>,<column>,...
//! <cell>,<cell>,...
//! ```
//!
//! Commas inside a cell are replaced with `;`. Nothing else is escaped.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::classify::DailyAttendanceRecord;
use crate::cohort::{DailyAttendanceRow, LogSummaryRow};
use crate::duration::format_hms;
use crate::period::PeriodAttendanceReport;
use crate::types::EmployeeIdentity;

/// A row that can be written as one line of a flat table.
pub trait FlatRow {
    /// Header names, in cell order.
    fn columns() -> &'static [&'static str];

    /// Cell values, one per column.
    fn cells(&self) -> Vec<String>;
}

/// Renders `rows` as a flat comma-separated table encoded as UTF-8.
pub fn export_to_flat_text<R: FlatRow>(
    rows: &[R],
    title: &str,
    generated_at: NaiveDateTime,
) -> Vec<u8> {
    let mut output = String::new();
    push_line(&mut output, title);
    push_line(
        &mut output,
        &format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
    );
    push_line(&mut output, &R::columns().join(","));

    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| c.replace(',', ";")).collect();
        push_line(&mut output, &cells.join(","));
    }

    output.into_bytes()
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}

fn date_cell(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn time_cell(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(String::new, |ts| ts.format("%H:%M:%S").to_string())
}

fn duration_cell(value: Option<Duration>) -> String {
    value.map_or_else(String::new, format_hms)
}

fn identity_cells(employee: &EmployeeIdentity) -> [String; 3] {
    [
        employee.code.to_string(),
        employee.name.clone(),
        employee.department_name.clone().unwrap_or_default(),
    ]
}

const RECORD_COLUMNS: [&str; 10] = [
    "Date",
    "Status",
    "CheckIn",
    "CheckOut",
    "WorkDuration",
    "Overtime",
    "IsLate",
    "LateBy",
    "IsEarlyLeave",
    "EarlyBy",
];

fn record_cells(record: &DailyAttendanceRecord) -> [String; 10] {
    [
        date_cell(record.date),
        record.status.label().to_string(),
        time_cell(record.check_in),
        time_cell(record.check_out),
        duration_cell(record.work_duration),
        duration_cell(record.overtime),
        record.is_late.to_string(),
        duration_cell(record.late_by),
        record.is_early_leave.to_string(),
        duration_cell(record.early_by),
    ]
}

impl FlatRow for DailyAttendanceRecord {
    fn columns() -> &'static [&'static str] {
        &RECORD_COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        record_cells(self).into()
    }
}

impl FlatRow for DailyAttendanceRow {
    fn columns() -> &'static [&'static str] {
        &[
            "EmployeeCode",
            "EmployeeName",
            "Department",
            "Date",
            "Status",
            "CheckIn",
            "CheckOut",
            "WorkDuration",
            "Overtime",
            "IsLate",
            "LateBy",
            "IsEarlyLeave",
            "EarlyBy",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = Vec::from(identity_cells(&self.employee));
        cells.extend(record_cells(&self.record));
        cells
    }
}

impl FlatRow for PeriodAttendanceReport {
    fn columns() -> &'static [&'static str] {
        &[
            "EmployeeCode",
            "EmployeeName",
            "Department",
            "StartDate",
            "EndDate",
            "PresentDays",
            "AbsentDays",
            "LateDays",
            "HalfDays",
            "WorkingDays",
            "TotalWork",
            "TotalOvertime",
            "AttendancePercentage",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = Vec::from(identity_cells(&self.employee));
        cells.extend([
            date_cell(self.start),
            date_cell(self.end),
            self.present_days.to_string(),
            self.absent_days.to_string(),
            self.late_days.to_string(),
            self.half_days.to_string(),
            self.working_days.to_string(),
            format_hms(self.total_work),
            format_hms(self.total_overtime),
            format!("{:.2}", self.attendance_percentage),
        ]);
        cells
    }
}

impl FlatRow for LogSummaryRow {
    fn columns() -> &'static [&'static str] {
        &[
            "EmployeeCode",
            "EmployeeName",
            "Department",
            "Date",
            "PunchCount",
            "FirstIn",
            "LastOut",
            "Status",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let summary = &self.summary;
        let mut cells = Vec::from(identity_cells(&self.employee));
        cells.extend([
            date_cell(summary.date),
            summary.punch_count.to_string(),
            time_cell(summary.first_in),
            time_cell(summary.last_out),
            summary.status.label().to_string(),
        ]);
        cells
    }
}
