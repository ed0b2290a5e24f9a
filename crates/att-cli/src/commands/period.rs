//! Period command: one employee's attendance over a date range.

use std::io::{self, Write};

use anyhow::{Context, Result};
use att_core::duration::format_hms;
use att_core::{
    CohortReporter, DailyAttendanceRecord, EmployeeCode, PeriodAttendanceReport,
    export_to_flat_text,
};
use chrono::{NaiveDate, NaiveDateTime};

use super::util::{clock, employee_label, hms, write_json};

/// How to render the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
    /// Day-by-day flat text table.
    Flat { generated_at: NaiveDateTime },
}

pub fn run<W: Write>(
    out: &mut W,
    reporter: &CohortReporter<'_>,
    code: &str,
    from: NaiveDate,
    to: NaiveDate,
    output: Output,
) -> Result<()> {
    let code = EmployeeCode::new(code)?;
    let report = reporter
        .employee_period(&code, from, to)?
        .with_context(|| format!("unknown employee: {code}"))?;

    match output {
        Output::Json => write_json(out, &report)?,
        Output::Text => write_period(out, &report)?,
        Output::Flat { generated_at } => {
            let title = format!(
                "{} {} from {} to {}",
                report.employee.code, report.employee.name, report.start, report.end
            );
            out.write_all(&export_to_flat_text(&report.days, &title, generated_at))?;
        }
    }
    Ok(())
}

/// Comma-separated lateness, early leave and overtime notes for a day.
pub fn day_notes(record: &DailyAttendanceRecord) -> String {
    let mut notes = Vec::new();
    if let Some(late_by) = record.late_by {
        notes.push(format!("late {}", format_hms(late_by)));
    }
    if let Some(early_by) = record.early_by {
        notes.push(format!("early {}", format_hms(early_by)));
    }
    if let Some(overtime) = record.overtime {
        notes.push(format!("ot {}", format_hms(overtime)));
    }
    notes.join(", ")
}

pub fn write_period<W: Write>(out: &mut W, report: &PeriodAttendanceReport) -> io::Result<()> {
    writeln!(out, "ATTENDANCE: {}", employee_label(&report.employee))?;
    writeln!(
        out,
        "Period: {} to {} ({} working days)",
        report.start, report.end, report.working_days
    )?;
    writeln!(out)?;

    let header = format!(
        "{:<12}{:<9}{:<10}{:<10}{:<10}NOTES",
        "DATE", "STATUS", "IN", "OUT", "WORKED"
    );
    writeln!(out, "{header}")?;
    for day in &report.days {
        let line = format!(
            "{:<12}{:<9}{:<10}{:<10}{:<10}{}",
            day.date.to_string(),
            day.status.label(),
            clock(day.check_in),
            clock(day.check_out),
            hms(day.work_duration),
            day_notes(day)
        );
        writeln!(out, "{}", line.trim_end())?;
    }

    writeln!(out)?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "Present:     {}", report.present_days)?;
    writeln!(out, "Late:        {}", report.late_days)?;
    writeln!(out, "Half days:   {}", report.half_days)?;
    writeln!(out, "Absent:      {}", report.absent_days)?;
    writeln!(out, "Worked:      {}", format_hms(report.total_work))?;
    writeln!(out, "Overtime:    {}", format_hms(report.total_overtime))?;
    writeln!(out, "Attendance:  {:.2}%", report.attendance_percentage)?;
    Ok(())
}
