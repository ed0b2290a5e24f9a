//! Cohort command: filtered, sorted, paginated reports across employees.

use std::io::{self, Write};

use anyhow::Result;
use att_core::duration::format_hms;
use att_core::{
    CohortPage, CohortReporter, CohortSummary, DailyAttendanceRow, PeriodAttendanceReport,
};
use chrono::NaiveDate;

use super::period::day_notes;
use super::util::{Selection, build_query, clock, fit, hms, resolve_selection, write_json};
use crate::CohortArgs;

pub fn run<W: Write>(
    out: &mut W,
    reporter: &CohortReporter<'_>,
    args: &CohortArgs,
    default_page_size: u32,
    today: NaiveDate,
) -> Result<()> {
    let selection = resolve_selection(&args.selection, today)?;
    let query = build_query(
        &args.filter,
        &args.records,
        &args.sort,
        args.page,
        args.page_size.unwrap_or(default_page_size),
    );

    match selection {
        Selection::Day(date) => {
            let page = reporter.daily(&query, date)?;
            if args.json {
                write_json(out, &page)?;
            } else {
                write_daily_page(out, date, &page)?;
            }
        }
        Selection::Range { from, to } => {
            let page = reporter.period(&query, from, to)?;
            if args.json {
                write_json(out, &page)?;
            } else {
                write_period_page(out, from, to, &page)?;
            }
        }
    }
    Ok(())
}

pub fn write_daily_page<W: Write>(
    out: &mut W,
    date: NaiveDate,
    page: &CohortPage<DailyAttendanceRow>,
) -> io::Result<()> {
    writeln!(out, "ATTENDANCE: {date}")?;
    if page.rows.is_empty() {
        writeln!(out, "No rows on this page.")?;
    } else {
        writeln!(
            out,
            "{:<10}{:<22}{:<16}{:<9}{:<10}{:<10}{:<10}NOTES",
            "CODE", "NAME", "DEPARTMENT", "STATUS", "IN", "OUT", "WORKED"
        )?;
        for row in &page.rows {
            let record = &row.record;
            let line = format!(
                "{:<10}{:<22}{:<16}{:<9}{:<10}{:<10}{:<10}{}",
                row.employee.code.as_str(),
                fit(&row.employee.name, 20),
                fit(row.employee.department_name.as_deref().unwrap_or("-"), 14),
                record.status.label(),
                clock(record.check_in),
                clock(record.check_out),
                hms(record.work_duration),
                day_notes(record)
            );
            writeln!(out, "{}", line.trim_end())?;
        }
    }
    write_summary(out, &page.summary)?;
    write_footer(out, page)
}

pub fn write_period_page<W: Write>(
    out: &mut W,
    from: NaiveDate,
    to: NaiveDate,
    page: &CohortPage<PeriodAttendanceReport>,
) -> io::Result<()> {
    writeln!(
        out,
        "ATTENDANCE: {from} to {to} ({} working days)",
        page.summary.working_days
    )?;
    if page.rows.is_empty() {
        writeln!(out, "No rows on this page.")?;
    } else {
        writeln!(
            out,
            "{:<10}{:<22}{:<16}{:>7}{:>6}{:>6}{:>8}{:>11}{:>12}",
            "CODE", "NAME", "DEPARTMENT", "PRESENT", "LATE", "HALF", "ABSENT", "WORKED", "ATTENDANCE"
        )?;
        for report in &page.rows {
            writeln!(
                out,
                "{:<10}{:<22}{:<16}{:>7}{:>6}{:>6}{:>8}{:>11}{:>12}",
                report.employee.code.as_str(),
                fit(&report.employee.name, 20),
                fit(report.employee.department_name.as_deref().unwrap_or("-"), 14),
                report.present_days,
                report.late_days,
                report.half_days,
                report.absent_days,
                format_hms(report.total_work),
                format!("{:.2}%", report.attendance_percentage)
            )?;
        }
    }
    write_summary(out, &page.summary)?;
    write_footer(out, page)
}

fn write_summary<W: Write>(out: &mut W, summary: &CohortSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "SUMMARY ({} employees, {} employee-days, {} working days)",
        summary.total_employees, summary.total_records, summary.working_days
    )?;
    writeln!(
        out,
        "Present: {}  Late: {}  Half day: {}  Absent: {}",
        summary.present, summary.late, summary.half_day, summary.absent
    )?;
    writeln!(
        out,
        "Attendance:  {:.2}%",
        summary.overall_attendance_percentage
    )?;
    writeln!(out, "Worked:      {}", format_hms(summary.total_work))?;
    writeln!(out, "Overtime:    {}", format_hms(summary.total_overtime))?;
    Ok(())
}

fn write_footer<W: Write, R>(out: &mut W, page: &CohortPage<R>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Page {} of {} ({} rows)",
        page.page,
        page.total_pages.max(1),
        page.total_count
    )
}
