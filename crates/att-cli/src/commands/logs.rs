//! Logs command: coarse punch log summary for every employee on a date.

use std::io::{self, Write};

use anyhow::Result;
use att_core::{CohortReporter, EmployeeFilter, LogStatus, LogSummaryRow};
use chrono::NaiveDate;

use super::util::{clock, fit, write_json};

pub fn run<W: Write>(
    out: &mut W,
    reporter: &CohortReporter<'_>,
    filter: &EmployeeFilter,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let rows = reporter.log_summaries(filter, date)?;
    if json {
        write_json(out, &rows)
    } else {
        write_logs(out, date, &rows)?;
        Ok(())
    }
}

pub fn write_logs<W: Write>(out: &mut W, date: NaiveDate, rows: &[LogSummaryRow]) -> io::Result<()> {
    writeln!(out, "PUNCH LOG: {date}")?;
    if rows.is_empty() {
        writeln!(out, "No employees matched.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<10}{:<22}{:>7}  {:<8}  {:<8}  STATUS",
        "CODE", "NAME", "PUNCHES", "FIRST IN", "LAST OUT"
    )?;
    for row in rows {
        let summary = &row.summary;
        writeln!(
            out,
            "{:<10}{:<22}{:>7}  {:<8}  {:<8}  {}",
            row.employee.code.as_str(),
            fit(&row.employee.name, 20),
            summary.punch_count,
            clock(summary.first_in),
            clock(summary.last_out),
            summary.status
        )?;
    }

    let count = |status: LogStatus| rows.iter().filter(|r| r.summary.status == status).count();
    writeln!(out)?;
    writeln!(
        out,
        "Present: {}  Partial: {}  Absent: {}",
        count(LogStatus::Present),
        count(LogStatus::Partial),
        count(LogStatus::Absent)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use att_core::{EmployeeCode, EmployeeIdentity, PunchDirection, PunchEvent, summarize_punch_log};
    use insta::assert_snapshot;

    fn row(code: &str, name: &str, punches: &[(u32, u32, PunchDirection)]) -> LogSummaryRow {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let code = EmployeeCode::new(code).unwrap();
        let events: Vec<PunchEvent> = punches
            .iter()
            .map(|(h, m, direction)| {
                PunchEvent::new(code.clone(), date.and_hms_opt(*h, *m, 0).unwrap(), *direction)
            })
            .collect();
        LogSummaryRow {
            employee: EmployeeIdentity {
                id: 1,
                code,
                name: name.to_string(),
                department_name: None,
            },
            summary: summarize_punch_log(date, &events),
        }
    }

    #[test]
    fn summary_table() {
        let rows = vec![
            row(
                "E001",
                "Ada",
                &[(9, 0, PunchDirection::In), (17, 0, PunchDirection::Out)],
            ),
            row("E002", "Bob", &[(9, 30, PunchDirection::In)]),
            row("E003", "Augusta Ada King-Noel", &[]),
        ];
        let mut out = Vec::new();
        write_logs(&mut out, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &rows).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        PUNCH LOG: 2024-01-02
        CODE      NAME                  PUNCHES  FIRST IN  LAST OUT  STATUS
        E001      Ada                         2  09:00:00  17:00:00  Present
        E002      Bob                         1  09:30:00  -         Partial
        E003      Augusta Ada King-No…        0  -         -         Absent

        Present: 1  Partial: 1  Absent: 1
        ");
    }

    #[test]
    fn empty_cohort() {
        let mut out = Vec::new();
        write_logs(&mut out, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &[]).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        PUNCH LOG: 2024-01-02
        No employees matched.
        ");
    }
}
