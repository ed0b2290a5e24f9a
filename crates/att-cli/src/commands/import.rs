//! Import command for loading the directory, shifts and punches into `SQLite`.
//!
//! Input is JSONL on stdin. Each line carries a `kind`:
//!
//! ```text
//! {"kind":"employee","id":1,"code":"E001","name":"Ada","department_id":10,"shift_id":1}
//! {"kind":"shift","id":1,"start":"09:00:00","end":"17:00:00"}
//! {"kind":"punch","employee_code":"E001","timestamp":"2024-01-02T09:20:00","direction":"in"}
//! {"kind":"overtime","employee_code":"E001","date":"2024-01-02","minutes":30}
//! ```

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use att_core::{Employee, EmployeeCode, PunchEvent, ShiftSchedule};
use att_db::{Database, OvertimeRecord, ShiftRecord};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

/// Parsed input, grouped by kind.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub employees: Vec<Employee>,
    pub shifts: Vec<ShiftRecord>,
    pub punches: Vec<PunchEvent>,
    pub overtime: Vec<OvertimeRecord>,
    /// Lines with an unrecognized `kind`.
    pub skipped: usize,
}

/// What the import wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub employees: usize,
    pub shifts: usize,
    pub punches: usize,
    pub duplicate_punches: usize,
    pub overtime: usize,
    pub skipped: usize,
}

pub fn run<R: BufRead, W: Write>(db: &mut Database, input: R, out: &mut W) -> Result<ImportSummary> {
    let batch = parse_lines(input)?;
    let summary = write_batch(db, &batch)?;
    writeln!(
        out,
        "Imported {} employees, {} shifts, {} punches ({} duplicates), {} overtime entries",
        summary.employees,
        summary.shifts,
        summary.punches,
        summary.duplicate_punches,
        summary.overtime
    )?;
    if summary.skipped > 0 {
        writeln!(out, "Skipped {} lines with unknown kind", summary.skipped)?;
    }
    Ok(summary)
}

/// Writes a parsed batch. Shifts first so employees can reference them.
pub fn write_batch(db: &mut Database, batch: &ImportBatch) -> Result<ImportSummary> {
    let shifts = db.upsert_shifts(&batch.shifts).context("failed to store shifts")?;
    let employees = db
        .upsert_employees(&batch.employees)
        .context("failed to store employees")?;
    let punches = db
        .insert_punches(&batch.punches)
        .context("failed to store punches")?;
    let overtime = db
        .upsert_overtime(&batch.overtime)
        .context("failed to store overtime")?;

    Ok(ImportSummary {
        employees,
        shifts,
        punches,
        duplicate_punches: batch.punches.len() - punches,
        overtime,
        skipped: batch.skipped,
    })
}

pub fn parse_lines<R: BufRead>(reader: R) -> Result<ImportBatch> {
    let mut batch = ImportBatch::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {line_no}"))?;
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .map(str::to_string)
            .with_context(|| format!("missing kind on line {line_no}"))?;

        let context = || format!("invalid {kind} on line {line_no}");
        match kind.as_str() {
            "employee" => batch
                .employees
                .push(serde_json::from_value(value).with_context(context)?),
            "shift" => batch
                .shifts
                .push(serde_json::from_value::<ShiftLine>(value).with_context(context)?.into()),
            "punch" => batch
                .punches
                .push(serde_json::from_value(value).with_context(context)?),
            "overtime" => batch.overtime.push(
                serde_json::from_value::<OvertimeLine>(value)
                    .with_context(context)?
                    .into(),
            ),
            other => {
                tracing::warn!(line = line_no, kind = other, "skipping line with unknown kind");
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

#[derive(Debug, Deserialize)]
struct ShiftLine {
    id: i64,
    start: NaiveTime,
    end: NaiveTime,
    #[serde(default)]
    break_start: Option<NaiveTime>,
    #[serde(default)]
    break_end: Option<NaiveTime>,
}

impl From<ShiftLine> for ShiftRecord {
    fn from(line: ShiftLine) -> Self {
        Self {
            id: line.id,
            schedule: ShiftSchedule {
                start: line.start,
                end: line.end,
                break_start: line.break_start,
                break_end: line.break_end,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OvertimeLine {
    employee_code: EmployeeCode,
    date: NaiveDate,
    minutes: i64,
}

impl From<OvertimeLine> for OvertimeRecord {
    fn from(line: OvertimeLine) -> Self {
        Self {
            employee_code: line.employee_code,
            date: line.date,
            duration: Duration::minutes(line.minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    const INPUT: &str = r#"
{"kind":"shift","id":1,"start":"09:00:00","end":"17:00:00","break_start":"12:00:00","break_end":"12:30:00"}
{"kind":"employee","id":1,"code":"E001","name":"Ada","department_name":"Ops","shift_id":1}
{"kind":"punch","employee_code":"E001","timestamp":"2024-01-02T09:20:00","direction":"in"}
{"kind":"punch","employee_code":"E001","timestamp":"2024-01-02T17:05:00","direction":"check_out"}
{"kind":"overtime","employee_code":"E001","date":"2024-01-02","minutes":30}
{"kind":"roster","id":4}
"#;

    #[test]
    fn parse_lines_groups_by_kind() {
        let batch = parse_lines(Cursor::new(INPUT)).unwrap();
        assert_eq!(batch.shifts.len(), 1);
        assert_eq!(batch.employees.len(), 1);
        assert_eq!(batch.punches.len(), 2);
        assert_eq!(batch.overtime.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.overtime[0].duration, Duration::minutes(30));
        assert!(batch.shifts[0].schedule.break_start.is_some());
    }

    #[test]
    fn parse_lines_reports_line_numbers() {
        let input = "{\"kind\":\"punch\",\"employee_code\":\"E001\",\"timestamp\":\"yesterday\",\"direction\":\"in\"}";
        let err = parse_lines(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("invalid punch on line 1"));

        let err = parse_lines(Cursor::new("\n{\"id\":1}")).unwrap_err();
        assert!(err.to_string().contains("missing kind on line 2"));

        let err = parse_lines(Cursor::new("not json")).unwrap_err();
        assert!(err.to_string().contains("invalid JSON on line 1"));
    }

    #[test]
    fn rejects_empty_employee_code() {
        let input = r#"{"kind":"employee","id":1,"code":"  ","name":"Ada"}"#;
        assert!(parse_lines(Cursor::new(input)).is_err());
    }

    #[test]
    fn reimport_counts_duplicates() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(&mut db, Cursor::new(INPUT), &mut out).unwrap();
        let summary = run(&mut db, Cursor::new(INPUT), &mut out).unwrap();

        assert_eq!(summary.punches, 0);
        assert_eq!(summary.duplicate_punches, 2);
        assert_eq!(db.counts().unwrap().punches, 2);

        let text = String::from_utf8(out).unwrap();
        insta::assert_snapshot!(text, @r"
        Imported 1 employees, 1 shifts, 2 punches (0 duplicates), 1 overtime entries
        Skipped 1 lines with unknown kind
        Imported 1 employees, 1 shifts, 0 punches (2 duplicates), 1 overtime entries
        Skipped 1 lines with unknown kind
        ");
    }
}
