//! Export command: every matching row as a flat text table.
//!
//! Unlike `cohort`, export is not paginated.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{CohortReporter, EmployeeFilter, export_to_flat_text};
use chrono::{NaiveDate, NaiveDateTime};

use super::util::{Selection, build_query, resolve_selection};
use crate::ExportArgs;

/// A rendered export.
#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub rows: usize,
}

pub fn run<W: Write>(
    out: &mut W,
    reporter: &CohortReporter<'_>,
    args: &ExportArgs,
    today: NaiveDate,
    generated_at: NaiveDateTime,
) -> Result<()> {
    let rendered = render(reporter, args, today, generated_at)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(rows = rendered.rows, path = %path.display(), "export written");
            writeln!(out, "Wrote {} rows to {}", rendered.rows, path.display())?;
        }
        None => out.write_all(&rendered.bytes)?,
    }
    Ok(())
}

pub fn render(
    reporter: &CohortReporter<'_>,
    args: &ExportArgs,
    today: NaiveDate,
    generated_at: NaiveDateTime,
) -> Result<Rendered> {
    let selection = resolve_selection(&args.selection, today)?;
    let query = build_query(&args.filter, &args.records, &args.sort, 1, 1);

    let rendered = match selection {
        Selection::Day(date) if args.logs => {
            let rows = reporter.log_summaries(&EmployeeFilter::from(&args.filter), date)?;
            let title = title_or(args, || format!("Punch Log {date}"));
            Rendered {
                bytes: export_to_flat_text(&rows, &title, generated_at),
                rows: rows.len(),
            }
        }
        Selection::Day(date) => {
            let rows = reporter.daily_rows(&query, date)?;
            let title = title_or(args, || format!("Daily Attendance {date}"));
            Rendered {
                bytes: export_to_flat_text(&rows, &title, generated_at),
                rows: rows.len(),
            }
        }
        Selection::Range { from, to } => {
            let rows = reporter.period_rows(&query, from, to)?;
            let title = title_or(args, || format!("Period Attendance {from} to {to}"));
            Rendered {
                bytes: export_to_flat_text(&rows, &title, generated_at),
                rows: rows.len(),
            }
        }
    };
    Ok(rendered)
}

fn title_or(args: &ExportArgs, default: impl FnOnce() -> String) -> String {
    args.title.clone().unwrap_or_else(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use att_db::Database;
    use clap::Parser;
    use insta::assert_snapshot;

    use crate::commands::import;
    use crate::{Cli, Commands};

    const FIXTURE: &str = r#"
{"kind":"shift","id":1,"start":"09:00:00","end":"17:00:00"}
{"kind":"employee","id":1,"code":"E001","name":"Lovelace, Ada","department_id":10,"department_name":"Ops","shift_id":1}
{"kind":"employee","id":2,"code":"E002","name":"Babbage, Charles","department_id":20,"department_name":"R&D","shift_id":1}
{"kind":"punch","employee_code":"E001","timestamp":"2024-01-02T09:20:00","direction":"in"}
{"kind":"punch","employee_code":"E001","timestamp":"2024-01-02T17:05:00","direction":"out"}
{"kind":"punch","employee_code":"E002","timestamp":"2024-01-02T09:00:00","direction":"in"}
"#;

    fn database() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let batch = import::parse_lines(Cursor::new(FIXTURE)).unwrap();
        import::write_batch(&mut db, &batch).unwrap();
        db
    }

    fn args(argv: &[&str]) -> ExportArgs {
        let cli = Cli::try_parse_from(std::iter::once("att").chain(argv.iter().copied())).unwrap();
        match cli.command {
            Some(Commands::Export(args)) => args,
            other => panic!("expected export, got {other:?}"),
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn render_text(argv: &[&str]) -> String {
        let db = database();
        let reporter = CohortReporter::new(&db, &db, &db);
        let generated_at = jan(8).and_hms_opt(7, 30, 0).unwrap();
        let rendered = render(&reporter, &args(argv), jan(8), generated_at).unwrap();
        String::from_utf8(rendered.bytes).unwrap()
    }

    #[test]
    fn daily_export_ignores_pagination_and_escapes_commas() {
        let text = render_text(&["export", "--date", "2024-01-02", "--sort", "checkin"]);
        assert_snapshot!(text, @r"
        Daily Attendance 2024-01-02
        Generated: 2024-01-08 07:30:00
        EmployeeCode,EmployeeName,Department,Date,Status,CheckIn,CheckOut,WorkDuration,Overtime,IsLate,LateBy,IsEarlyLeave,EarlyBy
        E002,Babbage; Charles,R&D,2024-01-02,HalfDay,09:00:00,,,,false,,false,
        E001,Lovelace; Ada,Ops,2024-01-02,Present,09:20:00,17:05:00,07:45:00,,true,00:05:00,false,
        ");
    }

    #[test]
    fn period_export_with_custom_title() {
        let text = render_text(&[
            "export",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-02",
            "--department",
            "10",
            "--title",
            "Ops, first days",
        ]);
        assert_snapshot!(text, @r"
        Ops, first days
        Generated: 2024-01-08 07:30:00
        EmployeeCode,EmployeeName,Department,StartDate,EndDate,PresentDays,AbsentDays,LateDays,HalfDays,WorkingDays,TotalWork,TotalOvertime,AttendancePercentage
        E001,Lovelace; Ada,Ops,2024-01-01,2024-01-02,1,1,0,0,2,07:45:00,00:00:00,50.00
        ");
    }

    #[test]
    fn log_export() {
        let text = render_text(&["export", "--date", "2024-01-02", "--logs"]);
        assert_snapshot!(text, @r"
        Punch Log 2024-01-02
        Generated: 2024-01-08 07:30:00
        EmployeeCode,EmployeeName,Department,Date,PunchCount,FirstIn,LastOut,Status
        E002,Babbage; Charles,R&D,2024-01-02,1,09:00:00,,Partial
        E001,Lovelace; Ada,Ops,2024-01-02,2,09:20:00,17:05:00,Present
        ");
    }

    #[test]
    fn writes_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.txt");
        let db = database();
        let reporter = CohortReporter::new(&db, &db, &db);
        let args = args(&[
            "export",
            "--date",
            "2024-01-02",
            "--output",
            path.to_str().unwrap(),
        ]);

        let mut out = Vec::new();
        run(
            &mut out,
            &reporter,
            &args,
            jan(8),
            jan(8).and_hms_opt(7, 30, 0).unwrap(),
        )
        .unwrap();

        let message = String::from_utf8(out).unwrap();
        assert!(message.starts_with("Wrote 2 rows to "));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 5);
    }
}
