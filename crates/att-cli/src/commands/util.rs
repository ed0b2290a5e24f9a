//! Shared utilities for CLI commands.

use std::io::{self, Write};
use std::sync::LazyLock;

use anyhow::Context;
use att_core::duration::format_hms;
use att_core::{CohortQuery, EmployeeFilter, EmployeeIdentity};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::{FilterArgs, RecordFilterArgs, SelectionArgs, SortArgs};

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative dates (~1000 years in days).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// A single date or an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Day(NaiveDate),
    Range { from: NaiveDate, to: NaiveDate },
}

/// Today's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses a date as `YYYY-MM-DD`, `today`, `yesterday` or `N days|weeks ago`.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    parse_date_from(s, today())
}

/// Same as [`parse_date`] with an explicit reference date.
pub fn parse_date_from(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let lowered = s.to_ascii_lowercase();
    match lowered.as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(&lowered) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD, 'today', 'yesterday' or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date value too large: {n} {}", &caps[2]);
    }

    Ok(today - Duration::days(n * days_per_unit))
}

/// Resolves `--date` / `--from --to`, defaulting to today.
pub fn resolve_selection(args: &SelectionArgs, today: NaiveDate) -> anyhow::Result<Selection> {
    match (&args.date, &args.from, &args.to) {
        (Some(date), _, _) => Ok(Selection::Day(parse_date_from(date, today)?)),
        (None, Some(from), Some(to)) => Ok(Selection::Range {
            from: parse_date_from(from, today)?,
            to: parse_date_from(to, today)?,
        }),
        (None, None, None) => Ok(Selection::Day(today)),
        _ => anyhow::bail!("--from and --to must be given together"),
    }
}

impl From<&FilterArgs> for EmployeeFilter {
    fn from(args: &FilterArgs) -> Self {
        Self {
            employee_id: args.employee_id,
            code_contains: args.code.clone(),
            company_id: args.company,
            department_id: args.department,
            section_id: args.section,
        }
    }
}

/// Builds the core query from the shared CLI argument groups.
pub fn build_query(
    filter: &FilterArgs,
    records: &RecordFilterArgs,
    sort: &SortArgs,
    page: u32,
    page_size: u32,
) -> CohortQuery {
    CohortQuery {
        employee_id: filter.employee_id,
        employee_code: filter.code.clone(),
        company_id: filter.company,
        department_id: filter.department,
        section_id: filter.section,
        status: records.status,
        is_late: records.late,
        is_early_leave: records.early_leave,
        sort_by: sort.sort.clone(),
        sort_direction: sort.direction.clone(),
        page,
        page_size,
    }
}

/// `HH:MM:SS` of a timestamp, or `-`.
pub fn clock(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(|| "-".to_string(), |ts| ts.format("%H:%M:%S").to_string())
}

/// `HH:MM:SS` of a duration, or `-`.
pub fn hms(value: Option<Duration>) -> String {
    value.map_or_else(|| "-".to_string(), format_hms)
}

/// `CODE  Name (Department)`.
pub fn employee_label(employee: &EmployeeIdentity) -> String {
    match &employee.department_name {
        Some(department) => format!("{}  {} ({department})", employee.code, employee.name),
        None => format!("{}  {}", employee.code, employee.name),
    }
}

/// Pretty JSON followed by a newline.
pub fn write_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize JSON")?;
    writeln!(out)?;
    Ok(())
}

/// Truncates `value` to `width` characters, marking the cut with `…`.
pub fn fit(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Flushes and ignores broken pipes (e.g. `att cohort | head`).
pub fn finish<W: Write>(out: &mut W) -> io::Result<()> {
    match out.flush() {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn parse_date_accepts_iso_and_keywords() {
        let today = jan(10);
        assert_eq!(parse_date_from("2024-01-02", today).unwrap(), jan(2));
        assert_eq!(parse_date_from("today", today).unwrap(), jan(10));
        assert_eq!(parse_date_from("Yesterday", today).unwrap(), jan(9));
    }

    #[test]
    fn parse_date_relative() {
        let today = jan(10);
        assert_eq!(parse_date_from("3 days ago", today).unwrap(), jan(7));
        assert_eq!(parse_date_from("1 day ago", today).unwrap(), jan(9));
        assert_eq!(parse_date_from("1 week ago", today).unwrap(), jan(3));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let today = jan(10);
        assert!(parse_date_from("next tuesday", today).is_err());
        assert!(parse_date_from("2024-13-01", today).is_err());
        assert!(parse_date_from("999999999 weeks ago", today).is_err());
    }

    #[test]
    fn selection_defaults_to_today() {
        let today = jan(10);
        assert_eq!(
            resolve_selection(&SelectionArgs::default(), today).unwrap(),
            Selection::Day(today)
        );

        let range = SelectionArgs {
            date: None,
            from: Some("2024-01-01".to_string()),
            to: Some("yesterday".to_string()),
        };
        assert_eq!(
            resolve_selection(&range, today).unwrap(),
            Selection::Range {
                from: jan(1),
                to: jan(9)
            }
        );
    }

    #[test]
    fn fit_truncates_long_values() {
        assert_eq!(fit("Ada", 5), "Ada");
        assert_eq!(fit("Augusta Ada King", 8), "Augusta…");
    }
}
