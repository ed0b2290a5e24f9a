//! Day command: classify one employee's day.

use std::io::{self, Write};

use anyhow::{Context, Result};
use att_core::{CohortReporter, DailyAttendanceRow, EmployeeCode};
use chrono::NaiveDate;

use super::util::{clock, employee_label, hms, write_json};

pub fn run<W: Write>(
    out: &mut W,
    reporter: &CohortReporter<'_>,
    code: &str,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let code = EmployeeCode::new(code)?;
    let row = reporter
        .employee_day(&code, date)?
        .with_context(|| format!("unknown employee: {code}"))?;

    if json {
        write_json(out, &row)
    } else {
        write_day(out, &row)?;
        Ok(())
    }
}

pub fn write_day<W: Write>(out: &mut W, row: &DailyAttendanceRow) -> io::Result<()> {
    let record = &row.record;
    writeln!(out, "{}", employee_label(&row.employee))?;
    writeln!(out, "Date:       {}", record.date)?;
    writeln!(out, "Status:     {}", record.status)?;
    writeln!(out, "Check-in:   {}", clock(record.check_in))?;
    writeln!(out, "Check-out:  {}", clock(record.check_out))?;
    writeln!(out, "Worked:     {}", hms(record.work_duration))?;
    writeln!(out, "Overtime:   {}", hms(record.overtime))?;
    writeln!(out, "Late by:    {}", hms(record.late_by))?;
    writeln!(out, "Early by:   {}", hms(record.early_by))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use att_core::{
        ClassifierConfig, EmployeeIdentity, PunchDirection, PunchEvent, ShiftSchedule,
        classify_day,
    };
    use chrono::{Duration, NaiveTime};
    use insta::assert_snapshot;

    fn row(events: &[(u32, u32, PunchDirection)]) -> DailyAttendanceRow {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let code = EmployeeCode::new("E001").unwrap();
        let events: Vec<PunchEvent> = events
            .iter()
            .map(|(h, m, direction)| {
                PunchEvent::new(code.clone(), date.and_hms_opt(*h, *m, 0).unwrap(), *direction)
            })
            .collect();
        let shift = ShiftSchedule::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        );
        DailyAttendanceRow {
            employee: EmployeeIdentity {
                id: 1,
                code,
                name: "Ada".to_string(),
                department_name: Some("Ops".to_string()),
            },
            record: classify_day(date, &events, Some(&shift), &ClassifierConfig::default()),
        }
    }

    fn render(row: &DailyAttendanceRow) -> String {
        let mut out = Vec::new();
        write_day(&mut out, row).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn late_full_day() {
        let mut row = row(&[(9, 20, PunchDirection::In), (17, 5, PunchDirection::Out)]);
        row.record.overtime = Some(Duration::minutes(30));
        assert_snapshot!(render(&row), @r"
        E001  Ada (Ops)
        Date:       2024-01-02
        Status:     Present
        Check-in:   09:20:00
        Check-out:  17:05:00
        Worked:     07:45:00
        Overtime:   00:30:00
        Late by:    00:05:00
        Early by:   -
        ");
    }

    #[test]
    fn early_leave_half_day() {
        let row = row(&[(9, 0, PunchDirection::In), (12, 30, PunchDirection::Out)]);
        assert_snapshot!(render(&row), @r"
        E001  Ada (Ops)
        Date:       2024-01-02
        Status:     HalfDay
        Check-in:   09:00:00
        Check-out:  12:30:00
        Worked:     03:30:00
        Overtime:   -
        Late by:    -
        Early by:   04:30:00
        ");
    }
}
