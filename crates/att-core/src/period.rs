//! Period aggregation.
//!
//! Runs the daily classifier over every calendar date of an inclusive range
//! and folds the records into per-employee totals.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::classify::{ClassifierConfig, DailyAttendanceRecord, DailyStatus, classify_day};
use crate::duration;
use crate::error::ReportError;
use crate::punch_log::PunchLog;
use crate::types::{EmployeeIdentity, ShiftSchedule};

/// Attendance for one employee over `[start, end]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAttendanceReport {
    pub employee: EmployeeIdentity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// One record per calendar day, in date order.
    pub days: Vec<DailyAttendanceRecord>,
    pub present_days: u32,
    pub absent_days: u32,
    /// Always zero unless lateness is promoted to a status.
    pub late_days: u32,
    pub half_days: u32,
    pub working_days: u32,
    #[serde(with = "duration::seconds")]
    pub total_work: Duration,
    #[serde(with = "duration::seconds")]
    pub total_overtime: Duration,
    pub attendance_percentage: f64,
}

impl PeriodAttendanceReport {
    /// Days counted as attended for the percentage.
    pub const fn attended_days(&self) -> u32 {
        self.present_days + self.late_days + self.half_days
    }
}

/// Saturday and Sunday are the only non-working days.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of working days in `[start, end]`. Zero for an inverted range.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut count = 0;
    for date in start.iter_days().take_while(|d| *d <= end) {
        if is_working_day(date) {
            count += 1;
        }
    }
    count
}

/// `attended / working × 100`, clamped to \[0, 100\]; zero when there are no
/// working days.
pub fn attendance_percentage(attended_days: u32, working_days: u32) -> f64 {
    if working_days == 0 {
        return 0.0;
    }
    (f64::from(attended_days) / f64::from(working_days) * 100.0).min(100.0)
}

/// Builds one employee's report for `[start, end]`.
///
/// Without a shift, lateness, early leave and the half-day duration rule are
/// skipped. Upstream overtime from `log` is attached to each day.
pub fn build_period_report(
    employee: EmployeeIdentity,
    shift: Option<&ShiftSchedule>,
    start: NaiveDate,
    end: NaiveDate,
    log: &PunchLog,
    config: &ClassifierConfig,
) -> Result<PeriodAttendanceReport, ReportError> {
    ReportError::check_range(start, end)?;

    let days: Vec<DailyAttendanceRecord> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            classify_day(date, log.events_on(date), shift, config)
                .with_overtime(log.overtime_on(date))
        })
        .collect();

    let mut present_days = 0;
    let mut absent_days = 0;
    let mut late_days = 0;
    let mut half_days = 0;
    let mut total_work = Duration::zero();
    let mut total_overtime = Duration::zero();

    for day in &days {
        match day.status {
            DailyStatus::Present => present_days += 1,
            DailyStatus::Absent => absent_days += 1,
            DailyStatus::Late => late_days += 1,
            DailyStatus::HalfDay => half_days += 1,
        }
        if let Some(work) = day.work_duration {
            total_work += work;
        }
        if let Some(overtime) = day.overtime {
            total_overtime += overtime;
        }
    }

    let working_days = working_days(start, end);
    let attendance_percentage =
        attendance_percentage(present_days + late_days + half_days, working_days);

    Ok(PeriodAttendanceReport {
        employee,
        start,
        end,
        days,
        present_days,
        absent_days,
        late_days,
        half_days,
        working_days,
        total_work,
        total_overtime,
        attendance_percentage,
    })
}
