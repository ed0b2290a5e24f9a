//! Daily status classification.
//!
//! Turns one employee's punches for one calendar day, plus the employee's
//! shift (if any), into a [`DailyAttendanceRecord`].
//!
//! # Algorithm Summary
//!
//! 1. Keep only punches inside `[date 00:00, date+1 00:00)`
//! 2. Take the earliest IN as check-in and the latest OUT as check-out
//! 3. Derive status from which of the two exist and, with a shift, how long the
//!    employee stayed
//! 4. With a shift, flag lateness and early leave against the grace period
//!
//! Arrival order of punches never matters; only min/max are used.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::duration;
use crate::types::{PunchDirection, PunchEvent, ShiftSchedule, ValidationError};

/// How lateness shows up in the daily status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatePolicy {
    /// Lateness is only a flag; status is never [`DailyStatus::Late`].
    #[default]
    FlagOnly,
    /// Late-flagged `Present` days get status [`DailyStatus::Late`].
    PromoteToStatus,
}

impl LatePolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FlagOnly => "flag-only",
            Self::PromoteToStatus => "promote-to-status",
        }
    }
}

impl fmt::Display for LatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LatePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flag-only" => Ok(Self::FlagOnly),
            "promote-to-status" => Ok(Self::PromoteToStatus),
            _ => Err(ValidationError::InvalidLatePolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for daily classification.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Tolerance after shift start before a check-in is late, and before
    /// shift end after which a check-out is early.
    /// Default: 15 minutes.
    pub grace_period: Duration,

    /// With a shift, stays shorter than this are half days.
    /// Default: 4 hours.
    pub half_day_threshold: Duration,

    /// Default: [`LatePolicy::FlagOnly`].
    pub late_policy: LatePolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::minutes(15),
            half_day_threshold: Duration::hours(4),
            late_policy: LatePolicy::FlagOnly,
        }
    }
}

/// Classification outcome for one employee on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyStatus {
    Present,
    Absent,
    HalfDay,
    /// Only emitted under [`LatePolicy::PromoteToStatus`].
    Late,
}

impl DailyStatus {
    /// Display label, also used for status ordering in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::HalfDay => "HalfDay",
            Self::Late => "Late",
        }
    }
}

impl fmt::Display for DailyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for DailyStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "halfday" => Ok(Self::HalfDay),
            "late" => Ok(Self::Late),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Attendance for one employee on one calendar date.
///
/// Built fresh by [`classify_day`]; never mutated afterwards except to attach
/// upstream overtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendanceRecord {
    pub date: NaiveDate,
    pub status: DailyStatus,
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    #[serde(with = "duration::option_seconds")]
    pub work_duration: Option<Duration>,
    #[serde(with = "duration::option_seconds")]
    pub overtime: Option<Duration>,
    pub is_late: bool,
    #[serde(with = "duration::option_seconds")]
    pub late_by: Option<Duration>,
    pub is_early_leave: bool,
    #[serde(with = "duration::option_seconds")]
    pub early_by: Option<Duration>,
}

impl DailyAttendanceRecord {
    /// A day with no punches.
    pub const fn absent(date: NaiveDate) -> Self {
        Self {
            date,
            status: DailyStatus::Absent,
            check_in: None,
            check_out: None,
            work_duration: None,
            overtime: None,
            is_late: false,
            late_by: None,
            is_early_leave: false,
            early_by: None,
        }
    }

    /// Attaches overtime computed upstream.
    #[must_use]
    pub const fn with_overtime(mut self, overtime: Option<Duration>) -> Self {
        self.overtime = overtime;
        self
    }
}

/// Classifies one employee's day.
///
/// Punches outside the date's window are ignored. Never fails: malformed input
/// degrades to the status rules (e.g. an OUT before the IN yields a zero work
/// duration).
pub fn classify_day(
    date: NaiveDate,
    events: &[PunchEvent],
    shift: Option<&ShiftSchedule>,
    config: &ClassifierConfig,
) -> DailyAttendanceRecord {
    let window_start = date.and_time(NaiveTime::MIN);
    let window_end = window_start + Duration::days(1);

    let mut seen_any = false;
    let mut check_in: Option<NaiveDateTime> = None;
    let mut check_out: Option<NaiveDateTime> = None;

    for event in events
        .iter()
        .filter(|e| e.timestamp >= window_start && e.timestamp < window_end)
    {
        seen_any = true;
        let ts = event.timestamp;
        match event.direction {
            PunchDirection::In => check_in = Some(check_in.map_or(ts, |c| c.min(ts))),
            PunchDirection::Out => check_out = Some(check_out.map_or(ts, |c| c.max(ts))),
        }
    }

    if !seen_any {
        return DailyAttendanceRecord::absent(date);
    }

    let (mut status, work_duration) = match (check_in, check_out) {
        (Some(first_in), Some(last_out)) => {
            let work = (last_out - first_in).max(Duration::zero());
            let status = if shift.is_some() && work < config.half_day_threshold {
                DailyStatus::HalfDay
            } else {
                DailyStatus::Present
            };
            (status, Some(work))
        }
        (Some(_), None) => (DailyStatus::HalfDay, None),
        (None, _) => (DailyStatus::Absent, None),
    };

    let late_by = shift.zip(check_in).and_then(|(shift, first_in)| {
        let threshold = shift.start_on(date) + config.grace_period;
        (first_in > threshold).then(|| first_in - threshold)
    });

    let early_by = shift.zip(check_out).and_then(|(shift, last_out)| {
        let shift_end = shift.end_on(date);
        (last_out < shift_end - config.grace_period).then(|| shift_end - last_out)
    });

    if config.late_policy == LatePolicy::PromoteToStatus
        && status == DailyStatus::Present
        && late_by.is_some()
    {
        status = DailyStatus::Late;
    }

    DailyAttendanceRecord {
        date,
        status,
        check_in,
        check_out,
        work_duration,
        overtime: None,
        is_late: late_by.is_some(),
        late_by,
        is_early_leave: early_by.is_some(),
        early_by,
    }
}
