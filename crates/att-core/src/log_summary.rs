//! Coarse per-day punch log summary.
//!
//! This is a separate vocabulary from [`crate::DailyStatus`]: it only looks at
//! whether an IN and an OUT were recorded, never at shifts or durations.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::types::{PunchDirection, PunchEvent};

/// Coarse status derived from the presence of IN and OUT punches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    /// Both an IN and an OUT were recorded.
    Present,
    /// Exactly one of IN or OUT was recorded.
    Partial,
    /// Neither was recorded.
    Absent,
}

impl LogStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Partial => "Partial",
            Self::Absent => "Absent",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Summary of the raw punches one employee made on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub date: NaiveDate,
    pub punch_count: usize,
    pub has_check_in: bool,
    pub has_check_out: bool,
    pub first_in: Option<NaiveDateTime>,
    pub last_out: Option<NaiveDateTime>,
    pub status: LogStatus,
}

/// Summarizes the punches recorded on `date`. Punches on other dates are ignored.
pub fn summarize_punch_log(date: NaiveDate, events: &[PunchEvent]) -> LogSummary {
    let window_start = date.and_time(NaiveTime::MIN);
    let window_end = window_start + Duration::days(1);

    let day: Vec<&PunchEvent> = events
        .iter()
        .filter(|e| e.timestamp >= window_start && e.timestamp < window_end)
        .collect();

    let first_in = day
        .iter()
        .filter(|e| e.direction == PunchDirection::In)
        .map(|e| e.timestamp)
        .min();
    let last_out = day
        .iter()
        .filter(|e| e.direction == PunchDirection::Out)
        .map(|e| e.timestamp)
        .max();

    let status = match (first_in.is_some(), last_out.is_some()) {
        (true, true) => LogStatus::Present,
        (false, false) => LogStatus::Absent,
        _ => LogStatus::Partial,
    };

    LogSummary {
        date,
        punch_count: day.len(),
        has_check_in: first_in.is_some(),
        has_check_out: last_out.is_some(),
        first_in,
        last_out,
        status,
    }
}
