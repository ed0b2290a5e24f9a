//! Attendance classification and reporting.
//!
//! This crate contains the pure logic for:
//! - Classification: one employee, one day, punches in, status out
//! - Period aggregation: per-employee totals over a date range
//! - Cohort reporting: filtered, sorted, paginated reports across employees
//! - Export: flat text tables for any report row type
//!
//! Data arrives only through the traits in [`feed`].

mod classify;
pub mod cohort;
pub mod duration;
mod error;
pub mod export;
pub mod feed;
mod log_summary;
mod period;
mod punch_log;
pub mod types;

pub use classify::{
    ClassifierConfig, DailyAttendanceRecord, DailyStatus, LatePolicy, classify_day,
};
pub use cohort::{
    CohortPage, CohortQuery, CohortReporter, CohortSummary, DailyAttendanceRow, FetchStrategy,
    LogSummaryRow,
};
pub use error::{FeedError, ReportError};
pub use export::{FlatRow, export_to_flat_text};
pub use feed::{EmployeeDirectory, EmployeeFilter, PunchSource, ShiftCatalog};
pub use log_summary::{LogStatus, LogSummary, summarize_punch_log};
pub use period::{
    PeriodAttendanceReport, attendance_percentage, build_period_report, is_working_day,
    working_days,
};
pub use punch_log::PunchLog;
pub use types::{
    Employee, EmployeeCode, EmployeeIdentity, PunchDirection, PunchEvent, ShiftSchedule,
    ValidationError,
};
