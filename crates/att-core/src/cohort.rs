//! Cohort reporting.
//!
//! Answers "attendance for a set of employees over a date or a range" with
//! filtering, sorting and pagination.
//!
//! # Processing Order
//!
//! 1. Resolve employees from the directory (identity/org filters)
//! 2. Fetch shifts and punches per employee, sequentially
//! 3. Classify or aggregate each employee (parallel, order preserving)
//! 4. Apply status / lateness / early-leave filters (daily form only)
//! 5. Sort, summarize the full set, then paginate
//!
//! Any feed failure aborts the whole report.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::{ClassifierConfig, DailyAttendanceRecord, DailyStatus, classify_day};
use crate::duration;
use crate::error::{FeedError, ReportError};
use crate::feed::{EmployeeDirectory, EmployeeFilter, PunchSource, ShiftCatalog};
use crate::log_summary::{LogSummary, summarize_punch_log};
use crate::period::{
    PeriodAttendanceReport, build_period_report, is_working_day, working_days,
};
use crate::punch_log::PunchLog;
use crate::types::{
    Employee, EmployeeCode, EmployeeIdentity, PunchEvent, ShiftSchedule, ValidationError,
};

/// How punches are pulled from the [`PunchSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// One round trip per employee per date.
    PerDay,
    /// One round trip per employee covering the whole range.
    #[default]
    PerRange,
}

impl FetchStrategy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerDay => "per-day",
            Self::PerRange => "per-range",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FetchStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-day" => Ok(Self::PerDay),
            "per-range" => Ok(Self::PerRange),
            _ => Err(ValidationError::InvalidFetchStrategy {
                value: s.to_string(),
            }),
        }
    }
}

/// Sort direction. Only an explicit `desc` is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => Self::Descending,
            _ => Self::Ascending,
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Normalizes a sort key: lowercase, separators dropped.
fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sort keys for single-day cohort rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DailySortKey {
    #[default]
    EmployeeName,
    DepartmentName,
    Status,
    CheckIn,
}

impl DailySortKey {
    /// `None` for an unrecognized key. A missing key is employee name.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(normalize_key).as_deref() {
            None | Some("employeename" | "name") => Some(Self::EmployeeName),
            Some("departmentname" | "department") => Some(Self::DepartmentName),
            Some("status" | "attendancestatus") => Some(Self::Status),
            Some("checkin" | "checkintime") => Some(Self::CheckIn),
            Some(_) => None,
        }
    }
}

/// Sort keys for period cohort rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodSortKey {
    #[default]
    EmployeeName,
    DepartmentName,
    AttendancePercentage,
    PresentDays,
}

impl PeriodSortKey {
    /// `None` for an unrecognized key. The daily keys `status` and `checkin`
    /// map to their period counterparts.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(normalize_key).as_deref() {
            None | Some("employeename" | "name") => Some(Self::EmployeeName),
            Some("departmentname" | "department") => Some(Self::DepartmentName),
            Some("attendancepercentage" | "percentage" | "status" | "attendancestatus") => {
                Some(Self::AttendancePercentage)
            }
            Some("presentdays" | "present" | "checkin" | "checkintime") => {
                Some(Self::PresentDays)
            }
            Some(_) => None,
        }
    }
}

/// A cohort report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortQuery {
    pub employee_id: Option<i64>,
    /// Case-insensitive substring of the employee code.
    pub employee_code: Option<String>,
    pub company_id: Option<i64>,
    pub department_id: Option<i64>,
    pub section_id: Option<i64>,
    pub status: Option<DailyStatus>,
    pub is_late: Option<bool>,
    pub is_early_leave: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for CohortQuery {
    fn default() -> Self {
        Self {
            employee_id: None,
            employee_code: None,
            company_id: None,
            department_id: None,
            section_id: None,
            status: None,
            is_late: None,
            is_early_leave: None,
            sort_by: None,
            sort_direction: None,
            page: 1,
            page_size: 50,
        }
    }
}

impl CohortQuery {
    /// The part of the query the directory can answer.
    pub fn employee_filter(&self) -> EmployeeFilter {
        EmployeeFilter {
            employee_id: self.employee_id,
            code_contains: self.employee_code.clone(),
            company_id: self.company_id,
            department_id: self.department_id,
            section_id: self.section_id,
        }
    }

    fn accepts(&self, record: &DailyAttendanceRecord) -> bool {
        self.status.is_none_or(|status| record.status == status)
            && self.is_late.is_none_or(|late| record.is_late == late)
            && self
                .is_early_leave
                .is_none_or(|early| record.is_early_leave == early)
    }

    /// Unrecognized sort keys order by employee name ascending, whatever the
    /// requested direction.
    fn daily_order(&self) -> (DailySortKey, SortDirection) {
        DailySortKey::parse(self.sort_by.as_deref()).map_or(
            (DailySortKey::EmployeeName, SortDirection::Ascending),
            |key| (key, self.direction()),
        )
    }

    fn period_order(&self) -> (PeriodSortKey, SortDirection) {
        PeriodSortKey::parse(self.sort_by.as_deref()).map_or(
            (PeriodSortKey::EmployeeName, SortDirection::Ascending),
            |key| (key, self.direction()),
        )
    }

    fn direction(&self) -> SortDirection {
        SortDirection::parse(self.sort_direction.as_deref())
    }
}

/// One employee's attendance on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAttendanceRow {
    pub employee: EmployeeIdentity,
    #[serde(flatten)]
    pub record: DailyAttendanceRecord,
}

/// One employee's coarse punch log summary on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummaryRow {
    pub employee: EmployeeIdentity,
    #[serde(flatten)]
    pub summary: LogSummary,
}

/// Aggregate across every row matched by a query, before pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub total_employees: usize,
    /// Employee-days folded into the counts.
    pub total_records: usize,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub half_day: u32,
    pub overall_attendance_percentage: f64,
    #[serde(with = "duration::seconds")]
    pub total_work: Duration,
    #[serde(with = "duration::seconds")]
    pub total_overtime: Duration,
    pub working_days: u32,
}

impl CohortSummary {
    /// Single-day summary. The overall percentage is the share of rows that
    /// are not `Absent`.
    pub fn from_daily(rows: &[DailyAttendanceRow], date: NaiveDate) -> Self {
        let mut summary = Self::empty(u32::from(is_working_day(date)));
        summary.total_employees = rows.len();
        summary.total_records = rows.len();

        let mut attended: u32 = 0;
        for row in rows {
            let record = &row.record;
            match record.status {
                DailyStatus::Present => summary.present += 1,
                DailyStatus::Absent => summary.absent += 1,
                DailyStatus::Late => summary.late += 1,
                DailyStatus::HalfDay => summary.half_day += 1,
            }
            if record.status != DailyStatus::Absent {
                attended += 1;
            }
            if let Some(work) = record.work_duration {
                summary.total_work += work;
            }
            if let Some(overtime) = record.overtime {
                summary.total_overtime += overtime;
            }
        }

        if !rows.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let total = rows.len() as f64;
            summary.overall_attendance_percentage = f64::from(attended) / total * 100.0;
        }
        summary
    }

    /// Range summary. The overall percentage is the mean of each employee's
    /// own percentage, not a ratio of the summed counts.
    pub fn from_period(reports: &[PeriodAttendanceReport], start: NaiveDate, end: NaiveDate) -> Self {
        let mut summary = Self::empty(working_days(start, end));
        summary.total_employees = reports.len();

        let mut percentage_sum = 0.0;
        for report in reports {
            summary.total_records += report.days.len();
            summary.present += report.present_days;
            summary.absent += report.absent_days;
            summary.late += report.late_days;
            summary.half_day += report.half_days;
            summary.total_work += report.total_work;
            summary.total_overtime += report.total_overtime;
            percentage_sum += report.attendance_percentage;
        }

        if !reports.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let count = reports.len() as f64;
            summary.overall_attendance_percentage = percentage_sum / count;
        }
        summary
    }

    fn empty(working_days: u32) -> Self {
        Self {
            total_employees: 0,
            total_records: 0,
            present: 0,
            absent: 0,
            late: 0,
            half_day: 0,
            overall_attendance_percentage: 0.0,
            total_work: Duration::zero(),
            total_overtime: Duration::zero(),
            working_days,
        }
    }
}

/// One page of a cohort report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortPage<R> {
    pub rows: Vec<R>,
    pub total_count: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub summary: CohortSummary,
}

impl<R> CohortPage<R> {
    /// Cuts `rows` down to the requested page.
    pub fn paginate(
        rows: Vec<R>,
        page: u32,
        page_size: u32,
        summary: CohortSummary,
    ) -> Result<Self, ReportError> {
        if page == 0 || page_size == 0 {
            return Err(ReportError::InvalidPage { page, page_size });
        }
        let total_count = rows.len();
        let size = page_size as usize;
        let skip = (page as usize - 1).saturating_mul(size);
        let total_pages = u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX);
        let rows = rows.into_iter().skip(skip).take(size).collect();
        Ok(Self {
            rows,
            total_count,
            page,
            page_size,
            total_pages,
            summary,
        })
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_department(a: &EmployeeIdentity, b: &EmployeeIdentity) -> Ordering {
    match (a.department_name.as_deref(), b.department_name.as_deref()) {
        (Some(a), Some(b)) => compare_text(a, b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Stable sort of daily rows.
pub fn sort_daily_rows(rows: &mut [DailyAttendanceRow], key: DailySortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            DailySortKey::EmployeeName => compare_text(&a.employee.name, &b.employee.name),
            DailySortKey::DepartmentName => compare_department(&a.employee, &b.employee),
            DailySortKey::Status => a.record.status.label().cmp(b.record.status.label()),
            DailySortKey::CheckIn => a.record.check_in.cmp(&b.record.check_in),
        };
        direction.apply(ordering)
    });
}

/// Stable sort of period reports.
pub fn sort_period_reports(
    reports: &mut [PeriodAttendanceReport],
    key: PeriodSortKey,
    direction: SortDirection,
) {
    reports.sort_by(|a, b| {
        let ordering = match key {
            PeriodSortKey::EmployeeName => compare_text(&a.employee.name, &b.employee.name),
            PeriodSortKey::DepartmentName => compare_department(&a.employee, &b.employee),
            PeriodSortKey::AttendancePercentage => {
                a.attendance_percentage.total_cmp(&b.attendance_percentage)
            }
            PeriodSortKey::PresentDays => a.present_days.cmp(&b.present_days),
        };
        direction.apply(ordering)
    });
}

/// Everything needed to classify one employee, fetched up front.
struct EmployeeInput {
    employee: Employee,
    shift: Option<ShiftSchedule>,
    log: PunchLog,
}

/// Drives the classifier and aggregator over a cohort of employees.
pub struct CohortReporter<'a> {
    directory: &'a dyn EmployeeDirectory,
    punches: &'a dyn PunchSource,
    shifts: &'a dyn ShiftCatalog,
    config: ClassifierConfig,
    fetch: FetchStrategy,
}

impl<'a> CohortReporter<'a> {
    pub fn new(
        directory: &'a dyn EmployeeDirectory,
        punches: &'a dyn PunchSource,
        shifts: &'a dyn ShiftCatalog,
    ) -> Self {
        Self {
            directory,
            punches,
            shifts,
            config: ClassifierConfig::default(),
            fetch: FetchStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn with_fetch_strategy(mut self, fetch: FetchStrategy) -> Self {
        self.fetch = fetch;
        self
    }

    /// Single-day cohort report, one page.
    pub fn daily(
        &self,
        query: &CohortQuery,
        date: NaiveDate,
    ) -> Result<CohortPage<DailyAttendanceRow>, ReportError> {
        let rows = self.daily_rows(query, date)?;
        let summary = CohortSummary::from_daily(&rows, date);
        CohortPage::paginate(rows, query.page, query.page_size, summary)
    }

    /// Every filtered and sorted daily row, without pagination.
    pub fn daily_rows(
        &self,
        query: &CohortQuery,
        date: NaiveDate,
    ) -> Result<Vec<DailyAttendanceRow>, ReportError> {
        let employees = self.resolve_employees(&query.employee_filter())?;
        let inputs = self.load_inputs(employees, date, date)?;

        let config = &self.config;
        let mut rows: Vec<DailyAttendanceRow> = inputs
            .par_iter()
            .map(|input| DailyAttendanceRow {
                employee: EmployeeIdentity::from(&input.employee),
                record: classify_day(date, input.log.events_on(date), input.shift.as_ref(), config)
                    .with_overtime(input.log.overtime_on(date)),
            })
            .collect();

        rows.retain(|row| query.accepts(&row.record));
        let (key, direction) = query.daily_order();
        sort_daily_rows(&mut rows, key, direction);
        Ok(rows)
    }

    /// Range cohort report, one page.
    ///
    /// Status, lateness and early-leave filters do not apply to ranges.
    pub fn period(
        &self,
        query: &CohortQuery,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CohortPage<PeriodAttendanceReport>, ReportError> {
        let reports = self.period_rows(query, start, end)?;
        let summary = CohortSummary::from_period(&reports, start, end);
        CohortPage::paginate(reports, query.page, query.page_size, summary)
    }

    /// Every sorted period report, without pagination.
    pub fn period_rows(
        &self,
        query: &CohortQuery,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PeriodAttendanceReport>, ReportError> {
        ReportError::check_range(start, end)?;
        if query.status.is_some() || query.is_late.is_some() || query.is_early_leave.is_some() {
            tracing::debug!("status and lateness filters are ignored for period reports");
        }

        let employees = self.resolve_employees(&query.employee_filter())?;
        let inputs = self.load_inputs(employees, start, end)?;

        let config = &self.config;
        let mut reports = inputs
            .par_iter()
            .map(|input| {
                build_period_report(
                    EmployeeIdentity::from(&input.employee),
                    input.shift.as_ref(),
                    start,
                    end,
                    &input.log,
                    config,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (key, direction) = query.period_order();
        sort_period_reports(&mut reports, key, direction);
        Ok(reports)
    }

    /// Single-employee period report. `None` if the code is unknown.
    pub fn employee_period(
        &self,
        code: &EmployeeCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PeriodAttendanceReport>, ReportError> {
        ReportError::check_range(start, end)?;
        let Some(employee) = self.find_employee(code)? else {
            return Ok(None);
        };
        let mut inputs = self.load_inputs(vec![employee], start, end)?;
        let Some(input) = inputs.pop() else {
            return Ok(None);
        };
        build_period_report(
            EmployeeIdentity::from(&input.employee),
            input.shift.as_ref(),
            start,
            end,
            &input.log,
            &self.config,
        )
        .map(Some)
    }

    /// Single-employee, single-day classification. `None` if the code is unknown.
    pub fn employee_day(
        &self,
        code: &EmployeeCode,
        date: NaiveDate,
    ) -> Result<Option<DailyAttendanceRow>, ReportError> {
        let Some(employee) = self.find_employee(code)? else {
            return Ok(None);
        };
        let mut inputs = self.load_inputs(vec![employee], date, date)?;
        Ok(inputs.pop().map(|input| DailyAttendanceRow {
            record: classify_day(
                date,
                input.log.events_on(date),
                input.shift.as_ref(),
                &self.config,
            )
            .with_overtime(input.log.overtime_on(date)),
            employee: EmployeeIdentity::from(&input.employee),
        }))
    }

    /// Coarse log summaries for every matched employee, sorted by name.
    pub fn log_summaries(
        &self,
        filter: &EmployeeFilter,
        date: NaiveDate,
    ) -> Result<Vec<LogSummaryRow>, ReportError> {
        let employees = self.resolve_employees(filter)?;
        let mut rows = Vec::with_capacity(employees.len());
        for employee in employees {
            let events = self.fetch_window(&employee.code, date, date)?;
            rows.push(LogSummaryRow {
                summary: summarize_punch_log(date, &events),
                employee: EmployeeIdentity::from(&employee),
            });
        }
        rows.sort_by(|a, b| compare_text(&a.employee.name, &b.employee.name));
        Ok(rows)
    }

    fn find_employee(&self, code: &EmployeeCode) -> Result<Option<Employee>, ReportError> {
        let employees = self.resolve_employees(&EmployeeFilter::for_code(code))?;
        Ok(employees.into_iter().find(|e| &e.code == code))
    }

    fn resolve_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ReportError> {
        let employees = self.directory.employees(filter).map_err(|source| {
            upstream("employee lookup", "employee directory".to_string(), source)
        })?;
        tracing::debug!(employees = employees.len(), ?filter, "resolved cohort");
        Ok(employees)
    }

    /// Fetches shifts and punches for each employee in order. The first
    /// failure aborts the batch.
    fn load_inputs(
        &self,
        employees: Vec<Employee>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EmployeeInput>, ReportError> {
        // Per-request only; many employees share a shift.
        let mut shift_cache: HashMap<i64, Option<ShiftSchedule>> = HashMap::new();
        let mut inputs = Vec::with_capacity(employees.len());

        for employee in employees {
            let shift = match employee.shift_id {
                Some(shift_id) => {
                    if let Some(cached) = shift_cache.get(&shift_id) {
                        *cached
                    } else {
                        let shift = self.shifts.shift(shift_id).map_err(|source| {
                            upstream("shift lookup", employee.code.to_string(), source)
                        })?;
                        if shift.is_none() {
                            tracing::debug!(employee = %employee.code, shift_id, "shift not found");
                        }
                        shift_cache.insert(shift_id, shift);
                        shift
                    }
                }
                None => None,
            };

            let log = self.load_log(&employee.code, start, end)?;
            tracing::debug!(
                employee = %employee.code,
                punches = log.len(),
                strategy = %self.fetch,
                "loaded punches"
            );
            inputs.push(EmployeeInput {
                employee,
                shift,
                log,
            });
        }

        Ok(inputs)
    }

    fn load_log(
        &self,
        code: &EmployeeCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PunchLog, ReportError> {
        let mut log = PunchLog::new();
        match self.fetch {
            FetchStrategy::PerRange => log.extend(self.fetch_window(code, start, end)?),
            FetchStrategy::PerDay => {
                for date in start.iter_days().take_while(|d| *d <= end) {
                    log.extend(self.fetch_window(code, date, date)?);
                }
            }
        }

        let overtime = self
            .punches
            .overtime(code, start, end)
            .map_err(|source| upstream("overtime lookup", code.to_string(), source))?;
        for (date, amount) in overtime {
            log.set_overtime(date, amount);
        }
        Ok(log)
    }

    /// Punches in `[first 00:00, last+1 00:00)`.
    fn fetch_window(
        &self,
        code: &EmployeeCode,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<PunchEvent>, ReportError> {
        let from = first.and_time(NaiveTime::MIN);
        let to = last.and_time(NaiveTime::MIN) + Duration::days(1);
        self.punches
            .punch_events(code, from, to)
            .map_err(|source| upstream("punch fetch", code.to_string(), source))
    }
}

fn upstream(operation: &'static str, subject: String, source: FeedError) -> ReportError {
    tracing::error!(operation, subject = %subject, error = %source, "upstream feed failed");
    ReportError::Upstream {
        operation,
        subject,
        source,
    }
}
