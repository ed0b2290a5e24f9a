//! Read-only feeds the engine consumes.
//!
//! These traits are the only way reports reach employees, shifts and punches,
//! so the classification logic can be driven by a database, fixtures, or
//! anything else that can answer the three questions.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::FeedError;
use crate::types::{Employee, EmployeeCode, PunchEvent, ShiftSchedule};

/// Directory-level employee filter. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub employee_id: Option<i64>,
    /// Case-insensitive substring of the employee code.
    pub code_contains: Option<String>,
    pub company_id: Option<i64>,
    pub department_id: Option<i64>,
    pub section_id: Option<i64>,
}

impl EmployeeFilter {
    /// Filter matching exactly one code.
    pub fn for_code(code: &EmployeeCode) -> Self {
        Self {
            code_contains: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Returns true if `employee` passes every populated criterion.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.employee_id.is_none_or(|id| employee.id == id)
            && self.code_contains.as_deref().is_none_or(|needle| {
                employee
                    .code
                    .as_str()
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
            && self
                .company_id
                .is_none_or(|id| employee.company_id == Some(id))
            && self
                .department_id
                .is_none_or(|id| employee.department_id == Some(id))
            && self
                .section_id
                .is_none_or(|id| employee.section_id == Some(id))
    }
}

/// Employee directory lookup.
pub trait EmployeeDirectory {
    fn employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, FeedError>;
}

/// Source of raw punch events.
pub trait PunchSource {
    /// Punches for `code` with `from <= timestamp < to`, in any order.
    fn punch_events(
        &self,
        code: &EmployeeCode,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<PunchEvent>, FeedError>;

    /// Overtime recorded upstream for `code` on dates in `[from, to]`.
    fn overtime(
        &self,
        code: &EmployeeCode,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Duration)>, FeedError> {
        let _ = (code, from, to);
        Ok(Vec::new())
    }
}

/// Shift definitions by id.
pub trait ShiftCatalog {
    fn shift(&self, shift_id: i64) -> Result<Option<ShiftSchedule>, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: i64, code: &str, department_id: Option<i64>) -> Employee {
        Employee {
            id,
            code: EmployeeCode::new(code).unwrap(),
            name: format!("Employee {id}"),
            company_id: Some(1),
            department_id,
            department_name: None,
            section_id: None,
            designation_id: None,
            shift_id: None,
        }
    }

    #[test]
    fn empty_filter_matches_everyone() {
        assert!(EmployeeFilter::default().matches(&employee(1, "E001", None)));
    }

    #[test]
    fn code_filter_is_case_insensitive_substring() {
        let filter = EmployeeFilter {
            code_contains: Some("emp-0".to_string()),
            ..EmployeeFilter::default()
        };
        assert!(filter.matches(&employee(1, "EMP-01", None)));
        assert!(!filter.matches(&employee(2, "CON-01", None)));
    }

    #[test]
    fn id_filters_require_populated_fields() {
        let filter = EmployeeFilter {
            department_id: Some(7),
            ..EmployeeFilter::default()
        };
        assert!(filter.matches(&employee(1, "E001", Some(7))));
        assert!(!filter.matches(&employee(2, "E002", Some(8))));
        assert!(!filter.matches(&employee(3, "E003", None)));
    }
}
