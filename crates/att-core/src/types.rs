//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid punch direction value.
    #[error("invalid punch direction: {value}")]
    InvalidDirection { value: String },

    /// Invalid attendance status value.
    #[error("invalid attendance status: {value}")]
    InvalidStatus { value: String },

    /// Invalid late policy value.
    #[error("invalid late policy: {value}")]
    InvalidLatePolicy { value: String },

    /// Invalid fetch strategy value.
    #[error("invalid fetch strategy: {value}")]
    InvalidFetchStrategy { value: String },
}

/// A validated employee code.
///
/// Codes are the identifiers printed on badges and sent by clock devices.
/// They must be non-empty; uniqueness is enforced by the directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeCode(String);

impl EmployeeCode {
    /// Creates a new code after validation. Surrounding whitespace is trimmed.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "employee code",
            });
        }
        if trimmed.len() == code.len() {
            Ok(Self(code))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmployeeCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmployeeCode> for String {
    fn from(code: EmployeeCode) -> Self {
        code.0
    }
}

impl fmt::Display for EmployeeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmployeeCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Direction of a single clock action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunchDirection {
    /// Clock-in.
    In,
    /// Clock-out.
    Out,
}

impl PunchDirection {
    /// String representation for storage and export.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for PunchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PunchDirection {
    type Err = ValidationError;

    /// Accepts the canonical names, the `check_in`/`check_out` spellings and
    /// the numeric punch-state codes reported by clock devices.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "check_in" | "checkin" | "0" => Ok(Self::In),
            "out" | "check_out" | "checkout" | "1" => Ok(Self::Out),
            _ => Err(ValidationError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for PunchDirection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PunchDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single timestamped clock action for one employee.
///
/// Timestamps are local wall-clock times, the same frame shift schedules are
/// expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub employee_code: EmployeeCode,
    pub timestamp: NaiveDateTime,
    pub direction: PunchDirection,
}

impl PunchEvent {
    pub const fn new(
        employee_code: EmployeeCode,
        timestamp: NaiveDateTime,
        direction: PunchDirection,
    ) -> Self {
        Self {
            employee_code,
            timestamp,
            direction,
        }
    }

    /// Calendar date the punch falls on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// An employee's expected working window for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_end: Option<NaiveTime>,
}

impl ShiftSchedule {
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            break_start: None,
            break_end: None,
        }
    }

    #[must_use]
    pub const fn with_break(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.break_start = Some(start);
        self.break_end = Some(end);
        self
    }

    /// Shift start anchored on `date`.
    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start)
    }

    /// Shift end anchored on `date`.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.end)
    }
}

/// A directory entry for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub code: EmployeeCode,
    pub name: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default)]
    pub designation_id: Option<i64>,
    #[serde(default)]
    pub shift_id: Option<i64>,
}

/// Identity fields carried on report rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeIdentity {
    pub id: i64,
    pub code: EmployeeCode,
    pub name: String,
    pub department_name: Option<String>,
}

impl From<&Employee> for EmployeeIdentity {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            code: employee.code.clone(),
            name: employee.name.clone(),
            department_name: employee.department_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_code_rejects_empty() {
        assert!(EmployeeCode::new("").is_err());
        assert!(EmployeeCode::new("   ").is_err());
        assert!(EmployeeCode::new("E001").is_ok());
    }

    #[test]
    fn employee_code_trims_whitespace() {
        let code = EmployeeCode::new(" E001 ").unwrap();
        assert_eq!(code.as_str(), "E001");
    }

    #[test]
    fn employee_code_serde_rejects_empty() {
        let result: Result<EmployeeCode, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn punch_direction_parses_device_codes() {
        assert_eq!("0".parse::<PunchDirection>().unwrap(), PunchDirection::In);
        assert_eq!("1".parse::<PunchDirection>().unwrap(), PunchDirection::Out);
        assert_eq!(
            "Check_In".parse::<PunchDirection>().unwrap(),
            PunchDirection::In
        );
        assert_eq!("OUT".parse::<PunchDirection>().unwrap(), PunchDirection::Out);
        assert!("sideways".parse::<PunchDirection>().is_err());
    }

    #[test]
    fn punch_event_deserializes_from_json() {
        let json = r#"{"employee_code":"E001","timestamp":"2024-01-02T09:20:00","direction":"in"}"#;
        let event: PunchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.employee_code.as_str(), "E001");
        assert_eq!(event.direction, PunchDirection::In);
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn shift_anchors_on_date() {
        let shift = ShiftSchedule::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(shift.start_on(date).to_string(), "2024-01-02 09:00:00");
        assert_eq!(shift.end_on(date).to_string(), "2024-01-02 17:00:00");
    }
}
