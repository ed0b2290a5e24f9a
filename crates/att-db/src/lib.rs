//! Storage layer for the attendance engine.
//!
//! Persists employees, shifts, punches and upstream overtime using `rusqlite`,
//! and answers the engine's feed traits from them.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Reports call the feeds sequentially, so one instance per command is enough.
//!
//! # Schema
//!
//! Punch timestamps are local wall-clock TEXT in `YYYY-MM-DDTHH:MM:SS` with a
//! fractional part only when the punch has one (`09:20:00.250`). Lexicographic
//! order still matches chronological order, so range queries can use plain
//! string comparison. Shift times are `HH:MM:SS`, dates `YYYY-MM-DD`.
//!
//! Punches are deduplicated on `(employee_code, timestamp, direction)`;
//! re-importing the same device log is a no-op.

use std::path::Path;

use att_core::{
    Employee, EmployeeCode, EmployeeDirectory, EmployeeFilter, FeedError, PunchDirection,
    PunchEvent, PunchSource, ShiftCatalog, ShiftSchedule, ValidationError,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored date or time could not be parsed.
    #[error("invalid {column} value: {value}")]
    Parse {
        column: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// An employee code already belongs to another employee id.
    #[error("employee code {code} already belongs to employee {existing_id}, cannot assign it to {id}")]
    DuplicateCode {
        code: String,
        id: i64,
        existing_id: i64,
    },
    /// A stored code or direction failed validation.
    #[error("invalid stored value: {0}")]
    Validation(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A shift definition with its catalog id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRecord {
    pub id: i64,
    pub schedule: ShiftSchedule,
}

/// Overtime computed upstream for one employee on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimeRecord {
    pub employee_code: EmployeeCode,
    pub date: NaiveDate,
    pub duration: Duration,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub employees: usize,
    pub shifts: usize,
    pub punches: usize,
    pub overtime: usize,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database. Destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                company_id INTEGER,
                department_id INTEGER,
                department_name TEXT,
                section_id INTEGER,
                designation_id INTEGER,
                shift_id INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department_id);

            CREATE TABLE IF NOT EXISTS shifts (
                id INTEGER PRIMARY KEY,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                break_start TEXT,
                break_end TEXT
            );

            -- timestamp: local wall clock, e.g. '2024-01-02T09:20:00' or '2024-01-02T09:20:00.250'
            -- direction: 'in' or 'out'
            CREATE TABLE IF NOT EXISTS punches (
                id TEXT PRIMARY KEY,
                employee_code TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                direction TEXT NOT NULL,
                UNIQUE (employee_code, timestamp, direction)
            );

            CREATE INDEX IF NOT EXISTS idx_punches_employee_time ON punches(employee_code, timestamp);

            CREATE TABLE IF NOT EXISTS overtime (
                employee_code TEXT NOT NULL,
                date TEXT NOT NULL,
                seconds INTEGER NOT NULL,
                PRIMARY KEY (employee_code, date)
            );
            ",
        )?;
        Ok(())
    }

    /// Inserts or replaces employees by id.
    ///
    /// Fails with [`DbError::DuplicateCode`] if a code is already held by a
    /// different id; nothing from the batch is written.
    pub fn upsert_employees(&mut self, employees: &[Employee]) -> Result<usize, DbError> {
        if employees.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut owner = tx.prepare("SELECT id FROM employees WHERE code = ?1 AND id != ?2")?;
            let mut stmt = tx.prepare(
                "
                INSERT INTO employees
                (id, code, name, company_id, department_id, department_name, section_id, designation_id, shift_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    code = excluded.code,
                    name = excluded.name,
                    company_id = excluded.company_id,
                    department_id = excluded.department_id,
                    department_name = excluded.department_name,
                    section_id = excluded.section_id,
                    designation_id = excluded.designation_id,
                    shift_id = excluded.shift_id
                ",
            )?;
            for employee in employees {
                let existing_id: Option<i64> = owner
                    .query_row(params![employee.code.as_str(), employee.id], |row| row.get(0))
                    .optional()?;
                if let Some(existing_id) = existing_id {
                    return Err(DbError::DuplicateCode {
                        code: employee.code.to_string(),
                        id: employee.id,
                        existing_id,
                    });
                }
                written += stmt.execute(params![
                    employee.id,
                    employee.code.as_str(),
                    employee.name,
                    employee.company_id,
                    employee.department_id,
                    employee.department_name,
                    employee.section_id,
                    employee.designation_id,
                    employee.shift_id,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(written, "upserted employees");
        Ok(written)
    }

    /// Inserts or replaces shifts by id.
    pub fn upsert_shifts(&mut self, shifts: &[ShiftRecord]) -> Result<usize, DbError> {
        if shifts.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO shifts (id, start_time, end_time, break_start, break_end)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    break_start = excluded.break_start,
                    break_end = excluded.break_end
                ",
            )?;
            for shift in shifts {
                let schedule = &shift.schedule;
                written += stmt.execute(params![
                    shift.id,
                    format_time(schedule.start),
                    format_time(schedule.end),
                    schedule.break_start.map(format_time),
                    schedule.break_end.map(format_time),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(written, "upserted shifts");
        Ok(written)
    }

    /// Inserts punches, ignoring ones already recorded. Returns how many were new.
    pub fn insert_punches(&mut self, punches: &[PunchEvent]) -> Result<usize, DbError> {
        if punches.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO punches (id, employee_code, timestamp, direction)
                VALUES (?, ?, ?, ?)
                ",
            )?;
            for punch in punches {
                inserted += stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    punch.employee_code.as_str(),
                    format_timestamp(punch.timestamp),
                    punch.direction.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            inserted,
            duplicates = punches.len() - inserted,
            "inserted punches"
        );
        Ok(inserted)
    }

    /// Inserts or replaces overtime per employee and date.
    pub fn upsert_overtime(&mut self, records: &[OvertimeRecord]) -> Result<usize, DbError> {
        if records.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO overtime (employee_code, date, seconds)
                VALUES (?, ?, ?)
                ON CONFLICT(employee_code, date) DO UPDATE SET seconds = excluded.seconds
                ",
            )?;
            for record in records {
                written += stmt.execute(params![
                    record.employee_code.as_str(),
                    format_date(record.date),
                    record.duration.num_seconds(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Lists employees matching `filter`, ordered by id.
    ///
    /// The code filter is a case-insensitive substring match.
    pub fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, code, name, company_id, department_id, department_name, section_id, designation_id, shift_id
            FROM employees
            WHERE (?1 IS NULL OR id = ?1)
              AND (?2 IS NULL OR instr(lower(code), lower(?2)) > 0)
              AND (?3 IS NULL OR company_id = ?3)
              AND (?4 IS NULL OR department_id = ?4)
              AND (?5 IS NULL OR section_id = ?5)
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                filter.employee_id,
                filter.code_contains,
                filter.company_id,
                filter.department_id,
                filter.section_id,
            ],
            |row| {
                Ok(EmployeeRow {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    company_id: row.get(3)?,
                    department_id: row.get(4)?,
                    department_name: row.get(5)?,
                    section_id: row.get(6)?,
                    designation_id: row.get(7)?,
                    shift_id: row.get(8)?,
                })
            },
        )?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    /// Looks up one shift by id.
    pub fn get_shift(&self, shift_id: i64) -> Result<Option<ShiftSchedule>, DbError> {
        let row: Option<(String, String, Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT start_time, end_time, break_start, break_end FROM shifts WHERE id = ?",
                [shift_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((start, end, break_start, break_end)) = row else {
            return Ok(None);
        };
        Ok(Some(ShiftSchedule {
            start: parse_time(&start, "start_time")?,
            end: parse_time(&end, "end_time")?,
            break_start: break_start
                .map(|value| parse_time(&value, "break_start"))
                .transpose()?,
            break_end: break_end
                .map(|value| parse_time(&value, "break_end"))
                .transpose()?,
        }))
    }

    /// Lists punches for one employee with `from <= timestamp < to`, in time order.
    pub fn list_punches(
        &self,
        code: &EmployeeCode,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<PunchEvent>, DbError> {
        if to <= from {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT timestamp, direction
            FROM punches
            WHERE employee_code = ? AND timestamp >= ? AND timestamp < ?
            ORDER BY timestamp ASC, direction ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![code.as_str(), format_timestamp(from), format_timestamp(to)],
            |row| {
                let timestamp: String = row.get(0)?;
                let direction: String = row.get(1)?;
                Ok((timestamp, direction))
            },
        )?;
        let mut punches = Vec::new();
        for row in rows {
            let (timestamp, direction) = row?;
            punches.push(PunchEvent::new(
                code.clone(),
                parse_timestamp(&timestamp)?,
                direction.parse::<PunchDirection>()?,
            ));
        }
        Ok(punches)
    }

    /// Lists overtime for one employee on dates in `[from, to]`.
    pub fn list_overtime(
        &self,
        code: &EmployeeCode,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Duration)>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date, seconds
            FROM overtime
            WHERE employee_code = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![code.as_str(), format_date(from), format_date(to)],
            |row| {
                let date: String = row.get(0)?;
                let seconds: i64 = row.get(1)?;
                Ok((date, seconds))
            },
        )?;
        let mut overtime = Vec::new();
        for row in rows {
            let (date, seconds) = row?;
            overtime.push((parse_date(&date)?, Duration::seconds(seconds)));
        }
        Ok(overtime)
    }

    /// Row counts for every table.
    pub fn counts(&self) -> Result<TableCounts, DbError> {
        let count = |table: &str| -> Result<usize, DbError> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or_default())
        };
        Ok(TableCounts {
            employees: count("employees")?,
            shifts: count("shifts")?,
            punches: count("punches")?,
            overtime: count("overtime")?,
        })
    }
}

/// An employee row before the stored code is validated.
struct EmployeeRow {
    id: i64,
    code: String,
    name: String,
    company_id: Option<i64>,
    department_id: Option<i64>,
    department_name: Option<String>,
    section_id: Option<i64>,
    designation_id: Option<i64>,
    shift_id: Option<i64>,
}

impl EmployeeRow {
    fn into_employee(self) -> Result<Employee, DbError> {
        Ok(Employee {
            id: self.id,
            code: EmployeeCode::new(self.code)?,
            name: self.name,
            company_id: self.company_id,
            department_id: self.department_id,
            department_name: self.department_name,
            section_id: self.section_id,
            designation_id: self.designation_id,
            shift_id: self.shift_id,
        })
    }
}

impl EmployeeDirectory for Database {
    fn employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, FeedError> {
        Ok(self.list_employees(filter)?)
    }
}

impl PunchSource for Database {
    fn punch_events(
        &self,
        code: &EmployeeCode,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<PunchEvent>, FeedError> {
        Ok(self.list_punches(code, from, to)?)
    }

    fn overtime(
        &self,
        code: &EmployeeCode,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Duration)>, FeedError> {
        Ok(self.list_overtime(code, from, to)?)
    }
}

impl ShiftCatalog for Database {
    fn shift(&self, shift_id: i64) -> Result<Option<ShiftSchedule>, FeedError> {
        Ok(self.get_shift(shift_id)?)
    }
}

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| DbError::Parse {
        column: "timestamp",
        value: value.to_string(),
        source,
    })
}

fn parse_time(value: &str, column: &'static str) -> Result<NaiveTime, DbError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|source| DbError::Parse {
        column,
        value: value.to_string(),
        source,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DbError::Parse {
        column: "date",
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use att_core::{CohortQuery, CohortReporter, DailyStatus};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        date(day).and_hms_opt(h, m, 0).unwrap()
    }

    fn code(value: &str) -> EmployeeCode {
        EmployeeCode::new(value).unwrap()
    }

    fn employee(id: i64, value: &str, name: &str, department_id: i64) -> Employee {
        Employee {
            id,
            code: code(value),
            name: name.to_string(),
            company_id: Some(1),
            department_id: Some(department_id),
            department_name: Some(format!("Dept {department_id}")),
            section_id: None,
            designation_id: None,
            shift_id: Some(1),
        }
    }

    fn nine_to_five() -> ShiftRecord {
        ShiftRecord {
            id: 1,
            schedule: ShiftSchedule::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            ),
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_shifts(&[nine_to_five()]).unwrap();
        db.upsert_employees(&[
            employee(1, "EMP-001", "Ada", 10),
            employee(2, "EMP-002", "Bob", 20),
            employee(3, "CON-001", "Cyd", 10),
        ])
        .unwrap();
        db
    }

    #[test]
    fn open_in_memory_database() {
        assert!(Database::open_in_memory().is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(
            table_columns(&db.conn, "punches"),
            vec!["id", "employee_code", "timestamp", "direction"]
        );
        assert_eq!(
            table_columns(&db.conn, "shifts"),
            vec!["id", "start_time", "end_time", "break_start", "break_end"]
        );
        assert_eq!(
            table_columns(&db.conn, "overtime"),
            vec!["employee_code", "date", "seconds"]
        );
    }

    #[test]
    fn employee_filters() {
        let db = seeded();
        let all = db.list_employees(&EmployeeFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let by_code = db
            .list_employees(&EmployeeFilter {
                code_contains: Some("emp".to_string()),
                ..EmployeeFilter::default()
            })
            .unwrap();
        let names: Vec<&str> = by_code.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bob"]);

        let by_department = db
            .list_employees(&EmployeeFilter {
                department_id: Some(10),
                ..EmployeeFilter::default()
            })
            .unwrap();
        assert_eq!(by_department.len(), 2);
        assert_eq!(by_department[1].code.as_str(), "CON-001");
    }

    #[test]
    fn upsert_employee_replaces_fields() {
        let mut db = seeded();
        let mut renamed = employee(2, "EMP-002", "Robert", 20);
        renamed.shift_id = None;
        db.upsert_employees(&[renamed.clone()]).unwrap();

        let stored = db
            .list_employees(&EmployeeFilter {
                employee_id: Some(2),
                ..EmployeeFilter::default()
            })
            .unwrap();
        assert_eq!(stored, vec![renamed]);
    }

    #[test]
    fn reused_code_under_new_id_is_rejected() {
        let mut db = seeded();
        let err = db
            .upsert_employees(&[
                employee(4, "EMP-004", "Dee", 20),
                employee(5, "EMP-001", "Impostor", 10),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::DuplicateCode { ref code, id: 5, existing_id: 1 } if code == "EMP-001"
        ));
        assert!(err.to_string().contains("already belongs to employee 1"));

        // The whole batch rolled back.
        assert_eq!(db.counts().unwrap().employees, 3);
    }

    #[test]
    fn shift_roundtrip_with_break() {
        let mut db = Database::open_in_memory().unwrap();
        let schedule = nine_to_five().schedule.with_break(
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        );
        db.upsert_shifts(&[ShiftRecord { id: 7, schedule }]).unwrap();

        assert_eq!(db.get_shift(7).unwrap(), Some(schedule));
        assert_eq!(db.get_shift(8).unwrap(), None);
    }

    #[test]
    fn duplicate_punches_are_ignored() {
        let mut db = seeded();
        let punches = vec![
            PunchEvent::new(code("EMP-001"), at(2, 9, 0), PunchDirection::In),
            PunchEvent::new(code("EMP-001"), at(2, 17, 0), PunchDirection::Out),
        ];
        assert_eq!(db.insert_punches(&punches).unwrap(), 2);
        assert_eq!(db.insert_punches(&punches).unwrap(), 0);
        assert_eq!(db.counts().unwrap().punches, 2);
    }

    #[test]
    fn sub_second_punches_stay_distinct() {
        let mut db = seeded();
        let base = at(2, 9, 0);
        let first = base + Duration::milliseconds(250);
        let second = base + Duration::milliseconds(750);
        let punches = vec![
            PunchEvent::new(code("EMP-001"), second, PunchDirection::In),
            PunchEvent::new(code("EMP-001"), base, PunchDirection::In),
            PunchEvent::new(code("EMP-001"), first, PunchDirection::In),
        ];
        assert_eq!(db.insert_punches(&punches).unwrap(), 3);

        let stored: Vec<NaiveDateTime> = db
            .list_punches(&code("EMP-001"), at(2, 0, 0), at(3, 0, 0))
            .unwrap()
            .into_iter()
            .map(|p| p.timestamp)
            .collect();
        assert_eq!(stored, vec![base, first, second]);
    }

    #[test]
    fn punch_range_is_half_open() {
        let mut db = seeded();
        db.insert_punches(&[
            PunchEvent::new(code("EMP-001"), at(2, 0, 0), PunchDirection::In),
            PunchEvent::new(code("EMP-001"), at(3, 0, 0), PunchDirection::Out),
            PunchEvent::new(code("EMP-002"), at(2, 9, 0), PunchDirection::In),
        ])
        .unwrap();

        let punches = db
            .list_punches(&code("EMP-001"), at(2, 0, 0), at(3, 0, 0))
            .unwrap();
        assert_eq!(punches.len(), 1);
        assert_eq!(punches[0].timestamp, at(2, 0, 0));
        assert_eq!(punches[0].direction, PunchDirection::In);

        assert!(
            db.list_punches(&code("EMP-001"), at(3, 0, 0), at(2, 0, 0))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn overtime_range_is_inclusive() {
        let mut db = seeded();
        db.upsert_overtime(&[
            OvertimeRecord {
                employee_code: code("EMP-001"),
                date: date(2),
                duration: Duration::minutes(30),
            },
            OvertimeRecord {
                employee_code: code("EMP-001"),
                date: date(4),
                duration: Duration::minutes(45),
            },
        ])
        .unwrap();

        let overtime = db.list_overtime(&code("EMP-001"), date(2), date(3)).unwrap();
        assert_eq!(overtime, vec![(date(2), Duration::minutes(30))]);
    }

    #[test]
    fn reporter_reads_through_feeds() {
        let mut db = seeded();
        db.insert_punches(&[
            PunchEvent::new(code("EMP-001"), at(2, 9, 20), PunchDirection::In),
            PunchEvent::new(code("EMP-001"), at(2, 17, 5), PunchDirection::Out),
            PunchEvent::new(code("EMP-002"), at(2, 9, 0), PunchDirection::In),
        ])
        .unwrap();

        let reporter = CohortReporter::new(&db, &db, &db);
        let page = reporter.daily(&CohortQuery::default(), date(2)).unwrap();
        let statuses: Vec<(&str, DailyStatus, bool)> = page
            .rows
            .iter()
            .map(|r| (r.employee.name.as_str(), r.record.status, r.record.is_late))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("Ada", DailyStatus::Present, true),
                ("Bob", DailyStatus::HalfDay, false),
                ("Cyd", DailyStatus::Absent, false),
            ]
        );
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("att.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.upsert_employees(&[employee(1, "EMP-001", "Ada", 10)])
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.counts().unwrap().employees, 1);
    }
}
