//! One employee's punches bucketed by calendar date.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::types::PunchEvent;

/// Day → punches lookup, plus any overtime recorded upstream per day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunchLog {
    days: BTreeMap<NaiveDate, Vec<PunchEvent>>,
    overtime: BTreeMap<NaiveDate, Duration>,
}

impl PunchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a punch under the date of its timestamp.
    pub fn push(&mut self, event: PunchEvent) {
        self.days.entry(event.date()).or_default().push(event);
    }

    /// Records upstream overtime for `date`, replacing any previous value.
    pub fn set_overtime(&mut self, date: NaiveDate, overtime: Duration) {
        self.overtime.insert(date, overtime);
    }

    /// Punches recorded on `date`, in arrival order.
    pub fn events_on(&self, date: NaiveDate) -> &[PunchEvent] {
        self.days.get(&date).map_or(&[], Vec::as_slice)
    }

    pub fn overtime_on(&self, date: NaiveDate) -> Option<Duration> {
        self.overtime.get(&date).copied()
    }

    /// Total number of punches across all days.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Extend<PunchEvent> for PunchLog {
    fn extend<I: IntoIterator<Item = PunchEvent>>(&mut self, iter: I) {
        for event in iter {
            self.push(event);
        }
    }
}

impl FromIterator<PunchEvent> for PunchLog {
    fn from_iter<I: IntoIterator<Item = PunchEvent>>(iter: I) -> Self {
        let mut log = Self::new();
        log.extend(iter);
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::tests::{at, punch};
    use crate::types::PunchDirection;

    #[test]
    fn buckets_by_timestamp_date() {
        let mon = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let tue = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let log: PunchLog = [
            punch(at(tue, 9, 0, 0), PunchDirection::In),
            punch(at(mon, 9, 0, 0), PunchDirection::In),
            punch(at(mon, 17, 0, 0), PunchDirection::Out),
        ]
        .into_iter()
        .collect();

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_on(mon).len(), 2);
        assert_eq!(log.events_on(tue).len(), 1);
        assert!(log.events_on(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()).is_empty());
    }

    #[test]
    fn overtime_lookup() {
        let mon = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut log = PunchLog::new();
        assert_eq!(log.overtime_on(mon), None);
        log.set_overtime(mon, Duration::minutes(30));
        assert_eq!(log.overtime_on(mon), Some(Duration::minutes(30)));
        assert!(log.is_empty());
    }
}
