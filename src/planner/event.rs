use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single planned event. Immutable once created; the store only ever
/// adds or removes whole events.
///
/// The serde representation doubles as the on-disk format: camelCase keys,
/// `date` as an ISO-8601 calendar date, `createdAt` as an ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub date: NaiveDate,
    /// Display string for the time of day ("09:00 AM"). Free-form; only
    /// presence is validated, and only `date` drives grid placement.
    pub time: String,
    pub created_at: DateTime<Local>,
}

impl Event {
    pub fn new(title: String, location: String, date: NaiveDate, time: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            location,
            date,
            time,
            created_at: Local::now(),
        }
    }

    /// True when this event belongs in the grid cell for `date`. Comparison
    /// is on local calendar-date components, never on instants.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}
