//! Models mirroring the schedule service's wire format.
//!
//! The schedule service owns these entities; this side only reads them.
//! Timestamps are naive: event `start`/`end` are local to the event's
//! timezone, instance times likewise. All JSON field names are camelCase.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of broadcast an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Live,
    Replay,
    Prerecorded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Recurrence frequency, RFC 5545 style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayRule {
    pub day: Weekday,
    #[serde(default)]
    pub occurrence: Option<i32>,
}

/// Recurrence rule of an event. Carried through untouched; the schedule
/// service expands rules into instances, this side never does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrenceRule {
    pub frequency: Option<Frequency>,
    pub until: Option<NaiveDateTime>,
    pub count: Option<u32>,
    pub interval: Option<u32>,
    pub by_weekdays: Option<Vec<WeekdayRule>>,
    pub by_monthdays: Option<Vec<i32>>,
    pub by_months: Option<Vec<u32>>,
    pub week_start: Option<Weekday>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recurrence {
    pub rule: Option<RecurrenceRule>,
    pub include: Option<Vec<NaiveDateTime>>,
    pub exclude: Option<Vec<NaiveDateTime>>,
}

/// A scheduled event as the schedule service reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub show_id: Uuid,
    /// Present only when the show relation was requested.
    #[serde(default)]
    pub show: Option<Show>,
    /// Start of the first occurrence, local to `timezone`.
    pub start: NaiveDateTime,
    /// End of the first occurrence, local to `timezone`.
    pub end: NaiveDateTime,
    /// IANA timezone the naive times are expressed in. An unknown zone
    /// name fails deserialization of the whole response.
    pub timezone: Tz,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

/// One concrete occurrence of an event, in event-local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInstance {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSchedule {
    pub event: Event,
    pub instances: Vec<EventInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleListResponse {
    pub count: u64,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    pub schedules: Vec<EventSchedule>,
}
