pub mod schedule;
pub mod streaming;

pub use schedule::{
    Event, EventInstance, EventSchedule, EventType, Frequency, Recurrence, RecurrenceRule,
    ScheduleListResponse, Show, Weekday, WeekdayRule,
};
pub use streaming::{Availability, Credentials, Format, RecorderAccess, Reservation, ReserveRequest};
