//! Time helpers for the naive-UTC convention used on the wire.
//!
//! External services exchange timestamps as ISO-8601 strings without an
//! offset, interpreted as UTC. Event-local times carry their zone in a
//! separate IANA field on the event itself.

use chrono::{NaiveDateTime, Utc};

/// Current wall-clock time as a naive UTC datetime.
pub fn naive_utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Format a naive UTC datetime for query parameters and request bodies.
pub fn format_naive(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
