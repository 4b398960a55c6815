//! Value objects crossing the streaming service boundary.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audio container format of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Ogg,
}

impl Format {
    /// Muxer name understood by the pipeline executor.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ogg => "ogg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Ogg => "audio/ogg",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of what currently occupies the uplink slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Identifier of the event that is currently being streamed.
    pub event: Option<Uuid>,
    /// When the availability was checked, naive UTC.
    pub checked_at: NaiveDateTime,
}

/// Short-lived credentials for connecting to the input listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Shared-secret passphrase for the inbound connection.
    pub token: String,
    /// When the token stops being accepted, naive UTC.
    pub expires_at: NaiveDateTime,
}

/// Access granted by the recording service for the record leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderAccess {
    pub credentials: Credentials,
    pub port: u16,
}

/// Request to reserve the uplink slot for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    /// Identifier of the event to stream.
    pub event: Uuid,
    /// Audio format of the stream.
    #[serde(default)]
    pub format: Format,
    /// Whether to record the stream while broadcasting it.
    #[serde(default)]
    pub record: bool,
}

/// A granted reservation: what the caller needs to start streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub credentials: Credentials,
    /// Port of the input listener to connect to.
    pub port: u16,
}
