//! HTTP clients for the external schedule and recording services.

pub mod recorder;
pub mod retry;
pub mod schedule;

pub use recorder::RecorderClient;
pub use schedule::ScheduleClient;

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Status code of the service response, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the call could plausibly succeed. Server errors
    /// count; application responses (4xx) and malformed payloads do not.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
