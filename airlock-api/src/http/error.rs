// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

/// Application error with HTTP status code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Convert airlock_core errors to HTTP errors
impl From<airlock_core::Error> for AppError {
    fn from(err: airlock_core::Error) -> Self {
        use airlock_core::Error;

        match err {
            Error::InstanceNotFound(event) => {
                AppError::unprocessable(format!("No instance of event {event} found near now"))
            }
            Error::StreamBusy(event) => {
                AppError::conflict(format!("Stream is busy with event {event}"))
            }
            Error::RecordingBusy => {
                AppError::conflict("Recording service has no free capacity")
            }
            Error::Schedule(e) => {
                tracing::error!("Schedule service error: {}", e);
                AppError::bad_gateway("Schedule service unavailable")
            }
            Error::Recorder(e) => {
                tracing::error!("Recorder service error: {}", e);
                AppError::bad_gateway("Recording service unavailable")
            }
            Error::Pipeline(e) => {
                tracing::error!("Pipeline error: {}", e);
                AppError::internal_server_error("Failed to start stream pipeline")
            }
        }
    }
}
