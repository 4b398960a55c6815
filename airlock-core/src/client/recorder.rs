//! Client for the external recording service.

use std::time::Duration;

use reqwest::Client;
use uuid::Uuid;

use crate::config::RecorderServiceConfig;
use crate::models::{Format, RecorderAccess};

use super::retry::with_retry;
use super::ClientError;

/// HTTP wrapper over the recording service's `/record` endpoint.
///
/// A 409 response means the recorder has no spare capacity; it is returned
/// as `ClientError::Status` without retrying so the caller can tell it
/// apart from a recorder outage.
pub struct RecorderClient {
    client: Client,
    base_url: String,
}

impl RecorderClient {
    pub fn new(config: &RecorderServiceConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url(),
        })
    }

    /// Reserve a recording of `event_id` in `format`, returning the
    /// credentials and port for the record leg of the pipeline.
    pub async fn record(
        &self,
        event_id: Uuid,
        format: Format,
    ) -> Result<RecorderAccess, ClientError> {
        with_retry("Recording reservation", || {
            self.request_recording(event_id, format)
        })
        .await
    }

    async fn request_recording(
        &self,
        event_id: Uuid,
        format: Format,
    ) -> Result<RecorderAccess, ClientError> {
        let url = format!("{}/record", self.base_url);
        let body = serde_json::json!({
            "event": event_id,
            "format": format,
        });

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
