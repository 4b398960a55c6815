//! Client for the external schedule service.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::Client;
use uuid::Uuid;

use crate::config::ScheduleServiceConfig;
use crate::models::ScheduleListResponse;
use crate::time::format_naive;

use super::retry::with_retry;
use super::ClientError;

/// HTTP wrapper over the schedule service's `/schedule` listing endpoint.
pub struct ScheduleClient {
    client: Client,
    base_url: String,
}

impl ScheduleClient {
    pub fn new(config: &ScheduleServiceConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url(),
        })
    }

    /// List schedules overlapping `[start, end]` (naive UTC bounds),
    /// optionally filtered to a single event and with the show relation
    /// attached. Transient failures are retried per the shared policy.
    pub async fn list_schedules(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        event_id: Option<Uuid>,
        include_show: bool,
    ) -> Result<ScheduleListResponse, ClientError> {
        with_retry("Schedule lookup", || {
            self.fetch_schedules(start, end, event_id, include_show)
        })
        .await
    }

    async fn fetch_schedules(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        event_id: Option<Uuid>,
        include_show: bool,
    ) -> Result<ScheduleListResponse, ClientError> {
        let url = format!("{}/schedule", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("start", format_naive(start)),
            ("end", format_naive(end)),
        ];
        if let Some(id) = event_id {
            query.push(("where", serde_json::json!({ "id": id }).to_string()));
        }
        if include_show {
            query.push(("include", serde_json::json!({ "show": true }).to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ScheduleClient {
        let address = server.address();
        ScheduleClient::new(&ScheduleServiceConfig {
            scheme: "http".to_string(),
            host: address.ip().to_string(),
            port: address.port(),
            connect_timeout_seconds: 5,
        })
        .expect("client should build")
    }

    fn schedule_payload(event_id: Uuid) -> serde_json::Value {
        serde_json::json!({
            "count": 1,
            "limit": null,
            "offset": null,
            "schedules": [{
                "event": {
                    "id": event_id,
                    "type": "live",
                    "showId": "0a6e225c-4f3e-4a41-89a5-4c0b2f9a8c5d",
                    "start": "2024-03-01T10:00:00",
                    "end": "2024-03-01T12:00:00",
                    "timezone": "UTC"
                },
                "instances": [
                    { "start": "2024-03-01T10:00:00", "end": "2024-03-01T12:00:00" }
                ]
            }]
        })
    }

    fn window() -> (NaiveDateTime, NaiveDateTime) {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("date")
            .and_hms_opt(9, 0, 0)
            .expect("time");
        let end = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("date")
            .and_hms_opt(11, 0, 0)
            .expect("time");
        (start, end)
    }

    #[tokio::test]
    async fn test_list_schedules_sends_filters() {
        let server = MockServer::start().await;
        let event_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/schedule"))
            .and(query_param("start", "2024-03-01T09:00:00"))
            .and(query_param("end", "2024-03-01T11:00:00"))
            .and(query_param("where", format!(r#"{{"id":"{event_id}"}}"#)))
            .and(query_param("include", r#"{"show":true}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(schedule_payload(event_id)))
            .expect(1)
            .mount(&server)
            .await;

        let (start, end) = window();
        let response = client_for(&server)
            .list_schedules(start, end, Some(event_id), true)
            .await
            .expect("lookup should succeed");

        assert_eq!(response.schedules.len(), 1);
        assert_eq!(response.schedules[0].event.id, event_id);
    }

    #[tokio::test]
    async fn test_list_schedules_retries_server_errors() {
        let server = MockServer::start().await;
        let event_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/schedule"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/schedule"))
            .respond_with(ResponseTemplate::new(200).set_body_json(schedule_payload(event_id)))
            .expect(1)
            .mount(&server)
            .await;

        let (start, end) = window();
        let response = client_for(&server)
            .list_schedules(start, end, None, false)
            .await
            .expect("third attempt should succeed");

        assert_eq!(response.count, 1);
    }

    #[tokio::test]
    async fn test_list_schedules_surfaces_malformed_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/schedule"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let (start, end) = window();
        let err = client_for(&server)
            .list_schedules(start, end, None, false)
            .await
            .expect_err("parse failure expected");

        assert!(matches!(err, ClientError::Parse(_)));
    }
}
