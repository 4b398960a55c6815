//! In-process event bus for availability notifications.
//!
//! Reservations and releases publish here; the SSE layer subscribes and
//! forwards payloads to HTTP clients. Publishing never blocks and never
//! fails: with no subscribers the event is simply dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Availability;
use crate::time::naive_utc_now;

/// Events published on the "events" channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    AvailabilityChanged {
        created_at: chrono::NaiveDateTime,
        data: AvailabilityChangedData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityChangedData {
    pub availability: Availability,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StreamEvent>,
}

impl EventBus {
    /// Create a new event bus with a bounded broadcast channel.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.sender.subscribe()
    }

    /// Notify subscribers that slot availability has changed.
    pub fn availability_changed(&self, availability: Availability) {
        let event = StreamEvent::AvailabilityChanged {
            created_at: naive_utc_now(),
            data: AvailabilityChangedData { availability },
        };
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_subscribers_receive_availability_changes() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let event_id = Uuid::new_v4();
        bus.availability_changed(Availability {
            event: Some(event_id),
            checked_at: naive_utc_now(),
        });

        let StreamEvent::AvailabilityChanged { data, .. } =
            rx.recv().await.expect("event should arrive");
        assert_eq!(data.availability.event, Some(event_id));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.availability_changed(Availability {
            event: None,
            checked_at: naive_utc_now(),
        });
    }

    #[test]
    fn test_event_wire_shape() {
        let event = StreamEvent::AvailabilityChanged {
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .expect("date")
                .and_hms_opt(12, 0, 0)
                .expect("time"),
            data: AvailabilityChangedData {
                availability: Availability {
                    event: None,
                    checked_at: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                        .expect("date")
                        .and_hms_opt(12, 0, 0)
                        .expect("time"),
                },
            },
        };

        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "availability-changed");
        assert!(json["createdAt"].is_string());
        assert!(json["data"]["availability"]["event"].is_null());
        assert!(json["data"]["availability"]["checkedAt"].is_string());
    }
}
