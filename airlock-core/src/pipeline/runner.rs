//! Builds pipeline topologies from reservation parameters.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::Config;
use crate::models::{Credentials, Event, EventInstance, Format, RecorderAccess};
use crate::time::naive_utc_now;

use super::{
    InputNode, OutputNode, PipelineError, PipelineHandle, PipelineTopology, SinkNode,
    StreamFactory, TeeBranch, TeeNode,
};

pub struct PipelineRunner {
    config: Arc<Config>,
    factory: Arc<dyn StreamFactory>,
}

impl PipelineRunner {
    pub fn new(config: Arc<Config>, factory: Arc<dyn StreamFactory>) -> Self {
        Self { config, factory }
    }

    /// Build the topology for a reservation and start it.
    pub async fn run(
        &self,
        event: &Event,
        instance: &EventInstance,
        credentials: &Credentials,
        port: u16,
        format: Format,
        recorder: Option<&RecorderAccess>,
    ) -> Result<PipelineHandle, PipelineError> {
        let topology = self.build_topology(event, credentials, port, format, recorder);

        info!(
            event = %event.id,
            instance_start = %instance.start,
            recording = recorder.is_some(),
            "Starting stream pipeline"
        );

        self.factory.create(topology).await
    }

    fn build_topology(
        &self,
        event: &Event,
        credentials: &Credentials,
        port: u16,
        format: Format,
        recorder: Option<&RecorderAccess>,
    ) -> PipelineTopology {
        PipelineTopology {
            input: self.build_input(credentials, port),
            output: self.build_output(event, format, recorder),
        }
    }

    fn build_input(&self, credentials: &Credentials, port: u16) -> InputNode {
        InputNode {
            host: self.config.server.host.clone(),
            port,
            passphrase: credentials.token.clone(),
            listen_timeout_us: remaining_micros(credentials.expires_at, naive_utc_now()),
        }
    }

    fn build_output(
        &self,
        event: &Event,
        format: Format,
        recorder: Option<&RecorderAccess>,
    ) -> OutputNode {
        let metadata = build_metadata(event);

        match recorder {
            None => OutputNode::Sink(SinkNode {
                host: self.config.broadcast.host.clone(),
                port: self.config.broadcast.port,
                format,
                metadata,
            }),
            Some(access) => OutputNode::Tee(TeeNode {
                branches: vec![
                    TeeBranch {
                        host: self.config.broadcast.host.clone(),
                        port: self.config.broadcast.port,
                        format,
                        passphrase: None,
                        ignore_failures: false,
                    },
                    TeeBranch {
                        host: self.config.recorder.host.clone(),
                        port: access.port,
                        format,
                        passphrase: Some(access.credentials.token.clone()),
                        ignore_failures: true,
                    },
                ],
                metadata,
            }),
        }
    }
}

fn build_metadata(event: &Event) -> Vec<(String, String)> {
    let mut metadata = Vec::new();
    if let Some(show) = &event.show {
        metadata.push(("title".to_string(), show.title.clone()));
    }
    metadata
}

/// Microseconds from `now` until `expires_at`, rounded up, floored at zero.
/// The input listener stops waiting for a connection after this long.
fn remaining_micros(expires_at: NaiveDateTime, now: NaiveDateTime) -> u64 {
    let remaining = expires_at.signed_duration_since(now);
    if remaining <= chrono::TimeDelta::zero() {
        return 0;
    }
    remaining
        .num_nanoseconds()
        .map_or(u64::MAX, |ns| (ns as u64).div_ceil(1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, Show};
    use chrono::{NaiveDate, TimeDelta};
    use uuid::Uuid;

    fn test_event(with_show: bool) -> Event {
        let show_id = Uuid::new_v4();
        Event {
            id: Uuid::new_v4(),
            event_type: EventType::Live,
            show_id,
            show: with_show.then(|| Show {
                id: show_id,
                title: "Morning Show".to_string(),
                description: None,
            }),
            start: NaiveDate::from_ymd_opt(2024, 3, 1)
                .expect("date")
                .and_hms_opt(10, 0, 0)
                .expect("time"),
            end: NaiveDate::from_ymd_opt(2024, 3, 1)
                .expect("date")
                .and_hms_opt(12, 0, 0)
                .expect("time"),
            timezone: chrono_tz::UTC,
            recurrence: None,
        }
    }

    fn runner() -> PipelineRunner {
        struct NeverFactory;

        #[async_trait::async_trait]
        impl StreamFactory for NeverFactory {
            async fn create(
                &self,
                _topology: PipelineTopology,
            ) -> Result<PipelineHandle, PipelineError> {
                unreachable!("topology tests never start pipelines")
            }
        }

        PipelineRunner::new(Arc::new(Config::default()), Arc::new(NeverFactory))
    }

    fn credentials() -> Credentials {
        Credentials {
            token: "secret-token".to_string(),
            expires_at: naive_utc_now() + TimeDelta::minutes(1),
        }
    }

    #[test]
    fn test_remaining_micros_five_seconds() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time");
        assert_eq!(remaining_micros(now + TimeDelta::seconds(5), now), 5_000_000);
    }

    #[test]
    fn test_remaining_micros_rounds_up() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time");
        let expires = now + TimeDelta::seconds(5) + TimeDelta::nanoseconds(1);
        assert_eq!(remaining_micros(expires, now), 5_000_001);
    }

    #[test]
    fn test_remaining_micros_never_negative() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time");
        assert_eq!(remaining_micros(now - TimeDelta::seconds(5), now), 0);
        assert_eq!(remaining_micros(now, now), 0);
    }

    #[test]
    fn test_sink_output_without_recorder() {
        let runner = runner();
        let event = test_event(true);

        let topology = runner.build_topology(&event, &credentials(), 10300, Format::Ogg, None);

        assert_eq!(topology.input.port, 10300);
        assert_eq!(topology.input.passphrase, "secret-token");
        assert!(topology.input.listen_timeout_us > 0);
        match topology.output {
            OutputNode::Sink(sink) => {
                assert_eq!(sink.host, "localhost");
                assert_eq!(sink.port, 10100);
                assert_eq!(sink.format, Format::Ogg);
                assert_eq!(
                    sink.metadata,
                    vec![("title".to_string(), "Morning Show".to_string())]
                );
            }
            OutputNode::Tee(_) => panic!("expected a plain sink"),
        }
    }

    #[test]
    fn test_sink_metadata_empty_without_show() {
        let runner = runner();
        let event = test_event(false);

        let topology = runner.build_topology(&event, &credentials(), 10300, Format::Ogg, None);

        match topology.output {
            OutputNode::Sink(sink) => assert!(sink.metadata.is_empty()),
            OutputNode::Tee(_) => panic!("expected a plain sink"),
        }
    }

    #[test]
    fn test_tee_output_with_recorder() {
        let runner = runner();
        let event = test_event(true);
        let access = RecorderAccess {
            credentials: Credentials {
                token: "recorder-token".to_string(),
                expires_at: naive_utc_now() + TimeDelta::minutes(1),
            },
            port: 10800,
        };

        let topology =
            runner.build_topology(&event, &credentials(), 10300, Format::Ogg, Some(&access));

        match topology.output {
            OutputNode::Tee(tee) => {
                assert_eq!(tee.branches.len(), 2);
                assert_eq!(
                    tee.metadata,
                    vec![("title".to_string(), "Morning Show".to_string())]
                );

                let broadcast = &tee.branches[0];
                assert_eq!(broadcast.port, 10100);
                assert_eq!(broadcast.passphrase, None);
                assert!(!broadcast.ignore_failures);

                let recording = &tee.branches[1];
                assert_eq!(recording.port, 10800);
                assert_eq!(recording.passphrase.as_deref(), Some("recorder-token"));
                assert!(recording.ignore_failures);
            }
            OutputNode::Sink(_) => panic!("expected a tee"),
        }
    }
}
