//! Orchestrates reservations for the shared uplink slot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use http::StatusCode;
use rand::RngCore;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::client::{RecorderClient, ScheduleClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::models::{
    Availability, Credentials, EventInstance, EventSchedule, Format, RecorderAccess, Reservation,
    ReserveRequest,
};
use crate::pipeline::{PipelineExit, PipelineHandle, PipelineRunner};
use crate::time::naive_utc_now;

use super::slot::StreamSlot;

const TOKEN_BYTES: usize = 16;
const WATCHER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StreamingService {
    config: Arc<Config>,
    slot: Arc<StreamSlot>,
    schedule: ScheduleClient,
    recorder: RecorderClient,
    runner: PipelineRunner,
    watchers: TaskTracker,
}

impl StreamingService {
    pub fn new(
        config: Arc<Config>,
        events: EventBus,
        schedule: ScheduleClient,
        recorder: RecorderClient,
        runner: PipelineRunner,
    ) -> Self {
        Self {
            config,
            slot: Arc::new(StreamSlot::new(events)),
            schedule,
            recorder,
            runner,
            watchers: TaskTracker::new(),
        }
    }

    /// Report whether the slot is occupied and by which event.
    pub async fn check(&self) -> Availability {
        self.slot.current().await
    }

    /// Reserve the slot for an event and start its stream pipeline.
    ///
    /// External lookups run before the slot is claimed, so concurrent
    /// callers may both pay for them and only then race for the claim.
    /// Everything after the claim either commits it or rolls it back.
    pub async fn reserve(&self, request: ReserveRequest) -> Result<Reservation> {
        let reference = naive_utc_now();
        let (start, end) = self.search_window(reference);

        let schedule = self.find_schedule(request.event, start, end).await?;
        let instance = nearest_instance(reference, &schedule)
            .ok_or(Error::InstanceNotFound(request.event))?;

        let credentials = self.generate_credentials();
        let port = self.config.server.srt_port;

        let recorder = if request.record {
            Some(self.reserve_recorder(request.event, request.format).await?)
        } else {
            None
        };

        let claim = self.slot.claim(schedule.event.id).await?;

        match self
            .runner
            .run(
                &schedule.event,
                &instance,
                &credentials,
                port,
                request.format,
                recorder.as_ref(),
            )
            .await
        {
            Ok(handle) => {
                claim.commit();
                self.spawn_watcher(schedule.event.id, handle);
                Ok(Reservation { credentials, port })
            }
            Err(e) => {
                claim.abort().await;
                Err(e.into())
            }
        }
    }

    /// Stop accepting watchers and wait for running ones to finish.
    pub async fn shutdown(&self) {
        self.watchers.close();
        if tokio::time::timeout(WATCHER_DRAIN_TIMEOUT, self.watchers.wait())
            .await
            .is_err()
        {
            warn!("Timed out waiting for stream watchers to finish");
        }
    }

    fn search_window(&self, reference: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let half = self.config.streaming.window();
        (reference - half, reference + half)
    }

    async fn find_schedule(
        &self,
        event_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<EventSchedule> {
        let response = self
            .schedule
            .list_schedules(start, end, Some(event_id), true)
            .await
            .map_err(Error::Schedule)?;

        response
            .schedules
            .into_iter()
            .find(|schedule| schedule.event.id == event_id)
            .ok_or(Error::InstanceNotFound(event_id))
    }

    fn generate_credentials(&self) -> Credentials {
        Credentials {
            token: generate_token(),
            expires_at: naive_utc_now() + self.config.streaming.timeout(),
        }
    }

    async fn reserve_recorder(&self, event_id: Uuid, format: Format) -> Result<RecorderAccess> {
        self.recorder.record(event_id, format).await.map_err(|e| {
            if e.status() == Some(StatusCode::CONFLICT) {
                Error::RecordingBusy
            } else {
                Error::Recorder(e)
            }
        })
    }

    /// Watch the pipeline until it ends, then free the slot. The release
    /// runs on every exit path, success or failure.
    fn spawn_watcher(&self, event_id: Uuid, handle: PipelineHandle) {
        let slot = Arc::clone(&self.slot);
        self.watchers.spawn(async move {
            match handle.wait().await {
                PipelineExit::Completed => {
                    info!(event = %event_id, "Stream pipeline finished");
                }
                PipelineExit::Failed(reason) => {
                    error!(event = %event_id, %reason, "Stream pipeline failed");
                }
            }
            slot.release().await;
        });
    }
}

/// Instance whose start is closest to the reference time, earlier schedule
/// position winning ties. Starts are event-local wall clock and compared
/// in UTC; starts that do not exist in the local timezone rank last.
fn nearest_instance(reference: NaiveDateTime, schedule: &EventSchedule) -> Option<EventInstance> {
    let timezone = schedule.event.timezone;

    schedule
        .instances
        .iter()
        .enumerate()
        .min_by_key(|(index, instance)| (start_distance(reference, instance.start, timezone), *index))
        .map(|(_, instance)| instance.clone())
}

fn start_distance(reference: NaiveDateTime, start: NaiveDateTime, timezone: Tz) -> TimeDelta {
    match timezone.from_local_datetime(&start).earliest() {
        Some(zoned) => (zoned.naive_utc() - reference).abs(),
        None => TimeDelta::MAX,
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
