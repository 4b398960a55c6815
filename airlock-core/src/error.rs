use thiserror::Error;
use uuid::Uuid;

use crate::client::ClientError;
use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No instances of event {0} found in the search window")]
    InstanceNotFound(Uuid),

    #[error("Stream is busy with event {0}")]
    StreamBusy(Uuid),

    #[error("Recorder has no capacity for another recording")]
    RecordingBusy,

    #[error("Schedule service error: {0}")]
    Schedule(#[source] ClientError),

    #[error("Recorder service error: {0}")]
    Recorder(#[source] ClientError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

pub type Result<T> = std::result::Result<T, Error>;
