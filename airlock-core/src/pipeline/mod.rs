//! Declarative media-pipeline topologies and the executor seam.
//!
//! A topology describes one listening input node and one output node; it
//! carries everything the executor needs and owns nothing itself. The
//! `StreamFactory` trait is the seam between topology construction and
//! actual process execution, which keeps the reservation flow testable
//! without spawning anything.

pub mod process;
pub mod runner;

pub use process::ProcessStreamFactory;
pub use runner::PipelineRunner;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::models::Format;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to start pipeline: {0}")]
    Start(String),
}

/// Inbound transport node: a passive listener that accepts exactly one
/// connection authenticated by `passphrase`, then gives up after
/// `listen_timeout_us` microseconds without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputNode {
    pub host: String,
    pub port: u16,
    pub passphrase: String,
    pub listen_timeout_us: u64,
}

/// A single output sink: broadcast target plus container format and
/// stream metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkNode {
    pub host: String,
    pub port: u16,
    pub format: Format,
    /// Key/value metadata stamped on the outgoing stream.
    pub metadata: Vec<(String, String)>,
}

/// One leg of a tee output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeeBranch {
    pub host: String,
    pub port: u16,
    pub format: Format,
    /// Extra connection secret for this leg (the recorder token).
    pub passphrase: Option<String>,
    /// When set, failures on this leg do not abort the others.
    pub ignore_failures: bool,
}

/// Tee output: one decoded input mapped to every branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeeNode {
    pub branches: Vec<TeeBranch>,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputNode {
    Sink(SinkNode),
    Tee(TeeNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTopology {
    pub input: InputNode,
    pub output: OutputNode,
}

/// Why a pipeline stopped. The slot is released either way; the variants
/// only matter for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineExit {
    Completed,
    Failed(String),
}

/// Waitable handle to a running pipeline. `wait` resolves exactly once,
/// whenever and however the pipeline ends.
pub struct PipelineHandle {
    done: oneshot::Receiver<PipelineExit>,
}

impl PipelineHandle {
    /// Create a handle and the completion slot that resolves it.
    pub fn channel() -> (PipelineCompletion, Self) {
        let (tx, rx) = oneshot::channel();
        (PipelineCompletion { tx }, Self { done: rx })
    }

    /// Suspend until the pipeline ends. A vanished executor counts as a
    /// failure exit rather than an error: the caller's job is releasing
    /// the slot, which must happen in every case.
    pub async fn wait(self) -> PipelineExit {
        self.done
            .await
            .unwrap_or_else(|_| PipelineExit::Failed("pipeline executor dropped".to_string()))
    }
}

/// Completion side of a [`PipelineHandle`].
pub struct PipelineCompletion {
    tx: oneshot::Sender<PipelineExit>,
}

impl PipelineCompletion {
    pub fn complete(self, exit: PipelineExit) {
        let _ = self.tx.send(exit);
    }
}

/// Executor of pipeline topologies.
#[async_trait]
pub trait StreamFactory: Send + Sync {
    /// Start a pipeline for `topology`, returning once it is running.
    async fn create(&self, topology: PipelineTopology) -> Result<PipelineHandle, PipelineError>;
}
