//! Stream factory that renders a topology to ffmpeg arguments and
//! supervises the spawned process.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::{
    InputNode, OutputNode, PipelineError, PipelineExit, PipelineHandle, PipelineTopology,
    SinkNode, StreamFactory, TeeBranch, TeeNode,
};

pub struct ProcessStreamFactory {
    program: String,
}

impl ProcessStreamFactory {
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }

    /// Use a different executable, e.g. a wrapper script or test stub.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ProcessStreamFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamFactory for ProcessStreamFactory {
    async fn create(&self, topology: PipelineTopology) -> Result<PipelineHandle, PipelineError> {
        let args = render_args(&topology);
        debug!(program = %self.program, ?args, "Spawning stream process");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PipelineError::Start(format!("Failed to spawn {}: {}", self.program, e))
            })?;

        let (completion, handle) = PipelineHandle::channel();

        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) if status.success() => {
                    info!("Stream process finished");
                    PipelineExit::Completed
                }
                Ok(status) => {
                    error!(%status, "Stream process exited abnormally");
                    PipelineExit::Failed(format!("process exited with {status}"))
                }
                Err(e) => {
                    error!(error = %e, "Failed to wait for stream process");
                    PipelineExit::Failed(e.to_string())
                }
            };
            completion.complete(exit);
        });

        Ok(handle)
    }
}

fn render_args(topology: &PipelineTopology) -> Vec<String> {
    let mut args = vec!["-hide_banner".to_string(), "-nostdin".to_string()];

    args.push("-i".to_string());
    args.push(render_input_url(&topology.input));

    match &topology.output {
        OutputNode::Sink(sink) => render_sink(&mut args, sink),
        OutputNode::Tee(tee) => render_tee(&mut args, tee),
    }

    args
}

fn render_input_url(input: &InputNode) -> String {
    format!(
        "srt://{}:{}?mode=listener&listen_timeout={}&passphrase={}",
        input.host, input.port, input.listen_timeout_us, input.passphrase
    )
}

fn render_metadata(args: &mut Vec<String>, metadata: &[(String, String)]) {
    for (key, value) in metadata {
        args.push("-metadata".to_string());
        args.push(format!("{key}={value}"));
    }
}

fn render_sink(args: &mut Vec<String>, sink: &SinkNode) {
    args.push("-acodec".to_string());
    args.push("copy".to_string());
    render_metadata(args, &sink.metadata);
    args.push("-f".to_string());
    args.push(sink.format.as_str().to_string());
    args.push(format!("srt://{}:{}", sink.host, sink.port));
}

fn render_tee(args: &mut Vec<String>, tee: &TeeNode) {
    args.push("-acodec".to_string());
    args.push("copy".to_string());
    args.push("-map".to_string());
    args.push("0".to_string());
    render_metadata(args, &tee.metadata);
    args.push("-f".to_string());
    args.push("tee".to_string());

    let branches = tee
        .branches
        .iter()
        .map(render_branch)
        .collect::<Vec<_>>()
        .join("|");
    args.push(branches);
}

/// Tee branch syntax: `[opt1=a:opt2=b]target`.
fn render_branch(branch: &TeeBranch) -> String {
    let mut options = format!("f={}", branch.format.as_str());
    if branch.ignore_failures {
        options.push_str(":onfail=ignore");
    }

    let mut target = format!("srt://{}:{}", branch.host, branch.port);
    if let Some(passphrase) = &branch.passphrase {
        target.push_str("?passphrase=");
        target.push_str(passphrase);
    }

    format!("[{options}]{target}")
}
