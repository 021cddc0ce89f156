use std::fmt;

use thiserror::Error;

use crate::domain::{TaskId, TaskStateError};
use crate::ports::SinkError;

/// A pipeline stage, for error reports and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Generator,
    Worker(usize),
    Classifier,
    CompletedAggregator,
    FailedAggregator,
    Deadline,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generator => f.write_str("generator"),
            Stage::Worker(id) => write!(f, "worker-{id}"),
            Stage::Classifier => f.write_str("classifier"),
            Stage::CompletedAggregator => f.write_str("completed-aggregator"),
            Stage::FailedAggregator => f.write_str("failed-aggregator"),
            Stage::Deadline => f.write_str("deadline"),
        }
    }
}

/// Structural failures of the pipeline itself.
///
/// Per-task failures are never reported here; they are data
/// (`Outcome::Failed`). Everything in this enum means the shutdown sequencing
/// or stage wiring is broken.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} published onto a closed channel")]
    ChannelClosed { stage: Stage },

    #[error("task {0} reached the classifier without an outcome")]
    UnfinishedTask(TaskId),

    #[error("invalid task transition: {0}")]
    InvalidTransition(#[from] TaskStateError),

    #[error("{stage} panicked: {message}")]
    StagePanicked { stage: Stage, message: String },

    #[error("result sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("run() needs max_tasks or max_duration when the source is endless")]
    NoTermination,
}

impl PipelineError {
    pub(crate) fn closed(stage: Stage) -> Self {
        PipelineError::ChannelClosed { stage }
    }

    pub(crate) fn from_join(stage: Stage, err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            let payload = err.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string())
        } else {
            "task was cancelled".to_string()
        };
        PipelineError::StagePanicked { stage, message }
    }

    /// Pick the error to surface when several stages failed.
    ///
    /// A broken stage makes its upstream neighbours fail with `ChannelClosed`,
    /// so anything else is the more specific report.
    pub(crate) fn root_cause(errors: Vec<PipelineError>) -> Option<PipelineError> {
        let mut last_closed = None;
        for err in errors {
            match err {
                PipelineError::ChannelClosed { .. } => last_closed = Some(err),
                other => return Some(other),
            }
        }
        last_closed
    }
}
