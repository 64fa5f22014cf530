use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::{ExecutionOutcome, ExecutionSpec};

/// Failures of the process runner itself, before any tool-level
/// classification happens.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process exceeded its execution bound of {}s", .bound.as_secs())]
    TimedOut { bound: Duration },

    #[error("Process I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// True when the executable could not be located or launched.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Spawn { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ),
            _ => false,
        }
    }
}

/// Port for running an external process under a time bound.
///
/// Implementations must guarantee that the child is terminated and reaped
/// and its pipes closed on every exit path, including the timeout path.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &ExecutionSpec) -> Result<ExecutionOutcome, ProcessError>;
}
