use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} failed with status {status}")]
    CommandFailed { command: String, status: String },
    #[error("expected build output not found: {}", .0.display())]
    MissingArtifact(PathBuf),
    #[error("failed to serialize artifact index: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
