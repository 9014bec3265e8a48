//! Top-level error type for command execution.

use crate::config::ConfigError;
use crate::rebuild::RebuildError;
use mnemograph_core::GraphError;
use thiserror::Error;

/// Anything a command can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Rebuild(#[from] RebuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid batch file: {0}")]
    Batch(#[from] serde_json::Error),

    #[error("Graph snapshot '{0}' could not be written")]
    SnapshotNotWritten(String),

    #[error("Interrupted before completion, no snapshot written")]
    Interrupted,
}
