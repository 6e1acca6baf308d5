//! Cloud and reconciliation error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Unknown resource kind: {0}")]
    KindNotFound(String),

    #[error("State file not found: {}", .0.display())]
    StateNotFound(PathBuf),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Executable not found on PATH: {0}")]
    BinaryNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Render error: {0}")]
    Render(#[from] tfsync_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
