//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("aws CLI not found: {0}. Please install: https://aws.amazon.com/cli/")]
    CliNotFound(String),

    #[error("aws command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected aws response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<AwsError> for tfsync_cloud::CloudError {
    fn from(err: AwsError) -> Self {
        tfsync_cloud::CloudError::Api(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
