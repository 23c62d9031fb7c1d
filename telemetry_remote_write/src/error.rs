use std::time::Duration;
use surf::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to serialize write request: {0}")]
    Serialize(#[from] prost::EncodeError),
    #[error("failed to compress write request body: {0}")]
    Compress(#[source] snap::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to decompress write request body: {0}")]
    Decompress(#[source] snap::Error),
    #[error("failed to deserialize write request: {0}")]
    Deserialize(#[from] prost::DecodeError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("instance id must not be empty")]
    MissingInstanceId,
    #[error("api key must not be empty")]
    MissingApiKey,
}

/// The request never produced a response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("error during remote write: {0}")]
    Failed(surf::Error),
    #[error("remote write timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server returned HTTP status {}: {line}", status_text(.status))]
    Server { status: StatusCode, line: String },
    #[error("server returned HTTP status {}: {line}", status_text(.status))]
    Response { status: StatusCode, line: String },
}

impl WriteError {
    /// Whether the same request may succeed if the caller sends it again.
    ///
    /// Transport failures and 5xx responses are retryable, any other rejection is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            WriteError::Transport(_) | WriteError::Server { .. } => true,
            WriteError::Response { .. } => false,
        }
    }

    /// The response status, if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WriteError::Transport(_) => None,
            WriteError::Server { status, .. } | WriteError::Response { status, .. } => {
                Some(*status)
            }
        }
    }
}

/// Formats a status like the HTTP status line does, e.g. "503 Service Unavailable"
fn status_text(status: &StatusCode) -> String {
    format!("{} {}", u16::from(*status), status.canonical_reason())
}
