use thiserror::Error;

use crate::domain::session::session::SessionId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to build network topology: {0}")]
    TopologyConstructionError(String),

    #[error("No switch named '{0}' exists in the topology")]
    UnknownSwitch(String),

    #[error("No active session with id {0:?}")]
    UnknownSession(SessionId),

    #[error("Invalid session type '{0}', expected PING, TCP or UDP")]
    InvalidSessionKind(String),

    #[error("Invalid session request: {0}")]
    InvalidRequest(String),

    #[error("A conflicting session already exists between {host_a} and {host_b}")]
    Conflict { host_a: String, host_b: String },

    #[error("No admissible path between {host_a} and {host_b}")]
    Unreachable { host_a: String, host_b: String },

    #[error("Flow controller failure: {reason}")]
    ControllerFailure { session: Option<SessionId>, reason: String },

    #[error("HTTP request to flow controller failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl Error {
    pub fn controller(reason: impl Into<String>) -> Self {
        Error::ControllerFailure { session: None, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
