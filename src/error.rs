use std::time::Duration;

use thiserror::Error;

/// Failures raised by the session registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    /// Ids come from 64 random bits, so hitting this means id generation is broken.
    #[error("session id {0} is already registered")]
    DuplicateId(String),
}

/// Failures on the outbound half of a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write timed out after {0:?}")]
    WriteTimeout(Duration),
    #[error("write failed: {0}")]
    Write(String),
}
