//! Error type raised by checks and capabilities

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

/// A failure raised by a check's `run`, as opposed to a failure the check
/// reports through its own return value.
///
/// The `Display` output is the text that lands in the summary and error list.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("storage: {0}")]
    Storage(String),

    #[error("{0}")]
    Transport(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0} is not available in this context")]
    MissingCapability(String),

    #[error("panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

impl CheckError {
    /// Wraps any error as [`CheckError::Other`], keeping its message
    pub fn other(err: impl std::fmt::Display) -> Self {
        CheckError::Other(err.to_string())
    }

    /// Builds [`CheckError::Panicked`] from a `catch_unwind` payload
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        CheckError::Panicked(message)
    }
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        CheckError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        CheckError::Transport(err.to_string())
    }
}

/// Normalizes any failure value into the plain text used in reports
pub fn describe_failure(err: &dyn std::fmt::Display) -> String {
    err.to_string()
}
