//! Vehicle stub error types.

use super::config::ConfigError;
use thiserror::Error;
use vhal_types::{HalError, StatusCode};

/// Result type for vehicle stub operations
pub type StubResult<T> = Result<T, StubError>;

/// Errors raised synchronously to callers of the vehicle stub.
#[derive(Debug, Error)]
pub enum StubError {
    /// The IPC transport to the VHAL failed.
    #[error("Remote call failed: {0}")]
    Remote(String),

    /// The VHAL, or the stub on its behalf, reported a status code.
    #[error("Service specific error {code}: {message}")]
    ServiceSpecific { code: i32, message: String },

    /// The stub or a peer is in a state that does not allow the call.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start timeout thread: {0}")]
    TimeoutThread(#[source] std::io::Error),
}

impl StubError {
    /// Service specific error with `INTERNAL_ERROR` status.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::ServiceSpecific {
            code: StatusCode::InternalError.code(),
            message: message.into(),
        }
    }

    pub fn service_specific(code: i32, message: impl Into<String>) -> Self {
        Self::ServiceSpecific {
            code,
            message: message.into(),
        }
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// VHAL status code carried by this error.
    ///
    /// Everything that is not a service specific error reports `INTERNAL_ERROR`.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::ServiceSpecific { code, .. } => *code,
            _ => StatusCode::InternalError.code(),
        }
    }
}

impl From<HalError> for StubError {
    fn from(e: HalError) -> Self {
        match e {
            HalError::Remote(message) => Self::Remote(message),
            HalError::ServiceSpecific { code, message } => Self::ServiceSpecific { code, message },
        }
    }
}
