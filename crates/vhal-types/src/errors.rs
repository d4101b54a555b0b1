//! # Error Types
//!
//! Errors reported by the remote VHAL interface.

use thiserror::Error;

/// Failure of a call into the remote VHAL process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// The IPC transport failed (remote process gone, broken connection).
    #[error("Remote call failed: {0}")]
    Remote(String),

    /// The VHAL rejected the call with a service specific error code.
    ///
    /// The code may carry a vendor error code in its upper 16 bits.
    #[error("Service specific error {code}: {message}")]
    ServiceSpecific { code: i32, message: String },
}

impl HalError {
    /// Create a transport error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Create a service specific error.
    pub fn service_specific(code: i32, message: impl Into<String>) -> Self {
        Self::ServiceSpecific {
            code,
            message: message.into(),
        }
    }
}
