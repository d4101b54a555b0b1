//! Vehicle stub configuration with validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default bounded wait for synchronous get/set: 10s.
pub const DEFAULT_SYNC_OP_TIMEOUT_MS: u64 = 10_000;

/// Instance name of the AIDL vehicle HAL.
pub const AIDL_VHAL_SERVICE: &str = "android.hardware.automotive.vehicle.IVehicle/default";

/// Vehicle stub configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    /// Bounded wait for synchronous get/set, in milliseconds
    pub sync_op_timeout_ms: u64,
    /// VHAL instance this stub talks to
    pub service_name: String,
    /// Name of the dedicated thread that fires async timeouts
    pub timeout_thread_name: String,
    /// Client callbacks slower than this are logged
    pub slow_callback_threshold_ms: u64,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            sync_op_timeout_ms: DEFAULT_SYNC_OP_TIMEOUT_MS,
            service_name: AIDL_VHAL_SERVICE.to_string(),
            timeout_thread_name: "vhal-stub-timeout".to_string(),
            slow_callback_threshold_ms: 100,
        }
    }
}

impl StubConfig {
    /// Create configuration from environment variables.
    ///
    /// - `VHAL_SYNC_OP_TIMEOUT_MS`: sync get/set timeout (default: 10000)
    /// - `VHAL_SERVICE_NAME`: VHAL instance name (default: AIDL default instance)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sync_op_timeout_ms: env::var("VHAL_SYNC_OP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sync_op_timeout_ms),
            service_name: env::var("VHAL_SERVICE_NAME").unwrap_or(defaults.service_name),
            ..defaults
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_op_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "sync_op_timeout_ms cannot be 0".into(),
            ));
        }

        if self.service_name.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }

        if self.timeout_thread_name.is_empty() {
            return Err(ConfigError::InvalidThreadName(
                "timeout_thread_name cannot be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn sync_op_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_op_timeout_ms)
    }

    pub fn slow_callback_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_callback_threshold_ms)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("VHAL service name cannot be empty")]
    EmptyServiceName,

    #[error("Invalid thread name: {0}")]
    InvalidThreadName(String),
}
