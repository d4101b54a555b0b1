//! # VHAL Telemetry
//!
//! Logging bootstrap for processes hosting the vehicle stub.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vhal_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//!     // Stub events are now written as structured logs
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VHAL_SERVICE_NAME` | `vehicle-stub` | Service name in logs |
//! | `VHAL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `VHAL_JSON_LOGS` | `false` (`true` in containers) | JSON output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
