//! Structured logging setup.
//!
//! JSON output carries these fields for log shippers:
//! - `timestamp`, `level`, `target`
//! - `fields.message`
//! - request fields such as `vhal_request_id` and `service_request_id`

use crate::{TelemetryConfig, TelemetryError};
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber described by `config`.
///
/// # Errors
/// - `InvalidFilter`: `config.log_level` is not a valid filter directive
/// - `AlreadyInitialized`: a global subscriber is already installed
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_ansi(config.ansi),
            )
            .try_init()
    };
    installed.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Install a test-friendly subscriber once per process.
///
/// Output goes through the test harness writer so it is captured per test.
/// Later calls, and calls after another subscriber was installed, do nothing.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let config = TelemetryConfig::for_tests();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_ansi(config.ansi)
                    .with_thread_names(true),
            )
            .try_init();
    });
}
