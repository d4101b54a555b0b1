//! Domain types for the vehicle stub.
//!
//! This module contains request/result types, configuration, errors, and the
//! request id generator. Pools and the timeout queue live in the adapters layer.

pub mod config;
pub mod error;
pub mod request_id;
pub mod requests;
pub mod stats;

// Re-exports for convenience
pub use config::{ConfigError, StubConfig};
pub use error::{StubError, StubResult};
pub use request_id::RequestIdGenerator;
pub use requests::{AsyncGetSetRequest, GetVehicleStubAsyncResult, SetVehicleStubAsyncResult};
pub use stats::{StatsSnapshot, StubStats};
