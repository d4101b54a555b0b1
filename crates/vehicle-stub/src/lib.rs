//! # Vehicle Stub
//!
//! Turns the VHAL's batched, callback-based get/set protocol into
//! synchronous and asynchronous operations for platform managers.
//!
//! ## Architecture
//!
//! ```text
//!   platform managers
//!         │ get / set                 get_async / set_async / cancel_requests
//!         ▼                                      ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          VehicleStub                                │
//! │  RequestIdGenerator ──► wire request id per element                 │
//! │                                                                     │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────────────────────┐ │
//! │  │ sync get pool│ │ sync set pool│ │ async pool ──► TimeoutQueue  │ │
//! │  │ id → oneshot │ │ id → oneshot │ │ id → client, service id      │ │
//! │  └──────▲───────┘ └──────▲───────┘ └──────▲───────────────────────┘ │
//! │         └───────── GetSetValuesCallback ──┘                         │
//! └──────────────────────────────▲──────────────────────────────────────┘
//!               batch │          │ results (transport thread)
//!                     ▼          │
//!                 ┌──────────────┴──┐
//!                 │   VehicleHal    │
//!                 └─────────────────┘
//! ```
//!
//! ## Request lifecycle
//!
//! Every wire request id lives in exactly one pool until it reaches a
//! terminal state: completed, timed out, cancelled, or orphaned by client
//! death. A result for an id that already left its pool is logged and
//! dropped.
//!
//! ## Threads
//!
//! - Callers of `get`/`set` await a oneshot under `tokio::time::timeout`.
//! - Results arrive on whatever thread the transport uses.
//! - Async deadlines fire on one dedicated OS thread, grouped per client.
//! - Client callbacks never run under a stub lock.
//!
//! ## Usage
//!
//! ```ignore
//! use vehicle_stub::{StubConfig, VehicleStub, VehicleStubApi};
//!
//! let stub = VehicleStub::new(hal, StubConfig::from_env())?;
//! let speed = stub.get(&HalPropValue::new(PERF_VEHICLE_SPEED, 0)).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use adapters::SubscriptionClient;
pub use domain::{
    AsyncGetSetRequest, ConfigError, GetVehicleStubAsyncResult, RequestIdGenerator,
    SetVehicleStubAsyncResult, StatsSnapshot, StubConfig, StubError, StubResult,
};
pub use ports::{
    ClientHandle, DeathRecipient, HalDeathRecipient, VehicleHal, VehicleHalCallback,
    VehicleHalEventCallback, VehicleStubApi, VehicleStubCallback,
};
pub use service::VehicleStub;
