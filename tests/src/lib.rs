//! # Vehicle Stub Test Suite
//!
//! End-to-end flows through `VehicleStub` against the in-memory VHAL.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── lib.rs
//! │   └── integration/
//! │       ├── fixtures.rs     # Shared stub/value builders and waits
//! │       ├── sync_flows.rs   # Blocking get/set: round trip, timeout, status
//! │       ├── async_flows.rs  # Batches, deadlines, cancellation, error codes
//! │       └── lifecycle.rs    # Client death, VHAL death, pass-through ops
//! └── benches/
//!     └── stub_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vhal-tests
//! cargo bench -p vhal-tests
//! ```

#![allow(dead_code)]
#![allow(clippy::excessive_nesting)]

pub mod integration;
