//! # VHAL Types Crate
//!
//! Types exchanged between platform services and the Vehicle Hardware
//! Abstraction Layer (VHAL).
//!
//! ## Design Principles
//!
//! - **Wire vs client types**: `VehiclePropValue` is what crosses the IPC
//!   boundary; `HalPropValue` is what clients of the vehicle stub hold.
//! - **Correlation by id only**: every wire request and result carries a
//!   `RequestId`. Position inside a batch carries no meaning.
//! - **One translation table**: `CarPropertyErrorCodes::from_vhal_status` is the
//!   only place a VHAL status becomes a client-facing error code.

pub mod errors;
pub mod status;
pub mod values;
pub mod wire;

pub use errors::*;
pub use status::*;
pub use values::*;
pub use wire::*;
