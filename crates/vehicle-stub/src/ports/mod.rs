//! Ports layer (hexagonal architecture).
//!
//! - `inbound`: API exposed to platform managers and the callbacks they implement
//! - `outbound`: the remote VHAL the stub depends on

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
