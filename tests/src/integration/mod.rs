//! Integration flows across the stub, its pools and the fake VHAL.

pub mod fixtures;

mod async_flows;
