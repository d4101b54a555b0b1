//! Outbound (Driven) ports for the vehicle stub.
//!
//! These traits describe the remote VHAL process the stub talks to. A real
//! deployment backs them with the IPC transport; tests back them with
//! `testing::FakeVehicleHal`.

use std::io::Write;
use std::sync::Arc;
use vhal_types::{
    GetValueRequests, GetValueResults, HalError, SetValueRequests, SetValueResults,
    SubscribeOptions, VehiclePropConfig, VehiclePropError, VehiclePropValue,
};

/// Notification fired once when the remote VHAL process dies.
///
/// Identity (for `unlink_to_death`) is the `Arc` pointer.
pub type HalDeathRecipient = Arc<dyn Fn() + Send + Sync>;

/// Remote batched property interface.
///
/// Calls return once the batch has been handed to the remote side. Results
/// arrive later, on a transport thread, through the callback passed with the
/// batch. Results are correlated with requests by `RequestId` only.
pub trait VehicleHal: Send + Sync {
    /// Send a batch of get requests.
    ///
    /// # Errors
    /// - `HalError::Remote`: the transport failed, nothing was delivered
    /// - `HalError::ServiceSpecific`: the VHAL rejected the whole batch
    fn get_values(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        requests: GetValueRequests,
    ) -> Result<(), HalError>;

    /// Send a batch of set requests. Same error contract as `get_values`.
    fn set_values(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        requests: SetValueRequests,
    ) -> Result<(), HalError>;

    /// Configuration of every property the VHAL supports.
    fn get_all_prop_configs(&self) -> Result<Vec<VehiclePropConfig>, HalError>;

    /// Interface descriptor of the remote object.
    fn interface_descriptor(&self) -> Result<String, HalError>;

    /// Whether the remote process is still reachable.
    fn is_alive(&self) -> bool {
        true
    }

    fn link_to_death(&self, recipient: HalDeathRecipient) -> Result<(), HalError>;

    fn unlink_to_death(&self, recipient: &HalDeathRecipient) -> Result<(), HalError>;

    /// Write the VHAL's own debug dump to `out`.
    fn dump(&self, out: &mut dyn Write, args: &[String]) -> Result<(), HalError>;

    fn subscribe(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        options: Vec<SubscribeOptions>,
    ) -> Result<(), HalError>;

    fn unsubscribe(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        prop_ids: Vec<i32>,
    ) -> Result<(), HalError>;
}

/// Callback object the VHAL delivers results and events to.
///
/// Methods are invoked from transport threads and must not block for long.
pub trait VehicleHalCallback: Send + Sync {
    fn on_get_values(&self, results: GetValueResults);

    fn on_set_values(&self, results: SetValueResults);

    fn on_property_event(&self, values: Vec<VehiclePropValue>);

    fn on_property_set_error(&self, errors: Vec<VehiclePropError>);
}
