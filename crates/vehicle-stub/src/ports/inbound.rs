//! # Inbound Ports - VehicleStubApi
//!
//! Driving port used by platform managers, and the callback interfaces those
//! managers implement to receive async results and property events.
//!
//! | Method | Blocks caller | Result delivery |
//! |--------|---------------|-----------------|
//! | `get` / `set` | until result or timeout | return value |
//! | `get_async` / `set_async` | no | `VehicleStubCallback` |
//! | `cancel_requests` | no | none |

use crate::domain::{
    AsyncGetSetRequest, GetVehicleStubAsyncResult, SetVehicleStubAsyncResult, StubResult,
};
use async_trait::async_trait;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use vhal_types::{HalPropValue, VehiclePropError};

/// Notification fired once when a client process dies.
pub type DeathRecipient = Box<dyn FnOnce() + Send>;

/// Primary API of the vehicle stub.
#[async_trait]
pub trait VehicleStubApi: Send + Sync {
    /// Read one property, waiting at most the configured sync timeout.
    ///
    /// Returns `Ok(None)` when the VHAL reports success without a value.
    ///
    /// # Errors
    /// - `ServiceSpecific` with the VHAL status when the VHAL reports an error
    /// - `ServiceSpecific` with `INTERNAL_ERROR` on timeout
    /// - `Remote` when the batch could not be sent
    async fn get(&self, request: &HalPropValue) -> StubResult<Option<HalPropValue>>;

    /// Write one property, waiting at most the configured sync timeout.
    async fn set(&self, request: &HalPropValue) -> StubResult<()>;

    /// Read a batch of properties. Results, errors and timeouts are delivered
    /// to `callback`, never returned.
    ///
    /// # Errors
    /// - `InvalidArgument`: `requests` is empty
    /// - `IllegalState`: `callback` is already dead
    fn get_async(
        &self,
        requests: Vec<AsyncGetSetRequest>,
        callback: Arc<dyn VehicleStubCallback>,
    ) -> StubResult<()>;

    /// Write a batch of properties. Same contract as `get_async`.
    fn set_async(
        &self,
        requests: Vec<AsyncGetSetRequest>,
        callback: Arc<dyn VehicleStubCallback>,
    ) -> StubResult<()>;

    /// Best-effort cancellation of pending async requests.
    fn cancel_requests(&self, service_request_ids: &[i32]);

    /// Pending requests across the sync get, sync set and async pools.
    fn count_pending_requests(&self) -> usize;
}

/// Client callback receiving async results.
///
/// Implementations are called with no stub lock held and may be slow, but
/// slow calls delay other clients' timeout notifications.
pub trait VehicleStubCallback: Send + Sync {
    fn on_get_async_results(&self, results: Vec<GetVehicleStubAsyncResult>);

    fn on_set_async_results(&self, results: Vec<SetVehicleStubAsyncResult>);

    /// The listed requests hit their deadline without a result.
    fn on_requests_timeout(&self, service_request_ids: Vec<i32>);

    /// Register `recipient` to run once when this client dies.
    ///
    /// Must fail if the client is already dead, and must not run `recipient`
    /// on the calling thread.
    fn link_to_death(&self, recipient: DeathRecipient) -> StubResult<()>;
}

/// Receiver of property change events and async set errors.
pub trait VehicleHalEventCallback: Send + Sync {
    fn on_property_event(&self, values: Vec<HalPropValue>);

    fn on_property_set_error(&self, errors: Vec<VehiclePropError>);
}

/// Identity of a client callback.
///
/// Two handles are equal when they wrap the same callback object.
#[derive(Clone)]
pub struct ClientHandle(Arc<dyn VehicleStubCallback>);

/// Address of a client callback, usable after the handle itself is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientKey(usize);

impl ClientHandle {
    pub fn new(callback: Arc<dyn VehicleStubCallback>) -> Self {
        Self(callback)
    }

    pub fn key(&self) -> ClientKey {
        ClientKey(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn callback(&self) -> &dyn VehicleStubCallback {
        self.0.as_ref()
    }
}

impl From<Arc<dyn VehicleStubCallback>> for ClientHandle {
    fn from(callback: Arc<dyn VehicleStubCallback>) -> Self {
        Self::new(callback)
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ClientHandle {}

impl Hash for ClientHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientHandle({:#x})", self.key().0)
    }
}
