//! Adapters layer: request pools, timeout thread, batch handlers and the
//! callback objects handed to the VHAL.

pub mod async_pool;
pub mod callback;
pub mod handlers;
pub mod request_core;
pub mod subscription;
pub mod sync_pool;
pub mod timeout;

pub use async_pool::{PendingAsyncRequest, PendingAsyncRequestPool};
pub use callback::GetSetValuesCallback;
pub use handlers::{
    GetRequestsHandler, GetResultsHandler, RequestsHandler, ResultsHandler, SetRequestsHandler,
    SetResultsHandler,
};
pub use request_core::RequestCore;
pub use subscription::SubscriptionClient;
pub use sync_pool::PendingSyncRequestPool;
pub use timeout::TimeoutQueue;
