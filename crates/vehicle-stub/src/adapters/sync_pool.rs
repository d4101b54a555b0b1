//! Pending synchronous requests.
//!
//! Maps wire request ids to the single-result channel a blocked `get`/`set`
//! caller is waiting on. One pool per operation kind.
//!
//! Flow:
//! 1. Caller registers the id and keeps the receiver
//! 2. Caller sends the 1-element batch
//! 3. Callback sink takes the sender with `finish_request_if_found` and sends
//! 4. Caller awaits the receiver or times out and removes the entry itself

use crate::domain::{StubError, StubResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::debug;
use vhal_types::RequestId;

pub struct PendingSyncRequestPool<R> {
    pending: DashMap<RequestId, oneshot::Sender<R>>,
}

impl<R> Default for PendingSyncRequestPool<R> {
    fn default() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }
}

impl<R> PendingSyncRequestPool<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` and get the receiver its result will arrive on.
    ///
    /// # Errors
    /// `IllegalState` if `id` is already pending.
    pub fn add_request(&self, id: RequestId) -> StubResult<oneshot::Receiver<R>> {
        match self.pending.entry(id) {
            Entry::Occupied(_) => Err(StubError::illegal_state(format!(
                "sync request id {id} is already pending"
            ))),
            Entry::Vacant(slot) => {
                let (tx, rx) = oneshot::channel();
                slot.insert(tx);
                debug!(vhal_request_id = %id, "Registered sync request");
                Ok(rx)
            }
        }
    }

    /// Remove and return the sender for `id`, if still pending.
    ///
    /// Dropping the returned sender without sending closes the receiver.
    pub fn finish_request_if_found(&self, id: RequestId) -> Option<oneshot::Sender<R>> {
        self.pending.remove(&id).map(|(_, tx)| tx)
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn size(&self) -> usize {
        self.pending.len()
    }
}
