//! Pending asynchronous requests.
//!
//! Each entry records which client owns a wire request and the id that
//! client knows it by. An entry leaves the pool exactly once, by whichever of
//! these wins the remove:
//!
//! | Exit | Caller | Client notified |
//! |------|--------|-----------------|
//! | result | callback sink | `on_get/set_async_results` |
//! | deadline | timeout thread | `on_requests_timeout`, grouped per client |
//! | cancel | `cancel_requests` | no |
//! | client death | death recipient | no |
//! | send failure | `get_async`/`set_async` | error results |

use crate::adapters::timeout::TimeoutQueue;
use crate::domain::{StubConfig, StubError, StubResult, StubStats};
use crate::ports::{ClientHandle, ClientKey};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vhal_types::RequestId;

/// One registered async request.
#[derive(Debug, Clone)]
pub struct PendingAsyncRequest {
    pub vhal_request_id: RequestId,
    pub service_request_id: i32,
    pub client: ClientHandle,
    pub deadline: Instant,
}

type PendingMap = HashMap<RequestId, PendingAsyncRequest>;

pub struct PendingAsyncRequestPool {
    pending: Arc<Mutex<PendingMap>>,
    timeouts: TimeoutQueue,
    stats: Arc<StubStats>,
}

impl PendingAsyncRequestPool {
    /// Create the pool and start its timeout thread.
    pub fn new(config: &StubConfig, stats: Arc<StubStats>) -> StubResult<Self> {
        let pending: Arc<Mutex<PendingMap>> = Arc::default();
        let weak = Arc::downgrade(&pending);
        let timeout_stats = Arc::clone(&stats);
        let slow_threshold = config.slow_callback_threshold();

        let timeouts = TimeoutQueue::spawn(&config.timeout_thread_name, move |expired| {
            on_deadlines_expired(&weak, expired, &timeout_stats, slow_threshold);
        })
        .map_err(StubError::TimeoutThread)?;

        Ok(Self {
            pending,
            timeouts,
            stats,
        })
    }

    /// Register `request` and arm its deadline.
    pub fn add_request(&self, request: PendingAsyncRequest) {
        let id = request.vhal_request_id;
        let deadline = request.deadline;
        debug!(
            vhal_request_id = %id,
            service_request_id = request.service_request_id,
            "Registered async request"
        );
        self.pending.lock().insert(id, request);
        self.timeouts.schedule(id, deadline);
    }

    /// Remove and return the entry for `id`, disarming its deadline.
    pub fn finish_request_if_found(&self, id: RequestId) -> Option<PendingAsyncRequest> {
        let request = self.pending.lock().remove(&id)?;
        self.timeouts.cancel(id);
        Some(request)
    }

    /// Remove the given entries, returning those still pending.
    pub fn remove_requests(&self, ids: &[RequestId]) -> Vec<PendingAsyncRequest> {
        let removed: Vec<_> = {
            let mut pending = self.pending.lock();
            ids.iter().filter_map(|id| pending.remove(id)).collect()
        };
        self.disarm(&removed);
        removed
    }

    /// Remove every entry whose client-visible id is in `service_request_ids`.
    pub fn cancel_requests(&self, service_request_ids: &[i32]) {
        let wanted: HashSet<i32> = service_request_ids.iter().copied().collect();
        let removed = self.extract(|request| wanted.contains(&request.service_request_id));

        for request in &removed {
            warn!(
                vhal_request_id = %request.vhal_request_id,
                service_request_id = request.service_request_id,
                "Request cancelled"
            );
        }
        StubStats::add(&self.stats.cancelled, removed.len());
        self.disarm(&removed);
    }

    /// Remove every entry owned by the client with `key`.
    pub fn remove_requests_for_callback(&self, key: ClientKey) {
        let removed = self.extract(|request| request.client.key() == key);
        if !removed.is_empty() {
            warn!(
                count = removed.len(),
                "Client died, removed its pending async requests"
            );
        }
        StubStats::add(&self.stats.orphaned, removed.len());
        self.disarm(&removed);
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.pending.lock().contains_key(&id)
    }

    pub fn size(&self) -> usize {
        self.pending.lock().len()
    }

    fn extract(&self, matches: impl Fn(&PendingAsyncRequest) -> bool) -> Vec<PendingAsyncRequest> {
        let mut pending = self.pending.lock();
        let ids: Vec<RequestId> = pending
            .values()
            .filter(|request| matches(request))
            .map(|request| request.vhal_request_id)
            .collect();
        ids.iter().filter_map(|id| pending.remove(id)).collect()
    }

    fn disarm(&self, removed: &[PendingAsyncRequest]) {
        for request in removed {
            self.timeouts.cancel(request.vhal_request_id);
        }
    }
}

/// Runs on the timeout thread.
fn on_deadlines_expired(
    pending: &Weak<Mutex<PendingMap>>,
    expired: Vec<RequestId>,
    stats: &StubStats,
    slow_threshold: Duration,
) {
    let Some(pending) = pending.upgrade() else {
        return;
    };

    let mut by_client: HashMap<ClientHandle, Vec<i32>> = HashMap::new();
    {
        let mut pending = pending.lock();
        for id in expired {
            // Already finished, cancelled or orphaned.
            let Some(request) = pending.remove(&id) else {
                continue;
            };
            by_client
                .entry(request.client)
                .or_default()
                .push(request.service_request_id);
        }
    }

    for (client, service_request_ids) in by_client {
        StubStats::add(&stats.timeouts, service_request_ids.len());
        warn!(
            count = service_request_ids.len(),
            ?service_request_ids,
            "Async requests timed out"
        );

        let started = Instant::now();
        client.callback().on_requests_timeout(service_request_ids);
        let elapsed = started.elapsed();
        if elapsed > slow_threshold {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                ?client,
                "Slow client timeout callback"
            );
        }
    }
}
