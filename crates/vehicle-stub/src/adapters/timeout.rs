//! Deadline scheduler backing the async request pool.
//!
//! A single named OS thread owns a min-heap of `(deadline, request id)`.
//! Every wake-up drains all entries whose deadline has passed and hands them
//! to the handler as one batch, so requests expiring together are reported
//! together.
//!
//! Cancellation only forgets the id; its heap entry is skipped when popped.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, trace};
use vhal_types::RequestId;

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<(Instant, RequestId)>>,
    /// Scheduled ids and their current deadline.
    live: HashMap<RequestId, Instant>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
}

/// Handle to the timeout thread. Dropping it stops the thread.
pub struct TimeoutQueue {
    shared: Arc<Shared>,
}

impl TimeoutQueue {
    /// Start the timeout thread.
    ///
    /// `on_expired` runs on that thread with no queue lock held.
    pub fn spawn<F>(thread_name: &str, on_expired: F) -> io::Result<Self>
    where
        F: Fn(Vec<RequestId>) + Send + 'static,
    {
        let shared = Arc::new(Shared::default());
        let worker = Arc::clone(&shared);

        thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || run(&worker, on_expired))?;

        debug!(thread = thread_name, "Timeout thread started");
        Ok(Self { shared })
    }

    /// Fire `id` at `deadline`. Re-scheduling an id replaces its deadline.
    pub fn schedule(&self, id: RequestId, deadline: Instant) {
        let mut state = self.shared.state.lock();
        state.live.insert(id, deadline);
        state.heap.push(Reverse((deadline, id)));
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Forget `id`. Returns false if it already fired or was never scheduled.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.shared.state.lock().live.remove(&id).is_some()
    }

    /// Number of scheduled, not yet fired ids.
    pub fn len(&self) -> usize {
        self.shared.state.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TimeoutQueue {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.wake.notify_all();
    }
}

fn run<F>(shared: &Shared, on_expired: F)
where
    F: Fn(Vec<RequestId>),
{
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            break;
        }

        let expired = drain_expired(&mut state, Instant::now());
        if !expired.is_empty() {
            trace!(count = expired.len(), "Deadlines expired");
            MutexGuard::unlocked(&mut state, || on_expired(expired));
            continue;
        }

        match state.heap.peek() {
            Some(Reverse((deadline, _))) => {
                let deadline = *deadline;
                shared.wake.wait_until(&mut state, deadline);
            }
            None => shared.wake.wait(&mut state),
        }
    }
    debug!("Timeout thread stopped");
}

fn drain_expired(state: &mut QueueState, now: Instant) -> Vec<RequestId> {
    let mut expired = Vec::new();
    while let Some(Reverse((deadline, id))) = state.heap.peek().copied() {
        if deadline > now {
            break;
        }
        state.heap.pop();
        // Stale entry: cancelled, or re-scheduled with another deadline.
        if state.live.get(&id) == Some(&deadline) {
            state.live.remove(&id);
            expired.push(id);
        }
    }
    expired
}
