//! Diagnostic counters for the vehicle stub.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the stub, its pools and its callback sink.
#[derive(Debug, Default)]
pub struct StubStats {
    /// Sync get/set requests sent
    pub sync_requests: AtomicU64,
    /// Async get/set requests registered
    pub async_requests: AtomicU64,
    /// Results delivered to a waiting caller or client callback
    pub results_delivered: AtomicU64,
    /// Requests that hit their deadline
    pub timeouts: AtomicU64,
    /// Requests cancelled by service request id
    pub cancelled: AtomicU64,
    /// Requests purged because their client died
    pub orphaned: AtomicU64,
    /// Results that matched no pending request
    pub dropped_results: AtomicU64,
}

/// Point-in-time copy of `StubStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub sync_requests: u64,
    pub async_requests: u64,
    pub results_delivered: u64,
    pub timeouts: u64,
    pub cancelled: u64,
    pub orphaned: u64,
    pub dropped_results: u64,
}

impl StubStats {
    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sync_requests: self.sync_requests.load(Ordering::Relaxed),
            async_requests: self.async_requests.load(Ordering::Relaxed),
            results_delivered: self.results_delivered.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            orphaned: self.orphaned.load(Ordering::Relaxed),
            dropped_results: self.dropped_results.load(Ordering::Relaxed),
        }
    }
}
