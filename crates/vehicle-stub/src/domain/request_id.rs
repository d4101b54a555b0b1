//! Wire request id generation.
//!
//! Every request sent to the VHAL, sync or async, gets a fresh id from a
//! shared generator. Ids are never reused within a process.

use std::sync::atomic::{AtomicI64, Ordering};
use vhal_types::RequestId;

/// Thread-safe, monotonic source of wire request ids.
///
/// Inject one generator per process (or per test) into the vehicle stub;
/// there is no global instance.
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    next: AtomicI64,
}

impl RequestIdGenerator {
    /// Generator whose first id is 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Generator whose first id is `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Next unused id. Never blocks.
    pub fn next_id(&self) -> RequestId {
        RequestId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> RequestId {
        RequestId::new(self.next.load(Ordering::Relaxed))
    }
}
