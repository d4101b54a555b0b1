//! Request state shared by the vehicle stub and its callback sink.

use super::async_pool::PendingAsyncRequestPool;
use super::sync_pool::PendingSyncRequestPool;
use crate::domain::{StubConfig, StubResult, StubStats};
use parking_lot::Mutex;
use std::sync::Arc;
use vhal_types::{GetValueResult, RequestId, SetValueResult};

/// The three request pools plus the lock that makes multi-pool steps atomic.
///
/// `lock` is held while
/// - a client's death recipient is linked and its async requests registered,
/// - a result batch is matched against the pools,
/// - a failed async send is retracted,
/// - a dead client's requests are purged.
///
/// It is never held while calling into a client.
pub struct RequestCore {
    pub lock: Mutex<()>,
    pub sync_get_pool: PendingSyncRequestPool<GetValueResult>,
    pub sync_set_pool: PendingSyncRequestPool<SetValueResult>,
    pub async_pool: PendingAsyncRequestPool,
    pub stats: Arc<StubStats>,
}

impl RequestCore {
    pub fn new(config: &StubConfig) -> StubResult<Self> {
        let stats = Arc::new(StubStats::default());
        Ok(Self {
            lock: Mutex::new(()),
            sync_get_pool: PendingSyncRequestPool::new(),
            sync_set_pool: PendingSyncRequestPool::new(),
            async_pool: PendingAsyncRequestPool::new(config, Arc::clone(&stats))?,
            stats,
        })
    }

    /// Pending requests across all three pools.
    pub fn count_pending(&self) -> usize {
        let _guard = self.lock.lock();
        self.sync_get_pool.size() + self.sync_set_pool.size() + self.async_pool.size()
    }

    /// Number of pools currently holding `id`.
    pub fn pools_holding(&self, id: RequestId) -> usize {
        let _guard = self.lock.lock();
        [
            self.sync_get_pool.contains(id),
            self.sync_set_pool.contains(id),
            self.async_pool.contains(id),
        ]
        .into_iter()
        .filter(|held| *held)
        .count()
    }
}
