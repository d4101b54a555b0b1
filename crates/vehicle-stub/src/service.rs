//! Vehicle stub service: the façade platform managers talk to.

use crate::adapters::{
    GetRequestsHandler, GetResultsHandler, GetSetValuesCallback, PendingAsyncRequest,
    PendingSyncRequestPool, RequestCore, RequestsHandler, ResultsHandler, SetRequestsHandler,
    SetResultsHandler, SubscriptionClient,
};
use crate::domain::{
    AsyncGetSetRequest, RequestIdGenerator, StatsSnapshot, StubConfig, StubError, StubResult,
    StubStats,
};
use crate::ports::{
    ClientHandle, HalDeathRecipient, VehicleHal, VehicleHalCallback, VehicleHalEventCallback,
    VehicleStubApi, VehicleStubCallback,
};
use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vhal_types::{
    CarPropertyErrorCodes, GetValueResult, HalError, HalPropValue, RequestId, SetValueResult,
    StatusCode, VehiclePropConfig,
};

/// Vehicle stub backed by a remote VHAL.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct VehicleStub {
    hal: Arc<dyn VehicleHal>,
    core: Arc<RequestCore>,
    sink: Arc<GetSetValuesCallback>,
    ids: Arc<RequestIdGenerator>,
    sync_op_timeout_ms: AtomicU64,
    config: StubConfig,
}

/// Removes a sync pool entry when the waiting call ends, however it ends.
struct SyncRequestGuard<'a, R> {
    pool: &'a PendingSyncRequestPool<R>,
    id: RequestId,
}

impl<R> Drop for SyncRequestGuard<'_, R> {
    fn drop(&mut self) {
        // No-op when the callback sink already took the entry.
        self.pool.finish_request_if_found(self.id);
    }
}

impl VehicleStub {
    /// Create a stub with its own request id generator.
    pub fn new(hal: Arc<dyn VehicleHal>, config: StubConfig) -> StubResult<Self> {
        Self::with_request_ids(hal, config, Arc::new(RequestIdGenerator::new()))
    }

    /// Create a stub drawing wire request ids from `ids`.
    ///
    /// # Errors
    /// - `Config`: invalid configuration
    /// - `TimeoutThread`: the timeout thread could not be started
    pub fn with_request_ids(
        hal: Arc<dyn VehicleHal>,
        config: StubConfig,
        ids: Arc<RequestIdGenerator>,
    ) -> StubResult<Self> {
        config.validate()?;

        let core = Arc::new(RequestCore::new(&config)?);
        let sink = Arc::new(GetSetValuesCallback::new(Arc::clone(&core)));

        info!(
            service = %config.service_name,
            sync_op_timeout_ms = config.sync_op_timeout_ms,
            "Vehicle stub created"
        );

        Ok(Self {
            hal,
            core,
            sink,
            ids,
            sync_op_timeout_ms: AtomicU64::new(config.sync_op_timeout_ms),
            config,
        })
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    pub fn sync_op_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_op_timeout_ms.load(Ordering::Relaxed))
    }

    /// Override the bounded wait used by `get` and `set`.
    pub fn set_sync_op_timeout(&self, timeout: Duration) {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        self.sync_op_timeout_ms.store(ms, Ordering::Relaxed);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.core.stats.snapshot()
    }

    /// Whether the remote VHAL is still reachable.
    pub fn is_valid(&self) -> bool {
        self.hal.is_alive()
    }

    pub fn get_interface_descriptor(&self) -> StubResult<String> {
        self.hal.interface_descriptor().map_err(|e| {
            StubError::illegal_state(format!("Unable to get Vhal interface descriptor: {e}"))
        })
    }

    /// Run `recipient` when the remote VHAL dies.
    pub fn link_to_death(&self, recipient: HalDeathRecipient) -> StubResult<()> {
        self.hal
            .link_to_death(recipient)
            .map_err(|e| StubError::illegal_state(format!("Failed to linkToDeath Vhal: {e}")))
    }

    /// Failures are logged; the recipient may already be gone.
    pub fn unlink_to_death(&self, recipient: &HalDeathRecipient) {
        if let Err(e) = self.hal.unlink_to_death(recipient) {
            warn!(error = %e, "Failed to unlinkToDeath Vhal");
        }
    }

    pub fn get_all_prop_configs(&self) -> StubResult<Vec<VehiclePropConfig>> {
        Ok(self.hal.get_all_prop_configs()?)
    }

    /// Forward the VHAL's own dump to `out`.
    pub fn dump(&self, out: &mut dyn Write, args: &[String]) -> StubResult<()> {
        Ok(self.hal.dump(out, args)?)
    }

    /// Subscribe/unsubscribe-only client on the same VHAL. Shares no request state.
    pub fn new_subscription_client(
        &self,
        callback: Arc<dyn VehicleHalEventCallback>,
    ) -> Arc<SubscriptionClient> {
        SubscriptionClient::new(Arc::clone(&self.hal), callback)
    }

    /// Number of pools holding `id`; at most one.
    pub fn pools_holding(&self, id: RequestId) -> usize {
        self.core.pools_holding(id)
    }

    fn sink(&self) -> Arc<dyn VehicleHalCallback> {
        self.sink.clone()
    }

    /// Send a 1-element batch and wait for its result.
    async fn send_sync<Q: RequestsHandler, R: Send>(
        &self,
        pool: &PendingSyncRequestPool<R>,
        request: &HalPropValue,
        op: &str,
    ) -> StubResult<R> {
        let id = self.ids.next_id();
        let waiter = pool.add_request(id)?;
        let _guard = SyncRequestGuard { pool, id };

        let mut batch = Q::with_capacity(1);
        batch.push(id, request);
        StubStats::add(&self.core.stats.sync_requests, 1);
        debug!(vhal_request_id = %id, %request, op, "Sending sync request");
        batch.send(self.hal.as_ref(), self.sink())?;

        match tokio::time::timeout(self.sync_op_timeout(), waiter).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(StubError::internal(format!(
                "{op} value request for: {request} was abandoned"
            ))),
            Err(_) => {
                StubStats::add(&self.core.stats.timeouts, 1);
                warn!(vhal_request_id = %id, %request, op, "Sync request timed out");
                Err(StubError::internal(format!(
                    "{op} value request timeout for: {request}"
                )))
            }
        }
    }

    /// Link the client's death recipient and register every request, as one
    /// step under the request lock.
    fn prepare_async_requests<Q: RequestsHandler>(
        &self,
        requests: &[AsyncGetSetRequest],
        client: &ClientHandle,
    ) -> StubResult<Q> {
        let _guard = self.core.lock.lock();

        let core = Arc::downgrade(&self.core);
        let key = client.key();
        client
            .callback()
            .link_to_death(Box::new(move || {
                if let Some(core) = core.upgrade() {
                    let _guard = core.lock.lock();
                    core.async_pool.remove_requests_for_callback(key);
                }
            }))
            .map_err(|e| {
                warn!(error = %e, "Failed to link client death recipient");
                StubError::illegal_state(
                    "Failed to link callback to death recipient, the client maybe already died",
                )
            })?;

        let mut batch = Q::with_capacity(requests.len());
        for request in requests {
            let id = self.ids.next_id();
            self.core.async_pool.add_request(PendingAsyncRequest {
                vhal_request_id: id,
                service_request_id: request.service_request_id,
                client: client.clone(),
                deadline: request.deadline,
            });
            batch.push(id, &request.value);
        }
        StubStats::add(&self.core.stats.async_requests, requests.len());
        Ok(batch)
    }

    fn send_async<Q: RequestsHandler, H: ResultsHandler>(
        &self,
        requests: Vec<AsyncGetSetRequest>,
        callback: Arc<dyn VehicleStubCallback>,
    ) -> StubResult<()> {
        if requests.is_empty() {
            return Err(StubError::InvalidArgument(
                "async request batch must not be empty".into(),
            ));
        }

        let client = ClientHandle::new(callback);
        let batch: Q = self.prepare_async_requests(&requests, &client)?;
        let ids = batch.request_ids();
        debug!(count = ids.len(), "Sending async requests");

        let Err(e) = batch.send(self.hal.as_ref(), self.sink()) else {
            return Ok(());
        };

        warn!(error = %e, count = ids.len(), "Failed to send async requests");
        let error = match &e {
            HalError::Remote(_) => CarPropertyErrorCodes::internal_error(),
            HalError::ServiceSpecific { code, .. } => CarPropertyErrorCodes::from_vhal_status(*code),
        };

        let retracted = {
            let _guard = self.core.lock.lock();
            self.core.async_pool.remove_requests(&ids)
        };
        let mut handler = H::default();
        for request in retracted {
            handler.add_error_result(request, error);
        }
        StubStats::add(&self.core.stats.results_delivered, handler.len());
        handler.flush();
        Ok(())
    }
}

#[async_trait]
impl VehicleStubApi for VehicleStub {
    async fn get(&self, request: &HalPropValue) -> StubResult<Option<HalPropValue>> {
        let result: GetValueResult = self
            .send_sync::<GetRequestsHandler, _>(&self.core.sync_get_pool, request, "get")
            .await?;

        if result.status != StatusCode::Ok {
            return Err(StubError::service_specific(
                result.status.code(),
                format!("failed to get value for {request}"),
            ));
        }
        Ok(result.prop.map(HalPropValue::from))
    }

    async fn set(&self, request: &HalPropValue) -> StubResult<()> {
        let result: SetValueResult = self
            .send_sync::<SetRequestsHandler, _>(&self.core.sync_set_pool, request, "set")
            .await?;

        if result.status != StatusCode::Ok {
            return Err(StubError::service_specific(
                result.status.code(),
                format!("failed to set value for {request}"),
            ));
        }
        Ok(())
    }

    fn get_async(
        &self,
        requests: Vec<AsyncGetSetRequest>,
        callback: Arc<dyn VehicleStubCallback>,
    ) -> StubResult<()> {
        self.send_async::<GetRequestsHandler, GetResultsHandler>(requests, callback)
    }

    fn set_async(
        &self,
        requests: Vec<AsyncGetSetRequest>,
        callback: Arc<dyn VehicleStubCallback>,
    ) -> StubResult<()> {
        self.send_async::<SetRequestsHandler, SetResultsHandler>(requests, callback)
    }

    fn cancel_requests(&self, service_request_ids: &[i32]) {
        self.core.async_pool.cancel_requests(service_request_ids);
    }

    fn count_pending_requests(&self) -> usize {
        self.core.count_pending()
    }
}
