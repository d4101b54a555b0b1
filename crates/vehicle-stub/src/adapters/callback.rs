//! The single callback object registered with the VHAL for get/set results.
//!
//! Each result is matched by request id: the async pool first, then the sync
//! pool of the same kind. Results matching neither were already timed out,
//! cancelled or orphaned and are dropped. Client callbacks run after the
//! request lock is released, once per client per batch.

use super::handlers::{GetResultsHandler, ResultsHandler, SetResultsHandler};
use super::request_core::RequestCore;
use super::sync_pool::PendingSyncRequestPool;
use crate::domain::StubStats;
use crate::ports::VehicleHalCallback;
use std::sync::Arc;
use tracing::{debug, error, warn};
use vhal_types::{GetValueResults, SetValueResults, VehiclePropError, VehiclePropValue};

pub struct GetSetValuesCallback {
    core: Arc<RequestCore>,
}

impl GetSetValuesCallback {
    pub fn new(core: Arc<RequestCore>) -> Self {
        Self { core }
    }

    fn on_results<H: ResultsHandler>(
        &self,
        results: Vec<H::Wire>,
        sync_pool: &PendingSyncRequestPool<H::Wire>,
    ) {
        let stats = &self.core.stats;
        let mut handler = H::default();
        {
            let _guard = self.core.lock.lock();
            for result in results {
                let id = H::request_id(&result);
                if let Some(request) = self.core.async_pool.finish_request_if_found(id) {
                    handler.add_vhal_result(request, &result);
                    continue;
                }

                match sync_pool.finish_request_if_found(id) {
                    Some(waiter) => {
                        if waiter.send(result).is_ok() {
                            StubStats::add(&stats.results_delivered, 1);
                        } else {
                            debug!(vhal_request_id = %id, "Sync caller stopped waiting");
                        }
                    }
                    None => {
                        warn!(
                            vhal_request_id = %id,
                            "Dropping result for unknown request, it may have timed out or been cancelled"
                        );
                        StubStats::add(&stats.dropped_results, 1);
                    }
                }
            }
        }

        StubStats::add(&stats.results_delivered, handler.len());
        handler.flush();
    }
}

impl VehicleHalCallback for GetSetValuesCallback {
    fn on_get_values(&self, results: GetValueResults) {
        self.on_results::<GetResultsHandler>(results.payloads, &self.core.sync_get_pool);
    }

    fn on_set_values(&self, results: SetValueResults) {
        self.on_results::<SetResultsHandler>(results.payloads, &self.core.sync_set_pool);
    }

    fn on_property_event(&self, values: Vec<VehiclePropValue>) {
        error!(
            count = values.len(),
            "on_property_event must never be called for the get/set callback"
        );
    }

    fn on_property_set_error(&self, errors: Vec<VehiclePropError>) {
        error!(
            count = errors.len(),
            "on_property_set_error must never be called for the get/set callback"
        );
    }
}
