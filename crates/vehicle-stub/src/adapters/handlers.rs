//! Request and result handlers for get and set.
//!
//! Request handlers build one wire batch and send it. The sync path uses the
//! same handlers with a single element, so a batch of one has exactly the
//! shape an async batch of one has.
//!
//! Result handlers turn wire results into client results and accumulate them
//! per client; `flush` calls each client once with everything it is owed.

use super::async_pool::PendingAsyncRequest;
use crate::domain::{GetVehicleStubAsyncResult, SetVehicleStubAsyncResult};
use crate::ports::{ClientHandle, VehicleHal, VehicleHalCallback};
use std::collections::HashMap;
use std::sync::Arc;
use vhal_types::{
    CarPropertyErrorCodes, GetValueRequest, GetValueRequests, GetValueResult, HalError,
    HalPropValue, RequestId, SetValueRequest, SetValueRequests, SetValueResult, StatusCode,
};

/// Builds and sends one wire batch.
pub trait RequestsHandler: Sized {
    fn with_capacity(capacity: usize) -> Self;

    fn push(&mut self, id: RequestId, value: &HalPropValue);

    /// Ids of the batch, in insertion order.
    fn request_ids(&self) -> Vec<RequestId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand the batch to the VHAL; results arrive on `callback`.
    fn send(
        self,
        hal: &dyn VehicleHal,
        callback: Arc<dyn VehicleHalCallback>,
    ) -> Result<(), HalError>;
}

#[derive(Debug, Default)]
pub struct GetRequestsHandler {
    requests: GetValueRequests,
}

impl GetRequestsHandler {
    pub fn requests(&self) -> &GetValueRequests {
        &self.requests
    }
}

impl RequestsHandler for GetRequestsHandler {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            requests: GetValueRequests {
                payloads: Vec::with_capacity(capacity),
            },
        }
    }

    fn push(&mut self, id: RequestId, value: &HalPropValue) {
        self.requests.payloads.push(GetValueRequest {
            request_id: id,
            prop: value.to_vehicle_prop_value(),
        });
    }

    fn request_ids(&self) -> Vec<RequestId> {
        self.requests.payloads.iter().map(|r| r.request_id).collect()
    }

    fn len(&self) -> usize {
        self.requests.payloads.len()
    }

    fn send(
        self,
        hal: &dyn VehicleHal,
        callback: Arc<dyn VehicleHalCallback>,
    ) -> Result<(), HalError> {
        hal.get_values(callback, self.requests)
    }
}

#[derive(Debug, Default)]
pub struct SetRequestsHandler {
    requests: SetValueRequests,
}

impl SetRequestsHandler {
    pub fn requests(&self) -> &SetValueRequests {
        &self.requests
    }
}

impl RequestsHandler for SetRequestsHandler {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            requests: SetValueRequests {
                payloads: Vec::with_capacity(capacity),
            },
        }
    }

    fn push(&mut self, id: RequestId, value: &HalPropValue) {
        self.requests.payloads.push(SetValueRequest {
            request_id: id,
            value: value.to_vehicle_prop_value(),
        });
    }

    fn request_ids(&self) -> Vec<RequestId> {
        self.requests.payloads.iter().map(|r| r.request_id).collect()
    }

    fn len(&self) -> usize {
        self.requests.payloads.len()
    }

    fn send(
        self,
        hal: &dyn VehicleHal,
        callback: Arc<dyn VehicleHalCallback>,
    ) -> Result<(), HalError> {
        hal.set_values(callback, self.requests)
    }
}

/// Accumulates client results and dispatches them per client.
pub trait ResultsHandler: Default {
    /// Wire result this handler consumes.
    type Wire: Send + 'static;

    fn request_id(result: &Self::Wire) -> RequestId;

    /// Add the client result for `result`, which answers `request`.
    fn add_vhal_result(&mut self, request: PendingAsyncRequest, result: &Self::Wire);

    fn add_error_result(&mut self, request: PendingAsyncRequest, error: CarPropertyErrorCodes);

    /// Number of accumulated results.
    fn len(&self) -> usize;

    /// Call every client once with its results. Must run with no lock held.
    fn flush(self);
}

/// Client outcome of one wire get result.
pub fn to_get_async_result(
    service_request_id: i32,
    result: &GetValueResult,
) -> GetVehicleStubAsyncResult {
    if result.status != StatusCode::Ok {
        return GetVehicleStubAsyncResult::error(
            service_request_id,
            CarPropertyErrorCodes::from_vhal_status(result.status.code()),
        );
    }
    match &result.prop {
        Some(prop) => GetVehicleStubAsyncResult::success(service_request_id, prop.clone().into()),
        None => GetVehicleStubAsyncResult::error(
            service_request_id,
            CarPropertyErrorCodes::not_available(),
        ),
    }
}

/// Client outcome of one wire set result.
pub fn to_set_async_result(
    service_request_id: i32,
    result: &SetValueResult,
) -> SetVehicleStubAsyncResult {
    if result.status == StatusCode::Ok {
        SetVehicleStubAsyncResult::success(service_request_id)
    } else {
        SetVehicleStubAsyncResult::error(
            service_request_id,
            CarPropertyErrorCodes::from_vhal_status(result.status.code()),
        )
    }
}

#[derive(Default)]
pub struct GetResultsHandler {
    by_client: HashMap<ClientHandle, Vec<GetVehicleStubAsyncResult>>,
}

impl ResultsHandler for GetResultsHandler {
    type Wire = GetValueResult;

    fn request_id(result: &GetValueResult) -> RequestId {
        result.request_id
    }

    fn add_vhal_result(&mut self, request: PendingAsyncRequest, result: &GetValueResult) {
        let outcome = to_get_async_result(request.service_request_id, result);
        self.by_client.entry(request.client).or_default().push(outcome);
    }

    fn add_error_result(&mut self, request: PendingAsyncRequest, error: CarPropertyErrorCodes) {
        let outcome = GetVehicleStubAsyncResult::error(request.service_request_id, error);
        self.by_client.entry(request.client).or_default().push(outcome);
    }

    fn len(&self) -> usize {
        self.by_client.values().map(Vec::len).sum()
    }

    fn flush(self) {
        for (client, results) in self.by_client {
            client.callback().on_get_async_results(results);
        }
    }
}

#[derive(Default)]
pub struct SetResultsHandler {
    by_client: HashMap<ClientHandle, Vec<SetVehicleStubAsyncResult>>,
}

impl ResultsHandler for SetResultsHandler {
    type Wire = SetValueResult;

    fn request_id(result: &SetValueResult) -> RequestId {
        result.request_id
    }

    fn add_vhal_result(&mut self, request: PendingAsyncRequest, result: &SetValueResult) {
        let outcome = to_set_async_result(request.service_request_id, result);
        self.by_client.entry(request.client).or_default().push(outcome);
    }

    fn add_error_result(&mut self, request: PendingAsyncRequest, error: CarPropertyErrorCodes) {
        let outcome = SetVehicleStubAsyncResult::error(request.service_request_id, error);
        self.by_client.entry(request.client).or_default().push(outcome);
    }

    fn len(&self) -> usize {
        self.by_client.values().map(Vec::len).sum()
    }

    fn flush(self) {
        for (client, results) in self.by_client {
            client.callback().on_set_async_results(results);
        }
    }
}
