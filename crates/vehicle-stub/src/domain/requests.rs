//! Client-facing async requests and results.

use std::time::{Duration, Instant};
use vhal_types::{CarPropMgrErrorCode, CarPropertyErrorCodes, HalPropValue};

/// One element of a `get_async` / `set_async` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncGetSetRequest {
    /// Caller-assigned id, used to report results and to cancel.
    pub service_request_id: i32,
    /// Property to read, or value to write.
    pub value: HalPropValue,
    /// Point in time after which the request is reported as timed out.
    pub deadline: Instant,
}

impl AsyncGetSetRequest {
    pub fn new(service_request_id: i32, value: HalPropValue, deadline: Instant) -> Self {
        Self {
            service_request_id,
            value,
            deadline,
        }
    }

    /// Request whose deadline is `timeout` from now.
    pub fn with_timeout(service_request_id: i32, value: HalPropValue, timeout: Duration) -> Self {
        Self::new(service_request_id, value, Instant::now() + timeout)
    }
}

/// Outcome of one async get.
#[derive(Debug, Clone, PartialEq)]
pub struct GetVehicleStubAsyncResult {
    service_request_id: i32,
    value: Option<HalPropValue>,
    error_codes: CarPropertyErrorCodes,
}

impl GetVehicleStubAsyncResult {
    pub fn success(service_request_id: i32, value: HalPropValue) -> Self {
        Self {
            service_request_id,
            value: Some(value),
            error_codes: CarPropertyErrorCodes::OK,
        }
    }

    pub fn error(service_request_id: i32, error_codes: CarPropertyErrorCodes) -> Self {
        Self {
            service_request_id,
            value: None,
            error_codes,
        }
    }

    pub fn service_request_id(&self) -> i32 {
        self.service_request_id
    }

    /// The value read; `None` for every error outcome.
    pub fn value(&self) -> Option<&HalPropValue> {
        self.value.as_ref()
    }

    pub fn error_codes(&self) -> CarPropertyErrorCodes {
        self.error_codes
    }

    pub fn error_code(&self) -> CarPropMgrErrorCode {
        self.error_codes.error_code
    }

    pub fn vendor_error_code(&self) -> i32 {
        self.error_codes.vendor_error_code
    }

    pub fn is_success(&self) -> bool {
        self.error_codes.is_ok()
    }
}

/// Outcome of one async set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetVehicleStubAsyncResult {
    service_request_id: i32,
    error_codes: CarPropertyErrorCodes,
}

impl SetVehicleStubAsyncResult {
    pub fn success(service_request_id: i32) -> Self {
        Self {
            service_request_id,
            error_codes: CarPropertyErrorCodes::OK,
        }
    }

    pub fn error(service_request_id: i32, error_codes: CarPropertyErrorCodes) -> Self {
        Self {
            service_request_id,
            error_codes,
        }
    }

    pub fn service_request_id(&self) -> i32 {
        self.service_request_id
    }

    pub fn error_codes(&self) -> CarPropertyErrorCodes {
        self.error_codes
    }

    pub fn error_code(&self) -> CarPropMgrErrorCode {
        self.error_codes.error_code
    }

    pub fn vendor_error_code(&self) -> i32 {
        self.error_codes.vendor_error_code
    }

    pub fn is_success(&self) -> bool {
        self.error_codes.is_ok()
    }
}
