//! # Wire Batches
//!
//! Batched get/set requests and results exchanged with the VHAL. Every element
//! carries its own `RequestId`; results are matched to requests by id alone.

use crate::status::StatusCode;
use crate::values::VehiclePropValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier correlating one wire request with its result.
///
/// Unique for the lifetime of the process and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RequestId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueRequest {
    pub request_id: RequestId,
    /// Property (and area) to read; payload fields may narrow the request.
    pub prop: VehiclePropValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetValueRequests {
    pub payloads: Vec<GetValueRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub request_id: RequestId,
    pub value: VehiclePropValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetValueRequests {
    pub payloads: Vec<SetValueRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueResult {
    pub request_id: RequestId,
    pub status: StatusCode,
    /// Absent when the status is not OK, and possibly absent even when it is.
    pub prop: Option<VehiclePropValue>,
}

impl GetValueResult {
    /// Successful result carrying `prop`.
    pub fn ok(request_id: RequestId, prop: VehiclePropValue) -> Self {
        Self {
            request_id,
            status: StatusCode::Ok,
            prop: Some(prop),
        }
    }

    /// Result with `status` and no value.
    pub fn status_only(request_id: RequestId, status: StatusCode) -> Self {
        Self {
            request_id,
            status,
            prop: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetValueResults {
    pub payloads: Vec<GetValueResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueResult {
    pub request_id: RequestId,
    pub status: StatusCode,
}

impl SetValueResult {
    pub fn new(request_id: RequestId, status: StatusCode) -> Self {
        Self { request_id, status }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetValueResults {
    pub payloads: Vec<SetValueResult>,
}

impl From<Vec<GetValueResult>> for GetValueResults {
    fn from(payloads: Vec<GetValueResult>) -> Self {
        Self { payloads }
    }
}

impl From<Vec<SetValueResult>> for SetValueResults {
    fn from(payloads: Vec<SetValueResult>) -> Self {
        Self { payloads }
    }
}
