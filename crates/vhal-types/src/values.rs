//! # Property Values
//!
//! Property payloads as they travel over the wire (`VehiclePropValue`) and as
//! clients of the vehicle stub see them (`HalPropValue`). Encoding of the
//! payload itself is owned by the transport; these types only carry it.

use crate::status::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of a property value as reported by the VHAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyStatus {
    #[default]
    Available,
    Unavailable,
    Error,
}

/// Raw typed payload of a property value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPropValues {
    pub int32_values: Vec<i32>,
    pub float_values: Vec<f32>,
    pub int64_values: Vec<i64>,
    pub byte_values: Vec<u8>,
    pub string_value: String,
}

/// A property value in its wire representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePropValue {
    /// Elapsed realtime nanoseconds when the value was produced.
    pub timestamp: i64,
    pub area_id: i32,
    pub prop: i32,
    pub status: PropertyStatus,
    pub value: RawPropValues,
}

impl VehiclePropValue {
    /// Value addressing `prop` in `area_id` with an empty payload.
    pub fn new(prop: i32, area_id: i32) -> Self {
        Self {
            prop,
            area_id,
            ..Self::default()
        }
    }
}

/// A property value as held by clients of the vehicle stub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HalPropValue(VehiclePropValue);

impl HalPropValue {
    pub fn new(prop_id: i32, area_id: i32) -> Self {
        Self(VehiclePropValue::new(prop_id, area_id))
    }

    pub fn with_int32_values(mut self, values: Vec<i32>) -> Self {
        self.0.value.int32_values = values;
        self
    }

    pub fn with_float_values(mut self, values: Vec<f32>) -> Self {
        self.0.value.float_values = values;
        self
    }

    pub fn with_string_value(mut self, value: impl Into<String>) -> Self {
        self.0.value.string_value = value.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.0.timestamp = timestamp;
        self
    }

    pub fn prop_id(&self) -> i32 {
        self.0.prop
    }

    pub fn area_id(&self) -> i32 {
        self.0.area_id
    }

    pub fn timestamp(&self) -> i64 {
        self.0.timestamp
    }

    pub fn status(&self) -> PropertyStatus {
        self.0.status
    }

    pub fn values(&self) -> &RawPropValues {
        &self.0.value
    }

    /// Wire representation of this value.
    pub fn to_vehicle_prop_value(&self) -> VehiclePropValue {
        self.0.clone()
    }
}

impl From<VehiclePropValue> for HalPropValue {
    fn from(value: VehiclePropValue) -> Self {
        Self(value)
    }
}

impl fmt::Display for HalPropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "propID: {}, areaID: {}", self.prop_id(), self.area_id())
    }
}

/// How a property may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyAccess {
    #[default]
    None,
    Read,
    Write,
    ReadWrite,
}

/// How a property reports changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyChangeMode {
    #[default]
    Static,
    OnChange,
    Continuous,
}

/// Static configuration of one property as advertised by the VHAL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePropConfig {
    pub prop: i32,
    pub access: PropertyAccess,
    pub change_mode: PropertyChangeMode,
    pub area_ids: Vec<i32>,
    pub config_array: Vec<i32>,
    pub config_string: String,
    pub min_sample_rate: f32,
    pub max_sample_rate: f32,
}

/// Subscription request for one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscribeOptions {
    pub prop_id: i32,
    /// Empty means every area.
    pub area_ids: Vec<i32>,
    pub sample_rate: f32,
}

/// Asynchronous failure of a previously accepted property write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePropError {
    pub prop_id: i32,
    pub area_id: i32,
    pub error_code: StatusCode,
}
