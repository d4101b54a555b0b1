//! # Status Codes
//!
//! VHAL status codes and their translation into the error codes reported to
//! property-manager clients.
//!
//! A raw VHAL error code packs two values:
//!
//! ```text
//!  31            16 15             0
//! ┌────────────────┬────────────────┐
//! │  vendor code   │  system code   │
//! └────────────────┴────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

const SYSTEM_ERROR_CODE_MASK: i32 = 0xffff;
const VENDOR_ERROR_CODE_SHIFT: u32 = 16;

/// Status reported by the VHAL for a request, or carried by a service specific error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    TryAgain = 1,
    InvalidArg = 2,
    NotAvailable = 3,
    AccessDenied = 4,
    InternalError = 5,
    NotAvailableDisabled = 6,
    NotAvailableSpeedLow = 7,
    NotAvailableSpeedHigh = 8,
    NotAvailablePoorVisibility = 9,
    NotAvailableSafety = 10,
}

impl StatusCode {
    /// Numeric wire value.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a status by its numeric wire value.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::TryAgain),
            2 => Some(Self::InvalidArg),
            3 => Some(Self::NotAvailable),
            4 => Some(Self::AccessDenied),
            5 => Some(Self::InternalError),
            6 => Some(Self::NotAvailableDisabled),
            7 => Some(Self::NotAvailableSpeedLow),
            8 => Some(Self::NotAvailableSpeedHigh),
            9 => Some(Self::NotAvailablePoorVisibility),
            10 => Some(Self::NotAvailableSafety),
            _ => None,
        }
    }

    /// Whether this is one of the "not available" family of statuses.
    pub fn is_not_available(self) -> bool {
        matches!(
            self,
            Self::NotAvailable
                | Self::NotAvailableDisabled
                | Self::NotAvailableSpeedLow
                | Self::NotAvailableSpeedHigh
                | Self::NotAvailablePoorVisibility
                | Self::NotAvailableSafety
        )
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Error code reported to property-manager clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarPropMgrErrorCode {
    /// No error.
    Ok,
    /// Transient failure, the client may retry.
    TryAgain,
    InternalError,
    NotAvailable,
    Timeout,
}

impl CarPropMgrErrorCode {
    /// Numeric value as seen by property-manager clients.
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::TryAgain => -1,
            Self::InternalError => 1,
            Self::NotAvailable => 2,
            Self::Timeout => 3,
        }
    }
}

/// The error triple carried by every async get/set result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarPropertyErrorCodes {
    /// Client-facing error category.
    pub error_code: CarPropMgrErrorCode,
    /// Vendor specific detail, 0x0000..=0xffff.
    pub vendor_error_code: i32,
    /// VHAL system status, 0x0000..=0xffff.
    pub system_error_code: i32,
}

impl CarPropertyErrorCodes {
    /// Success, no error.
    pub const OK: Self = Self {
        error_code: CarPropMgrErrorCode::Ok,
        vendor_error_code: 0,
        system_error_code: 0,
    };

    pub fn new(error_code: CarPropMgrErrorCode, vendor_error_code: i32, system_error_code: i32) -> Self {
        Self {
            error_code,
            vendor_error_code,
            system_error_code,
        }
    }

    /// Outcome for a failed IPC transport call.
    pub fn internal_error() -> Self {
        Self::new(
            CarPropMgrErrorCode::InternalError,
            0,
            StatusCode::InternalError.code(),
        )
    }

    /// Outcome for a get that succeeded but returned no value.
    pub fn not_available() -> Self {
        Self::new(
            CarPropMgrErrorCode::NotAvailable,
            0,
            StatusCode::NotAvailable.code(),
        )
    }

    /// Translate a raw VHAL error code (system code plus optional vendor bits).
    pub fn from_vhal_status(raw: i32) -> Self {
        let system_error_code = vhal_system_error_code(raw);
        let error_code = match StatusCode::from_code(system_error_code) {
            Some(StatusCode::Ok) => CarPropMgrErrorCode::Ok,
            Some(status) if status.is_not_available() => CarPropMgrErrorCode::NotAvailable,
            Some(StatusCode::TryAgain) => CarPropMgrErrorCode::TryAgain,
            _ => CarPropMgrErrorCode::InternalError,
        };

        Self::new(error_code, vhal_vendor_error_code(raw), system_error_code)
    }

    pub fn is_ok(&self) -> bool {
        self.error_code == CarPropMgrErrorCode::Ok
    }
}

impl From<StatusCode> for CarPropertyErrorCodes {
    fn from(status: StatusCode) -> Self {
        Self::from_vhal_status(status.code())
    }
}

impl fmt::Display for CarPropertyErrorCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CarPropertyErrorCodes{{cpmErrorCode: {}, vendorErrorCode: {}, systemErrorCode: {}}}",
            self.error_code.code(),
            self.vendor_error_code,
            self.system_error_code
        )
    }
}

/// System status carried in the low 16 bits of a raw VHAL error code.
pub fn vhal_system_error_code(raw: i32) -> i32 {
    raw & SYSTEM_ERROR_CODE_MASK
}

/// Vendor error carried in the high 16 bits of a raw VHAL error code.
pub fn vhal_vendor_error_code(raw: i32) -> i32 {
    ((raw as u32) >> VENDOR_ERROR_CODE_SHIFT) as i32
}
