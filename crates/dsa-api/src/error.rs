//! DSA error types and status handling.
//!
//! Drivers and the host stack speak POSIX-style status codes: 0 for
//! success, a negative errno for failure. This module converts between those
//! raw codes and Rust's `Result`.

use std::fmt;
use thiserror::Error;

use crate::types::{IfaceId, SwitchId};

/// Status codes exchanged with drivers and the host stack.
///
/// Values are negated Linux errno numbers.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsaStatus {
    Success = 0,
    NoEntry = -2,
    NoSuchProcess = -3,
    Io = -5,
    NoMemory = -12,
    Busy = -16,
    NoDevice = -19,
    InvalidArgument = -22,
    NoSpace = -28,
    NoSys = -38,
    NotSupported = -95,
    TimedOut = -110,
}

impl DsaStatus {
    /// Creates a DsaStatus from a raw i32 value.
    ///
    /// Positive or unknown codes map to [`DsaStatus::Io`].
    pub fn from_raw(status: i32) -> Self {
        match status {
            0 => DsaStatus::Success,
            -2 => DsaStatus::NoEntry,
            -3 => DsaStatus::NoSuchProcess,
            -5 => DsaStatus::Io,
            -12 => DsaStatus::NoMemory,
            -16 => DsaStatus::Busy,
            -19 => DsaStatus::NoDevice,
            -22 => DsaStatus::InvalidArgument,
            -28 => DsaStatus::NoSpace,
            -38 => DsaStatus::NoSys,
            -95 => DsaStatus::NotSupported,
            -110 => DsaStatus::TimedOut,
            _ => DsaStatus::Io,
        }
    }

    /// Returns the raw signed code.
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Returns true if the status indicates success.
    pub fn is_success(&self) -> bool {
        *self == DsaStatus::Success
    }

    /// Converts to a Result, returning Ok(()) for success.
    pub fn into_result(self) -> DsaResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(DsaError::Driver { status: self })
        }
    }
}

impl fmt::Display for DsaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DsaStatus::Success => "success",
            DsaStatus::NoEntry => "ENOENT",
            DsaStatus::NoSuchProcess => "ESRCH",
            DsaStatus::Io => "EIO",
            DsaStatus::NoMemory => "ENOMEM",
            DsaStatus::Busy => "EBUSY",
            DsaStatus::NoDevice => "ENODEV",
            DsaStatus::InvalidArgument => "EINVAL",
            DsaStatus::NoSpace => "ENOSPC",
            DsaStatus::NoSys => "ENOSYS",
            DsaStatus::NotSupported => "ENOTSUP",
            DsaStatus::TimedOut => "ETIMEDOUT",
        };
        write!(f, "{} ({})", s, self.as_raw())
    }
}

/// Error type for DSA operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DsaError {
    /// A handle, port number or argument is out of its valid domain.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The interface is not a DSA master or slave port.
    #[error("Interface {iface} is not a DSA port")]
    Unclassified { iface: IfaceId, not_ethernet: bool },

    /// The driver does not implement a required capability.
    #[error("Driver has no {capability} capability")]
    NoCapability { capability: &'static str },

    /// A LAG precondition was violated.
    #[error("Not supported: {reason}")]
    NotSupported { reason: String },

    /// Every LAG group slot is taken.
    #[error("LAG group pool exhausted ({capacity} groups)")]
    OutOfGroups { capacity: usize },

    /// Every slave slot is taken.
    #[error("Slave table full ({capacity} ports)")]
    OutOfPorts { capacity: usize },

    /// The requested item does not exist.
    #[error("Not found: {item}")]
    NotFound { item: String },

    /// Egress from a slave whose switch has no registered master.
    #[error("No master interface for switch {switch}")]
    NoMaster { switch: SwitchId },

    /// The driver reported a failure status.
    #[error("Driver returned {status}")]
    Driver { status: DsaStatus },
}

impl DsaError {
    /// Creates an error from a driver status code.
    pub fn from_status(status: DsaStatus) -> Self {
        match status {
            DsaStatus::Success => DsaError::Driver {
                status: DsaStatus::Io,
            },
            other => DsaError::Driver { status: other },
        }
    }

    /// Creates an invalid argument error with a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DsaError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a missing capability error.
    pub fn no_capability(capability: &'static str) -> Self {
        DsaError::NoCapability { capability }
    }

    /// Creates a not supported error with a reason.
    pub fn not_supported(reason: impl Into<String>) -> Self {
        DsaError::NotSupported {
            reason: reason.into(),
        }
    }

    /// Creates a not found error with an item description.
    pub fn not_found(item: impl Into<String>) -> Self {
        DsaError::NotFound { item: item.into() }
    }

    /// Returns the negative errno reported to the host stack.
    pub fn errno(&self) -> i32 {
        self.status().as_raw()
    }

    /// Returns the status code this error is reported as.
    pub fn status(&self) -> DsaStatus {
        match self {
            DsaError::InvalidArgument { .. } => DsaStatus::InvalidArgument,
            DsaError::Unclassified {
                not_ethernet: true, ..
            } => DsaStatus::NoEntry,
            DsaError::Unclassified { .. } => DsaStatus::NoSuchProcess,
            DsaError::NoCapability { .. } => DsaStatus::NoSys,
            DsaError::NotSupported { .. } => DsaStatus::NotSupported,
            DsaError::OutOfGroups { .. } => DsaStatus::NoMemory,
            DsaError::OutOfPorts { .. } => DsaStatus::NoSpace,
            DsaError::NotFound { .. } => DsaStatus::NoEntry,
            DsaError::NoMaster { .. } => DsaStatus::NoDevice,
            DsaError::Driver { status } => *status,
        }
    }

    /// Returns true if the error came from a missing driver capability.
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, DsaError::NoCapability { .. })
    }
}

/// Result type for DSA operations.
pub type DsaResult<T> = Result<T, DsaError>;

/// Extension trait for converting raw status codes returned by drivers.
pub trait DsaStatusExt {
    /// Converts a raw status code to a Result.
    fn to_result(self) -> DsaResult<()>;
}

impl DsaStatusExt for i32 {
    fn to_result(self) -> DsaResult<()> {
        DsaStatus::from_raw(self).into_result()
    }
}

/// Converts a Result back into the raw code the host stack expects.
pub fn to_errno<T>(result: &DsaResult<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.errno(),
    }
}
