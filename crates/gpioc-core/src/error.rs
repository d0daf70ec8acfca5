//! Error types for gpioc-core
//!
//! Every failure a controller can report is a distinct variant so callers can
//! match on the kind. Nothing in this crate retries; retry policy belongs to
//! the caller.

use crate::pin::PinId;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The GPIO controller device could not be opened
    #[error("Failed to open GPIO controller '{device}': {source}")]
    DeviceOpenFailed {
        /// Unit number or device path
        device: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Pin index out of range, or no pin carries the given name
    #[error("Pin {pin} not found (valid pins: 0-{max_pin})")]
    PinNotFound {
        /// Identifier that failed to resolve
        pin: PinId,
        /// Highest valid pin number
        max_pin: u32,
    },

    /// Pin identifier is neither a number nor a usable name
    #[error("Invalid pin identifier '{0}': expected a pin number or a pin name")]
    InvalidIdentifier(String),

    /// Pin value other than 0 or 1
    #[error("Invalid pin value {0}: must be 0 (low) or 1 (high)")]
    InvalidPinValue(u32),

    /// Rename target is already used by another pin
    #[error("Pin name '{name}' already exists (pin {pin})")]
    NameConflict {
        /// Requested name
        name: String,
        /// Pin that already carries it
        pin: u32,
    },

    /// Name does not fit the fixed-size name buffer
    #[error("Pin name '{name}' is {len} bytes long (maximum {max})")]
    NameTooLong {
        /// Requested name
        name: String,
        /// Its length in bytes
        len: usize,
        /// Longest accepted name
        max: usize,
    },

    /// Name is empty, contains a NUL byte or is not valid UTF-8
    #[error("Invalid pin name '{0}'")]
    InvalidName(String),

    /// The device reported a pin table that cannot be mirrored
    #[error("Inconsistent pin enumeration: {0}")]
    InvalidEnumeration(String),

    /// An underlying device call reported failure
    #[error("{op}{} failed: {source}", pin_suffix(.pin))]
    Device {
        /// Name of the failed call
        op: &'static str,
        /// Pin the call was made for, if any
        pin: Option<u32>,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Operation attempted after the controller was closed
    #[error("GPIO controller is closed")]
    ControllerClosed,
}

impl Error {
    /// Build a device error for an operation on a single pin
    pub fn device(op: &'static str, pin: u32, source: std::io::Error) -> Self {
        Self::Device {
            op,
            pin: Some(pin),
            source,
        }
    }

    /// Build a device error for a controller-wide operation
    pub fn controller(op: &'static str, source: std::io::Error) -> Self {
        Self::Device {
            op,
            pin: None,
            source,
        }
    }
}

fn pin_suffix(pin: &Option<u32>) -> String {
    match pin {
        Some(pin) => format!(" (pin={})", pin),
        None => String::new(),
    }
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
