//! Error types for FreeBSD GPIO controller setup

use thiserror::Error;

/// FreeBSD GPIO specific errors
#[derive(Debug, Error)]
pub enum FbsdGpioError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("No GPIO controller specified. Use dev=/dev/gpiocN or unit=N")]
    NoDevice,
}

impl From<FbsdGpioError> for gpioc_core::Error {
    fn from(err: FbsdGpioError) -> Self {
        match err {
            FbsdGpioError::OpenFailed { path, source } => gpioc_core::Error::DeviceOpenFailed {
                device: path,
                source,
            },
            other => gpioc_core::Error::DeviceOpenFailed {
                device: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, other.to_string()),
            },
        }
    }
}

/// Result type for FreeBSD GPIO setup
pub type Result<T> = std::result::Result<T, FbsdGpioError>;
