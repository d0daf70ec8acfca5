//! gpioc-fbsd - FreeBSD GPIO controller support
//!
//! This crate drives the GPIO controllers exposed by FreeBSD's gpioc(4)
//! driver as `/dev/gpiocN`, using the same ioctls as libgpio(3).
//!
//! # Example
//!
//! ```no_run
//! use gpioc_core::GpioController;
//! use gpioc_fbsd::FbsdGpio;
//!
//! let device = FbsdGpio::open_unit(0)?;
//! let mut gpio = GpioController::new(device)?;
//!
//! gpio.set_output("led0")?;
//! gpio.toggle("led0")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with gpioc CLI
//!
//! ```bash
//! # Controller by unit number
//! gpioc -d fbsd:unit=1 list -v
//!
//! # Controller by device path
//! gpioc -d fbsd:dev=/dev/gpioc0 set led0 1
//! ```
//!
//! # Permissions
//!
//! `/dev/gpioc*` is owned by root with mode 0600 by default. Add a devfs.rules
//! entry to grant access to an operator group.

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, FbsdGpio, FbsdGpioConfig, GPIOC_PATH_PREFIX};
pub use error::{FbsdGpioError, Result};

/// Open a FreeBSD GPIO controller and return a boxed GpioDevice
///
/// This is a convenience function for use in the CLI backend dispatch.
///
/// # Example Options
///
/// - `dev=/dev/gpioc0` - device path
/// - `unit=0` - controller unit number (default: 0)
pub fn open_fbsd_gpio(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn gpioc_core::GpioDevice>, Box<dyn std::error::Error>> {
    let config = parse_options(options).map_err(FbsdGpioError::InvalidParameter)?;
    let gpio = FbsdGpio::open(&config)?;
    Ok(Box::new(gpio))
}
