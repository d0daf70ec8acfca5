//! gpioc-core - FreeBSD GPIO controller core
//!
//! This crate mirrors the pin table of a GPIO controller (`/dev/gpiocN`) in
//! process and exposes read, write, toggle and configuration operations on
//! pins addressed by number or by name.
//!
//! The device itself is reached through the [`GpioDevice`] trait. The
//! `gpioc-fbsd` crate implements it with the FreeBSD GPIO ioctls, and
//! `gpioc-dummy` with an in-memory controller for testing.
//!
//! # Example
//!
//! ```ignore
//! use gpioc_core::{GpioController, GpioDevice};
//!
//! fn blink<D: GpioDevice>(device: D) -> gpioc_core::Result<()> {
//!     let mut gpio = GpioController::new(device)?;
//!     gpio.set_output("led0")?;
//!     gpio.write("led0", 1)?;
//!     gpio.toggle("led0")?;
//!     gpio.rename("led0", "led_red")?;
//!     for pin in gpio.pins()? {
//!         println!("{}: {} {:?}", pin.index, pin.name, pin.flags);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod controller;
pub mod device;
pub mod error;
pub mod pin;
pub mod registry;

pub use codec::{RawPinConfig, RawPinRequest, GPIO_MAXNAME, MAX_NAME_LEN};
pub use controller::GpioController;
pub use device::{GpioDevice, PinMode};
pub use error::{Error, Result};
pub use pin::{PinDescriptor, PinFlags, PinId, PinValue};
pub use registry::PinRegistry;
