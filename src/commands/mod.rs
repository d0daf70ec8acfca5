//! CLI command implementations
//!
//! Every command runs against a [`Controller`], a controller facade over
//! whichever backend was selected with `-d`. Output follows gpioctl(8).

mod config;
mod list;
mod pin;

pub use config::{cmd_config, cmd_mode};
pub use list::cmd_list;
pub use pin::{cmd_get, cmd_name, cmd_set, cmd_toggle};

use gpioc_core::{GpioController, GpioDevice, PinId};

/// Controller over a dynamically selected backend
pub type Controller = GpioController<Box<dyn GpioDevice>>;

/// Result type shared by all commands
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Parse a pin argument (number or name)
fn parse_pin(arg: &str) -> Result<PinId, gpioc_core::Error> {
    arg.parse()
}
