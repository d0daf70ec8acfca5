//! Device binding trait
//!
//! A `GpioDevice` is one opened GPIO controller. Implementations issue the raw
//! device calls and nothing else: no caching, no retries. Every failure is
//! returned as [`Error::Device`](crate::Error::Device).

use crate::codec::RawPinConfig;
use crate::error::{Error, Result};
use crate::pin::{PinFlags, PinValue};
use core::fmt;
use core::str::FromStr;

/// Single-flag pin configuration modes
///
/// Each mode corresponds to one of libgpio's `gpio_pin_<mode>()` helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// Input direction
    Input,
    /// Output direction
    Output,
    /// Open-drain output
    OpenDrain,
    /// Push-pull output
    PushPull,
    /// Output disabled
    Tristate,
    /// Internal pull-up
    PullUp,
    /// Internal pull-down
    PullDown,
    /// Inverted input
    InvertInput,
    /// Inverted output
    InvertOutput,
    /// Hardware pulsing
    Pulsate,
}

impl PinMode {
    /// All modes, in flag bit order
    pub const ALL: [PinMode; 10] = [
        PinMode::Input,
        PinMode::Output,
        PinMode::OpenDrain,
        PinMode::PushPull,
        PinMode::Tristate,
        PinMode::PullUp,
        PinMode::PullDown,
        PinMode::InvertInput,
        PinMode::InvertOutput,
        PinMode::Pulsate,
    ];

    /// The configuration flag this mode selects
    pub fn flag(self) -> PinFlags {
        match self {
            PinMode::Input => PinFlags::INPUT,
            PinMode::Output => PinFlags::OUTPUT,
            PinMode::OpenDrain => PinFlags::OPENDRAIN,
            PinMode::PushPull => PinFlags::PUSHPULL,
            PinMode::Tristate => PinFlags::TRISTATE,
            PinMode::PullUp => PinFlags::PULLUP,
            PinMode::PullDown => PinFlags::PULLDOWN,
            PinMode::InvertInput => PinFlags::INVIN,
            PinMode::InvertOutput => PinFlags::INVOUT,
            PinMode::Pulsate => PinFlags::PULSATE,
        }
    }

    /// Lowercase name as accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            PinMode::Input => "input",
            PinMode::Output => "output",
            PinMode::OpenDrain => "opendrain",
            PinMode::PushPull => "pushpull",
            PinMode::Tristate => "tristate",
            PinMode::PullUp => "pullup",
            PinMode::PullDown => "pulldown",
            PinMode::InvertInput => "invin",
            PinMode::InvertOutput => "invout",
            PinMode::Pulsate => "pulsate",
        }
    }
}

impl FromStr for PinMode {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        PinMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| {
                let names: Vec<&str> = PinMode::ALL.iter().map(|m| m.name()).collect();
                format!("Unknown pin mode '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opened GPIO controller
///
/// Opening is left to each implementation's constructor (by unit number or
/// by device path). All calls are blocking and non-retrying.
pub trait GpioDevice {
    /// Highest valid pin number (not the pin count: pin 0 usually exists)
    fn max_pin(&mut self) -> Result<u32>;

    /// Fetch the raw descriptor of one pin
    fn pin_config(&mut self, pin: u32) -> Result<RawPinConfig>;

    /// Fetch the raw descriptors of every pin, `0..=max_pin`
    ///
    /// Callers should enumerate once per controller open and refresh single
    /// pins afterwards.
    fn pin_list(&mut self) -> Result<Vec<RawPinConfig>> {
        let max_pin = self.max_pin()?;
        (0..=max_pin).map(|pin| self.pin_config(pin)).collect()
    }

    /// Read the current level of a pin
    fn get(&mut self, pin: u32) -> Result<PinValue>;

    /// Drive a pin to the given level
    fn set(&mut self, pin: u32, value: PinValue) -> Result<()>;

    /// Invert the current level of a pin
    fn toggle(&mut self, pin: u32) -> Result<()>;

    /// Change the name of a pin
    fn set_name(&mut self, pin: u32, name: &str) -> Result<()>;

    /// Replace the configuration flags of a pin
    fn set_flags(&mut self, pin: u32, flags: PinFlags) -> Result<()>;

    /// Apply a single-flag configuration mode
    ///
    /// Matches libgpio: the pin's configuration is fetched first, then its
    /// flags are replaced by exactly the mode's flag. The device may adjust
    /// other bits as a side effect, so callers must re-fetch afterwards.
    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<()> {
        self.pin_config(pin)?;
        self.set_flags(pin, mode.flag())
    }

    /// Release the device handle
    ///
    /// Must be safe to call more than once.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<D: GpioDevice + ?Sized> GpioDevice for Box<D> {
    fn max_pin(&mut self) -> Result<u32> {
        (**self).max_pin()
    }

    fn pin_config(&mut self, pin: u32) -> Result<RawPinConfig> {
        (**self).pin_config(pin)
    }

    fn pin_list(&mut self) -> Result<Vec<RawPinConfig>> {
        (**self).pin_list()
    }

    fn get(&mut self, pin: u32) -> Result<PinValue> {
        (**self).get(pin)
    }

    fn set(&mut self, pin: u32, value: PinValue) -> Result<()> {
        (**self).set(pin, value)
    }

    fn toggle(&mut self, pin: u32) -> Result<()> {
        (**self).toggle(pin)
    }

    fn set_name(&mut self, pin: u32, name: &str) -> Result<()> {
        (**self).set_name(pin, name)
    }

    fn set_flags(&mut self, pin: u32, flags: PinFlags) -> Result<()> {
        (**self).set_flags(pin, flags)
    }

    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<()> {
        (**self).set_mode(pin, mode)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Map an `std::io::Error` from a pin-level call into a core error
pub fn pin_error(op: &'static str, pin: u32) -> impl FnOnce(std::io::Error) -> Error {
    move |source| Error::device(op, pin, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        for mode in PinMode::ALL {
            assert_eq!(mode.name().parse::<PinMode>().unwrap(), mode);
        }
        assert_eq!("PullUp".parse::<PinMode>().unwrap(), PinMode::PullUp);
        assert!("sideways".parse::<PinMode>().is_err());
    }

    #[test]
    fn test_mode_flags_are_distinct() {
        let mut all = PinFlags::empty();
        for mode in PinMode::ALL {
            assert!(!all.intersects(mode.flag()));
            all |= mode.flag();
        }
    }
}
