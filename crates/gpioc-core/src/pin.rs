//! Pin value types
//!
//! `PinFlags` mirrors the `GPIO_PIN_*` and `GPIO_INTR_*` bits from FreeBSD's
//! `sys/gpio.h`. The same bitset is used for a pin's capabilities and for its
//! active configuration.

use crate::error::{Error, Result};
use bitflags::bitflags;
use core::fmt;
use core::str::FromStr;

bitflags! {
    /// GPIO pin capability / configuration flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PinFlags: u32 {
        /// Input direction
        const INPUT       = 0x0000_0001;
        /// Output direction
        const OUTPUT      = 0x0000_0002;
        /// Open-drain output
        const OPENDRAIN   = 0x0000_0004;
        /// Push-pull output
        const PUSHPULL    = 0x0000_0008;
        /// Output disabled
        const TRISTATE    = 0x0000_0010;
        /// Internal pull-up enabled
        const PULLUP      = 0x0000_0020;
        /// Internal pull-down enabled
        const PULLDOWN    = 0x0000_0040;
        /// Invert input
        const INVIN       = 0x0000_0080;
        /// Invert output
        const INVOUT      = 0x0000_0100;
        /// Pulsate in hardware
        const PULSATE     = 0x0000_0200;
        /// Preset pin low before enabling output
        const PRESET_LOW  = 0x0000_0400;
        /// Preset pin high before enabling output
        const PRESET_HIGH = 0x0000_0800;

        /// Level triggered interrupt, low
        const INTR_LEVEL_LOW    = 0x0001_0000;
        /// Level triggered interrupt, high
        const INTR_LEVEL_HIGH   = 0x0002_0000;
        /// Edge triggered interrupt, rising
        const INTR_EDGE_RISING  = 0x0004_0000;
        /// Edge triggered interrupt, falling
        const INTR_EDGE_FALLING = 0x0008_0000;
        /// Edge triggered interrupt, both edges
        const INTR_EDGE_BOTH    = 0x0010_0000;

        /// All interrupt capability bits
        const INTR_MASK = Self::INTR_LEVEL_LOW.bits()
            | Self::INTR_LEVEL_HIGH.bits()
            | Self::INTR_EDGE_RISING.bits()
            | Self::INTR_EDGE_FALLING.bits()
            | Self::INTR_EDGE_BOTH.bits();

        // Bits unknown to this crate are carried through unchanged
        const _ = !0;
    }
}

impl Default for PinFlags {
    fn default() -> Self {
        PinFlags::empty()
    }
}

/// Short flag names as printed by gpioctl(8)
const SHORT_NAMES: &[(PinFlags, &str)] = &[
    (PinFlags::INPUT, "IN"),
    (PinFlags::OUTPUT, "OUT"),
    (PinFlags::OPENDRAIN, "OD"),
    (PinFlags::PUSHPULL, "PP"),
    (PinFlags::TRISTATE, "TS"),
    (PinFlags::PULLUP, "PU"),
    (PinFlags::PULLDOWN, "PD"),
    (PinFlags::INVIN, "II"),
    (PinFlags::INVOUT, "IO"),
    (PinFlags::PULSATE, "PULSE"),
    (PinFlags::PRESET_LOW, "PRESET_LOW"),
    (PinFlags::PRESET_HIGH, "PRESET_HIGH"),
    (PinFlags::INTR_LEVEL_LOW, "IL"),
    (PinFlags::INTR_LEVEL_HIGH, "IH"),
    (PinFlags::INTR_EDGE_RISING, "ER"),
    (PinFlags::INTR_EDGE_FALLING, "EF"),
    (PinFlags::INTR_EDGE_BOTH, "EB"),
];

impl PinFlags {
    /// Look up a single flag by its short gpioctl name (case-insensitive)
    pub fn from_short_name(name: &str) -> Option<PinFlags> {
        SHORT_NAMES
            .iter()
            .find(|(_, short)| short.eq_ignore_ascii_case(name))
            .map(|(flag, _)| *flag)
    }

    /// Short names of every known flag set in `self`, in bit order
    pub fn short_names(self) -> Vec<&'static str> {
        SHORT_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, short)| *short)
            .collect()
    }

    /// Flags with the interrupt bits removed
    pub fn without_interrupts(self) -> PinFlags {
        self.difference(PinFlags::INTR_MASK)
    }
}

/// Logical level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinValue {
    /// Logical 0
    Low,
    /// Logical 1
    High,
}

impl PinValue {
    /// The other level
    pub fn inverted(self) -> PinValue {
        match self {
            PinValue::Low => PinValue::High,
            PinValue::High => PinValue::Low,
        }
    }

    /// Numeric value as used by the device interface
    pub fn as_u32(self) -> u32 {
        match self {
            PinValue::Low => 0,
            PinValue::High => 1,
        }
    }
}

impl TryFrom<u32> for PinValue {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(PinValue::Low),
            1 => Ok(PinValue::High),
            other => Err(Error::InvalidPinValue(other)),
        }
    }
}

impl From<bool> for PinValue {
    fn from(high: bool) -> Self {
        if high {
            PinValue::High
        } else {
            PinValue::Low
        }
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Caller-supplied pin identifier
///
/// Resolved to a canonical index by the pin registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinId {
    /// Kernel pin number
    Index(u32),
    /// Current pin name
    Name(String),
}

impl From<u32> for PinId {
    fn from(index: u32) -> Self {
        PinId::Index(index)
    }
}

impl From<&str> for PinId {
    fn from(name: &str) -> Self {
        PinId::Name(name.to_string())
    }
}

impl From<String> for PinId {
    fn from(name: String) -> Self {
        PinId::Name(name)
    }
}

impl From<&PinId> for PinId {
    fn from(id: &PinId) -> Self {
        id.clone()
    }
}

/// Parse a pin identifier from text
///
/// All-digit input is a pin number; anything else is a pin name. A pin whose
/// name is purely numeric can therefore only be addressed by its index here.
/// Text is taken as is: surrounding whitespace is part of the name.
impl FromStr for PinId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.contains('\0') {
            return Err(Error::InvalidIdentifier(s.to_string()));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u32>()
                .map(PinId::Index)
                .map_err(|_| Error::InvalidIdentifier(s.to_string()));
        }
        Ok(PinId::Name(s.to_string()))
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinId::Index(index) => write!(f, "{}", index),
            PinId::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Cached description of one pin
///
/// Immutable once built; updates replace the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinDescriptor {
    /// Kernel-assigned pin number
    pub index: u32,
    /// Pin name, unique within the controller
    pub name: String,
    /// Hardware capabilities
    pub caps: PinFlags,
    /// Active configuration
    pub flags: PinFlags,
}

impl PinDescriptor {
    /// Create a descriptor
    pub fn new(index: u32, name: impl Into<String>, caps: PinFlags, flags: PinFlags) -> Self {
        Self {
            index,
            name: name.into(),
            caps,
            flags,
        }
    }

    /// Copy of this descriptor with a different name
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy of this descriptor with different configuration flags
    pub fn with_flags(&self, flags: PinFlags) -> Self {
        Self {
            flags,
            ..self.clone()
        }
    }

    /// Whether the pin is currently configured as an output
    pub fn is_output(&self) -> bool {
        self.flags.contains(PinFlags::OUTPUT)
    }
}
