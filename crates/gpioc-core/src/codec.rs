//! Pin descriptor codec
//!
//! Converts between the kernel's `struct gpio_pin` / `struct gpio_req` and the
//! in-process [`PinDescriptor`]. The layouts match `sys/gpio.h` exactly:
//!
//! ```text
//! struct gpio_pin {
//!     uint32_t gp_pin;
//!     char     gp_name[GPIOMAXNAME];
//!     uint32_t gp_caps;
//!     uint32_t gp_flags;
//! };
//! ```
//!
//! Names longer than the buffer allows are rejected, never truncated.

use crate::error::{Error, Result};
use crate::pin::{PinDescriptor, PinFlags, PinValue};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

/// Size of the kernel's pin name buffer, including the terminating NUL
pub const GPIO_MAXNAME: usize = 64;

/// Longest pin name that fits the name buffer
pub const MAX_NAME_LEN: usize = GPIO_MAXNAME - 1;

/// Wire layout of `struct gpio_pin`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RawPinConfig {
    /// Pin number
    pub pin: u32,
    /// NUL-terminated pin name
    pub name: [u8; GPIO_MAXNAME],
    /// Capability bits
    pub caps: u32,
    /// Configuration bits
    pub flags: u32,
}

/// Wire layout of `struct gpio_req`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RawPinRequest {
    /// Pin number
    pub pin: u32,
    /// Pin value (0 or 1)
    pub value: u32,
}

impl RawPinConfig {
    /// Zeroed request for `pin`, ready to be filled in by the kernel
    pub fn for_pin(pin: u32) -> Self {
        let mut raw = Self::new_zeroed();
        raw.pin = pin;
        raw
    }

    /// Request carrying new configuration flags for `pin`
    pub fn with_flags(pin: u32, flags: PinFlags) -> Self {
        let mut raw = Self::for_pin(pin);
        raw.flags = flags.bits();
        raw
    }

    /// Request carrying a new name for `pin`
    pub fn with_name(pin: u32, name: &str) -> Result<Self> {
        let mut raw = Self::for_pin(pin);
        raw.name = encode_name(name)?;
        Ok(raw)
    }

    /// Decode into a descriptor
    pub fn decode(&self) -> Result<PinDescriptor> {
        Ok(PinDescriptor {
            index: self.pin,
            name: decode_name(&self.name)?,
            caps: PinFlags::from_bits_retain(self.caps),
            flags: PinFlags::from_bits_retain(self.flags),
        })
    }
}

impl RawPinRequest {
    /// Request for `pin` with the given value
    pub fn new(pin: u32, value: PinValue) -> Self {
        Self {
            pin,
            value: value.as_u32(),
        }
    }

    /// Request for `pin` with the value left for the kernel to fill in
    pub fn for_pin(pin: u32) -> Self {
        Self { pin, value: 0 }
    }

    /// Interpret the value returned by the kernel
    ///
    /// Drivers report any non-zero level as high.
    pub fn level(&self) -> PinValue {
        PinValue::from(self.value != 0)
    }
}

/// Check that `name` can be stored in the kernel's name buffer
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('\0') {
        return Err(Error::InvalidName(name.to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Encode a name into a NUL-padded name buffer
pub fn encode_name(name: &str) -> Result<[u8; GPIO_MAXNAME]> {
    validate_name(name)?;
    let mut buf = [0u8; GPIO_MAXNAME];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    Ok(buf)
}

/// Decode a name buffer, stopping at the first NUL
pub fn decode_name(buf: &[u8]) -> Result<String> {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    core::str::from_utf8(&buf[..end])
        .map(str::to_string)
        .map_err(|_| Error::InvalidName(String::from_utf8_lossy(&buf[..end]).into_owned()))
}

/// Decode a raw `struct gpio_pin` from bytes
pub fn decode(bytes: &[u8]) -> Result<PinDescriptor> {
    let raw = RawPinConfig::read_from_bytes(bytes).map_err(|_| {
        Error::InvalidEnumeration(format!(
            "pin descriptor is {} bytes, expected {}",
            bytes.len(),
            core::mem::size_of::<RawPinConfig>()
        ))
    })?;
    raw.decode()
}

/// Encode a descriptor as a raw `struct gpio_pin`
pub fn encode(desc: &PinDescriptor) -> Result<RawPinConfig> {
    Ok(RawPinConfig {
        pin: desc.index,
        name: encode_name(&desc.name)?,
        caps: desc.caps.bits(),
        flags: desc.flags.bits(),
    })
}
