//! Controller facade
//!
//! `GpioController` is the public operation surface. It resolves pin
//! identifiers through the [`PinRegistry`], calls the [`GpioDevice`], and
//! keeps the registry in step with the device after every call that changes
//! configuration.
//!
//! A controller only exists once its device is open and the registry has been
//! loaded from a full enumeration. After [`close`](GpioController::close)
//! every operation fails with [`Error::ControllerClosed`].
//!
//! There is no internal locking. Mutating operations take `&mut self`; to
//! share a controller between threads, wrap it in a `Mutex`.

use crate::device::{GpioDevice, PinMode};
use crate::error::{Error, Result};
use crate::pin::{PinDescriptor, PinFlags, PinId, PinValue};
use crate::registry::PinRegistry;

/// An open GPIO controller with its pin registry
pub struct GpioController<D: GpioDevice> {
    /// `None` once closed
    device: Option<D>,
    registry: PinRegistry,
}

impl<D: GpioDevice> GpioController<D> {
    /// Take ownership of an opened device and load its pin table
    ///
    /// On failure the device is closed and dropped; no partially loaded
    /// registry is kept.
    pub fn new(mut device: D) -> Result<Self> {
        let registry = match load_registry(&mut device) {
            Ok(registry) => registry,
            Err(e) => {
                if let Err(close_err) = device.close() {
                    log::warn!("Failed to close GPIO controller after error: {}", close_err);
                }
                return Err(e);
            }
        };

        log::debug!(
            "Opened GPIO controller with {} pins (max pin {})",
            registry.len(),
            registry.max_pin().unwrap_or(0)
        );

        Ok(Self {
            device: Some(device),
            registry,
        })
    }

    /// Whether the controller is still open
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Close the device and discard the registry
    ///
    /// Closing an already closed controller does nothing.
    pub fn close(&mut self) -> Result<()> {
        self.registry.clear();
        match self.device.take() {
            Some(mut device) => {
                log::debug!("Closing GPIO controller");
                device.close()
            }
            None => Ok(()),
        }
    }

    /// Borrow the underlying device
    ///
    /// Calls made directly on the device bypass the registry; use
    /// [`refresh`](Self::refresh) or [`refresh_all`](Self::refresh_all)
    /// afterwards to pick up any configuration change.
    pub fn device_mut(&mut self) -> Result<&mut D> {
        self.device.as_mut().ok_or(Error::ControllerClosed)
    }

    /// Borrow the underlying device immutably
    pub fn device(&self) -> Result<&D> {
        self.device.as_ref().ok_or(Error::ControllerClosed)
    }

    fn registry(&self) -> Result<&PinRegistry> {
        if self.device.is_none() {
            return Err(Error::ControllerClosed);
        }
        Ok(&self.registry)
    }

    /// Resolve a pin identifier and borrow the device in one step
    fn target(&mut self, pin: impl Into<PinId>) -> Result<(u32, &mut D)> {
        let device = self.device.as_mut().ok_or(Error::ControllerClosed)?;
        let index = self.registry.resolve(&pin.into())?;
        Ok((index, device))
    }

    /// Highest pin number (not the number of pins)
    pub fn max_pin(&self) -> Result<u32> {
        let registry = self.registry()?;
        registry
            .max_pin()
            .ok_or_else(|| Error::InvalidEnumeration("controller has no pins".to_string()))
    }

    /// Resolve a pin number or name to a pin number
    pub fn resolve(&self, pin: impl Into<PinId>) -> Result<u32> {
        self.registry()?.resolve(&pin.into())
    }

    /// Cached descriptor of one pin
    pub fn pin(&self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        let registry = self.registry()?;
        let index = registry.resolve(&pin.into())?;
        registry.get(index).cloned()
    }

    /// Copy of every cached descriptor
    ///
    /// Use [`refresh_all`](Self::refresh_all) to resynchronize with the device
    /// first.
    pub fn pins(&self) -> Result<Vec<PinDescriptor>> {
        Ok(self.registry()?.list())
    }

    /// Read the level of a pin
    pub fn read(&mut self, pin: impl Into<PinId>) -> Result<PinValue> {
        let (index, device) = self.target(pin)?;
        device.get(index)
    }

    /// Drive a pin; `value` must be 0 or 1
    pub fn write(&mut self, pin: impl Into<PinId>, value: u32) -> Result<()> {
        if !self.is_open() {
            return Err(Error::ControllerClosed);
        }
        let value = PinValue::try_from(value)?;
        self.write_value(pin, value)
    }

    /// Drive a pin to the given level
    pub fn write_value(&mut self, pin: impl Into<PinId>, value: PinValue) -> Result<()> {
        let (index, device) = self.target(pin)?;
        device.set(index, value)
    }

    /// Drive a pin low
    pub fn set_low(&mut self, pin: impl Into<PinId>) -> Result<()> {
        self.write_value(pin, PinValue::Low)
    }

    /// Drive a pin high
    pub fn set_high(&mut self, pin: impl Into<PinId>) -> Result<()> {
        self.write_value(pin, PinValue::High)
    }

    /// Invert the level of a pin
    pub fn toggle(&mut self, pin: impl Into<PinId>) -> Result<()> {
        let (index, device) = self.target(pin)?;
        device.toggle(index)
    }

    /// Re-read one pin's descriptor from the device and update the registry
    ///
    /// If the pin now carries a name the registry still gives to another pin,
    /// that other entry is stale (names were exchanged outside this
    /// controller) and every pin is re-read as in
    /// [`refresh_all`](Self::refresh_all).
    pub fn refresh(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        let (index, device) = self.target(pin)?;
        let desc = fetch_descriptor(device, index)?;
        log::trace!("Refreshed pin {}: {:?}", index, desc);

        if let Some(owner) = self.registry.get_by_name(&desc.name).map(|p| p.index) {
            if owner != index {
                log::debug!(
                    "Pin {} is now named '{}', still cached for pin {}; re-reading all pins",
                    index,
                    desc.name,
                    owner
                );
                self.refresh_all()?;
                return self.registry.get(index).cloned();
            }
        }

        self.registry.replace(desc.clone())?;
        Ok(desc)
    }

    /// Re-read every pin's descriptor from the device
    ///
    /// This is the way to pick up configuration changes made outside this
    /// controller. Descriptors are fetched one pin at a time, like
    /// [`refresh`](Self::refresh), and the registry is swapped only after
    /// every pin was read. Names exchanged between pins outside the process
    /// are therefore handled, and on failure the previous registry is kept.
    pub fn refresh_all(&mut self) -> Result<Vec<PinDescriptor>> {
        let device = self.device.as_mut().ok_or(Error::ControllerClosed)?;
        let count = self.registry.len() as u32;

        let mut pins = Vec::with_capacity(count as usize);
        for index in 0..count {
            pins.push(fetch_descriptor(device, index)?);
        }
        self.registry = PinRegistry::load(pins)?;

        log::debug!("Refreshed all {} pins", count);
        Ok(self.registry.list())
    }

    /// Give a pin a new name
    ///
    /// Fails with [`Error::NameConflict`] before touching the device if any
    /// pin, including this one, already carries the name. Caps and flags are
    /// assumed unchanged by a rename, so only the name is updated in the
    /// registry.
    pub fn rename(&mut self, pin: impl Into<PinId>, name: &str) -> Result<()> {
        let device = self.device.as_mut().ok_or(Error::ControllerClosed)?;
        crate::codec::validate_name(name)?;
        let index = self.registry.resolve(&pin.into())?;

        if let Some(owner) = self.registry.get_by_name(name).map(|p| p.index) {
            return Err(Error::NameConflict {
                name: name.to_string(),
                pin: owner,
            });
        }

        device.set_name(index, name)?;
        log::debug!("Renamed pin {} to '{}'", index, name);
        self.registry.rename(index, name)
    }

    /// Replace a pin's configuration flags
    ///
    /// Only the cached `flags` field is updated; caps and name are kept.
    pub fn set_flags(&mut self, pin: impl Into<PinId>, flags: PinFlags) -> Result<()> {
        let (index, device) = self.target(pin)?;
        device.set_flags(index, flags)?;
        self.registry.set_flags(index, flags)
    }

    /// Apply a single-flag configuration mode, then refresh the pin
    ///
    /// A mode change may alter other flags too (selecting output can clear
    /// tristate, for example), so the whole descriptor is always re-read.
    pub fn set_mode(&mut self, pin: impl Into<PinId>, mode: PinMode) -> Result<PinDescriptor> {
        let (index, device) = self.target(pin)?;
        device.set_mode(index, mode)?;
        self.refresh(index)
    }

    /// Configure a pin as input
    pub fn set_input(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::Input)
    }

    /// Configure a pin as output
    pub fn set_output(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::Output)
    }

    /// Configure a pin as open-drain
    pub fn set_opendrain(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::OpenDrain)
    }

    /// Configure a pin as push-pull
    pub fn set_pushpull(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::PushPull)
    }

    /// Disable a pin's output driver
    pub fn set_tristate(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::Tristate)
    }

    /// Enable a pin's internal pull-up
    pub fn set_pullup(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::PullUp)
    }

    /// Enable a pin's internal pull-down
    pub fn set_pulldown(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::PullDown)
    }

    /// Invert a pin's input
    pub fn set_invert_input(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::InvertInput)
    }

    /// Invert a pin's output
    pub fn set_invert_output(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::InvertOutput)
    }

    /// Let the hardware pulse a pin
    pub fn set_pulsate(&mut self, pin: impl Into<PinId>) -> Result<PinDescriptor> {
        self.set_mode(pin, PinMode::Pulsate)
    }
}

impl<D: GpioDevice> Drop for GpioController<D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close GPIO controller: {}", e);
        }
    }
}

impl<D: GpioDevice> core::fmt::Debug for GpioController<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioController")
            .field("open", &self.is_open())
            .field("pins", &self.registry.len())
            .finish()
    }
}

fn load_registry<D: GpioDevice>(device: &mut D) -> Result<PinRegistry> {
    let raw = device.pin_list()?;
    let pins = raw
        .iter()
        .map(|raw| raw.decode())
        .collect::<Result<Vec<_>>>()?;
    PinRegistry::load(pins)
}

fn fetch_descriptor<D: GpioDevice>(device: &mut D, index: u32) -> Result<PinDescriptor> {
    let desc = device.pin_config(index)?.decode()?;
    if desc.index != index {
        return Err(Error::InvalidEnumeration(format!(
            "requested pin {} but device returned pin {}",
            index, desc.index
        )));
    }
    Ok(desc)
}
