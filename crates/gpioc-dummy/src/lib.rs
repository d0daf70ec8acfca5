//! gpioc-dummy - In-memory GPIO controller emulator for testing
//!
//! This crate provides a dummy GPIO controller that keeps its pin table in
//! memory. It's useful for testing and development without real hardware.
//!
//! The emulation follows the FreeBSD kernel where it matters for callers:
//! flags are checked against the pin's capabilities, contradictory flags are
//! rejected, names are not checked for uniqueness, and (like most drivers) a
//! configuration without a direction bit keeps the current direction.

use gpioc_core::codec;
use gpioc_core::{Error, GpioDevice, PinDescriptor, PinFlags, PinValue, RawPinConfig, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::rc::Rc;

/// Capabilities given to every emulated pin by default
pub const DEFAULT_CAPS: PinFlags = PinFlags::INPUT
    .union(PinFlags::OUTPUT)
    .union(PinFlags::OPENDRAIN)
    .union(PinFlags::PUSHPULL)
    .union(PinFlags::TRISTATE)
    .union(PinFlags::PULLUP)
    .union(PinFlags::PULLDOWN)
    .union(PinFlags::INVIN)
    .union(PinFlags::INVOUT)
    .union(PinFlags::PULSATE)
    .union(PinFlags::INTR_MASK);

const DIRECTION: PinFlags = PinFlags::INPUT.union(PinFlags::OUTPUT);

/// Configuration for the dummy controller
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Number of pins
    pub num_pins: u32,
    /// Capabilities of every pin
    pub caps: PinFlags,
    /// Initial configuration of every pin
    pub flags: PinFlags,
    /// Pin names are this prefix followed by the pin number
    pub name_prefix: String,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            num_pins: 8,
            caps: DEFAULT_CAPS,
            flags: PinFlags::INPUT,
            name_prefix: "gpio_".to_string(),
        }
    }
}

impl DummyConfig {
    /// Set the number of pins
    pub fn with_pins(mut self, num_pins: u32) -> Self {
        self.num_pins = num_pins;
        self
    }
}

/// Device calls that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DummyOp {
    /// `max_pin`
    MaxPin,
    /// `pin_config`
    PinConfig,
    /// `get`
    Get,
    /// `set`
    Set,
    /// `toggle`
    Toggle,
    /// `set_name`
    SetName,
    /// `set_flags`
    SetFlags,
}

impl DummyOp {
    fn call_name(self) -> &'static str {
        match self {
            DummyOp::MaxPin => "gpio_max_pin",
            DummyOp::PinConfig => "gpio_pin_config",
            DummyOp::Get => "gpio_pin_get",
            DummyOp::Set => "gpio_pin_set",
            DummyOp::Toggle => "gpio_pin_toggle",
            DummyOp::SetName => "gpio_pin_set_name",
            DummyOp::SetFlags => "gpio_pin_set_flags",
        }
    }
}

/// Number of calls made to a dummy controller
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DummyCounts {
    /// Full enumerations
    pub pin_list: usize,
    /// Single-pin descriptor fetches (including those made by enumerations)
    pub pin_config: usize,
    /// Level changes (`set` and `toggle`)
    pub writes: usize,
    /// Renames
    pub set_name: usize,
    /// Flag changes (including mode changes)
    pub set_flags: usize,
    /// Closes
    pub close: usize,
}

/// Shared view of a dummy controller's call counts
///
/// Stays readable after the controller owning the device has been dropped.
#[derive(Debug, Clone, Default)]
pub struct DummyStats(Rc<RefCell<DummyCounts>>);

impl DummyStats {
    /// Current counts
    pub fn counts(&self) -> DummyCounts {
        *self.0.borrow()
    }

    fn bump(&self, f: impl FnOnce(&mut DummyCounts)) {
        f(&mut self.0.borrow_mut());
    }
}

#[derive(Debug, Clone)]
struct DummyPin {
    desc: PinDescriptor,
    value: PinValue,
}

/// Dummy GPIO controller
///
/// Emulates a GPIO controller in memory for testing purposes.
#[derive(Debug)]
pub struct DummyGpio {
    pins: Vec<DummyPin>,
    failures: HashSet<DummyOp>,
    stats: DummyStats,
    closed: bool,
}

impl DummyGpio {
    /// Create a new dummy controller with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let pins = (0..config.num_pins)
            .map(|index| {
                PinDescriptor::new(
                    index,
                    format!("{}{}", config.name_prefix, index),
                    config.caps,
                    config.flags,
                )
            })
            .collect();
        Self::with_pins(pins)
    }

    /// Create a new dummy controller with default configuration (8 pins)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy controller from explicit descriptors
    ///
    /// Descriptors are stored as given (even duplicate names), which lets
    /// tests present inconsistent hardware. All pins start low.
    pub fn with_pins(pins: Vec<PinDescriptor>) -> Self {
        Self {
            pins: pins
                .into_iter()
                .map(|desc| DummyPin {
                    desc,
                    value: PinValue::Low,
                })
                .collect(),
            failures: HashSet::new(),
            stats: DummyStats::default(),
            closed: false,
        }
    }

    /// Make every future call of `op` fail with an I/O error
    pub fn fail_on(&mut self, op: DummyOp) {
        self.failures.insert(op);
    }

    /// Stop injecting failures
    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    /// Handle on the call counts
    pub fn stats(&self) -> DummyStats {
        self.stats.clone()
    }

    /// Current level of a pin, bypassing the device interface
    pub fn value(&self, pin: u32) -> Option<PinValue> {
        self.pins.get(pin as usize).map(|p| p.value)
    }

    /// Current descriptor of a pin, bypassing the device interface
    pub fn descriptor(&self, pin: u32) -> Option<&PinDescriptor> {
        self.pins.get(pin as usize).map(|p| &p.desc)
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check(&self, op: DummyOp) -> Result<()> {
        if self.closed {
            return Err(Error::controller(
                op.call_name(),
                io::Error::new(io::ErrorKind::NotConnected, "device is closed"),
            ));
        }
        if self.failures.contains(&op) {
            return Err(Error::controller(
                op.call_name(),
                io::Error::other("injected failure"),
            ));
        }
        Ok(())
    }

    fn pin_mut(&mut self, op: DummyOp, pin: u32) -> Result<&mut DummyPin> {
        self.check(op).map_err(|e| with_pin(e, pin))?;
        self.pins.get_mut(pin as usize).ok_or_else(|| {
            Error::device(
                op.call_name(),
                pin,
                io::Error::new(io::ErrorKind::InvalidInput, "no such pin"),
            )
        })
    }
}

fn with_pin(err: Error, pin: u32) -> Error {
    match err {
        Error::Device { op, source, .. } => Error::device(op, pin, source),
        other => other,
    }
}

fn invalid(op: DummyOp, pin: u32, msg: &str) -> Error {
    Error::device(
        op.call_name(),
        pin,
        io::Error::new(io::ErrorKind::InvalidInput, msg.to_string()),
    )
}

/// Reject flag combinations the kernel refuses
fn check_flags(caps: PinFlags, flags: PinFlags) -> std::result::Result<(), &'static str> {
    if !caps.contains(flags) {
        return Err("flags not supported by pin");
    }
    let exclusive = [
        PinFlags::INPUT | PinFlags::OUTPUT,
        PinFlags::OPENDRAIN | PinFlags::PUSHPULL,
        PinFlags::PULLUP | PinFlags::PULLDOWN,
        PinFlags::PRESET_LOW | PinFlags::PRESET_HIGH,
    ];
    if exclusive.iter().any(|pair| flags.contains(*pair)) {
        return Err("conflicting flags");
    }
    Ok(())
}

impl GpioDevice for DummyGpio {
    fn max_pin(&mut self) -> Result<u32> {
        self.check(DummyOp::MaxPin)?;
        match self.pins.len() {
            0 => Err(Error::controller(
                DummyOp::MaxPin.call_name(),
                io::Error::new(io::ErrorKind::NotFound, "controller has no pins"),
            )),
            n => Ok(n as u32 - 1),
        }
    }

    fn pin_config(&mut self, pin: u32) -> Result<RawPinConfig> {
        let stats = self.stats.clone();
        let desc = self.pin_mut(DummyOp::PinConfig, pin)?.desc.clone();
        stats.bump(|c| c.pin_config += 1);
        codec::encode(&desc)
    }

    fn pin_list(&mut self) -> Result<Vec<RawPinConfig>> {
        self.stats.bump(|c| c.pin_list += 1);
        let max_pin = self.max_pin()?;
        (0..=max_pin).map(|pin| self.pin_config(pin)).collect()
    }

    fn get(&mut self, pin: u32) -> Result<PinValue> {
        Ok(self.pin_mut(DummyOp::Get, pin)?.value)
    }

    fn set(&mut self, pin: u32, value: PinValue) -> Result<()> {
        self.pin_mut(DummyOp::Set, pin)?.value = value;
        self.stats.bump(|c| c.writes += 1);
        Ok(())
    }

    fn toggle(&mut self, pin: u32) -> Result<()> {
        let p = self.pin_mut(DummyOp::Toggle, pin)?;
        p.value = p.value.inverted();
        self.stats.bump(|c| c.writes += 1);
        Ok(())
    }

    fn set_name(&mut self, pin: u32, name: &str) -> Result<()> {
        if codec::validate_name(name).is_err() {
            return Err(invalid(DummyOp::SetName, pin, "invalid name"));
        }
        let p = self.pin_mut(DummyOp::SetName, pin)?;
        p.desc = p.desc.with_name(name);
        self.stats.bump(|c| c.set_name += 1);
        Ok(())
    }

    fn set_flags(&mut self, pin: u32, flags: PinFlags) -> Result<()> {
        let p = self.pin_mut(DummyOp::SetFlags, pin)?;
        if let Err(msg) = check_flags(p.desc.caps, flags) {
            return Err(invalid(DummyOp::SetFlags, pin, msg));
        }
        let mut applied = flags;
        if !flags.intersects(DIRECTION) {
            applied |= p.desc.flags & DIRECTION;
        }
        log::trace!("dummy: pin {} flags {:?} -> {:?}", pin, p.desc.flags, applied);
        p.desc = p.desc.with_flags(applied);
        self.stats.bump(|c| c.set_flags += 1);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.stats.bump(|c| c.close += 1);
        }
        Ok(())
    }
}

/// Parse dummy controller options from a list of key-value pairs
///
/// # Supported Options
///
/// - `pins=N` - Number of emulated pins (default 8)
/// - `prefix=NAME` - Pin name prefix (default `gpio_`)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "pins" => {
                let pins: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid pins value: {}", value))?;
                if pins == 0 {
                    return Err("Dummy controller needs at least one pin".to_string());
                }
                config.num_pins = pins;
            }
            "prefix" => {
                config.name_prefix = value.to_string();
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

/// Create a dummy controller and return a boxed GpioDevice
///
/// This is a convenience function for use in the CLI backend dispatch.
pub fn open_dummy(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn GpioDevice>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    log::info!("dummy: Emulating {} pins", config.num_pins);
    Ok(Box::new(DummyGpio::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpioc_core::{GpioController, PinId, PinMode};

    fn led_controller() -> GpioController<DummyGpio> {
        let device = DummyGpio::with_pins(vec![
            PinDescriptor::new(0, "led0", PinFlags::OUTPUT, PinFlags::OUTPUT),
            PinDescriptor::new(1, "button", PinFlags::INPUT | PinFlags::PULLUP, PinFlags::INPUT),
            PinDescriptor::new(2, "gpio_2", DEFAULT_CAPS, PinFlags::OUTPUT),
        ]);
        GpioController::new(device).unwrap()
    }

    #[test]
    fn test_led_scenario() {
        let mut gpio = led_controller();
        assert_eq!(gpio.resolve("led0").unwrap(), 0);

        gpio.write(0, 1).unwrap();
        assert_eq!(gpio.read(0).unwrap(), PinValue::High);

        gpio.rename(0, "led_red").unwrap();
        assert_eq!(gpio.resolve("led_red").unwrap(), 0);
        assert!(matches!(
            gpio.resolve("led0"),
            Err(Error::PinNotFound { .. })
        ));
        assert_eq!(gpio.device().unwrap().descriptor(0).unwrap().name, "led_red");
    }

    #[test]
    fn test_lookup_by_index_and_name() {
        let gpio = GpioController::new(DummyGpio::new_default()).unwrap();
        for pin in gpio.pins().unwrap() {
            assert_eq!(gpio.resolve(pin.index).unwrap(), pin.index);
            assert_eq!(gpio.resolve(pin.name.as_str()).unwrap(), pin.index);
            assert_eq!(gpio.pin(pin.name.as_str()).unwrap(), pin);
        }
        assert_eq!(gpio.max_pin().unwrap(), 7);
        assert!(matches!(gpio.resolve(8), Err(Error::PinNotFound { .. })));
    }

    #[test]
    fn test_enumerates_once() {
        let device = DummyGpio::new_default();
        let stats = device.stats();
        let mut gpio = GpioController::new(device).unwrap();

        gpio.refresh(3).unwrap();
        gpio.refresh_all().unwrap();
        gpio.set_output("gpio_1").unwrap();

        assert_eq!(stats.counts().pin_list, 1);
    }

    #[test]
    fn test_write_then_read() {
        let mut gpio = led_controller();
        for value in [1, 0, 0, 1] {
            gpio.write("gpio_2", value).unwrap();
            assert_eq!(gpio.read("gpio_2").unwrap().as_u32(), value);
        }
        gpio.set_low(2).unwrap();
        assert_eq!(gpio.read(2).unwrap(), PinValue::Low);
        gpio.set_high(2).unwrap();
        assert_eq!(gpio.read(2).unwrap(), PinValue::High);
    }

    #[test]
    fn test_invalid_value_leaves_device_unchanged() {
        let mut gpio = led_controller();
        gpio.write(0, 1).unwrap();
        let writes = gpio.device().unwrap().stats().counts().writes;

        assert!(matches!(gpio.write(0, 2), Err(Error::InvalidPinValue(2))));
        assert_eq!(gpio.device().unwrap().value(0), Some(PinValue::High));
        assert_eq!(gpio.device().unwrap().stats().counts().writes, writes);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut gpio = led_controller();
        for pin in gpio.pins().unwrap().into_iter().filter(|p| p.is_output()) {
            let original = gpio.read(pin.index).unwrap();
            gpio.toggle(pin.index).unwrap();
            assert_eq!(gpio.read(pin.index).unwrap(), original.inverted());
            gpio.toggle(pin.name.as_str()).unwrap();
            assert_eq!(gpio.read(pin.index).unwrap(), original);
        }
    }

    #[test]
    fn test_rename_conflict() {
        let mut gpio = led_controller();
        let before = gpio.pins().unwrap();
        let renames = gpio.device().unwrap().stats().counts().set_name;

        let err = gpio.rename("led0", "button").unwrap_err();
        assert!(matches!(err, Error::NameConflict { pin: 1, .. }));
        assert_eq!(gpio.pins().unwrap(), before);
        // Rejected before reaching the device
        assert_eq!(gpio.device().unwrap().stats().counts().set_name, renames);
    }

    #[test]
    fn test_rename_to_current_name() {
        let mut gpio = led_controller();
        let renames = gpio.device().unwrap().stats().counts().set_name;

        assert!(matches!(
            gpio.rename(0, "led0"),
            Err(Error::NameConflict { pin: 0, .. })
        ));
        assert_eq!(gpio.resolve("led0").unwrap(), 0);
        assert_eq!(gpio.device().unwrap().stats().counts().set_name, renames);
    }

    #[test]
    fn test_rename_keeps_count_and_uniqueness() {
        let mut gpio = GpioController::new(DummyGpio::new_default()).unwrap();
        gpio.rename(5, "X").unwrap();

        let pins = gpio.pins().unwrap();
        assert_eq!(pins.len(), 8);
        assert_eq!(gpio.resolve("X").unwrap(), 5);
        assert!(gpio.resolve("gpio_5").is_err());
        let mut names: Vec<_> = pins.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn test_rename_too_long() {
        let mut gpio = led_controller();
        let name = "n".repeat(64);
        assert!(matches!(
            gpio.rename(0, &name),
            Err(Error::NameTooLong { .. })
        ));
        assert_eq!(gpio.device().unwrap().descriptor(0).unwrap().name, "led0");
    }

    #[test]
    fn test_rename_device_failure_keeps_registry() {
        let mut gpio = led_controller();
        gpio.device_mut().unwrap().fail_on(DummyOp::SetName);

        assert!(matches!(
            gpio.rename(0, "led_red"),
            Err(Error::Device { pin: Some(0), .. })
        ));
        assert_eq!(gpio.resolve("led0").unwrap(), 0);
        assert!(gpio.resolve("led_red").is_err());

        gpio.device_mut().unwrap().clear_failures();
        gpio.rename(0, "led_red").unwrap();
        assert_eq!(gpio.resolve("led_red").unwrap(), 0);
    }

    #[test]
    fn test_set_flags_updates_only_flags() {
        let mut gpio = led_controller();
        gpio.set_flags("gpio_2", PinFlags::OUTPUT | PinFlags::PULLUP)
            .unwrap();

        let pin = gpio.pin(2).unwrap();
        assert_eq!(pin.name, "gpio_2");
        assert_eq!(pin.caps, DEFAULT_CAPS);
        assert_eq!(pin.flags, PinFlags::OUTPUT | PinFlags::PULLUP);
    }

    #[test]
    fn test_set_flags_rejected_by_device() {
        let mut gpio = led_controller();
        // led0 cannot be an input
        assert!(matches!(
            gpio.set_flags(0, PinFlags::INPUT),
            Err(Error::Device { .. })
        ));
        assert_eq!(gpio.pin(0).unwrap().flags, PinFlags::OUTPUT);
    }

    #[test]
    fn test_mode_change_refreshes_full_descriptor() {
        let mut gpio = led_controller();
        let stats = gpio.device().unwrap().stats();
        let fetches = stats.counts().pin_config;

        // The device keeps the output direction when only a pull is selected
        let pin = gpio.set_pullup(2).unwrap();
        assert_eq!(pin.flags, PinFlags::OUTPUT | PinFlags::PULLUP);
        assert_eq!(gpio.pin(2).unwrap(), pin);
        assert!(stats.counts().pin_config > fetches);

        let pin = gpio.set_input("gpio_2").unwrap();
        assert_eq!(pin.flags, PinFlags::INPUT);
    }

    #[test]
    fn test_every_mode_helper() {
        let mut gpio = led_controller();
        for mode in PinMode::ALL {
            let pin = match mode {
                PinMode::Input => gpio.set_input(2),
                PinMode::Output => gpio.set_output(2),
                PinMode::OpenDrain => gpio.set_opendrain(2),
                PinMode::PushPull => gpio.set_pushpull(2),
                PinMode::Tristate => gpio.set_tristate(2),
                PinMode::PullUp => gpio.set_pullup(2),
                PinMode::PullDown => gpio.set_pulldown(2),
                PinMode::InvertInput => gpio.set_invert_input(2),
                PinMode::InvertOutput => gpio.set_invert_output(2),
                PinMode::Pulsate => gpio.set_pulsate(2),
            }
            .unwrap();
            assert!(pin.flags.contains(mode.flag()), "{}", mode);
            assert_eq!(gpio.pin(2).unwrap(), pin);
        }
    }

    #[test]
    fn test_mode_change_failure() {
        let mut gpio = led_controller();
        assert!(matches!(
            gpio.set_pulldown("button"),
            Err(Error::Device { pin: Some(1), .. })
        ));
        assert_eq!(gpio.pin("button").unwrap().flags, PinFlags::INPUT);
    }

    #[test]
    fn test_refresh_picks_up_external_change() {
        let mut gpio = led_controller();
        gpio.device_mut()
            .unwrap()
            .set_name(2, "relay")
            .unwrap();
        // Stale until refreshed
        assert_eq!(gpio.resolve("gpio_2").unwrap(), 2);

        let pin = gpio.refresh(2).unwrap();
        assert_eq!(pin.name, "relay");
        assert_eq!(gpio.resolve("relay").unwrap(), 2);
        assert!(gpio.resolve("gpio_2").is_err());
    }

    #[test]
    fn test_refresh_failure() {
        let mut gpio = led_controller();
        gpio.device_mut().unwrap().fail_on(DummyOp::PinConfig);
        assert!(matches!(
            gpio.refresh(1),
            Err(Error::Device {
                op: "gpio_pin_config",
                pin: Some(1),
                ..
            })
        ));
        assert_eq!(gpio.pin(1).unwrap().name, "button");
    }

    #[test]
    fn test_refresh_all_matches_refresh() {
        let mut gpio = GpioController::new(DummyGpio::new_default()).unwrap();
        gpio.device_mut()
            .unwrap()
            .set_flags(4, PinFlags::OUTPUT)
            .unwrap();

        let all = gpio.refresh_all().unwrap();
        assert_eq!(all.len(), 8);
        for pin in &all {
            assert_eq!(&gpio.refresh(pin.index).unwrap(), pin);
        }
        assert_eq!(all[4].flags, PinFlags::OUTPUT);
    }

    #[test]
    fn test_refresh_all_handles_swapped_names() {
        let mut gpio = led_controller();
        {
            let device = gpio.device_mut().unwrap();
            device.set_name(0, "tmp").unwrap();
            device.set_name(1, "led0").unwrap();
            device.set_name(0, "button").unwrap();
        }

        gpio.refresh_all().unwrap();
        assert_eq!(gpio.resolve("led0").unwrap(), 1);
        assert_eq!(gpio.resolve("button").unwrap(), 0);
    }

    #[test]
    fn test_mode_helper_after_external_name_swap() {
        let mut gpio = led_controller();
        {
            let device = gpio.device_mut().unwrap();
            device.set_name(0, "tmp").unwrap();
            device.set_name(1, "led0").unwrap();
            device.set_name(0, "button").unwrap();
        }

        let pin = gpio.set_pullup(1).unwrap();
        assert_eq!(pin.name, "led0");
        assert_eq!(pin.flags, PinFlags::INPUT | PinFlags::PULLUP);
        assert_eq!(gpio.pin(1).unwrap(), pin);
        assert_eq!(
            gpio.device().unwrap().descriptor(1).unwrap().flags,
            pin.flags
        );
        assert_eq!(gpio.resolve("led0").unwrap(), 1);
        assert_eq!(gpio.resolve("button").unwrap(), 0);
    }

    #[test]
    fn test_refresh_after_external_name_swap() {
        let mut gpio = led_controller();
        {
            let device = gpio.device_mut().unwrap();
            device.set_name(2, "spare").unwrap();
            device.set_name(0, "gpio_2").unwrap();
        }

        let pin = gpio.refresh(0).unwrap();
        assert_eq!(pin.name, "gpio_2");
        assert_eq!(gpio.resolve("gpio_2").unwrap(), 0);
        assert_eq!(gpio.resolve("spare").unwrap(), 2);
        assert!(gpio.resolve("led0").is_err());
    }

    #[test]
    fn test_refresh_all_failure_keeps_registry() {
        let mut gpio = led_controller();
        let before = gpio.pins().unwrap();
        gpio.device_mut().unwrap().fail_on(DummyOp::PinConfig);

        assert!(gpio.refresh_all().is_err());
        assert_eq!(gpio.pins().unwrap(), before);
    }

    #[test]
    fn test_snapshot_isolation() {
        let mut gpio = led_controller();
        let snapshot = gpio.pins().unwrap();
        gpio.rename(0, "led_red").unwrap();
        gpio.set_pullup(1).unwrap();
        assert_eq!(snapshot[0].name, "led0");
        assert_eq!(snapshot[1].flags, PinFlags::INPUT);
        assert_eq!(
            gpio.pin(1).unwrap().flags,
            PinFlags::INPUT | PinFlags::PULLUP
        );
    }

    #[test]
    fn test_closed_controller_rejects_operations() {
        let device = DummyGpio::new_default();
        let stats = device.stats();
        let mut gpio = GpioController::new(device).unwrap();

        gpio.close().unwrap();
        assert!(!gpio.is_open());
        assert!(matches!(gpio.read(0), Err(Error::ControllerClosed)));
        assert!(matches!(gpio.write(0, 1), Err(Error::ControllerClosed)));
        assert!(matches!(gpio.write(0, 5), Err(Error::ControllerClosed)));
        assert!(matches!(gpio.toggle(0), Err(Error::ControllerClosed)));
        assert!(matches!(
            gpio.rename(0, "x"),
            Err(Error::ControllerClosed)
        ));
        assert!(matches!(gpio.refresh(0), Err(Error::ControllerClosed)));
        assert!(matches!(gpio.refresh_all(), Err(Error::ControllerClosed)));
        assert!(matches!(gpio.set_output(0), Err(Error::ControllerClosed)));
        assert!(matches!(gpio.pins(), Err(Error::ControllerClosed)));
        assert!(matches!(
            gpio.resolve(PinId::Index(0)),
            Err(Error::ControllerClosed)
        ));

        // Double close is a no-op
        gpio.close().unwrap();
        drop(gpio);
        assert_eq!(stats.counts().close, 1);
    }

    #[test]
    fn test_device_rejects_calls_after_close() {
        let mut device = DummyGpio::new(DummyConfig::default().with_pins(2));
        device.close().unwrap();
        device.close().unwrap();
        assert!(device.is_closed());
        assert_eq!(device.stats().counts().close, 1);
        assert!(device.get(0).is_err());
    }

    #[test]
    fn test_drop_closes_device() {
        let device = DummyGpio::new_default();
        let stats = device.stats();
        drop(GpioController::new(device).unwrap());
        assert_eq!(stats.counts().close, 1);
    }

    #[test]
    fn test_failed_open_releases_device() {
        let mut device = DummyGpio::new_default();
        device.fail_on(DummyOp::PinConfig);
        let stats = device.stats();

        assert!(GpioController::new(device).is_err());
        assert_eq!(stats.counts().close, 1);
    }

    #[test]
    fn test_duplicate_names_rejected_on_open() {
        let device = DummyGpio::with_pins(vec![
            PinDescriptor::new(0, "same", DEFAULT_CAPS, PinFlags::INPUT),
            PinDescriptor::new(1, "same", DEFAULT_CAPS, PinFlags::INPUT),
        ]);
        assert!(matches!(
            GpioController::new(device),
            Err(Error::InvalidEnumeration(_))
        ));
    }

    #[test]
    fn test_boxed_device() {
        let device: Box<dyn GpioDevice> = Box::new(DummyGpio::new_default());
        let mut gpio = GpioController::new(device).unwrap();
        gpio.set_output(0).unwrap();
        gpio.write(0, 1).unwrap();
        assert_eq!(gpio.read("gpio_0").unwrap(), PinValue::High);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("pins", "4"), ("prefix", "pin")]).unwrap();
        assert_eq!(config.num_pins, 4);
        let gpio = GpioController::new(DummyGpio::new(config)).unwrap();
        assert_eq!(gpio.resolve("pin3").unwrap(), 3);

        assert!(parse_options(&[("pins", "0")]).is_err());
        assert!(parse_options(&[("pins", "many")]).is_err());
    }
}
