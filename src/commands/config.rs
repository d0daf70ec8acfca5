//! Pin configuration commands

use super::list::format_pin;
use super::{parse_pin, CmdResult, Controller};
use gpioc_core::{PinDescriptor, PinFlags, PinMode};

/// Combine gpioctl short flag names (`OUT`, `PU`, ...) into one flag set
pub fn parse_flags<S: AsRef<str>>(names: &[S]) -> Result<PinFlags, String> {
    names.iter().try_fold(PinFlags::empty(), |acc, name| {
        let name = name.as_ref();
        PinFlags::from_short_name(name)
            .map(|flag| acc | flag)
            .ok_or_else(|| format!("Unknown pin flag '{}'", name))
    })
}

fn show(gpio: &mut Controller, desc: &PinDescriptor) -> CmdResult {
    let value = gpio.read(desc.index)?;
    println!("{}", format_pin(desc, value, false));
    Ok(())
}

/// Replace a pin's flags and show the configuration the device applied
pub fn cmd_config<S: AsRef<str>>(gpio: &mut Controller, pin: &str, flags: &[S]) -> CmdResult {
    let flags = parse_flags(flags)?;
    let index = gpio.resolve(parse_pin(pin)?)?;

    gpio.set_flags(index, flags)?;
    let desc = gpio.refresh(index)?;
    if desc.flags != flags {
        log::warn!(
            "Pin {} flags are {:?} (requested {:?})",
            index,
            desc.flags,
            flags
        );
    }
    show(gpio, &desc)
}

/// Apply a single-flag mode and show the resulting configuration
pub fn cmd_mode(gpio: &mut Controller, pin: &str, mode: PinMode) -> CmdResult {
    let desc = gpio.set_mode(parse_pin(pin)?, mode)?;
    log::debug!("Pin {} now in {} mode", desc.index, mode);
    show(gpio, &desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        assert_eq!(
            parse_flags(&["OUT", "pu"]).unwrap(),
            PinFlags::OUTPUT | PinFlags::PULLUP
        );
        assert_eq!(parse_flags::<&str>(&[]).unwrap(), PinFlags::empty());
        assert!(parse_flags(&["OUT", "FAST"]).is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_config_and_mode() {
        let device = crate::backends::open_backend("dummy:pins=2").unwrap();
        let mut gpio = gpioc_core::GpioController::new(device).unwrap();

        cmd_config(&mut gpio, "1", &["OUT", "PU"]).unwrap();
        assert_eq!(gpio.pin(1).unwrap().flags, PinFlags::OUTPUT | PinFlags::PULLUP);

        cmd_mode(&mut gpio, "gpio_0", PinMode::Output).unwrap();
        assert!(gpio.pin(0).unwrap().is_output());

        assert!(cmd_config(&mut gpio, "0", &["BOGUS"]).is_err());
    }
}
