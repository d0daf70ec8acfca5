//! Single-pin commands: get, set, toggle, name

use super::{parse_pin, CmdResult, Controller};

/// Print the value of a pin
pub fn cmd_get(gpio: &mut Controller, pin: &str) -> CmdResult {
    let value = gpio.read(parse_pin(pin)?)?;
    println!("{}", value);
    Ok(())
}

/// Drive a pin to 0 or 1
pub fn cmd_set(gpio: &mut Controller, pin: &str, value: u32) -> CmdResult {
    let pin = parse_pin(pin)?;
    gpio.write(&pin, value)?;
    log::info!("Pin {} set to {}", pin, value);
    Ok(())
}

/// Invert a pin and print its new value
pub fn cmd_toggle(gpio: &mut Controller, pin: &str) -> CmdResult {
    let pin = parse_pin(pin)?;
    gpio.toggle(&pin)?;
    let value = gpio.read(&pin)?;
    log::info!("Pin {} toggled", pin);
    println!("{}", value);
    Ok(())
}

/// Rename a pin
pub fn cmd_name(gpio: &mut Controller, pin: &str, name: &str) -> CmdResult {
    let pin = parse_pin(pin)?;
    let index = gpio.resolve(&pin)?;
    gpio.rename(index, name)?;
    log::info!("Pin {} renamed to '{}'", index, name);
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use gpioc_core::{GpioController, PinValue};

    fn dummy() -> Controller {
        let device = crate::backends::open_backend("dummy:pins=4").unwrap();
        GpioController::new(device).unwrap()
    }

    #[test]
    fn test_set_and_toggle() {
        let mut gpio = dummy();
        cmd_set(&mut gpio, "gpio_1", 1).unwrap();
        assert_eq!(gpio.read(1).unwrap(), PinValue::High);

        cmd_toggle(&mut gpio, "1").unwrap();
        assert_eq!(gpio.read(1).unwrap(), PinValue::Low);

        assert!(cmd_set(&mut gpio, "1", 2).is_err());
        assert!(cmd_get(&mut gpio, "gpio_9").is_err());
        assert!(cmd_get(&mut gpio, "").is_err());
    }

    #[test]
    fn test_name() {
        let mut gpio = dummy();
        cmd_name(&mut gpio, "0", "led0").unwrap();
        assert_eq!(gpio.resolve("led0").unwrap(), 0);
        assert!(cmd_name(&mut gpio, "1", "led0").is_err());
    }
}
