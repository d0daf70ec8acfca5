//! List command implementation

use super::{CmdResult, Controller};
use gpioc_core::{PinDescriptor, PinFlags, PinValue};

/// Format flags the way gpioctl does: `<IN,PU>`
pub fn format_flags(flags: PinFlags) -> String {
    format!("<{}>", flags.short_names().join(","))
}

/// Format one pin line: `pin 03:\t1\tled0<OUT>[, caps:<...>]`
pub fn format_pin(desc: &PinDescriptor, value: PinValue, with_caps: bool) -> String {
    let mut line = format!(
        "pin {:02}:\t{}\t{}{}",
        desc.index,
        value,
        desc.name,
        format_flags(desc.flags)
    );
    if with_caps {
        line.push_str(", caps:");
        line.push_str(&format_flags(desc.caps));
    }
    line
}

/// List every pin with its current value
///
/// Descriptors are re-read from the device first so changes made by other
/// processes show up.
pub fn cmd_list(gpio: &mut Controller, with_caps: bool) -> CmdResult {
    let pins = gpio.refresh_all()?;
    log::debug!("Listing {} pins", pins.len());

    for desc in &pins {
        let value = gpio.read(desc.index)?;
        println!("{}", format_pin(desc, value, with_caps));
    }
    Ok(())
}
