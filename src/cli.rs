//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand};

/// Parse a pin value, accepting 0/1 and low/high
fn parse_pin_value(s: &str) -> Result<u32, String> {
    match s.to_ascii_lowercase().as_str() {
        "0" | "low" => Ok(0),
        "1" | "high" => Ok(1),
        _ => s
            .parse::<u32>()
            .map_err(|_| format!("Invalid pin value '{}': expected 0, 1, low or high", s)),
    }
}

/// Generate dynamic help text for the device argument
fn device_help() -> String {
    format!(
        "GPIO backend and options, e.g. fbsd:unit=0 [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "gpioc")]
#[command(author, version, about = "GPIO controller utility", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// GPIO controller to use
    #[arg(short, long, global = true, default_value = "fbsd:unit=0", help = device_help())]
    pub device: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all pins with their value and configuration
    List {
        /// Also show each pin's capabilities
        #[arg(short = 'c', long)]
        caps: bool,
    },

    /// Read the value of a pin
    Get {
        /// Pin number or name
        pin: String,
    },

    /// Drive a pin low (0) or high (1)
    Set {
        /// Pin number or name
        pin: String,

        /// Value to drive
        #[arg(value_parser = parse_pin_value)]
        value: u32,
    },

    /// Invert the value of a pin
    Toggle {
        /// Pin number or name
        pin: String,
    },

    /// Give a pin a new name
    Name {
        /// Pin number or name
        pin: String,

        /// New pin name (at most 63 bytes)
        name: String,
    },

    /// Replace a pin's configuration flags (e.g. `config 5 OUT PU`)
    Config {
        /// Pin number or name
        pin: String,

        /// Flag names: IN OUT OD PP TS PU PD II IO PULSE PRESET_LOW PRESET_HIGH
        #[arg(required = true)]
        flags: Vec<String>,
    },

    /// Put a pin in a single-flag mode and show the resulting configuration
    Mode {
        /// Pin number or name
        pin: String,

        /// input, output, opendrain, pushpull, tristate, pullup, pulldown,
        /// invin, invout or pulsate
        mode: gpioc_core::PinMode,
    },

    /// List available backends
    ListBackends,
}
