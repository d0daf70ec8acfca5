//! gpioc - GPIO controller utility
//!
//! A gpioctl(8)-style tool for FreeBSD GPIO controllers.
//!
//! # Architecture
//!
//! The controller facade from `gpioc-core` owns one backend device and a pin
//! registry mirroring the controller's pin table, so every command can
//! address pins by number or by name:
//! - **fbsd** - `/dev/gpiocN` via the gpioc(4) ioctls
//! - **dummy** - In-memory emulation for dry runs and tests

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use gpioc_core::GpioController;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Commands::ListBackends = cli.command {
        backends::list_backends();
        return Ok(());
    }

    let device = backends::open_backend(&cli.device)?;
    let mut gpio = GpioController::new(device)?;
    log::debug!("Using {} ({} pins)", cli.device, gpio.pins()?.len());

    let result = match cli.command {
        Commands::List { caps } => commands::cmd_list(&mut gpio, caps),
        Commands::Get { pin } => commands::cmd_get(&mut gpio, &pin),
        Commands::Set { pin, value } => commands::cmd_set(&mut gpio, &pin, value),
        Commands::Toggle { pin } => commands::cmd_toggle(&mut gpio, &pin),
        Commands::Name { pin, name } => commands::cmd_name(&mut gpio, &pin, &name),
        Commands::Config { pin, flags } => commands::cmd_config(&mut gpio, &pin, flags.as_slice()),
        Commands::Mode { pin, mode } => commands::cmd_mode(&mut gpio, &pin, mode),
        Commands::ListBackends => Ok(()),
    };

    let closed = gpio.close();
    result?;
    closed?;
    Ok(())
}
