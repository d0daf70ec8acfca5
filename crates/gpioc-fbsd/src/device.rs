//! FreeBSD GPIO controller device implementation
//!
//! This module provides the `FbsdGpio` struct that implements the
//! `GpioDevice` trait using the ioctls of FreeBSD's gpioc(4) driver.

use crate::error::{FbsdGpioError, Result};

use gpioc_core::codec::{RawPinConfig, RawPinRequest};
use gpioc_core::device::{pin_error, GpioDevice};
use gpioc_core::{Error as CoreError, PinFlags, PinValue, Result as CoreResult};

use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};

/// Device path prefix for GPIO controllers
pub const GPIOC_PATH_PREFIX: &str = "/dev/gpioc";

/// gpioc(4) ioctl definitions from `sys/gpio.h`
mod ioctl {
    use gpioc_core::codec::{RawPinConfig, RawPinRequest};
    use nix::{ioctl_read, ioctl_readwrite, ioctl_write_ptr};

    // GPIO ioctl magic number
    const GPIO_IOC_MAGIC: u8 = b'G';

    ioctl_read!(gpio_max_pin, GPIO_IOC_MAGIC, 0, libc::c_int);
    ioctl_readwrite!(gpio_get_config, GPIO_IOC_MAGIC, 1, RawPinConfig);
    ioctl_write_ptr!(gpio_set_config, GPIO_IOC_MAGIC, 2, RawPinConfig);
    ioctl_readwrite!(gpio_get, GPIO_IOC_MAGIC, 3, RawPinRequest);
    ioctl_write_ptr!(gpio_set, GPIO_IOC_MAGIC, 4, RawPinRequest);
    ioctl_readwrite!(gpio_toggle, GPIO_IOC_MAGIC, 5, RawPinRequest);
    ioctl_write_ptr!(gpio_set_name, GPIO_IOC_MAGIC, 6, RawPinConfig);
}

/// Configuration for opening a GPIO controller
#[derive(Debug, Clone, Default)]
pub struct FbsdGpioConfig {
    /// Device path (e.g., "/dev/gpioc0")
    pub device: String,
}

impl FbsdGpioConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Create a configuration for controller unit `n` (`/dev/gpiocN`)
    pub fn unit(n: u32) -> Self {
        Self::new(format!("{}{}", GPIOC_PATH_PREFIX, n))
    }
}

/// FreeBSD GPIO controller
///
/// Owns the open `/dev/gpiocN` descriptor. The descriptor is closed by
/// [`GpioDevice::close`] or, failing that, when the value is dropped.
#[derive(Debug)]
pub struct FbsdGpio {
    /// Open device, `None` after close
    file: Option<File>,
    /// Device path, for diagnostics
    path: String,
}

impl FbsdGpio {
    /// Open a GPIO controller with the given configuration
    pub fn open(config: &FbsdGpioConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(FbsdGpioError::NoDevice);
        }

        log::debug!("gpioc_fbsd: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| FbsdGpioError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        log::info!("gpioc_fbsd: Opened {}", config.device);

        Ok(Self {
            file: Some(file),
            path: config.device.clone(),
        })
    }

    /// Open a controller by device path
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(&FbsdGpioConfig::new(path))
    }

    /// Open controller unit `n` (`/dev/gpiocN`)
    pub fn open_unit(n: u32) -> Result<Self> {
        Self::open(&FbsdGpioConfig::unit(n))
    }

    /// Device path this controller was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    fn fd(&self, op: &'static str) -> CoreResult<RawFd> {
        self.file.as_ref().map(|f| f.as_raw_fd()).ok_or_else(|| {
            CoreError::controller(op, std::io::Error::from_raw_os_error(libc::EBADF))
        })
    }
}

fn os_error(e: nix::errno::Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e as i32)
}

impl GpioDevice for FbsdGpio {
    fn max_pin(&mut self) -> CoreResult<u32> {
        let fd = self.fd("gpio_max_pin")?;
        let mut max: libc::c_int = 0;
        unsafe {
            ioctl::gpio_max_pin(fd, &mut max)
                .map_err(|e| CoreError::controller("gpio_max_pin", os_error(e)))?;
        }
        u32::try_from(max).map_err(|_| {
            CoreError::InvalidEnumeration(format!("{} reported max pin {}", self.path, max))
        })
    }

    fn pin_config(&mut self, pin: u32) -> CoreResult<RawPinConfig> {
        let fd = self.fd("gpio_pin_config")?;
        let mut raw = RawPinConfig::for_pin(pin);
        unsafe {
            ioctl::gpio_get_config(fd, &mut raw)
                .map_err(os_error)
                .map_err(pin_error("gpio_pin_config", pin))?;
        }
        Ok(raw)
    }

    fn pin_list(&mut self) -> CoreResult<Vec<RawPinConfig>> {
        let max_pin = self.max_pin()?;
        log::debug!("gpioc_fbsd: {} has pins 0-{}", self.path, max_pin);
        (0..=max_pin).map(|pin| self.pin_config(pin)).collect()
    }

    fn get(&mut self, pin: u32) -> CoreResult<PinValue> {
        let fd = self.fd("gpio_pin_get")?;
        let mut req = RawPinRequest::for_pin(pin);
        unsafe {
            ioctl::gpio_get(fd, &mut req)
                .map_err(os_error)
                .map_err(pin_error("gpio_pin_get", pin))?;
        }
        Ok(req.level())
    }

    fn set(&mut self, pin: u32, value: PinValue) -> CoreResult<()> {
        let fd = self.fd("gpio_pin_set")?;
        let req = RawPinRequest::new(pin, value);
        unsafe {
            ioctl::gpio_set(fd, &req)
                .map_err(os_error)
                .map_err(pin_error("gpio_pin_set", pin))?;
        }
        Ok(())
    }

    fn toggle(&mut self, pin: u32) -> CoreResult<()> {
        let fd = self.fd("gpio_pin_toggle")?;
        let mut req = RawPinRequest::for_pin(pin);
        unsafe {
            ioctl::gpio_toggle(fd, &mut req)
                .map_err(os_error)
                .map_err(pin_error("gpio_pin_toggle", pin))?;
        }
        Ok(())
    }

    fn set_name(&mut self, pin: u32, name: &str) -> CoreResult<()> {
        let fd = self.fd("gpio_pin_set_name")?;
        let raw = RawPinConfig::with_name(pin, name)?;
        unsafe {
            ioctl::gpio_set_name(fd, &raw)
                .map_err(os_error)
                .map_err(pin_error("gpio_pin_set_name", pin))?;
        }
        Ok(())
    }

    fn set_flags(&mut self, pin: u32, flags: PinFlags) -> CoreResult<()> {
        let fd = self.fd("gpio_pin_set_flags")?;
        let raw = RawPinConfig::with_flags(pin, flags);
        unsafe {
            ioctl::gpio_set_config(fd, &raw)
                .map_err(os_error)
                .map_err(pin_error("gpio_pin_set_flags", pin))?;
        }
        Ok(())
    }

    fn close(&mut self) -> CoreResult<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        log::debug!("gpioc_fbsd: Closing {}", self.path);
        nix::unistd::close(file.into_raw_fd())
            .map_err(|e| CoreError::controller("close", os_error(e)))
    }
}

/// Parse controller options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiocN` - GPIO controller device path
/// - `unit=N` - GPIO controller number (alternative to dev)
///
/// With neither option, unit 0 is used.
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<FbsdGpioConfig, String> {
    let mut config = FbsdGpioConfig::default();
    let mut unit: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "unit" | "gpioc" => {
                unit = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid unit value: {}", value))?,
                );
            }
            _ => {
                log::warn!("gpioc_fbsd: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        config = FbsdGpioConfig::unit(unit.unwrap_or(0));
    } else if unit.is_some() {
        return Err("Only one of 'dev' or 'unit' can be specified".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("dev", "/dev/gpioc1")]).unwrap();
        assert_eq!(config.device, "/dev/gpioc1");

        let config = parse_options(&[("unit", "2")]).unwrap();
        assert_eq!(config.device, "/dev/gpioc2");

        let config = parse_options(&[]).unwrap();
        assert_eq!(config.device, "/dev/gpioc0");

        assert!(parse_options(&[("unit", "x")]).is_err());
        assert!(parse_options(&[("dev", "/dev/gpioc0"), ("unit", "1")]).is_err());
    }

    #[test]
    fn test_open_missing_device() {
        let err = FbsdGpio::open_path("/nonexistent/gpioc9").unwrap_err();
        assert!(matches!(err, FbsdGpioError::OpenFailed { .. }));

        let core: gpioc_core::Error = err.into();
        assert!(matches!(core, gpioc_core::Error::DeviceOpenFailed { .. }));

        assert!(matches!(
            FbsdGpio::open(&FbsdGpioConfig::default()),
            Err(FbsdGpioError::NoDevice)
        ));
    }
}
