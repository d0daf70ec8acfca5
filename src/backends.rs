//! Backend registration and dispatch
//!
//! A backend is selected with a string of the form `name` or
//! `name:key1=value1,key2=value2`, for example `fbsd:unit=1` or
//! `dummy:pins=16`. Each backend crate parses its own options.

use gpioc_core::GpioDevice;
use thiserror::Error;

/// Errors from backend selection
#[derive(Debug, Error)]
pub enum BackendError {
    /// Option is not of the form key=value
    #[error("Invalid parameter format: '{0}' (expected key=value)")]
    InvalidParameter(String),

    /// No backend with this name is compiled in
    #[error("Unknown backend: {0} (available: {1})")]
    UnknownBackend(String, String),
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "fbsd")]
    backends.push(BackendInfo {
        name: "fbsd",
        aliases: &["gpioc", "freebsd"],
        description: "FreeBSD gpioc(4) controller (dev=/dev/gpiocN or unit=N)",
    });

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory GPIO controller emulator (pins=N,prefix=NAME)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let names: Vec<&str> = available_backends().iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Print every available backend
pub fn list_backends() {
    let backends = available_backends();
    if backends.is_empty() {
        println!("No backends available (recompile with backend features enabled)");
        return;
    }

    println!("Available backends:");
    for b in &backends {
        if b.aliases.is_empty() {
            println!("  {:8} - {}", b.name, b.description);
        } else {
            println!(
                "  {:8} - {} [aliases: {}]",
                b.name,
                b.description,
                b.aliases.join(", ")
            );
        }
    }
}

/// Parsed backend parameters
#[derive(Debug)]
pub struct BackendParams {
    /// Backend name as given
    pub name: String,
    /// Key-value options, in command-line order
    pub params: Vec<(String, String)>,
}

impl BackendParams {
    /// Borrow the options in the form the backend crates expect
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a backend string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_backend_params(s: &str) -> Result<BackendParams, BackendError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            let (key, value) = opt
                .split_once('=')
                .ok_or_else(|| BackendError::InvalidParameter(opt.to_string()))?;
            params.push((key.to_string(), value.to_string()));
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

/// Open the GPIO device named by a backend string
pub fn open_backend(backend: &str) -> Result<Box<dyn GpioDevice>, Box<dyn std::error::Error>> {
    let params = parse_backend_params(backend)?;
    log::debug!("Opening backend '{}' with {:?}", params.name, params.params);

    #[allow(unused_variables)]
    let options = params.options();

    match params.name.as_str() {
        #[cfg(feature = "fbsd")]
        "fbsd" | "gpioc" | "freebsd" => gpioc_fbsd::open_fbsd_gpio(&options),

        #[cfg(feature = "dummy")]
        "dummy" => gpioc_dummy::open_dummy(&options),

        _ => Err(BackendError::UnknownBackend(params.name.clone(), backend_names_short()).into()),
    }
}
