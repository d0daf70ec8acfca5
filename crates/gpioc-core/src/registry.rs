//! Pin registry
//!
//! In-process mirror of a controller's pin table, addressable by pin number
//! and by pin name. The registry keeps two indexes:
//!
//! - `by_index`: dense vector of descriptors, slot `i` holds pin `i`
//! - `by_name`: name to pin number, derived from `by_index`
//!
//! Every change goes through [`PinRegistry::replace`], which updates both
//! indexes together. After any call returns, for every pin `i`:
//! `by_name[by_index[i].name] == i` and `by_name.len() == by_index.len()`.

use crate::codec;
use crate::error::{Error, Result};
use crate::pin::{PinDescriptor, PinFlags, PinId};
use std::collections::HashMap;

/// Dual-keyed pin table
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    by_index: Vec<PinDescriptor>,
    by_name: HashMap<String, u32>,
}

impl PinRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a full enumeration
    ///
    /// The descriptors must be dense and ordered (`pins[i].index == i`) with
    /// unique names. Nothing is built if any check fails.
    pub fn load(pins: impl IntoIterator<Item = PinDescriptor>) -> Result<Self> {
        let mut registry = Self::new();

        for desc in pins {
            let expected = registry.by_index.len() as u32;
            if desc.index != expected {
                return Err(Error::InvalidEnumeration(format!(
                    "expected pin {} but device reported pin {}",
                    expected, desc.index
                )));
            }
            if let Some(&other) = registry.by_name.get(&desc.name) {
                return Err(Error::InvalidEnumeration(format!(
                    "pins {} and {} are both named '{}'",
                    other, desc.index, desc.name
                )));
            }
            registry.by_name.insert(desc.name.clone(), desc.index);
            registry.by_index.push(desc);
        }

        log::debug!("Loaded {} pins into registry", registry.len());
        Ok(registry)
    }

    /// Number of pins
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Whether the registry holds no pins
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Highest pin number, or `None` when empty
    pub fn max_pin(&self) -> Option<u32> {
        self.by_index.len().checked_sub(1).map(|max| max as u32)
    }

    fn not_found(&self, pin: PinId) -> Error {
        Error::PinNotFound {
            pin,
            max_pin: self.max_pin().unwrap_or(0),
        }
    }

    /// Resolve a pin identifier to its pin number
    pub fn resolve(&self, id: &PinId) -> Result<u32> {
        match id {
            PinId::Index(index) if (*index as usize) < self.by_index.len() => Ok(*index),
            PinId::Index(_) => Err(self.not_found(id.clone())),
            PinId::Name(name) => self
                .by_name
                .get(name)
                .copied()
                .ok_or_else(|| self.not_found(id.clone())),
        }
    }

    /// Descriptor of pin `index`
    pub fn get(&self, index: u32) -> Result<&PinDescriptor> {
        self.by_index
            .get(index as usize)
            .ok_or_else(|| self.not_found(PinId::Index(index)))
    }

    /// Descriptor of the pin currently named `name`
    pub fn get_by_name(&self, name: &str) -> Option<&PinDescriptor> {
        self.by_name
            .get(name)
            .and_then(|&index| self.by_index.get(index as usize))
    }

    /// Owned copy of every descriptor, in pin order
    ///
    /// Later changes to the registry do not affect the returned list.
    pub fn list(&self) -> Vec<PinDescriptor> {
        self.by_index.clone()
    }

    /// Iterate over the descriptors in pin order
    pub fn iter(&self) -> impl Iterator<Item = &PinDescriptor> {
        self.by_index.iter()
    }

    /// Replace the descriptor of `desc.index`, returning the previous one
    ///
    /// Fails without changing anything if the pin does not exist or if the
    /// new name already belongs to a different pin.
    pub fn replace(&mut self, desc: PinDescriptor) -> Result<PinDescriptor> {
        let slot = desc.index as usize;
        if slot >= self.by_index.len() {
            return Err(self.not_found(PinId::Index(desc.index)));
        }
        if let Some(&owner) = self.by_name.get(&desc.name) {
            if owner != desc.index {
                return Err(Error::NameConflict {
                    name: desc.name,
                    pin: owner,
                });
            }
        }

        let old_name = &self.by_index[slot].name;
        if *old_name != desc.name {
            self.by_name.remove(old_name);
            self.by_name.insert(desc.name.clone(), desc.index);
        }
        let old = std::mem::replace(&mut self.by_index[slot], desc);

        debug_assert!(self.is_coherent());
        Ok(old)
    }

    /// Give pin `index` a new name
    ///
    /// Renaming a pin to its current name is a no-op.
    pub fn rename(&mut self, index: u32, new_name: &str) -> Result<()> {
        codec::validate_name(new_name)?;
        let current = self.get(index)?;
        if current.name == new_name {
            return Ok(());
        }
        let renamed = current.with_name(new_name);
        self.replace(renamed).map(|_| ())
    }

    /// Replace the cached configuration flags of pin `index`
    pub fn set_flags(&mut self, index: u32, flags: PinFlags) -> Result<()> {
        let updated = self.get(index)?.with_flags(flags);
        self.replace(updated).map(|_| ())
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.by_index.clear();
        self.by_name.clear();
    }

    /// Check both indexes against each other
    pub fn is_coherent(&self) -> bool {
        self.by_name.len() == self.by_index.len()
            && self.by_index.iter().enumerate().all(|(i, desc)| {
                desc.index as usize == i && self.by_name.get(&desc.name) == Some(&desc.index)
            })
    }
}
