//! Controllable devices and scenes.
//!
//! The catalog is built once at startup from static configuration. The
//! only thing that ever changes is each device's `is_active` flag, which
//! records the last command we sent - nothing on the network confirms it.

use heapless::Vec;

use crate::config::{MAX_DEVICES, MAX_SCENES};

/// Static description of a device: display name plus control topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceSpec {
    pub name: &'static str,
    pub control_topic: &'static str,
}

impl DeviceSpec {
    pub const fn new(name: &'static str, control_topic: &'static str) -> Self {
        Self {
            name,
            control_topic,
        }
    }
}

/// A controllable device with its optimistic on/off state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Device {
    pub name: &'static str,
    pub control_topic: &'static str,
    /// Last commanded state, for UI feedback only.
    pub is_active: bool,
}

/// A one-shot scene command. Stateless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scene {
    pub name: &'static str,
}

pub struct Catalog {
    devices: Vec<Device, MAX_DEVICES>,
    scenes: Vec<Scene, MAX_SCENES>,
}

impl Catalog {
    /// Build the catalog. Entries beyond the compile-time capacity are
    /// dropped with a warning.
    pub fn new(devices: &[DeviceSpec], scenes: &[&'static str]) -> Self {
        let mut catalog = Self {
            devices: Vec::new(),
            scenes: Vec::new(),
        };

        for spec in devices {
            let device = Device {
                name: spec.name,
                control_topic: spec.control_topic,
                is_active: false,
            };
            if catalog.devices.push(device).is_err() {
                warn!("Catalog: device list full, dropping {}", spec.name);
            }
        }

        for &name in scenes {
            if catalog.scenes.push(Scene { name }).is_err() {
                warn!("Catalog: scene list full, dropping {}", name);
            }
        }

        catalog
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn device(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Flip a device's flag and return the new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let device = self.devices.get_mut(index)?;
        device.is_active = !device.is_active;
        Some(device.is_active)
    }

    /// Mark every device inactive.
    pub fn deactivate_all(&mut self) {
        for device in self.devices.iter_mut() {
            device.is_active = false;
        }
    }
}

impl Default for Catalog {
    /// The stock catalog from `config`.
    fn default() -> Self {
        Self::new(&crate::config::DEVICES, &crate::config::SCENES)
    }
}
