use super::backend::{DeviceId, DeviceInfo, InputBackend};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDevice {
    pub id: DeviceId,
    pub info: DeviceInfo,
}

/// Devices that appeared or disappeared since the previous refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotplugDiff {
    pub attached: Vec<DeviceId>,
    pub detached: Vec<DeviceId>,
}

impl HotplugDiff {
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// Initialised devices, kept in backend enumeration order
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<RegisteredDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn devices(&self) -> &[RegisteredDevice] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.iter().any(|d| d.id == id)
    }

    /// Re-enumerates the backend, initialises new devices and drops vanished ones.
    ///
    /// A device whose initialisation fails is left out and retried on the next
    /// refresh.
    pub fn refresh(&mut self, backend: &mut dyn InputBackend) -> HotplugDiff {
        let current = backend.attached_devices();
        let mut diff = HotplugDiff::default();

        for device in &self.devices {
            if !current.contains(&device.id) {
                info!("Device {} ({}) detached", device.id, device.info.name);
                diff.detached.push(device.id);
            }
        }

        let mut previous = std::mem::take(&mut self.devices);
        for id in current {
            if let Some(pos) = previous.iter().position(|d| d.id == id) {
                self.devices.push(previous.swap_remove(pos));
                continue;
            }

            match backend.initialize(id) {
                Ok(info) => {
                    info!("Device {} attached: {}", id, info.name);
                    self.devices.push(RegisteredDevice { id, info });
                    diff.attached.push(id);
                }
                Err(e) => {
                    warn!("Failed to initialize device {}: {}", id, e);
                }
            }
        }

        if !diff.is_empty() {
            debug!("Registry now holds {} device(s)", self.devices.len());
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBackend, MockDevice};

    #[test]
    fn new_devices_are_initialized_once() {
        let mut backend = MockBackend::new();
        let handle = backend.handle();
        handle.attach(DeviceId(0), MockDevice::named("pad"));
        let mut registry = DeviceRegistry::new();

        let diff = registry.refresh(&mut backend);
        assert_eq!(diff.attached, vec![DeviceId(0)]);
        registry.refresh(&mut backend);

        assert_eq!(handle.initialize_calls(DeviceId(0)), 1);
        assert_eq!(registry.devices()[0].info.name, "pad");
    }

    #[test]
    fn hotplug_diff_reports_attach_and_detach() {
        let mut backend = MockBackend::new();
        let handle = backend.handle();
        handle.attach(DeviceId(0), MockDevice::named("first"));
        let mut registry = DeviceRegistry::new();
        registry.refresh(&mut backend);

        handle.detach(DeviceId(0));
        handle.attach(DeviceId(1), MockDevice::named("second"));
        let diff = registry.refresh(&mut backend);

        assert_eq!(diff.attached, vec![DeviceId(1)]);
        assert_eq!(diff.detached, vec![DeviceId(0)]);
        assert!(registry.contains(DeviceId(1)));
        assert!(!registry.contains(DeviceId(0)));
    }

    #[test]
    fn failed_initialization_is_retried() {
        let mut backend = MockBackend::new();
        let handle = backend.handle();
        let mut device = MockDevice::named("flaky");
        device.fail_initialization = true;
        handle.attach(DeviceId(2), device);
        let mut registry = DeviceRegistry::new();

        assert!(registry.refresh(&mut backend).is_empty());
        assert!(registry.is_empty());

        handle.update(DeviceId(2), |d| d.fail_initialization = false);
        let diff = registry.refresh(&mut backend);
        assert_eq!(diff.attached, vec![DeviceId(2)]);
        assert_eq!(handle.initialize_calls(DeviceId(2)), 2);
    }

    #[test]
    fn registry_follows_enumeration_order() {
        let mut backend = MockBackend::new();
        let handle = backend.handle();
        handle.attach(DeviceId(5), MockDevice::named("late"));
        handle.attach(DeviceId(1), MockDevice::named("early"));
        let mut registry = DeviceRegistry::new();
        registry.refresh(&mut backend);

        let order: Vec<DeviceId> = registry.devices().iter().map(|d| d.id).collect();
        assert_eq!(order, vec![DeviceId(1), DeviceId(5)]);
    }
}
