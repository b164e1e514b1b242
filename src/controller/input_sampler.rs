//! Input sampler: one snapshot per attached device and tick
//!
//! Physical layout the sampler reads:
//!
//! ```text
//! axes     0 left stick x   1 left stick y   2 left trigger
//!          3 right stick x  4 right stick y  5 right trigger
//! buttons  0-7
//! hat      0 (x, y) with each component in {-1, 0, 1}
//! ```
//!
//! Indices a device does not report are sampled as `None` (axes) or released
//! (buttons, hat). A backend that cannot be polled yields no samples for the
//! tick instead of failing the loop.

use super::backend::{DeviceId, InputBackend};
use super::device_registry::{DeviceRegistry, HotplugDiff};
use tracing::{debug, warn};

pub const AXIS_COUNT: usize = 6;
pub const BUTTON_COUNT: usize = 8;

pub const LEFT_STICK_X: usize = 0;
pub const LEFT_STICK_Y: usize = 1;
pub const LEFT_TRIGGER: usize = 2;
pub const RIGHT_STICK_X: usize = 3;
pub const RIGHT_STICK_Y: usize = 4;
pub const RIGHT_TRIGGER: usize = 5;

pub const DPAD_HAT: usize = 0;

/// Two-axis hat switch value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HatState {
    pub x: i8,
    pub y: i8,
}

impl HatState {
    /// Normalizes both components to -1, 0 or 1
    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    #[cfg(test)]
    pub fn is_centered(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Raw input of one device for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSample {
    pub device: DeviceId,
    pub axes: [Option<f32>; AXIS_COUNT],
    pub buttons: [bool; BUTTON_COUNT],
    pub hat: HatState,
}

impl DeviceSample {
    /// A sample with nothing reported: no axes, nothing pressed, hat centered
    pub fn empty(device: DeviceId) -> Self {
        Self {
            device,
            axes: [None; AXIS_COUNT],
            buttons: [false; BUTTON_COUNT],
            hat: HatState::default(),
        }
    }

    pub fn raw_axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied().flatten()
    }

    /// Axis value with absent axes read as centered
    pub fn axis(&self, index: usize) -> f32 {
        self.raw_axis(index).unwrap_or(0.0)
    }
}

/// Polls the backend and samples every registered device
pub struct InputSampler {
    backend: Box<dyn InputBackend>,
    registry: DeviceRegistry,
    hotplug_events: u64,
}

impl InputSampler {
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self {
            backend,
            registry: DeviceRegistry::new(),
            hotplug_events: 0,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn hotplug_events(&self) -> u64 {
        self.hotplug_events
    }

    /// Samples all attached devices in enumeration order
    pub fn sample(&mut self) -> Vec<DeviceSample> {
        if let Err(e) = self.backend.poll() {
            warn!("Input backend could not be polled, no input this tick: {}", e);
            return Vec::new();
        }

        let diff: HotplugDiff = self.registry.refresh(self.backend.as_mut());
        self.hotplug_events += (diff.attached.len() + diff.detached.len()) as u64;

        self.registry
            .devices()
            .iter()
            .map(|device| self.sample_device(device.id))
            .collect()
    }

    fn sample_device(&self, device: DeviceId) -> DeviceSample {
        let backend = self.backend.as_ref();
        let mut sample = DeviceSample::empty(device);

        for (index, axis) in sample.axes.iter_mut().enumerate() {
            *axis = backend.axis(device, index);
        }
        for (index, button) in sample.buttons.iter_mut().enumerate() {
            *button = backend.button(device, index).unwrap_or(false);
        }
        sample.hat = backend.hat(device, DPAD_HAT).unwrap_or_default();

        debug!("Sampled device {}: {:?}", device, sample);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBackend, MockDevice};

    #[test]
    fn zero_devices_yield_no_samples() {
        let mut sampler = InputSampler::new(Box::new(MockBackend::new()));
        assert!(sampler.sample().is_empty());
    }

    #[test]
    fn samples_carry_axes_buttons_and_hat() {
        let backend = MockBackend::new();
        let handle = backend.handle();
        let mut device = MockDevice::named("pad");
        device.axes[LEFT_STICK_X] = 0.25;
        device.buttons[6] = true;
        device.hats[0] = HatState::new(0, -1);
        handle.attach(DeviceId(0), device);

        let mut sampler = InputSampler::new(Box::new(backend));
        let samples = sampler.sample();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].raw_axis(LEFT_STICK_X), Some(0.25));
        assert!(samples[0].buttons[6]);
        assert_eq!(samples[0].hat, HatState { x: 0, y: -1 });
    }

    #[test]
    fn missing_indices_degrade_to_defaults() {
        let backend = MockBackend::new();
        let handle = backend.handle();
        let mut device = MockDevice::named("tiny");
        device.axes.truncate(2);
        device.buttons.truncate(4);
        device.hats.clear();
        handle.attach(DeviceId(0), device);

        let mut sampler = InputSampler::new(Box::new(backend));
        let sample = &sampler.sample()[0];

        assert_eq!(sample.raw_axis(RIGHT_TRIGGER), None);
        assert_eq!(sample.axis(RIGHT_STICK_X), 0.0);
        assert!(!sample.buttons[7]);
        assert!(sample.hat.is_centered());
    }

    #[test]
    fn unreadable_device_reads_as_no_input() {
        let backend = MockBackend::new();
        let handle = backend.handle();
        let mut device = MockDevice::named("gone");
        device.buttons[0] = true;
        handle.attach(DeviceId(0), device);
        let mut sampler = InputSampler::new(Box::new(backend));
        sampler.sample();

        handle.update(DeviceId(0), |d| d.unreadable = true);
        let sample = &sampler.sample()[0];
        assert_eq!(*sample, DeviceSample::empty(DeviceId(0)));
    }

    #[test]
    fn poll_failure_skips_the_tick() {
        let backend = MockBackend::new();
        let handle = backend.handle();
        handle.attach(DeviceId(0), MockDevice::named("pad"));
        handle.set_poll_failure(true);

        let mut sampler = InputSampler::new(Box::new(backend));
        assert!(sampler.sample().is_empty());

        handle.set_poll_failure(false);
        assert_eq!(sampler.sample().len(), 1);
        assert_eq!(sampler.hotplug_events(), 1);
    }

    #[test]
    fn hat_components_are_normalized() {
        assert_eq!(HatState::new(5, -3), HatState { x: 1, y: -1 });
    }
}
