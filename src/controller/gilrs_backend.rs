//! gilrs implementation of the device primitives
//!
//! gilrs reports named axes and buttons; the sampler works with indices laid
//! out like a classic joystick driver. Stick Y axes are negated because gilrs
//! reports "up" as positive while the axis mapping expects "down" positive.
//!
//! Many SDL mappings expose the analog triggers as `LeftTrigger2` and
//! `RightTrigger2` button data instead of `LeftZ`/`RightZ` axes. When the Z
//! axis is missing, axes 2 and 5 fall back to that button value rescaled from
//! `[0, 1]` to `[-1, 1]`, the range the trigger thresholds expect.

use super::backend::{DeviceId, DeviceInfo, InputBackend, SamplerError};
use super::input_sampler::{HatState, DPAD_HAT};
use gilrs::{Axis, Button, Event, EventType, Gamepad, Gilrs};
use tracing::{debug, error, info};

const AXIS_LAYOUT: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::LeftZ,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::RightZ,
];

const BUTTON_LAYOUT: [Button; 8] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
];

pub struct GilrsBackend {
    gilrs: Gilrs,
}

impl GilrsBackend {
    pub fn new() -> Result<Self, SamplerError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SamplerError::InitializationError(e.to_string()));
            }
        };
        Ok(Self { gilrs })
    }

    fn gamepad(&self, device: DeviceId) -> Option<Gamepad<'_>> {
        self.gilrs
            .gamepads()
            .find(|(id, gamepad)| usize::from(*id) == device.0 && gamepad.is_connected())
            .map(|(_, gamepad)| gamepad)
    }
}

/// Trigger position as an axis, from the Z axis or else the trigger button
fn trigger_value(gamepad: &Gamepad<'_>, axis: Axis, button: Button) -> Option<f32> {
    if let Some(data) = gamepad.axis_data(axis) {
        return Some(data.value());
    }
    gamepad
        .button_data(button)
        .map(|data| trigger_button_as_axis(data.value()))
}

/// Rescales a `[0, 1]` trigger button value into `[-1, 1]`
pub fn trigger_button_as_axis(value: f32) -> f32 {
    value.clamp(0.0, 1.0) * 2.0 - 1.0
}

impl InputBackend for GilrsBackend {
    fn poll(&mut self) -> Result<(), SamplerError> {
        // Draining events is what updates the cached gamepad state
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => debug!("gilrs reports gamepad {} connected", id),
                EventType::Disconnected => debug!("gilrs reports gamepad {} disconnected", id),
                _ => {}
            }
        }
        Ok(())
    }

    fn attached_devices(&self) -> Vec<DeviceId> {
        let mut devices: Vec<DeviceId> = self
            .gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, _)| DeviceId(usize::from(id)))
            .collect();
        devices.sort();
        devices
    }

    fn initialize(&mut self, device: DeviceId) -> Result<DeviceInfo, SamplerError> {
        let gamepad = self
            .gamepad(device)
            .ok_or(SamplerError::DeviceGone(device))?;
        info!(
            "Gamepad {}: Name: {}, UUID: {:?}, Power: {:?}",
            device,
            gamepad.name(),
            gamepad.uuid(),
            gamepad.power_info()
        );
        Ok(DeviceInfo {
            name: gamepad.name().to_string(),
        })
    }

    fn axis(&self, device: DeviceId, index: usize) -> Option<f32> {
        let axis = *AXIS_LAYOUT.get(index)?;
        let gamepad = self.gamepad(device)?;
        match axis {
            Axis::LeftStickY | Axis::RightStickY => Some(-gamepad.axis_data(axis)?.value()),
            Axis::LeftZ => trigger_value(&gamepad, axis, Button::LeftTrigger2),
            Axis::RightZ => trigger_value(&gamepad, axis, Button::RightTrigger2),
            _ => Some(gamepad.axis_data(axis)?.value()),
        }
    }

    fn button(&self, device: DeviceId, index: usize) -> Option<bool> {
        let button = *BUTTON_LAYOUT.get(index)?;
        Some(self.gamepad(device)?.is_pressed(button))
    }

    fn hat(&self, device: DeviceId, index: usize) -> Option<HatState> {
        if index != DPAD_HAT {
            return None;
        }
        let gamepad = self.gamepad(device)?;
        let pressed = |button| i8::from(gamepad.is_pressed(button));
        Some(HatState::new(
            pressed(Button::DPadRight) - pressed(Button::DPadLeft),
            pressed(Button::DPadUp) - pressed(Button::DPadDown),
        ))
    }
}
