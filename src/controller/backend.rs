//! Device primitives consumed from the input library
//!
//! The sampler only needs enumeration, one-time initialisation and indexed
//! readers. Readers return `None` when the device does not expose the index
//! or can no longer be queried; the sampler turns that into "not pressed" or
//! a centered axis for the current tick.

use super::input_sampler::HatState;
use std::fmt;

/// Stable identifier of an attached device, in backend enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What initialisation learned about a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
}

// Sampler errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Failed to initialize input backend: {0}")]
    InitializationError(String),

    #[error("Failed to query input devices: {0}")]
    QueryError(String),

    #[error("Device {0} is no longer attached")]
    DeviceGone(DeviceId),
}

/// Indexed access to physical input devices
pub trait InputBackend {
    /// Pumps pending backend events so enumeration and readers are current
    fn poll(&mut self) -> Result<(), SamplerError>;

    /// Attached devices in the order they should be processed
    fn attached_devices(&self) -> Vec<DeviceId>;

    /// One-time initialisation of a newly attached device
    fn initialize(&mut self, device: DeviceId) -> Result<DeviceInfo, SamplerError>;

    fn axis(&self, device: DeviceId, index: usize) -> Option<f32>;

    fn button(&self, device: DeviceId, index: usize) -> Option<bool>;

    fn hat(&self, device: DeviceId, index: usize) -> Option<HatState>;
}
