//! Controller subsystem for physical input sampling
//!
//! ```text
//! InputBackend ──► DeviceRegistry ──► InputSampler ──► DeviceSample (per device)
//! (gilrs)          (hot-plug diff)    (once per tick)
//! ```
//!
//! The sampler is synchronous; it never suspends the sync loop.

pub mod backend;
pub mod device_registry;
pub mod gilrs_backend;
pub mod input_sampler;

pub use backend::{DeviceId, DeviceInfo, InputBackend, SamplerError};
pub use device_registry::{DeviceRegistry, HotplugDiff, RegisteredDevice};
pub use gilrs_backend::GilrsBackend;
pub use input_sampler::{DeviceSample, HatState, InputSampler};
