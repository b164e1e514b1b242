//! Translation of sampled physical input into the emulated controller's model.
//!
//! [`axis`] turns stick and trigger axes into coordinates and trigger buttons,
//! [`buttons`] turns physical buttons and the hat into logical buttons. Both
//! produce updates that the [`crate::state::StateApplier`] writes into the
//! controller state.

pub mod axis;
pub mod buttons;

pub use axis::{AxisMapper, AxisUpdate, StickCoordinate, StickMapper, TickHistory};
pub use buttons::ButtonMapper;
