use super::{ControllerState, LogicalButton, StateError, StickSide};
use crate::mapping::axis::StickCoordinate;
use tracing::{debug, warn};

/// Assert or release request for one logical button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonUpdate {
    pub button: LogicalButton,
    pub pressed: bool,
}

impl ButtonUpdate {
    pub fn new(button: LogicalButton, pressed: bool) -> Self {
        Self { button, pressed }
    }
}

/// Writes mapped input into the controller state
///
/// Keeps counters so the sync loop can report how much of the input actually
/// reached the state.
#[derive(Debug, Clone, Default)]
pub struct StateApplier {
    stick_writes: u64,
    button_writes: u64,
    rejected: u64,
}

impl StateApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_stick(
        &mut self,
        state: &mut ControllerState,
        side: StickSide,
        coordinate: StickCoordinate,
    ) -> Result<(), StateError> {
        state.stick_mut(side).set(coordinate.h, coordinate.v)?;
        self.stick_writes += 1;
        debug!(
            "Applied {:?} stick ({}, {})",
            side, coordinate.h, coordinate.v
        );
        Ok(())
    }

    /// Applies every update; rejected ones are logged and skipped.
    pub fn apply_buttons(&mut self, state: &mut ControllerState, updates: &[ButtonUpdate]) {
        for update in updates {
            match state.set_button(update.button, update.pressed) {
                Ok(()) => self.button_writes += 1,
                Err(e) => {
                    self.rejected += 1;
                    warn!("Dropping button update: {}", e);
                }
            }
        }
    }

    pub fn stick_writes(&self) -> u64 {
        self.stick_writes
    }

    pub fn button_writes(&self) -> u64 {
        self.button_writes
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}
