//! Logical model of the emulated controller
//!
//! The [`ControllerState`] is owned by a session (see [`crate::session`]) and
//! mutated by the sync loop through the [`applier::StateApplier`]. It holds
//! the two stick coordinates and the set of asserted logical buttons.
//!
//! ```text
//! StickState (left)  ─┐
//! StickState (right) ─┼──► ControllerState ──► session.send()
//! ButtonSet          ─┘
//! ```

pub mod applier;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use applier::{ButtonUpdate, StateApplier};

/// Stick coordinates are 12 bit wide
pub const STICK_RESOLUTION: u16 = 0x1000;

/// Center of both stick axes
pub const STICK_CENTER: u16 = 2048;

// Errors raised when writing into the controller state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("Button {button} is not available on {controller}")]
    UnsupportedButton {
        button: LogicalButton,
        controller: ControllerType,
    },

    #[error("Stick value {0} out of range (max 4095)")]
    StickOutOfRange(u16),
}

/// Controller types the session can emulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerType {
    JoyconL,
    JoyconR,
    ProController,
}

impl ControllerType {
    /// Only the Pro Controller accepts two continuous sticks plus triggers,
    /// buttons and a D-pad at the same time.
    pub fn supports_analog_input(&self) -> bool {
        matches!(self, ControllerType::ProController)
    }

    /// Logical buttons exposed by this controller type
    pub fn available_buttons(&self) -> &'static [LogicalButton] {
        use LogicalButton::*;
        match self {
            ControllerType::ProController => &[
                Y, X, B, A, R, Zr, Minus, Plus, RStick, LStick, Home, Capture, Down, Up, Right,
                Left, L, Zl,
            ],
            ControllerType::JoyconR => &[Y, X, B, A, Sr, Sl, R, Zr, Plus, RStick, Home],
            ControllerType::JoyconL => &[
                Down, Up, Right, Left, Sr, Sl, L, Zl, Minus, LStick, Capture,
            ],
        }
    }

    pub fn has_button(&self, button: LogicalButton) -> bool {
        self.available_buttons().contains(&button)
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerType::JoyconL => write!(f, "JOYCON_L"),
            ControllerType::JoyconR => write!(f, "JOYCON_R"),
            ControllerType::ProController => write!(f, "PRO_CONTROLLER"),
        }
    }
}

/// Named inputs of the emulated controller, independent of the physical layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogicalButton {
    Y,
    X,
    B,
    A,
    R,
    Zr,
    Minus,
    Plus,
    RStick,
    LStick,
    Home,
    Capture,
    Down,
    Up,
    Right,
    Left,
    L,
    Zl,
    Sr,
    Sl,
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalButton::Y => "y",
            LogicalButton::X => "x",
            LogicalButton::B => "b",
            LogicalButton::A => "a",
            LogicalButton::R => "r",
            LogicalButton::Zr => "zr",
            LogicalButton::Minus => "minus",
            LogicalButton::Plus => "plus",
            LogicalButton::RStick => "r_stick",
            LogicalButton::LStick => "l_stick",
            LogicalButton::Home => "home",
            LogicalButton::Capture => "capture",
            LogicalButton::Down => "down",
            LogicalButton::Up => "up",
            LogicalButton::Right => "right",
            LogicalButton::Left => "left",
            LogicalButton::L => "l",
            LogicalButton::Zl => "zl",
            LogicalButton::Sr => "sr",
            LogicalButton::Sl => "sl",
        };
        write!(f, "{}", name)
    }
}

/// Set of currently asserted logical buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonSet {
    pressed: BTreeSet<LogicalButton>,
}

impl ButtonSet {
    pub fn is_pressed(&self, button: LogicalButton) -> bool {
        self.pressed.contains(&button)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogicalButton> {
        self.pressed.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    fn set(&mut self, button: LogicalButton, pressed: bool) {
        if pressed {
            self.pressed.insert(button);
        } else {
            self.pressed.remove(&button);
        }
    }
}

// Which stick of the emulated controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StickSide {
    Left,
    Right,
}

/// Position of one stick in the emulated controller's coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickState {
    h: u16,
    v: u16,
}

impl Default for StickState {
    fn default() -> Self {
        Self {
            h: STICK_CENTER,
            v: STICK_CENTER,
        }
    }
}

impl StickState {
    pub fn h(&self) -> u16 {
        self.h
    }

    pub fn v(&self) -> u16 {
        self.v
    }

    #[cfg(test)]
    pub fn set_h(&mut self, value: u16) -> Result<(), StateError> {
        self.h = check_stick_value(value)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn set_v(&mut self, value: u16) -> Result<(), StateError> {
        self.v = check_stick_value(value)?;
        Ok(())
    }

    /// Writes both axes, or neither when either value is out of range
    pub fn set(&mut self, h: u16, v: u16) -> Result<(), StateError> {
        let h = check_stick_value(h)?;
        let v = check_stick_value(v)?;
        self.h = h;
        self.v = v;
        Ok(())
    }

    #[cfg(test)]
    pub fn is_centered(&self) -> bool {
        self.h == STICK_CENTER && self.v == STICK_CENTER
    }
}

fn check_stick_value(value: u16) -> Result<u16, StateError> {
    if value < STICK_RESOLUTION {
        Ok(value)
    } else {
        Err(StateError::StickOutOfRange(value))
    }
}

/// Input state of the emulated controller for one connection session
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    controller: ControllerType,
    left_stick: StickState,
    right_stick: StickState,
    buttons: ButtonSet,
}

impl ControllerState {
    pub fn new(controller: ControllerType) -> Self {
        Self {
            controller,
            left_stick: StickState::default(),
            right_stick: StickState::default(),
            buttons: ButtonSet::default(),
        }
    }

    pub fn controller(&self) -> ControllerType {
        self.controller
    }

    pub fn stick(&self, side: StickSide) -> &StickState {
        match side {
            StickSide::Left => &self.left_stick,
            StickSide::Right => &self.right_stick,
        }
    }

    pub fn stick_mut(&mut self, side: StickSide) -> &mut StickState {
        match side {
            StickSide::Left => &mut self.left_stick,
            StickSide::Right => &mut self.right_stick,
        }
    }

    pub fn buttons(&self) -> &ButtonSet {
        &self.buttons
    }

    /// Asserts or releases one logical button. Idempotent.
    pub fn set_button(&mut self, button: LogicalButton, pressed: bool) -> Result<(), StateError> {
        if !self.controller.has_button(button) {
            return Err(StateError::UnsupportedButton {
                button,
                controller: self.controller,
            });
        }
        self.buttons.set(button, pressed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_centered_and_released() {
        let state = ControllerState::new(ControllerType::ProController);
        assert!(state.stick(StickSide::Left).is_centered());
        assert!(state.stick(StickSide::Right).is_centered());
        assert!(state.buttons().is_empty());
    }

    #[test]
    fn set_button_is_idempotent() {
        let mut state = ControllerState::new(ControllerType::ProController);
        state.set_button(LogicalButton::A, true).unwrap();
        state.set_button(LogicalButton::A, true).unwrap();
        assert_eq!(state.buttons().len(), 1);

        state.set_button(LogicalButton::A, false).unwrap();
        state.set_button(LogicalButton::A, false).unwrap();
        assert!(state.buttons().is_empty());
    }

    #[test]
    fn unknown_button_is_rejected() {
        let mut state = ControllerState::new(ControllerType::JoyconL);
        let err = state.set_button(LogicalButton::A, true).unwrap_err();
        assert_eq!(
            err,
            StateError::UnsupportedButton {
                button: LogicalButton::A,
                controller: ControllerType::JoyconL,
            }
        );
        assert!(state.buttons().is_empty());
    }

    #[test]
    fn pro_controller_has_no_side_buttons() {
        assert!(!ControllerType::ProController.has_button(LogicalButton::Sl));
        assert!(!ControllerType::ProController.has_button(LogicalButton::Sr));
        assert!(ControllerType::ProController.has_button(LogicalButton::Zl));
    }

    #[test]
    fn stick_rejects_values_outside_twelve_bits() {
        let mut stick = StickState::default();
        assert_eq!(
            stick.set_h(STICK_RESOLUTION),
            Err(StateError::StickOutOfRange(STICK_RESOLUTION))
        );
        assert_eq!(stick.h(), STICK_CENTER);
        stick.set_v(4095).unwrap();
        assert_eq!(stick.v(), 4095);
    }

    #[test]
    fn stick_write_is_all_or_nothing() {
        let mut stick = StickState::default();
        assert_eq!(
            stick.set(300, STICK_RESOLUTION),
            Err(StateError::StickOutOfRange(STICK_RESOLUTION))
        );
        assert!(stick.is_centered());

        stick.set(300, 3800).unwrap();
        assert_eq!((stick.h(), stick.v()), (300, 3800));
    }

    #[test]
    fn only_pro_controller_supports_analog_loop() {
        assert!(ControllerType::ProController.supports_analog_input());
        assert!(!ControllerType::JoyconL.supports_analog_input());
        assert!(!ControllerType::JoyconR.supports_analog_input());
    }
}
