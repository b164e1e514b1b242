//! Button and hat mapping
//!
//! Physical buttons 0-7 map onto the emulated controller by position:
//!
//! ```text
//! index   0  1  2  3  4  5  6      7
//! button  B  A  Y  X  L  R  Minus  Plus
//! ```
//!
//! The hat switch is split into four independent D-pad buttons. Every tick
//! asserts or releases all of them; there is no change detection here.

use crate::controller::input_sampler::{DeviceSample, HatState, BUTTON_COUNT};
use crate::state::{ButtonUpdate, LogicalButton};

pub const BUTTON_LAYOUT: [LogicalButton; BUTTON_COUNT] = [
    LogicalButton::B,
    LogicalButton::A,
    LogicalButton::Y,
    LogicalButton::X,
    LogicalButton::L,
    LogicalButton::R,
    LogicalButton::Minus,
    LogicalButton::Plus,
];

/// Decomposes a hat value into right, left, up and down
pub fn decompose_hat(hat: HatState) -> [ButtonUpdate; 4] {
    [
        ButtonUpdate::new(LogicalButton::Right, hat.x == 1),
        ButtonUpdate::new(LogicalButton::Left, hat.x == -1),
        ButtonUpdate::new(LogicalButton::Up, hat.y == 1),
        ButtonUpdate::new(LogicalButton::Down, hat.y == -1),
    ]
}

/// Stateless mapper from physical buttons and hat to logical buttons
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonMapper;

impl ButtonMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map(&self, sample: &DeviceSample) -> Vec<ButtonUpdate> {
        let mut updates: Vec<ButtonUpdate> = BUTTON_LAYOUT
            .iter()
            .zip(sample.buttons.iter())
            .map(|(button, pressed)| ButtonUpdate::new(*button, *pressed))
            .collect();
        updates.extend(decompose_hat(sample.hat));
        updates
    }
}
