//! Axis mapping from normalized physical axes to stick coordinates
//!
//! A raw axis value `r ∈ [-1, 1]` maps to `2048 ± r * 1792`. Values that land
//! strictly between 1950 and 2150 snap to the center. Updates are only
//! propagated when the mapped value moves to a different multiple of ten,
//! which keeps jittering sticks from flooding the sink.
//!
//! Triggers are not continuous on the emulated controller. They are plain
//! buttons asserted above a threshold. The two thresholds differ because the
//! trigger axes of the calibrated hardware rest at different positions.

use crate::controller::input_sampler::{
    DeviceSample, LEFT_STICK_X, LEFT_STICK_Y, LEFT_TRIGGER, RIGHT_STICK_X, RIGHT_STICK_Y,
    RIGHT_TRIGGER,
};
use crate::state::{ButtonUpdate, LogicalButton, StickSide};
use tracing::debug;

pub const AXIS_CENTER: f64 = 2048.0;
pub const AXIS_MAX_DEVIATION: f64 = 1792.0;

// Exclusive bounds of the dead zone band
pub const DEAD_ZONE_LOW: f64 = 1950.0;
pub const DEAD_ZONE_HIGH: f64 = 2150.0;

/// Mapped values are compared at this granularity for change detection
pub const CHANGE_GRANULARITY: f64 = 10.0;

pub const LEFT_TRIGGER_THRESHOLD: f32 = 0.2;
pub const RIGHT_TRIGGER_THRESHOLD: f32 = -0.2;

/// Direction of a physical axis
///
/// Physical vertical axes report "down" as positive, the emulated controller
/// treats "up" as positive, so vertical axes are inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrientation {
    Horizontal,
    Vertical,
}

impl AxisOrientation {
    fn sign(&self) -> f64 {
        match self {
            AxisOrientation::Horizontal => 1.0,
            AxisOrientation::Vertical => -1.0,
        }
    }
}

/// Mapped `(horizontal, vertical)` position of one stick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickCoordinate {
    pub h: u16,
    pub v: u16,
}

/// Maps a raw axis value into the coordinate space, before dead zone snapping.
///
/// Out-of-range input is clamped to `[-1, 1]` and NaN reads as centered, so the
/// result always lies in `[256, 3840]`.
pub fn map_axis(raw: f32, orientation: AxisOrientation) -> f64 {
    let raw = if raw.is_nan() {
        0.0
    } else {
        f64::from(raw.clamp(-1.0, 1.0))
    };
    AXIS_CENTER + orientation.sign() * raw * AXIS_MAX_DEVIATION
}

pub fn apply_dead_zone(mapped: f64) -> f64 {
    if mapped > DEAD_ZONE_LOW && mapped < DEAD_ZONE_HIGH {
        AXIS_CENTER
    } else {
        mapped
    }
}

// Truncates like an integer conversion; mapped values are always positive.
fn to_coordinate(mapped: f64) -> u16 {
    mapped as u16
}

fn round_for_change_detection(mapped: f64) -> i32 {
    ((mapped / CHANGE_GRANULARITY).round() * CHANGE_GRANULARITY) as i32
}

/// Previous rounded mapped value per axis of one stick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickHistory {
    h: Option<i32>,
    v: Option<i32>,
}

impl TickHistory {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.h.is_none() && self.v.is_none()
    }
}

/// Maps both axes of one stick and remembers what it last propagated
#[derive(Debug, Clone)]
pub struct StickMapper {
    side: StickSide,
    history: TickHistory,
}

impl StickMapper {
    pub fn new(side: StickSide) -> Self {
        Self {
            side,
            history: TickHistory::default(),
        }
    }

    #[cfg(test)]
    pub fn history(&self) -> &TickHistory {
        &self.history
    }

    /// Returns the new coordinate when either axis moved to a different
    /// multiple of ten, `None` otherwise.
    ///
    /// The history holds the value before dead zone snapping so a stick resting
    /// inside the band compares against its real position, not the center.
    pub fn map(&mut self, raw_h: f32, raw_v: f32) -> Option<StickCoordinate> {
        let mapped_h = map_axis(raw_h, AxisOrientation::Horizontal);
        let mapped_v = map_axis(raw_v, AxisOrientation::Vertical);
        let rounded_h = round_for_change_detection(mapped_h);
        let rounded_v = round_for_change_detection(mapped_v);

        if self.history.h == Some(rounded_h) && self.history.v == Some(rounded_v) {
            return None;
        }
        self.history.h = Some(rounded_h);
        self.history.v = Some(rounded_v);

        let coordinate = StickCoordinate {
            h: to_coordinate(apply_dead_zone(mapped_h)),
            v: to_coordinate(apply_dead_zone(mapped_v)),
        };
        debug!(
            "{:?} stick: raw ({:.4}, {:.4}) -> ({}, {})",
            self.side, raw_h, raw_v, coordinate.h, coordinate.v
        );
        Some(coordinate)
    }

    #[cfg(test)]
    pub fn reset(&mut self) {
        self.history = TickHistory::default();
    }
}

pub fn left_trigger_pressed(raw: f32) -> bool {
    raw >= LEFT_TRIGGER_THRESHOLD
}

pub fn right_trigger_pressed(raw: f32) -> bool {
    raw >= RIGHT_TRIGGER_THRESHOLD
}

/// Result of mapping the axes of one device for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct AxisUpdate {
    pub left_stick: Option<StickCoordinate>,
    pub right_stick: Option<StickCoordinate>,
    pub triggers: [ButtonUpdate; 2],
}

/// Axis mapper for both sticks and both triggers
///
/// The stick history is shared by all devices, so a second device only
/// propagates when it disagrees with what the first one wrote.
#[derive(Debug, Clone)]
pub struct AxisMapper {
    left: StickMapper,
    right: StickMapper,
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisMapper {
    pub fn new() -> Self {
        Self {
            left: StickMapper::new(StickSide::Left),
            right: StickMapper::new(StickSide::Right),
        }
    }

    pub fn map(&mut self, sample: &DeviceSample) -> AxisUpdate {
        let left_stick = self
            .left
            .map(sample.axis(LEFT_STICK_X), sample.axis(LEFT_STICK_Y));
        let right_stick = self
            .right
            .map(sample.axis(RIGHT_STICK_X), sample.axis(RIGHT_STICK_Y));

        // Absent trigger axes read as released, not as the resting value
        let zl = sample
            .raw_axis(LEFT_TRIGGER)
            .is_some_and(left_trigger_pressed);
        let zr = sample
            .raw_axis(RIGHT_TRIGGER)
            .is_some_and(right_trigger_pressed);

        AxisUpdate {
            left_stick,
            right_stick,
            triggers: [
                ButtonUpdate::new(LogicalButton::Zl, zl),
                ButtonUpdate::new(LogicalButton::Zr, zr),
            ],
        }
    }
}
