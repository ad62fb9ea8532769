//! Conversions between raw register values and physical units.
//!
//! Only positions are converted. Torque, speed and voltage registers are exposed as raw values,
//! the factors below document how to interpret them.

use crate::protocol::RegisterValue;

/// Resolution of the position encoder.
pub const DEGREES_PER_STEP: f64 = 0.29;
/// Torque registers (max torque, torque limit, present load) are in 0.1 % of the stall torque.
pub const TORQUE_PERCENT_PER_STEP: f64 = 0.1;
/// Moving speed in joint mode.
pub const RPM_PER_SPEED_STEP: f64 = 0.111;
/// Voltage registers are in tenths of a volt.
pub const VOLTS_PER_STEP: f64 = 0.1;

/// Bit carrying the direction in present speed, present load and wheel mode moving speed.
const DIRECTION_BIT: RegisterValue = 1 << 10;

/// Converts a position to whole degrees, truncating toward zero.
pub fn angular_from_raw(raw: RegisterValue) -> i32 {
    (f64::from(raw) * DEGREES_PER_STEP) as i32
}

/// Converts whole degrees to a position, truncating toward zero.
///
/// The encoder only resolves 0.29°, so converting back does not always give the same angle:
///
/// ```rust
/// # use dynamixel_control::units::*;
/// assert_eq!(raw_from_angular(100), 344);
/// assert_eq!(angular_from_raw(344), 99);
/// ```
pub fn raw_from_angular(angle: i32) -> i32 {
    (f64::from(angle) / DEGREES_PER_STEP) as i32
}

/// Rotation direction of a signed magnitude register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Counter-clockwise, direction bit clear.
    Ccw,
    /// Clockwise, direction bit set.
    Cw,
}

/// Splits a speed or load value into its direction and its magnitude (`0..=1023`).
pub fn split_direction(raw: RegisterValue) -> (Direction, RegisterValue) {
    let direction = if raw & DIRECTION_BIT == 0 {
        Direction::Ccw
    } else {
        Direction::Cw
    };
    (direction, raw & (DIRECTION_BIT - 1))
}

/// Inverse of [`split_direction`]. The magnitude is clamped to `0..=1023`.
pub fn join_direction(direction: Direction, magnitude: RegisterValue) -> RegisterValue {
    let magnitude = magnitude.min(DIRECTION_BIT - 1);
    match direction {
        Direction::Ccw => magnitude,
        Direction::Cw => magnitude | DIRECTION_BIT,
    }
}
