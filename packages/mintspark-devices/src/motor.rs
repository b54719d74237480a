//! Motor driver board outputs.

use core::fmt;

/// The largest speed magnitude, in percent, that the board drives a motor at.
pub const MAX_SPEED: f64 = 100.0;

/// One of the four motor outputs on the driver board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorId {
    /// Motor output 1.
    M1,
    /// Motor output 2.
    M2,
    /// Motor output 3.
    M3,
    /// Motor output 4.
    M4,
}

impl MotorId {
    /// Every motor output on the board, in order.
    pub const ALL: [MotorId; 4] = [MotorId::M1, MotorId::M2, MotorId::M3, MotorId::M4];

    /// Zero-based index of this output.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::M1 => 0,
            Self::M2 => 1,
            Self::M3 => 2,
            Self::M4 => 3,
        }
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.index() + 1)
    }
}

/// Represents a possible direction that a motor can be configured as.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Motor rotates in the forward direction.
    Forward,

    /// Motor rotates in the reverse direction.
    Reverse,
}

impl Direction {
    /// Returns `true` if the level is [`Forward`](Direction::Forward).
    #[must_use]
    pub const fn is_forward(&self) -> bool {
        match self {
            Self::Forward => true,
            Self::Reverse => false,
        }
    }

    /// Returns `true` if the level is [`Reverse`](Direction::Reverse).
    #[must_use]
    pub const fn is_reverse(&self) -> bool {
        match self {
            Self::Forward => false,
            Self::Reverse => true,
        }
    }

    /// Applies this direction to a speed.
    #[must_use]
    pub fn apply(&self, speed: f64) -> f64 {
        match self {
            Self::Forward => speed,
            Self::Reverse => -speed,
        }
    }
}

impl core::ops::Not for Direction {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// The vendor motor driver.
///
/// Implementations forward straight to the board. Speeds are signed percentages; what the
/// board does with values outside `[-100, 100]` is up to its own policy.
pub trait MotorDriver {
    /// Sets the signed speed percentage of a motor output.
    fn set_speed(&mut self, motor: MotorId, speed: f64);

    /// Returns the number of degrees the motor's shaft has turned since its last reset.
    fn angle(&mut self, motor: MotorId) -> f64;

    /// Zeroes the motor's encoder.
    fn reset_angle(&mut self, motor: MotorId);

    /// Stops a motor.
    fn stop(&mut self, motor: MotorId) {
        self.set_speed(motor, 0.0);
    }

    /// Stops every motor output on the board.
    fn stop_all(&mut self) {
        for motor in MotorId::ALL {
            self.stop(motor);
        }
    }
}

impl<T: MotorDriver + ?Sized> MotorDriver for &mut T {
    fn set_speed(&mut self, motor: MotorId, speed: f64) {
        (**self).set_speed(motor, speed);
    }

    fn angle(&mut self, motor: MotorId) -> f64 {
        (**self).angle(motor)
    }

    fn reset_angle(&mut self, motor: MotorId) {
        (**self).reset_angle(motor);
    }
}
