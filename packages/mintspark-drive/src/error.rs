//! Drive errors and outcomes.

use mintspark_devices::imu::InertialError;
use snafu::Snafu;

/// How a drive command that started moving came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveOutcome {
    /// The stopping condition was met.
    Completed,
    /// A newer command preempted this one.
    Cancelled,
}

/// Errors that can occur when commanding the drivetrain.
#[derive(Debug, Snafu, Clone, Copy, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum DriveError {
    /// A speed was not a number.
    #[snafu(display("Speed {speed} is not a valid drive speed."))]
    InvalidSpeed {
        /// The rejected speed.
        speed: f64,
    },

    /// A stopping condition was negative or not finite.
    #[snafu(display("Stopping condition {value} must be a finite, non-negative amount."))]
    InvalidCondition {
        /// The rejected amount.
        value: f64,
    },

    /// A spot turn angle was not a positive, finite number of degrees.
    #[snafu(display("Turn angle {angle} must be a positive, finite number of degrees."))]
    InvalidAngle {
        /// The rejected angle.
        angle: f64,
    },

    /// Generic inertial sensor failure.
    #[snafu(display("{source}"), context(false))]
    Inertial {
        /// The source of the error.
        source: InertialError,
    },
}
