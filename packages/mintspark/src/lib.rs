//! # mintspark
//!
//! Gyro-assisted tank drive for the mintspark robot: a micro:bit on a four-output motor
//! driver board with an inertial sensor. mintspark provides a small async executor, the
//! hardware seams for the vendor drivers, and a drive controller that keeps the robot on a
//! straight line with a PID loop on the gyroscope's yaw.
//!
//! # Usage
//!
//! The platform layer implements [`MotorDriver`](devices::motor::MotorDriver) and
//! [`InertialDriver`](devices::imu::InertialDriver) for the real boards. With the `mock`
//! feature, [`SimRobot`](devices::mock::SimRobot) stands in for both:
//!
//! ```
//! use core::time::Duration;
//!
//! use mintspark::{devices::mock::SimRobot, prelude::*};
//!
//! let robot = SimRobot::new();
//! let mut drive = DriveController::new(robot.motors(), robot.inertial(), DriveConfig::default());
//!
//! mintspark::time::pause();
//! block_on(async move {
//!     let command = DriveCommand::with_unit(Direction::Forward, 30.0, 2.0, DriveUnit::Seconds)?;
//!     drive.gyro_drive(command).await?;
//!     drive
//!         .gyro_spot_turn(SpotTurn::new(TurnDirection::Right, 40.0, 90.0))
//!         .await?;
//!     Ok::<(), DriveError>(())
//! })
//! .unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Async runtime & executor.
#[cfg(feature = "async")]
pub mod runtime {
    #[doc(inline)]
    pub use mintspark_async::block_on;
}

#[doc(inline)]
#[cfg(feature = "async")]
pub use mintspark_async::{task, time};
#[doc(inline)]
#[cfg(feature = "devices")]
pub use mintspark_devices as devices;
#[doc(inline)]
#[cfg(feature = "drive")]
pub use mintspark_drive as drive;
#[doc(inline)]
#[cfg(feature = "math")]
pub use mintspark_math as math;

/// Commonly used features of mintspark.
///
/// This module is meant to be glob imported.
pub mod prelude {
    #[cfg(feature = "mock")]
    pub use crate::devices::mock::SimRobot;
    #[cfg(feature = "devices")]
    pub use crate::devices::{
        imu::{InertialDriver, InertialSensor, Orientation},
        motor::{Direction, MotorDriver, MotorId},
        range_finder::{DistanceUnit, RangeFinderDriver, Ultrasonic},
    };
    #[cfg(feature = "drive")]
    pub use crate::drive::{
        DriveCommand, DriveConfig, DriveController, DriveError, DriveOutcome, DriveState,
        DriveUnit, SpotTurn, StopCondition, TankBindings, TurnDirection,
    };
    #[cfg(feature = "math")]
    pub use crate::math::{pid::PidController, wheel::WheelGeometry};
    #[cfg(feature = "async")]
    pub use crate::{
        runtime::block_on,
        task::spawn,
        time::{sleep, sleep_until, Instant},
    };
}
