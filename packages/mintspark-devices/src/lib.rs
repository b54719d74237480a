//! Hardware abstractions for the mintspark tank robot.
//!
//! # Overview
//!
//! The robot is a micro:bit on a motor driver board with four motor outputs (`M1`–`M4`),
//! an inertial sensor on the I²C bus and an ultrasonic range finder. The vendor drivers for
//! those boards are not part of this crate. Instead each one is a trait that the platform
//! layer implements:
//!
//! - [`MotorDriver`](motor::MotorDriver): signed percentage speed and encoder angle per motor.
//! - [`InertialDriver`](imu::InertialDriver): bring-up, calibration and yaw readings.
//! - [`RangeFinderDriver`](range_finder::RangeFinderDriver): raw distance readings.
//!
//! On top of those seams this crate provides the wrappers that the drive controller
//! relies on: [`InertialSensor`](imu::InertialSensor) enforces the
//! initialize → calibrate → sample order, and [`Ultrasonic`](range_finder::Ultrasonic)
//! masks dropped readings with the last good one.
//!
//! With the `mock` feature, [`mock::SimRobot`] implements every driver trait against a
//! small simulated tank platform.

pub mod imu;
#[cfg(feature = "mock")]
pub mod mock;
pub mod motor;
pub mod range_finder;
