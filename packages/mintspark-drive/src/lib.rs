//! Gyro-assisted tank drive for the mintspark robot.
//!
//! # Overview
//!
//! The robot drives on two wheels, one per side, each on its own motor output. This crate
//! keeps it on a straight line by reading the yaw from the inertial sensor every tick and
//! steering the two sides apart by a PID correction. It also turns on the spot until the
//! heading has changed by a given angle, and ramps the side speeds smoothly between targets.
//!
//! Everything goes through a [`DriveController`], which owns the hardware and guarantees that
//! only one command drives the wheels at a time:
//!
//! - [`DriveController::gyro_drive`] drives straight until a [`StopCondition`] is met.
//! - [`DriveController::gyro_drive_background`] drives straight in a background task until
//!   the next command or the configured time limit.
//! - [`DriveController::gyro_spot_turn`] spins until the heading has changed by an angle.
//! - [`DriveController::drive_tank`], [`DriveController::ramp_tank`] and
//!   [`DriveController::stop`] command the sides directly.
//!
//! Tuning, timing and motor bindings live in a [`DriveConfig`], which can be loaded from YAML.

pub mod cancel;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod tank;

pub use cancel::CancelToken;
pub use command::{DriveCommand, DriveUnit, SpotTurn, StopCondition, TurnDirection};
pub use config::{ConfigError, DriveConfig, YawErrorMode};
pub use controller::{DriveController, DriveState};
pub use error::{DriveError, DriveOutcome};
pub use tank::{DifferentialOutput, RampPlan, RampStep, TankBindings, TankDrive};
