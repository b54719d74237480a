//! Inertial Sensor (IMU)
//!
//! The inertial sensor reports the robot's yaw, the rotation about the vertical axis.
//! Clockwise rotations are positive.
//!
//! # Calibration
//!
//! The gyroscope has to be calibrated while the robot sits completely still. Readings drift
//! from reality if the robot moves during the calibration window. The sensor cannot check
//! this itself, so it is up to the caller to only calibrate a stationary robot.
//!
//! [`InertialSensor`] tracks where the sensor is in its bring-up and refuses to produce
//! samples before it has been initialized and calibrated.

use core::time::Duration;

use bitflags::bitflags;
use log::debug;
use mintspark_async::time::sleep;
use mintspark_math::angle::wrap_degrees;
use snafu::{ensure, Snafu};

/// A single yaw reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Signed yaw in degrees.
    pub yaw: f64,
    /// Yaw wrapped into `[0, 360)` degrees.
    pub yaw360: f64,
}

impl Orientation {
    /// Builds a reading from a signed yaw, deriving the wrapped heading.
    #[must_use]
    pub fn from_yaw(yaw: f64) -> Self {
        Self {
            yaw,
            yaw360: wrap_degrees(yaw),
        }
    }
}

/// The vendor inertial sensor driver.
pub trait InertialDriver {
    /// Brings the sensor up. Returns `false` if no sensor answers on the bus.
    fn init(&mut self) -> bool;

    /// Starts zeroing the gyroscope over the given window.
    fn calibrate(&mut self, window: Duration);

    /// Reads the latest orientation.
    fn update(&mut self) -> Orientation;
}

bitflags! {
    /// The bring-up state of an [`InertialSensor`].
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
    pub struct InertialStatus: u8 {
        /// The sensor answered on the bus.
        const INITIALIZED = 0b001;

        /// The sensor is inside its calibration window.
        const CALIBRATING = 0b010;

        /// The sensor finished at least one calibration.
        const CALIBRATED = 0b100;
    }
}

/// An inertial sensor used as the orientation source of a drive.
#[derive(Debug)]
pub struct InertialSensor<D> {
    driver: D,
    status: InertialStatus,
}

impl<D: InertialDriver> InertialSensor<D> {
    /// Wraps a driver. The sensor still has to be [initialized](Self::initialize) and
    /// [calibrated](Self::calibrate) before it produces samples.
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            status: InertialStatus::empty(),
        }
    }

    /// Returns the bring-up state of the sensor.
    #[must_use]
    pub const fn status(&self) -> InertialStatus {
        self.status
    }

    /// Brings the sensor up.
    ///
    /// Bring-up only happens once; later calls return `Ok(())` without touching the bus.
    ///
    /// # Errors
    ///
    /// - An [`InertialError::NotDetected`] error is returned if the sensor does not answer.
    pub fn initialize(&mut self) -> Result<(), InertialError> {
        if self.status.contains(InertialStatus::INITIALIZED) {
            return Ok(());
        }

        ensure!(self.driver.init(), NotDetectedSnafu);
        self.status.insert(InertialStatus::INITIALIZED);
        debug!("inertial sensor initialized");

        Ok(())
    }

    /// Starts a calibration window. The robot must stay still until
    /// [`finish_calibration`](Self::finish_calibration) is called `window` later.
    ///
    /// # Errors
    ///
    /// - An [`InertialError::NotInitialized`] error is returned if [`initialize`](Self::initialize)
    ///   has not succeeded yet.
    pub fn begin_calibration(&mut self, window: Duration) -> Result<(), InertialError> {
        ensure!(
            self.status.contains(InertialStatus::INITIALIZED),
            NotInitializedSnafu
        );

        self.driver.calibrate(window);
        self.status.insert(InertialStatus::CALIBRATING);

        Ok(())
    }

    /// Ends the calibration window started by [`begin_calibration`](Self::begin_calibration).
    pub fn finish_calibration(&mut self) {
        if self.status.contains(InertialStatus::CALIBRATING) {
            self.status.remove(InertialStatus::CALIBRATING);
            self.status.insert(InertialStatus::CALIBRATED);
            debug!("inertial sensor calibrated");
        }
    }

    /// Calibrates the sensor, resolving once the calibration window has passed.
    ///
    /// # Errors
    ///
    /// - An [`InertialError::NotInitialized`] error is returned if [`initialize`](Self::initialize)
    ///   has not succeeded yet.
    pub async fn calibrate(&mut self, window: Duration) -> Result<(), InertialError> {
        self.begin_calibration(window)?;
        sleep(window).await;
        self.finish_calibration();

        Ok(())
    }

    /// Returns the latest orientation reading.
    ///
    /// # Errors
    ///
    /// - An [`InertialError::NotInitialized`] error is returned if the sensor was never brought up.
    /// - An [`InertialError::StillCalibrating`] error is returned inside a calibration window.
    /// - An [`InertialError::NotCalibrated`] error is returned if the sensor was never calibrated.
    pub fn sample(&mut self) -> Result<Orientation, InertialError> {
        ensure!(
            self.status.contains(InertialStatus::INITIALIZED),
            NotInitializedSnafu
        );
        ensure!(
            !self.status.contains(InertialStatus::CALIBRATING),
            StillCalibratingSnafu
        );
        ensure!(
            self.status.contains(InertialStatus::CALIBRATED),
            NotCalibratedSnafu
        );

        Ok(self.driver.update())
    }
}

/// Errors that can occur when using an inertial sensor.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum InertialError {
    /// No inertial sensor answered during bring-up.
    #[snafu(display("No inertial sensor was detected on the bus."))]
    NotDetected,

    /// The sensor was used before it was initialized.
    #[snafu(display("The inertial sensor has not been initialized."))]
    NotInitialized,

    /// The sensor was read inside its calibration window.
    #[snafu(display("The inertial sensor is still calibrating."))]
    StillCalibrating,

    /// The sensor was read before it was ever calibrated.
    #[snafu(display("The inertial sensor has not been calibrated."))]
    NotCalibrated,
}
