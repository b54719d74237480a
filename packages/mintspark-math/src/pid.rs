//! PID controllers.
//!
//! PID controllers are first created with [`PidController::new`], given a target with
//! [`PidController::set_setpoint`], and then utilized by calling [`PidController::compute`]
//! once per control tick.

use core::time::Duration;

use crate::angle;

/// Gains for a [`PidController`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PidGains {
    /// Proportional constant. This is multiplied by the error to get the
    /// proportional component of the output.
    pub kp: f64,
    /// Integral constant. This accounts for the past values of the error.
    pub ki: f64,
    /// Derivative constant. This allows you to change the output based on the
    /// rate of change of the error (predicting future values).
    pub kd: f64,
}

impl PidGains {
    /// Creates a new set of gains.
    #[must_use]
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

impl Default for PidGains {
    /// Gains that hold the heading of a small two-wheeled robot.
    fn default() -> Self {
        Self::new(5.0, 0.05, 0.5)
    }
}

/// A proportional–integral–derivative controller.
///
/// The controller keeps no limits of its own: the integral is never clamped and
/// the output is not saturated. Callers clamp the correction where it is applied.
///
/// # Examples
///
/// ```
/// use core::time::Duration;
/// use mintspark_math::pid::PidController;
///
/// let mut pid = PidController::new(2.0, 0.0, 0.0);
/// pid.set_setpoint(10.0);
///
/// assert_eq!(pid.compute(Duration::from_millis(10), 4.0), 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidController {
    gains: PidGains,
    setpoint: f64,
    integral: f64,
    previous_error: Option<f64>,
    continuous_period: Option<f64>,
}

impl PidController {
    /// Create a new PID controller with the given constants.
    #[must_use]
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::from_gains(PidGains::new(kp, ki, kd))
    }

    /// Create a new PID controller from a set of gains.
    #[must_use]
    pub const fn from_gains(gains: PidGains) -> Self {
        Self {
            gains,
            setpoint: 0.0,
            integral: 0.0,
            previous_error: None,
            continuous_period: None,
        }
    }

    /// Replaces the controller's gains. Accumulated state is kept.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.gains = PidGains::new(kp, ki, kd);
    }

    /// Returns the controller's gains.
    #[must_use]
    pub const fn gains(&self) -> PidGains {
        self.gains
    }

    /// Sets the value the controller tries to hold.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Returns the value the controller tries to hold.
    #[must_use]
    pub const fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Treats the input as circular with the given period (for example `360.0` for headings
    /// in degrees), so that the error is always taken along the shortest way around.
    pub fn enable_continuous_input(&mut self, period: f64) {
        self.continuous_period = Some(period);
    }

    /// Goes back to plain `setpoint - current` errors.
    pub fn disable_continuous_input(&mut self) {
        self.continuous_period = None;
    }

    /// Clears the accumulated integral and the remembered error.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
    }

    /// Returns the error the controller would see for `current`.
    #[must_use]
    pub fn error(&self, current: f64) -> f64 {
        match self.continuous_period {
            Some(period) => angle::wrap_signed(self.setpoint - current, period),
            None => self.setpoint - current,
        }
    }

    /// Runs one control step and returns the correction.
    ///
    /// `dt` is the time since the previous step. The derivative term is zero on the first
    /// step after construction or [`reset`](Self::reset), and whenever `dt` is zero.
    pub fn compute(&mut self, dt: Duration, current: f64) -> f64 {
        let dt = dt.as_secs_f64();
        let error = self.error(current);

        self.integral += error * dt;

        let derivative = match self.previous_error {
            Some(previous) if dt > 0.0 => (error - previous) / dt,
            _ => 0.0,
        };
        self.previous_error = Some(error);

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }
}
