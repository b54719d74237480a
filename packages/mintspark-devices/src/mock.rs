//! Simulated hardware.
//!
//! [`SimRobot`] is a two-wheeled tank platform that answers to the driver traits of this
//! crate. Motors integrate their commanded speed into encoder angles, and the difference
//! between the left and right wheel speeds turns the robot, which the simulated inertial
//! sensor reports as yaw. Time comes from the [`mintspark_async`] clock, so pausing that
//! clock makes a simulation fully deterministic.
//!
//! Handles returned by [`SimRobot::motors`] and [`SimRobot::inertial`] share the same state as
//! the robot they came from, so a test can hand the drivers to a controller and still watch
//! what happens through the original [`SimRobot`].

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use mintspark_async::time::Instant;
use mintspark_math::angle::{wrap_signed, FULL_TURN};

use crate::{
    imu::{InertialDriver, Orientation},
    motor::{MotorDriver, MotorId, MAX_SPEED},
    range_finder::{DistanceUnit, RangeFinderDriver},
};

/// A speed written to a simulated motor output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    /// The output that was written.
    pub motor: MotorId,
    /// The speed as it was sent, before the board's own clamping.
    pub speed: f64,
    /// When the command was sent.
    pub at: Instant,
}

#[derive(Debug)]
struct SimState {
    speeds: [f64; 4],
    angles: [f64; 4],
    yaw: f64,
    drift: f64,
    calibrated_heading: f64,
    wrap_yaw: bool,
    left: MotorId,
    right: MotorId,
    wheel_rate: f64,
    turn_rate: f64,
    inertial_present: bool,
    inertial_inits: usize,
    commands: Vec<MotorCommand>,
    last_step: Instant,
}

impl SimState {
    /// Integrates wheel rotation and yaw up to the current instant.
    fn step(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_step).as_secs_f64();
        self.last_step = now;

        if dt == 0.0 {
            return;
        }

        for (angle, speed) in self.angles.iter_mut().zip(self.speeds) {
            *angle += speed / MAX_SPEED * self.wheel_rate * dt;
        }

        let spin = (self.speeds[self.left.index()] - self.speeds[self.right.index()])
            / (2.0 * MAX_SPEED);
        self.yaw += (spin * self.turn_rate + self.drift) * dt;
    }
}

/// A simulated tank robot.
#[derive(Debug, Clone)]
pub struct SimRobot(Rc<RefCell<SimState>>);

impl SimRobot {
    /// Wheel rotation at full speed, in degrees per second.
    pub const DEFAULT_WHEEL_RATE: f64 = 720.0;

    /// Yaw rate of a full-speed spin on the spot, in degrees per second.
    pub const DEFAULT_TURN_RATE: f64 = 180.0;

    /// Creates a robot driven by `M1` (left) and `M2` (right), standing still at yaw 0.
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SimState {
            speeds: [0.0; 4],
            angles: [0.0; 4],
            yaw: 0.0,
            drift: 0.0,
            calibrated_heading: 0.0,
            wrap_yaw: false,
            left: MotorId::M1,
            right: MotorId::M2,
            wheel_rate: Self::DEFAULT_WHEEL_RATE,
            turn_rate: Self::DEFAULT_TURN_RATE,
            inertial_present: true,
            inertial_inits: 0,
            commands: Vec::new(),
            last_step: Instant::now(),
        })))
    }

    /// Mounts the wheels on other motor outputs.
    #[must_use]
    pub fn with_drive_motors(self, left: MotorId, right: MotorId) -> Self {
        {
            let mut state = self.0.borrow_mut();
            state.left = left;
            state.right = right;
        }
        self
    }

    /// Adds a constant disturbance that turns the robot by `degrees_per_second`.
    #[must_use]
    pub fn with_drift(self, degrees_per_second: f64) -> Self {
        self.0.borrow_mut().drift = degrees_per_second;
        self
    }

    /// Makes calibration zero the yaw to `heading` instead of 0.
    #[must_use]
    pub fn with_calibrated_heading(self, heading: f64) -> Self {
        self.0.borrow_mut().calibrated_heading = heading;
        self
    }

    /// Makes the inertial sensor report yaw wrapped into `[-180, 180)`, like the real part.
    ///
    /// [`SimRobot::yaw`] keeps reporting the unwrapped heading.
    #[must_use]
    pub fn with_wrapped_yaw(self) -> Self {
        self.0.borrow_mut().wrap_yaw = true;
        self
    }

    /// Unplugs the inertial sensor.
    #[must_use]
    pub fn without_inertial_sensor(self) -> Self {
        self.0.borrow_mut().inertial_present = false;
        self
    }

    /// Returns a motor driver for this robot.
    #[must_use]
    pub fn motors(&self) -> SimMotors {
        SimMotors(self.clone())
    }

    /// Returns an inertial sensor driver for this robot.
    #[must_use]
    pub fn inertial(&self) -> SimInertial {
        SimInertial(self.clone())
    }

    /// Every motor command sent so far.
    #[must_use]
    pub fn commands(&self) -> Vec<MotorCommand> {
        self.0.borrow().commands.clone()
    }

    /// Every motor command sent to `motor` so far.
    #[must_use]
    pub fn commands_for(&self, motor: MotorId) -> Vec<MotorCommand> {
        self.0
            .borrow()
            .commands
            .iter()
            .filter(|command| command.motor == motor)
            .copied()
            .collect()
    }

    /// The speed a motor is currently running at.
    #[must_use]
    pub fn speed(&self, motor: MotorId) -> f64 {
        self.0.borrow().speeds[motor.index()]
    }

    /// The robot's true yaw.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        let mut state = self.0.borrow_mut();
        state.step();
        state.yaw
    }

    /// Turns the robot to `yaw` instantly.
    pub fn set_yaw(&self, yaw: f64) {
        let mut state = self.0.borrow_mut();
        state.step();
        state.yaw = yaw;
    }

    /// How many times the inertial sensor was brought up.
    #[must_use]
    pub fn inertial_init_count(&self) -> usize {
        self.0.borrow().inertial_inits
    }
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new()
    }
}

/// The motor driver board of a [`SimRobot`].
#[derive(Debug, Clone)]
pub struct SimMotors(SimRobot);

impl MotorDriver for SimMotors {
    fn set_speed(&mut self, motor: MotorId, speed: f64) {
        let mut state = self.0 .0.borrow_mut();
        state.step();
        state.speeds[motor.index()] = speed.clamp(-MAX_SPEED, MAX_SPEED);
        state.commands.push(MotorCommand {
            motor,
            speed,
            at: Instant::now(),
        });
    }

    fn angle(&mut self, motor: MotorId) -> f64 {
        let mut state = self.0 .0.borrow_mut();
        state.step();
        state.angles[motor.index()]
    }

    fn reset_angle(&mut self, motor: MotorId) {
        let mut state = self.0 .0.borrow_mut();
        state.step();
        state.angles[motor.index()] = 0.0;
    }
}

/// The inertial sensor of a [`SimRobot`].
#[derive(Debug, Clone)]
pub struct SimInertial(SimRobot);

impl InertialDriver for SimInertial {
    fn init(&mut self) -> bool {
        let mut state = self.0 .0.borrow_mut();
        state.inertial_inits += 1;
        state.inertial_present
    }

    fn calibrate(&mut self, _window: core::time::Duration) {
        let mut state = self.0 .0.borrow_mut();
        state.step();
        state.yaw = state.calibrated_heading;
    }

    fn update(&mut self) -> Orientation {
        let mut state = self.0 .0.borrow_mut();
        state.step();
        if state.wrap_yaw {
            Orientation::from_yaw(wrap_signed(state.yaw, FULL_TURN))
        } else {
            Orientation::from_yaw(state.yaw)
        }
    }
}

/// A range finder that plays back a fixed list of readings, then reports no echo.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRangeFinder {
    readings: VecDeque<f64>,
}

impl ScriptedRangeFinder {
    /// Creates a range finder that returns `readings` in order.
    pub fn new(readings: impl IntoIterator<Item = f64>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }
}

impl RangeFinderDriver for ScriptedRangeFinder {
    fn read_distance(&mut self, _unit: DistanceUnit) -> f64 {
        self.readings.pop_front().unwrap_or(0.0)
    }
}
