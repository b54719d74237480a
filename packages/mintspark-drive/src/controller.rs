//! Gyro-assisted drive control.
//!
//! A [`DriveController`] owns the drivetrain and the inertial sensor of one robot. Straight
//! drives hold the heading captured right after calibration by steering with a PID
//! correction every tick. Spot turns spin open-loop and use the sensor only to decide when
//! the turn is complete.
//!
//! At most one command drives the wheels at a time. Every command first cancels the
//! background drive started by [`DriveController::gyro_drive_background`], if any, and waits
//! for it to stop the motors before touching the hardware itself.
//!
//! ```
//! use core::time::Duration;
//!
//! use mintspark_async::{block_on, time};
//! use mintspark_devices::{mock::SimRobot, motor::Direction};
//! use mintspark_drive::{DriveCommand, DriveConfig, DriveController, DriveOutcome, StopCondition};
//!
//! time::pause();
//! let robot = SimRobot::new();
//! let mut drive = DriveController::new(robot.motors(), robot.inertial(), DriveConfig::default());
//!
//! let outcome = block_on(async move {
//!     drive
//!         .gyro_drive(DriveCommand::new(
//!             Direction::Forward,
//!             30.0,
//!             StopCondition::Elapsed(Duration::from_secs(2)),
//!         ))
//!         .await
//! });
//! assert_eq!(outcome, Ok(DriveOutcome::Completed));
//! ```

use core::{cell::Cell, time::Duration};
use std::{cell::RefCell, rc::Rc};

use log::{debug, info, trace, warn};
use mintspark_async::{
    spawn,
    task::Task,
    time::{sleep, sleep_until, Instant},
};
use mintspark_devices::{
    imu::{InertialDriver, InertialSensor, Orientation},
    motor::{Direction, MotorDriver, MAX_SPEED},
};
use mintspark_math::{
    angle::{shortest_difference, FULL_TURN},
    pid::PidController,
};

use crate::{
    cancel::CancelToken,
    command::{checked_speed, Criterion, DriveCommand, SpotTurn},
    config::{DriveConfig, YawErrorMode},
    tank::{DifferentialOutput, TankBindings, TankDrive},
    DriveError, DriveOutcome,
};

/// Where the controller is in a gyro command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriveState {
    /// No gyro command is running.
    #[default]
    Idle,
    /// Bringing up the inertial sensor.
    Initializing,
    /// Waiting out the calibration window.
    Calibrating,
    /// Moving under gyro supervision.
    Driving,
    /// Bringing the wheels to a stop.
    Stopping,
}

struct Hardware<M, I> {
    tank: TankDrive<M>,
    imu: InertialSensor<I>,
}

struct Shared<M, I> {
    hardware: RefCell<Hardware<M, I>>,
    state: Cell<DriveState>,
    config: DriveConfig,
}

impl<M: MotorDriver, I: InertialDriver> Shared<M, I> {
    fn transition(&self, next: DriveState) {
        let previous = self.state.replace(next);
        if previous != next {
            debug!("drive state {previous:?} -> {next:?}");
        }
    }

    /// Stops the wheels and returns to idle.
    fn halt(&self) {
        if self.state.get() == DriveState::Driving {
            self.transition(DriveState::Stopping);
        }
        self.hardware.borrow_mut().tank.stop();
        self.transition(DriveState::Idle);
    }

    /// Brings up and calibrates the sensor, returning the first reading after calibration.
    ///
    /// Returns `None` if `token` is cancelled during the calibration window.
    async fn prepare(&self, token: &CancelToken) -> Result<Option<Orientation>, DriveError> {
        self.transition(DriveState::Initializing);
        self.hardware.borrow_mut().imu.initialize()?;

        self.transition(DriveState::Calibrating);
        let window = self.config.calibration();
        self.hardware.borrow_mut().imu.begin_calibration(window)?;

        let deadline = Instant::now() + window;
        let tick = self.config.tick();
        while Instant::now() < deadline {
            sleep_until(deadline.min(Instant::now() + tick)).await;
            if token.is_cancelled() {
                return Ok(None);
            }
        }

        let mut hardware = self.hardware.borrow_mut();
        hardware.imu.finish_calibration();
        Ok(Some(hardware.imu.sample()?))
    }

    async fn hold_heading(
        &self,
        token: &CancelToken,
        direction: Direction,
        speed: f64,
        criterion: Criterion,
    ) -> Result<DriveOutcome, DriveError> {
        let Some(Orientation { yaw: setpoint, .. }) = self.prepare(token).await? else {
            return Ok(DriveOutcome::Cancelled);
        };

        let mut pid = PidController::from_gains(self.config.gains);
        pid.set_setpoint(setpoint);
        if self.config.yaw_error == YawErrorMode::ShortestArc {
            pid.enable_continuous_input(FULL_TURN);
        }
        debug!("holding heading {setpoint:.2} at {speed}% {direction:?}");

        let base = direction.apply(speed);
        {
            let mut hardware = self.hardware.borrow_mut();
            hardware.tank.reset_odometer();
            hardware.tank.drive(DifferentialOutput::new(base / 2.0, base / 2.0));
        }
        self.transition(DriveState::Driving);

        let tick = self.config.tick();
        let start = Instant::now();
        let mut last_tick = start;

        loop {
            sleep(tick).await;
            if token.is_cancelled() {
                return Ok(DriveOutcome::Cancelled);
            }

            let mut hardware = self.hardware.borrow_mut();
            let travelled = hardware.tank.travelled_degrees();
            if criterion.is_met(start.elapsed(), travelled) {
                return Ok(DriveOutcome::Completed);
            }

            let yaw = hardware.imu.sample()?.yaw;
            let now = Instant::now();
            let correction = pid.compute(now - last_tick, yaw);
            last_tick = now;

            let output = hardware
                .tank
                .drive(steer(direction, base, correction));
            trace!(
                "yaw {yaw:.2} correction {correction:.2} -> ({:.1}, {:.1})",
                output.left,
                output.right
            );
        }
    }

    async fn spin(
        &self,
        token: &CancelToken,
        turn: SpotTurn,
        speed: f64,
    ) -> Result<DriveOutcome, DriveError> {
        let Some(Orientation { yaw: mut previous, .. }) = self.prepare(token).await? else {
            return Ok(DriveOutcome::Cancelled);
        };

        debug!("turning {:?} by {} at {speed}%", turn.direction, turn.angle);
        self.hardware
            .borrow_mut()
            .tank
            .drive(turn.direction.spin(speed));
        self.transition(DriveState::Driving);

        let tick = self.config.tick();
        let mut turned = 0.0_f64;

        loop {
            sleep(tick).await;
            if token.is_cancelled() {
                return Ok(DriveOutcome::Cancelled);
            }

            let yaw = self.hardware.borrow_mut().imu.sample()?.yaw;
            turned += shortest_difference(previous, yaw);
            previous = yaw;
            trace!("turned {turned:.2} of {}", turn.angle);

            if turned.abs() >= turn.angle {
                return Ok(DriveOutcome::Completed);
            }
        }
    }
}

/// Per-side speeds for a straight drive, kept inside the half-range of `direction`.
fn steer(direction: Direction, base: f64, correction: f64) -> DifferentialOutput {
    let (low, high) = if direction.is_forward() {
        (0.0, MAX_SPEED)
    } else {
        (-MAX_SPEED, 0.0)
    };

    DifferentialOutput::new(
        (base + correction).clamp(low, high),
        (base - correction).clamp(low, high),
    )
}

fn report(command: &str, result: &Result<DriveOutcome, DriveError>) {
    match result {
        Ok(outcome) => info!("{command} finished: {outcome:?}"),
        Err(err) => warn!("{command} aborted: {err}"),
    }
}

async fn run_straight<M: MotorDriver, I: InertialDriver>(
    shared: Rc<Shared<M, I>>,
    token: CancelToken,
    direction: Direction,
    speed: f64,
    criterion: Criterion,
) -> Result<DriveOutcome, DriveError> {
    let result = shared
        .hold_heading(&token, direction, speed, criterion)
        .await;
    shared.halt();
    report("gyro drive", &result);
    result
}

struct ActiveDrive {
    token: CancelToken,
    task: Task<Result<DriveOutcome, DriveError>>,
}

/// The drive controller context of one robot.
///
/// All drive commands go through this value. It owns the hardware, the motor bindings, the
/// last applied side speeds, and the single background drive that may be running.
pub struct DriveController<M, I> {
    shared: Rc<Shared<M, I>>,
    active: Option<ActiveDrive>,
}

impl<M: MotorDriver + 'static, I: InertialDriver + 'static> DriveController<M, I> {
    /// Creates a controller for the given motor board and inertial sensor.
    ///
    /// The drivetrain is bound to the outputs named in `config.tank`.
    #[must_use]
    pub fn new(motors: M, inertial: I, config: DriveConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                hardware: RefCell::new(Hardware {
                    tank: TankDrive::new(motors, config.tank),
                    imu: InertialSensor::new(inertial),
                }),
                state: Cell::new(DriveState::Idle),
                config,
            }),
            active: None,
        }
    }

    /// Returns the configuration this controller was created with.
    #[must_use]
    pub fn config(&self) -> &DriveConfig {
        &self.shared.config
    }

    /// Returns where the controller is in its current gyro command.
    #[must_use]
    pub fn state(&self) -> DriveState {
        self.shared.state.get()
    }

    /// Returns the side speeds most recently written to the motors.
    #[must_use]
    pub fn last_applied(&self) -> DifferentialOutput {
        self.shared.hardware.borrow().tank.last_applied()
    }

    /// Returns the current motor bindings.
    #[must_use]
    pub fn bindings(&self) -> TankBindings {
        self.shared.hardware.borrow().tank.bindings()
    }

    /// Rebinds the drivetrain. A running background drive picks up the change on its next tick.
    pub fn set_bindings(&mut self, bindings: TankBindings) {
        debug!("tank bound to {} / {}", bindings.left, bindings.right);
        self.shared.hardware.borrow_mut().tank.set_bindings(bindings);
    }

    /// Returns `true` while a background drive is outstanding.
    #[must_use]
    pub fn has_background_drive(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Cancels the background drive, if any, and waits until it has stopped the motors.
    async fn preempt(&mut self) {
        if let Some(ActiveDrive { token, task }) = self.active.take() {
            token.cancel();
            if let Err(err) = task.await {
                warn!("background drive ended with an error: {err}");
            }
        }
    }

    /// Drives straight while holding the current heading until `command`'s condition is met.
    ///
    /// The sensor is brought up and calibrated first, so the robot must stand still when this
    /// is called. The first command is half the requested speed for a soft start.
    ///
    /// # Errors
    ///
    /// - A [`DriveError::InvalidSpeed`] error is returned for a NaN speed, or a zero speed with
    ///   a travel condition.
    /// - A [`DriveError::InvalidCondition`] error is returned for a negative or non-finite
    ///   travel amount.
    /// - A [`DriveError::Inertial`] error is returned if the sensor is missing. The motors are
    ///   left stopped.
    pub async fn gyro_drive(&mut self, command: DriveCommand) -> Result<DriveOutcome, DriveError> {
        let (speed, criterion) = command.resolve(&self.shared.config.wheel)?;
        self.preempt().await;

        run_straight(
            self.shared.clone(),
            CancelToken::new(),
            command.direction,
            speed,
            criterion,
        )
        .await
    }

    /// Starts a heading-holding drive in the background and returns once it is spawned.
    ///
    /// The drive runs until another command preempts it or the configured background limit
    /// elapses. Use [`join`](Self::join) to wait for it.
    ///
    /// # Errors
    ///
    /// - A [`DriveError::InvalidSpeed`] error is returned for a NaN speed.
    pub async fn gyro_drive_background(
        &mut self,
        direction: Direction,
        speed: f64,
    ) -> Result<(), DriveError> {
        let speed = checked_speed(speed)?;
        self.preempt().await;

        let token = CancelToken::new();
        let task = spawn(run_straight(
            self.shared.clone(),
            token.clone(),
            direction,
            speed,
            Criterion::Elapsed(self.shared.config.background_limit()),
        ));
        self.active = Some(ActiveDrive { token, task });

        Ok(())
    }

    /// Spins on the spot until the heading has changed by `turn.angle` degrees.
    ///
    /// # Errors
    ///
    /// - A [`DriveError::InvalidAngle`] error is returned unless the angle is positive and finite.
    /// - A [`DriveError::InvalidSpeed`] error is returned for a NaN or non-positive speed.
    /// - A [`DriveError::Inertial`] error is returned if the sensor is missing. The motors are
    ///   left stopped.
    pub async fn gyro_spot_turn(&mut self, turn: SpotTurn) -> Result<DriveOutcome, DriveError> {
        let speed = turn.resolve()?;
        self.preempt().await;

        let result = self.shared.spin(&CancelToken::new(), turn, speed).await;
        self.shared.halt();
        report("spot turn", &result);
        result
    }

    /// Sets both side speeds directly. Speeds are clamped to `[-100, 100]`.
    pub async fn drive_tank(&mut self, left: f64, right: f64) -> DifferentialOutput {
        self.preempt().await;
        self.shared
            .hardware
            .borrow_mut()
            .tank
            .drive(DifferentialOutput::new(left, right))
    }

    /// Ramps linearly from the last applied side speeds to `(left, right)` over `ramp`.
    ///
    /// Speeds are clamped to `[-100, 100]`. Resolves once the target is applied.
    pub async fn ramp_tank(&mut self, left: f64, right: f64, ramp: Duration) -> DifferentialOutput {
        self.preempt().await;

        let config = &self.shared.config;
        let plan = self.shared.hardware.borrow().tank.plan_ramp(
            DifferentialOutput::new(left, right),
            ramp,
            config.ramp_tick(),
            config.ramp_boost,
        );
        debug!("ramping to ({left}, {right}) in {} steps", plan.remaining());

        for step in plan {
            if !step.delay.is_zero() {
                sleep(step.delay).await;
            }
            self.shared.hardware.borrow_mut().tank.apply_step(&step);
        }

        self.last_applied()
    }

    /// Cancels any background drive and stops both wheels.
    pub async fn stop(&mut self) {
        self.preempt().await;
        self.shared.halt();
    }

    /// Waits for the background drive to end and returns its result.
    ///
    /// Returns `None` if no background drive was started since the last command.
    pub async fn join(&mut self) -> Option<Result<DriveOutcome, DriveError>> {
        let active = self.active.take()?;
        Some(active.task.await)
    }
}

impl<M, I> Drop for DriveController<M, I> {
    fn drop(&mut self) {
        // Let the loop stop the motors on its next tick instead of freezing them mid-drive.
        if let Some(ActiveDrive { token, task }) = self.active.take() {
            token.cancel();
            task.detach();
        }
    }
}

impl<M, I> core::fmt::Debug for DriveController<M, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DriveController")
            .field("state", &self.shared.state.get())
            .field("config", &self.shared.config)
            .field("background", &self.active.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn steering_stays_in_direction_half_range() {
        let forward = steer(Direction::Forward, 90.0, 25.0);
        assert_eq!(forward, DifferentialOutput::new(100.0, 65.0));

        let backward = steer(Direction::Reverse, -10.0, 25.0);
        assert_eq!(backward, DifferentialOutput::new(0.0, -35.0));
    }

    #[test]
    fn zero_correction_keeps_sides_equal() {
        let output = steer(Direction::Forward, 30.0, 0.0);
        assert_relative_eq!(output.left, 30.0);
        assert_relative_eq!(output.right, 30.0);
    }
}
