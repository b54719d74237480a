//! Differential (tank) drive actuator.
//!
//! A [`TankDrive`] owns the motor driver board and knows which outputs carry the left and
//! right wheels. It turns a pair of side speeds into motor commands, remembers the last pair
//! it applied, and plans smooth ramps away from that pair.

use core::time::Duration;

use mintspark_devices::motor::{Direction, MotorDriver, MotorId, MAX_SPEED};
use serde::{Deserialize, Serialize};

/// One side of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left wheel.
    Left,
    /// The right wheel.
    Right,
}

/// Which motor outputs drive the wheels, and which way each motor is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankBindings {
    /// Output driving the left wheel.
    pub left: MotorId,
    /// Output driving the right wheel.
    pub right: MotorId,
    /// Mounting direction of the left motor.
    pub left_direction: Direction,
    /// Mounting direction of the right motor.
    pub right_direction: Direction,
}

impl TankBindings {
    /// Binds two outputs, both mounted forward.
    #[must_use]
    pub const fn new(left: MotorId, right: MotorId) -> Self {
        Self {
            left,
            right,
            left_direction: Direction::Forward,
            right_direction: Direction::Forward,
        }
    }

    /// Sets which sides are mounted in reverse.
    #[must_use]
    pub const fn reversed(mut self, left: bool, right: bool) -> Self {
        self.left_direction = if left {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        self.right_direction = if right {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        self
    }

    /// Returns the output and mounting direction of one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> (MotorId, Direction) {
        match side {
            Side::Left => (self.left, self.left_direction),
            Side::Right => (self.right, self.right_direction),
        }
    }
}

impl Default for TankBindings {
    fn default() -> Self {
        Self::new(MotorId::M1, MotorId::M2)
    }
}

/// A pair of signed side speeds in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DifferentialOutput {
    /// Left side speed.
    pub left: f64,
    /// Right side speed.
    pub right: f64,
}

impl DifferentialOutput {
    /// Both sides stopped.
    pub const STOPPED: Self = Self::new(0.0, 0.0);

    /// Creates a new pair.
    #[must_use]
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Returns the speed of one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Returns `true` if both sides are at zero.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }

    /// Clamps both sides into `[-100, 100]`. NaN becomes zero.
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |speed: f64| {
            if speed.is_nan() {
                0.0
            } else {
                speed.clamp(-MAX_SPEED, MAX_SPEED)
            }
        };
        Self::new(clamp(self.left), clamp(self.right))
    }

    /// Multiplies both sides by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.left * factor, self.right * factor)
    }

    /// Linear interpolation from `self` (`t = 0`) to `target` (`t = 1`).
    #[must_use]
    pub fn lerp(self, target: Self, t: f64) -> Self {
        Self::new(
            self.left + (target.left - self.left) * t,
            self.right + (target.right - self.right) * t,
        )
    }
}

/// One step of a planned ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep {
    /// How long to wait before applying this step.
    pub delay: Duration,
    /// The pair to apply.
    pub output: DifferentialOutput,
    /// The order in which the two sides are written.
    pub order: [Side; 2],
}

const LEFT_FIRST: [Side; 2] = [Side::Left, Side::Right];
const RIGHT_FIRST: [Side; 2] = [Side::Right, Side::Left];

/// A planned ramp, yielding its [`RampStep`]s in order.
///
/// Created by [`TankDrive::plan_ramp`].
#[derive(Debug, Clone, PartialEq)]
pub struct RampPlan {
    boost: Option<DifferentialOutput>,
    from: DifferentialOutput,
    target: DifferentialOutput,
    tick: Duration,
    count: u64,
    index: u64,
}

impl RampPlan {
    /// Number of steps not yet yielded, including the boost step.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        u64::from(self.boost.is_some()) + (self.count - self.index)
    }
}

impl Iterator for RampPlan {
    type Item = RampStep;

    fn next(&mut self) -> Option<RampStep> {
        if let Some(output) = self.boost.take() {
            return Some(RampStep {
                delay: Duration::ZERO,
                output,
                order: LEFT_FIRST,
            });
        }

        if self.index == self.count {
            return None;
        }
        self.index += 1;

        let output = if self.index == self.count {
            self.target
        } else {
            self.from
                .lerp(self.target, self.index as f64 / self.count as f64)
                .clamped()
        };

        Some(RampStep {
            delay: self.tick,
            output,
            order: if self.index % 2 == 1 {
                LEFT_FIRST
            } else {
                RIGHT_FIRST
            },
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).ok();
        (remaining.unwrap_or(usize::MAX), remaining)
    }
}

/// A differential drivetrain on two motor outputs.
#[derive(Debug)]
pub struct TankDrive<M> {
    driver: M,
    bindings: TankBindings,
    last: DifferentialOutput,
}

impl<M: MotorDriver> TankDrive<M> {
    /// Creates a drivetrain. Nothing is written to the motors until the first command.
    #[must_use]
    pub const fn new(driver: M, bindings: TankBindings) -> Self {
        Self {
            driver,
            bindings,
            last: DifferentialOutput::STOPPED,
        }
    }

    /// Returns the motor bindings.
    #[must_use]
    pub const fn bindings(&self) -> TankBindings {
        self.bindings
    }

    /// Rebinds the drivetrain to other outputs or mounting directions.
    pub fn set_bindings(&mut self, bindings: TankBindings) {
        self.bindings = bindings;
    }

    /// Returns the pair most recently written to the motors.
    #[must_use]
    pub const fn last_applied(&self) -> DifferentialOutput {
        self.last
    }

    /// Clamps `target`, writes the left then the right side, and returns what was applied.
    pub fn drive(&mut self, target: DifferentialOutput) -> DifferentialOutput {
        let output = target.clamped();
        for side in LEFT_FIRST {
            self.write(side, output.side(side));
        }
        self.last = output;
        output
    }

    /// Stops both sides.
    pub fn stop(&mut self) {
        self.drive(DifferentialOutput::STOPPED);
    }

    /// Writes one planned ramp step in its side order.
    pub fn apply_step(&mut self, step: &RampStep) {
        let output = step.output.clamped();
        for side in step.order {
            self.write(side, output.side(side));
        }
        self.last = output;
    }

    /// Plans a linear ramp from the last applied pair to `target`.
    ///
    /// The ramp is split into one step per `tick`, each applied after a `tick` delay, so the
    /// final step lands exactly on `target` no earlier than `ramp` after the start. Steps
    /// alternate between writing the left side first and the right side first. When the
    /// drivetrain is stopped, an extra undelayed step first jumps to `boost` times the target
    /// to break static friction. `boost` is clamped to `[0, 1]`, NaN counts as zero.
    ///
    /// Steps are computed as the plan is iterated, so arbitrarily long ramps cost nothing up
    /// front.
    #[must_use]
    pub fn plan_ramp(
        &self,
        target: DifferentialOutput,
        ramp: Duration,
        tick: Duration,
        boost: f64,
    ) -> RampPlan {
        let target = target.clamped();

        if ramp.is_zero() || tick.is_zero() {
            return RampPlan {
                boost: None,
                from: target,
                target,
                tick: Duration::ZERO,
                count: 1,
                index: 0,
            };
        }

        let mut plan = RampPlan {
            boost: None,
            from: self.last,
            target,
            tick,
            count: u64::try_from(ramp.as_nanos().div_ceil(tick.as_nanos()))
                .unwrap_or(u64::MAX)
                .max(1),
            index: 0,
        };

        if plan.from.is_stopped() && !target.is_stopped() {
            let boost = if boost.is_nan() { 0.0 } else { boost.clamp(0.0, 1.0) };
            plan.from = target.scaled(boost).clamped();
            plan.boost = Some(plan.from);
        }

        plan
    }

    /// Zeroes the encoders of both drive motors.
    pub fn reset_odometer(&mut self) {
        self.driver.reset_angle(self.bindings.left);
        self.driver.reset_angle(self.bindings.right);
    }

    /// Mean absolute wheel rotation of both sides since the last odometer reset, in degrees.
    pub fn travelled_degrees(&mut self) -> f64 {
        let left = self.driver.angle(self.bindings.left).abs();
        let right = self.driver.angle(self.bindings.right).abs();
        (left + right) / 2.0
    }

    fn write(&mut self, side: Side, speed: f64) {
        let (motor, direction) = self.bindings.side(side);
        self.driver.set_speed(motor, direction.apply(speed));
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use mintspark_async::time;
    use mintspark_devices::mock::SimRobot;

    use super::*;

    const TICK: Duration = Duration::from_millis(50);

    fn tank(robot: &SimRobot) -> TankDrive<mintspark_devices::mock::SimMotors> {
        TankDrive::new(robot.motors(), TankBindings::default())
    }

    #[test]
    fn output_signs_follow_reversal_and_stay_in_range() {
        let speeds = [-150.0, -100.0, -37.5, 0.0, 12.0, 100.0, 250.0];
        let flags = [(false, false), (true, false), (false, true), (true, true)];

        for (left_reversed, right_reversed) in flags {
            for left in speeds {
                for right in speeds {
                    time::pause();
                    let robot = SimRobot::new();
                    let mut drive = TankDrive::new(
                        robot.motors(),
                        TankBindings::new(MotorId::M3, MotorId::M4)
                            .reversed(left_reversed, right_reversed),
                    );

                    drive.drive(DifferentialOutput::new(left, right));

                    let sent_left = robot.commands_for(MotorId::M3)[0].speed;
                    let sent_right = robot.commands_for(MotorId::M4)[0].speed;
                    let expect = |speed: f64, reversed: bool| {
                        let clamped = speed.clamp(-100.0, 100.0);
                        if reversed {
                            -clamped
                        } else {
                            clamped
                        }
                    };

                    assert_eq!(sent_left, expect(left, left_reversed));
                    assert_eq!(sent_right, expect(right, right_reversed));
                    assert!(sent_left.abs() <= 100.0 && sent_right.abs() <= 100.0);
                }
            }
        }
    }

    #[test]
    fn drive_writes_left_then_right_and_remembers() {
        time::pause();
        let robot = SimRobot::new();
        let mut drive = tank(&robot);

        let applied = drive.drive(DifferentialOutput::new(30.0, -20.0));

        let motors: Vec<_> = robot.commands().iter().map(|c| c.motor).collect();
        assert_eq!(motors, vec![MotorId::M1, MotorId::M2]);
        assert_eq!(applied, DifferentialOutput::new(30.0, -20.0));
        assert_eq!(drive.last_applied(), applied);
    }

    #[test]
    fn nan_speeds_stop_the_side() {
        let output = DifferentialOutput::new(f64::NAN, 40.0).clamped();
        assert_eq!(output, DifferentialOutput::new(0.0, 40.0));
    }

    #[test]
    fn ramp_from_stop_boosts_then_interpolates() {
        time::pause();
        let robot = SimRobot::new();
        let drive = tank(&robot);

        let steps: Vec<_> = drive
            .plan_ramp(
                DifferentialOutput::new(50.0, 100.0),
                Duration::from_millis(200),
                TICK,
                0.2,
            )
            .collect();

        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].delay, Duration::ZERO);
        assert_eq!(steps[0].output, DifferentialOutput::new(10.0, 20.0));

        assert_relative_eq!(steps[1].output.left, 20.0);
        assert_relative_eq!(steps[1].output.right, 40.0);
        assert_relative_eq!(steps[2].output.left, 30.0);
        assert_relative_eq!(steps[3].output.left, 40.0);
        assert_eq!(steps[4].output, DifferentialOutput::new(50.0, 100.0));

        let delayed: Duration = steps.iter().map(|step| step.delay).sum();
        assert_eq!(delayed, Duration::from_millis(200));
    }

    #[test]
    fn ramp_alternates_side_order() {
        time::pause();
        let robot = SimRobot::new();
        let mut drive = tank(&robot);
        drive.drive(DifferentialOutput::new(10.0, 10.0));

        let steps: Vec<_> = drive
            .plan_ramp(
                DifferentialOutput::new(50.0, 50.0),
                Duration::from_millis(200),
                TICK,
                0.2,
            )
            .collect();

        let orders: Vec<_> = steps.iter().map(|step| step.order[0]).collect();
        assert_eq!(orders, vec![Side::Left, Side::Right, Side::Left, Side::Right]);
    }

    #[test]
    fn ramp_reaches_target_from_any_start() {
        let starts = [
            DifferentialOutput::new(-80.0, 60.0),
            DifferentialOutput::new(33.3, 33.3),
            DifferentialOutput::STOPPED,
        ];
        let ramps = [1, 49, 50, 51, 120, 1000];

        for start in starts {
            for ramp in ramps {
                time::pause();
                let robot = SimRobot::new();
                let mut drive = tank(&robot);
                drive.drive(start);

                let target = DifferentialOutput::new(-45.0, 70.0);
                let ramp = Duration::from_millis(ramp);
                let steps: Vec<_> = drive.plan_ramp(target, ramp, TICK, 0.2).collect();

                let delayed: Duration = steps.iter().map(|step| step.delay).sum();
                assert!(delayed >= ramp);

                for step in &steps {
                    drive.apply_step(step);
                }
                assert_eq!(drive.last_applied(), target);
                assert_eq!(robot.speed(MotorId::M1), -45.0);
                assert_eq!(robot.speed(MotorId::M2), 70.0);
            }
        }
    }

    #[test]
    fn zero_ramp_jumps_immediately() {
        time::pause();
        let robot = SimRobot::new();
        let drive = tank(&robot);

        let steps: Vec<_> = drive
            .plan_ramp(
                DifferentialOutput::new(60.0, 60.0),
                Duration::ZERO,
                TICK,
                0.2,
            )
            .collect();

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].delay, Duration::ZERO);
        assert_eq!(steps[0].output, DifferentialOutput::new(60.0, 60.0));
    }

    #[test]
    fn very_long_ramps_are_planned_lazily() {
        time::pause();
        let robot = SimRobot::new();
        let drive = tank(&robot);

        let ramp = Duration::from_secs(100_000_000_000);
        let mut plan = drive.plan_ramp(DifferentialOutput::new(50.0, 50.0), ramp, TICK, 0.2);
        assert_eq!(plan.remaining(), 2_000_000_000_001);

        let boost = plan.next().unwrap();
        assert_eq!(boost.output, DifferentialOutput::new(10.0, 10.0));

        let first = plan.next().unwrap();
        assert_eq!(first.delay, TICK);
        assert!(first.output.left > 10.0 && first.output.left < 10.001);
        assert_eq!(plan.remaining(), 1_999_999_999_999);
    }

    #[test]
    fn boost_is_clamped_to_the_target() {
        time::pause();
        let robot = SimRobot::new();
        let drive = tank(&robot);
        let target = DifferentialOutput::new(50.0, 50.0);

        for boost in [3.0, f64::INFINITY] {
            let steps: Vec<_> = drive
                .plan_ramp(target, Duration::from_millis(200), TICK, boost)
                .collect();
            assert!(steps.iter().all(|step| step.output == target), "{steps:?}");
        }

        let steps: Vec<_> = drive
            .plan_ramp(target, Duration::from_millis(200), TICK, f64::NAN)
            .collect();
        assert_eq!(steps[0].output, DifferentialOutput::STOPPED);
        assert_relative_eq!(steps[1].output.left, 12.5);
    }

    #[test]
    fn odometer_averages_both_wheels() {
        time::pause();
        let robot = SimRobot::new();
        let mut drive = tank(&robot);
        drive.reset_odometer();

        drive.drive(DifferentialOutput::new(50.0, -50.0));
        time::advance(Duration::from_secs(1));

        assert_relative_eq!(drive.travelled_degrees(), 360.0);
    }
}
