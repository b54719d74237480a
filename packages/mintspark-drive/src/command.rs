//! Drive commands and their stopping conditions.

use core::time::Duration;

use mintspark_devices::motor::{Direction, MAX_SPEED};
use mintspark_math::{angle::FULL_TURN, wheel::WheelGeometry};
use snafu::ensure;

use crate::{
    error::{InvalidAngleSnafu, InvalidConditionSnafu, InvalidSpeedSnafu},
    tank::DifferentialOutput,
    DriveError,
};

/// Units the stopping amount of a straight drive can be given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveUnit {
    /// Seconds of driving.
    Seconds,
    /// Milliseconds of driving.
    Milliseconds,
    /// Degrees of wheel rotation.
    Degrees,
    /// Full wheel rotations.
    Turns,
    /// Millimeters of travel.
    Millimeters,
    /// Centimeters of travel.
    Centimeters,
}

/// When a straight drive ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// After driving for this long.
    Elapsed(Duration),
    /// Once the wheels have turned this many degrees.
    Degrees(f64),
    /// Once the wheels have made this many full rotations.
    Turns(f64),
    /// Once the robot has travelled this many millimeters.
    Distance(f64),
}

impl StopCondition {
    /// Builds a condition from an amount and its unit.
    ///
    /// # Errors
    ///
    /// - A [`DriveError::InvalidCondition`] error is returned for time amounts that are negative
    ///   or not finite.
    pub fn from_unit(value: f64, unit: DriveUnit) -> Result<Self, DriveError> {
        Ok(match unit {
            DriveUnit::Seconds => Self::Elapsed(
                Duration::try_from_secs_f64(value)
                    .map_err(|_| DriveError::InvalidCondition { value })?,
            ),
            DriveUnit::Milliseconds => Self::Elapsed(
                Duration::try_from_secs_f64(value / 1000.0)
                    .map_err(|_| DriveError::InvalidCondition { value })?,
            ),
            DriveUnit::Degrees => Self::Degrees(value),
            DriveUnit::Turns => Self::Turns(value),
            DriveUnit::Millimeters => Self::Distance(value),
            DriveUnit::Centimeters => Self::Distance(value * 10.0),
        })
    }

    /// Resolves the condition into wheel degrees or elapsed time.
    pub(crate) fn criterion(self, wheel: &WheelGeometry) -> Result<Criterion, DriveError> {
        let degrees = match self {
            Self::Elapsed(duration) => return Ok(Criterion::Elapsed(duration)),
            Self::Degrees(degrees) => checked_amount(degrees)?,
            Self::Turns(turns) => checked_amount(turns)? * FULL_TURN,
            Self::Distance(mm) => wheel.degrees_for_distance(checked_amount(mm)?),
        };

        Ok(Criterion::Travel(degrees))
    }
}

fn checked_amount(value: f64) -> Result<f64, DriveError> {
    ensure!(
        value.is_finite() && value >= 0.0,
        InvalidConditionSnafu { value }
    );
    Ok(value)
}

/// Clamps a drive speed magnitude into `[0, 100]`.
pub(crate) fn checked_speed(speed: f64) -> Result<f64, DriveError> {
    ensure!(!speed.is_nan(), InvalidSpeedSnafu { speed });
    Ok(speed.clamp(0.0, MAX_SPEED))
}

/// A resolved stopping criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Criterion {
    Elapsed(Duration),
    Travel(f64),
}

impl Criterion {
    pub(crate) fn is_met(&self, elapsed: Duration, travelled_degrees: f64) -> bool {
        match *self {
            Self::Elapsed(limit) => elapsed >= limit,
            Self::Travel(target) => travelled_degrees >= target,
        }
    }

    /// Whether the criterion can only be met by moving.
    fn needs_motion(&self) -> bool {
        matches!(self, Self::Travel(target) if *target > 0.0)
    }
}

/// A heading-holding straight drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    /// Which way to drive.
    pub direction: Direction,
    /// Speed magnitude in percent.
    pub speed: f64,
    /// When to stop.
    pub condition: StopCondition,
}

impl DriveCommand {
    /// Creates a new command.
    #[must_use]
    pub const fn new(direction: Direction, speed: f64, condition: StopCondition) -> Self {
        Self {
            direction,
            speed,
            condition,
        }
    }

    /// Creates a command that drives for a given amount of some unit.
    ///
    /// ```
    /// use core::time::Duration;
    ///
    /// use mintspark_devices::motor::Direction;
    /// use mintspark_drive::command::{DriveCommand, DriveUnit, StopCondition};
    ///
    /// let command = DriveCommand::with_unit(Direction::Forward, 30.0, 2.0, DriveUnit::Seconds)?;
    /// assert_eq!(command.condition, StopCondition::Elapsed(Duration::from_secs(2)));
    /// # Ok::<(), mintspark_drive::DriveError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// See [`StopCondition::from_unit`].
    pub fn with_unit(
        direction: Direction,
        speed: f64,
        value: f64,
        unit: DriveUnit,
    ) -> Result<Self, DriveError> {
        Ok(Self::new(
            direction,
            speed,
            StopCondition::from_unit(value, unit)?,
        ))
    }

    /// Validates the command and returns its clamped speed with the resolved criterion.
    pub(crate) fn resolve(&self, wheel: &WheelGeometry) -> Result<(f64, Criterion), DriveError> {
        let speed = checked_speed(self.speed)?;
        let criterion = self.condition.criterion(wheel)?;

        // A stationary robot would never reach a travel target.
        ensure!(
            speed > 0.0 || !criterion.needs_motion(),
            InvalidSpeedSnafu { speed: self.speed }
        );

        Ok((speed, criterion))
    }
}

/// Which way a spot turn spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
}

impl TurnDirection {
    /// The side speeds that spin the robot this way at `speed`.
    #[must_use]
    pub fn spin(self, speed: f64) -> DifferentialOutput {
        match self {
            Self::Left => DifferentialOutput::new(-speed, speed),
            Self::Right => DifferentialOutput::new(speed, -speed),
        }
    }
}

/// A turn on the spot, ended by the change in heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotTurn {
    /// Which way to spin.
    pub direction: TurnDirection,
    /// Wheel speed magnitude in percent.
    pub speed: f64,
    /// How far to turn, in degrees.
    pub angle: f64,
}

impl SpotTurn {
    /// Creates a new turn.
    #[must_use]
    pub const fn new(direction: TurnDirection, speed: f64, angle: f64) -> Self {
        Self {
            direction,
            speed,
            angle,
        }
    }

    /// Validates the turn and returns its clamped speed.
    pub(crate) fn resolve(&self) -> Result<f64, DriveError> {
        ensure!(
            self.angle.is_finite() && self.angle > 0.0,
            InvalidAngleSnafu { angle: self.angle }
        );

        let speed = checked_speed(self.speed)?;
        ensure!(speed > 0.0, InvalidSpeedSnafu { speed: self.speed });

        Ok(speed)
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn units_map_to_conditions() {
        assert_eq!(
            StopCondition::from_unit(1.5, DriveUnit::Seconds),
            Ok(StopCondition::Elapsed(Duration::from_millis(1500)))
        );
        assert_eq!(
            StopCondition::from_unit(250.0, DriveUnit::Milliseconds),
            Ok(StopCondition::Elapsed(Duration::from_millis(250)))
        );
        assert_eq!(
            StopCondition::from_unit(12.0, DriveUnit::Centimeters),
            Ok(StopCondition::Distance(120.0))
        );
    }

    #[test]
    fn negative_time_is_rejected() {
        assert_eq!(
            StopCondition::from_unit(-1.0, DriveUnit::Seconds),
            Err(DriveError::InvalidCondition { value: -1.0 })
        );
        assert!(StopCondition::from_unit(f64::INFINITY, DriveUnit::Milliseconds).is_err());
    }

    #[test]
    fn turns_and_distance_become_degrees() {
        let wheel = WheelGeometry::from_degrees_per_mm(2.0);

        assert_eq!(
            StopCondition::Turns(1.5).criterion(&wheel),
            Ok(Criterion::Travel(540.0))
        );

        let Ok(Criterion::Travel(degrees)) = StopCondition::Distance(100.0).criterion(&wheel)
        else {
            panic!("distance should resolve to a travel criterion");
        };
        assert_relative_eq!(degrees, 200.0);
    }

    #[test]
    fn speeds_clamp_into_range() {
        let wheel = WheelGeometry::default();
        let command = |speed| {
            DriveCommand::new(
                Direction::Forward,
                speed,
                StopCondition::Elapsed(Duration::from_secs(1)),
            )
        };

        assert_eq!(command(150.0).resolve(&wheel).map(|(s, _)| s), Ok(100.0));
        assert_eq!(command(-20.0).resolve(&wheel).map(|(s, _)| s), Ok(0.0));
        assert!(matches!(
            command(f64::NAN).resolve(&wheel),
            Err(DriveError::InvalidSpeed { .. })
        ));
    }

    #[test]
    fn travel_at_zero_speed_is_rejected() {
        let command = DriveCommand::new(Direction::Forward, 0.0, StopCondition::Degrees(90.0));
        assert_eq!(
            command.resolve(&WheelGeometry::default()),
            Err(DriveError::InvalidSpeed { speed: 0.0 })
        );
    }

    #[test]
    fn turn_angles_must_be_positive() {
        for angle in [0.0, -90.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SpotTurn::new(TurnDirection::Left, 50.0, angle).resolve(),
                Err(DriveError::InvalidAngle { .. })
            ));
        }
        assert_eq!(SpotTurn::new(TurnDirection::Left, 500.0, 90.0).resolve(), Ok(100.0));
    }

    #[test]
    fn right_turns_spin_clockwise() {
        assert_eq!(
            TurnDirection::Right.spin(40.0),
            DifferentialOutput::new(40.0, -40.0)
        );
        assert_eq!(
            TurnDirection::Left.spin(40.0),
            DifferentialOutput::new(-40.0, 40.0)
        );
    }
}
