//! Ultrasonic Range Finder.
//!
//! The ultrasonic sensor occasionally drops a ping and reports a distance of zero (or a
//! negative error value). [`Ultrasonic`] hides those dropouts by answering with the last
//! distance that was actually measured.

use log::trace;
use snafu::Snafu;

/// Centimeters in one inch.
const CENTIMETERS_PER_INCH: f64 = 2.54;

/// Units a distance can be reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceUnit {
    /// Centimeters.
    Centimeters,
    /// Inches.
    Inches,
}

impl DistanceUnit {
    /// Converts a distance in this unit to centimeters.
    #[must_use]
    pub fn to_centimeters(self, distance: f64) -> f64 {
        match self {
            Self::Centimeters => distance,
            Self::Inches => distance * CENTIMETERS_PER_INCH,
        }
    }

    /// Converts a distance in centimeters to this unit.
    #[must_use]
    pub fn from_centimeters(self, centimeters: f64) -> f64 {
        match self {
            Self::Centimeters => centimeters,
            Self::Inches => centimeters / CENTIMETERS_PER_INCH,
        }
    }
}

/// The vendor ultrasonic driver.
pub trait RangeFinderDriver {
    /// Pings once and returns the measured distance. Values `<= 0` mean no echo was heard.
    fn read_distance(&mut self, unit: DistanceUnit) -> f64;
}

/// An ultrasonic range finder that masks dropped readings.
#[derive(Debug)]
pub struct Ultrasonic<D> {
    driver: D,
    last_good_cm: Option<f64>,
}

impl<D: RangeFinderDriver> Ultrasonic<D> {
    /// Wraps a driver.
    #[must_use]
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            last_good_cm: None,
        }
    }

    /// Returns the distance to the nearest object in front of the sensor.
    ///
    /// A reading `<= 0` is replaced by the last valid reading, converted to `unit`.
    ///
    /// # Errors
    ///
    /// - A [`RangeFinderError::NoReading`] error is returned if the reading was invalid and no valid
    ///   reading has been seen yet.
    pub fn distance(&mut self, unit: DistanceUnit) -> Result<f64, RangeFinderError> {
        let reading = self.driver.read_distance(unit);

        if reading > 0.0 {
            self.last_good_cm = Some(unit.to_centimeters(reading));
            return Ok(reading);
        }

        trace!("ultrasonic reading {reading} dropped, using last good value");
        self.last_good_cm
            .map(|centimeters| unit.from_centimeters(centimeters))
            .ok_or(RangeFinderError::NoReading)
    }
}

/// Errors that can occur when using a range finder.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum RangeFinderError {
    /// The sensor has not produced a valid reading yet.
    #[snafu(display("The range finder has not produced a valid reading yet."))]
    NoReading,
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::mock::ScriptedRangeFinder;

    #[test]
    fn dropped_reading_uses_last_good_value() {
        let mut sensor = Ultrasonic::new(ScriptedRangeFinder::new([15.0, 0.0]));

        assert_eq!(sensor.distance(DistanceUnit::Centimeters), Ok(15.0));
        assert_eq!(sensor.distance(DistanceUnit::Centimeters), Ok(15.0));
    }

    #[test]
    fn negative_readings_are_dropped_too() {
        let mut sensor = Ultrasonic::new(ScriptedRangeFinder::new([20.0, -1.0, 30.0]));

        assert_eq!(sensor.distance(DistanceUnit::Centimeters), Ok(20.0));
        assert_eq!(sensor.distance(DistanceUnit::Centimeters), Ok(20.0));
        assert_eq!(sensor.distance(DistanceUnit::Centimeters), Ok(30.0));
    }

    #[test]
    fn no_history_is_an_error() {
        let mut sensor = Ultrasonic::new(ScriptedRangeFinder::new([0.0]));

        assert_eq!(
            sensor.distance(DistanceUnit::Centimeters),
            Err(RangeFinderError::NoReading)
        );
    }

    #[test]
    fn last_good_value_follows_requested_unit() {
        let mut sensor = Ultrasonic::new(ScriptedRangeFinder::new([25.4, 0.0]));

        sensor.distance(DistanceUnit::Centimeters).unwrap();
        assert_relative_eq!(sensor.distance(DistanceUnit::Inches).unwrap(), 10.0);
    }
}
