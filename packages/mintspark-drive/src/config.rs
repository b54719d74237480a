//! Drive configuration.
//!
//! Every field has a default, so a configuration file only needs to name what it changes:
//!
//! ```yaml
//! gains:
//!   kp: 8.0
//! calibration_ms: 500
//! yaw_error: raw
//! tank:
//!   left: M3
//!   right: M4
//!   right_direction: reverse
//! ```

use core::time::Duration;
use std::path::{Path, PathBuf};

use mintspark_math::{pid::PidGains, wheel::WheelGeometry};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};

use crate::tank::TankBindings;

/// How the heading error is computed from the setpoint and the current yaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YawErrorMode {
    /// Take the error along the shorter way around the circle.
    #[default]
    ShortestArc,
    /// Plain `setpoint - yaw`, which jumps by 360 degrees when the yaw wraps.
    Raw,
}

/// Tuning and timing of a [`DriveController`](crate::DriveController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Heading PID gains.
    pub gains: PidGains,
    /// Control loop period in milliseconds.
    pub tick_ms: u64,
    /// Ramp step period in milliseconds.
    pub ramp_tick_ms: u64,
    /// How long the robot sits still while the gyroscope calibrates, in milliseconds.
    pub calibration_ms: u64,
    /// Upper bound on an untimed background drive, in milliseconds.
    pub background_limit_ms: u64,
    /// Fraction of the target a ramp jumps to when starting from a standstill.
    pub ramp_boost: f64,
    /// Wheel rotation per distance travelled.
    pub wheel: WheelGeometry,
    /// Heading error computation.
    pub yaw_error: YawErrorMode,
    /// Motor outputs carrying the wheels.
    pub tank: TankBindings,
}

impl DriveConfig {
    /// Parses a configuration from YAML.
    ///
    /// # Errors
    ///
    /// - A [`ConfigError::Parse`] error is returned if the document is not a valid configuration.
    /// - A [`ConfigError::Invalid`] error is returned if a value is out of range.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).context(ParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by a controller.
    ///
    /// # Errors
    ///
    /// - A [`ConfigError::Invalid`] error is returned for non-finite gains, a `ramp_boost`
    ///   outside `[0, 1]`, or a wheel constant that is not positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gains = [
            ("gains.kp", self.gains.kp),
            ("gains.ki", self.gains.ki),
            ("gains.kd", self.gains.kd),
        ];
        for (field, value) in gains {
            ensure!(value.is_finite(), InvalidSnafu { field, value });
        }

        ensure!(
            (0.0..=1.0).contains(&self.ramp_boost),
            InvalidSnafu {
                field: "ramp_boost",
                value: self.ramp_boost,
            }
        );

        let degrees_per_mm = self.wheel.degrees_per_mm;
        ensure!(
            degrees_per_mm.is_finite() && degrees_per_mm > 0.0,
            InvalidSnafu {
                field: "wheel.degrees_per_mm",
                value: degrees_per_mm,
            }
        );

        Ok(())
    }

    /// Reads a YAML configuration file.
    ///
    /// # Errors
    ///
    /// - A [`ConfigError::Read`] error is returned if the file cannot be read.
    /// - A [`ConfigError::Parse`] error is returned if the file is not a valid configuration.
    /// - A [`ConfigError::Invalid`] error is returned if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        Self::from_yaml(&yaml)
    }

    /// Control loop period, at least one millisecond.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Ramp step period.
    #[must_use]
    pub const fn ramp_tick(&self) -> Duration {
        Duration::from_millis(self.ramp_tick_ms)
    }

    /// Calibration window.
    #[must_use]
    pub const fn calibration(&self) -> Duration {
        Duration::from_millis(self.calibration_ms)
    }

    /// Background drive limit.
    #[must_use]
    pub const fn background_limit(&self) -> Duration {
        Duration::from_millis(self.background_limit_ms)
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            tick_ms: 10,
            ramp_tick_ms: 50,
            calibration_ms: 1000,
            background_limit_ms: 60_000,
            ramp_boost: 0.2,
            wheel: WheelGeometry::default(),
            yaw_error: YawErrorMode::default(),
            tank: TankBindings::default(),
        }
    }
}

/// Errors that can occur when loading a [`DriveConfig`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[snafu(display("Could not read drive configuration from {}: {source}", path.display()))]
    Read {
        /// The file that was read.
        path: PathBuf,
        /// The source of the error.
        source: std::io::Error,
    },

    /// The configuration was not valid YAML for a [`DriveConfig`].
    #[snafu(display("Invalid drive configuration: {source}"))]
    Parse {
        /// The source of the error.
        source: serde_yaml::Error,
    },

    /// A configuration value was out of range.
    #[snafu(display("Invalid drive configuration: {field} cannot be {value}"))]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}
