//! Conversions between wheel rotation and distance travelled.

use core::f64::consts::PI;

/// Diameter of the stock wheels shipped with the robotics kit, in millimeters.
pub const DEFAULT_WHEEL_DIAMETER_MM: f64 = 56.0;

/// Linear relationship between wheel rotation and ground distance.
///
/// ```
/// use mintspark_math::wheel::WheelGeometry;
///
/// let wheel = WheelGeometry::from_diameter(100.0);
/// let degrees = wheel.degrees_for_distance(500.0);
/// assert!((wheel.distance_for_degrees(degrees) - 500.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WheelGeometry {
    /// Degrees of wheel rotation per millimeter of travel.
    pub degrees_per_mm: f64,
}

impl WheelGeometry {
    /// Creates a geometry from a known rotation-per-distance constant.
    #[must_use]
    pub const fn from_degrees_per_mm(degrees_per_mm: f64) -> Self {
        Self { degrees_per_mm }
    }

    /// Creates a geometry from a wheel diameter in millimeters.
    #[must_use]
    pub fn from_diameter(diameter_mm: f64) -> Self {
        Self::from_degrees_per_mm(360.0 / (PI * diameter_mm))
    }

    /// Degrees of wheel rotation needed to travel `distance_mm`.
    #[must_use]
    pub fn degrees_for_distance(&self, distance_mm: f64) -> f64 {
        distance_mm * self.degrees_per_mm
    }

    /// Distance travelled in millimeters after `degrees` of wheel rotation.
    #[must_use]
    pub fn distance_for_degrees(&self, degrees: f64) -> f64 {
        degrees / self.degrees_per_mm
    }
}

impl Default for WheelGeometry {
    fn default() -> Self {
        Self::from_diameter(DEFAULT_WHEEL_DIAMETER_MM)
    }
}
