//! Helpers for headings measured in degrees.

/// Degrees in one full revolution.
pub const FULL_TURN: f64 = 360.0;

/// Wraps `value` into `[-period / 2, period / 2)`.
#[must_use]
pub fn wrap_signed(value: f64, period: f64) -> f64 {
    let half = period / 2.0;
    let wrapped = (value + half).rem_euclid(period) - half;
    // rem_euclid can round up to exactly `period` for tiny negative inputs.
    if wrapped >= half {
        wrapped - period
    } else {
        wrapped
    }
}

/// Wraps a heading into `[0, 360)` degrees.
///
/// ```
/// use mintspark_math::angle::wrap_degrees;
///
/// assert_eq!(wrap_degrees(-90.0), 270.0);
/// assert_eq!(wrap_degrees(720.0), 0.0);
/// ```
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN);
    if wrapped >= FULL_TURN {
        0.0
    } else {
        wrapped
    }
}

/// Returns the signed change in heading from `from` to `to` along the shortest arc,
/// in `[-180, 180)` degrees. Positive values are clockwise.
#[must_use]
pub fn shortest_difference(from: f64, to: f64) -> f64 {
    wrap_signed(to - from, FULL_TURN)
}
