//! # Geographic Utilities
//!
//! Unit conversions and coordinate identity helpers shared by the normalizer,
//! the label fuser and the inverter.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`deg_to_rad`] | Degrees to radians, applied once at ingestion |
//! | [`rad_to_deg`] | Radians back to degrees, applied on output |
//! | [`round_to`] | Round to a fixed number of decimal places |
//! | [`QuantizedCoordinateKey`] | Exact-match join key in degree space |
//! | [`make_relevant_name`] | Sanitize a track name for output naming |
//!
//! ## Example
//!
//! ```rust
//! use track_labeler::geo_utils::{deg_to_rad, rad_to_deg, make_relevant_name};
//!
//! let rad = deg_to_rad(51.5074);
//! assert!((rad_to_deg(rad) - 51.5074).abs() < 1e-12);
//!
//! assert_eq!(make_relevant_name("Trip #1 (east)"), "trip1east");
//! ```
//!
//! ## Coordinate System
//!
//! GPX documents always carry WGS84 degrees. Everything inside the crate stores
//! radians; quantization for matching is defined in degree space.

use std::f64::consts::PI;

/// Default quantization scale: 1e-6 degrees, about 0.11 m at the equator.
pub const DEFAULT_QUANTIZATION_SCALE: f64 = 1e6;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Convert degrees to radians (`deg * π / 180`).
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees (`rad * 180 / π`).
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Round `value` to `decimals` decimal places.
///
/// Exact halfway cases round to the even neighbour, so `7.25` becomes `7.2`.
///
/// ```rust
/// use track_labeler::geo_utils::round_to;
/// assert_eq!(round_to(123.456, 1), 123.5);
/// ```
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

// =============================================================================
// Coordinate Identity
// =============================================================================

/// Join key used to decide whether two points sit at the "same" location.
///
/// Built from `(round(lat_deg * scale), round(lon_deg * scale))`. Two points
/// with equal keys are considered identical regardless of which track they
/// came from. There is no spatial tolerance beyond the quantization itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantizedCoordinateKey {
    pub lat: i64,
    pub lon: i64,
}

impl QuantizedCoordinateKey {
    /// Build a key from coordinates in degrees.
    pub fn from_degrees(lat_deg: f64, lon_deg: f64, scale: f64) -> Self {
        Self {
            lat: (lat_deg * scale).round() as i64,
            lon: (lon_deg * scale).round() as i64,
        }
    }

    /// Build a key from stored radians. Converts back to degrees first.
    pub fn from_radians(lat_rad: f64, lon_rad: f64, scale: f64) -> Self {
        Self::from_degrees(rad_to_deg(lat_rad), rad_to_deg(lon_rad), scale)
    }
}

// =============================================================================
// Naming
// =============================================================================

/// Keep only alphanumeric characters and lowercase the result.
///
/// The sanitized name identifies a multi-file track and is used for every
/// output file derived from it.
pub fn make_relevant_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_deg_rad_round_trip() {
        for d in [-180.0, -90.0, -45.123456, 0.0, 0.000001, 10.0, 51.5074, 179.999999] {
            assert!(approx_eq(rad_to_deg(deg_to_rad(d)), d, 1e-9), "{}", d);
        }
    }

    #[test]
    fn test_deg_to_rad_known_values() {
        assert!(approx_eq(deg_to_rad(180.0), PI, 1e-15));
        assert!(approx_eq(deg_to_rad(90.0), PI / 2.0, 1e-15));
        assert_eq!(deg_to_rad(0.0), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(5.04, 1), 5.0);
        assert_eq!(round_to(5.06, 1), 5.1);
        assert_eq!(round_to(-3.26, 1), -3.3);
        assert_eq!(round_to(7.0, 1), 7.0);
        // exact halves go to the even digit
        assert_eq!(round_to(7.25, 1), 7.2);
        assert_eq!(round_to(2.25, 1), 2.2);
        assert_eq!(round_to(0.75, 1), 0.8);
        assert_eq!(round_to(1000.25, 1), 1000.2);
    }

    #[test]
    fn test_key_from_radians_matches_degrees() {
        let from_deg = QuantizedCoordinateKey::from_degrees(10.0, 20.0, DEFAULT_QUANTIZATION_SCALE);
        let from_rad = QuantizedCoordinateKey::from_radians(
            deg_to_rad(10.0),
            deg_to_rad(20.0),
            DEFAULT_QUANTIZATION_SCALE,
        );
        assert_eq!(from_deg, from_rad);
        assert_eq!(from_deg, QuantizedCoordinateKey { lat: 10_000_000, lon: 20_000_000 });
    }

    #[test]
    fn test_key_resolution() {
        let scale = DEFAULT_QUANTIZATION_SCALE;
        let a = QuantizedCoordinateKey::from_degrees(51.5074001, -0.1278, scale);
        let b = QuantizedCoordinateKey::from_degrees(51.5074004, -0.1278, scale);
        let c = QuantizedCoordinateKey::from_degrees(51.507402, -0.1278, scale);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_make_relevant_name() {
        assert_eq!(make_relevant_name("Trip #1 (east)"), "trip1east");
        assert_eq!(make_relevant_name("Morning Run 2023-05-01"), "morningrun20230501");
        assert_eq!(make_relevant_name("Прогулка 7"), "прогулка7");
        assert_eq!(make_relevant_name("!!!"), "");
    }
}
