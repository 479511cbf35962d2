//! Assertion utilities for testing.
//!
//! This module provides helper functions for making assertions in tests,
//! particularly for floating-point and coordinate comparisons.

use geo::CoordsIter;
use geo_types::Geometry;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that two geometries have the same shape and coordinates within `epsilon`.
///
/// Coordinates that are non-finite on both sides are considered equal.
///
/// # Panics
///
/// Panics if the coordinate counts differ or any pair of coordinates differs
/// by more than `epsilon`.
pub fn assert_geometry_approx_eq(actual: &Geometry<f64>, expected: &Geometry<f64>, epsilon: f64) {
    assert_eq!(
        actual.coords_count(),
        expected.coords_count(),
        "Geometries have different coordinate counts"
    );

    for (i, (a, e)) in actual.coords_iter().zip(expected.coords_iter()).enumerate() {
        for (va, ve) in [(a.x, e.x), (a.y, e.y)] {
            if !va.is_finite() && !ve.is_finite() {
                continue;
            }
            let diff = (va - ve).abs();
            assert!(
                diff <= epsilon,
                "Coordinates differ at index {}: actual = {:?}, expected = {:?}, epsilon = {}",
                i,
                a,
                e,
                epsilon
            );
        }
    }
}

/// Assert that `returned` is `original` (longitude/latitude degrees) after a
/// trip through `projected` and back.
///
/// Coordinates the projection could not represent (non-finite in `projected`)
/// are skipped. Longitudes compare modulo 360, and not at all at the poles,
/// where every longitude names the same point. Returns how many coordinates
/// were compared.
pub fn assert_lonlat_round_trip(
    original: &Geometry<f64>,
    projected: &Geometry<f64>,
    returned: &Geometry<f64>,
    epsilon: f64,
) -> usize {
    assert_eq!(original.coords_count(), projected.coords_count());
    assert_eq!(original.coords_count(), returned.coords_count());

    let mut compared = 0;
    for ((o, p), r) in original
        .coords_iter()
        .zip(projected.coords_iter())
        .zip(returned.coords_iter())
    {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }
        let lat_diff = (r.y - o.y).abs();
        let lon_diff = ((r.x - o.x).rem_euclid(360.0) + 180.0).rem_euclid(360.0) - 180.0;
        let at_pole = (o.y.abs() - 90.0).abs() <= epsilon;
        assert!(
            lat_diff <= epsilon && (at_pole || lon_diff.abs() <= epsilon),
            "Round trip moved {:?} to {:?} (via {:?}), epsilon = {}",
            o,
            r,
            p,
            epsilon
        );
        compared += 1;
    }
    compared
}

/// Assert that a value is within expected bounds (inclusive).
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        actual >= min && actual <= max,
        "Value not in range: actual = {}, min = {}, max = {}",
        actual,
        min,
        max
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::point;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.0000001, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_geometry_approx_eq() {
        let a: Geometry<f64> = point!(x: 1.0, y: 2.0).into();
        let b: Geometry<f64> = point!(x: 1.0 + 1e-9, y: 2.0).into();
        assert_geometry_approx_eq(&a, &b, 1e-6);
    }

    #[test]
    fn test_assert_lonlat_round_trip() {
        let original: Geometry<f64> = geo_types::line_string![
            (x: 180.0, y: -16.0),
            (x: 45.0, y: -90.0),
            (x: 0.0, y: 90.0),
        ]
        .into();
        let projected: Geometry<f64> = geo_types::line_string![
            (x: 1.0, y: 1.0),
            (x: 2.0, y: 2.0),
            (x: f64::NAN, y: f64::NAN),
        ]
        .into();
        let returned: Geometry<f64> = geo_types::line_string![
            (x: -180.0, y: -16.0),
            (x: 0.0, y: -90.0),
            (x: f64::NAN, y: f64::NAN),
        ]
        .into();
        assert_eq!(assert_lonlat_round_trip(&original, &projected, &returned, 1e-6), 2);
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range(5.0, 0.0, 10.0);
        assert_in_range(0.0, 0.0, 10.0);
        assert_in_range(10.0, 0.0, 10.0);
    }
}
