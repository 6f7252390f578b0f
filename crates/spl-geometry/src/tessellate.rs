//! Sampling utilities for consumers that turn a curve into discrete points
//! (ribbon and tube builders, debug drawing, followers).

use rayon::prelude::*;
use spl_math::Point3;

use crate::arc_length::ArcLengthTable;
use crate::curve::{Curve, SplineCurve};
use crate::point::PointSample;

/// Convert a curve to a polyline using adaptive subdivision.
///
/// The algorithm recursively subdivides segments where the midpoint deviation
/// from the chord exceeds the given `tolerance`.
pub fn curve_to_polyline(curve: &dyn Curve, tolerance: f64) -> Vec<Point3> {
    let (t_min, t_max) = curve.domain();
    let mut points = vec![curve.point_at(t_min)];
    // Seed with a few spans so a chord that happens to pass through the
    // curve's midpoint does not end the subdivision immediately.
    let spans = 4;
    for i in 0..spans {
        let t0 = t_min + (t_max - t_min) * i as f64 / spans as f64;
        let t1 = t_min + (t_max - t_min) * (i + 1) as f64 / spans as f64;
        subdivide_curve(curve, t0, t1, tolerance, &mut points, 0);
    }
    points
}

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

fn subdivide_curve(
    curve: &dyn Curve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<Point3>,
    depth: u32,
) {
    let end = curve.point_at(t1);
    if depth >= MAX_DEPTH {
        points.push(end);
        return;
    }

    let t_mid = (t0 + t1) * 0.5;
    let chord_mid = (curve.point_at(t0) + end) * 0.5;
    let deviation = (curve.point_at(t_mid) - chord_mid).length();

    if deviation > tolerance {
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1);
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1);
    } else {
        points.push(end);
    }
}

/// Parameter step for `count` evenly spaced samples. Open curves include
/// both ends; closed curves stop one step short of `t = 1`, which repeats
/// `t = 0`.
fn uniform_divisor(closed: bool, count: usize) -> f64 {
    match (closed, count) {
        (_, 0 | 1) => 1.0,
        (true, n) => n as f64,
        (false, n) => (n - 1) as f64,
    }
}

/// Evaluate `count` samples at uniform parameter steps.
pub fn sample_uniform(curve: &SplineCurve<'_>, count: usize) -> Vec<PointSample> {
    let divisor = uniform_divisor(curve.is_closed(), count);
    (0..count).map(|i| curve.evaluate(i as f64 / divisor)).collect()
}

/// [`sample_uniform`] on the rayon pool. Each evaluation is independent, so
/// the result is identical to the serial version.
pub fn sample_uniform_par(curve: &SplineCurve<'_>, count: usize) -> Vec<PointSample> {
    let divisor = uniform_divisor(curve.is_closed(), count);
    (0..count)
        .into_par_iter()
        .map(|i| curve.evaluate(i as f64 / divisor))
        .collect()
}

/// Samples spaced `spacing` apart along the curve, measured with `table`.
/// The last sample sits at the end of the curve.
pub fn sample_by_distance(curve: &SplineCurve<'_>, table: &ArcLengthTable, spacing: f64) -> Vec<PointSample> {
    let total = table.total_length();
    if spacing.is_nan() || spacing <= 0.0 || total <= 0.0 {
        return vec![curve.evaluate(0.0)];
    }

    let steps = (total / spacing).floor() as usize;
    let mut samples: Vec<PointSample> = (0..=steps)
        .map(|i| curve.evaluate(table.distance_to_t(i as f64 * spacing)))
        .collect();
    if total - steps as f64 * spacing > 1e-9 {
        samples.push(curve.evaluate(table.distance_to_t(total)));
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::ControlPoint;
    use spl_math::{dvec3, DVec3};
    use spl_topology::CurveMode;

    fn points(raw: &[(f64, f64, f64)]) -> Vec<ControlPoint> {
        raw.iter()
            .map(|&(x, y, z)| ControlPoint::from_position(dvec3(x, y, z)))
            .collect()
    }

    #[test]
    fn test_curve_to_polyline_line() {
        let pts = points(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let curve = SplineCurve::new(&pts, CurveMode::Linear, false);
        let poly = curve_to_polyline(&curve, 0.01);
        // A straight line needs no subdivision beyond the seed spans
        assert_eq!(poly.len(), 5);
        assert!((poly[0] - DVec3::ZERO).length() < 1e-10);
        assert!((poly[4] - dvec3(10.0, 0.0, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_curve_to_polyline_bezier_refines() {
        let pts = points(&[(0.0, 0.0, 0.0), (0.0, 4.0, 0.0), (6.0, 4.0, 0.0), (6.0, 0.0, 0.0)]);
        let curve = SplineCurve::new(&pts, CurveMode::Bezier, false);
        let coarse = curve_to_polyline(&curve, 0.5);
        let fine = curve_to_polyline(&curve, 0.001);
        assert!(fine.len() > coarse.len());
        for p in &fine {
            let t = curve.project(*p);
            assert!((curve.position(t) - *p).length() < 1e-3);
        }
    }

    #[test]
    fn test_sample_uniform_open_includes_ends() {
        let pts = points(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let curve = SplineCurve::new(&pts, CurveMode::Linear, false);
        let samples = sample_uniform(&curve, 5);
        assert_eq!(samples.len(), 5);
        assert!((samples[4].position - dvec3(10.0, 0.0, 0.0)).length() < 1e-12);
        assert!((samples[1].position - dvec3(2.5, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_sample_uniform_closed_skips_duplicate_end() {
        let pts = points(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 4.0, 0.0), (0.0, 4.0, 0.0), (0.0, 0.0, 0.0)]);
        let curve = SplineCurve::new(&pts, CurveMode::Linear, true);
        let samples = sample_uniform(&curve, 4);
        assert!((samples[1].position - dvec3(4.0, 0.0, 0.0)).length() < 1e-12);
        assert!((samples[3].position - dvec3(0.0, 4.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_par_matches_serial() {
        let pts = points(&[(0.0, 0.0, 0.0), (2.0, 3.0, 0.0), (5.0, 1.0, 2.0), (7.0, 0.0, 0.0)]);
        let curve = SplineCurve::new(&pts, CurveMode::BSpline, true);
        assert_eq!(sample_uniform(&curve, 64), sample_uniform_par(&curve, 64));
    }

    #[test]
    fn test_sample_by_distance_is_even() {
        let pts = points(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 5.0, 0.0)]);
        let curve = SplineCurve::new(&pts, CurveMode::Linear, false);
        let table = curve.arc_length_table(300);
        let samples = sample_by_distance(&curve, &table, 1.0);
        // 15 units long: 16 samples, every step 1 unit of path
        assert_eq!(samples.len(), 16);
        assert!((samples[12].position - dvec3(10.0, 2.0, 0.0)).length() < 1e-9);
        assert!((samples[15].position - dvec3(10.0, 5.0, 0.0)).length() < 1e-9);
    }
}
