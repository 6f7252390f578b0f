//! Nearest-point projection: find the parameter whose curve position is
//! closest to an arbitrary point.
//!
//! Linear splines project the query orthogonally onto every segment.
//! Bezier and B-spline splines run a derivative-free bracketing descent per
//! segment (see [`SolverSettings`]); it never diverges where the curve's
//! derivative vanishes, which Newton iteration would. Segments are visited
//! in index order and only a strictly smaller distance replaces the current
//! best, so equal-distance ties always resolve to the lowest segment.

use rayon::prelude::*;
use spl_core::{SolverSettings, Tolerance};
use spl_math::Point3;
use spl_topology::{CurveMode, SegmentLocation};

use crate::curve::SplineCurve;

/// Where a query landed on the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Whole-curve parameter.
    pub t: f64,
    pub segment: usize,
    pub local_t: f64,
    /// World position of the nearest point.
    pub position: Point3,
    pub distance_sq: f64,
}

impl Projection {
    pub fn distance(&self) -> f64 {
        self.distance_sq.sqrt()
    }
}

pub(crate) fn project(curve: &SplineCurve<'_>, query: Point3) -> Projection {
    let topology = curve.topology();
    if topology.is_degenerate() {
        let position = curve.position(0.0);
        return Projection {
            t: 0.0,
            segment: 0,
            local_t: 0.0,
            position,
            distance_sq: position.distance_squared(query),
        };
    }

    let (segment, local_t) = match topology.mode {
        CurveMode::Linear => nearest_on_polyline(curve, query),
        CurveMode::Bezier | CurveMode::BSpline => nearest_by_descent(curve, query),
    };
    let position = curve.segment_position(SegmentLocation { segment, local_t });
    let result = Projection {
        t: topology.to_global(segment, local_t),
        segment,
        local_t,
        position,
        distance_sq: position.distance_squared(query),
    };
    log::trace!(
        "projected {:?} onto {} spline: t={:.6} segment={} distance={:.6}",
        query,
        topology.mode,
        result.t,
        result.segment,
        result.distance()
    );
    result
}

/// Parameter in `[0, 1]` of the point on segment `a..b` closest to `q`.
/// A zero-length segment yields its start.
pub fn closest_on_segment(a: Point3, b: Point3, q: Point3, tolerance: Tolerance) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if tolerance.is_zero(len_sq.sqrt()) {
        return 0.0;
    }
    ((q - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

fn nearest_on_polyline(curve: &SplineCurve<'_>, query: Point3) -> (usize, f64) {
    let topology = curve.topology();
    let points = curve.points();
    let space = curve.space();
    let tolerance = curve.settings().tolerance;

    let mut best = (0, 0.0, f64::INFINITY);
    for segment in 0..topology.segment_count() {
        // Affine maps keep segments straight, so projecting in world space is exact
        let [a, b] = topology.linear_window(segment);
        let pa = space.to_world_point(points[a].position);
        let pb = space.to_world_point(points[b].position);
        let local_t = closest_on_segment(pa, pb, query, tolerance);
        let distance_sq = pa.lerp(pb, local_t).distance_squared(query);
        if distance_sq < best.2 {
            best = (segment, local_t, distance_sq);
        }
    }
    (best.0, best.1)
}

fn nearest_by_descent(curve: &SplineCurve<'_>, query: Point3) -> (usize, f64) {
    let settings = curve.settings();
    let mut best = (0, 0.0, f64::INFINITY);
    for segment in 0..curve.segment_count() {
        let (local_t, distance_sq) = descend(curve, segment, query, settings);
        if distance_sq < best.2 {
            best = (segment, local_t, distance_sq);
        }
    }
    (best.0, best.1)
}

/// Bracketing descent over one segment's local parameter.
///
/// Each round looks at `t - step` and `t + step` (clamped to the segment),
/// moves to whichever is closer than the current point, then shrinks the
/// step. With `shrink >= 0.5` the minimum of a unimodal distance stays
/// within one step of `t`, so the error is bounded by the final step.
fn descend(curve: &SplineCurve<'_>, segment: usize, query: Point3, settings: &SolverSettings) -> (f64, f64) {
    let distance_sq = |local_t: f64| {
        curve
            .segment_position(SegmentLocation { segment, local_t })
            .distance_squared(query)
    };

    let mut t = settings.initial_t.clamp(0.0, 1.0);
    let mut best = distance_sq(t);
    let mut step = settings.initial_step;

    for _ in 0..settings.max_iterations {
        if step < settings.min_step {
            break;
        }
        let lo = (t - step).max(0.0);
        let hi = (t + step).min(1.0);
        let d_lo = distance_sq(lo);
        let d_hi = distance_sq(hi);
        if d_lo <= d_hi && d_lo < best {
            t = lo;
            best = d_lo;
        } else if d_hi < best {
            t = hi;
            best = d_hi;
        }
        step *= settings.shrink;
    }

    (t, best)
}

/// Project many independent queries on the rayon pool. Output order
/// matches `queries`.
pub fn project_many_par(curve: &SplineCurve<'_>, queries: &[Point3]) -> Vec<Projection> {
    queries.par_iter().map(|&q| project(curve, q)).collect()
}
