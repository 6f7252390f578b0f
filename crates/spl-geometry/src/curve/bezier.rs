//! Cubic Bezier segments.

use spl_math::{quad_slerp, Point3, Vector3};
use spl_topology::{SegmentLocation, Topology};

use crate::point::{ControlPoint, PointSample};

/// Cubic Bernstein weights.
fn bernstein(t: f64) -> [f64; 4] {
    let u = 1.0 - t;
    [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t]
}

fn blend(weights: &[f64; 4], values: [Vector3; 4]) -> Vector3 {
    weights
        .iter()
        .zip(values)
        .fold(Vector3::ZERO, |acc, (&w, v)| acc + w * v)
}

pub(crate) fn position(points: &[ControlPoint], topology: &Topology, loc: SegmentLocation) -> Point3 {
    let w = topology.bezier_window(loc.segment);
    blend(&bernstein(loc.local_t), w.map(|i| points[i].position))
}

/// Position and scale use the Bernstein basis; orientation uses nested
/// slerps over the four control rotations.
pub(crate) fn sample(points: &[ControlPoint], topology: &Topology, loc: SegmentLocation) -> PointSample {
    let w = topology.bezier_window(loc.segment);
    let weights = bernstein(loc.local_t);
    let [q0, q1, q2, q3] = w.map(|i| points[i].orientation);
    PointSample {
        position: blend(&weights, w.map(|i| points[i].position)),
        orientation: quad_slerp(q0, q1, q2, q3, loc.local_t),
        scale: blend(&weights, w.map(|i| points[i].scale)),
        tangent: Vector3::Z,
    }
}

/// Split the segment starting at `points[0]` at `t` (De Casteljau).
///
/// Returns the replacement for the segment's two handles plus the three new
/// points to insert between them: `[left_handle, new_in, new_anchor,
/// new_out, right_handle]`. The curve shape is unchanged by the split.
pub fn split_segment(points: [ControlPoint; 4], t: f64) -> [ControlPoint; 5] {
    let [p0, p1, p2, p3] = points;
    let p01 = p0.lerp(&p1, t);
    let p12 = p1.lerp(&p2, t);
    let p23 = p2.lerp(&p3, t);
    let p012 = p01.lerp(&p12, t);
    let p123 = p12.lerp(&p23, t);
    let anchor = p012.lerp(&p123, t);
    [p01, p012, anchor, p123, p23]
}
