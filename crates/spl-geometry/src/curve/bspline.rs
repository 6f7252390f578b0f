//! Uniform cubic B-spline segments.
//!
//! Orientation is not a true rotation spline: the forward and up axes of
//! each control rotation are blended with the same basis as positions and
//! a rotation is rebuilt from them with [`look_rotation`].

use spl_math::{look_rotation, Point3, Vector3};
use spl_topology::{BSplineSlot, SegmentLocation, Topology};

use crate::point::{ControlPoint, PointSample};

/// Uniform cubic B-spline weights for the window `[i - 1, i, i + 1, i + 2]`.
fn basis(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let u = 1.0 - t;
    [
        u * u * u / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

/// The vector quantities the basis is applied to.
#[derive(Clone, Copy)]
struct Frame {
    position: Point3,
    forward: Vector3,
    up: Vector3,
    scale: Vector3,
}

impl Frame {
    fn of(point: &ControlPoint) -> Self {
        Self {
            position: point.position,
            forward: point.forward(),
            up: point.up(),
            scale: point.scale,
        }
    }

    fn extrapolate(near: Self, next: Self) -> Self {
        let reflect = |n: Vector3, x: Vector3| n + (n - x);
        Self {
            position: reflect(near.position, next.position),
            forward: reflect(near.forward, next.forward),
            up: reflect(near.up, next.up),
            scale: reflect(near.scale, next.scale),
        }
    }
}

fn slot_position(points: &[ControlPoint], slot: BSplineSlot) -> Point3 {
    match slot {
        BSplineSlot::Point(i) => points[i].position,
        BSplineSlot::Extrapolated { near, next } => {
            let near = points[near].position;
            near + (near - points[next].position)
        }
    }
}

fn slot_frame(points: &[ControlPoint], slot: BSplineSlot) -> Frame {
    match slot {
        BSplineSlot::Point(i) => Frame::of(&points[i]),
        BSplineSlot::Extrapolated { near, next } => {
            Frame::extrapolate(Frame::of(&points[near]), Frame::of(&points[next]))
        }
    }
}

pub(crate) fn position(points: &[ControlPoint], topology: &Topology, loc: SegmentLocation) -> Point3 {
    let window = topology.bspline_window(loc.segment);
    basis(loc.local_t)
        .iter()
        .zip(window)
        .fold(Point3::ZERO, |acc, (&w, slot)| acc + w * slot_position(points, slot))
}

pub(crate) fn sample(points: &[ControlPoint], topology: &Topology, loc: SegmentLocation) -> PointSample {
    let window = topology.bspline_window(loc.segment);
    let weights = basis(loc.local_t);

    let mut position = Point3::ZERO;
    let mut forward = Vector3::ZERO;
    let mut up = Vector3::ZERO;
    let mut scale = Vector3::ZERO;
    for (&w, slot) in weights.iter().zip(window) {
        let frame = slot_frame(points, slot);
        position += w * frame.position;
        forward += w * frame.forward;
        up += w * frame.up;
        scale += w * frame.scale;
    }

    let orientation = if forward.length_squared() < 1e-18 {
        // Opposing rotations cancelled out; keep the segment start's
        points[loc.segment.min(points.len() - 1)].orientation
    } else {
        look_rotation(forward, up)
    };

    PointSample {
        position,
        orientation,
        scale,
        tangent: Vector3::Z,
    }
}
