//! Piecewise-linear segments.

use spl_math::Point3;
use spl_topology::{SegmentLocation, Topology};

use crate::point::{ControlPoint, PointSample};

pub(crate) fn position(points: &[ControlPoint], topology: &Topology, loc: SegmentLocation) -> Point3 {
    let [a, b] = topology.linear_window(loc.segment);
    points[a].position.lerp(points[b].position, loc.local_t)
}

pub(crate) fn sample(points: &[ControlPoint], topology: &Topology, loc: SegmentLocation) -> PointSample {
    let [a, b] = topology.linear_window(loc.segment);
    PointSample::from_point(&points[a].lerp(&points[b], loc.local_t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_math::{dvec3, DQuat, Vector3};
    use spl_topology::CurveMode;

    #[test]
    fn test_linear_blend() {
        let points = [
            ControlPoint::new(Point3::ZERO, DQuat::IDENTITY, Vector3::ONE),
            ControlPoint::new(dvec3(10.0, 0.0, 0.0), DQuat::from_rotation_z(1.0), Vector3::splat(3.0)),
        ];
        let topo = Topology::resolve(CurveMode::Linear, false, 2);
        let loc = SegmentLocation {
            segment: 0,
            local_t: 0.25,
        };
        let s = sample(&points, &topo, loc);
        assert!((s.position - dvec3(2.5, 0.0, 0.0)).length() < 1e-12);
        assert!((s.scale - Vector3::splat(1.5)).length() < 1e-12);
        assert!(s.orientation.dot(DQuat::from_rotation_z(0.25)).abs() > 1.0 - 1e-12);
        assert_eq!(position(&points, &topo, loc), s.position);
    }
}
