//! Curve trait and the spline evaluator.

mod bezier;
mod bspline;
mod linear;

use spl_core::SolverSettings;
use spl_math::{safe_normalize, Point3, Space, Vector3};
use spl_topology::{CurveMode, SegmentLocation, Topology};

use crate::arc_length::ArcLengthTable;
use crate::point::{ControlPoint, PointSample};
use crate::project::{self, Projection};

pub use bezier::split_segment;

/// Trait for parametric curves in 3D space.
pub trait Curve: Send + Sync {
    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point3;

    /// Evaluate the tangent vector at parameter `t`.
    fn tangent_at(&self, t: f64) -> Vector3;

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Whether the curve is closed (start == end).
    fn is_closed(&self) -> bool {
        false
    }
}

/// Read-only view of a control point array as a curve.
///
/// Holds no state of its own beyond what it borrows, so it is cheap to
/// build per query and safe to share between threads. All results are in
/// world space; with [`Space::Local`] the stored coordinates are mapped
/// through the supplied transform.
///
/// Queries on a point array too small for its mode never fail: they return
/// the first stored point, or the origin when the array is empty.
#[derive(Debug, Clone, Copy)]
pub struct SplineCurve<'a> {
    points: &'a [ControlPoint],
    topology: Topology,
    space: Space,
    settings: SolverSettings,
}

impl<'a> SplineCurve<'a> {
    pub fn new(points: &'a [ControlPoint], mode: CurveMode, closed: bool) -> Self {
        Self {
            points,
            topology: Topology::resolve(mode, closed, points.len()),
            space: Space::World,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_space(mut self, space: Space) -> Self {
        self.space = space;
        self
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn points(&self) -> &'a [ControlPoint] {
        self.points
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn mode(&self) -> CurveMode {
        self.topology.mode
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn segment_count(&self) -> usize {
        self.topology.segment_count()
    }

    /// Stand-in for every query on a degenerate point array.
    fn fallback_point(&self) -> ControlPoint {
        self.points.first().copied().unwrap_or_default()
    }

    /// Position on stored coordinates, before the space transform.
    pub(crate) fn segment_local_position(&self, loc: SegmentLocation) -> Point3 {
        if self.topology.is_degenerate() {
            return self.fallback_point().position;
        }
        match self.topology.mode {
            CurveMode::Linear => linear::position(self.points, &self.topology, loc),
            CurveMode::Bezier => bezier::position(self.points, &self.topology, loc),
            CurveMode::BSpline => bspline::position(self.points, &self.topology, loc),
        }
    }

    /// World position inside one segment. Inner loop of the projection
    /// solver and the arc-length table.
    pub fn segment_position(&self, loc: SegmentLocation) -> Point3 {
        self.space.to_world_point(self.segment_local_position(loc))
    }

    /// Position on stored coordinates at whole-curve parameter `t`.
    pub fn local_position(&self, t: f64) -> Point3 {
        self.segment_local_position(self.topology.locate(t))
    }

    /// World position at `t`. Cheaper than [`SplineCurve::evaluate`] when
    /// orientation, scale and tangent are not needed.
    pub fn position(&self, t: f64) -> Point3 {
        self.space.to_world_point(self.local_position(t))
    }

    /// Full sample at `t` in world space.
    pub fn evaluate(&self, t: f64) -> PointSample {
        let local = if self.topology.is_degenerate() {
            PointSample::from_point(&self.fallback_point())
        } else {
            let loc = self.topology.locate(t);
            match self.topology.mode {
                CurveMode::Linear => linear::sample(self.points, &self.topology, loc),
                CurveMode::Bezier => bezier::sample(self.points, &self.topology, loc),
                CurveMode::BSpline => bspline::sample(self.points, &self.topology, loc),
            }
        };
        PointSample {
            tangent: self.forward(t),
            ..local.to_world(&self.space)
        }
    }

    /// Unit direction of travel at `t`, from a central difference of world
    /// positions. Open splines use a one-sided difference at their ends.
    /// Returns +Z where the curve is stationary.
    pub fn forward(&self, t: f64) -> Vector3 {
        let eps = self.settings.tangent_epsilon;
        let before = self.position(t - eps);
        let after = self.position(t + eps);
        safe_normalize(after - before, Vector3::Z)
    }

    /// Parameter of the point on the curve nearest to the world-space
    /// `query`.
    pub fn project(&self, query: Point3) -> f64 {
        self.project_detailed(query).t
    }

    /// Like [`SplineCurve::project`], also reporting where the nearest point
    /// is and how far away it lies.
    pub fn project_detailed(&self, query: Point3) -> Projection {
        project::project(self, query)
    }

    /// Build an arc-length table at `resolution` uniform steps.
    pub fn arc_length_table(&self, resolution: usize) -> ArcLengthTable {
        ArcLengthTable::build(self, resolution)
    }
}

impl Curve for SplineCurve<'_> {
    fn point_at(&self, t: f64) -> Point3 {
        self.position(t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        self.forward(t)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        self.topology.closed
    }
}
