use serde::{Deserialize, Serialize};
use spl_core::error::{Result, SplError};
use spl_core::traits::{BoundingBox, Validate};
use spl_core::SolverSettings;
use spl_geometry::{ArcLengthTable, ControlPoint, PointSample, Projection, SplineCurve};
use spl_math::{Aabb3, Point3, Space, Vector3};
use spl_topology::{CurveMode, Topology};

use crate::observer::{Callback, ObserverId, Observers, SplineChange, SplineEvent};

/// Serializable contents of a [`Spline`]: everything except revision
/// tracking and observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineData {
    pub points: Vec<ControlPoint>,
    #[serde(default)]
    pub mode: CurveMode,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub space: Space,
}

/// A control point store together with the curve mode, loop flag and
/// coordinate space that give it a shape.
///
/// Queries borrow the store through a [`SplineCurve`] and never fail.
/// Mutations (see the `mutate` module) return [`Result`], bump
/// [`Spline::revision`] and notify observers.
#[derive(Debug)]
pub struct Spline {
    pub(crate) points: Vec<ControlPoint>,
    pub(crate) mode: CurveMode,
    pub(crate) closed: bool,
    space: Space,
    settings: SolverSettings,
    revision: u64,
    observers: Observers,
}

impl Spline {
    pub fn new(mode: CurveMode) -> Self {
        Self {
            points: Vec::new(),
            mode,
            closed: false,
            space: Space::World,
            settings: SolverSettings::default(),
            revision: 0,
            observers: Observers::default(),
        }
    }

    /// Build an open spline from stored points. Fails if the count is not
    /// valid for `mode` or a point is not finite.
    pub fn from_points(mode: CurveMode, points: Vec<ControlPoint>) -> Result<Self> {
        Self::from_data(SplineData {
            points,
            mode,
            closed: false,
            space: Space::World,
        })
    }

    /// Open spline through `positions`. Bezier splines get straight handles.
    pub fn from_positions(mode: CurveMode, positions: &[Point3]) -> Result<Self> {
        let mut spline = Self::new(mode);
        for &p in positions {
            spline.append(ControlPoint::from_position(p))?;
        }
        spline.revision = 0;
        Ok(spline)
    }

    pub fn from_data(data: SplineData) -> Result<Self> {
        let spline = Self {
            points: data.points,
            mode: data.mode,
            closed: data.closed,
            space: data.space,
            ..Self::new(data.mode)
        };
        spline.validate()?;
        Ok(spline)
    }

    pub fn to_data(&self) -> SplineData {
        SplineData {
            points: self.points.clone(),
            mode: self.mode,
            closed: self.closed,
            space: self.space,
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

    // --- Accessors ---

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mode(&self) -> CurveMode {
        self.mode
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn space(&self) -> Space {
        self.space
    }

    /// Move the curve in the world without touching stored points. World
    /// positions and lengths all change, so this bumps the revision like a
    /// mutation. Setting the current space does nothing.
    pub fn set_space(&mut self, space: Space) {
        if space == self.space {
            return;
        }
        self.space = space;
        self.commit(SplineChange::SpaceChanged);
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Settings tune solvers only; positions, and with them arc-length
    /// tables, do not depend on them.
    pub fn set_settings(&mut self, settings: SolverSettings) {
        self.settings = settings;
    }

    /// Incremented by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn topology(&self) -> Topology {
        Topology::resolve(self.mode, self.closed, self.points.len())
    }

    pub fn segment_count(&self) -> usize {
        self.topology().segment_count()
    }

    pub fn anchor_count(&self) -> usize {
        self.topology().anchor_count()
    }

    // --- Queries ---

    /// Borrowed curve view using this spline's space and settings.
    pub fn curve(&self) -> SplineCurve<'_> {
        self.curve_with(&self.settings)
    }

    pub fn curve_with(&self, settings: &SolverSettings) -> SplineCurve<'_> {
        SplineCurve::new(&self.points, self.mode, self.closed)
            .with_space(self.space)
            .with_settings(*settings)
    }

    /// Curve over the stored coordinates, ignoring the space.
    pub(crate) fn local_curve(&self) -> SplineCurve<'_> {
        SplineCurve::new(&self.points, self.mode, self.closed).with_settings(self.settings)
    }

    pub fn evaluate(&self, t: f64) -> PointSample {
        self.curve().evaluate(t)
    }

    pub fn evaluate_with(&self, t: f64, settings: &SolverSettings) -> PointSample {
        self.curve_with(settings).evaluate(t)
    }

    pub fn position(&self, t: f64) -> Point3 {
        self.curve().position(t)
    }

    pub fn forward(&self, t: f64) -> Vector3 {
        self.curve().forward(t)
    }

    pub fn forward_with(&self, t: f64, settings: &SolverSettings) -> Vector3 {
        self.curve_with(settings).forward(t)
    }

    pub fn project(&self, query: Point3) -> f64 {
        self.curve().project(query)
    }

    pub fn project_with(&self, query: Point3, settings: &SolverSettings) -> f64 {
        self.curve_with(settings).project(query)
    }

    pub fn project_detailed(&self, query: Point3) -> Projection {
        self.curve().project_detailed(query)
    }

    /// Arc-length table at the configured default resolution.
    pub fn arc_length_table(&self) -> ArcLengthTable {
        self.curve().arc_length_table(self.settings.default_resolution)
    }

    pub fn arc_length_table_with(&self, settings: &SolverSettings) -> ArcLengthTable {
        self.curve_with(settings).arc_length_table(settings.default_resolution)
    }

    // --- Observers ---

    pub fn subscribe(&mut self, callback: impl FnMut(&SplineEvent) + Send + 'static) -> ObserverId {
        let callback: Callback = Box::new(callback);
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Record a finished mutation.
    pub(crate) fn commit(&mut self, change: SplineChange) {
        self.revision += 1;
        log::debug!(
            "{} spline revision {}: {:?} ({} points)",
            self.mode,
            self.revision,
            change,
            self.points.len()
        );
        let event = SplineEvent {
            revision: self.revision,
            change,
        };
        self.observers.notify(&event);
    }
}

impl Default for Spline {
    fn default() -> Self {
        Self::new(CurveMode::default())
    }
}

impl Validate for Spline {
    fn validate(&self) -> Result<()> {
        let count = self.points.len();
        if !self.mode.is_valid_count(count) {
            return Err(SplError::InvalidPointCount {
                mode: self.mode.name(),
                count,
            });
        }
        if let Some(index) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(SplError::NonFinite(format!("control point {index}")));
        }
        let required = self.mode.min_points() + self.mode.closing_points();
        if self.closed && count < required {
            return Err(SplError::InsufficientPoints { required, actual: count });
        }
        if self.closed && self.mode.closing_points() > 0 {
            let first = self.points[0].position;
            let last = self.points[count - 1].position;
            if !self.settings.tolerance.points_eq(first.distance_squared(last)) {
                return Err(SplError::InvalidOperation(format!(
                    "closed {} spline does not end on its first point",
                    self.mode
                )));
            }
        }
        Ok(())
    }
}

impl BoundingBox for Spline {
    type Point = Point3;

    /// World-space bounds of the stored points. Bezier handles are
    /// included, so the box contains the curve. Empty splines report a
    /// zero box at the origin.
    fn bounding_box(&self) -> (Point3, Point3) {
        let world = self.points.iter().map(|p| self.space.to_world_point(p.position));
        match Aabb3::from_points(world) {
            Some(aabb) => (aabb.min, aabb.max),
            None => (Point3::ZERO, Point3::ZERO),
        }
    }
}
