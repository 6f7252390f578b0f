use serde::{Deserialize, Serialize};

/// Curve family. Decides the basis function and which stored points are
/// anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveMode {
    /// Straight segments between consecutive points.
    #[default]
    Linear,
    /// Cubic segments of 4 points sharing their end anchors; indices that
    /// are a multiple of 3 are anchors, the rest are handles.
    Bezier,
    /// Uniform cubic B-spline; every point is a control point.
    BSpline,
}

impl CurveMode {
    pub fn name(self) -> &'static str {
        match self {
            CurveMode::Linear => "linear",
            CurveMode::Bezier => "bezier",
            CurveMode::BSpline => "bspline",
        }
    }

    /// Fewest points that describe at least one segment.
    pub fn min_points(self) -> usize {
        match self {
            CurveMode::Linear | CurveMode::BSpline => 2,
            CurveMode::Bezier => 4,
        }
    }

    /// Points added to the tail when an open spline is closed.
    pub fn closing_points(self) -> usize {
        match self {
            CurveMode::Linear => 1,
            CurveMode::Bezier => 3,
            CurveMode::BSpline => 0,
        }
    }

    /// Whether `count` is a point count this mode can hold.
    pub fn is_valid_count(self, count: usize) -> bool {
        match self {
            CurveMode::Bezier => count == 0 || (count - 1) % 3 == 0,
            CurveMode::Linear | CurveMode::BSpline => true,
        }
    }

    /// Whether the point at `index` lies on the curve.
    pub fn is_anchor(self, index: usize) -> bool {
        match self {
            CurveMode::Bezier => index % 3 == 0,
            CurveMode::Linear | CurveMode::BSpline => true,
        }
    }
}

impl std::fmt::Display for CurveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
