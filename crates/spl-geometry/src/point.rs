//! Control point and evaluation result types.

use serde::{Deserialize, Serialize};
use spl_core::Tolerance;
use spl_math::{DQuat, Point3, Space, Vector3};

/// Per-point RGBA tag. Carried through edits, never read by curve math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    fn distance_squared(self, other: Self) -> f64 {
        let d = [self.r - other.r, self.g - other.g, self.b - other.b, self.a - other.a];
        d.iter().map(|&c| f64::from(c) * f64::from(c)).sum()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One entry of the point store.
///
/// Equality is approximate: every field compares by squared distance
/// against [`Tolerance::point_eq_sq`]. Use it for change detection only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlPoint {
    pub position: Point3,
    pub orientation: DQuat,
    pub scale: Vector3,
    pub tag: Color,
}

impl ControlPoint {
    pub fn new(position: Point3, orientation: DQuat, scale: Vector3) -> Self {
        Self {
            position,
            orientation,
            scale,
            tag: Color::WHITE,
        }
    }

    pub fn from_position(position: Point3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: Color) -> Self {
        self.tag = tag;
        self
    }

    /// Local +Z of the point's orientation.
    pub fn forward(&self) -> Vector3 {
        self.orientation * Vector3::Z
    }

    /// Local +Y of the point's orientation.
    pub fn up(&self) -> Vector3 {
        self.orientation * Vector3::Y
    }

    /// Blend every field: positions, scales and tags linearly, orientation
    /// along the shortest arc.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            orientation: self.orientation.slerp(other.orientation, t).normalize(),
            scale: self.scale.lerp(other.scale, t),
            tag: self.tag.lerp(other.tag, t as f32),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.orientation.is_finite()
            && self.scale.is_finite()
            && [self.tag.r, self.tag.g, self.tag.b, self.tag.a]
                .iter()
                .all(|c| c.is_finite())
    }

    pub fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        // q and -q are the same rotation; |q - p|^2 = 2 - 2|q.p| for unit quaternions
        let rotation_sq = 2.0 - 2.0 * self.orientation.dot(other.orientation).abs();
        tolerance.points_eq(self.position.distance_squared(other.position))
            && tolerance.points_eq(rotation_sq)
            && tolerance.points_eq(self.scale.distance_squared(other.scale))
            && tolerance.points_eq(self.tag.distance_squared(other.tag))
    }
}

impl Default for ControlPoint {
    fn default() -> Self {
        Self::new(Point3::ZERO, DQuat::IDENTITY, Vector3::ONE)
    }
}

impl PartialEq for ControlPoint {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, Tolerance::default())
    }
}

/// Result of evaluating a spline at one parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSample {
    pub position: Point3,
    pub orientation: DQuat,
    pub scale: Vector3,
    /// Unit direction of travel; a fixed axis where the curve is stationary.
    pub tangent: Vector3,
}

impl PointSample {
    pub fn from_point(point: &ControlPoint) -> Self {
        Self {
            position: point.position,
            orientation: point.orientation,
            scale: point.scale,
            tangent: Vector3::Z,
        }
    }

    /// Map a sample computed on stored coordinates into world space. The
    /// tangent is left alone; callers compute it from world positions.
    pub fn to_world(self, space: &Space) -> Self {
        Self {
            position: space.to_world_point(self.position),
            orientation: space.to_world_rotation(self.orientation),
            scale: space.to_world_scale(self.scale),
            tangent: self.tangent,
        }
    }
}

impl Default for PointSample {
    fn default() -> Self {
        Self::from_point(&ControlPoint::default())
    }
}
