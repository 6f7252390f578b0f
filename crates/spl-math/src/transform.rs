use crate::{DMat4, DQuat, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Affine transform (translation, rotation, non-uniform scale) stored as a
/// column-major 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        Self::from_mat4(DMat4::IDENTITY)
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self::from_mat4(DMat4::from_translation(t))
    }

    pub fn from_scale_rotation_translation(scale: Vector3, rotation: DQuat, translation: Vector3) -> Self {
        Self::from_mat4(DMat4::from_scale_rotation_translation(scale, rotation, translation))
    }

    pub fn from_mat4(m: DMat4) -> Self {
        Self {
            matrix: m.to_cols_array(),
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.matrix)
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.to_mat4().transform_point3(p)
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.to_mat4().transform_vector3(v)
    }

    /// Rotation part of the matrix, with scale removed.
    pub fn rotation(&self) -> DQuat {
        let (_, rotation, _) = self.to_mat4().to_scale_rotation_translation();
        rotation.normalize()
    }

    /// Per-axis scale part of the matrix.
    pub fn scale(&self) -> Vector3 {
        let (scale, _, _) = self.to_mat4().to_scale_rotation_translation();
        scale
    }

    pub fn inverse(&self) -> Option<Transform> {
        let m = self.to_mat4();
        if m.determinant().abs() < 1e-15 {
            None
        } else {
            Some(Self::from_mat4(m.inverse()))
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Coordinate space control points are authored in.
///
/// Curve math always runs on the stored coordinates; `Local` results are
/// mapped to world space through the supplied transform afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Space {
    #[default]
    World,
    Local(Transform),
}

impl Space {
    pub fn to_world_point(&self, p: Point3) -> Point3 {
        match self {
            Space::World => p,
            Space::Local(t) => t.transform_point(p),
        }
    }

    pub fn to_world_vector(&self, v: Vector3) -> Vector3 {
        match self {
            Space::World => v,
            Space::Local(t) => t.transform_vector(v),
        }
    }

    pub fn to_world_rotation(&self, q: DQuat) -> DQuat {
        match self {
            Space::World => q,
            Space::Local(t) => (t.rotation() * q).normalize(),
        }
    }

    pub fn to_world_scale(&self, s: Vector3) -> Vector3 {
        match self {
            Space::World => s,
            Space::Local(t) => t.scale() * s,
        }
    }

    /// Map a world-space point into the space control points are stored in.
    /// A singular local transform leaves the point unchanged.
    pub fn to_local_point(&self, p: Point3) -> Point3 {
        match self {
            Space::World => p,
            Space::Local(t) => t.inverse().map_or(p, |inv| inv.transform_point(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec3;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        let p = dvec3(1.0, 2.0, 3.0);
        assert!((t.transform_point(p) - p).length() < 1e-10);
    }

    #[test]
    fn test_translation() {
        let t = Transform::from_translation(dvec3(10.0, 20.0, 30.0));
        let result = t.transform_point(dvec3(1.0, 2.0, 3.0));
        assert!((result - dvec3(11.0, 22.0, 33.0)).length() < 1e-10);
        // Vectors ignore translation
        assert!((t.transform_vector(dvec3(1.0, 0.0, 0.0)) - dvec3(1.0, 0.0, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::from_scale_rotation_translation(
            dvec3(2.0, 1.0, 3.0),
            DQuat::from_rotation_y(0.7),
            dvec3(10.0, 20.0, 30.0),
        );
        let inv = t.inverse().unwrap();
        let p = dvec3(1.0, 2.0, 3.0);
        let result = inv.transform_point(t.transform_point(p));
        assert!((result - p).length() < 1e-10);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let t = Transform::from_mat4(DMat4::from_scale(dvec3(1.0, 0.0, 1.0)));
        assert!(t.inverse().is_none());
    }

    #[test]
    fn test_decompose_scale_rotation() {
        let rotation = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let t = Transform::from_scale_rotation_translation(dvec3(2.0, 3.0, 4.0), rotation, dvec3(1.0, 0.0, 0.0));
        let s = t.scale();
        assert_relative_eq!(s.x, 2.0, epsilon = 1e-10);
        assert_relative_eq!(s.y, 3.0, epsilon = 1e-10);
        assert_relative_eq!(s.z, 4.0, epsilon = 1e-10);
        assert!(t.rotation().dot(rotation).abs() > 1.0 - 1e-10);
    }

    #[test]
    fn test_space_roundtrip() {
        let space = Space::Local(Transform::from_scale_rotation_translation(
            dvec3(2.0, 2.0, 2.0),
            DQuat::from_rotation_x(0.3),
            dvec3(5.0, -1.0, 0.0),
        ));
        let p = dvec3(0.5, 1.5, -2.0);
        let back = space.to_local_point(space.to_world_point(p));
        assert!((back - p).length() < 1e-10);
        assert_eq!(Space::World.to_world_point(p), p);
        assert_eq!(Space::World.to_world_scale(dvec3(1.0, 2.0, 3.0)), dvec3(1.0, 2.0, 3.0));
    }
}
