use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn contains_point(&self, p: Point3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn expand(&self, amount: f64) -> Self {
        let offset = Vector3::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_from_points() {
        let pts = vec![dvec3(1.0, 2.0, 3.0), dvec3(-1.0, 5.0, 0.0), dvec3(3.0, -1.0, 2.0)];
        let aabb = Aabb3::from_points(pts).unwrap();
        assert_eq!(aabb.min, dvec3(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, dvec3(3.0, 5.0, 3.0));
        assert_eq!(aabb.center(), dvec3(1.0, 2.0, 1.5));
    }

    #[test]
    fn test_from_no_points() {
        assert!(Aabb3::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_contains_point_and_expand() {
        let aabb = Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 1.0));
        assert!(aabb.contains_point(dvec3(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(dvec3(1.5, 0.5, 0.5)));
        assert!(aabb.expand(1.0).contains_point(dvec3(1.5, 0.5, 0.5)));
        assert_eq!(aabb.expand(1.0).extents(), dvec3(3.0, 3.0, 3.0));
    }
}
