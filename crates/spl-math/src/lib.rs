pub mod aabb;
pub mod rotation;
pub mod transform;

pub use glam::{dvec3, DMat3, DMat4, DQuat, DVec3, DVec4};
pub use aabb::Aabb3;
pub use rotation::{look_rotation, quad_slerp, safe_normalize};
pub use transform::{Space, Transform};

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
