//! Rotation helpers shared by the curve evaluators.

use crate::{DMat3, DQuat, Vector3};

/// Normalize `v`, or return `fallback` when `v` is too short to have a
/// meaningful direction.
pub fn safe_normalize(v: Vector3, fallback: Vector3) -> Vector3 {
    let len_sq = v.length_squared();
    if len_sq < 1e-18 || !len_sq.is_finite() {
        fallback
    } else {
        v / len_sq.sqrt()
    }
}

/// Build the rotation whose local +Z maps to `forward` and whose local +Y
/// lies in the plane spanned by `forward` and `up`.
///
/// Returns identity for a zero `forward`. When `up` is parallel to
/// `forward` another reference axis is picked.
pub fn look_rotation(forward: Vector3, up: Vector3) -> DQuat {
    let f = safe_normalize(forward, Vector3::ZERO);
    if f == Vector3::ZERO {
        return DQuat::IDENTITY;
    }

    let mut right = up.cross(f);
    if right.length_squared() < 1e-18 {
        let reference = if f.y.abs() < 0.9 { Vector3::Y } else { Vector3::X };
        right = reference.cross(f);
    }
    let right = right.normalize();
    let up = f.cross(right);

    DQuat::from_mat3(&DMat3::from_cols(right, up, f)).normalize()
}

/// Cubic De Casteljau over rotations: pairwise slerps collapsed level by
/// level.
pub fn quad_slerp(q0: DQuat, q1: DQuat, q2: DQuat, q3: DQuat, t: f64) -> DQuat {
    let q01 = q0.slerp(q1, t);
    let q12 = q1.slerp(q2, t);
    let q23 = q2.slerp(q3, t);
    let q012 = q01.slerp(q12, t);
    let q123 = q12.slerp(q23, t);
    q012.slerp(q123, t).normalize()
}
