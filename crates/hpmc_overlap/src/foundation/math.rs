//! Math utilities and types
//!
//! All overlap geometry runs in double precision. Exact-contact configurations
//! (unit cubes with half-widths of 0.5) and 1e-6 boundary margins are not
//! resolvable in `f32`.

pub use nalgebra::{
    Vector3,
    Quaternion,
    Unit,
    UnitQuaternion,
};

/// Scalar type used for all overlap geometry
pub type Real = f64;

/// 3D vector type
pub type Vec3 = Vector3<Real>;

/// Unit quaternion type for orientations
pub type Quat = UnitQuaternion<Real>;

/// Build an orientation from `[w, x, y, z]` components, normalizing them
///
/// Returns `None` when the components are all zero (no rotation can be recovered).
pub fn quat_from_wxyz(q: [Real; 4]) -> Option<Quat> {
    let raw = Quaternion::new(q[0], q[1], q[2], q[3]);
    if raw.norm_squared() == 0.0 {
        return None;
    }
    Some(Quat::new_normalize(raw))
}

/// Decompose an orientation into `[w, x, y, z]`
pub fn quat_to_wxyz(q: &Quat) -> [Real; 4] {
    [q.w, q.i, q.j, q.k]
}

/// Rotate a world-frame direction into the body frame of `orientation`
#[inline]
pub fn to_body_frame(orientation: &Quat, v: &Vec3) -> Vec3 {
    orientation.inverse_transform_vector(v)
}

/// Rotate a body-frame vector into the world frame
#[inline]
pub fn to_world_frame(orientation: &Quat, v: &Vec3) -> Vec3 {
    orientation.transform_vector(v)
}

/// Exact zero test (no tolerance)
#[inline]
pub fn is_exact_zero(v: &Vec3) -> bool {
    v.x == 0.0 && v.y == 0.0 && v.z == 0.0
}
