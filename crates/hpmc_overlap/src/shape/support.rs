//! Support functions for convex shapes
//!
//! A support function maps a direction to the farthest point of a convex body
//! in that direction. The overlap tests only ever touch geometry through
//! support queries, so any convex shape with a support function can be tested.

use super::params::ShapeParams;
use crate::foundation::math::{to_body_frame, to_world_frame, Quat, Real, Vec3};

/// Farthest-point query on a convex body
pub trait SupportFunction {
    /// Point of the body with maximum projection onto `direction`
    ///
    /// `direction` does not need to be normalized.
    fn support(&self, direction: &Vec3) -> Vec3;
}

/// Support function of the vertex hull of a spheropolyhedron
///
/// The rounding radius is not included; callers add it where needed.
#[derive(Debug, Clone, Copy)]
pub struct SupportFuncSpheropolyhedron<'a> {
    vertices: &'a [Vec3],
}

impl<'a> SupportFuncSpheropolyhedron<'a> {
    /// Support function over the hull of `params`
    pub fn new(params: &'a ShapeParams) -> Self {
        Self {
            vertices: params.vertices(),
        }
    }

    /// Support function over a raw vertex list
    pub fn from_vertices(vertices: &'a [Vec3]) -> Self {
        Self { vertices }
    }
}

impl SupportFunction for SupportFuncSpheropolyhedron<'_> {
    fn support(&self, direction: &Vec3) -> Vec3 {
        // Linear scan; the first vertex wins ties. No vertices means the origin.
        let mut best = Vec3::zeros();
        let mut best_dot = Real::NEG_INFINITY;
        for v in self.vertices {
            let d = v.dot(direction);
            if d > best_dot {
                best_dot = d;
                best = *v;
            }
        }
        best
    }
}

/// Support function of the Minkowski difference `B + r_ab - A`
///
/// Both bodies are placed with their own orientation; `r_ab` points from the
/// center of A to the center of B. The origin lies inside this body exactly
/// when the two (unrounded) hulls overlap.
#[derive(Debug, Clone, Copy)]
pub struct MinkowskiSupport<'a, A, B> {
    sa: &'a A,
    sb: &'a B,
    r_ab: Vec3,
    q_a: Quat,
    q_b: Quat,
}

impl<'a, A: SupportFunction, B: SupportFunction> MinkowskiSupport<'a, A, B> {
    /// Compose two body-frame support functions
    pub fn new(sa: &'a A, sb: &'a B, r_ab: Vec3, q_a: Quat, q_b: Quat) -> Self {
        Self { sa, sb, r_ab, q_a, q_b }
    }

    /// Vector from A's center to B's center; always inside the difference body
    pub fn interior_point(&self) -> Vec3 {
        self.r_ab
    }
}

impl<A: SupportFunction, B: SupportFunction> SupportFunction for MinkowskiSupport<'_, A, B> {
    fn support(&self, n: &Vec3) -> Vec3 {
        let on_b = to_world_frame(&self.q_b, &self.sb.support(&to_body_frame(&self.q_b, n)));
        let on_a = to_world_frame(&self.q_a, &self.sa.support(&to_body_frame(&self.q_a, &-n)));
        on_b + self.r_ab - on_a
    }
}
