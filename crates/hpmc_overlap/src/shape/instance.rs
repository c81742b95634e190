//! Placed shapes
//!
//! [`ShapeInstance`] is the per-particle handle (type id + orientation) the host
//! keeps. [`ShapeSpheropolyhedron`] is the transient view built for one overlap
//! check: the same orientation with the type's parameters resolved.

use super::params::ShapeParams;
use super::support::SupportFuncSpheropolyhedron;
use crate::foundation::math::{Quat, Real};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a shape type in a [`ShapeRegistry`](super::registry::ShapeRegistry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeTypeId(pub u32);

impl ShapeTypeId {
    /// Position in the registry arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShapeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Orientation of one particle plus its shape type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeInstance {
    /// Rotation from body frame to world frame
    pub orientation: Quat,
    /// Shape type of the particle
    pub type_id: ShapeTypeId,
}

impl ShapeInstance {
    /// Create a new instance
    pub fn new(type_id: ShapeTypeId, orientation: Quat) -> Self {
        Self { orientation, type_id }
    }

    /// Instance with identity orientation
    pub fn unrotated(type_id: ShapeTypeId) -> Self {
        Self::new(type_id, Quat::identity())
    }
}

/// A spheropolyhedron placed with an orientation, ready for overlap testing
#[derive(Debug, Clone, Copy)]
pub struct ShapeSpheropolyhedron<'a> {
    /// Rotation from body frame to world frame
    pub orientation: Quat,
    /// Shared per-type geometry
    pub params: &'a ShapeParams,
}

impl<'a> ShapeSpheropolyhedron<'a> {
    /// Place `params` with the given orientation
    pub fn new(orientation: Quat, params: &'a ShapeParams) -> Self {
        Self { orientation, params }
    }

    /// Whether rotating this shape changes its geometry
    ///
    /// Pure spheres are rotationally symmetric; anything with a hull is not.
    pub fn has_orientation(&self) -> bool {
        self.params.vertex_count() > 0
    }

    /// Diameter of the sphere around the particle center enclosing the shape
    pub fn circumsphere_diameter(&self) -> Real {
        self.params.circumsphere_diameter()
    }

    /// Rounding radius of the shape
    pub fn sweep_radius(&self) -> Real {
        self.params.sweep_radius()
    }

    /// Whether this shape is excluded from overlap checks
    pub fn ignores_overlaps(&self) -> bool {
        self.params.ignores_overlaps()
    }

    /// Body-frame support function of the vertex hull
    pub fn support_function(&self) -> SupportFuncSpheropolyhedron<'a> {
        SupportFuncSpheropolyhedron::new(self.params)
    }
}
