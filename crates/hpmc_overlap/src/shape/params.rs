//! Per-type shape parameters for spheropolyhedra
//!
//! A spheropolyhedron is the convex hull of its vertices swept by a sphere of
//! radius `sweep_radius`. Parameters are stored once per particle type and are
//! read-only while overlaps are being checked.

use crate::foundation::math::{Real, Vec3};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vertex limits of the usual shape families
pub mod max_verts {
    /// Small polyhedra (tetrahedra, cubes, octahedra)
    pub const SMALL: usize = 8;
    /// Medium polyhedra
    pub const MEDIUM: usize = 32;
    /// Large polyhedra
    pub const LARGE: usize = 64;
    /// Largest family
    pub const HUGE: usize = 128;
}

bitflags! {
    /// Flags controlling how a shape type takes part in the simulation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct IgnoreFlags: u32 {
        /// Shape never overlaps anything
        const OVERLAPS = 1 << 0;
        /// Moves of this shape are left out of acceptance statistics
        const STATISTICS = 1 << 1;
    }
}

/// Errors raised while building shape parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// More vertices than the shape family supports
    #[error("Too many polyhedron vertices: {count} given, at most {max} supported")]
    TooManyVertices {
        /// Number of vertices supplied
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// Sweep radius below zero (or NaN)
    #[error("Sweep radius must be non-negative, got {0}")]
    NegativeSweepRadius(Real),

    /// Vertex with a NaN or infinite coordinate
    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Position of the vertex in the input list
        index: usize,
    },

    /// Circumsphere diameter override smaller than the shape
    #[error("Circumsphere diameter {given} is smaller than the shape extent {required}")]
    InvalidDiameter {
        /// Requested diameter
        given: Real,
        /// Smallest valid diameter
        required: Real,
    },

    /// Type id not present in the registry
    #[error("Unknown shape type: {0}")]
    UnknownType(String),

    /// Type name registered twice
    #[error("Shape type already registered: {0}")]
    DuplicateType(String),
}

/// Geometry of one particle type
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeParams {
    vertices: Vec<Vec3>,
    sweep_radius: Real,
    diameter: Real,
    ignore: IgnoreFlags,
}

impl ShapeParams {
    /// Build a spheropolyhedron from its hull vertices and rounding radius
    ///
    /// Vertices are given in the body frame, relative to the particle center.
    /// The circumsphere diameter is `2 * (max |v| + sweep_radius)`.
    pub fn new(vertices: Vec<Vec3>, sweep_radius: Real, max_verts: usize) -> Result<Self, ShapeError> {
        if vertices.len() > max_verts {
            return Err(ShapeError::TooManyVertices {
                count: vertices.len(),
                max: max_verts,
            });
        }
        // `!(r >= 0)` also rejects NaN
        if !(sweep_radius >= 0.0) || sweep_radius.is_infinite() {
            return Err(ShapeError::NegativeSweepRadius(sweep_radius));
        }
        if let Some(index) = vertices.iter().position(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(ShapeError::NonFiniteVertex { index });
        }

        let mut params = Self {
            vertices,
            sweep_radius,
            diameter: 0.0,
            ignore: IgnoreFlags::empty(),
        };
        params.diameter = params.computed_diameter();
        Ok(params)
    }

    /// A sphere of the given radius (no hull vertices)
    pub fn sphere(radius: Real) -> Result<Self, ShapeError> {
        Self::new(Vec::new(), radius, 0)
    }

    /// Convenience constructor from `[x, y, z]` triples
    pub fn from_points(points: &[[Real; 3]], sweep_radius: Real, max_verts: usize) -> Result<Self, ShapeError> {
        let vertices = points.iter().map(|p| Vec3::new(p[0], p[1], p[2])).collect();
        Self::new(vertices, sweep_radius, max_verts)
    }

    /// Replace the ignore flags
    pub fn with_ignore(mut self, ignore: IgnoreFlags) -> Self {
        self.ignore = ignore;
        self
    }

    /// Enlarge the stored circumsphere diameter
    ///
    /// The diameter only feeds the fast rejection and neighbor search range, so a
    /// larger value is always safe. Values below the computed extent are refused.
    pub fn with_circumsphere_diameter(mut self, diameter: Real) -> Result<Self, ShapeError> {
        let required = self.computed_diameter();
        if !(diameter >= required) {
            return Err(ShapeError::InvalidDiameter { given: diameter, required });
        }
        self.diameter = diameter;
        Ok(self)
    }

    /// Hull vertices in the body frame, in insertion order
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Number of hull vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Rounding radius
    pub fn sweep_radius(&self) -> Real {
        self.sweep_radius
    }

    /// Stored circumsphere diameter (possibly enlarged)
    pub fn circumsphere_diameter(&self) -> Real {
        self.diameter
    }

    /// Ignore flags
    pub fn ignore(&self) -> IgnoreFlags {
        self.ignore
    }

    /// Whether this type is excluded from overlap checks
    pub fn ignores_overlaps(&self) -> bool {
        self.ignore.contains(IgnoreFlags::OVERLAPS)
    }

    /// Whether this type is excluded from move statistics
    pub fn ignores_statistics(&self) -> bool {
        self.ignore.contains(IgnoreFlags::STATISTICS)
    }

    /// Pure sphere: no hull vertices, only the rounding radius
    pub fn is_sphere(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Diameter derived from the geometry, ignoring any override
    fn computed_diameter(&self) -> Real {
        let radius_sq = self
            .vertices
            .iter()
            .map(|v| v.norm_squared())
            .fold(0.0, Real::max);
        2.0 * (radius_sq.sqrt() + self.sweep_radius)
    }
}
