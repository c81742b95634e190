//! # HPMC Overlap
//!
//! Overlap detection for hard-particle Monte Carlo simulations of convex
//! spheropolyhedra: polyhedral hulls rounded by a sweep radius.
//!
//! ## Features
//!
//! - **Exact pair test**: portal refinement on the hulls, GJK distance for the rounding
//! - **Shape registry**: per-type parameters shared by every particle of that type
//! - **Periodic boxes**: minimum-image separations and image-flag wrapping
//! - **Batch checks**: cell list broad phase with a rayon narrow phase
//! - **Drift removal**: re-centering particles on their reference lattice
//! - **Scene files**: TOML or RON descriptions of shapes and particles
//!
//! ## Quick Start
//!
//! ```rust
//! use hpmc_overlap::prelude::*;
//!
//! let mut registry = ShapeRegistry::new(max_verts::SMALL);
//! let cube = registry
//!     .add_spheropolyhedron(
//!         "cube",
//!         vec![
//!             Vec3::new(-0.5, -0.5, -0.5),
//!             Vec3::new(0.5, -0.5, -0.5),
//!             Vec3::new(-0.5, 0.5, -0.5),
//!             Vec3::new(0.5, 0.5, -0.5),
//!             Vec3::new(-0.5, -0.5, 0.5),
//!             Vec3::new(0.5, -0.5, 0.5),
//!             Vec3::new(-0.5, 0.5, 0.5),
//!             Vec3::new(0.5, 0.5, 0.5),
//!         ],
//!         0.0,
//!     )
//!     .unwrap();
//!
//! let a = registry.resolve(&ShapeInstance::unrotated(cube)).unwrap();
//! let b = registry.resolve(&ShapeInstance::unrotated(cube)).unwrap();
//! assert!(test_overlap(&Vec3::new(0.9, 0.0, 0.0), &a, &b));
//! assert!(!test_overlap(&Vec3::new(1.1, 0.0, 0.0), &a, &b));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::many_single_char_names,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod foundation;
pub mod shape;
pub mod overlap;
pub mod spatial;
pub mod overlap_system;
pub mod drift;
pub mod config;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, Scene, SceneConfig},
        drift::{remove_drift, DriftError},
        foundation::math::{Quat, Real, Vec3},
        overlap::{test_overlap, test_overlap_counted, test_overlap_with, OverlapTolerances},
        overlap_system::{OverlapPair, OverlapReport, OverlapSystem, OverlapSystemError},
        shape::{
            max_verts, IgnoreFlags, ShapeError, ShapeInstance, ShapeParams, ShapeRegistry,
            ShapeSpheropolyhedron, ShapeTypeId,
        },
        spatial::{BoxDim, BoxError, ImageFlags},
    };
}
