//! Shape representations for hard-particle overlap checks
//!
//! Shapes are stored once per particle type in body coordinates and placed
//! on demand when a pair is tested.
//!
//! # Module Organization
//!
//! - [`params`] - Per-type geometry (vertices, sweep radius, circumsphere, ignore flags)
//! - [`support`] - Support functions and the Minkowski-difference support
//! - [`instance`] - Per-particle handles and placed shapes
//! - [`registry`] - Type-indexed arena of shape parameters

pub mod params;
pub mod support;
pub mod instance;
pub mod registry;

pub use params::{max_verts, IgnoreFlags, ShapeError, ShapeParams};
pub use support::{MinkowskiSupport, SupportFuncSpheropolyhedron, SupportFunction};
pub use instance::{ShapeInstance, ShapeSpheropolyhedron, ShapeTypeId};
pub use registry::ShapeRegistry;
