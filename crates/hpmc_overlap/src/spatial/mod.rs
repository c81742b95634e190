//! Periodic geometry and spatial partitioning
//!
//! - [`periodic`] - Orthorhombic box, minimum image and wrapping
//! - [`cell_list`] - Uniform cell grid for broad-phase pair search

pub mod periodic;
pub mod cell_list;

pub use periodic::{BoxDim, BoxError, ImageFlags};
pub use cell_list::CellList;
