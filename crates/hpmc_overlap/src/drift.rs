//! Center-of-mass drift removal against a reference lattice
//!
//! Particles tethered to lattice sites wander collectively over a long run.
//! [`remove_drift`] measures the mean minimum-image displacement from the
//! sites and shifts every particle back by it.

use crate::foundation::math::{Real, Vec3};
use crate::spatial::{BoxDim, ImageFlags};
use thiserror::Error;

/// Errors raised by drift removal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriftError {
    /// Per-particle arrays disagree in length
    #[error("Array length mismatch: {positions} positions, {images} image flags, {references} reference sites")]
    LengthMismatch {
        /// Number of positions
        positions: usize,
        /// Number of image flag triples
        images: usize,
        /// Number of reference sites
        references: usize,
    },
}

/// Mean minimum-image displacement of `positions` from `references`
pub fn mean_displacement(positions: &[Vec3], references: &[Vec3], box_dim: &BoxDim) -> Vec3 {
    if positions.is_empty() {
        return Vec3::zeros();
    }
    let total = positions
        .iter()
        .zip(references)
        .fold(Vec3::zeros(), |acc, (p, r0)| acc + box_dim.min_image(&(p - r0)));
    total / positions.len() as Real
}

/// Shift all particles by minus their mean displacement and re-wrap them
///
/// `references[i]` is the lattice site of particle `i`. Image flags pick up
/// any box crossings caused by the shift. Returns the applied shift (the
/// drift that was removed).
pub fn remove_drift(
    positions: &mut [Vec3],
    images: &mut [ImageFlags],
    references: &[Vec3],
    box_dim: &BoxDim,
) -> Result<Vec3, DriftError> {
    if positions.len() != images.len() || positions.len() != references.len() {
        return Err(DriftError::LengthMismatch {
            positions: positions.len(),
            images: images.len(),
            references: references.len(),
        });
    }
    if positions.is_empty() {
        log::warn!("Drift removal called on an empty system; nothing to shift");
        return Ok(Vec3::zeros());
    }

    let shift = mean_displacement(positions, references, box_dim);
    for (p, image) in positions.iter_mut().zip(images.iter_mut()) {
        *p = box_dim.wrap(&(*p - shift), image);
    }
    log::debug!(
        "Removed drift ({:.6}, {:.6}, {:.6}) from {} particles",
        shift.x,
        shift.y,
        shift.z,
        positions.len()
    );
    Ok(shift)
}
