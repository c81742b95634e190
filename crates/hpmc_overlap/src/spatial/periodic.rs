//! Orthorhombic periodic simulation box
//!
//! The box is centered on the origin and spans `[-L/2, L/2)` along each axis.
//! Image flags count how many times a particle has been wrapped across each
//! face, so `unwrap(wrap(p))` recovers the continuous trajectory.

use crate::foundation::math::{Real, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-axis box crossing counters
pub type ImageFlags = [i32; 3];

/// Errors raised while building a box
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoxError {
    /// Box lengths must be finite and strictly positive
    #[error("Box length along axis {axis} must be positive and finite, got {length}")]
    NonPositiveLength {
        /// Axis index (0 = x)
        axis: usize,
        /// Rejected length
        length: Real,
    },
}

/// Orthorhombic periodic box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Real; 3]", into = "[Real; 3]")]
pub struct BoxDim {
    lengths: Vec3,
}

impl BoxDim {
    /// Create a box with edge lengths `lx`, `ly`, `lz`
    pub fn new(lx: Real, ly: Real, lz: Real) -> Result<Self, BoxError> {
        for (axis, length) in [lx, ly, lz].into_iter().enumerate() {
            if length <= 0.0 || !length.is_finite() {
                return Err(BoxError::NonPositiveLength { axis, length });
            }
        }
        Ok(Self {
            lengths: Vec3::new(lx, ly, lz),
        })
    }

    /// Cubic box
    pub fn cube(length: Real) -> Result<Self, BoxError> {
        Self::new(length, length, length)
    }

    /// Edge lengths
    pub fn lengths(&self) -> Vec3 {
        self.lengths
    }

    /// Lower corner
    pub fn lo(&self) -> Vec3 {
        -0.5 * self.lengths
    }

    /// Upper corner (exclusive)
    pub fn hi(&self) -> Vec3 {
        0.5 * self.lengths
    }

    /// Shortest edge length
    pub fn min_length(&self) -> Real {
        self.lengths.min()
    }

    /// Nearest periodic image of a displacement
    ///
    /// Each component lands in `[-L/2, L/2)`.
    pub fn min_image(&self, dr: &Vec3) -> Vec3 {
        Vec3::from_fn(|axis, _| {
            let l = self.lengths[axis];
            let d = dr[axis];
            d - l * (d / l + 0.5).floor()
        })
    }

    /// Wrap a position back into the box, updating its image flags
    pub fn wrap(&self, position: &Vec3, image: &mut ImageFlags) -> Vec3 {
        let lo = self.lo();
        let hi = self.hi();
        Vec3::from_fn(|axis, _| {
            let l = self.lengths[axis];
            let shift = ((position[axis] - lo[axis]) / l).floor();
            let mut x = position[axis] - shift * l;
            let mut crossings = shift as i32;
            // Rounding can leave x exactly on the upper face
            if x >= hi[axis] {
                x -= l;
                crossings += 1;
            }
            image[axis] += crossings;
            x
        })
    }

    /// Continuous position from a wrapped position and its image flags
    pub fn unwrap(&self, position: &Vec3, image: &ImageFlags) -> Vec3 {
        Vec3::from_fn(|axis, _| position[axis] + Real::from(image[axis]) * self.lengths[axis])
    }

    /// Whether a position lies inside `[lo, hi)` on every axis
    pub fn contains(&self, position: &Vec3) -> bool {
        let lo = self.lo();
        let hi = self.hi();
        (0..3).all(|axis| position[axis] >= lo[axis] && position[axis] < hi[axis])
    }
}

impl TryFrom<[Real; 3]> for BoxDim {
    type Error = BoxError;

    fn try_from(lengths: [Real; 3]) -> Result<Self, Self::Error> {
        Self::new(lengths[0], lengths[1], lengths[2])
    }
}

impl From<BoxDim> for [Real; 3] {
    fn from(b: BoxDim) -> Self {
        [b.lengths.x, b.lengths.y, b.lengths.z]
    }
}
