//! Pairwise overlap test for spheropolyhedra
//!
//! The decision runs in stages, cheapest first:
//!
//! 1. Circumsphere rejection: centers at least `(d_a + d_b) / 2` apart never overlap.
//! 2. Two pure spheres compare their distance to the summed radii directly.
//! 3. [`xenocollide`] decides whether the unrounded hulls overlap. Exact
//!    contact between hulls counts as overlap.
//! 4. If the hulls are apart and the shapes are rounded, [`gjk`] measures the
//!    hull gap, and the shapes overlap iff the gap is strictly smaller than the
//!    summed sweep radii.
//!
//! Flat hulls the portal cannot resolve fall through to [`gjk`] as well, and
//! touching counts as overlap there too.
//!
//! A pair is always evaluated with the separation whose first nonzero
//! component is positive, swapping the shapes if needed, so
//! `test_overlap(r, a, b) == test_overlap(-r, b, a)` holds bit for bit.

pub mod gjk;
pub mod xenocollide;

#[cfg(test)]
mod tests;

use crate::foundation::math::{Real, Vec3};
use crate::shape::instance::ShapeSpheropolyhedron;
use crate::shape::support::MinkowskiSupport;
use serde::{Deserialize, Serialize};
use xenocollide::PortalOutcome;

/// Numerical limits of the overlap test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapTolerances {
    /// Cap on portal discovery plus refinement steps
    pub max_iterations: u32,
    /// Portal refinement stops once the support plane advances less than
    /// `precision * (d_a + d_b)`
    pub precision: Real,
    /// Cap on GJK steps for rounded shapes
    pub max_distance_iterations: u32,
    /// Relative GJK convergence threshold
    pub distance_rel_tol: Real,
}

impl Default for OverlapTolerances {
    fn default() -> Self {
        Self {
            max_iterations: 1024,
            precision: 1e-12,
            max_distance_iterations: 128,
            distance_rel_tol: 1e-12,
        }
    }
}

/// Test two placed shapes for overlap
///
/// `r_ab` is the vector from the center of `a` to the center of `b`, already
/// minimum-image wrapped by the caller.
pub fn test_overlap(r_ab: &Vec3, a: &ShapeSpheropolyhedron<'_>, b: &ShapeSpheropolyhedron<'_>) -> bool {
    let mut err_count = 0;
    test_overlap_with(r_ab, a, b, &OverlapTolerances::default(), &mut err_count)
}

/// Test two placed shapes for overlap, counting numerical give-ups
///
/// `err_count` is incremented each time an iteration cap ends a test. A portal
/// cap reports the pair as not overlapping; a GJK cap uses its last gap estimate.
pub fn test_overlap_counted(
    r_ab: &Vec3,
    a: &ShapeSpheropolyhedron<'_>,
    b: &ShapeSpheropolyhedron<'_>,
    err_count: &mut u32,
) -> bool {
    test_overlap_with(r_ab, a, b, &OverlapTolerances::default(), err_count)
}

/// Test two placed shapes for overlap with explicit tolerances
pub fn test_overlap_with(
    r_ab: &Vec3,
    a: &ShapeSpheropolyhedron<'_>,
    b: &ShapeSpheropolyhedron<'_>,
    tolerances: &OverlapTolerances,
    err_count: &mut u32,
) -> bool {
    // Both argument orders must run the same floating-point operations
    if is_lexicographically_negative(r_ab) {
        return test_overlap_canonical(&-r_ab, b, a, tolerances, err_count);
    }
    test_overlap_canonical(r_ab, a, b, tolerances, err_count)
}

/// Circumsphere test alone: whether the pair can possibly overlap
pub fn circumspheres_overlap(r_ab: &Vec3, a: &ShapeSpheropolyhedron<'_>, b: &ShapeSpheropolyhedron<'_>) -> bool {
    let diameter_sum = a.circumsphere_diameter() + b.circumsphere_diameter();
    4.0 * r_ab.norm_squared() < diameter_sum * diameter_sum
}

/// First nonzero component is negative
fn is_lexicographically_negative(v: &Vec3) -> bool {
    v.iter().find(|c| **c != 0.0).is_some_and(|c| *c < 0.0)
}

fn test_overlap_canonical(
    r_ab: &Vec3,
    a: &ShapeSpheropolyhedron<'_>,
    b: &ShapeSpheropolyhedron<'_>,
    tolerances: &OverlapTolerances,
    err_count: &mut u32,
) -> bool {
    if !circumspheres_overlap(r_ab, a, b) {
        return false;
    }

    let sweep_sum = a.sweep_radius() + b.sweep_radius();
    if a.params.is_sphere() && b.params.is_sphere() {
        return r_ab.norm_squared() < sweep_sum * sweep_sum;
    }

    let sa = a.support_function();
    let sb = b.support_function();
    let support = MinkowskiSupport::new(&sa, &sb, *r_ab, a.orientation, b.orientation);

    let tol = tolerances.precision * (a.circumsphere_diameter() + b.circumsphere_diameter());
    let flat = match xenocollide::xenocollide_3d(&support, support.interior_point(), tol, tolerances.max_iterations) {
        PortalOutcome::Overlap => return true,
        PortalOutcome::Separated => false,
        PortalOutcome::Degenerate => true,
        PortalOutcome::NotConverged => {
            *err_count += 1;
            log::debug!(
                "Portal refinement hit the {} iteration cap at r_ab = ({}, {}, {}); reporting no overlap",
                tolerances.max_iterations,
                r_ab.x,
                r_ab.y,
                r_ab.z
            );
            return false;
        }
    };

    if !flat && sweep_sum <= 0.0 {
        return false;
    }

    let gap = gjk::gjk_distance(
        &support,
        support.interior_point(),
        tolerances.distance_rel_tol,
        tolerances.max_distance_iterations,
    );
    if !gap.converged {
        *err_count += 1;
        log::debug!(
            "Hull distance did not converge in {} iterations (gap estimate {})",
            tolerances.max_distance_iterations,
            gap.distance
        );
    }
    // Flat hulls that touch count as overlapping, like the portal's contact case
    (flat && gap.distance <= tol) || gap.distance < sweep_sum
}
