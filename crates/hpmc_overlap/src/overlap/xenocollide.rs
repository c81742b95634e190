//! XenoCollide (Minkowski portal refinement) boolean overlap test
//!
//! Works on any support function of a Minkowski difference `B + r_ab - A` and
//! an interior point of it. The origin is inside the difference body exactly
//! when the shapes overlap. The test first finds a portal, a triangle
//! (v1, v2, v3) of support points that the ray from the interior point v0
//! towards the origin passes through, then pushes the portal outwards until
//! the origin is shown to be behind it (overlap) or beyond the body's
//! support plane (separation).

use crate::foundation::math::{is_exact_zero, Real, Vec3};
use crate::shape::support::SupportFunction;

/// Result of a portal refinement run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalOutcome {
    /// Origin inside or on the boundary of the difference body
    Overlap,
    /// A support plane separates the origin from the body
    Separated,
    /// The difference body is flat, or nearly so, in the portal direction;
    /// the portal cannot decide and a distance query must
    Degenerate,
    /// Iteration cap reached before either could be shown
    NotConverged,
}

/// Decide whether the origin lies in the convex body described by `support`
///
/// `v0` must be an interior point of the body. `tol` bounds how far the portal
/// may still move before the boundary is considered found; it is compared
/// against the support-plane advance along the (unnormalized) portal normal
/// scaled by that normal's length. A support point within `tol` of a
/// discovery plane gives [`PortalOutcome::Degenerate`].
pub fn xenocollide_3d<S: SupportFunction>(
    support: &S,
    v0: Vec3,
    tol: Real,
    max_iterations: u32,
) -> PortalOutcome {
    // Interior point at the origin: the centers coincide
    if is_exact_zero(&v0) {
        return PortalOutcome::Overlap;
    }

    // Phase 1: portal discovery
    let mut n = -v0;
    let mut v1 = support.support(&n);
    if v1.dot(&n) <= 0.0 {
        return PortalOutcome::Separated;
    }

    n = v1.cross(&v0);
    if is_exact_zero(&n) {
        // v1 lies on the ray from v0 through the origin, and beyond it
        return PortalOutcome::Overlap;
    }

    let mut v2 = support.support(&n);
    let d2 = v2.dot(&n);
    if d2.abs() <= tol * n.norm() {
        return PortalOutcome::Degenerate;
    }
    if d2 < 0.0 {
        return PortalOutcome::Separated;
    }

    n = (v1 - v0).cross(&(v2 - v0));
    // Keep the portal normal pointing away from the interior point
    if n.dot(&v0) > 0.0 {
        std::mem::swap(&mut v1, &mut v2);
        n = -n;
    }

    let mut iterations = 0u32;
    let mut v3;
    loop {
        iterations += 1;
        if iterations > max_iterations {
            return PortalOutcome::NotConverged;
        }

        v3 = support.support(&n);
        let d3 = v3.dot(&n);
        if d3.abs() <= tol * n.norm() {
            return PortalOutcome::Degenerate;
        }
        if d3 < 0.0 {
            return PortalOutcome::Separated;
        }

        // Origin outside (v0, v1, v3): drop v2
        if v1.cross(&v3).dot(&v0) < 0.0 {
            v2 = v3;
            n = (v1 - v0).cross(&(v3 - v0));
            continue;
        }

        // Origin outside (v0, v3, v2): drop v1
        if v3.cross(&v2).dot(&v0) < 0.0 {
            v1 = v3;
            n = (v3 - v0).cross(&(v2 - v0));
            continue;
        }

        break;
    }

    // Phase 2: portal refinement
    loop {
        iterations += 1;

        n = (v2 - v1).cross(&(v3 - v1));
        if is_exact_zero(&n) {
            // Degenerate portal through the origin ray
            return PortalOutcome::Overlap;
        }

        // Origin behind the portal plane: enclosed by (v0, v1, v2, v3)
        if n.dot(&v1) >= 0.0 {
            return PortalOutcome::Overlap;
        }

        let v4 = support.support(&n);

        // Origin beyond the support plane in direction n
        if v4.dot(&n) <= 0.0 {
            return PortalOutcome::Separated;
        }

        // Support plane too close to the portal to make progress
        if (v4 - v3).dot(&n) <= tol * n.norm() {
            return PortalOutcome::Separated;
        }

        if iterations > max_iterations {
            return PortalOutcome::NotConverged;
        }

        // Keep the two of the planes (v4, v0, v1..3) that still bracket the origin ray
        let x = v4.cross(&v0);
        if v1.dot(&x) > 0.0 {
            if v2.dot(&x) > 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.dot(&x) > 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }
    }
}
