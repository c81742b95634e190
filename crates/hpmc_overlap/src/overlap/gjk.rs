//! GJK distance between two convex hulls
//!
//! Used to settle rounded shapes once the hulls are known not to overlap: two
//! spheropolyhedra overlap iff their hulls are closer than the summed sweep
//! radii. The simplex is reduced to the smallest feature (vertex, edge or
//! triangle) holding the point closest to the origin after every step, using
//! Voronoi-region tests.

use crate::foundation::math::{Real, Vec3};
use crate::shape::support::SupportFunction;

/// Squared distance below which the hulls are treated as touching
const TOUCH_EPSILON_SQ: Real = 1e-30;

/// Tetrahedron volume, relative to its longest edge cubed, below which it is flat
const DEGENERATE_VOLUME: Real = 1e-12;

/// Result of a GJK distance query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GjkDistance {
    /// Distance from the origin to the body (0 when the origin is inside)
    pub distance: Real,
    /// Point of the body closest to the origin
    pub closest: Vec3,
    /// False when the iteration cap ended the search
    pub converged: bool,
}

/// Up to four support points
#[derive(Debug, Clone, Copy)]
struct Simplex {
    points: [Vec3; 4],
    len: usize,
}

impl Simplex {
    fn new(first: Vec3) -> Self {
        Self {
            points: [first, Vec3::zeros(), Vec3::zeros(), Vec3::zeros()],
            len: 1,
        }
    }

    fn contains(&self, p: &Vec3) -> bool {
        self.points[..self.len].iter().any(|q| q == p)
    }

    fn push(&mut self, p: Vec3) {
        self.points[self.len] = p;
        self.len += 1;
    }

    fn set(&mut self, pts: &[Vec3]) {
        self.points[..pts.len()].copy_from_slice(pts);
        self.len = pts.len();
    }

    /// Replace the simplex by the feature closest to the origin and return that point
    fn reduce(&mut self) -> Vec3 {
        let [a, b, c, d] = self.points;
        match self.len {
            1 => a,
            2 => {
                let (p, feature) = closest_on_segment(a, b);
                self.set(feature.as_slice());
                p
            }
            3 => {
                let (p, feature) = closest_on_triangle(a, b, c);
                self.set(feature.as_slice());
                p
            }
            _ => {
                let (p, feature) = closest_on_tetrahedron(a, b, c, d);
                self.set(feature.as_slice());
                p
            }
        }
    }
}

/// Small inline list of the simplex points that support a closest point
#[derive(Debug, Clone, Copy)]
struct Feature {
    points: [Vec3; 4],
    len: usize,
}

impl Feature {
    fn of(pts: &[Vec3]) -> Self {
        let mut points = [Vec3::zeros(); 4];
        points[..pts.len()].copy_from_slice(pts);
        Self { points, len: pts.len() }
    }

    fn as_slice(&self) -> &[Vec3] {
        &self.points[..self.len]
    }
}

fn closest_on_segment(a: Vec3, b: Vec3) -> (Vec3, Feature) {
    let ab = b - a;
    let denom = ab.norm_squared();
    if denom == 0.0 {
        return (a, Feature::of(&[a]));
    }
    let t = -a.dot(&ab) / denom;
    if t <= 0.0 {
        (a, Feature::of(&[a]))
    } else if t >= 1.0 {
        (b, Feature::of(&[b]))
    } else {
        (a + ab * t, Feature::of(&[a, b]))
    }
}

/// Closest point to the origin on triangle (a, b, c)
fn closest_on_triangle(a: Vec3, b: Vec3, c: Vec3) -> (Vec3, Feature) {
    let ab = b - a;
    let ac = c - a;

    let d1 = ab.dot(&-a);
    let d2 = ac.dot(&-a);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, Feature::of(&[a]));
    }

    let d3 = ab.dot(&-b);
    let d4 = ac.dot(&-b);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, Feature::of(&[b]));
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return (a + ab * t, Feature::of(&[a, b]));
    }

    let d5 = ab.dot(&-c);
    let d6 = ac.dot(&-c);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, Feature::of(&[c]));
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return (a + ac * t, Feature::of(&[a, c]));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * t, Feature::of(&[b, c]));
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, Feature::of(&[a, b, c]))
}

/// True when `p` and `opposite` lie strictly on different sides of plane (a, b, c)
fn separated_by_face(p: Vec3, a: Vec3, b: Vec3, c: Vec3, opposite: Vec3) -> bool {
    let n = (b - a).cross(&(c - a));
    let sp = (p - a).dot(&n);
    let so = (opposite - a).dot(&n);
    sp * so < 0.0
}

/// Closest point to the origin on tetrahedron (a, b, c, d); the origin itself when enclosed
///
/// A nearly flat tetrahedron cannot tell inside from outside reliably, so all
/// four faces are searched instead.
fn closest_on_tetrahedron(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> (Vec3, Feature) {
    let origin = Vec3::zeros();
    let faces = [(a, b, c, d), (a, c, d, b), (a, d, b, c), (b, d, c, a)];

    let volume = (b - a).cross(&(c - a)).dot(&(d - a));
    let pts = [a, b, c, d];
    let mut max_edge_sq: Real = 0.0;
    for (i, p) in pts.iter().enumerate() {
        for q in &pts[i + 1..] {
            max_edge_sq = max_edge_sq.max((p - q).norm_squared());
        }
    }
    let degenerate = volume.abs() <= DEGENERATE_VOLUME * max_edge_sq * max_edge_sq.sqrt();

    let mut best: Option<(Vec3, Feature)> = None;
    for (x, y, z, w) in faces {
        if !degenerate && !separated_by_face(origin, x, y, z, w) {
            continue;
        }
        let (p, feature) = closest_on_triangle(x, y, z);
        let closer = best
            .as_ref()
            .map_or(true, |(q, _)| p.norm_squared() < q.norm_squared());
        if closer {
            best = Some((p, feature));
        }
    }

    best.unwrap_or((origin, Feature::of(&[a, b, c, d])))
}

/// Distance from the origin to the convex body described by `support`
///
/// `initial_direction` seeds the search (the center separation is a good
/// choice). Terminates when the support plane along the current closest point
/// advances by no more than `rel_tol` relative to its squared length.
pub fn gjk_distance<S: SupportFunction>(
    support: &S,
    initial_direction: Vec3,
    rel_tol: Real,
    max_iterations: u32,
) -> GjkDistance {
    let seed = if initial_direction.norm_squared() > 0.0 {
        -initial_direction
    } else {
        Vec3::x()
    };
    let mut v = support.support(&seed);
    let mut simplex = Simplex::new(v);

    for _ in 0..max_iterations {
        let vv = v.norm_squared();
        if vv <= TOUCH_EPSILON_SQ {
            return GjkDistance {
                distance: 0.0,
                closest: v,
                converged: true,
            };
        }

        let w = support.support(&-v);
        if vv - v.dot(&w) <= rel_tol * vv || simplex.contains(&w) {
            return GjkDistance {
                distance: vv.sqrt(),
                closest: v,
                converged: true,
            };
        }

        simplex.push(w);
        let next = simplex.reduce();
        if simplex.len == 4 {
            // Origin enclosed by a full tetrahedron
            return GjkDistance {
                distance: 0.0,
                closest: Vec3::zeros(),
                converged: true,
            };
        }

        // No progress: v is as close as this body gets
        if next.norm_squared() >= vv {
            return GjkDistance {
                distance: vv.sqrt(),
                closest: v,
                converged: true,
            };
        }
        v = next;
    }

    GjkDistance {
        distance: v.norm(),
        closest: v,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct PointCloud(Vec<Vec3>);

    impl SupportFunction for PointCloud {
        fn support(&self, n: &Vec3) -> Vec3 {
            let mut best = self.0[0];
            for p in &self.0[1..] {
                if p.dot(n) > best.dot(n) {
                    best = *p;
                }
            }
            best
        }
    }

    fn unit_box(center: Vec3) -> PointCloud {
        let mut pts = Vec::new();
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    pts.push(center + Vec3::new(x, y, z));
                }
            }
        }
        PointCloud(pts)
    }

    #[test]
    fn test_face_distance() {
        let body = unit_box(Vec3::new(1.25, 0.3, -0.2));
        let result = gjk_distance(&body, Vec3::new(1.25, 0.3, -0.2), 1e-12, 64);
        assert!(result.converged);
        assert_relative_eq!(result.distance, 0.25, epsilon = 1e-12);
        assert_relative_eq!(result.closest.x, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_distance() {
        let body = unit_box(Vec3::new(2.0, 2.0, 2.0));
        let result = gjk_distance(&body, Vec3::new(2.0, 2.0, 2.0), 1e-12, 64);
        assert_relative_eq!(result.distance, 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_origin_inside_gives_zero() {
        let body = unit_box(Vec3::new(0.2, 0.1, 0.0));
        let result = gjk_distance(&body, Vec3::new(0.2, 0.1, 0.0), 1e-12, 64);
        assert_eq!(result.distance, 0.0);
    }

    #[test]
    fn test_closest_on_triangle_interior() {
        let (p, feature) = closest_on_triangle(
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        );
        assert_relative_eq!(p, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert_eq!(feature.len, 3);
    }

    #[test]
    fn test_closest_on_segment_clamps() {
        let (p, feature) = closest_on_segment(Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(p, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(feature.len, 1);
    }
}
