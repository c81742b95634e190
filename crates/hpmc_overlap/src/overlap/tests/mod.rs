//! Overlap test suites
//!
//! Every configuration is checked in both orders, `(r, a, b)` and `(-r, b, a)`.


use crate::foundation::math::{Quat, Real, Vec3};
use crate::shape::instance::ShapeSpheropolyhedron;
use crate::shape::params::{max_verts, ShapeParams};
use super::{circumspheres_overlap, test_overlap, test_overlap_with, OverlapTolerances};

/// Assert the overlap decision for a pair in both orders
#[track_caller]
fn assert_overlap(r: Vec3, a: &ShapeSpheropolyhedron<'_>, b: &ShapeSpheropolyhedron<'_>, expected: bool) {
    assert_eq!(test_overlap(&r, a, b), expected, "r = {:?} (a, b)", r);
    assert_eq!(test_overlap(&-r, b, a), expected, "r = {:?} (b, a)", -r);
}

fn v(x: Real, y: Real, z: Real) -> Vec3 {
    Vec3::new(x, y, z)
}

fn unit_cube(sweep_radius: Real) -> ShapeParams {
    ShapeParams::from_points(
        &[
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ],
        sweep_radius,
        max_verts::SMALL,
    )
    .unwrap()
}

/// Unit square in the z = 0 plane
fn square_plate() -> ShapeParams {
    ShapeParams::from_points(
        &[[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.5, 0.5, 0.0], [-0.5, 0.5, 0.0]],
        0.0,
        max_verts::SMALL,
    )
    .unwrap()
}

fn octahedron() -> ShapeParams {
    ShapeParams::from_points(
        &[
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
            [0.0, 0.0, 0.707106781186548],
            [0.0, 0.0, -0.707106781186548],
        ],
        0.0,
        max_verts::SMALL,
    )
    .unwrap()
}

fn tetrahedron() -> ShapeParams {
    ShapeParams::from_points(
        &[
            [-0.5, -0.5, -0.5],
            [-0.5, 0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, -0.5],
        ],
        0.0,
        max_verts::SMALL,
    )
    .unwrap()
}

/// Rotation by 45 degrees about z
fn rot_z_45() -> Quat {
    Quat::from_axis_angle(&Vec3::z_axis(), std::f64::consts::FRAC_PI_4)
}
