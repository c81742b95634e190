//! Batch overlap detection over a particle configuration
//!
//! Broad phase: a [`CellList`] sized by the largest circumsphere diameter.
//! Narrow phase: [`test_overlap_with`] on each candidate pair, optionally
//! spread over the rayon thread pool. Output is sorted, so serial and
//! parallel runs report identical results.

use crate::foundation::math::Vec3;
use crate::overlap::{test_overlap_with, OverlapTolerances};
use crate::shape::{ShapeError, ShapeInstance, ShapeRegistry, ShapeSpheropolyhedron};
use crate::spatial::{BoxDim, CellList};
use rayon::prelude::*;
use std::fmt;
use thiserror::Error;

/// Two overlapping particles (smaller index first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlapPair {
    /// Lower particle index
    pub a: usize,
    /// Higher particle index
    pub b: usize,
}

impl OverlapPair {
    /// Create a new pair (always stores the smaller index first)
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

impl fmt::Display for OverlapPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.a, self.b)
    }
}

/// Errors raised by a batch check
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlapSystemError {
    /// Position and shape arrays differ in length
    #[error("Got {positions} positions but {instances} shape instances")]
    LengthMismatch {
        /// Number of positions
        positions: usize,
        /// Number of shape instances
        instances: usize,
    },

    /// A particle refers to an unregistered shape type
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Result of one batch check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapReport {
    /// Overlapping pairs in ascending order
    pub pairs: Vec<OverlapPair>,
    /// Pairs that reached the narrow phase
    pub candidates: usize,
    /// Narrow-phase tests that ended on an iteration cap
    pub err_count: u32,
}

impl OverlapReport {
    /// Whether any pair overlaps
    pub fn has_overlaps(&self) -> bool {
        !self.pairs.is_empty()
    }
}

/// Overlap checker bound to one registry and box
#[derive(Debug, Clone)]
pub struct OverlapSystem<'r> {
    registry: &'r ShapeRegistry,
    box_dim: BoxDim,
    tolerances: OverlapTolerances,
    parallel: bool,
}

impl<'r> OverlapSystem<'r> {
    /// Create a checker with default tolerances, running in parallel
    pub fn new(registry: &'r ShapeRegistry, box_dim: BoxDim) -> Self {
        Self {
            registry,
            box_dim,
            tolerances: OverlapTolerances::default(),
            parallel: true,
        }
    }

    /// Use explicit numerical tolerances
    pub fn with_tolerances(mut self, tolerances: OverlapTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Toggle the rayon narrow phase
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Box the checker wraps separations in
    pub fn box_dim(&self) -> &BoxDim {
        &self.box_dim
    }

    /// Find every overlapping pair using the cell list broad phase
    pub fn find_overlaps(
        &self,
        positions: &[Vec3],
        instances: &[ShapeInstance],
    ) -> Result<OverlapReport, OverlapSystemError> {
        let placed = self.place(positions, instances)?;

        let cutoff = self.registry.max_circumsphere_diameter();
        if cutoff >= 0.5 * self.box_dim.min_length() {
            log::warn!(
                "Largest circumsphere diameter {} is at least half the shortest box length {}; \
                 pairs may interact with more than one image",
                cutoff,
                self.box_dim.min_length()
            );
        }
        let cells = CellList::build(positions, &self.box_dim, cutoff);
        let candidates = cells.candidate_pairs();
        log::debug!(
            "Broad phase: {} particles in {:?} cells, {} candidate pairs",
            positions.len(),
            cells.n_cells(),
            candidates.len()
        );

        Ok(self.narrow_phase(positions, &placed, &candidates))
    }

    /// Test every pair directly, without a broad phase
    pub fn find_overlaps_brute_force(
        &self,
        positions: &[Vec3],
        instances: &[ShapeInstance],
    ) -> Result<OverlapReport, OverlapSystemError> {
        let placed = self.place(positions, instances)?;
        let n = positions.len();
        let candidates: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        Ok(self.narrow_phase(positions, &placed, &candidates))
    }

    fn place(
        &self,
        positions: &[Vec3],
        instances: &[ShapeInstance],
    ) -> Result<Vec<ShapeSpheropolyhedron<'r>>, OverlapSystemError> {
        if positions.len() != instances.len() {
            return Err(OverlapSystemError::LengthMismatch {
                positions: positions.len(),
                instances: instances.len(),
            });
        }
        instances
            .iter()
            .map(|instance| self.registry.resolve(instance).map_err(OverlapSystemError::from))
            .collect()
    }

    fn narrow_phase(
        &self,
        positions: &[Vec3],
        placed: &[ShapeSpheropolyhedron<'_>],
        candidates: &[(usize, usize)],
    ) -> OverlapReport {
        let check = |&(i, j): &(usize, usize)| -> (Option<OverlapPair>, u32) {
            let (a, b) = (&placed[i], &placed[j]);
            if a.ignores_overlaps() || b.ignores_overlaps() {
                return (None, 0);
            }
            let r_ab = self.box_dim.min_image(&(positions[j] - positions[i]));
            let mut err_count = 0;
            let hit = test_overlap_with(&r_ab, a, b, &self.tolerances, &mut err_count);
            (hit.then(|| OverlapPair::new(i, j)), err_count)
        };

        let results: Vec<(Option<OverlapPair>, u32)> = if self.parallel {
            candidates.par_iter().map(check).collect()
        } else {
            candidates.iter().map(check).collect()
        };

        let mut report = OverlapReport {
            candidates: candidates.len(),
            ..OverlapReport::default()
        };
        for (pair, errs) in results {
            report.err_count += errs;
            report.pairs.extend(pair);
        }
        report.pairs.sort_unstable();
        if report.err_count > 0 {
            log::debug!("{} overlap tests hit an iteration cap", report.err_count);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Real};
    use crate::shape::{max_verts, IgnoreFlags, ShapeParams, ShapeTypeId};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cube_vertices(half: Real) -> Vec<Vec3> {
        let mut v = Vec::with_capacity(8);
        for x in [-half, half] {
            for y in [-half, half] {
                for z in [-half, half] {
                    v.push(Vec3::new(x, y, z));
                }
            }
        }
        v
    }

    fn random_orientation(rng: &mut StdRng) -> Quat {
        let axis = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        Quat::from_scaled_axis(axis * 3.0)
    }

    #[test]
    fn test_pair_orders_indices() {
        assert_eq!(OverlapPair::new(5, 2), OverlapPair { a: 2, b: 5 });
        assert_eq!(OverlapPair::new(1, 3).to_string(), "1 3");
    }

    #[test]
    fn test_length_mismatch() {
        let registry = ShapeRegistry::new(max_verts::SMALL);
        let system = OverlapSystem::new(&registry, BoxDim::cube(5.0).unwrap());
        let err = system.find_overlaps(&[Vec3::zeros()], &[]).unwrap_err();
        assert_eq!(err, OverlapSystemError::LengthMismatch { positions: 1, instances: 0 });
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let registry = ShapeRegistry::new(max_verts::SMALL);
        let system = OverlapSystem::new(&registry, BoxDim::cube(5.0).unwrap());
        let err = system
            .find_overlaps(&[Vec3::zeros()], &[ShapeInstance::unrotated(ShapeTypeId(0))])
            .unwrap_err();
        assert!(matches!(err, OverlapSystemError::Shape(ShapeError::UnknownType(_))));
    }

    #[test]
    fn test_overlap_across_boundary() {
        let mut registry = ShapeRegistry::new(max_verts::SMALL);
        let cube = registry.add_spheropolyhedron("cube", cube_vertices(0.5), 0.0).unwrap();
        let system = OverlapSystem::new(&registry, BoxDim::cube(6.0).unwrap());

        let positions = vec![Vec3::new(-2.6, 0.0, 0.0), Vec3::new(2.5, 0.1, 0.0), Vec3::new(0.0, 0.0, 0.0)];
        let instances = vec![ShapeInstance::unrotated(cube); 3];
        let report = system.find_overlaps(&positions, &instances).unwrap();
        assert_eq!(report.pairs, vec![OverlapPair::new(0, 1)]);
        assert_eq!(report.err_count, 0);
    }

    #[test]
    fn test_ignore_flags_skip_pairs() {
        let mut registry = ShapeRegistry::new(max_verts::SMALL);
        let solid = registry.register("solid", ShapeParams::sphere(0.5).unwrap()).unwrap();
        let ghost = registry
            .register(
                "ghost",
                ShapeParams::sphere(0.5).unwrap().with_ignore(IgnoreFlags::OVERLAPS),
            )
            .unwrap();
        let system = OverlapSystem::new(&registry, BoxDim::cube(10.0).unwrap()).with_parallel(false);

        let positions = vec![Vec3::zeros(), Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0)];
        let instances = vec![
            ShapeInstance::unrotated(solid),
            ShapeInstance::unrotated(ghost),
            ShapeInstance::unrotated(solid),
        ];
        let report = system.find_overlaps(&positions, &instances).unwrap();
        assert_eq!(report.pairs, vec![OverlapPair::new(0, 2)]);
        assert_eq!(report.candidates, 3);
    }

    #[test]
    fn test_cell_list_matches_brute_force() {
        let mut registry = ShapeRegistry::new(max_verts::SMALL);
        let cube = registry.add_spheropolyhedron("cube", cube_vertices(0.5), 0.0).unwrap();
        let rounded = registry.add_spheropolyhedron("rounded", cube_vertices(0.3), 0.2).unwrap();
        let ball = registry.register("ball", ShapeParams::sphere(0.45).unwrap()).unwrap();
        let types = [cube, rounded, ball];

        let box_dim = BoxDim::new(9.0, 8.0, 7.5).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 250;
        let positions: Vec<Vec3> = (0..n)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-4.5..4.5),
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-3.75..3.75),
                )
            })
            .collect();
        let instances: Vec<ShapeInstance> = (0..n)
            .map(|i| ShapeInstance::new(types[i % 3], random_orientation(&mut rng)))
            .collect();

        let system = OverlapSystem::new(&registry, box_dim);
        let fast = system.find_overlaps(&positions, &instances).unwrap();
        let serial = system.clone().with_parallel(false).find_overlaps(&positions, &instances).unwrap();
        let brute = system.find_overlaps_brute_force(&positions, &instances).unwrap();

        assert!(fast.has_overlaps());
        assert_eq!(fast.pairs, brute.pairs);
        assert_eq!(fast.pairs, serial.pairs);
        assert!(fast.candidates < brute.candidates);
        assert_eq!(brute.candidates, n * (n - 1) / 2);
    }
}
