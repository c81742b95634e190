//! Cell list broad phase
//!
//! Particles are binned into a periodic grid of cells at least `min_width`
//! wide. Any pair closer than `min_width` then sits in the same or adjacent
//! cells, so only those 27 neighborhoods need a narrow-phase test.

use super::periodic::BoxDim;
use crate::foundation::math::{Real, Vec3};

/// Upper bound on cells per axis, keeping tiny cutoffs from exploding memory
pub const MAX_CELLS_PER_AXIS: usize = 64;

/// Particles sorted by cell
#[derive(Debug, Clone)]
pub struct CellList {
    n_cells: [usize; 3],
    cell_size: Vec3,
    cell_start: Vec<usize>,
    cell_count: Vec<usize>,
    sorted_indices: Vec<usize>,
    cell_of: Vec<usize>,
}

impl CellList {
    /// Bin `positions` into cells no narrower than `min_width`
    ///
    /// Positions outside the box are folded back in periodically.
    pub fn build(positions: &[Vec3], box_dim: &BoxDim, min_width: Real) -> Self {
        let lengths = box_dim.lengths();
        let mut n_cells = [1usize; 3];
        for (axis, n) in n_cells.iter_mut().enumerate() {
            if min_width > 0.0 {
                let fit = (lengths[axis] / min_width).floor();
                *n = if fit >= MAX_CELLS_PER_AXIS as Real {
                    MAX_CELLS_PER_AXIS
                } else {
                    (fit as usize).max(1)
                };
            } else {
                *n = MAX_CELLS_PER_AXIS;
            }
        }
        let cell_size = Vec3::from_fn(|axis, _| lengths[axis] / n_cells[axis] as Real);
        let n_total = n_cells[0] * n_cells[1] * n_cells[2];

        let lo = box_dim.lo();
        let cell_of: Vec<usize> = positions
            .iter()
            .map(|p| {
                let mut c = [0usize; 3];
                for axis in 0..3 {
                    let frac = ((p[axis] - lo[axis]) / lengths[axis]).rem_euclid(1.0);
                    c[axis] = ((frac * n_cells[axis] as Real) as usize).min(n_cells[axis] - 1);
                }
                c[0] + n_cells[0] * (c[1] + n_cells[1] * c[2])
            })
            .collect();

        let mut sorted_indices: Vec<usize> = (0..positions.len()).collect();
        sorted_indices.sort_by_key(|&i| cell_of[i]);

        let mut cell_count = vec![0usize; n_total];
        for &cell in &cell_of {
            cell_count[cell] += 1;
        }
        let mut cell_start = vec![0usize; n_total];
        let mut offset = 0;
        for (start, count) in cell_start.iter_mut().zip(&cell_count) {
            *start = offset;
            offset += count;
        }

        Self {
            n_cells,
            cell_size,
            cell_start,
            cell_count,
            sorted_indices,
            cell_of,
        }
    }

    /// Cells along each axis
    pub fn n_cells(&self) -> [usize; 3] {
        self.n_cells
    }

    /// Edge lengths of one cell
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cell_count.len()
    }

    /// Whether the grid has no cells (never true for a built list)
    pub fn is_empty(&self) -> bool {
        self.cell_count.is_empty()
    }

    /// Particle indices binned into `cell`
    pub fn members(&self, cell: usize) -> &[usize] {
        let start = self.cell_start[cell];
        &self.sorted_indices[start..start + self.cell_count[cell]]
    }

    /// Cell holding particle `i`
    pub fn cell_of(&self, i: usize) -> usize {
        self.cell_of[i]
    }

    /// The cell itself and its periodic neighbors, each listed once
    pub fn neighbor_cells(&self, cell: usize) -> Vec<usize> {
        let [nx, ny, nz] = self.n_cells;
        let cx = cell % nx;
        let cy = (cell / nx) % ny;
        let cz = cell / (nx * ny);

        let mut out = Vec::with_capacity(27);
        for dz in [nz - 1, 0, 1] {
            for dy in [ny - 1, 0, 1] {
                for dx in [nx - 1, 0, 1] {
                    let x = (cx + dx) % nx;
                    let y = (cy + dy) % ny;
                    let z = (cz + dz) % nz;
                    out.push(x + nx * (y + ny * z));
                }
            }
        }
        // Grids narrower than three cells wrap onto themselves
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Every pair `(i, j)` with `i < j` sharing a neighborhood, sorted
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.cell_of.len() {
            for cell in self.neighbor_cells(self.cell_of[i]) {
                pairs.extend(self.members(cell).iter().filter(|&&j| j > i).map(|&j| (i, j)));
            }
        }
        pairs.sort_unstable();
        pairs
    }
}
