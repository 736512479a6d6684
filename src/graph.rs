// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::grid::GridTopology;

/// Directed upwind graph over grid cells in compressed sparse row form.
///
/// Row `c` lists the upwind donors of cell `c`: an edge `c -> d` means flux
/// flows from `d` into `c` across at least one interior face. Edges point
/// upstream, so a depth-first traversal reaches a cell's dependencies.
/// The graph is rebuilt for every flux field; it has no identity across
/// solves.
pub struct UpwindGraph {
    row_ptr: Vec<usize>,
    col_ind: Vec<usize>,
}

impl UpwindGraph {
    /// Build a graph directly from CSR arrays. Intended for tests of the
    /// component decomposer on arbitrary small graphs.
    pub fn from_csr(row_ptr: Vec<usize>, col_ind: Vec<usize>) -> Self {
        debug_assert!(!row_ptr.is_empty() && row_ptr[0] == 0);
        debug_assert_eq!(*row_ptr.last().unwrap(), col_ind.len());
        UpwindGraph { row_ptr, col_ind }
    }

    /// Number of vertices (cells).
    pub fn num_vertices(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Number of directed edges.
    pub fn num_edges(&self) -> usize {
        self.col_ind.len()
    }

    /// The upwind donors of the given cell.
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.col_ind[self.row_ptr[cell]..self.row_ptr[cell + 1]]
    }
}

/// Construct the upwind graph induced by a signed face-flux field.
///
/// For each face the outflow-side cell is recorded as the face's donor; each
/// cell's row then collects the donors of its inflow faces. Boundary faces
/// (either adjacent cell absent) are excluded unconditionally: they cannot
/// create an edge regardless of flux sign. Faces with exactly zero flux
/// contribute no edge in either direction.
///
/// Precondition: `flux` has one finite value per face. NaN entries are not
/// checked here and propagate into later numeric stages.
pub fn build_upwind_graph<G: GridTopology>(grid: &G, flux: &[f64]) -> UpwindGraph {
    let nc = grid.num_cells();
    let nf = grid.num_faces();
    debug_assert_eq!(flux.len(), nf);

    // Pass 1: for each face, store the upwind cell.
    let mut donor = vec![usize::MAX; nf];
    for cell in 0..nc {
        for &f in grid.faces_of_cell(cell) {
            let (first, _) = grid.cells_of_face(f);
            let out_flux = if first == Some(cell) { flux[f] } else { -flux[f] };
            if out_flux > 0.0 {
                donor[f] = cell;
            }
        }
    }

    // Pass 2: fill the CSR rows with each cell's donors.
    let mut row_ptr = Vec::with_capacity(nc + 1);
    let mut col_ind = Vec::new();
    row_ptr.push(0);
    for cell in 0..nc {
        for &f in grid.faces_of_cell(cell) {
            let (first, second) = grid.cells_of_face(f);
            if first.is_none() || second.is_none() {
                continue;
            }
            let out_flux = if first == Some(cell) { flux[f] } else { -flux[f] };
            if out_flux < 0.0 {
                // Inflow into `cell`; the donor was recorded by the other side.
                col_ind.push(donor[f]);
            }
        }
        row_ptr.push(col_ind.len());
    }

    UpwindGraph { row_ptr, col_ind }
}
