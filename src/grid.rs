// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Result, TofError};

/// Read-only view of an unstructured grid's topology.
///
/// This is the boundary between the solver and the external grid
/// representation: cell-face and face-node adjacency in CSR form, plus the
/// two cells on either side of each face. The flux sign convention is tied
/// to `cells_of_face`: positive flux flows from the first listed cell to
/// the second. `None` denotes the exterior.
pub trait GridTopology {
    /// Number of cells in the grid.
    fn num_cells(&self) -> usize;

    /// Number of faces in the grid.
    fn num_faces(&self) -> usize;

    /// Spatial dimensionality of the grid (2 or 3).
    fn dimensions(&self) -> usize;

    /// Faces incident to the given cell.
    fn faces_of_cell(&self, cell: usize) -> &[usize];

    /// The two cells adjacent to the given face, in sign-convention order.
    /// `None` means the face lies on the exterior boundary.
    fn cells_of_face(&self, face: usize) -> (Option<usize>, Option<usize>);

    /// Nodes bounding the given face.
    fn nodes_of_face(&self, face: usize) -> &[usize];
}

/// A concrete unstructured grid backed by CSR adjacency arrays.
///
/// Storage follows the usual unstructured-grid convention: `cell_faces` /
/// `cell_facepos` list the faces of each cell, `face_cells` holds two cell
/// indices per face with -1 denoting the exterior, and `face_nodes` /
/// `face_nodepos` list the nodes bounding each face.
pub struct UnstructuredGrid {
    dimensions: usize,
    num_cells: usize,
    num_faces: usize,
    cell_faces: Vec<usize>,
    cell_facepos: Vec<usize>,
    face_cells: Vec<i32>,
    face_nodes: Vec<usize>,
    face_nodepos: Vec<usize>,
}

fn check_csr(name: &str, pos: &[usize], values: &[usize], bound: usize) -> Result<()> {
    if pos.is_empty() || pos[0] != 0 {
        return Err(TofError::InvalidTopology {
            reason: format!("{}pos must start at 0", name),
        });
    }
    if pos.windows(2).any(|w| w[1] < w[0]) {
        return Err(TofError::InvalidTopology {
            reason: format!("{}pos is not monotonically non-decreasing", name),
        });
    }
    if *pos.last().unwrap_or(&0) != values.len() {
        return Err(TofError::InvalidTopology {
            reason: format!(
                "{}pos ends at {} but {} has {} entries",
                name,
                pos.last().unwrap_or(&0),
                name,
                values.len()
            ),
        });
    }
    if let Some(&v) = values.iter().find(|&&v| v >= bound) {
        return Err(TofError::InvalidTopology {
            reason: format!("{} contains index {} out of bounds ({})", name, v, bound),
        });
    }
    Ok(())
}

impl UnstructuredGrid {
    /// Build a grid from raw CSR adjacency arrays, validating consistency.
    ///
    /// `cell_facepos` has one entry per cell plus one; `face_cells` has two
    /// entries per face, -1 denoting the exterior.
    ///
    /// # Errors
    /// Returns an error if the dimensionality is not 2 or 3, or if any CSR
    /// array is malformed or contains an out-of-bounds index.
    pub fn from_raw(
        dimensions: usize,
        cell_faces: Vec<usize>,
        cell_facepos: Vec<usize>,
        face_cells: Vec<i32>,
        face_nodes: Vec<usize>,
        face_nodepos: Vec<usize>,
    ) -> Result<Self> {
        if dimensions != 2 && dimensions != 3 {
            return Err(TofError::InvalidDimensions(dimensions));
        }
        if face_cells.len() % 2 != 0 {
            return Err(TofError::InvalidTopology {
                reason: format!("face_cells has odd length {}", face_cells.len()),
            });
        }
        let num_faces = face_cells.len() / 2;
        if cell_facepos.is_empty() {
            return Err(TofError::InvalidTopology {
                reason: "cell_facepos is empty".to_string(),
            });
        }
        let num_cells = cell_facepos.len() - 1;

        check_csr("cell_face", &cell_facepos, &cell_faces, num_faces)?;
        if face_nodepos.len() != num_faces + 1 {
            return Err(TofError::InvalidTopology {
                reason: format!(
                    "face_nodepos has {} entries but the grid has {} faces",
                    face_nodepos.len(),
                    num_faces
                ),
            });
        }
        // Node indices are only compared for identity, so any upper bound works.
        check_csr("face_node", &face_nodepos, &face_nodes, usize::MAX)?;

        if let Some(&c) = face_cells.iter().find(|&&c| c < -1 || c >= num_cells as i32) {
            return Err(TofError::InvalidTopology {
                reason: format!("face_cells contains cell index {} out of bounds", c),
            });
        }

        Ok(UnstructuredGrid {
            dimensions,
            num_cells,
            num_faces,
            cell_faces,
            cell_facepos,
            face_cells,
            face_nodes,
            face_nodepos,
        })
    }
}

impl GridTopology for UnstructuredGrid {
    fn num_cells(&self) -> usize {
        self.num_cells
    }

    fn num_faces(&self) -> usize {
        self.num_faces
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn faces_of_cell(&self, cell: usize) -> &[usize] {
        &self.cell_faces[self.cell_facepos[cell]..self.cell_facepos[cell + 1]]
    }

    fn cells_of_face(&self, face: usize) -> (Option<usize>, Option<usize>) {
        let to_opt = |c: i32| if c < 0 { None } else { Some(c as usize) };
        (
            to_opt(self.face_cells[2 * face]),
            to_opt(self.face_cells[2 * face + 1]),
        )
    }

    fn nodes_of_face(&self, face: usize) -> &[usize] {
        &self.face_nodes[self.face_nodepos[face]..self.face_nodepos[face + 1]]
    }
}

/// Index of the x-normal face at logical position `(i, j)` in a grid built
/// by [`cartesian_2d`], for `i` in `0..=nx`.
pub fn x_face(nx: usize, i: usize, j: usize) -> usize {
    i + (nx + 1) * j
}

/// Index of the y-normal face at logical position `(i, j)` in a grid built
/// by [`cartesian_2d`], for `j` in `0..=ny`.
pub fn y_face(nx: usize, ny: usize, i: usize, j: usize) -> usize {
    (nx + 1) * ny + i + nx * j
}

/// Build a 2D Cartesian grid of `nx` by `ny` cells as an [`UnstructuredGrid`].
///
/// Cell `(i, j)` has flat index `i + nx * j`. Faces are numbered x-normal
/// first (`(nx + 1) * ny` of them), then y-normal (`nx * (ny + 1)`); see
/// [`x_face`] and [`y_face`]. The face sign convention points in +x / +y:
/// positive flux on an x-face flows from cell `(i-1, j)` into cell `(i, j)`.
///
/// # Panics
/// Panics if `nx` or `ny` is zero.
pub fn cartesian_2d(nx: usize, ny: usize) -> UnstructuredGrid {
    assert!(nx > 0 && ny > 0, "cartesian_2d requires nx > 0 and ny > 0");

    let num_cells = nx * ny;
    let num_x_faces = (nx + 1) * ny;
    let num_y_faces = nx * (ny + 1);
    let num_faces = num_x_faces + num_y_faces;
    let node = |i: usize, j: usize| i + (nx + 1) * j;
    let cell = |i: usize, j: usize| i + nx * j;

    let mut face_cells = Vec::with_capacity(2 * num_faces);
    let mut face_nodes = Vec::with_capacity(2 * num_faces);
    let mut face_nodepos = Vec::with_capacity(num_faces + 1);
    face_nodepos.push(0);

    // x-normal faces, ordered j-major to match x_face().
    for j in 0..ny {
        for i in 0..=nx {
            let left = if i > 0 { cell(i - 1, j) as i32 } else { -1 };
            let right = if i < nx { cell(i, j) as i32 } else { -1 };
            face_cells.push(left);
            face_cells.push(right);
            face_nodes.push(node(i, j));
            face_nodes.push(node(i, j + 1));
            face_nodepos.push(face_nodes.len());
        }
    }
    // y-normal faces.
    for j in 0..=ny {
        for i in 0..nx {
            let lower = if j > 0 { cell(i, j - 1) as i32 } else { -1 };
            let upper = if j < ny { cell(i, j) as i32 } else { -1 };
            face_cells.push(lower);
            face_cells.push(upper);
            face_nodes.push(node(i, j));
            face_nodes.push(node(i + 1, j));
            face_nodepos.push(face_nodes.len());
        }
    }

    let mut cell_faces = Vec::with_capacity(4 * num_cells);
    let mut cell_facepos = Vec::with_capacity(num_cells + 1);
    cell_facepos.push(0);
    for j in 0..ny {
        for i in 0..nx {
            cell_faces.push(x_face(nx, i, j));
            cell_faces.push(x_face(nx, i + 1, j));
            cell_faces.push(y_face(nx, ny, i, j));
            cell_faces.push(y_face(nx, ny, i, j + 1));
            cell_facepos.push(cell_faces.len());
        }
    }

    UnstructuredGrid {
        dimensions: 2,
        num_cells,
        num_faces,
        cell_faces,
        cell_facepos,
        face_cells,
        face_nodes,
        face_nodepos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_counts() {
        let g = cartesian_2d(3, 2);
        assert_eq!(g.num_cells(), 6);
        assert_eq!(g.num_faces(), (3 + 1) * 2 + 3 * (2 + 1));
        assert_eq!(g.dimensions(), 2);
        for c in 0..g.num_cells() {
            assert_eq!(g.faces_of_cell(c).len(), 4);
        }
    }

    #[test]
    fn cartesian_face_orientation() {
        let g = cartesian_2d(3, 2);
        // Interior x-face between cells (0,0) and (1,0): left cell first.
        let f = x_face(3, 1, 0);
        assert_eq!(g.cells_of_face(f), (Some(0), Some(1)));
        // Leftmost boundary x-face of row 1.
        let f = x_face(3, 0, 1);
        assert_eq!(g.cells_of_face(f), (None, Some(3)));
        // Interior y-face between cells (1,0) and (1,1): lower cell first.
        let f = y_face(3, 2, 1, 1);
        assert_eq!(g.cells_of_face(f), (Some(1), Some(4)));
    }

    #[test]
    fn cartesian_face_nodes_are_shared() {
        let g = cartesian_2d(2, 2);
        // Every face in 2D has exactly two bounding nodes.
        for f in 0..g.num_faces() {
            assert_eq!(g.nodes_of_face(f).len(), 2);
        }
        let shared = |a: usize, b: usize| {
            g.nodes_of_face(a)
                .iter()
                .filter(|n| g.nodes_of_face(b).contains(n))
                .count()
        };
        // The x-face at (1,0) meets both y-faces of cell 0 in exactly one node
        // each, and shares no node with the opposite x-face.
        let fx = x_face(2, 1, 0);
        assert_eq!(shared(fx, y_face(2, 2, 0, 0)), 1);
        assert_eq!(shared(fx, y_face(2, 2, 0, 1)), 1);
        assert_eq!(shared(fx, x_face(2, 0, 0)), 0);
    }

    #[test]
    fn from_raw_roundtrip() {
        let g = cartesian_2d(2, 1);
        let g2 = UnstructuredGrid::from_raw(
            2,
            g.cell_faces.clone(),
            g.cell_facepos.clone(),
            g.face_cells.clone(),
            g.face_nodes.clone(),
            g.face_nodepos.clone(),
        )
        .unwrap();
        assert_eq!(g2.num_cells(), g.num_cells());
        assert_eq!(g2.num_faces(), g.num_faces());
        for c in 0..g.num_cells() {
            assert_eq!(g2.faces_of_cell(c), g.faces_of_cell(c));
        }
    }

    #[test]
    fn from_raw_rejects_bad_dimensions() {
        let r = UnstructuredGrid::from_raw(4, vec![], vec![0], vec![], vec![], vec![0]);
        assert!(matches!(r, Err(TofError::InvalidDimensions(4))));
    }

    #[test]
    fn from_raw_rejects_bad_csr() {
        // cell_facepos does not end at cell_faces.len().
        let r = UnstructuredGrid::from_raw(
            2,
            vec![0],
            vec![0, 2],
            vec![-1, 0],
            vec![0, 1],
            vec![0, 2],
        );
        assert!(matches!(r, Err(TofError::InvalidTopology { .. })));
    }

    #[test]
    fn from_raw_rejects_out_of_bounds_cell() {
        // face_cells references cell 5 in a 1-cell grid.
        let r = UnstructuredGrid::from_raw(
            2,
            vec![0],
            vec![0, 1],
            vec![5, 0],
            vec![0, 1],
            vec![0, 2],
        );
        assert!(matches!(r, Err(TofError::InvalidTopology { .. })));
    }
}
