// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use approx::assert_abs_diff_eq;

use tof_reorder::graph::build_upwind_graph;
use tof_reorder::grid::{cartesian_2d, x_face, GridTopology, UnstructuredGrid};
use tof_reorder::reorder::decompose;
use tof_reorder::solver::{CyclicStrategy, TofSolver};

/// 1xN line with unit flux in +x on interior faces, injection in the first
/// cell and extraction in the last.
fn line_problem(n: usize) -> (UnstructuredGrid, Vec<f64>, Vec<f64>, Vec<f64>) {
    let g = cartesian_2d(n, 1);
    let mut flux = vec![0.0; g.num_faces()];
    for i in 1..n {
        flux[x_face(n, i, 0)] = 1.0;
    }
    let pv = vec![1.0; n];
    let mut source = vec![0.0; n];
    source[0] = 1.0;
    source[n - 1] = -1.0;
    (g, flux, pv, source)
}

/// Uniform +x flow on an nx-by-ny grid with balanced edge sources/sinks.
fn uniform_x_problem(nx: usize, ny: usize) -> (UnstructuredGrid, Vec<f64>, Vec<f64>, Vec<f64>) {
    let g = cartesian_2d(nx, ny);
    let mut flux = vec![0.0; g.num_faces()];
    for j in 0..ny {
        for i in 1..nx {
            flux[x_face(nx, i, j)] = 1.0;
        }
    }
    let pv = vec![1.0; nx * ny];
    let mut source = vec![0.0; nx * ny];
    for j in 0..ny {
        source[nx * j] = 1.0;
        source[nx * j + nx - 1] = -1.0;
    }
    (g, flux, pv, source)
}

/// Closed-form check of the single-cell update on a 3-cell chain:
/// each cell's fill time is its donor's value plus pv/flux.
#[test]
fn three_cell_chain_closed_form() {
    let (g, flux, pv, source) = line_problem(3);
    let tof = TofSolver::new().solve(&g, &flux, &pv, &source).unwrap();
    assert_abs_diff_eq!(tof[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(tof[1], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(tof[2], 3.0, epsilon = 1e-12);
}

/// A single source feeding a single sink along a line gives strictly
/// increasing time-of-flight in the flow direction.
#[test]
fn line_tof_increases_monotonically() {
    let (g, flux, pv, source) = line_problem(20);
    let tof = TofSolver::new().solve(&g, &flux, &pv, &source).unwrap();
    for w in tof.windows(2) {
        assert!(w[1] > w[0], "tof not increasing: {} -> {}", w[0], w[1]);
    }
}

/// Zero-source cells with positive pore volume on a well-posed field have
/// non-negative time-of-flight.
#[test]
fn tof_nonnegative_on_uniform_flow() {
    let (g, flux, pv, source) = uniform_x_problem(10, 10);
    let tof = TofSolver::new().solve(&g, &flux, &pv, &source).unwrap();
    for (c, &t) in tof.iter().enumerate() {
        assert!(t.is_finite() && t >= 0.0, "tof[{}] = {}", c, t);
    }
    // Columns fill left to right within every row.
    for j in 0..10 {
        for i in 1..10 {
            assert!(tof[i + 10 * j] > tof[i - 1 + 10 * j]);
        }
    }
}

/// Ring of n cells, face i carrying flow from cell i to cell (i+1) % n.
fn ring_grid(n: usize) -> UnstructuredGrid {
    let mut cell_faces = Vec::new();
    let mut cell_facepos = vec![0];
    for c in 0..n {
        cell_faces.push((c + n - 1) % n);
        cell_faces.push(c);
        cell_facepos.push(cell_faces.len());
    }
    let mut face_cells = Vec::new();
    let mut face_nodes = Vec::new();
    let mut face_nodepos = vec![0];
    for f in 0..n {
        face_cells.push(f as i32);
        face_cells.push(((f + 1) % n) as i32);
        face_nodes.push(2 * f);
        face_nodes.push(2 * f + 1);
        face_nodepos.push(face_nodes.len());
    }
    UnstructuredGrid::from_raw(2, cell_faces, cell_facepos, face_cells, face_nodes, face_nodepos)
        .unwrap()
}

/// A self-contained flow cycle must come out as one strongly connected
/// component, never split into singletons.
#[test]
fn closed_loop_is_one_component() {
    let g = ring_grid(5);
    let flux = vec![1.0; 5];
    let graph = build_upwind_graph(&g, &flux);
    let seq = decompose(&graph);
    assert_eq!(seq.num_components(), 1);
    assert_eq!(seq.component(0).len(), 5);
}

/// Acyclic flow decomposes into one singleton component per cell, emitted
/// with donors ahead of their dependents.
#[test]
fn acyclic_flow_gives_singleton_components() {
    let (g, flux, _, _) = uniform_x_problem(6, 4);
    let graph = build_upwind_graph(&g, &flux);
    let seq = decompose(&graph);
    assert_eq!(seq.num_components(), g.num_cells());

    let mut position = vec![0usize; g.num_cells()];
    for (p, &c) in seq.sequence().iter().enumerate() {
        position[c] = p;
    }
    for c in 0..g.num_cells() {
        for &d in graph.neighbors(c) {
            assert!(position[d] < position[c]);
        }
    }
}

/// Two identical solve calls produce bit-identical output; the face
/// auxiliary array is freshly scoped per call.
#[test]
fn solve_is_deterministic() {
    let (g, flux, pv, source) = uniform_x_problem(8, 8);
    for multidim in [false, true] {
        let solver = TofSolver::new().with_multidim_upwind(multidim);
        let a = solver.solve(&g, &flux, &pv, &source).unwrap();
        let b = solver.solve(&g, &flux, &pv, &source).unwrap();
        assert_eq!(a, b, "multidim={}", multidim);
    }
}

/// Swapping the cell order of one face without flipping the flux sign must
/// change the computed graph edges.
#[test]
fn face_cell_order_fixes_flux_sign() {
    let make = |swap: bool| {
        let pair = if swap { [1, 0] } else { [0, 1] };
        UnstructuredGrid::from_raw(
            2,
            vec![0, 0],
            vec![0, 1, 2],
            pair.to_vec(),
            vec![0, 1],
            vec![0, 2],
        )
        .unwrap()
    };
    let flux = vec![1.0];

    let graph = build_upwind_graph(&make(false), &flux);
    assert_eq!(graph.neighbors(0), &[] as &[usize]);
    assert_eq!(graph.neighbors(1), &[0]);

    let graph = build_upwind_graph(&make(true), &flux);
    assert_eq!(graph.neighbors(0), &[1]);
    assert_eq!(graph.neighbors(1), &[] as &[usize]);
}

/// With flow aligned to the grid, every transverse face is flux-free and
/// the multidimensional correction degenerates to the plain upwind value.
#[test]
fn multidim_matches_plain_on_aligned_flow() {
    let (g, flux, pv, source) = uniform_x_problem(8, 3);
    let plain = TofSolver::new().solve(&g, &flux, &pv, &source).unwrap();
    let corrected = TofSolver::new()
        .with_multidim_upwind(true)
        .solve(&g, &flux, &pv, &source)
        .unwrap();
    for (c, (a, b)) in plain.iter().zip(corrected.iter()).enumerate() {
        assert!((a - b).abs() < 1e-12, "cell {}: {} vs {}", c, a, b);
    }
}

/// On acyclic problems the cyclic strategy is never exercised, so both
/// strategies agree exactly.
#[test]
fn cyclic_strategy_irrelevant_for_acyclic_flow() {
    let (g, flux, pv, source) = uniform_x_problem(7, 5);
    let a = TofSolver::new().solve(&g, &flux, &pv, &source).unwrap();
    let b = TofSolver::new()
        .with_cyclic_strategy(CyclicStrategy::Linear)
        .solve(&g, &flux, &pv, &source)
        .unwrap();
    assert_eq!(a, b);
}
