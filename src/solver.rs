// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, TofError};
use crate::graph::build_upwind_graph;
use crate::grid::GridTopology;
use crate::multidim;
use crate::reorder::decompose;

/// How strongly connected components of more than one cell are resolved.
///
/// Recirculating flow means each cell in such a component genuinely depends
/// on another cell in the same component, so no processing order resolves
/// all dependencies up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclicStrategy {
    /// One application of the single-cell update over the component in
    /// emitted order, using whatever neighbor values are currently available.
    /// This is an approximation, not a converged solve; it never fails, but
    /// same-component neighbor values may be stale on the pass.
    SinglePass,
    /// Assemble the component's volume-balance equations as a dense linear
    /// system in the component's unknown time-of-flight values and solve it
    /// directly. Exact for the plain upwind scheme; fails on singular
    /// components (e.g. a closed loop with no sink).
    Linear,
}

/// Reorder-driven time-of-flight solver.
///
/// Computes the travel time of a conservative tracer for every cell of a
/// grid, given a steady signed face-flux field. The flux-induced cell graph
/// is decomposed into strongly connected components which are solved in
/// dependency order; singleton components admit a closed-form update, larger
/// ones are handled by the configured [`CyclicStrategy`].
pub struct TofSolver {
    use_multidim_upwind: bool,
    cyclic_strategy: CyclicStrategy,
}

impl Default for TofSolver {
    fn default() -> Self {
        TofSolver::new()
    }
}

impl TofSolver {
    /// Create a solver with plain single-cell upwinding and the single-pass
    /// cyclic strategy.
    pub fn new() -> Self {
        TofSolver {
            use_multidim_upwind: false,
            cyclic_strategy: CyclicStrategy::SinglePass,
        }
    }

    /// Enable or disable the multidimensional upwind correction (builder
    /// method). Disabled by default.
    pub fn with_multidim_upwind(mut self, enable: bool) -> Self {
        self.use_multidim_upwind = enable;
        self
    }

    /// Select the resolution strategy for cyclic components (builder
    /// method). Default is [`CyclicStrategy::SinglePass`].
    pub fn with_cyclic_strategy(mut self, strategy: CyclicStrategy) -> Self {
        self.cyclic_strategy = strategy;
        self
    }

    /// Solve for time-of-flight.
    ///
    /// # Parameters
    /// - `flux`: signed flux per face; positive means flow from the first
    ///   cell listed by the grid's `cells_of_face` to the second
    /// - `pore_volume`: positive volume per cell
    /// - `source`: per-cell source term; positive = injection, negative =
    ///   extraction. Must sum to (numerically) zero over the grid.
    ///
    /// # Errors
    /// Returns an error if an input array length does not match the grid, or
    /// if the cumulative source exceeds 1% of the largest single source
    /// magnitude. With [`CyclicStrategy::Linear`], a singular cyclic
    /// component is also an error.
    ///
    /// A cell with zero total downwind flux (no sink and no outflow) divides
    /// by zero; the resulting non-finite value propagates to the output.
    /// This degenerate case is documented, not trapped.
    pub fn solve<G: GridTopology>(
        &self,
        grid: &G,
        flux: &[f64],
        pore_volume: &[f64],
        source: &[f64],
    ) -> Result<Vec<f64>> {
        check_len("flux", flux, grid.num_faces())?;
        check_len("pore_volume", pore_volume, grid.num_cells())?;
        check_len("source", source, grid.num_cells())?;
        check_source_balance(source)?;

        let graph = build_upwind_graph(grid, flux);
        let sequence = decompose(&graph);

        let mut transport = Transport {
            grid,
            flux,
            pore_volume,
            source,
            use_multidim_upwind: self.use_multidim_upwind,
            tof: vec![0.0; grid.num_cells()],
            face_tof: if self.use_multidim_upwind {
                vec![0.0; grid.num_faces()]
            } else {
                Vec::new()
            },
            adj_faces: Vec::new(),
            component_of: sequence.component_of().to_vec(),
        };

        for cells in sequence.components() {
            if cells.len() == 1 {
                transport.solve_single_cell(cells[0]);
            } else {
                transport.solve_multi_cell(cells, self.cyclic_strategy)?;
            }
        }

        Ok(transport.tof)
    }
}

fn check_len(name: &'static str, array: &[f64], expected: usize) -> Result<()> {
    if array.len() != expected {
        return Err(TofError::LengthMismatch {
            name,
            expected,
            got: array.len(),
        });
    }
    Ok(())
}

/// The field is a closed flow system: sources must balance sinks. A
/// cumulative source beyond 1% of the largest single source magnitude is a
/// correctness-threatening input error.
fn check_source_balance(source: &[f64]) -> Result<()> {
    let sum: f64 = source.iter().sum();
    let max_magnitude = source.iter().fold(0.0_f64, |m, &s| m.max(s.abs()));
    let limit = 1e-2 * max_magnitude;
    if sum.abs() > limit {
        return Err(TofError::UnbalancedSource { sum, limit });
    }
    Ok(())
}

/// Per-solve state: the output array, the face auxiliary array for the
/// multidimensional correction, and scratch buffers. Owned exclusively for
/// the duration of one solve call.
struct Transport<'a, G: GridTopology> {
    grid: &'a G,
    flux: &'a [f64],
    pore_volume: &'a [f64],
    source: &'a [f64],
    use_multidim_upwind: bool,
    tof: Vec<f64>,
    face_tof: Vec<f64>,
    adj_faces: Vec<usize>,
    component_of: Vec<usize>,
}

impl<G: GridTopology> Transport<'_, G> {
    /// Signed flux out of `cell` across `face`, and the cell on the other
    /// side (None for boundary faces).
    fn out_flux(&self, cell: usize, face: usize) -> (f64, Option<usize>) {
        let (first, second) = self.grid.cells_of_face(face);
        if first == Some(cell) {
            (self.flux[face], second)
        } else {
            (-self.flux[face], first)
        }
    }

    /// Closed-form volume-balance update for a cell whose upstream
    /// dependencies are all resolved.
    ///
    /// Sources have zero time-of-flight and therefore contribute nothing to
    /// the upwind term; sinks enter the downwind flux (the sign flip comes
    /// from the differing conventions: positive source is injection,
    /// positive out-flux is outflow). Boundary faces contribute neither.
    fn solve_single_cell(&mut self, cell: usize) {
        let mut upwind_term = 0.0;
        let mut downwind_flux = (-self.source[cell]).max(0.0);
        for &f in self.grid.faces_of_cell(cell) {
            let (out_flux, other) = self.out_flux(cell, f);
            let Some(other) = other else { continue };
            if out_flux < 0.0 {
                if self.use_multidim_upwind {
                    let ftof = multidim::multidim_upwind_tof(
                        self.grid,
                        self.flux,
                        &self.tof,
                        &self.face_tof,
                        f,
                        other,
                        &mut self.adj_faces,
                    );
                    self.face_tof[f] = ftof;
                    upwind_term += out_flux * ftof;
                } else {
                    upwind_term += out_flux * self.tof[other];
                }
            } else {
                downwind_flux += out_flux;
            }
        }

        self.tof[cell] = (self.pore_volume[cell] - upwind_term) / downwind_flux;
    }

    fn solve_multi_cell(&mut self, cells: &[usize], strategy: CyclicStrategy) -> Result<()> {
        match strategy {
            CyclicStrategy::SinglePass => {
                log::warn!(
                    "cyclic component of {} cells: applying a single approximate upwind pass",
                    cells.len()
                );
                for &cell in cells {
                    self.solve_single_cell(cell);
                }
                Ok(())
            }
            CyclicStrategy::Linear => self.solve_multi_cell_linear(cells),
        }
    }

    /// Direct solve of the component's balance equations.
    ///
    /// Unknowns are the time-of-flight values of the component's cells; for
    /// each cell, `downwind_flux * tof[cell] - sum(influx * tof[donor])`
    /// over same-component donors equals the pore volume plus the inflow
    /// contribution of already-solved donors outside the component. Inside
    /// a cyclic component the plain upwind value is used even when the
    /// multidimensional correction is enabled; the face cache is filled from
    /// the solved cell values afterwards.
    fn solve_multi_cell_linear(&mut self, cells: &[usize]) -> Result<()> {
        let n = cells.len();
        let comp = self.component_of[cells[0]];
        let mut local = std::collections::HashMap::with_capacity(n);
        for (r, &cell) in cells.iter().enumerate() {
            local.insert(cell, r);
        }

        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut b = DVector::<f64>::zeros(n);
        for (r, &cell) in cells.iter().enumerate() {
            let mut downwind_flux = (-self.source[cell]).max(0.0);
            b[r] = self.pore_volume[cell];
            for &f in self.grid.faces_of_cell(cell) {
                let (out_flux, other) = self.out_flux(cell, f);
                let Some(other) = other else { continue };
                if out_flux < 0.0 {
                    let influx = -out_flux;
                    if self.component_of[other] == comp {
                        a[(r, local[&other])] -= influx;
                    } else {
                        b[r] += influx * self.tof[other];
                    }
                } else {
                    downwind_flux += out_flux;
                }
            }
            a[(r, r)] += downwind_flux;
        }

        let x = a
            .lu()
            .solve(&b)
            .ok_or(TofError::SingularComponent { size: n })?;
        for (r, &cell) in cells.iter().enumerate() {
            self.tof[cell] = x[r];
        }

        if self.use_multidim_upwind {
            // Later updates may read these faces as transverse neighbors.
            for &cell in cells {
                for &f in self.grid.faces_of_cell(cell) {
                    let (out_flux, other) = self.out_flux(cell, f);
                    if let Some(other) = other {
                        if out_flux < 0.0 {
                            self.face_tof[f] = self.tof[other];
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
