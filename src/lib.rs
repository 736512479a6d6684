// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! A reorder-based time-of-flight solver for unstructured grids.
//!
//! This library computes the travel time of a conservative tracer for every
//! cell of a flow grid, given a fixed steady-state face-flux field. The
//! governing equation is first-order hyperbolic, so each cell depends only
//! on its upstream neighbors; the solver builds the directed upwind graph
//! induced by the flux, decomposes it into strongly connected components,
//! and solves component-by-component in dependency order. Recirculating
//! (cyclic) regions are resolved approximately or by a local direct linear
//! solve, and an optional multidimensional upwind correction blends
//! transverse face contributions into the upwind values.

#![warn(missing_docs)]

/// Error types for the library.
pub mod error;
/// Upwind graph construction from a signed flux field.
pub mod graph;
/// Grid topology trait and a CSR-backed unstructured grid.
pub mod grid;
/// Field I/O for loading flux/volume data and saving time-of-flight.
pub mod io;
/// Multidimensional upwind correction of face-level values.
pub mod multidim;
/// Strongly-connected-component decomposition and processing order.
pub mod reorder;
/// The reorder-driven transport solver.
pub mod solver;

pub use crate::error::{Result, TofError};
pub use crate::graph::{build_upwind_graph, UpwindGraph};
pub use crate::grid::{GridTopology, UnstructuredGrid};
pub use crate::reorder::{decompose, ReorderSequence};
pub use crate::solver::{CyclicStrategy, TofSolver};
