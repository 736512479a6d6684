// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::graph::UpwindGraph;

/// An ordered partition of all cells into strongly connected components.
///
/// `sequence` is a flattening of the cells grouped by component;
/// `component_starts` delimits the groups. Components appear in dependency
/// order for the upwind graph: every component is listed after all
/// components it depends on, so cells can be solved by walking the sequence
/// front to back.
pub struct ReorderSequence {
    sequence: Vec<usize>,
    component_starts: Vec<usize>,
    component_of: Vec<usize>,
}

impl ReorderSequence {
    /// Number of strongly connected components. Always between 1 and the
    /// number of cells for a non-empty graph.
    pub fn num_components(&self) -> usize {
        self.component_starts.len() - 1
    }

    /// The full processing order over all cells.
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Cells of the `i`-th component, in emission order.
    pub fn component(&self, i: usize) -> &[usize] {
        &self.sequence[self.component_starts[i]..self.component_starts[i + 1]]
    }

    /// Iterate over components in processing order.
    pub fn components(&self) -> impl Iterator<Item = &[usize]> {
        (0..self.num_components()).map(move |i| self.component(i))
    }

    /// Component id of every cell.
    pub fn component_of(&self) -> &[usize] {
        &self.component_of
    }
}

const UNVISITED: usize = usize::MAX;

/// Decompose the upwind graph into strongly connected components using
/// Tarjan's algorithm, iteratively with an explicit DFS stack.
///
/// A single traversal maintains discovery indices and low-link values; a
/// component is finalized exactly when the low-link of its root equals the
/// root's own discovery index, at which point the cells above the root on
/// the discovery stack are popped as one component. Since graph edges point
/// from a cell to its upwind donors, components are emitted donors-first:
/// each finalized component can only reach components emitted before it.
///
/// Runs in O(cells + edges). Component membership and order are
/// deterministic for a fixed graph.
pub fn decompose(graph: &UpwindGraph) -> ReorderSequence {
    let n = graph.num_vertices();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;

    let mut sequence = Vec::with_capacity(n);
    let mut component_starts = vec![0usize];
    let mut component_of = vec![0usize; n];

    // DFS frames: (vertex, next outgoing edge to examine).
    let mut dfs: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        dfs.push((root, 0));

        while let Some(frame) = dfs.last_mut() {
            let v = frame.0;
            let donors = graph.neighbors(v);
            if frame.1 < donors.len() {
                let w = donors[frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    dfs.push((w, 0));
                } else if on_stack[w] && index[w] < lowlink[v] {
                    lowlink[v] = index[w];
                }
            } else {
                dfs.pop();
                if let Some(&(parent, _)) = dfs.last() {
                    if lowlink[v] < lowlink[parent] {
                        lowlink[parent] = lowlink[v];
                    }
                }
                if lowlink[v] == index[v] {
                    // v roots a component: pop the discovery stack down to v.
                    let comp = component_starts.len() - 1;
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component_of[w] = comp;
                        sequence.push(w);
                        if w == v {
                            break;
                        }
                    }
                    component_starts.push(sequence.len());
                }
            }
        }
    }

    debug_assert_eq!(sequence.len(), n);
    ReorderSequence {
        sequence,
        component_starts,
        component_of,
    }
}
