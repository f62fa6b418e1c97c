// Copyright (c) 2015-2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//! This module implements the max flow algorithm of Edmonds-Karp.
//!
//! The algorithm works on a copy of the residual capacities of a
//! [`FlowGraph`] and does not report any steps. It serves as reference for
//! the animated scaling algorithm.
//!
//! # Example
//!
//! ```
//! use flowscope::graph::FlowGraph;
//! use flowscope::maxflow::edmondskarp;
//!
//! // s = 0, a = 1, b = 2, c = 3, d = 4, t = 5
//! let mut g = FlowGraph::<u32>::new(6);
//! g.add_edge(0, 1, 5).unwrap();
//! g.add_edge(0, 3, 5).unwrap();
//! g.add_edge(1, 2, 2).unwrap();
//! g.add_edge(1, 3, 1).unwrap();
//! g.add_edge(1, 4, 1).unwrap();
//! g.add_edge(3, 4, 2).unwrap();
//! g.add_edge(4, 2, 2).unwrap();
//! g.add_edge(2, 5, 4).unwrap();
//! g.add_edge(4, 5, 5).unwrap();
//!
//! let (value, mut mincut) = edmondskarp(&g);
//! assert_eq!(value, 5);
//! mincut.sort();
//! assert_eq!(mincut, vec![0, 1, 3]);
//! ```

use crate::graph::FlowGraph;
use crate::num::traits::{NumAssign, PrimInt, Unsigned};

use std::cmp::min;
use std::collections::VecDeque;

/// Max-flow algorithm of Edmonds and Karp.
pub struct EdmondsKarp<'a, F> {
    g: &'a FlowGraph<F>,
    pred: Vec<(usize, usize)>,
    residual: Vec<F>,
    queue: VecDeque<usize>,
    value: F,
}

impl<'a, F> EdmondsKarp<'a, F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    /// Create a new Edmonds-Karp algorithm instance for a graph.
    pub fn new(g: &'a FlowGraph<F>) -> Self {
        EdmondsKarp {
            g,
            pred: vec![(usize::max_value(), usize::max_value()); g.num_vertices()],
            residual: vec![F::zero(); g.num_arcs()],
            queue: VecDeque::with_capacity(g.num_vertices()),
            value: F::zero(),
        }
    }

    /// Return the underlying graph.
    pub fn as_graph(&self) -> &'a FlowGraph<F> {
        self.g
    }

    /// Return the value of the latest computed maximum flow.
    pub fn value(&self) -> F {
        self.value
    }

    /// Return the residual capacity of arc `e` after the latest run.
    pub fn residual(&self, e: usize) -> F {
        self.residual[e]
    }

    /// Solve the maxflow problem from the first to the last vertex.
    ///
    /// The current residual capacities of the graph are the upper bounds.
    /// The flow value must fit into `F`, see [`FlowGraph::source_capacity`].
    pub fn solve(&mut self) {
        for (e, r) in self.residual.iter_mut().enumerate() {
            *r = self.g.arc(e).capacity;
        }
        self.value = F::zero();

        let n = self.g.num_vertices();
        // nothing to do if there is no edge
        if n < 2 || self.g.num_arcs() == 0 {
            self.pred.fill((usize::max_value(), usize::max_value()));
            return;
        }
        let src = self.g.source();
        let snk = self.g.sink();

        loop {
            // do bfs from source to sink
            self.pred.fill((usize::max_value(), usize::max_value()));

            // just some dummy arc
            self.pred[src] = (0, 0);
            self.queue.clear();
            self.queue.push_back(src);
            'bfs: while let Some(u) = self.queue.pop_front() {
                for &e in self.g.adjacency(u) {
                    let v = self.g.arc(e).to;
                    if self.pred[v].0 == usize::max_value() && !self.residual[e].is_zero() {
                        self.pred[v] = (e, u);
                        self.queue.push_back(v);
                        if v == snk {
                            break 'bfs;
                        }
                    }
                }
            }

            // sink cannot be reached -> stop
            if self.pred[snk].0 == usize::max_value() {
                break;
            }

            // compute augmentation value
            let mut v = snk;
            let mut df = self.residual[self.pred[v].0];
            while v != src {
                let (e, u) = self.pred[v];
                df = min(df, self.residual[e]);
                v = u;
            }

            debug_assert!(!df.is_zero());

            // now augment the flow
            let mut v = snk;
            while v != src {
                let (e, u) = self.pred[v];
                self.residual[e] -= df;
                self.residual[e ^ 1] += df;
                v = u;
            }

            self.value += df;
        }
    }

    /// Return the minimal cut associated with the last maximum flow.
    pub fn mincut(&self) -> Vec<usize> {
        (0..self.g.num_vertices())
            .filter(|&u| self.pred[u].0 != usize::max_value())
            .collect()
    }
}

/// Solve the maxflow problem using the algorithm of Edmonds-Karp.
///
/// The function solves the max flow problem from the first to the last
/// vertex of `g` with the current residual capacities as upper bounds.
/// The graph itself is not modified.
///
/// The function returns the flow value and the vertices in a minimal cut.
pub fn edmondskarp<F>(g: &FlowGraph<F>) -> (F, Vec<usize>)
where
    F: PrimInt + Unsigned + NumAssign,
{
    let mut maxflow = EdmondsKarp::new(g);
    maxflow.solve();
    (maxflow.value(), maxflow.mincut())
}
