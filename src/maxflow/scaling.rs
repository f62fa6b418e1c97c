// Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! This module implements a capacity scaling variant of Dinic' max flow
//! algorithm that reports every single step.
//!
//! In each phase only arcs with a residual capacity of at least
//! `2^flow_rate` are admissible. A phase builds the level graph by a
//! breadth-first-search from the source and then pushes exactly
//! `2^flow_rate` units along shortest augmenting paths found by a
//! depth-first-search until the level graph is blocked. If the sink
//! cannot be reached anymore, `flow_rate` is decreased. The algorithm
//! stops once the sink is unreachable with `flow_rate == 0`.
//!
//! Every change of a vertex or arc status calls the sink passed to
//! [`ScalingMaxFlow::run`], which may pull a [`MaxFlowData`] snapshot.
//!
//! # Example
//!
//! ```
//! use flowscope::graph::FlowGraph;
//! use flowscope::maxflow::ScalingMaxFlow;
//!
//! let mut g = FlowGraph::<u32>::new(4);
//! g.add_edge(0, 1, 1).unwrap();
//! g.add_edge(0, 2, 2).unwrap();
//! g.add_edge(2, 1, 1).unwrap();
//! g.add_edge(1, 3, 2).unwrap();
//! g.add_edge(2, 3, 1).unwrap();
//!
//! let mut maxflow = ScalingMaxFlow::new(g);
//! let mut steps = 0;
//! let value = maxflow.run(|_| steps += 1).unwrap();
//!
//! assert_eq!(value, 3);
//! assert_eq!(maxflow.flow_rate(), 0);
//! assert!(steps > 0);
//! ```

use crate::error::{Error, Result};
use crate::graph::{Edge, FlowGraph, Status};
use crate::num::traits::{NumAssign, PrimInt, Unsigned};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

const UNREACHED: usize = usize::MAX;

/// Snapshot of the solver state handed to observers.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxFlowData<F> {
    pub edges: Vec<Edge<F>>,
    pub vertices: Vec<Status>,
    /// The arc changed by the latest step, if that step changed an arc.
    pub updated_edge: Option<usize>,
    /// The current threshold exponent.
    pub flow_rate: u32,
    pub pushed_flow: F,
}

/// The capacity scaling max-flow algorithm.
#[derive(Debug, Clone)]
pub struct ScalingMaxFlow<F> {
    g: FlowGraph<F>,
    dist: Vec<usize>,
    /// Position of the next unexplored arc in each adjacency list.
    current: Vec<usize>,
    path: Vec<usize>,
    updated_edge: Option<usize>,
    flow_rate: u32,
    pushed_flow: F,
}

/// Return the smallest `k` with `2^k >= x`.
fn ceil_log2<F>(x: F) -> u32
where
    F: PrimInt,
{
    if x <= F::one() {
        0
    } else {
        F::zero().count_zeros() - (x - F::one()).leading_zeros()
    }
}

impl<F> ScalingMaxFlow<F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    /// Create a new instance on `g`.
    ///
    /// The state is reset, i.e. the threshold is computed from the current
    /// capacities.
    pub fn new(g: FlowGraph<F>) -> Self {
        let mut maxflow = ScalingMaxFlow {
            g,
            dist: vec![],
            current: vec![],
            path: vec![],
            updated_edge: None,
            flow_rate: 0,
            pushed_flow: F::zero(),
        };
        maxflow.reset_state();
        maxflow
    }

    pub fn graph(&self) -> &FlowGraph<F> {
        &self.g
    }

    /// Return the graph for modification.
    ///
    /// Callers should call [`reset_state`](Self::reset_state) afterwards.
    pub fn graph_mut(&mut self) -> &mut FlowGraph<F> {
        &mut self.g
    }

    /// Replace the graph, e.g. with a restored snapshot.
    pub fn set_graph(&mut self, g: FlowGraph<F>) {
        self.g = g;
    }

    pub fn flow_rate(&self) -> u32 {
        self.flow_rate
    }

    pub fn set_flow_rate(&mut self, flow_rate: u32) {
        self.flow_rate = flow_rate;
    }

    /// Return the current threshold `2^flow_rate`.
    pub fn threshold(&self) -> F {
        F::one() << self.flow_rate as usize
    }

    /// Return the flow pushed so far.
    pub fn pushed_flow(&self) -> F {
        self.pushed_flow
    }

    pub fn reset_pushed_flow(&mut self) {
        self.pushed_flow = F::zero();
    }

    pub fn updated_edge(&self) -> Option<usize> {
        self.updated_edge
    }

    /// Return the BFS distance of vertex `u` in the latest level graph.
    pub fn dist(&self, u: usize) -> Option<usize> {
        self.dist.get(u).copied().filter(|&d| d != UNREACHED)
    }

    /// Return a snapshot of the current state.
    pub fn data(&self) -> MaxFlowData<F> {
        MaxFlowData {
            edges: self.g.arcs().to_vec(),
            vertices: self.g.statuses().to_vec(),
            updated_edge: self.updated_edge,
            flow_rate: self.flow_rate,
            pushed_flow: self.pushed_flow,
        }
    }

    /// Recompute the threshold from the capacities and clear all statuses.
    pub fn reset_state(&mut self) {
        // 2^flow_rate must be representable in F
        let max_rate = F::zero().count_zeros() - 1;
        self.flow_rate = ceil_log2(self.g.max_capacity()).min(max_rate);
        self.g.reset_statuses();
        self.updated_edge = None;
        self.path.clear();
    }

    /// Solve the max-flow problem without reporting steps.
    pub fn solve(&mut self) -> Result<F> {
        self.run(|_| {})
    }

    /// Solve the max-flow problem from vertex `0` to vertex `n-1`.
    ///
    /// The sink `emit` is called after each step. Returns the total flow
    /// pushed, including flow pushed before this call.
    ///
    /// Fails with [`Error::CapacityOverflow`] before the first step if the
    /// flow pushed so far plus the residual capacity leaving the source
    /// does not fit into `F`.
    pub fn run<E>(&mut self, mut emit: E) -> Result<F>
    where
        E: FnMut(&Self),
    {
        if self.g.num_vertices() < 2 {
            return Ok(self.pushed_flow);
        }

        // every augmenting path leaves the source exactly once
        let src = self.g.source();
        self.g
            .adjacency(src)
            .iter()
            .try_fold(self.pushed_flow, |sum, &e| sum.checked_add(&self.g.arc(e).capacity))
            .ok_or(Error::CapacityOverflow)?;

        loop {
            if self.find_network(&mut emit) {
                while self.find_path() {
                    self.process_path(&mut emit);
                }
                self.set_basic(&mut emit);
            } else {
                self.set_basic(&mut emit);
                if self.flow_rate == 0 {
                    break;
                }
                self.flow_rate -= 1;
            }
        }

        Ok(self.pushed_flow)
    }

    fn set_basic<E>(&mut self, emit: &mut E)
    where
        E: FnMut(&Self),
    {
        self.g.reset_statuses();
        self.updated_edge = None;
        emit(&*self);
    }

    fn mark_vertex<E>(&mut self, u: usize, status: Status, emit: &mut E)
    where
        E: FnMut(&Self),
    {
        self.g.set_vertex_status(u, status);
        self.updated_edge = None;
        emit(&*self);
    }

    fn mark_arc<E>(&mut self, e: usize, status: Status, emit: &mut E)
    where
        E: FnMut(&Self),
    {
        self.g.set_arc_status(e, status);
        self.updated_edge = Some(e);
        emit(&*self);
    }

    /// Build the level graph of admissible arcs.
    ///
    /// Returns `true` if the sink is reachable.
    fn find_network<E>(&mut self, emit: &mut E) -> bool
    where
        E: FnMut(&Self),
    {
        let n = self.g.num_vertices();
        let src = self.g.source();
        let snk = self.g.sink();
        let threshold = self.threshold();

        self.dist.clear();
        self.dist.resize(n, UNREACHED);
        self.current.clear();
        self.current.resize(n, 0);

        self.dist[src] = 0;
        self.mark_vertex(src, Status::OnTheNetwork, emit);

        let mut queue = std::collections::VecDeque::with_capacity(n);
        queue.push_back(src);
        while let Some(u) = queue.pop_front() {
            let d = self.dist[u];
            for i in 0..self.g.adjacency(u).len() {
                let e = self.g.adjacency(u)[i];
                let arc = self.g.arc(e);
                let v = arc.to;
                if arc.capacity < threshold || self.dist[v] != UNREACHED {
                    continue;
                }
                self.dist[v] = d + 1;
                queue.push_back(v);
                self.mark_arc(e, Status::OnTheNetwork, emit);
                self.mark_vertex(v, Status::OnTheNetwork, emit);
            }
        }

        self.dist[snk] != UNREACHED
    }

    /// Search an augmenting path in the level graph.
    ///
    /// On success the arcs of the path from source to sink are stored in
    /// `self.path`. Arcs that lead to dead ends are skipped for the rest of
    /// the phase.
    fn find_path(&mut self) -> bool {
        let src = self.g.source();
        let snk = self.g.sink();
        let threshold = self.threshold();

        self.path.clear();
        let mut u = src;
        loop {
            if u == snk {
                return true;
            }

            let mut next = None;
            while self.current[u] < self.g.adjacency(u).len() {
                let e = self.g.adjacency(u)[self.current[u]];
                let arc = self.g.arc(e);
                if arc.capacity >= threshold && self.dist[arc.to] == self.dist[u] + 1 {
                    next = Some((e, arc.to));
                    break;
                }
                self.current[u] += 1;
            }

            match next {
                Some((e, v)) => {
                    self.path.push(e);
                    u = v;
                }
                None => match self.path.pop() {
                    // dead end, retreat and skip the arc leading here
                    Some(e) => {
                        u = self.g.arc(e).u;
                        self.current[u] += 1;
                    }
                    None => return false,
                },
            }
        }
    }

    /// Push `2^flow_rate` units along the path found last.
    fn process_path<E>(&mut self, emit: &mut E)
    where
        E: FnMut(&Self),
    {
        let threshold = self.threshold();
        let path = std::mem::take(&mut self.path);

        self.mark_vertex(self.g.source(), Status::OnThePath, emit);
        for &e in &path {
            self.mark_arc(e, Status::OnThePath, emit);
            self.g.push(e, threshold);
            let v = self.g.arc(e).to;
            self.mark_vertex(v, Status::OnThePath, emit);
        }

        self.pushed_flow += threshold;
        self.updated_edge = None;
        emit(&*self);

        self.g.set_vertex_status(self.g.source(), Status::OnTheNetwork);
        for &e in &path {
            let v = self.g.arc(e).to;
            self.g.set_arc_status(e, Status::OnTheNetwork);
            self.g.set_vertex_status(v, Status::OnTheNetwork);
        }
        emit(&*self);

        self.path = path;
    }
}

#[cfg(test)]
mod tests {
    use super::{ceil_log2, MaxFlowData, ScalingMaxFlow};
    use crate::error::Error;
    use crate::graph::{FlowGraph, Status};

    fn sample() -> FlowGraph<u32> {
        let mut g = FlowGraph::new(4);
        g.add_edge(0, 1, 1).unwrap();
        g.add_edge(0, 2, 2).unwrap();
        g.add_edge(2, 1, 1).unwrap();
        g.add_edge(1, 3, 2).unwrap();
        g.add_edge(2, 3, 1).unwrap();
        g
    }

    fn record(maxflow: &mut ScalingMaxFlow<u32>) -> Vec<MaxFlowData<u32>> {
        let mut steps = vec![];
        maxflow.run(|s| steps.push(s.data())).unwrap();
        steps
    }

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(0u32), 0);
        assert_eq!(ceil_log2(1u32), 0);
        assert_eq!(ceil_log2(2u32), 1);
        assert_eq!(ceil_log2(3u32), 2);
        assert_eq!(ceil_log2(4u32), 2);
        assert_eq!(ceil_log2(100u64), 7);
        assert_eq!(ceil_log2(255u8), 8);
    }

    #[test]
    fn test_sample_value() {
        let mut maxflow = ScalingMaxFlow::new(sample());
        assert_eq!(maxflow.flow_rate(), 1);
        assert_eq!(maxflow.solve(), Ok(3));
        assert_eq!(maxflow.flow_rate(), 0);
        assert!(maxflow.graph().statuses().iter().all(|&s| s == Status::Basic));
    }

    #[test]
    fn test_first_steps() {
        let mut maxflow = ScalingMaxFlow::new(sample());
        let steps = record(&mut maxflow);

        // phase with threshold 2: only 0->2 is admissible
        assert_eq!(steps[0].vertices[0], Status::OnTheNetwork);
        assert_eq!(steps[0].updated_edge, None);
        assert_eq!(steps[0].flow_rate, 1);
        assert_eq!(steps[1].updated_edge, Some(2));
        assert_eq!(steps[1].edges[2].status, Status::OnTheNetwork);
        assert_eq!(steps[2].vertices[2], Status::OnTheNetwork);
        assert!(steps[3].vertices.iter().all(|&s| s == Status::Basic));
        assert_eq!(steps[3].flow_rate, 1);

        // next phase with threshold 1
        assert_eq!(steps[4].flow_rate, 0);
        assert_eq!(steps[4].vertices[0], Status::OnTheNetwork);
        assert_eq!(steps[5].updated_edge, Some(0));
    }

    #[test]
    fn test_network_before_path() {
        let mut maxflow = ScalingMaxFlow::new(sample());
        let steps = record(&mut maxflow);

        let first_net = steps
            .iter()
            .position(|s| s.vertices[0] == Status::OnTheNetwork)
            .unwrap();
        let first_path = steps
            .iter()
            .position(|s| {
                s.vertices.iter().any(|&v| v == Status::OnThePath)
                    || s.edges.iter().any(|a| a.status == Status::OnThePath)
            })
            .unwrap();
        assert!(first_net < first_path);
    }

    #[test]
    fn test_pushed_flow_monotone() {
        let mut maxflow = ScalingMaxFlow::new(sample());
        let steps = record(&mut maxflow);
        assert!(steps.windows(2).all(|w| w[0].pushed_flow <= w[1].pushed_flow));
        assert_eq!(steps.last().unwrap().pushed_flow, 3);
    }

    #[test]
    fn test_path_steps() {
        let mut maxflow = ScalingMaxFlow::new(sample());
        let steps = record(&mut maxflow);

        // the first augmentation happens along 0->1->3
        let i = steps
            .iter()
            .position(|s| s.vertices[0] == Status::OnThePath)
            .unwrap();
        assert_eq!(steps[i].updated_edge, None);
        assert_eq!(steps[i + 1].updated_edge, Some(0));
        assert_eq!(steps[i + 1].edges[0].capacity, 1);
        assert_eq!(steps[i + 2].edges[0].capacity, 0);
        assert_eq!(steps[i + 2].edges[1].capacity, 1);
        assert_eq!(steps[i + 2].vertices[1], Status::OnThePath);
        assert_eq!(steps[i + 3].updated_edge, Some(6));
        assert_eq!(steps[i + 4].vertices[3], Status::OnThePath);
        assert_eq!(steps[i + 5].pushed_flow, 1);
        assert_eq!(steps[i + 6].vertices[3], Status::OnTheNetwork);
        assert_eq!(steps[i + 6].edges[0].status, Status::OnTheNetwork);
    }

    #[test]
    fn test_reset_idempotent() {
        let mut maxflow = ScalingMaxFlow::new(sample());
        maxflow.graph_mut().set_arc_status(0, Status::OnThePath);
        maxflow.reset_state();
        let once = maxflow.data();
        maxflow.reset_state();
        assert_eq!(maxflow.data(), once);
        assert_eq!(once.flow_rate, 1);
        assert!(once.edges.iter().all(|a| a.status == Status::Basic));
    }

    #[test]
    fn test_unreachable_sink() {
        let mut g = FlowGraph::<u32>::new(3);
        g.add_edge(0, 1, 5).unwrap();
        let mut maxflow = ScalingMaxFlow::new(g);
        assert_eq!(maxflow.flow_rate(), 3);
        assert_eq!(maxflow.solve(), Ok(0));
        assert_eq!(maxflow.dist(1), Some(1));
        assert_eq!(maxflow.dist(2), None);
    }

    #[test]
    fn test_large_capacity_fits_type() {
        let mut g = FlowGraph::<u8>::new(2);
        g.add_edge(0, 1, 255).unwrap();
        let mut maxflow = ScalingMaxFlow::new(g);
        assert_eq!(maxflow.flow_rate(), 7);
        assert_eq!(maxflow.solve(), Ok(255));
    }

    #[test]
    fn test_flow_value_exceeds_type() {
        let mut g = FlowGraph::<u8>::new(3);
        g.add_edge(0, 2, 200).unwrap();
        g.add_edge(0, 1, 200).unwrap();
        g.add_edge(1, 2, 200).unwrap();
        let mut maxflow = ScalingMaxFlow::new(g);
        let before = maxflow.data();

        let mut steps = 0;
        assert_eq!(maxflow.run(|_| steps += 1), Err(Error::CapacityOverflow));
        assert_eq!(steps, 0);
        assert_eq!(maxflow.data(), before);
    }

    #[test]
    fn test_rerun_counts_pushed_flow() {
        let mut g = FlowGraph::<u8>::new(2);
        g.add_edge(0, 1, 200).unwrap();
        let mut maxflow = ScalingMaxFlow::new(g);
        assert_eq!(maxflow.solve(), Ok(200));

        maxflow.graph_mut().add_edge(0, 1, 55).unwrap();
        maxflow.reset_state();
        assert_eq!(maxflow.solve(), Ok(255));
    }
}
