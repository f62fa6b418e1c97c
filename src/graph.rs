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

//! The editable flow network.
//!
//! Every user edge `u->to` with capacity `c` is stored as a pair of arcs:
//! the forward arc `u->to` with capacity `c` at an even index `i` and the
//! residual arc `to->u` with capacity `0` at index `i ^ 1`. The capacities
//! stored in the arcs are *residual* capacities, i.e. pushing flow along an
//! arc moves capacity from the arc to its partner.
//!
//! # Example
//!
//! ```
//! use flowscope::graph::FlowGraph;
//!
//! let mut g = FlowGraph::<u32>::new(3);
//! let e = g.add_edge(0, 1, 5).unwrap();
//! g.add_edge(0, 1, 3).unwrap();
//! g.add_edge(1, 2, 4).unwrap();
//!
//! assert_eq!(g.num_edges(), 2);
//! assert_eq!(g.arc(e).capacity, 8);
//! assert_eq!(g.arc(e ^ 1).capacity, 0);
//! assert_eq!(g.adjacency(1), &[1, 2]);
//! ```

use crate::error::{Error, Result};
use crate::num::traits::{NumAssign, PrimInt, Unsigned};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// The role of a vertex or an arc in the most recent algorithmic step.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Basic,
    OnTheNetwork,
    OnThePath,
}

impl Default for Status {
    fn default() -> Self {
        Status::Basic
    }
}

impl Status {
    /// Return the status a transition into `self` starts from.
    pub fn previous(self) -> Status {
        match self {
            Status::OnThePath => Status::OnTheNetwork,
            Status::OnTheNetwork | Status::Basic => Status::Basic,
        }
    }
}

/// A user edge given by its endpoints and a capacity delta.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicEdge<F> {
    pub u: usize,
    pub to: usize,
    pub delta: F,
}

/// A stored arc.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<F> {
    pub u: usize,
    pub to: usize,
    pub capacity: F,
    pub status: Status,
}

impl<F> Edge<F> {
    fn new(u: usize, to: usize, capacity: F) -> Self {
        Edge {
            u,
            to,
            capacity,
            status: Status::Basic,
        }
    }
}

/// A directed multigraph of forward/residual arc pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowGraph<F> {
    arcs: Vec<Edge<F>>,
    adj: Vec<Vec<usize>>,
    vertices: Vec<Status>,
}

impl<F> FlowGraph<F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    /// Create a graph with `n` vertices and no edges.
    pub fn new(n: usize) -> Self {
        FlowGraph {
            arcs: vec![],
            adj: vec![vec![]; n],
            vertices: vec![Status::Basic; n],
        }
    }

    /// Create a graph from raw parts.
    ///
    /// The caller guarantees that `arcs` satisfies the pairing invariant and
    /// that `adj` lists every arc exactly once at its tail.
    pub(crate) fn from_parts(arcs: Vec<Edge<F>>, adj: Vec<Vec<usize>>) -> Self {
        let n = adj.len();
        FlowGraph {
            arcs,
            adj,
            vertices: vec![Status::Basic; n],
        }
    }

    /// Return the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.adj.len()
    }

    /// Return the number of (logical) user edges.
    pub fn num_edges(&self) -> usize {
        self.arcs.len() / 2
    }

    /// Return the number of stored arcs, twice the number of edges.
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Return the source vertex.
    pub fn source(&self) -> usize {
        0
    }

    /// Return the sink vertex, the last one.
    ///
    /// Must not be called on an empty graph.
    pub fn sink(&self) -> usize {
        self.num_vertices() - 1
    }

    pub fn arc(&self, e: usize) -> &Edge<F> {
        &self.arcs[e]
    }

    pub fn arcs(&self) -> &[Edge<F>] {
        &self.arcs
    }

    /// Return the indices of all arcs leaving `u`.
    ///
    /// These are both forward arcs and residual arcs.
    pub fn adjacency(&self, u: usize) -> &[usize] {
        &self.adj[u]
    }

    pub(crate) fn adjacency_lists(&self) -> &[Vec<usize>] {
        &self.adj
    }

    pub fn vertex_status(&self, u: usize) -> Status {
        self.vertices[u]
    }

    pub fn statuses(&self) -> &[Status] {
        &self.vertices
    }

    pub fn set_vertex_status(&mut self, u: usize, status: Status) {
        self.vertices[u] = status;
    }

    pub fn set_arc_status(&mut self, e: usize, status: Status) {
        self.arcs[e].status = status;
    }

    /// Set all vertices and arcs to `Status::Basic`.
    pub fn reset_statuses(&mut self) {
        for s in &mut self.vertices {
            *s = Status::Basic;
        }
        for arc in &mut self.arcs {
            arc.status = Status::Basic;
        }
    }

    /// Return the largest residual capacity of any arc.
    pub fn max_capacity(&self) -> F {
        self.arcs.iter().map(|a| a.capacity).max().unwrap_or_else(F::zero)
    }

    /// Return the total capacity of the edge that arc `e` belongs to.
    ///
    /// This is the sum of the residual capacities of `e` and its partner,
    /// which pushing flow does not change.
    pub fn pair_capacity(&self, e: usize) -> Option<F> {
        self.arcs[e].capacity.checked_add(&self.arcs[e ^ 1].capacity)
    }

    /// Return the total capacity of all edges incident to the source.
    ///
    /// This bounds the value of any flow, including flow already pushed.
    /// Returns `None` if the sum does not fit into `F`.
    pub fn source_capacity(&self) -> Option<F> {
        if self.num_vertices() == 0 {
            return Some(F::zero());
        }
        self.adj[self.source()]
            .iter()
            .try_fold(F::zero(), |sum, &e| sum.checked_add(&self.pair_capacity(e)?))
    }

    /// Move `amount` units of capacity from arc `e` to its partner.
    pub(crate) fn push(&mut self, e: usize, amount: F) {
        debug_assert!(self.arcs[e].capacity >= amount);
        self.arcs[e].capacity -= amount;
        self.arcs[e ^ 1].capacity += amount;
    }

    fn check_vertex(&self, u: usize) -> Result<()> {
        if u < self.num_vertices() {
            Ok(())
        } else {
            Err(Error::VertexOutOfRange {
                vertex: u,
                n: self.num_vertices(),
            })
        }
    }

    /// Change the number of vertices.
    ///
    /// Edges incident to removed vertices are removed (with their residual
    /// arcs), all other arcs keep their capacities. The adjacency lists are
    /// rebuilt from scratch.
    pub fn resize(&mut self, n: usize) {
        let old = std::mem::take(&mut self.arcs);
        let mut arcs = Vec::with_capacity(old.len());
        for pair in old.chunks(2) {
            let fwd = &pair[0];
            if fwd.u < n && fwd.to < n {
                arcs.extend_from_slice(pair);
            }
        }

        let mut adj = vec![vec![]; n];
        for (e, arc) in arcs.iter().enumerate() {
            adj[arc.u].push(e);
        }

        self.arcs = arcs;
        self.adj = adj;
        self.vertices.resize(n, Status::Basic);
    }

    /// Return the index of the first forward arc `u->to`.
    pub fn find_edge(&self, u: usize, to: usize) -> Option<usize> {
        self.arcs
            .iter()
            .step_by(2)
            .position(|a| a.u == u && a.to == to)
            .map(|i| i << 1)
    }

    /// Add capacity `delta` from `u` to `to`.
    ///
    /// If the edge already exists its capacity is increased, otherwise a
    /// new forward/residual pair is appended. Returns the index of the
    /// forward arc.
    pub fn add_edge(&mut self, u: usize, to: usize, delta: F) -> Result<usize> {
        if u == to {
            return Err(Error::SelfLoop { vertex: u });
        }
        self.check_vertex(u)?;
        self.check_vertex(to)?;

        if let Some(e) = self.find_edge(u, to) {
            // the partner may hold capacity moved there by earlier pushes
            self.pair_capacity(e)
                .and_then(|c| c.checked_add(&delta))
                .ok_or(Error::CapacityOverflow)?;
            self.arcs[e].capacity += delta;
            return Ok(e);
        }

        let e = self.arcs.len();
        self.arcs.push(Edge::new(u, to, delta));
        self.arcs.push(Edge::new(to, u, F::zero()));
        self.adj[u].push(e);
        self.adj[to].push(e ^ 1);
        Ok(e)
    }

    /// Remove the edge `u->to` together with its residual arc.
    ///
    /// All arcs behind the removed pair move two positions to the front,
    /// the adjacency lists are renumbered accordingly.
    pub fn delete_edge(&mut self, u: usize, to: usize) -> Result<()> {
        let e = self.find_edge(u, to).ok_or(Error::EdgeNotFound { u, to })?;
        self.arcs.drain(e..e + 2);
        for neighs in &mut self.adj {
            neighs.retain(|&f| f >> 1 != e >> 1);
            for f in neighs.iter_mut() {
                if *f > e {
                    *f -= 2;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FlowGraph, Status};
    use crate::error::Error;

    fn check_pairs(g: &FlowGraph<u32>) {
        assert_eq!(g.num_arcs() % 2, 0);
        for (e, arc) in g.arcs().iter().enumerate() {
            let rev = g.arc(e ^ 1);
            assert_eq!(arc.to, rev.u);
            assert_eq!(arc.u, rev.to);
        }
        let mut seen = vec![0; g.num_arcs()];
        for u in 0..g.num_vertices() {
            for &e in g.adjacency(u) {
                assert_eq!(g.arc(e).u, u);
                seen[e] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_merge_duplicate_edges() {
        let mut g = FlowGraph::<u32>::new(2);
        g.add_edge(0, 1, 5).unwrap();
        g.add_edge(0, 1, 3).unwrap();
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.arc(0).capacity, 8);
        assert_eq!(g.arc(1).capacity, 0);
        check_pairs(&g);
    }

    #[test]
    fn test_antiparallel_edges() {
        let mut g = FlowGraph::<u32>::new(2);
        g.add_edge(0, 1, 2).unwrap();
        assert_eq!(g.add_edge(1, 0, 3), Ok(2));
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.arc(1).capacity, 0);
        check_pairs(&g);
    }

    #[test]
    fn test_reject_invalid() {
        let mut g = FlowGraph::<u32>::new(3);
        assert_eq!(g.add_edge(1, 1, 2), Err(Error::SelfLoop { vertex: 1 }));
        assert_eq!(g.add_edge(0, 3, 2), Err(Error::VertexOutOfRange { vertex: 3, n: 3 }));
        assert_eq!(g.num_arcs(), 0);

        let mut g = FlowGraph::<u8>::new(2);
        g.add_edge(0, 1, 200).unwrap();
        assert_eq!(g.add_edge(0, 1, 100), Err(Error::CapacityOverflow));
        assert_eq!(g.arc(0).capacity, 200);
    }

    #[test]
    fn test_merge_after_push_overflow() {
        let mut g = FlowGraph::<u8>::new(2);
        let e = g.add_edge(0, 1, 200).unwrap();
        g.push(e, 200);
        assert_eq!(g.add_edge(0, 1, 200), Err(Error::CapacityOverflow));
        assert_eq!(g.arc(e).capacity, 0);
        assert_eq!(g.arc(e ^ 1).capacity, 200);
        assert_eq!(g.add_edge(0, 1, 55), Ok(e));
        assert_eq!(g.pair_capacity(e), Some(255));
    }

    #[test]
    fn test_source_capacity() {
        let mut g = FlowGraph::<u8>::new(3);
        assert_eq!(g.source_capacity(), Some(0));
        g.add_edge(0, 1, 200).unwrap();
        g.add_edge(2, 0, 50).unwrap();
        g.add_edge(1, 2, 200).unwrap();
        assert_eq!(g.source_capacity(), Some(250));
        g.add_edge(0, 2, 6).unwrap();
        assert_eq!(g.source_capacity(), None);
    }

    #[test]
    fn test_delete_renumbers() {
        let mut g = FlowGraph::<u32>::new(4);
        g.add_edge(0, 1, 1).unwrap();
        g.add_edge(1, 2, 2).unwrap();
        g.add_edge(2, 3, 3).unwrap();
        g.delete_edge(1, 2).unwrap();

        assert_eq!(g.num_edges(), 2);
        assert_eq!((g.arc(2).u, g.arc(2).to, g.arc(2).capacity), (2, 3, 3));
        assert_eq!(g.adjacency(0), &[0]);
        assert_eq!(g.adjacency(1), &[1]);
        assert_eq!(g.adjacency(2), &[2]);
        assert_eq!(g.adjacency(3), &[3]);
        check_pairs(&g);
    }

    #[test]
    fn test_delete_missing_edge() {
        let mut g = FlowGraph::<u32>::new(3);
        g.add_edge(0, 1, 1).unwrap();
        let before = g.clone();
        assert_eq!(g.delete_edge(1, 0), Err(Error::EdgeNotFound { u: 1, to: 0 }));
        assert_eq!(g.delete_edge(0, 2), Err(Error::EdgeNotFound { u: 0, to: 2 }));
        assert_eq!(g, before);
    }

    #[test]
    fn test_resize() {
        let mut g = FlowGraph::<u32>::new(4);
        g.add_edge(0, 1, 1).unwrap();
        g.add_edge(1, 3, 2).unwrap();
        g.add_edge(2, 1, 3).unwrap();
        g.push(2, 1);
        g.resize(3);

        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 2);
        assert_eq!((g.arc(2).u, g.arc(2).to, g.arc(2).capacity), (2, 1, 3));
        check_pairs(&g);

        g.resize(5);
        assert_eq!(g.num_vertices(), 5);
        assert_eq!(g.vertex_status(4), Status::Basic);
        assert_eq!(g.num_edges(), 2);
        check_pairs(&g);
    }

    #[test]
    fn test_push_conserves_pair_sum() {
        let mut g = FlowGraph::<u32>::new(2);
        let e = g.add_edge(0, 1, 7).unwrap();
        g.push(e, 4);
        assert_eq!(g.arc(e).capacity, 3);
        assert_eq!(g.arc(e ^ 1).capacity, 4);
        g.push(e ^ 1, 1);
        assert_eq!(g.arc(e).capacity + g.arc(e ^ 1).capacity, 7);
    }
}
