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

//! The request layer of the max-flow engine.
//!
//! A [`MaxFlowModel`] owns the flow network and the scaling algorithm. It
//! validates every request before touching any state, keeps a bounded
//! history of snapshots for undo and publishes [`KernelEvent`]s to its
//! observers.
//!
//! # Example
//!
//! ```
//! use flowscope::config::ModelConfig;
//! use flowscope::graph::BasicEdge;
//! use flowscope::model::Model;
//!
//! let mut model = Model::new(ModelConfig::default());
//! model.change_vertices_number(3).unwrap();
//! model.add_edge(BasicEdge { u: 0, to: 1, delta: 4 }).unwrap();
//! model.add_edge(BasicEdge { u: 1, to: 2, delta: 3 }).unwrap();
//! assert_eq!(model.run(), Ok(3));
//!
//! model.recover_prev_state().unwrap();
//! assert_eq!(model.pushed_flow(), 0);
//! assert_eq!(model.graph().arc(0).capacity, 4);
//! ```

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::graph::{BasicEdge, Edge, FlowGraph, Status};
use crate::history::History;
use crate::maxflow::{MaxFlowData, ScalingMaxFlow};
use crate::num::traits::{NumAssign, NumCast, PrimInt, Unsigned};
use crate::observer::{Observable, Observer, SubscriberId};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, trace};

use std::cell::RefCell;
use std::rc::Rc;

/// An event published by the model.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelEvent<F> {
    /// The structure of the network changed.
    Network(MaxFlowData<F>),
    /// One step of the algorithm.
    Flow(MaxFlowData<F>),
    /// Pending animations are obsolete.
    Cleanup,
    /// The algorithm finished, input may be enabled again.
    Unlock,
}

/// A stored state of the network.
///
/// Statuses are not stored, a restored network is `Basic` everywhere.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<F> {
    pub n: usize,
    pub flow_rate: u32,
    pub adjacency: Vec<Vec<usize>>,
    pub arcs: Vec<Edge<F>>,
}

impl<F> Snapshot<F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    fn capture(maxflow: &ScalingMaxFlow<F>) -> Self {
        let g = maxflow.graph();
        Snapshot {
            n: g.num_vertices(),
            flow_rate: maxflow.flow_rate(),
            adjacency: g.adjacency_lists().to_vec(),
            arcs: g
                .arcs()
                .iter()
                .map(|a| Edge {
                    status: Status::Basic,
                    ..*a
                })
                .collect(),
        }
    }

    fn into_graph(self) -> FlowGraph<F> {
        debug_assert_eq!(self.n, self.adjacency.len());
        FlowGraph::from_parts(self.arcs, self.adjacency)
    }
}

/// The max-flow engine with undo history and event publishing.
pub struct MaxFlowModel<F> {
    config: ModelConfig,
    maxflow: ScalingMaxFlow<F>,
    history: History<Snapshot<F>>,
    observable: Observable<KernelEvent<F>>,
    rng: StdRng,
}

/// The model with the default capacity type.
pub type Model = MaxFlowModel<u64>;

impl<F> MaxFlowModel<F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    /// Create a model with `config.min_vertices` vertices and no edges.
    pub fn new(config: ModelConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        MaxFlowModel {
            maxflow: ScalingMaxFlow::new(FlowGraph::new(config.min_vertices)),
            history: History::new(config.history_depth),
            observable: Observable::new(),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn graph(&self) -> &FlowGraph<F> {
        self.maxflow.graph()
    }

    /// Return a snapshot of the current state as sent to observers.
    pub fn data(&self) -> MaxFlowData<F> {
        self.maxflow.data()
    }

    pub fn flow_rate(&self) -> u32 {
        self.maxflow.flow_rate()
    }

    pub fn pushed_flow(&self) -> F {
        self.maxflow.pushed_flow()
    }

    /// Return the number of states that can be recovered.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Subscribe an observer.
    ///
    /// The observer immediately receives the current network.
    pub fn subscribe<O>(&mut self, observer: &Rc<RefCell<O>>) -> Result<SubscriberId>
    where
        O: Observer<KernelEvent<F>> + 'static,
    {
        let current = KernelEvent::Network(self.maxflow.data());
        self.observable.subscribe(observer, &current)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.observable.unsubscribe(id)
    }

    /// Change the number of vertices.
    ///
    /// Edges incident to removed vertices are removed.
    pub fn change_vertices_number(&mut self, n: usize) -> Result<()> {
        if n < self.config.min_vertices || n > self.config.max_vertices {
            return Err(Error::InvalidVerticesNumber {
                n,
                min: self.config.min_vertices,
                max: self.config.max_vertices,
            });
        }
        debug!(n, "change number of vertices");
        self.save_state();
        self.maxflow.graph_mut().resize(n);
        self.reset();
        self.publish_network();
        Ok(())
    }

    /// Add capacity to an edge, creating it if necessary.
    pub fn add_edge(&mut self, edge: BasicEdge<F>) -> Result<()> {
        let BasicEdge { u, to, delta } = edge;
        let g = self.maxflow.graph();
        let n = g.num_vertices();
        if u == to {
            return Err(Error::SelfLoop { vertex: u });
        }
        if let Some(&vertex) = [u, to].iter().find(|&&v| v >= n) {
            return Err(Error::VertexOutOfRange { vertex, n });
        }
        if delta.is_zero() {
            return Err(Error::ZeroCapacity);
        }
        if let Some(e) = g.find_edge(u, to) {
            g.pair_capacity(e)
                .and_then(|c| c.checked_add(&delta))
                .ok_or(Error::CapacityOverflow)?;
        }
        // the total capacity at the source bounds the flow value of a run
        if u == g.source() || to == g.source() {
            g.source_capacity()
                .and_then(|c| c.checked_add(&delta))
                .ok_or(Error::CapacityOverflow)?;
        }

        debug!(u, to, "add edge");
        self.save_state();
        self.maxflow.graph_mut().add_edge(u, to, delta)?;
        self.reset();
        self.publish_network();
        Ok(())
    }

    /// Remove the edge `u->to`.
    pub fn delete_edge(&mut self, u: usize, to: usize) -> Result<()> {
        if self.maxflow.graph().find_edge(u, to).is_none() {
            return Err(Error::EdgeNotFound { u, to });
        }

        debug!(u, to, "delete edge");
        self.save_state();
        self.maxflow.graph_mut().delete_edge(u, to)?;
        self.reset();
        self.publish_network();
        Ok(())
    }

    /// Run the algorithm to completion.
    ///
    /// Every step is published as [`KernelEvent::Flow`], followed by a
    /// final [`KernelEvent::Unlock`]. Returns the value of the flow pushed
    /// by this run.
    ///
    /// Fails with [`Error::CapacityOverflow`] if the flow value might not
    /// fit into `F`. The edge requests reject such networks, so this only
    /// happens for networks built by hand.
    pub fn run(&mut self) -> Result<F> {
        self.maxflow
            .graph()
            .source_capacity()
            .ok_or(Error::CapacityOverflow)?;

        debug!("run");
        self.save_state();
        self.reset();

        let observable = &self.observable;
        let mut steps = 0usize;
        let value = self.maxflow.run(|maxflow| {
            steps += 1;
            trace!(step = steps, flow_rate = maxflow.flow_rate(), "flow step");
            observable.notify_with(|| KernelEvent::Flow(maxflow.data()));
        })?;
        debug!(steps, "run finished");

        self.observable.notify(&KernelEvent::Unlock);
        Ok(value)
    }

    /// Replace the network by a random tree rooted at the source.
    ///
    /// Every vertex `i > 0` gets an edge from a uniformly chosen vertex
    /// `j < i`, so every vertex is reachable from the source. Capacities
    /// are uniform in `[1, max_edge_capacity]`.
    pub fn gen_random_sample(&mut self) -> Result<()> {
        let min = self.config.min_vertices;
        let max = self.config.max_vertices.max(min);
        let max_capacity = self.config.max_edge_capacity.max(1);

        let n = self.rng.gen_range(min..=max);
        let mut edges = Vec::with_capacity(n.saturating_sub(1));
        for i in 1..n {
            let j = self.rng.gen_range(0..i);
            let c: u64 = self.rng.gen_range(1..=max_capacity);
            let delta = <F as NumCast>::from(c).ok_or(Error::CapacityOverflow)?;
            edges.push((j, i, delta));
        }

        let mut g = FlowGraph::new(n);
        for (u, to, delta) in edges {
            g.add_edge(u, to, delta)?;
        }
        g.source_capacity().ok_or(Error::CapacityOverflow)?;

        debug!(n, "generate random sample");
        self.save_state();
        self.maxflow.set_graph(g);
        self.reset();
        self.publish_network();
        Ok(())
    }

    /// Restore the latest saved state.
    ///
    /// Observers receive a [`KernelEvent::Cleanup`] followed by the
    /// restored network.
    pub fn recover_prev_state(&mut self) -> Result<()> {
        let snapshot = self.history.pop().ok_or(Error::EmptyHistory)?;
        debug!(n = snapshot.n, "recover previous state");
        self.observable.notify(&KernelEvent::Cleanup);

        let flow_rate = snapshot.flow_rate;
        self.maxflow.set_graph(snapshot.into_graph());
        self.maxflow.reset_state();
        self.maxflow.set_flow_rate(flow_rate);
        self.maxflow.reset_pushed_flow();
        self.publish_network();
        Ok(())
    }

    fn save_state(&mut self) {
        self.history.push(Snapshot::capture(&self.maxflow));
    }

    fn reset(&mut self) {
        self.maxflow.reset_state();
        self.maxflow.reset_pushed_flow();
    }

    fn publish_network(&self) {
        let maxflow = &self.maxflow;
        self.observable.notify_with(|| KernelEvent::Network(maxflow.data()));
    }
}
