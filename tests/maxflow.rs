/*
 * Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

use flowscope::config::ModelConfig;
use flowscope::graph::{BasicEdge, FlowGraph, Status};
use flowscope::maxflow::{edmondskarp, MaxFlowData, ScalingMaxFlow};
use flowscope::model::{KernelEvent, Model};
use flowscope::observer::Observer;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::cell::RefCell;
use std::rc::Rc;

const SAMPLE: &[(usize, usize, u64)] = &[(0, 1, 1), (0, 2, 2), (2, 1, 1), (1, 3, 2), (2, 3, 1)];

fn sample() -> FlowGraph<u64> {
    let mut g = FlowGraph::new(4);
    for &(u, to, delta) in SAMPLE {
        g.add_edge(u, to, delta).unwrap();
    }
    g
}

fn random_graph(rng: &mut StdRng, n: usize, m: usize, max_capacity: u64) -> FlowGraph<u64> {
    let mut g = FlowGraph::new(n);
    for _ in 0..m {
        let u = rng.gen_range(0..n);
        let to = rng.gen_range(0..n);
        if u != to {
            g.add_edge(u, to, rng.gen_range(1..=max_capacity)).unwrap();
        }
    }
    g
}

fn record(g: FlowGraph<u64>) -> (u64, Vec<MaxFlowData<u64>>) {
    let mut maxflow = ScalingMaxFlow::new(g);
    let mut steps = vec![];
    let value = maxflow.run(|s| steps.push(s.data())).unwrap();
    (value, steps)
}

#[test]
fn test_sample() {
    let (value, steps) = record(sample());
    assert_eq!(value, 3);
    assert_eq!(value, edmondskarp(&sample()).0);

    let first_path = steps
        .iter()
        .position(|s| s.vertices.contains(&Status::OnThePath))
        .unwrap();
    assert!(steps[..first_path]
        .iter()
        .any(|s| s.vertices[0] == Status::OnTheNetwork));

    let last = steps.last().unwrap();
    assert_eq!(last.pushed_flow, 3);
    assert_eq!(last.flow_rate, 0);
    assert!(last.vertices.iter().all(|&s| s == Status::Basic));
    assert!(last.edges.iter().all(|a| a.status == Status::Basic));
}

#[test]
fn test_bfs_order() {
    // the first level graph at threshold 2 only contains 0->2
    let (_, steps) = record(sample());
    assert_eq!(steps[0].updated_edge, None);
    assert_eq!(steps[0].vertices[0], Status::OnTheNetwork);
    assert_eq!(steps[1].updated_edge, Some(2));
    assert_eq!(steps[2].updated_edge, None);
    assert_eq!(steps[2].vertices[2], Status::OnTheNetwork);
    // sink not reached: everything back to basic
    assert!(steps[3].vertices.iter().all(|&s| s == Status::Basic));
    assert_eq!(steps[3].flow_rate, 1);
    assert_eq!(steps[4].flow_rate, 0);
}

#[test]
fn test_path_steps() {
    let (_, steps) = record(sample());
    for w in steps.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        assert!(a.pushed_flow <= b.pushed_flow);
        if a.pushed_flow < b.pushed_flow {
            // flow is pushed in units of the threshold only
            assert_eq!(b.pushed_flow - a.pushed_flow, 1u64 << b.flow_rate);
            assert_eq!(b.updated_edge, None);
        }
    }
}

#[test]
fn test_random_against_edmondskarp() {
    let mut rng = StdRng::seed_from_u64(4711);
    for _ in 0..200 {
        let n = rng.gen_range(2..=10);
        let m = rng.gen_range(0..=3 * n);
        let g = random_graph(&mut rng, n, m, 100);
        let (expected, _) = edmondskarp(&g);
        let mut maxflow = ScalingMaxFlow::new(g);
        assert_eq!(maxflow.solve(), Ok(expected));
        assert_eq!(maxflow.flow_rate(), 0);
    }
}

#[test]
fn test_large_capacities() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..20 {
        let g = random_graph(&mut rng, 10, 30, 1 << 40);
        let (expected, _) = edmondskarp(&g);
        assert_eq!(ScalingMaxFlow::new(g).solve(), Ok(expected));
    }
}

#[test]
fn test_rerun_keeps_value() {
    let mut maxflow = ScalingMaxFlow::new(sample());
    assert_eq!(maxflow.solve(), Ok(3));
    // the residual network has no augmenting path left
    maxflow.reset_state();
    maxflow.reset_pushed_flow();
    assert_eq!(maxflow.solve(), Ok(0));
}

#[derive(Default)]
struct Recorder {
    events: Vec<KernelEvent<u64>>,
}

impl Observer<KernelEvent<u64>> for Recorder {
    fn on_notify(&mut self, data: &KernelEvent<u64>) {
        self.events.push(data.clone());
    }
}

#[test]
fn test_model_events() {
    let mut model = Model::new(ModelConfig::default());
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    model.subscribe(&recorder).unwrap();

    model.change_vertices_number(4).unwrap();
    for &(u, to, delta) in SAMPLE {
        model.add_edge(BasicEdge { u, to, delta }).unwrap();
    }
    {
        let events = &recorder.borrow().events;
        assert_eq!(events.len(), 1 + SAMPLE.len());
        assert!(events.iter().all(|e| matches!(e, KernelEvent::Network(_))));
    }

    recorder.borrow_mut().events.clear();
    assert_eq!(model.run(), Ok(3));
    let events = &recorder.borrow().events;
    let (value, steps) = record(sample());
    assert_eq!(value, 3);
    assert_eq!(events.len(), steps.len() + 1);
    for (event, step) in events.iter().zip(&steps) {
        assert_eq!(event, &KernelEvent::Flow(step.clone()));
    }
    assert_eq!(events.last(), Some(&KernelEvent::Unlock));
}

#[test]
fn test_antiparallel_edges() {
    let mut model = Model::new(ModelConfig::default());
    model.add_edge(BasicEdge { u: 0, to: 1, delta: 4 }).unwrap();
    model.add_edge(BasicEdge { u: 1, to: 0, delta: 2 }).unwrap();
    assert_eq!(model.graph().num_edges(), 2);
    assert_eq!(model.run(), Ok(4));
    model.delete_edge(1, 0).unwrap();
    assert_eq!(model.graph().num_edges(), 1);
    assert_eq!(model.graph().arc(0).capacity, 0);
    assert_eq!(model.graph().arc(1).capacity, 4);
}
