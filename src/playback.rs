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

//! The frame queue between the engine and a fixed-tick render loop.
//!
//! A [`FrameQueue`] observes the [`KernelEvent`]s of a model and turns
//! them into [`Frame`]s. Every algorithm step becomes a micro-animation of
//! several ticks: arc steps take `speed` ticks, vertex steps take
//! `latency` ticks. Each call to [`FrameQueue::tick`] emits exactly one
//! frame (or one unlock notification) to the subscribed drawers.
//!
//! The vertex layout is owned by the queue. Dragging a vertex changes the
//! layout of all following frames without disturbing the animation.

use crate::config::{self, PlaybackConfig};
use crate::error::{Error, Result};
use crate::graph::{Edge, Status};
use crate::layout::{Layout, Point};
use crate::maxflow::MaxFlowData;
use crate::model::KernelEvent;
use crate::num::traits::{NumAssign, PrimInt, Unsigned};
use crate::observer::{Observable, Observer, SubscriberId};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, trace};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One renderable state.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<F> {
    pub edges: Vec<Edge<F>>,
    pub vertices: Vec<Status>,
    pub pos: Vec<Point>,
    /// The arc changed by this step.
    pub edge_id: Option<usize>,
    /// The single vertex changed by a step without an arc.
    pub vertex_id: Option<usize>,
    /// Position within the micro-animation, `0..frames_number`.
    pub frame_id: usize,
    pub frames_number: usize,
    pub flow_rate: u32,
    pub pushed_flow: F,
    pub selected_vertex: Option<usize>,
}

impl<F> Frame<F> {
    /// Return the animation progress in `(0, 1]`.
    pub fn progress(&self) -> f64 {
        (self.frame_id + 1) as f64 / self.frames_number.max(1) as f64
    }

    /// Return `true` if this is the last tick of the micro-animation.
    pub fn is_complete(&self) -> bool {
        self.frame_id + 1 >= self.frames_number
    }

    fn complete(mut self) -> Self {
        self.frame_id = self.frames_number.max(1) - 1;
        self
    }
}

/// An event published to drawers.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent<F> {
    Frame(Frame<F>),
    /// Input may be enabled again.
    Unlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pacing {
    Static,
    Speed,
    Latency,
}

#[derive(Debug, Clone)]
enum Item<F> {
    Frame { frame: Frame<F>, pacing: Pacing },
    Unlock,
}

/// Buffers and paces frames.
pub struct FrameQueue<F> {
    config: PlaybackConfig,
    speed: usize,
    latency: usize,
    queue: VecDeque<Item<F>>,
    layout: Layout,
    selected: Option<usize>,
    /// The frame published last.
    current: Option<Frame<F>>,
    /// The latest state received from the model.
    last_state: Option<Frame<F>>,
    observable: Observable<PlaybackEvent<F>>,
}

impl<F> FrameQueue<F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    pub fn new(config: PlaybackConfig) -> Self {
        FrameQueue {
            speed: config.base_speed.max(1),
            latency: config.base_latency.max(1),
            queue: VecDeque::new(),
            layout: Layout::new(config.canvas.clone(), 0),
            selected: None,
            current: None,
            last_state: None,
            observable: Observable::new(),
            config,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Return the number of ticks of an arc animation.
    pub fn speed(&self) -> usize {
        self.speed
    }

    /// Return the number of ticks of a vertex animation.
    pub fn latency(&self) -> usize {
        self.latency
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn selected_vertex(&self) -> Option<usize> {
        self.selected
    }

    /// Return the number of queued entries.
    ///
    /// A micro-animation counts as a single entry.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Return the frame published last.
    pub fn current_frame(&self) -> Option<&Frame<F>> {
        self.current.as_ref()
    }

    /// Subscribe a drawer.
    ///
    /// The drawer immediately receives the current frame.
    pub fn subscribe<O>(&mut self, observer: &Rc<RefCell<O>>) -> Result<SubscriberId>
    where
        O: Observer<PlaybackEvent<F>> + 'static,
    {
        let current = PlaybackEvent::Frame(self.snapshot());
        self.observable.subscribe(observer, &current)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.observable.unsubscribe(id)
    }

    /// Publish the next frame.
    ///
    /// Returns `None` if the queue is empty.
    pub fn tick(&mut self) -> Option<PlaybackEvent<F>> {
        let event = match self.queue.pop_front()? {
            Item::Unlock => {
                trace!("unlock");
                PlaybackEvent::Unlock
            }
            Item::Frame { mut frame, pacing } => {
                if self.layout.resize(frame.vertices.len()) {
                    self.selected = self.selected.filter(|&u| u < frame.vertices.len());
                }
                frame.pos = self.layout.positions().to_vec();
                frame.selected_vertex = self.selected;
                trace!(
                    edge = ?frame.edge_id,
                    frame_id = frame.frame_id,
                    frames_number = frame.frames_number,
                    "frame"
                );
                if !frame.is_complete() {
                    let mut next = frame.clone();
                    next.frame_id += 1;
                    self.queue.push_front(Item::Frame { frame: next, pacing });
                }
                self.current = Some(frame.clone());
                PlaybackEvent::Frame(frame)
            }
        };
        self.observable.notify(&event);
        Some(event)
    }

    /// Jump to the final state.
    ///
    /// Only the last graph frame remains in the queue, followed by exactly
    /// one unlock notification.
    pub fn skip(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(Error::NothingToSkip);
        }
        debug!(len = self.queue.len(), "skip frames");
        self.collapse();
        self.queue.push_back(Item::Unlock);
        Ok(())
    }

    /// Change the number of ticks of arc animations to the given level.
    pub fn change_speed(&mut self, level: usize) -> Result<()> {
        let speed = config::ticks(self.config.base_speed, &self.config.speed_coefs, level)
            .ok_or(Error::InvalidLevel {
                level,
                levels: self.config.speed_coefs.len(),
            })?;
        debug!(level, speed, "change speed");
        self.speed = speed;
        self.rescale(Pacing::Speed, speed);
        Ok(())
    }

    /// Change the number of ticks of vertex animations to the given level.
    pub fn change_latency(&mut self, level: usize) -> Result<()> {
        let latency = config::ticks(self.config.base_latency, &self.config.latency_coefs, level)
            .ok_or(Error::InvalidLevel {
                level,
                levels: self.config.latency_coefs.len(),
            })?;
        debug!(level, latency, "change latency");
        self.latency = latency;
        self.rescale(Pacing::Latency, latency);
        Ok(())
    }

    /// Select the vertex nearest to `p`, if any is close enough.
    pub fn mouse_pressed(&mut self, p: Point) {
        self.selected = self.layout.pick(p);
        debug!(selected = ?self.selected, "mouse pressed");
    }

    /// Drag the selected vertex to `p`.
    pub fn mouse_moved(&mut self, p: Point) {
        let u = match self.selected {
            Some(u) if u < self.layout.len() => u,
            _ => return,
        };
        self.layout.move_vertex(u, p);
        if self.queue.is_empty() {
            self.enqueue_refresh();
        }
    }

    /// Drop the selected vertex.
    pub fn mouse_released(&mut self, _p: Point) {
        debug!(selected = ?self.selected, "mouse released");
        self.selected = None;
        self.enqueue_refresh();
    }

    fn snapshot(&self) -> Frame<F> {
        let mut frame = match self.current.as_ref().or_else(|| self.last_state.as_ref()) {
            Some(frame) => frame.clone(),
            None => Frame {
                edges: vec![],
                vertices: vec![],
                pos: vec![],
                edge_id: None,
                vertex_id: None,
                frame_id: 0,
                frames_number: 1,
                flow_rate: 0,
                pushed_flow: F::zero(),
                selected_vertex: None,
            },
        };
        if frame.vertices.len() == self.layout.len() {
            frame.pos = self.layout.positions().to_vec();
        }
        frame
    }

    fn push_state(&mut self, data: &MaxFlowData<F>, pacing: Pacing) {
        let frames_number = match pacing {
            Pacing::Static => 1,
            Pacing::Speed => self.speed,
            Pacing::Latency => self.latency,
        };
        let vertex_id = match (pacing, &self.last_state) {
            (Pacing::Latency, Some(prev)) if prev.vertices.len() == data.vertices.len() => {
                let mut changed = (0..data.vertices.len())
                    .filter(|&u| prev.vertices[u] != data.vertices[u]);
                match (changed.next(), changed.next()) {
                    (Some(u), None) => Some(u),
                    _ => None,
                }
            }
            _ => None,
        };
        let frame = Frame {
            edges: data.edges.clone(),
            vertices: data.vertices.clone(),
            pos: vec![],
            edge_id: data.updated_edge,
            vertex_id,
            frame_id: 0,
            frames_number,
            flow_rate: data.flow_rate,
            pushed_flow: data.pushed_flow,
            selected_vertex: None,
        };
        self.last_state = Some(frame.clone().complete());
        self.queue.push_back(Item::Frame { frame, pacing });
    }

    fn enqueue_refresh(&mut self) {
        if let Some(frame) = &self.last_state {
            let frame = frame.clone();
            self.queue.push_back(Item::Frame {
                frame,
                pacing: Pacing::Static,
            });
        }
    }

    /// Reduce the queue to its last graph frame.
    ///
    /// Returns `true` if an unlock notification was pending.
    fn collapse(&mut self) -> bool {
        let mut unlock = false;
        let mut last = None;
        for item in self.queue.drain(..) {
            match item {
                Item::Unlock => unlock = true,
                Item::Frame { frame, pacing } => last = Some((frame, pacing)),
            }
        }
        if let Some((frame, pacing)) = last {
            self.queue.push_back(Item::Frame {
                frame: frame.complete(),
                pacing,
            });
        }
        unlock
    }

    fn rescale(&mut self, kind: Pacing, new: usize) {
        for item in &mut self.queue {
            if let Item::Frame { frame, pacing } = item {
                if *pacing != kind {
                    continue;
                }
                let old = frame.frames_number.max(1);
                frame.frame_id = (frame.frame_id * new / old).min(new - 1);
                frame.frames_number = new;
            }
        }
    }
}

impl<F> Observer<KernelEvent<F>> for FrameQueue<F>
where
    F: PrimInt + Unsigned + NumAssign,
{
    fn on_subscribe(&mut self, data: &KernelEvent<F>) {
        self.on_notify(data);
    }

    fn on_notify(&mut self, data: &KernelEvent<F>) {
        match data {
            KernelEvent::Network(data) => self.push_state(data, Pacing::Static),
            KernelEvent::Flow(data) => {
                let pacing = if data.updated_edge.is_some() {
                    Pacing::Speed
                } else {
                    Pacing::Latency
                };
                self.push_state(data, pacing);
            }
            KernelEvent::Cleanup => {
                if self.collapse() {
                    self.queue.push_back(Item::Unlock);
                }
            }
            KernelEvent::Unlock => self.queue.push_back(Item::Unlock),
        }
    }
}
