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

//#![forbid(unsafe_code)]

//! An animated capacity scaling max-flow engine for interactive
//! visualizers.
//!
//! The crate is split into the engine, which edits a small flow network
//! and runs a capacity scaling variant of Dinic' algorithm step by step,
//! and the playback side, which turns the stream of steps into frames for
//! a render loop running at a fixed rate.
//!
//! - [`graph`]: the flow network of forward/residual arc pairs
//! - [`maxflow`]: the step-wise scaling algorithm and a reference solver
//! - [`model`]: validated requests, undo history and event publishing
//! - [`playback`]: the paced frame queue with vertex dragging
//! - [`draw`]: the drawer interface and color tables
//! - [`controller`]: dispatching of user commands
//!
//! # Example
//!
//! ```
//! use flowscope::config::ModelConfig;
//! use flowscope::graph::BasicEdge;
//! use flowscope::Model;
//!
//! let mut model = Model::new(ModelConfig::default());
//! model.change_vertices_number(4).unwrap();
//! for &(u, to, delta) in &[(0, 1, 1), (0, 2, 2), (2, 1, 1), (1, 3, 2), (2, 3, 1)] {
//!     model.add_edge(BasicEdge { u, to, delta }).unwrap();
//! }
//! assert_eq!(model.run(), Ok(3));
//! ```

mod num {
    pub use num_traits as traits;
}

pub mod error;
pub use self::error::{Error, Result};

pub mod config;
pub use self::config::{CanvasConfig, ModelConfig, PlaybackConfig};

// # Engine

pub mod graph;
pub use self::graph::{BasicEdge, Edge, FlowGraph, Status};

pub mod history;
pub mod maxflow;
pub mod observer;

pub mod model;
pub use self::model::{KernelEvent, MaxFlowModel, Model};

// # Playback

pub mod layout;
pub mod playback;
pub use self::playback::{Frame, FrameQueue, PlaybackEvent};

pub mod controller;
pub use self::controller::{Command, Controller};

// # Drawing

pub mod draw;
