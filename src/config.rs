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

//! Configuration of the model and the playback adapter.
//!
//! All tables are plain data passed to the constructors. The defaults
//! describe a 10x10 canvas animated at 60 frames per second.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Limits and history depth of a [`MaxFlowModel`](crate::model::MaxFlowModel).
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Smallest allowed number of vertices.
    pub min_vertices: usize,
    /// Largest allowed number of vertices.
    pub max_vertices: usize,
    /// Upper bound for capacities of randomly generated edges.
    pub max_edge_capacity: u64,
    /// Number of undo snapshots kept.
    pub history_depth: usize,
    /// Seed of the random sample generator, random if `None`.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            min_vertices: 2,
            max_vertices: 10,
            max_edge_capacity: 100,
            history_depth: 10,
            seed: None,
        }
    }
}

/// Geometry of the drawing area in logical coordinates.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    pub max_x: f64,
    pub max_y: f64,
    /// Horizontal inset of source and sink relative to `max_x`.
    ///
    /// Also the inset used when clamping dragged vertices.
    pub sink_padding: f64,
    /// Vertical distance of the innermost vertices from the midline,
    /// relative to `max_y`.
    pub center_padding: f64,
    /// Maximal distance of a mouse press from a vertex to select it.
    pub pick_radius: f64,
    /// Minimal distance between two vertices.
    pub min_separation: f64,
    /// Offset applied to a vertex dropped exactly onto another one.
    pub dist_eps: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            max_x: 10.0,
            max_y: 10.0,
            sink_padding: 0.05,
            center_padding: 0.3,
            pick_radius: 0.5,
            min_separation: 0.4,
            dist_eps: 0.05,
        }
    }
}

/// Pacing of the frame queue.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Ticks per second of the render loop.
    pub fps: usize,
    /// Ticks of an arc animation at multiplier 1.
    pub base_speed: usize,
    /// Ticks of a vertex animation at multiplier 1.
    pub base_latency: usize,
    /// Multipliers of `base_speed` indexed by slider level.
    pub speed_coefs: Vec<f64>,
    /// Multipliers of `base_latency` indexed by slider level.
    pub latency_coefs: Vec<f64>,
    pub canvas: CanvasConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            fps: 60,
            base_speed: 60,
            base_latency: 60,
            speed_coefs: vec![7.0, 3.0, 2.5, 2.0, 1.5, 1.0, 0.75, 0.5, 0.33, 0.25, 0.166],
            latency_coefs: vec![3.0, 2.0, 1.5, 1.0, 0.75, 0.5, 0.3],
            canvas: CanvasConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Return the tick interval of the render loop in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        1000 / self.fps.max(1) as u64
    }
}

/// Return `ceil(base * coefs[level])`, at least 1.
pub(crate) fn ticks(base: usize, coefs: &[f64], level: usize) -> Option<usize> {
    coefs
        .get(level)
        .map(|&coef| ((base as f64 * coef).ceil() as usize).max(1))
}
