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

//! Vertex positions on the canvas.
//!
//! The initial placement only depends on the number of vertices: the
//! source sits at the left, the sink at the right end of the horizontal
//! midline, and all other vertices are distributed alternately above and
//! below the midline on an elliptic arc between them.

use crate::config::CanvasConfig;

use ordered_float::OrderedFloat;
#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use std::f64::consts::PI;

/// A point in logical canvas coordinates.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The positions of all vertices.
#[derive(Debug, Clone)]
pub struct Layout {
    canvas: CanvasConfig,
    pos: Vec<Point>,
}

impl Layout {
    /// Create the initial layout of `n` vertices.
    pub fn new(canvas: CanvasConfig, n: usize) -> Self {
        let pos = (0..n).map(|i| initial_position(&canvas, n, i)).collect();
        Layout { canvas, pos }
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    pub fn positions(&self) -> &[Point] {
        &self.pos
    }

    pub fn position(&self, u: usize) -> Point {
        self.pos[u]
    }

    /// Recompute the layout if the number of vertices changed.
    ///
    /// Returns `true` if the layout has been recomputed.
    pub fn resize(&mut self, n: usize) -> bool {
        if n == self.pos.len() {
            return false;
        }
        self.pos = (0..n).map(|i| initial_position(&self.canvas, n, i)).collect();
        true
    }

    /// Return the vertex nearest to `p` within the pick radius.
    pub fn pick(&self, p: Point) -> Option<usize> {
        let radius = self.canvas.pick_radius;
        self.pos
            .iter()
            .enumerate()
            .map(|(u, q)| (u, q.distance(&p)))
            .filter(|&(_, d)| d <= radius)
            .min_by_key(|&(_, d)| OrderedFloat(d))
            .map(|(u, _)| u)
    }

    /// Move vertex `u` as close to `p` as allowed and return its new position.
    ///
    /// A vertex closer than twice the minimal separation to another vertex
    /// is pushed away from it. The result is clamped to the padded canvas.
    pub fn move_vertex(&mut self, u: usize, p: Point) -> Point {
        let limit = 2.0 * self.canvas.min_separation;
        let mut p = p;
        for (v, q) in self.pos.iter().enumerate() {
            if v == u {
                continue;
            }
            let mut d = p.distance(q);
            if d >= limit {
                continue;
            }
            if d == 0.0 {
                p.x += self.canvas.dist_eps;
                d = p.distance(q);
            }
            let scale = limit / d;
            p = Point::new(q.x + (p.x - q.x) * scale, q.y + (p.y - q.y) * scale);
        }

        let c = &self.canvas;
        let (pad_x, pad_y) = (c.max_x * c.sink_padding, c.max_y * c.sink_padding);
        p.x = p.x.max(pad_x).min(c.max_x - pad_x);
        p.y = p.y.max(pad_y).min(c.max_y - pad_y);

        self.pos[u] = p;
        p
    }
}

/// Return the initial position of vertex `index` of `n`.
pub fn initial_position(canvas: &CanvasConfig, n: usize, index: usize) -> Point {
    let mid_y = canvas.max_y / 2.0;
    let left = canvas.max_x * canvas.sink_padding;
    let right = canvas.max_x - left;
    if index == 0 {
        return Point::new(left, mid_y);
    }
    if index + 1 == n {
        return Point::new(right, mid_y);
    }

    // inner vertices: 0, 2, 4, ... above, 1, 3, 5, ... below
    let k = index - 1;
    let per_side = (n - 1) / 2;
    let step = k / 2 + 1;
    let angle = PI * step as f64 / (per_side + 1) as f64;
    let cx = (left + right) / 2.0;
    let rx = (right - left) / 2.0;
    let ry = canvas.max_y * canvas.center_padding;
    let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
    Point::new(cx - rx * angle.cos(), mid_y + sign * ry * angle.sin())
}
