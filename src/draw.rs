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

//! The interface to a renderer.
//!
//! Drawing itself is up to the GUI. This module provides the
//! [`FrameDrawer`] trait the GUI implements, an adapter that connects a
//! drawer to a [`FrameQueue`](crate::playback::FrameQueue), and the color
//! tables used to paint a frame.

use crate::graph::Status;
use crate::observer::Observer;
use crate::playback::{Frame, PlaybackEvent};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Trait for drawing sequences of frames.
pub trait FrameDrawer<F> {
    /// Draw a frame.
    fn draw(&mut self, frame: &Frame<F>);

    /// Enable user input again.
    fn unlock(&mut self);
}

/// Adapter forwarding playback events to a [`FrameDrawer`].
#[derive(Debug, Default)]
pub struct DrawerObserver<D> {
    drawer: D,
}

impl<D> DrawerObserver<D> {
    pub fn new(drawer: D) -> Self {
        DrawerObserver { drawer }
    }

    pub fn get_ref(&self) -> &D {
        &self.drawer
    }

    pub fn get_mut(&mut self) -> &mut D {
        &mut self.drawer
    }

    pub fn into_inner(self) -> D {
        self.drawer
    }
}

impl<F, D> Observer<PlaybackEvent<F>> for DrawerObserver<D>
where
    D: FrameDrawer<F>,
{
    fn on_subscribe(&mut self, data: &PlaybackEvent<F>) {
        if let PlaybackEvent::Frame(frame) = data {
            self.drawer.draw(frame);
        }
    }

    fn on_notify(&mut self, data: &PlaybackEvent<F>) {
        match data {
            PlaybackEvent::Frame(frame) => self.drawer.draw(frame),
            PlaybackEvent::Unlock => self.drawer.unlock(),
        }
    }
}

/// A 24 bit color.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Return the color at `t` on the line from `self` to `other`.
    ///
    /// `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.max(0.0).min(1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// One color per status.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColors {
    pub basic: Rgb,
    pub on_the_network: Rgb,
    pub on_the_path: Rgb,
}

impl StatusColors {
    pub fn get(&self, status: Status) -> Rgb {
        match status {
            Status::Basic => self.basic,
            Status::OnTheNetwork => self.on_the_network,
            Status::OnThePath => self.on_the_path,
        }
    }

    /// Return the color of a transition into `status` at progress `t`.
    pub fn transition(&self, status: Status, t: f64) -> Rgb {
        self.get(status.previous()).lerp(self.get(status), t)
    }
}

/// The color tables of a drawing.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Fill of vertex circles.
    pub vertex: StatusColors,
    pub arc: StatusColors,
    /// Text of labels.
    pub label: StatusColors,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            vertex: StatusColors {
                basic: Rgb::new(192, 192, 192),
                on_the_network: Rgb::new(255, 102, 102),
                on_the_path: Rgb::new(102, 178, 255),
            },
            arc: StatusColors {
                basic: Rgb::new(30, 30, 30),
                on_the_network: Rgb::new(255, 0, 0),
                on_the_path: Rgb::new(0, 102, 255),
            },
            label: StatusColors {
                basic: Rgb::new(0, 0, 0),
                on_the_network: Rgb::new(102, 0, 0),
                on_the_path: Rgb::new(0, 0, 102),
            },
        }
    }
}

impl Palette {
    /// Return the color of arc `e` in `frame`.
    ///
    /// The arc changed by the frame fades in from its previous color.
    pub fn arc_color<F>(&self, frame: &Frame<F>, e: usize) -> Rgb {
        let status = frame.edges[e].status;
        if frame.edge_id == Some(e) {
            self.arc.transition(status, frame.progress())
        } else {
            self.arc.get(status)
        }
    }

    /// Return the fill color of vertex `u` in `frame`.
    ///
    /// The head of the arc changed by the frame fades in with the arc. A
    /// vertex changed on its own fades in by itself.
    pub fn vertex_color<F>(&self, frame: &Frame<F>, u: usize) -> Rgb {
        let status = frame.vertices[u];
        let fading = match frame.edge_id {
            Some(e) => frame.edges[e].to == u,
            None => frame.vertex_id == Some(u),
        };
        if fading {
            self.vertex.transition(status, frame.progress())
        } else {
            self.vertex.get(status)
        }
    }

    pub fn label_color(&self, status: Status) -> Rgb {
        self.label.get(status)
    }
}
