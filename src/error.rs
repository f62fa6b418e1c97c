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

//! Errors returned by rejected requests.
//!
//! A rejected request never changes any state. A GUI may simply ignore
//! these errors, a test suite can assert on them.

use thiserror::Error;

/// Error of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("self loop at vertex {vertex}")]
    SelfLoop { vertex: usize },

    #[error("vertex {vertex} out of range (graph has {n} vertices)")]
    VertexOutOfRange { vertex: usize, n: usize },

    #[error("edge capacity must be positive")]
    ZeroCapacity,

    #[error("edge capacity overflow")]
    CapacityOverflow,

    #[error("no edge {u}->{to}")]
    EdgeNotFound { u: usize, to: usize },

    #[error("invalid number of vertices {n}, expected {min}..={max}")]
    InvalidVerticesNumber { n: usize, min: usize, max: usize },

    #[error("no previous state to recover")]
    EmptyHistory,

    #[error("no pending frames to skip")]
    NothingToSkip,

    #[error("invalid slider level {level}, expected 0..{levels}")]
    InvalidLevel { level: usize, levels: usize },

    #[error("observer is already subscribed")]
    AlreadySubscribed,
}

pub type Result<T> = std::result::Result<T, Error>;
