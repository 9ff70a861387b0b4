// Loupe - Concurrency Debugger Front End
// Copyright (C) 2025 the Loupe contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Loupe View - the source annotation engine
//!
//! This crate turns raw source text plus the runtime's tagged sections into
//! annotated markup, assigns every markup element a flat id that encodes
//! what it refers to, and keeps the display and breakpoint state behind it.
//! It also folds the decoded trace-event stream into the activity graph the
//! visualization feeds on.
//!
//! Everything here is synchronous and single-threaded; the surrounding
//! event loop hands over one request at a time and reads the results before
//! the next one.

/// Flat element-id encoding and decoding
pub mod ids;

/// Marker overlay attaching section markers to matrix cells
pub mod annotate;
/// In-memory breakpoint records and their toggle flow
pub mod breakpoints;
/// Activity graph data model fed by trace events
pub mod graph;
/// Markers emitted around annotated cells
pub mod markers;
/// Character matrix built from raw source text
pub mod matrix;
/// Per-activity display state
pub mod view;

pub use annotate::*;
pub use breakpoints::*;
pub use graph::*;
pub use markers::*;
pub use matrix::*;
pub use view::*;
