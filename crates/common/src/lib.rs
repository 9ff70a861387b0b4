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

//! Loupe Common - Shared functionality for Loupe components
//!
//! This crate provides the pieces shared by the view engine and the loupe
//! binary: the protocol types exchanged with the traced runtime, the binary
//! trace-event codec, and logging setup.

/// Protocol types exchanged with the traced runtime, including sources, activities, and breakpoints
pub mod types;

/// Logging setup and utilities for consistent logging across Loupe components
pub mod logging;
/// Codec for the binary trace-event stream the traced runtime emits
pub mod wire;

pub use logging::*;
pub use wire::*;
