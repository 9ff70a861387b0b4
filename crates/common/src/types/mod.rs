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

//! Protocol types shared across Loupe components.
//!
//! These are the records the debugger protocol carries: source texts with
//! their tagged sections, the activities executing them, and breakpoint
//! data. Field names follow the protocol's camelCase convention on the
//! wire.

mod activity;
mod breakpoint;
mod source;

pub use activity::*;
pub use breakpoint::*;
pub use source::*;
