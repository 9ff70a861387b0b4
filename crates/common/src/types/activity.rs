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

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The kinds of concurrent activity the traced runtime spawns.
///
/// Every activity is one of these, both in trace events and in the
/// activity list the front end shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ActivityType {
    /// An actor with a mailbox, processing one message at a time.
    Actor,
    /// A communicating process reading and writing channels.
    Process,
    /// A plain shared-memory thread.
    Thread,
    /// A fork/join task.
    Task,
}

/// One activity as it appears in the activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Runtime-assigned id, unique across all activity kinds.
    pub id: u64,
    /// Name the runtime gave the activity, e.g. its class name.
    pub name: String,
    /// What kind of activity this is.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
}

impl Activity {
    /// Creates an activity record.
    pub fn new(id: u64, name: impl Into<String>, activity_type: ActivityType) -> Self {
        Self { id, name: name.into(), activity_type }
    }
}

/// Batched id-to-name mapping for interned runtime symbols.
///
/// The runtime interns names (activity classes, source URIs) and refers to
/// them by id in the trace stream; `ids[i]` is the id of `symbols[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMapping {
    /// Symbol ids, parallel to `symbols`.
    pub ids: Vec<u16>,
    /// Symbol texts, parallel to `ids`.
    pub symbols: Vec<String>,
}

impl SymbolMapping {
    /// Pairs up ids with their texts.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &str)> {
        self.ids.iter().copied().zip(self.symbols.iter().map(String::as_str))
    }
}
