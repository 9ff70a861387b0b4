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

//! Activity-graph model fed by the binary trace stream.
//!
//! Folds decoded trace events into nodes (one per activity) and links
//! (message traffic and creation relations). The force-directed layout that
//! would draw this lives elsewhere; it only needs the node list, the link
//! list, and the maximum message count for scaling link strength.

use std::collections::HashMap;

use itertools::Itertools;
use loupe_common::{
    types::{Activity, SymbolMapping},
    TraceEvent,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ids;

/// One activity in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityNode {
    /// The activity the node stands for.
    #[serde(flatten)]
    pub activity: Activity,
    /// Whether the activity is still executing.
    pub running: bool,
}

impl ActivityNode {
    /// Flat id of the graph element representing this activity.
    pub fn flat_id(&self) -> String {
        ids::activity_flat_id(self.activity.id)
    }
}

/// A directed edge between two activities.
///
/// Message links aggregate all sends between the pair; creation links record
/// that `source` spawned `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLink {
    /// Id of the sending or creating activity.
    pub source: u64,
    /// Id of the receiving or created activity.
    pub target: u64,
    /// Number of sends along this edge; zero for creation links.
    pub message_count: u64,
    /// Whether this edge records a creation rather than message traffic.
    pub creation: bool,
}

/// Accumulated graph state over all trace buffers seen so far.
#[derive(Debug, Clone, Default)]
pub struct ActivityGraph {
    symbols: HashMap<u16, String>,
    nodes: Vec<ActivityNode>,
    node_index: HashMap<u64, usize>,
    messages: HashMap<(u64, u64), u64>,
    creations: Vec<(u64, u64)>,
    current_activity: Option<u64>,
}

impl ActivityGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a batch of interned-symbol resolutions.
    ///
    /// The runtime sends these ahead of the trace buffers that use them;
    /// later batches may extend or overwrite earlier ones.
    pub fn register_symbols(&mut self, mapping: &SymbolMapping) {
        for (id, text) in mapping.entries() {
            self.symbols.insert(id, text.to_string());
        }
    }

    /// Resolves an interned symbol, falling back to a placeholder when the
    /// resolution has not arrived yet.
    pub fn symbol(&self, id: u16) -> String {
        match self.symbols.get(&id) {
            Some(text) => text.clone(),
            None => format!("<symbol {id}>"),
        }
    }

    /// Folds one decoded buffer into the graph.
    ///
    /// Returns the activities first seen in this buffer, in stream order,
    /// so the caller can register panes for them.
    pub fn apply_buffer(&mut self, events: &[TraceEvent]) -> Vec<Activity> {
        let mut new_activities = Vec::new();

        for event in events {
            match event {
                TraceEvent::CurrentActivity { activity_id, buffer_id: _ } => {
                    self.current_activity = Some(*activity_id);
                }
                TraceEvent::ActivityCreate { kind, id, name_symbol, origin: _ } => {
                    if self.node_index.contains_key(id) {
                        warn!(id, "ignoring repeated creation event");
                        continue;
                    }
                    let activity = Activity::new(*id, self.symbol(*name_symbol), *kind);
                    debug!(id, name = %activity.name, kind = %kind, "new activity");
                    new_activities.push(activity.clone());
                    self.node_index.insert(*id, self.nodes.len());
                    self.nodes.push(ActivityNode { activity, running: true });

                    // The initial activity reports its own creation; no
                    // self-loop for that.
                    match self.current_activity {
                        Some(creator) if creator != *id => self.creations.push((creator, *id)),
                        _ => {}
                    }
                }
                TraceEvent::ActivityComplete { kind: _ } => {
                    let index =
                        self.current_activity.and_then(|id| self.node_index.get(&id).copied());
                    if let Some(index) = index {
                        self.nodes[index].running = false;
                    }
                }
                TraceEvent::SendOp { entity: _, target_activity } => {
                    if let Some(sender) = self.current_activity {
                        *self.messages.entry((sender, *target_activity)).or_insert(0) += 1;
                    }
                }
                // Scope and passive-entity events feed views this graph
                // does not model.
                TraceEvent::ImplThread { .. }
                | TraceEvent::ScopeStart { .. }
                | TraceEvent::ScopeEnd
                | TraceEvent::PassiveEntityCreate { .. }
                | TraceEvent::ReceiveOp { .. } => {}
            }
        }

        new_activities
    }

    /// All nodes, in the order their activities first appeared.
    pub fn nodes(&self) -> &[ActivityNode] {
        &self.nodes
    }

    /// The node for an activity, if its creation has been seen.
    pub fn node(&self, activity_id: u64) -> Option<&ActivityNode> {
        self.node_index.get(&activity_id).map(|&index| &self.nodes[index])
    }

    /// All links: message edges ordered by (source, target), then creation
    /// edges in the order the creations happened.
    pub fn links(&self) -> Vec<ActivityLink> {
        let messages = self
            .messages
            .iter()
            .sorted_by_key(|(&pair, _)| pair)
            .map(|(&(source, target), &message_count)| ActivityLink {
                source,
                target,
                message_count,
                creation: false,
            });

        let creations = self.creations.iter().map(|&(source, target)| ActivityLink {
            source,
            target,
            message_count: 0,
            creation: true,
        });

        messages.chain(creations).collect()
    }

    /// Largest per-edge send count, for scaling link strength. At least 1,
    /// so the scale stays well-defined on message-free graphs.
    pub fn max_message_sends(&self) -> u64 {
        self.messages.values().copied().max().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use loupe_common::{types::ActivityType, TraceOrigin};

    use super::*;

    fn origin() -> TraceOrigin {
        TraceOrigin { file_symbol: 1, line: 4, column: 9, length: 12 }
    }

    fn mapping(pairs: &[(u16, &str)]) -> SymbolMapping {
        SymbolMapping {
            ids: pairs.iter().map(|&(id, _)| id).collect(),
            symbols: pairs.iter().map(|&(_, text)| text.to_string()).collect(),
        }
    }

    fn create(id: u64, name_symbol: u16) -> TraceEvent {
        TraceEvent::ActivityCreate {
            kind: ActivityType::Actor,
            id,
            name_symbol,
            origin: origin(),
        }
    }

    fn current(activity_id: u64) -> TraceEvent {
        TraceEvent::CurrentActivity { activity_id, buffer_id: 0 }
    }

    #[test]
    fn test_creation_registers_a_running_node() {
        let mut graph = ActivityGraph::new();
        graph.register_symbols(&mapping(&[(7, "Ping")]));

        let new = graph.apply_buffer(&[current(1), create(1, 7)]);

        assert_eq!(new, vec![Activity::new(1, "Ping", ActivityType::Actor)]);
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.nodes()[0].running);
        assert_eq!(graph.nodes()[0].flat_id(), "a1");
    }

    #[test]
    fn test_unresolved_symbols_fall_back_to_placeholder_names() {
        let mut graph = ActivityGraph::new();
        let new = graph.apply_buffer(&[current(1), create(1, 99)]);

        assert_eq!(new[0].name, "<symbol 99>");
    }

    #[test]
    fn test_later_symbol_batches_extend_the_table() {
        let mut graph = ActivityGraph::new();
        graph.register_symbols(&mapping(&[(1, "Ping")]));
        graph.register_symbols(&mapping(&[(2, "Pong")]));

        assert_eq!(graph.symbol(1), "Ping");
        assert_eq!(graph.symbol(2), "Pong");
    }

    #[test]
    fn test_creation_links_point_from_creator_to_created() {
        let mut graph = ActivityGraph::new();
        graph.apply_buffer(&[current(1), create(1, 1), create(2, 2)]);

        let links = graph.links();
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].source, links[0].target), (1, 2));
        assert!(links[0].creation);
    }

    #[test]
    fn test_initial_activity_gets_no_creation_link() {
        let mut graph = ActivityGraph::new();
        graph.apply_buffer(&[current(1), create(1, 1)]);

        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_repeated_creation_events_are_ignored() {
        let mut graph = ActivityGraph::new();
        let first = graph.apply_buffer(&[current(1), create(1, 1)]);
        let second = graph.apply_buffer(&[current(1), create(1, 1)]);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_completion_marks_the_current_activity_stopped() {
        let mut graph = ActivityGraph::new();
        graph.apply_buffer(&[
            current(1),
            create(1, 1),
            create(2, 2),
            current(2),
            TraceEvent::ActivityComplete { kind: ActivityType::Actor },
        ]);

        assert!(graph.node(1).unwrap().running);
        assert!(!graph.node(2).unwrap().running);
    }

    #[test]
    fn test_sends_accumulate_per_edge() {
        let mut graph = ActivityGraph::new();
        graph.apply_buffer(&[
            current(1),
            create(1, 1),
            create(2, 2),
            TraceEvent::SendOp { entity: 40, target_activity: 2 },
            TraceEvent::SendOp { entity: 40, target_activity: 2 },
            current(2),
            TraceEvent::SendOp { entity: 41, target_activity: 1 },
        ]);

        let links = graph.links();
        let messages: Vec<_> = links.iter().filter(|link| !link.creation).collect();
        assert_eq!(messages.len(), 2);
        assert_eq!((messages[0].source, messages[0].target, messages[0].message_count), (1, 2, 2));
        assert_eq!((messages[1].source, messages[1].target, messages[1].message_count), (2, 1, 1));
        assert_eq!(graph.max_message_sends(), 2);
    }

    #[test]
    fn test_links_list_messages_before_creations() {
        let mut graph = ActivityGraph::new();
        graph.apply_buffer(&[
            current(1),
            create(1, 1),
            create(2, 2),
            TraceEvent::SendOp { entity: 40, target_activity: 2 },
        ]);

        let links = graph.links();
        assert_eq!(links.len(), 2);
        assert!(!links[0].creation);
        assert!(links[1].creation);
    }

    #[test]
    fn test_max_message_sends_is_one_on_a_quiet_graph() {
        assert_eq!(ActivityGraph::new().max_message_sends(), 1);
    }

    #[test]
    fn test_nodes_and_links_serialize_for_the_layout() {
        let mut graph = ActivityGraph::new();
        graph.register_symbols(&mapping(&[(7, "Ping")]));
        graph.apply_buffer(&[
            current(1),
            create(1, 7),
            create(2, 7),
            TraceEvent::SendOp { entity: 40, target_activity: 2 },
        ]);

        let node = serde_json::to_value(&graph.nodes()[0]).unwrap();
        assert_eq!(node["id"], 1);
        assert_eq!(node["name"], "Ping");
        assert_eq!(node["type"], "Actor");
        assert_eq!(node["running"], true);

        let link = serde_json::to_value(graph.links()[0]).unwrap();
        assert_eq!(link["source"], 1);
        assert_eq!(link["target"], 2);
        assert_eq!(link["messageCount"], 1);
        assert_eq!(link["creation"], false);
    }

    #[test]
    fn test_scope_events_do_not_disturb_the_graph() {
        let mut graph = ActivityGraph::new();
        graph.apply_buffer(&[
            current(1),
            create(1, 1),
            TraceEvent::ScopeStart { scope_id: 9, origin: origin() },
            TraceEvent::PassiveEntityCreate { id: 17, origin: origin() },
            TraceEvent::ReceiveOp { source_entity: 17 },
            TraceEvent::ScopeEnd,
        ]);

        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.links().is_empty());
    }
}
