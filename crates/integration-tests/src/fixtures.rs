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

//! Fixture data shared by the integration test binaries.
//!
//! The source fixture is a small actor method in the style of the
//! Newspeak ping-pong demo; the trace fixture is the event stream a short
//! run of it would record.

use loupe_common::types::{
    ActivityType, Method, Source, SourceCoordinate, SymbolMapping, TaggedSourceCoordinate,
};
use loupe_common::{TraceEvent, TraceOrigin};

/// URI of the fixture source.
pub const PING_PONG_URI: &str = "file:/core-lib/PingPong.ns";

/// A three-line actor method with one tagged send expression and a
/// two-part selector declaration.
///
/// The send expression `pong <-: ping: n.` spans columns 3 to 19 of line
/// two; the whole declaration covers the full 44-character text, so its
/// closing marker lands on the synthetic row after the last line.
pub fn ping_pong_source() -> Source {
    Source {
        uri: PING_PONG_URI.to_string(),
        name: "PingPong.ns".to_string(),
        mime_type: "application/x-newspeak-som-ns".to_string(),
        source_text: "ping: n delay: ms = (\n  pong <-: ping: n.\n)\n".to_string(),
        sections: vec![TaggedSourceCoordinate {
            coord: SourceCoordinate::new(2, 3, 17),
            tags: vec!["EventualMessageSend".to_string()],
        }],
        methods: vec![Method {
            name: "ping:delay:".to_string(),
            definition: vec![SourceCoordinate::new(1, 1, 5), SourceCoordinate::new(1, 9, 6)],
            source_section: SourceCoordinate::new(1, 1, 44),
        }],
    }
}

/// The symbol table the trace fixture's name ids resolve through.
pub fn ping_pong_symbols() -> SymbolMapping {
    SymbolMapping {
        ids: vec![1, 2, 3],
        symbols: vec!["Platform".to_string(), "Ping".to_string(), "Pong".to_string()],
    }
}

/// The event stream of a short ping-pong run.
///
/// The main actor reports its own creation, spawns two actors and
/// messages each once; the first spawned actor then messages the second
/// twice. Folding this into a graph yields three nodes, two creation
/// edges, and message edges with counts 1, 1, and 2.
pub fn ping_pong_trace() -> Vec<TraceEvent> {
    let origin = TraceOrigin { file_symbol: 9, line: 1, column: 1, length: 5 };
    vec![
        TraceEvent::ImplThread { thread_id: 1 },
        TraceEvent::CurrentActivity { activity_id: 0, buffer_id: 0 },
        TraceEvent::ActivityCreate { kind: ActivityType::Actor, id: 0, name_symbol: 1, origin },
        TraceEvent::ActivityCreate { kind: ActivityType::Actor, id: 1, name_symbol: 2, origin },
        TraceEvent::ActivityCreate { kind: ActivityType::Actor, id: 2, name_symbol: 3, origin },
        TraceEvent::SendOp { entity: 11, target_activity: 1 },
        TraceEvent::SendOp { entity: 12, target_activity: 2 },
        TraceEvent::CurrentActivity { activity_id: 1, buffer_id: 1 },
        TraceEvent::SendOp { entity: 13, target_activity: 2 },
        TraceEvent::SendOp { entity: 14, target_activity: 2 },
    ]
}
