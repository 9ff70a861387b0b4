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

//! Codec for the binary trace-event stream the traced runtime emits.
//!
//! Activities record their events into per-thread buffers which the runtime
//! flushes to the front end as opaque byte chunks. All integers are
//! big-endian. Every event starts with a one-byte marker followed by a
//! fixed payload; creation-style events additionally carry the source
//! coordinate of the expression that caused them, with the source URI
//! interned as a symbol id.

use serde::Serialize;
use thiserror::Error;

use crate::types::ActivityType;

/// Event marker bytes, one per event kind.
pub mod marker {
    /// A new actor was created.
    pub const ACTOR_CREATE: u8 = 1;
    /// A new communicating process was created.
    pub const PROCESS_CREATE: u8 = 2;
    /// A new thread was created.
    pub const THREAD_CREATE: u8 = 3;
    /// A new fork/join task was created.
    pub const TASK_CREATE: u8 = 4;
    /// The current actor completed.
    pub const ACTOR_COMPLETE: u8 = 5;
    /// The current process completed.
    pub const PROCESS_COMPLETE: u8 = 6;
    /// The current thread completed.
    pub const THREAD_COMPLETE: u8 = 7;
    /// The current task completed.
    pub const TASK_COMPLETE: u8 = 8;
    /// A dynamic scope started.
    pub const SCOPE_START: u8 = 9;
    /// The innermost dynamic scope ended.
    pub const SCOPE_END: u8 = 10;
    /// A passive entity (promise, channel) was created.
    pub const PASSIVE_ENTITY_CREATE: u8 = 11;
    /// The current activity received a value from an entity.
    pub const RECEIVE_OP: u8 = 12;
    /// The current activity sent a value to an entity.
    pub const SEND_OP: u8 = 13;
    /// Identifies the implementation thread that owns the buffer.
    pub const IMPL_THREAD: u8 = 20;
    /// Switches the activity the following events belong to.
    pub const IMPL_CURRENT_ACTIVITY: u8 = 21;
}

/// Errors surfaced while decoding a trace buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer ended in the middle of an event payload.
    #[error("trace buffer truncated at offset {offset}: needed {needed} more bytes, {remaining} left")]
    Truncated {
        /// Byte offset of the read that failed.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
    /// The buffer contains a marker byte no event kind claims.
    #[error("unknown trace event marker {marker} at offset {offset}")]
    UnknownMarker {
        /// The unclaimed marker byte.
        marker: u8,
        /// Byte offset the marker was read at.
        offset: usize,
    },
}

/// Where in the sources a traced event originated.
///
/// The source is referred to by the interned symbol id of its URI, resolved
/// through the symbol mapping the runtime sends separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceOrigin {
    /// Interned symbol id of the source URI.
    pub file_symbol: u16,
    /// Line the originating expression starts on (1-based).
    pub line: u16,
    /// Column the originating expression starts on (1-based).
    pub column: u16,
    /// Character length of the originating expression.
    pub length: u16,
}

/// One decoded trace event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TraceEvent {
    /// Identifies the implementation thread that owns the buffer.
    ImplThread {
        /// Runtime id of the implementation thread.
        thread_id: i64,
    },
    /// All following events belong to this activity.
    CurrentActivity {
        /// Id of the activity that recorded the following events.
        activity_id: u64,
        /// Ordinal of this activity's buffer, for gap detection.
        buffer_id: u32,
    },
    /// The current activity created a new activity.
    ActivityCreate {
        /// What kind of activity was created.
        kind: ActivityType,
        /// Runtime id of the created activity.
        id: u64,
        /// Interned symbol id of the created activity's name.
        name_symbol: u16,
        /// Where the creating expression lives.
        origin: TraceOrigin,
    },
    /// The current activity finished.
    ActivityComplete {
        /// What kind of activity completed.
        kind: ActivityType,
    },
    /// A dynamic scope (message execution, transaction) started.
    ScopeStart {
        /// Runtime id of the entity the scope belongs to.
        scope_id: u64,
        /// Where the scope-opening expression lives.
        origin: TraceOrigin,
    },
    /// The innermost dynamic scope ended.
    ScopeEnd,
    /// A passive entity (promise, channel) was created.
    PassiveEntityCreate {
        /// Runtime id of the new entity.
        id: u64,
        /// Where the creating expression lives.
        origin: TraceOrigin,
    },
    /// The current activity received a value.
    ReceiveOp {
        /// Entity the value came from, e.g. a channel or promise.
        source_entity: u64,
    },
    /// The current activity sent a value to another activity's entity.
    SendOp {
        /// Entity the value went to, e.g. a mailbox or channel.
        entity: u64,
        /// Activity owning the receiving entity.
        target_activity: u64,
    },
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.pos + n > self.buf.len() {
            return Err(WireError::Truncated {
                offset: self.pos,
                needed: n,
                remaining: self.buf.len() - self.pos,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, WireError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, WireError> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn i64(&mut self) -> Result<i64, WireError> {
        let b = self.take(8)?;
        Ok(i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn origin(&mut self) -> Result<TraceOrigin, WireError> {
        let file_symbol = self.u16()?;
        let line = self.u16()?;
        let column = self.u16()?;
        let length = self.u16()?;
        Ok(TraceOrigin { file_symbol, line, column, length })
    }
}

/// Decodes one flushed trace buffer into its events.
///
/// A failure abandons the rest of the buffer; events decoded from earlier
/// buffers stay valid.
pub fn decode_buffer(buf: &[u8]) -> Result<Vec<TraceEvent>, WireError> {
    let mut reader = Reader::new(buf);
    let mut events = Vec::new();
    while !reader.is_empty() {
        events.push(decode_event(&mut reader)?);
    }
    Ok(events)
}

fn decode_event(r: &mut Reader<'_>) -> Result<TraceEvent, WireError> {
    let offset = r.pos;
    let event = match r.u8()? {
        marker::ACTOR_CREATE => creation(r, ActivityType::Actor)?,
        marker::PROCESS_CREATE => creation(r, ActivityType::Process)?,
        marker::THREAD_CREATE => creation(r, ActivityType::Thread)?,
        marker::TASK_CREATE => creation(r, ActivityType::Task)?,
        marker::ACTOR_COMPLETE => TraceEvent::ActivityComplete { kind: ActivityType::Actor },
        marker::PROCESS_COMPLETE => TraceEvent::ActivityComplete { kind: ActivityType::Process },
        marker::THREAD_COMPLETE => TraceEvent::ActivityComplete { kind: ActivityType::Thread },
        marker::TASK_COMPLETE => TraceEvent::ActivityComplete { kind: ActivityType::Task },
        marker::SCOPE_START => {
            let scope_id = r.u64()?;
            let origin = r.origin()?;
            TraceEvent::ScopeStart { scope_id, origin }
        }
        marker::SCOPE_END => TraceEvent::ScopeEnd,
        marker::PASSIVE_ENTITY_CREATE => {
            let id = r.u64()?;
            let origin = r.origin()?;
            TraceEvent::PassiveEntityCreate { id, origin }
        }
        marker::RECEIVE_OP => TraceEvent::ReceiveOp { source_entity: r.u64()? },
        marker::SEND_OP => {
            let entity = r.u64()?;
            let target_activity = r.u64()?;
            TraceEvent::SendOp { entity, target_activity }
        }
        marker::IMPL_THREAD => TraceEvent::ImplThread { thread_id: r.i64()? },
        marker::IMPL_CURRENT_ACTIVITY => {
            let activity_id = r.u64()?;
            let buffer_id = r.u32()?;
            TraceEvent::CurrentActivity { activity_id, buffer_id }
        }
        other => return Err(WireError::UnknownMarker { marker: other, offset }),
    };
    Ok(event)
}

fn creation(r: &mut Reader<'_>, kind: ActivityType) -> Result<TraceEvent, WireError> {
    let id = r.u64()?;
    let name_symbol = r.u16()?;
    let origin = r.origin()?;
    Ok(TraceEvent::ActivityCreate { kind, id, name_symbol, origin })
}

fn creation_marker(kind: ActivityType) -> u8 {
    match kind {
        ActivityType::Actor => marker::ACTOR_CREATE,
        ActivityType::Process => marker::PROCESS_CREATE,
        ActivityType::Thread => marker::THREAD_CREATE,
        ActivityType::Task => marker::TASK_CREATE,
    }
}

fn completion_marker(kind: ActivityType) -> u8 {
    match kind {
        ActivityType::Actor => marker::ACTOR_COMPLETE,
        ActivityType::Process => marker::PROCESS_COMPLETE,
        ActivityType::Thread => marker::THREAD_COMPLETE,
        ActivityType::Task => marker::TASK_COMPLETE,
    }
}

/// Appends the wire encoding of `event` to `out`.
///
/// This is the writer half of the codec, byte-compatible with what the
/// traced runtime emits. The front end itself only reads trace buffers;
/// the writer exists for fixtures and tooling.
pub fn encode_event(event: &TraceEvent, out: &mut Vec<u8>) {
    match event {
        TraceEvent::ImplThread { thread_id } => {
            out.push(marker::IMPL_THREAD);
            out.extend_from_slice(&thread_id.to_be_bytes());
        }
        TraceEvent::CurrentActivity { activity_id, buffer_id } => {
            out.push(marker::IMPL_CURRENT_ACTIVITY);
            out.extend_from_slice(&activity_id.to_be_bytes());
            out.extend_from_slice(&buffer_id.to_be_bytes());
        }
        TraceEvent::ActivityCreate { kind, id, name_symbol, origin } => {
            out.push(creation_marker(*kind));
            out.extend_from_slice(&id.to_be_bytes());
            out.extend_from_slice(&name_symbol.to_be_bytes());
            encode_origin(origin, out);
        }
        TraceEvent::ActivityComplete { kind } => {
            out.push(completion_marker(*kind));
        }
        TraceEvent::ScopeStart { scope_id, origin } => {
            out.push(marker::SCOPE_START);
            out.extend_from_slice(&scope_id.to_be_bytes());
            encode_origin(origin, out);
        }
        TraceEvent::ScopeEnd => out.push(marker::SCOPE_END),
        TraceEvent::PassiveEntityCreate { id, origin } => {
            out.push(marker::PASSIVE_ENTITY_CREATE);
            out.extend_from_slice(&id.to_be_bytes());
            encode_origin(origin, out);
        }
        TraceEvent::ReceiveOp { source_entity } => {
            out.push(marker::RECEIVE_OP);
            out.extend_from_slice(&source_entity.to_be_bytes());
        }
        TraceEvent::SendOp { entity, target_activity } => {
            out.push(marker::SEND_OP);
            out.extend_from_slice(&entity.to_be_bytes());
            out.extend_from_slice(&target_activity.to_be_bytes());
        }
    }
}

fn encode_origin(origin: &TraceOrigin, out: &mut Vec<u8>) {
    out.extend_from_slice(&origin.file_symbol.to_be_bytes());
    out.extend_from_slice(&origin.line.to_be_bytes());
    out.extend_from_slice(&origin.column.to_be_bytes());
    out.extend_from_slice(&origin.length.to_be_bytes());
}

/// Encodes a whole buffer of events.
pub fn encode_buffer(events: &[TraceEvent]) -> Vec<u8> {
    let mut out = Vec::new();
    for event in events {
        encode_event(event, &mut out);
    }
    out
}
