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

use std::{fmt::Display, str::FromStr};

use eyre::{bail, Error, Result};
use serde::{Deserialize, Serialize};

use crate::types::FullSourceCoordinate;

/// Wire record for a breakpoint anchored to a whole source line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBreakpointData {
    /// Whether the breakpoint currently fires.
    pub enabled: bool,
    /// URI of the source the line belongs to.
    pub uri: String,
    /// Line the breakpoint is anchored to (1-based).
    pub line: usize,
}

impl LineBreakpointData {
    /// Creates a line breakpoint record.
    ///
    /// Records created from a toggle start out disabled; the toggle that
    /// created them flips them on.
    pub fn new(uri: impl Into<String>, line: usize, enabled: bool) -> Self {
        Self { enabled, uri: uri.into(), line }
    }
}

/// Wire record for a breakpoint anchored to an exact character run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBreakpointData {
    /// Whether the breakpoint currently fires.
    pub enabled: bool,
    /// Which runtime event the breakpoint intercepts.
    #[serde(rename = "type")]
    pub breakpoint_type: SectionBreakpointType,
    /// The anchored character run, with its source URI.
    pub coord: FullSourceCoordinate,
}

impl SectionBreakpointData {
    /// Creates a section breakpoint record for the given run.
    pub fn new(
        uri: impl Into<String>,
        start_line: usize,
        start_column: usize,
        char_length: usize,
        breakpoint_type: SectionBreakpointType,
        enabled: bool,
    ) -> Self {
        Self {
            enabled,
            breakpoint_type,
            coord: FullSourceCoordinate {
                uri: uri.into(),
                start_line,
                start_column,
                char_length,
            },
        }
    }
}

/// The section-anchored breakpoint kinds the runtime understands.
///
/// On the wire each kind travels under its full protocol name, e.g.
/// `MessageSenderBreakpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionBreakpointType {
    /// Break in the sender, before an asynchronous message leaves.
    #[serde(rename = "MessageSenderBreakpoint")]
    MessageSender,
    /// Break in the receiver, when the message is taken off the mailbox.
    #[serde(rename = "MessageReceiverBreakpoint")]
    MessageReceiver,
    /// Break before the received message's method starts executing.
    #[serde(rename = "AsyncMessageBeforeExecutionBreakpoint")]
    AsyncMessageBeforeExecution,
    /// Break after the received message's method finished executing.
    #[serde(rename = "AsyncMessageAfterExecutionBreakpoint")]
    AsyncMessageAfterExecution,
    /// Break where a promise gets resolved.
    #[serde(rename = "PromiseResolverBreakpoint")]
    PromiseResolver,
    /// Break where a resolved promise's callbacks run.
    #[serde(rename = "PromiseResolutionBreakpoint")]
    PromiseResolution,
    /// Break on the matching end of a channel operation.
    #[serde(rename = "ChannelOppositeBreakpoint")]
    ChannelOpposite,
    /// Break where a new activity is created.
    #[serde(rename = "ActivityCreationBreakpoint")]
    ActivityCreation,
    /// Break when the created activity starts executing.
    #[serde(rename = "ActivityOnExecBreakpoint")]
    ActivityOnExec,
}

impl SectionBreakpointType {
    /// All kinds, in protocol declaration order.
    pub const ALL: [Self; 9] = [
        Self::MessageSender,
        Self::MessageReceiver,
        Self::AsyncMessageBeforeExecution,
        Self::AsyncMessageAfterExecution,
        Self::PromiseResolver,
        Self::PromiseResolution,
        Self::ChannelOpposite,
        Self::ActivityCreation,
        Self::ActivityOnExec,
    ];
}

impl Display for SectionBreakpointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MessageSender => "MessageSenderBreakpoint",
            Self::MessageReceiver => "MessageReceiverBreakpoint",
            Self::AsyncMessageBeforeExecution => "AsyncMessageBeforeExecutionBreakpoint",
            Self::AsyncMessageAfterExecution => "AsyncMessageAfterExecutionBreakpoint",
            Self::PromiseResolver => "PromiseResolverBreakpoint",
            Self::PromiseResolution => "PromiseResolutionBreakpoint",
            Self::ChannelOpposite => "ChannelOppositeBreakpoint",
            Self::ActivityCreation => "ActivityCreationBreakpoint",
            Self::ActivityOnExec => "ActivityOnExecBreakpoint",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SectionBreakpointType {
    type Err = Error;

    /// Parses the full protocol name of a breakpoint kind.
    fn from_str(s: &str) -> Result<Self> {
        let parsed = match s {
            "MessageSenderBreakpoint" => Self::MessageSender,
            "MessageReceiverBreakpoint" => Self::MessageReceiver,
            "AsyncMessageBeforeExecutionBreakpoint" => Self::AsyncMessageBeforeExecution,
            "AsyncMessageAfterExecutionBreakpoint" => Self::AsyncMessageAfterExecution,
            "PromiseResolverBreakpoint" => Self::PromiseResolver,
            "PromiseResolutionBreakpoint" => Self::PromiseResolution,
            "ChannelOppositeBreakpoint" => Self::ChannelOpposite,
            "ActivityCreationBreakpoint" => Self::ActivityCreation,
            "ActivityOnExecBreakpoint" => Self::ActivityOnExec,
            other => bail!("Unknown section breakpoint type: {other}"),
        };
        Ok(parsed)
    }
}
