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

//! In-memory breakpoint records and their toggle flow.
//!
//! A toggle event carries nothing but an element's flat id; the registry
//! locates the record it refers to, creating a disabled one on first touch,
//! and flips it. The collaborator that talks to the debuggee reads the
//! enabled records off the registry; persistence and synchronization are
//! its concern, not ours.

use loupe_common::types::{
    LineBreakpointData, SectionBreakpointData, SectionBreakpointType, SourceCoordinate,
};
use tracing::debug;

use crate::ids;

/// A breakpoint anchored to a whole source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBreakpoint {
    /// The record as the debugger protocol carries it.
    pub data: LineBreakpointData,
    /// Id of the source the line belongs to.
    pub source_id: String,
}

impl LineBreakpoint {
    /// Id of the breakpoint's entry in the breakpoint list.
    pub fn list_entry_id(&self) -> String {
        format!("bp:{}:{}", self.source_id, self.data.line)
    }

    /// Class of the line anchor the breakpoint highlights.
    pub fn anchor_class(&self) -> String {
        ids::line_flat_id(self.data.line, &self.source_id)
    }

    /// Whether the breakpoint currently fires.
    pub fn is_enabled(&self) -> bool {
        self.data.enabled
    }
}

/// A breakpoint anchored to an exact character run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBreakpoint {
    /// The record as the debugger protocol carries it.
    pub data: SectionBreakpointData,
    /// Canonical id of the anchored section.
    pub section_id: String,
}

impl SectionBreakpoint {
    /// Id of the breakpoint's entry in the breakpoint list.
    pub fn list_entry_id(&self) -> String {
        format!("bp:{}", self.data.breakpoint_type)
    }

    /// Class of the source elements the breakpoint highlights.
    pub fn anchor_class(&self) -> String {
        self.section_id.clone()
    }

    /// Whether the breakpoint currently fires.
    pub fn is_enabled(&self) -> bool {
        self.data.enabled
    }
}

/// Either kind of breakpoint record, borrowed from the registry.
#[derive(Debug, Clone, Copy)]
pub enum Breakpoint<'a> {
    /// A line-anchored record.
    Line(&'a LineBreakpoint),
    /// A section-anchored record.
    Section(&'a SectionBreakpoint),
}

impl Breakpoint<'_> {
    /// Id of the breakpoint's entry in the breakpoint list.
    pub fn list_entry_id(&self) -> String {
        match self {
            Self::Line(bp) => bp.list_entry_id(),
            Self::Section(bp) => bp.list_entry_id(),
        }
    }

    /// Whether the breakpoint currently fires.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Line(bp) => bp.is_enabled(),
            Self::Section(bp) => bp.is_enabled(),
        }
    }
}

/// All breakpoint records of a session, in creation order.
#[derive(Debug, Clone, Default)]
pub struct BreakpointRegistry {
    line_breakpoints: Vec<LineBreakpoint>,
    section_breakpoints: Vec<SectionBreakpoint>,
}

impl BreakpointRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles the line breakpoint at `line` of the source, creating its
    /// record on first toggle. A fresh record starts out disabled, so the
    /// toggle that created it leaves it enabled.
    pub fn toggle_line(&mut self, source_uri: &str, source_id: &str, line: usize) -> &LineBreakpoint {
        let index = self
            .line_breakpoints
            .iter()
            .position(|bp| bp.source_id == source_id && bp.data.line == line)
            .unwrap_or_else(|| {
                debug!(source_id, line, "new line breakpoint record");
                self.line_breakpoints.push(LineBreakpoint {
                    data: LineBreakpointData::new(source_uri, line, false),
                    source_id: source_id.to_string(),
                });
                self.line_breakpoints.len() - 1
            });

        let bp = &mut self.line_breakpoints[index];
        bp.data.enabled = !bp.data.enabled;
        debug!(id = %bp.list_entry_id(), enabled = bp.data.enabled, "line breakpoint toggled");
        &self.line_breakpoints[index]
    }

    /// Toggles the section breakpoint of `kind` anchored to `section_id`,
    /// creating its record on first toggle.
    pub fn toggle_section(
        &mut self,
        source_uri: &str,
        section_id: &str,
        coord: &SourceCoordinate,
        kind: SectionBreakpointType,
    ) -> &SectionBreakpoint {
        let index = self
            .section_breakpoints
            .iter()
            .position(|bp| bp.section_id == section_id && bp.data.breakpoint_type == kind)
            .unwrap_or_else(|| {
                debug!(section_id, %kind, "new section breakpoint record");
                self.section_breakpoints.push(SectionBreakpoint {
                    data: SectionBreakpointData::new(
                        source_uri,
                        coord.start_line,
                        coord.start_column,
                        coord.char_length,
                        kind,
                        false,
                    ),
                    section_id: section_id.to_string(),
                });
                self.section_breakpoints.len() - 1
            });

        let bp = &mut self.section_breakpoints[index];
        bp.data.enabled = !bp.data.enabled;
        debug!(id = %bp.list_entry_id(), enabled = bp.data.enabled, "section breakpoint toggled");
        &self.section_breakpoints[index]
    }

    /// Routes a toggle event raised with an element's activity-scoped flat
    /// id, e.g. `a2s1:7:3:15`.
    ///
    /// The section id and its coordinate are recovered from the flat id;
    /// the source URI the protocol record needs is looked up through
    /// `uri_for_source`, since element ids only carry source ids.
    ///
    /// # Panics
    /// Panics when the flat id is not an activity-scoped section id; such
    /// ids are produced by the serializer and cannot be malformed unless a
    /// collaborator made one up.
    pub fn toggle_section_by_flat_id(
        &mut self,
        flat_id: &str,
        uri_for_source: impl FnOnce(&str) -> String,
        kind: SectionBreakpointType,
    ) -> &SectionBreakpoint {
        let section_id = ids::extract_section_id(flat_id);
        let (source_id, coord) = ids::section_id_parts(section_id);
        let uri = uri_for_source(source_id);
        self.toggle_section(&uri, section_id, &coord, kind)
    }

    /// Line records in creation order.
    pub fn line_breakpoints(&self) -> &[LineBreakpoint] {
        &self.line_breakpoints
    }

    /// Section records in creation order.
    pub fn section_breakpoints(&self) -> &[SectionBreakpoint] {
        &self.section_breakpoints
    }

    /// All records that currently fire, line records first.
    pub fn enabled(&self) -> impl Iterator<Item = Breakpoint<'_>> {
        self.line_breakpoints
            .iter()
            .filter(|bp| bp.is_enabled())
            .map(Breakpoint::Line)
            .chain(
                self.section_breakpoints
                    .iter()
                    .filter(|bp| bp.is_enabled())
                    .map(Breakpoint::Section),
            )
    }
}
