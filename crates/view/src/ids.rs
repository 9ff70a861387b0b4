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

//! Flat element ids.
//!
//! Every element the markup mentions carries a string id encoding what it
//! refers to: a source, a section within a source, a line anchor, or one
//! part of a method declaration, each optionally scoped to the activity
//! whose pane shows it. Toggle events come back from the rendering surface
//! carrying nothing but these ids, so the codec is bidirectional.
//!
//! Shapes:
//! - activity: `a<id>`, e.g. `a2`
//! - source: `s<n>`, assigned by the runtime, e.g. `s1`
//! - section: `<sourceId>:<startLine>:<startColumn>:<charLength>`, e.g. `s1:7:3:15`
//! - line anchor: `<sourceId>ln<line>`, e.g. `s1ln7`
//! - method declaration part: `<activity>m-<sectionId>-<partIndex>`, e.g. `a2m-s1:7:3:15-0`
//!
//! A malformed id on the decode side is a bug in whoever produced it, not
//! an input error, so the decode half asserts instead of returning
//! `Result`.

use loupe_common::types::SourceCoordinate;

/// Prefix of activity-scoped flat ids.
const ACTIVITY_PREFIX: &str = "a";

/// Returns the flat id of an activity, e.g. `a2`.
pub fn activity_flat_id(activity_id: u64) -> String {
    format!("{ACTIVITY_PREFIX}{activity_id}")
}

/// Recovers the activity id from its flat form.
///
/// # Panics
/// Panics when the id is not the activity prefix followed by decimal
/// digits.
pub fn activity_id_from_flat(flat: &str) -> u64 {
    let digits =
        flat.strip_prefix(ACTIVITY_PREFIX).unwrap_or_else(|| panic!("malformed activity id: {flat}"));
    digits.parse().unwrap_or_else(|_| panic!("malformed activity id: {flat}"))
}

/// Returns the breakpoint anchor id of a source line, e.g. `s1ln7`.
pub fn line_flat_id(line: usize, source_id: &str) -> String {
    format!("{source_id}ln{line}")
}

/// Returns the canonical id of a section within its source.
pub fn section_id(source_id: &str, coord: &SourceCoordinate) -> String {
    format!("{source_id}:{}:{}:{}", coord.start_line, coord.start_column, coord.char_length)
}

/// Scopes a section id to the activity whose pane shows it.
pub fn section_id_within_activity(section_id: &str, activity_id: u64) -> String {
    format!("{}{section_id}", activity_flat_id(activity_id))
}

/// Scopes a source id to the activity whose pane shows it.
pub fn source_id_within_activity(source_id: &str, activity_id: u64) -> String {
    section_id_within_activity(source_id, activity_id)
}

/// Strips the activity scope off a combined source id.
///
/// # Panics
/// Panics when no source part follows the activity prefix, or when the id
/// carries a coordinate suffix (i.e. it is a section id, not a source id).
pub fn extract_source_id(combined: &str) -> &str {
    let start = combined.find('s').unwrap_or(0);
    assert!(start > 0, "malformed combined source id: {combined}");
    assert!(!combined.contains(':'), "combined source id carries a coordinate suffix: {combined}");
    &combined[start..]
}

/// Strips the activity scope off a combined section id.
///
/// # Panics
/// Panics when no source part follows the activity prefix.
pub fn extract_section_id(combined: &str) -> &str {
    let start = combined.find('s').unwrap_or(0);
    assert!(start > 0, "malformed combined section id: {combined}");
    &combined[start..]
}

/// Returns the source id a section id belongs to.
///
/// # Panics
/// Panics when the id has no coordinate suffix to strip off.
pub fn source_id_from_section_id(section_id: &str) -> &str {
    let end = section_id.find(':').unwrap_or(0);
    assert!(end > 1, "malformed section id: {section_id}");
    &section_id[..end]
}

/// Decodes a section id back into its source id and coordinate.
///
/// # Panics
/// Panics unless the id has exactly the `<sourceId>:<line>:<column>:<length>`
/// shape with numeric coordinate fields.
pub fn section_id_parts(section_id: &str) -> (&str, SourceCoordinate) {
    let fields: Vec<&str> = section_id.split(':').collect();
    assert_eq!(fields.len(), 4, "malformed section id: {section_id}");
    assert!(fields[0].len() > 1, "malformed section id: {section_id}");
    let coordinate_field = |field: &str| {
        field.parse().unwrap_or_else(|_| panic!("malformed section id: {section_id}"))
    };
    (
        fields[0],
        SourceCoordinate::new(
            coordinate_field(fields[1]),
            coordinate_field(fields[2]),
            coordinate_field(fields[3]),
        ),
    )
}

/// Returns the flat id of one definition part of a method declaration.
///
/// `section_id` addresses the whole declaration; the part index
/// distinguishes the keyword fragments of a selector.
pub fn method_decl_id(section_id: &str, part_index: usize, activity_id: u64) -> String {
    format!("{}m-{section_id}-{part_index}", activity_flat_id(activity_id))
}

/// A decoded method-declaration-part id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclId {
    /// Id of the source the declaration lives in.
    pub source_id: String,
    /// Line the whole declaration starts on (1-based).
    pub start_line: usize,
    /// Column the whole declaration starts on (1-based).
    pub start_column: usize,
    /// Character length of the whole declaration.
    pub char_length: usize,
    /// Zero-based index of the definition part.
    pub idx: usize,
}

impl MethodDeclId {
    /// Rebuilds the section id of the whole declaration.
    pub fn section_id(&self) -> String {
        format!("{}:{}:{}:{}", self.source_id, self.start_line, self.start_column, self.char_length)
    }
}

/// Decodes a method-declaration-part id back into its components.
///
/// # Panics
/// Panics when the id does not have exactly the
/// `<activity>m-<sectionId>-<idx>` shape with a four-field coordinate in
/// the middle.
pub fn method_decl_from_id(flat: &str) -> MethodDeclId {
    let segments: Vec<&str> = flat.split('-').collect();
    assert_eq!(segments.len(), 3, "malformed method declaration id: {flat}");
    let coord: Vec<&str> = segments[1].split(':').collect();
    assert_eq!(coord.len(), 4, "malformed method declaration id: {flat}");
    MethodDeclId {
        source_id: coord[0].to_string(),
        start_line: decimal_field(coord[1], flat),
        start_column: decimal_field(coord[2], flat),
        char_length: decimal_field(coord[3], flat),
        idx: decimal_field(segments[2], flat),
    }
}

fn decimal_field(field: &str, flat: &str) -> usize {
    field.parse().unwrap_or_else(|_| panic!("malformed method declaration id: {flat}"))
}
