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

use serde::{Deserialize, Serialize};

/// A contiguous character run inside a source, addressed in 1-based
/// line/column space.
///
/// Crossing a line boundary consumes one character, the line terminator
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCoordinate {
    /// Line the run starts on (1-based).
    pub start_line: usize,
    /// Column the run starts on (1-based).
    pub start_column: usize,
    /// Number of characters covered, line terminators included.
    pub char_length: usize,
}

impl SourceCoordinate {
    /// Creates a coordinate from its three components.
    pub fn new(start_line: usize, start_column: usize, char_length: usize) -> Self {
        Self { start_line, start_column, char_length }
    }
}

/// A source coordinate as it travels between processes: the run plus the
/// URI of the source it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSourceCoordinate {
    /// URI of the source the run belongs to.
    pub uri: String,
    /// Line the run starts on (1-based).
    pub start_line: usize,
    /// Column the run starts on (1-based).
    pub start_column: usize,
    /// Number of characters covered, line terminators included.
    pub char_length: usize,
}

/// A character run the runtime has tagged, e.g. as a message send or a
/// channel operation.
///
/// Tag names are emitted verbatim into the annotated markup, so the
/// rendering surface can style per tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedSourceCoordinate {
    /// The tagged character run.
    #[serde(flatten)]
    pub coord: SourceCoordinate,
    /// Runtime-assigned tag names, in the runtime's order. Never empty.
    pub tags: Vec<String>,
}

/// A method the runtime knows about: its name, the coordinate of the whole
/// declaration, and one coordinate per definition part.
///
/// Keyword-message selectors have one definition part per keyword, so a
/// single method contributes several marker pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// Method name as the runtime reports it.
    pub name: String,
    /// One coordinate per definition part, in declaration order.
    pub definition: Vec<SourceCoordinate>,
    /// The whole declaration, from its first part to the end of the body.
    pub source_section: SourceCoordinate,
}

/// One source file, as the runtime hands it over on first display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// URI the runtime loaded the source from.
    pub uri: String,
    /// Display name, typically the file name.
    pub name: String,
    /// MIME type of the text, e.g. `application/x-newspeak-som-ns`.
    pub mime_type: String,
    /// The raw text, exactly as loaded.
    pub source_text: String,
    /// Tagged sections the runtime wants highlighted.
    pub sections: Vec<TaggedSourceCoordinate>,
    /// Methods with their declaration parts.
    pub methods: Vec<Method>,
}
