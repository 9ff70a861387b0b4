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

//! Character matrix built from raw source text.
//!
//! The matrix holds one cell per character, one row per line. A line's
//! terminator stays behind as a trailing placeholder cell so end
//! coordinates can land on it, and one synthetic row is appended so
//! sections running to the very end of the text have a landing cell too.
//! Serializing an untouched matrix reproduces the original text exactly.

use tracing::trace;

use crate::markers::Marker;

/// Markers and the character they surround, for a cell at least one
/// section starts or ends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The character the cell held before promotion, if any.
    pub text: Option<char>,
    /// Markers emitted before the character.
    pub before: Vec<Marker>,
    /// Markers emitted after the character.
    pub after: Vec<Marker>,
}

impl Annotation {
    fn new(text: Option<char>) -> Self {
        Self { text, before: Vec::new(), after: Vec::new() }
    }

    /// Puts the cell's markers into emission order.
    pub(crate) fn sort_markers(&mut self) {
        self.before.sort_by(Marker::ordering);
        self.after.sort_by(Marker::ordering);
    }
}

/// One cell of the character matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// A plain character. `Some('\n')` is the placeholder a line terminator
    /// leaves behind; `None` is the synthetic end-of-text landing cell.
    Literal(Option<char>),
    /// A cell at least one marker is attached to.
    Annotated(Annotation),
}

impl Cell {
    /// Promotes the cell to an annotation, keeping its character. Promoting
    /// an already promoted cell returns the existing annotation.
    pub(crate) fn ensure_annotation(&mut self) -> &mut Annotation {
        if let Self::Literal(text) = self {
            *self = Self::Annotated(Annotation::new(*text));
        }
        match self {
            Self::Annotated(annotation) => annotation,
            Self::Literal(_) => unreachable!("cell was just promoted"),
        }
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Self::Literal(text) => {
                if let Some(ch) = text {
                    out.push(*ch);
                }
            }
            Self::Annotated(annotation) => {
                for marker in &annotation.before {
                    out.push_str(&marker.to_string());
                }
                if let Some(ch) = annotation.text {
                    out.push(ch);
                }
                for marker in &annotation.after {
                    out.push_str(&marker.to_string());
                }
            }
        }
    }
}

/// The cells of one source, one row per line plus the synthetic landing
/// row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterMatrix {
    rows: Vec<Vec<Cell>>,
}

impl CharacterMatrix {
    /// Splits `text` into cells, one row per line.
    ///
    /// Line terminators stay behind as trailing placeholder cells, a final
    /// unterminated line keeps its row, and the synthetic last row gives
    /// end-of-text coordinates a cell to land on.
    pub fn build(text: &str) -> Self {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        for ch in text.chars() {
            row.push(Cell::Literal(Some(ch)));
            if ch == '\n' {
                rows.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        rows.push(vec![Cell::Literal(None)]);
        trace!(rows = rows.len(), "built character matrix");
        Self { rows }
    }

    /// Number of real source lines, the synthetic landing row excluded.
    pub fn line_count(&self) -> usize {
        self.rows.len() - 1
    }

    /// The rows, the synthetic landing row included.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub(crate) fn cell_mut(&mut self, line: usize, column: usize) -> &mut Cell {
        &mut self.rows[line][column]
    }

    /// Maps a 1-based start coordinate and length to the 1-based cell the
    /// run ends on, i.e. the first cell after its last character.
    ///
    /// Stepping across a line boundary consumes one character, the
    /// terminator. A run of length zero ends where it starts; a run ending
    /// exactly at the end of the text lands on the synthetic row.
    ///
    /// # Panics
    /// Panics when `start_line` lies outside the matrix or the run walks
    /// past the end of the text.
    pub fn end_of(&self, start_line: usize, start_column: usize, length: usize) -> (usize, usize) {
        assert!(
            start_line >= 1 && start_line <= self.rows.len(),
            "start line {start_line} outside matrix of {} rows",
            self.rows.len()
        );
        assert!(start_column >= 1, "start column must be 1-based");

        let mut line = start_line - 1;
        let mut column = start_column - 1;
        for _ in 0..length {
            if column + 1 < self.rows[line].len() {
                column += 1;
            } else {
                line += 1;
                assert!(
                    line < self.rows.len(),
                    "run from {start_line}:{start_column} of length {length} walks past end of text"
                );
                column = 0;
            }
        }
        (line + 1, column + 1)
    }

    /// Puts every annotated cell's markers into emission order.
    pub(crate) fn sort_all_markers(&mut self) {
        for row in &mut self.rows {
            for cell in row {
                if let Cell::Annotated(annotation) = cell {
                    annotation.sort_markers();
                }
            }
        }
    }

    /// Renders the matrix back to text, markers included.
    ///
    /// On an untouched matrix this reproduces the built text exactly.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            for cell in row {
                cell.render_into(&mut out);
            }
        }
        out
    }
}
