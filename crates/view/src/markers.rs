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

//! Markers attached to matrix cells.
//!
//! A marker either opens a span (for a tagged section or for one part of a
//! method declaration) or closes the innermost open one. Rendering a marker
//! yields its exact markup text; the per-cell emission order lives in
//! [`Marker::ordering`].

use std::cmp::Ordering;
use std::fmt;

use crate::ids;

/// A begin or end marker sitting on a matrix cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Opens the span of a tagged section.
    Begin {
        /// Canonical id of the section within its source.
        section_id: String,
        /// Activity whose pane the span belongs to.
        activity_id: u64,
        /// Tag names emitted as the span's classes.
        tags: Vec<String>,
        /// Character length of the section.
        length: usize,
    },
    /// Opens the span of one definition part of a method declaration.
    BeginMethodDef {
        /// Section id of the whole declaration.
        section_id: String,
        /// Activity whose pane the span belongs to.
        activity_id: u64,
        /// Zero-based index of this definition part.
        part_index: usize,
        /// Character length of this definition part.
        length: usize,
    },
    /// Closes the innermost open span.
    End {
        /// Character length of the span being closed.
        length: usize,
    },
}

impl Marker {
    /// The character length the marker accounts for.
    pub fn length(&self) -> usize {
        match self {
            Self::Begin { length, .. }
            | Self::BeginMethodDef { length, .. }
            | Self::End { length } => *length,
        }
    }

    /// Whether the marker opens a span.
    pub fn is_begin(&self) -> bool {
        !matches!(self, Self::End { .. })
    }

    /// Cell-local emission order.
    ///
    /// Ends come before begins so a span closing on a cell never swallows
    /// one opening there. Among ends the shortest closes first (the
    /// innermost span ends innermost); among begins the longest opens first
    /// (the outermost span opens outermost). Ties keep insertion order
    /// under a stable sort.
    pub fn ordering(a: &Self, b: &Self) -> Ordering {
        match (a.is_begin(), b.is_begin()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, false) => a.length().cmp(&b.length()),
            (true, true) => b.length().cmp(&a.length()),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin { section_id, activity_id, tags, .. } => {
                write!(
                    f,
                    "<span id=\"{}\" class=\"{} {section_id}\">",
                    ids::section_id_within_activity(section_id, *activity_id),
                    tags.join(" ")
                )
            }
            Self::BeginMethodDef { section_id, activity_id, part_index, .. } => {
                write!(
                    f,
                    "<span id=\"{}\" class=\"MethodDeclaration {section_id}\">",
                    ids::method_decl_id(section_id, *part_index, *activity_id)
                )
            }
            Self::End { .. } => write!(f, "</span>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(length: usize) -> Marker {
        Marker::Begin {
            section_id: format!("s1:1:1:{length}"),
            activity_id: 0,
            tags: vec!["EventualMessageSend".to_string()],
            length,
        }
    }

    #[test]
    fn test_begin_renders_scoped_id_and_tags() {
        let marker = Marker::Begin {
            section_id: "s1:7:3:15".to_string(),
            activity_id: 2,
            tags: vec!["ChannelRead".to_string(), "ExpressionBreakpoint".to_string()],
            length: 15,
        };
        assert_eq!(
            marker.to_string(),
            "<span id=\"a2s1:7:3:15\" class=\"ChannelRead ExpressionBreakpoint s1:7:3:15\">"
        );
    }

    #[test]
    fn test_method_def_renders_declaration_part_id() {
        let marker = Marker::BeginMethodDef {
            section_id: "s1:7:3:40".to_string(),
            activity_id: 2,
            part_index: 1,
            length: 5,
        };
        assert_eq!(
            marker.to_string(),
            "<span id=\"a2m-s1:7:3:40-1\" class=\"MethodDeclaration s1:7:3:40\">"
        );
    }

    #[test]
    fn test_end_renders_closing_tag() {
        assert_eq!(Marker::End { length: 4 }.to_string(), "</span>");
    }

    #[test]
    fn test_ends_sort_before_begins() {
        let mut markers = vec![begin(4), Marker::End { length: 9 }];
        markers.sort_by(Marker::ordering);

        assert!(!markers[0].is_begin());
        assert!(markers[1].is_begin());
    }

    #[test]
    fn test_begins_sort_outermost_first() {
        let mut markers = vec![begin(4), begin(10), begin(7)];
        markers.sort_by(Marker::ordering);

        let lengths: Vec<_> = markers.iter().map(Marker::length).collect();
        assert_eq!(lengths, vec![10, 7, 4]);
    }

    #[test]
    fn test_ends_sort_innermost_first() {
        let mut markers = vec![Marker::End { length: 10 }, Marker::End { length: 4 }];
        markers.sort_by(Marker::ordering);

        let lengths: Vec<_> = markers.iter().map(Marker::length).collect();
        assert_eq!(lengths, vec![4, 10]);
    }

    #[test]
    fn test_equal_lengths_keep_insertion_order() {
        let first = Marker::Begin {
            section_id: "s1:1:1:6".to_string(),
            activity_id: 0,
            tags: vec!["ChannelRead".to_string()],
            length: 6,
        };
        let second = Marker::Begin {
            section_id: "s1:1:1:6".to_string(),
            activity_id: 0,
            tags: vec!["ChannelWrite".to_string()],
            length: 6,
        };
        let mut markers = vec![first.clone(), second.clone()];
        markers.sort_by(Marker::ordering);

        assert_eq!(markers, vec![first, second]);
    }
}
