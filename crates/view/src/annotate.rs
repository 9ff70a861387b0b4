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

//! Overlay attaching section markers to a freshly built character matrix.
//!
//! This is the construction phase of a display: every tagged section and
//! every method definition part gets one Begin marker on the cell its run
//! starts on and one End marker on the cell right after its last character.
//! Once all markers are placed, each cell's list is put into emission order,
//! after which the matrix is only read.

use loupe_common::types::{Method, TaggedSourceCoordinate};
use tracing::debug;

use crate::ids;
use crate::markers::Marker;
use crate::matrix::CharacterMatrix;

/// Attaches the markers for `sections` and `methods` to `matrix`.
///
/// Start and end cells are promoted to annotations on first use; overlapping
/// runs stack their markers on the shared cells. Regions sharing a cell are
/// emitted ends-first, longest begin first, so serialized spans always nest.
///
/// # Panics
/// Panics when a coordinate lies outside the matrix, per the mapper's
/// contract. Such coordinates come from a misbehaving runtime and the
/// display they belong to cannot be rendered.
pub fn annotate(
    matrix: &mut CharacterMatrix,
    source_id: &str,
    activity_id: u64,
    sections: &[TaggedSourceCoordinate],
    methods: &[Method],
) {
    for section in sections {
        let coord = &section.coord;
        let (end_line, end_column) =
            matrix.end_of(coord.start_line, coord.start_column, coord.char_length);
        let section_id = ids::section_id(source_id, coord);
        debug!(
            section = %section_id,
            end = ?(end_line, end_column),
            tags = ?section.tags,
            "placing section markers"
        );

        let start = matrix.cell_mut(coord.start_line - 1, coord.start_column - 1);
        start.ensure_annotation().before.push(Marker::Begin {
            section_id,
            activity_id,
            tags: section.tags.clone(),
            length: coord.char_length,
        });

        let end = matrix.cell_mut(end_line - 1, end_column - 1);
        end.ensure_annotation().before.push(Marker::End { length: coord.char_length });
    }

    for method in methods {
        let section_id = ids::section_id(source_id, &method.source_section);
        for (part_index, part) in method.definition.iter().enumerate() {
            let (end_line, end_column) =
                matrix.end_of(part.start_line, part.start_column, part.char_length);
            debug!(
                method = %method.name,
                declaration = %section_id,
                part_index,
                "placing method declaration markers"
            );

            let start = matrix.cell_mut(part.start_line - 1, part.start_column - 1);
            start.ensure_annotation().before.push(Marker::BeginMethodDef {
                section_id: section_id.clone(),
                activity_id,
                part_index,
                length: part.char_length,
            });

            let end = matrix.cell_mut(end_line - 1, end_column - 1);
            end.ensure_annotation().before.push(Marker::End { length: part.char_length });
        }
    }

    matrix.sort_all_markers();
}

#[cfg(test)]
mod tests {
    use loupe_common::types::SourceCoordinate;

    use super::*;
    use crate::matrix::Cell;

    fn tagged(start_line: usize, start_column: usize, char_length: usize) -> TaggedSourceCoordinate {
        TaggedSourceCoordinate {
            coord: SourceCoordinate::new(start_line, start_column, char_length),
            tags: vec!["EventualMessageSend".to_string()],
        }
    }

    fn annotated(matrix: &CharacterMatrix, line: usize, column: usize) -> &crate::matrix::Annotation {
        match &matrix.rows()[line][column] {
            Cell::Annotated(annotation) => annotation,
            Cell::Literal(_) => panic!("cell {line}:{column} was not annotated"),
        }
    }

    #[test]
    fn test_section_spanning_a_line_break() {
        // Spans "a\nb": Begin before the 'a', End before the second 'b'.
        let mut matrix = CharacterMatrix::build("a\nbb\n");
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 3)], &[]);

        let start = annotated(&matrix, 0, 0);
        assert_eq!(start.text, Some('a'));
        assert!(matches!(&start.before[0], Marker::Begin { length: 3, .. }));

        let end = annotated(&matrix, 1, 1);
        assert_eq!(end.text, Some('b'));
        assert!(matches!(&end.before[0], Marker::End { length: 3 }));
    }

    #[test]
    fn test_unmarked_cells_stay_literal() {
        let mut matrix = CharacterMatrix::build("a\nbb\n");
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 3)], &[]);

        assert_eq!(matrix.rows()[1][0], Cell::Literal(Some('b')));
        assert_eq!(matrix.rows()[0][1], Cell::Literal(Some('\n')));
    }

    #[test]
    fn test_serialized_text_survives_annotation() {
        let text = "run = (\n  'hi' println\n)\n";
        let mut matrix = CharacterMatrix::build(text);
        annotate(&mut matrix, "s1", 0, &[tagged(2, 3, 12)], &[]);

        let markup = matrix.serialize();
        let stripped: String = {
            let mut out = String::new();
            let mut in_tag = false;
            for ch in markup.chars() {
                match ch {
                    '<' => in_tag = true,
                    '>' => in_tag = false,
                    c if !in_tag => out.push(c),
                    _ => {}
                }
            }
            out
        };
        assert_eq!(stripped, text);
    }

    #[test]
    fn test_shared_start_cell_opens_outer_region_first() {
        let mut matrix = CharacterMatrix::build("abcdefghijkl\n");
        // Outer of length 10 and inner of length 4, both starting on 'a'.
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 4), tagged(1, 1, 10)], &[]);

        let start = annotated(&matrix, 0, 0);
        assert_eq!(start.before.len(), 2);
        assert_eq!(start.before[0].length(), 10);
        assert_eq!(start.before[1].length(), 4);
    }

    #[test]
    fn test_shared_end_cell_closes_inner_region_first() {
        let mut matrix = CharacterMatrix::build("abcdefghijkl\n");
        // Both end on the cell after 'j': outer 1..=10, inner 7..=10.
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 10), tagged(1, 7, 4)], &[]);

        let end = annotated(&matrix, 0, 10);
        assert_eq!(end.before.len(), 2);
        assert_eq!(end.before[0].length(), 4);
        assert_eq!(end.before[1].length(), 10);
    }

    #[test]
    fn test_adjacent_regions_close_before_opening() {
        let mut matrix = CharacterMatrix::build("abcdef\n");
        // First region ends exactly where the second begins.
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 3), tagged(1, 4, 3)], &[]);

        let boundary = annotated(&matrix, 0, 3);
        assert!(!boundary.before[0].is_begin());
        assert!(boundary.before[1].is_begin());

        let markup = matrix.serialize();
        let close = markup.find("</span>").unwrap();
        let second_open = markup.match_indices("<span").nth(1).unwrap().0;
        assert!(close < second_open, "first region must close before the second opens: {markup}");
    }

    #[test]
    fn test_zero_length_section_brackets_one_cell() {
        let mut matrix = CharacterMatrix::build("ab\n");
        annotate(&mut matrix, "s1", 0, &[tagged(1, 2, 0)], &[]);

        let cell = annotated(&matrix, 0, 1);
        assert_eq!(cell.before.len(), 2);
        assert!(!cell.before[0].is_begin());
        assert!(cell.before[1].is_begin());
    }

    #[test]
    fn test_section_ending_at_end_of_text_lands_on_synthetic_row() {
        let mut matrix = CharacterMatrix::build("ab");
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 2)], &[]);

        let end = annotated(&matrix, 1, 0);
        assert_eq!(end.text, None);
        assert!(matches!(&end.before[0], Marker::End { length: 2 }));
        // The landing cell contributes no character, only the closing tag.
        assert!(matrix.serialize().ends_with("ab</span>"));
    }

    #[test]
    fn test_method_parts_get_indexed_marker_pairs() {
        let text = "run: arg = (\n  arg println\n)\n";
        let mut matrix = CharacterMatrix::build(text);
        let method = Method {
            name: "run:".to_string(),
            definition: vec![SourceCoordinate::new(1, 1, 4), SourceCoordinate::new(1, 6, 3)],
            source_section: SourceCoordinate::new(1, 1, 29),
        };
        annotate(&mut matrix, "s1", 2, &[], &[method]);

        let first = annotated(&matrix, 0, 0);
        assert!(matches!(
            &first.before[0],
            Marker::BeginMethodDef { part_index: 0, length: 4, .. }
        ));

        let second = annotated(&matrix, 0, 5);
        assert!(matches!(
            &second.before[0],
            Marker::BeginMethodDef { part_index: 1, length: 3, .. }
        ));

        // Both parts carry the declaration's section id, not their own.
        for marker in [&first.before[0], &second.before[0]] {
            if let Marker::BeginMethodDef { section_id, .. } = marker {
                assert_eq!(section_id, "s1:1:1:29");
            }
        }
    }

    #[test]
    fn test_method_part_end_closes_with_part_length() {
        let text = "run: arg = ()\n";
        let mut matrix = CharacterMatrix::build(text);
        let method = Method {
            name: "run:".to_string(),
            definition: vec![SourceCoordinate::new(1, 1, 4)],
            source_section: SourceCoordinate::new(1, 1, 13),
        };
        annotate(&mut matrix, "s1", 0, &[], &[method]);

        let end = annotated(&matrix, 0, 4);
        assert!(matches!(&end.before[0], Marker::End { length: 4 }));
    }

    #[test]
    fn test_section_and_method_markers_share_cells() {
        let text = "run = ()\n";
        let mut matrix = CharacterMatrix::build(text);
        let method = Method {
            name: "run".to_string(),
            definition: vec![SourceCoordinate::new(1, 1, 3)],
            source_section: SourceCoordinate::new(1, 1, 8),
        };
        // A tagged section coinciding with the method's first definition part.
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 3)], &[method]);

        let start = annotated(&matrix, 0, 0);
        assert_eq!(start.before.len(), 2);
        // Equal lengths keep insertion order: the section came first.
        assert!(matches!(&start.before[0], Marker::Begin { .. }));
        assert!(matches!(&start.before[1], Marker::BeginMethodDef { .. }));
    }

    #[test]
    #[should_panic(expected = "walks past end of text")]
    fn test_section_running_past_the_text_is_fatal() {
        let mut matrix = CharacterMatrix::build("ab\n");
        annotate(&mut matrix, "s1", 0, &[tagged(1, 1, 99)], &[]);
    }
}
