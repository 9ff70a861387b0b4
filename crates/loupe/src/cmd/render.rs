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

//! Render command - annotate the sources of a highlight dump.
//!
//! A highlight dump is the JSON file the traced runtime writes when asked to
//! record which source sections carry which tags: a `sources` object keyed
//! by opaque source ids and a `sections` object locating each tagged run by
//! character index. Rendering converts those runs to line/column
//! coordinates, lays them over each source and prints the resulting markup.

use std::{collections::HashMap, fs, path::PathBuf};

use clap::Parser;
use eyre::{eyre, Result};
use loupe_common::{
    init_logging,
    types::{SourceCoordinate, TaggedSourceCoordinate},
};
use loupe_view::{annotate::annotate, matrix::CharacterMatrix, view::line_anchor_gutter};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Render mode arguments
#[derive(Debug, Parser)]
pub struct RenderArgs {
    /// Path to a highlight dump (JSON with `sources` and `sections`)
    pub dump: PathBuf,

    /// Activity id the marker element ids are scoped to
    #[arg(long, default_value = "0")]
    pub activity_id: u64,
}

#[derive(Debug, Deserialize)]
struct HighlightDump {
    sources: HashMap<String, DumpSource>,
    sections: HashMap<String, DumpSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DumpSource {
    source_text: String,
    name: String,
    short_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DumpSection {
    first_index: usize,
    length: usize,
    source_id: String,
    // Untagged sections are dumped without the field.
    #[serde(default)]
    tags: Vec<String>,
}

/// Annotates every source of the dump and prints gutter plus markup.
pub fn run_render(args: RenderArgs) -> Result<()> {
    init_logging("loupe", true)?;

    let text = fs::read_to_string(&args.dump)
        .map_err(|e| eyre!("Failed to read dump {}: {}", args.dump.display(), e))?;
    let dump: HighlightDump = serde_json::from_str(&text)
        .map_err(|e| eyre!("Failed to parse dump {}: {}", args.dump.display(), e))?;

    info!(sources = dump.sources.len(), sections = dump.sections.len(), "highlight dump loaded");

    // Dump ids are unordered hash keys; hand out display ids in sorted
    // order so repeated runs print identically.
    let mut dump_ids: Vec<&str> = dump.sources.keys().map(String::as_str).collect();
    dump_ids.sort_unstable();
    let display_ids: HashMap<&str, String> =
        dump_ids.iter().enumerate().map(|(i, &id)| (id, format!("s{}", i + 1))).collect();

    let mut sections_by_source: HashMap<&str, Vec<TaggedSourceCoordinate>> = HashMap::new();
    let mut section_ids: Vec<&str> = dump.sections.keys().map(String::as_str).collect();
    section_ids.sort_unstable();
    for section_id in section_ids {
        let section = &dump.sections[section_id];
        if section.tags.is_empty() {
            continue;
        }
        let Some(source) = dump.sources.get(&section.source_id) else {
            warn!(section_id, source_id = %section.source_id, "section refers to a missing source");
            continue;
        };
        let (start_line, start_column) = coordinate_at(&source.source_text, section.first_index);
        sections_by_source.entry(section.source_id.as_str()).or_default().push(
            TaggedSourceCoordinate {
                coord: SourceCoordinate::new(start_line, start_column, section.length),
                tags: section.tags.clone(),
            },
        );
    }

    for dump_id in dump_ids {
        let source = &dump.sources[dump_id];
        let display_id = &display_ids[dump_id];
        let sections = sections_by_source.remove(dump_id).unwrap_or_default();
        debug!(name = %source.short_name, id = %display_id, sections = sections.len(), "annotating source");

        let mut matrix = CharacterMatrix::build(&source.source_text);
        annotate(&mut matrix, display_id, args.activity_id, &sections, &[]);

        println!("=== {display_id} {} ({})", source.short_name, source.name);
        println!("{}", line_anchor_gutter(matrix.line_count(), display_id));
        println!("{}", matrix.serialize());
    }

    Ok(())
}

/// 1-based (line, column) of the character at a 0-based character index.
fn coordinate_at(text: &str, char_index: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars().take(char_index) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_at_walks_lines() {
        let text = "a\nbb\nccc";

        assert_eq!(coordinate_at(text, 0), (1, 1));
        assert_eq!(coordinate_at(text, 1), (1, 2));
        assert_eq!(coordinate_at(text, 2), (2, 1));
        assert_eq!(coordinate_at(text, 3), (2, 2));
        assert_eq!(coordinate_at(text, 5), (3, 1));
        assert_eq!(coordinate_at(text, 7), (3, 3));
    }

    #[test]
    fn test_coordinate_at_end_of_text() {
        assert_eq!(coordinate_at("a\nbb\n", 5), (3, 1));
    }

    #[test]
    fn test_dump_sections_tags_default_to_empty() {
        let json = r#"{
            "sources": {
                "s-0": {
                    "id": "s-0",
                    "sourceText": "a\nbb\n",
                    "mimeType": "application/x-newspeak-som-ns",
                    "name": "/core-lib/Hello.ns",
                    "shortName": "Hello.ns"
                }
            },
            "sections": {
                "ss-0": {
                    "id": "ss-0",
                    "firstIndex": 2,
                    "length": 2,
                    "identifier": "Hello>>run",
                    "description": "method Hello>>run",
                    "sourceId": "s-0",
                    "tags": ["MethodDeclaration"]
                },
                "ss-1": {
                    "id": "ss-1",
                    "firstIndex": 0,
                    "length": 1,
                    "sourceId": "s-0"
                }
            }
        }"#;

        let dump: HighlightDump = serde_json::from_str(json).unwrap();
        assert_eq!(dump.sources["s-0"].short_name, "Hello.ns");
        assert_eq!(dump.sections["ss-0"].tags, vec!["MethodDeclaration"]);
        assert_eq!(dump.sections["ss-0"].first_index, 2);
        assert!(dump.sections["ss-1"].tags.is_empty());
    }
}
