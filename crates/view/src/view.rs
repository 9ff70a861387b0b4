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

//! Per-activity display state.
//!
//! The view keeps one pane per activity and, inside each pane, one rendered
//! entry per displayed source. Displaying a source builds its matrix, lays
//! the markers over it and serializes the result once; asking again for the
//! same (activity, source) pair is a recognized no-op unless the source
//! name changed, in which case the stale entry is replaced.

use std::collections::HashMap;

use loupe_common::types::{Activity, Source};
use serde::Serialize;
use tracing::{debug, info};

use crate::annotate::annotate;
use crate::ids;
use crate::matrix::CharacterMatrix;

/// One source rendered into an activity's pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedSource {
    /// Display name the entry was rendered under.
    pub name: String,
    /// The annotated markup, ready for the rendering surface.
    pub markup: String,
    /// The line-anchor gutter next to the markup.
    pub line_anchors: String,
    /// Number of real source lines.
    pub line_count: usize,
}

/// The pane of one activity: its descriptor and its displayed sources.
#[derive(Debug, Clone)]
pub struct ActivityPane {
    /// The activity the pane belongs to.
    pub activity: Activity,
    /// Displayed sources, keyed by source id.
    sources: HashMap<String, DisplayedSource>,
}

impl ActivityPane {
    /// Element id of the pane, e.g. `a2`.
    pub fn pane_id(&self) -> String {
        ids::activity_flat_id(self.activity.id)
    }

    /// The rendered entry for a source, if it is displayed.
    pub fn source(&self, source_id: &str) -> Option<&DisplayedSource> {
        self.sources.get(source_id)
    }
}

/// Display state over all activities.
#[derive(Debug, Clone, Default)]
pub struct View {
    panes: Vec<ActivityPane>,
}

impl View {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pane for an activity. Registering the same activity id
    /// again is a no-op.
    pub fn display_activity(&mut self, activity: &Activity) {
        if self.pane(activity.id).is_some() {
            return;
        }
        info!(id = activity.id, name = %activity.name, kind = %activity.activity_type, "new activity pane");
        self.panes
            .push(ActivityPane { activity: activity.clone(), sources: HashMap::new() });
    }

    /// Registers panes for a batch of activities.
    pub fn add_activities(&mut self, activities: &[Activity]) {
        for activity in activities {
            self.display_activity(activity);
        }
    }

    /// Builds and stores the annotated rendering of `source` in the
    /// activity's pane.
    ///
    /// Returns `false` without rebuilding when the pane already shows this
    /// source id under the same name. A pane showing the id under a
    /// different name holds a stale entry; it is dropped and rebuilt.
    ///
    /// # Panics
    /// Panics when no pane exists for `activity_id`; sources are only ever
    /// delivered for announced activities.
    pub fn display_source(&mut self, activity_id: u64, source: &Source, source_id: &str) -> bool {
        let pane = self
            .pane_mut(activity_id)
            .unwrap_or_else(|| panic!("no pane for activity {activity_id}"));

        if let Some(existing) = pane.sources.get(source_id) {
            if existing.name == source.name {
                debug!(source_id, activity_id, "source already displayed, skipping rebuild");
                return false;
            }
            info!(
                source_id,
                old = %existing.name,
                new = %source.name,
                "source id reused under a new name, replacing stale entry"
            );
            pane.sources.remove(source_id);
        }

        let mut matrix = CharacterMatrix::build(&source.source_text);
        annotate(&mut matrix, source_id, activity_id, &source.sections, &source.methods);

        let entry = DisplayedSource {
            name: source.name.clone(),
            markup: matrix.serialize(),
            line_anchors: line_anchor_gutter(matrix.line_count(), source_id),
            line_count: matrix.line_count(),
        };
        debug!(source_id, activity_id, lines = entry.line_count, "source rendered");
        pane.sources.insert(source_id.to_string(), entry);
        true
    }

    /// The pane of an activity, if registered.
    pub fn pane(&self, activity_id: u64) -> Option<&ActivityPane> {
        self.panes.iter().find(|pane| pane.activity.id == activity_id)
    }

    /// Panes in registration order.
    pub fn panes(&self) -> &[ActivityPane] {
        &self.panes
    }

    /// The rendered entry for an (activity, source) pair, if displayed.
    pub fn displayed_source(&self, activity_id: u64, source_id: &str) -> Option<&DisplayedSource> {
        self.pane(activity_id).and_then(|pane| pane.source(source_id))
    }

    fn pane_mut(&mut self, activity_id: u64) -> Option<&mut ActivityPane> {
        self.panes.iter_mut().find(|pane| pane.activity.id == activity_id)
    }
}

/// Renders the gutter of line anchors next to a source: one span per real
/// line, carrying the line's anchor id as a class so breakpoint toggles can
/// be wired to it.
pub fn line_anchor_gutter(line_count: usize, source_id: &str) -> String {
    let mut anchors = Vec::with_capacity(line_count);
    for line in 1..=line_count {
        anchors
            .push(format!("<span class=\"ln {}\">{line}</span>", ids::line_flat_id(line, source_id)));
    }
    anchors.join("\n")
}

#[cfg(test)]
mod tests {
    use loupe_common::types::{ActivityType, SourceCoordinate, TaggedSourceCoordinate};

    use super::*;

    fn actor(id: u64) -> Activity {
        Activity::new(id, "PingPong", ActivityType::Actor)
    }

    fn hello_source() -> Source {
        Source {
            uri: "file:/core-lib/Hello.ns".to_string(),
            name: "Hello.ns".to_string(),
            mime_type: "application/x-newspeak-som-ns".to_string(),
            source_text: "a\nbb\n".to_string(),
            sections: vec![TaggedSourceCoordinate {
                coord: SourceCoordinate::new(1, 1, 3),
                tags: vec!["EventualMessageSend".to_string()],
            }],
            methods: vec![],
        }
    }

    #[test]
    fn test_display_source_builds_markup_once() {
        let mut view = View::new();
        view.display_activity(&actor(0));

        assert!(view.display_source(0, &hello_source(), "s1"));

        let entry = view.displayed_source(0, "s1").unwrap();
        assert_eq!(entry.name, "Hello.ns");
        assert_eq!(entry.line_count, 2);
        assert!(entry.markup.contains("<span id=\"a0s1:1:1:3\""));
        assert!(entry.markup.contains("</span>"));
    }

    #[test]
    fn test_redisplaying_an_unchanged_source_is_a_no_op() {
        let mut view = View::new();
        view.display_activity(&actor(0));

        assert!(view.display_source(0, &hello_source(), "s1"));
        let markup = view.displayed_source(0, "s1").unwrap().markup.clone();

        assert!(!view.display_source(0, &hello_source(), "s1"));
        assert_eq!(view.displayed_source(0, "s1").unwrap().markup, markup);
    }

    #[test]
    fn test_reused_source_id_with_new_name_replaces_the_entry() {
        let mut view = View::new();
        view.display_activity(&actor(0));
        view.display_source(0, &hello_source(), "s1");

        let mut renamed = hello_source();
        renamed.name = "Hello2.ns".to_string();
        renamed.source_text = "cc\n".to_string();
        renamed.sections.clear();

        assert!(view.display_source(0, &renamed, "s1"));
        let entry = view.displayed_source(0, "s1").unwrap();
        assert_eq!(entry.name, "Hello2.ns");
        assert_eq!(entry.markup, "cc\n");
        assert_eq!(entry.line_count, 1);
    }

    #[test]
    fn test_same_source_renders_independently_per_activity() {
        let mut view = View::new();
        view.add_activities(&[actor(0), Activity::new(3, "Pong", ActivityType::Actor)]);

        view.display_source(0, &hello_source(), "s1");
        view.display_source(3, &hello_source(), "s1");

        let a0 = view.displayed_source(0, "s1").unwrap();
        let a3 = view.displayed_source(3, "s1").unwrap();
        assert!(a0.markup.contains("id=\"a0s1:1:1:3\""));
        assert!(a3.markup.contains("id=\"a3s1:1:1:3\""));
    }

    #[test]
    fn test_registering_an_activity_twice_keeps_one_pane() {
        let mut view = View::new();
        view.display_activity(&actor(7));
        view.display_activity(&actor(7));

        assert_eq!(view.panes().len(), 1);
        assert_eq!(view.pane(7).unwrap().pane_id(), "a7");
    }

    #[test]
    #[should_panic(expected = "no pane for activity")]
    fn test_display_source_requires_a_registered_activity() {
        View::new().display_source(9, &hello_source(), "s1");
    }

    #[test]
    fn test_line_anchor_gutter_marks_every_line() {
        let gutter = line_anchor_gutter(3, "s1");
        let anchors: Vec<&str> = gutter.split('\n').collect();

        assert_eq!(
            anchors,
            vec![
                "<span class=\"ln s1ln1\">1</span>",
                "<span class=\"ln s1ln2\">2</span>",
                "<span class=\"ln s1ln3\">3</span>",
            ]
        );
    }

    #[test]
    fn test_line_anchor_gutter_of_empty_source_is_empty() {
        assert_eq!(line_anchor_gutter(0, "s1"), "");
    }

    #[test]
    fn test_displayed_source_serializes_camel_case() {
        let mut view = View::new();
        view.display_activity(&actor(0));
        view.display_source(0, &hello_source(), "s1");

        let json = serde_json::to_value(view.displayed_source(0, "s1").unwrap()).unwrap();
        assert_eq!(json["name"], "Hello.ns");
        assert_eq!(json["lineCount"], 2);
        assert!(json["lineAnchors"].as_str().unwrap().contains("s1ln1"));
    }
}
