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

//! Graph command - decode a trace file and print the activity graph.

use std::{fs, path::PathBuf};

use clap::Parser;
use eyre::{eyre, Result};
use loupe_common::{decode_buffer, init_logging, types::SymbolMapping};
use loupe_view::{graph::ActivityGraph, ids};
use tracing::info;

/// Graph mode arguments
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Path to a binary trace buffer
    pub trace: PathBuf,

    /// Optional symbol mapping, JSON of the form {"ids": [...], "symbols": [...]}
    #[arg(long)]
    pub symbols: Option<PathBuf>,
}

/// Decodes the trace file and prints nodes and links.
pub fn run_graph(args: GraphArgs) -> Result<()> {
    init_logging("loupe", true)?;

    let mut graph = ActivityGraph::new();
    if let Some(path) = &args.symbols {
        let text = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read symbol mapping {}: {}", path.display(), e))?;
        let mapping: SymbolMapping = serde_json::from_str(&text)
            .map_err(|e| eyre!("Failed to parse symbol mapping {}: {}", path.display(), e))?;
        graph.register_symbols(&mapping);
    }

    let bytes = fs::read(&args.trace)
        .map_err(|e| eyre!("Failed to read trace {}: {}", args.trace.display(), e))?;
    let events = decode_buffer(&bytes)?;
    let new_activities = graph.apply_buffer(&events);
    info!(events = events.len(), activities = new_activities.len(), "trace buffer decoded");

    println!("activities:");
    for node in graph.nodes() {
        println!(
            "  {} {} [{}] {}",
            node.flat_id(),
            node.activity.name,
            node.activity.activity_type,
            if node.running { "running" } else { "completed" }
        );
    }

    println!("links:");
    for link in graph.links() {
        let kind = if link.creation {
            "creation".to_string()
        } else {
            format!("messages={}", link.message_count)
        };
        println!(
            "  {} -> {} {kind}",
            ids::activity_flat_id(link.source),
            ids::activity_flat_id(link.target)
        );
    }

    Ok(())
}
