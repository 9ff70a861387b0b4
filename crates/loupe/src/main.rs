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

//! Loupe - Concurrency Debugger Front End
//!
//! Command line access to the source annotation engine and the activity
//! graph, for inspecting debugger data without a running session.

use clap::{Parser, Subcommand};
use eyre::Result;

mod cmd;

/// Command-line interface for Loupe
#[derive(Debug, Parser)]
#[command(name = "loupe")]
#[command(about = "Loupe - a front end for debugging concurrent programs")]
#[command(version)]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (repeat for more: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate the sources of a highlight dump and print their markup
    Render(cmd::RenderArgs),
    /// Decode a binary trace file and print the activity graph
    Graph(cmd::GraphArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set RUST_LOG based on verbosity
    if std::env::var("RUST_LOG").is_err() {
        let level = match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    match cli.command {
        Commands::Render(args) => cmd::run_render(args),
        Commands::Graph(args) => cmd::run_graph(args),
    }
}
