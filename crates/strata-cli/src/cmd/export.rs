//! `strata export`: write the transition graph as a Mermaid flowchart.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_analysis::{graph_to_mermaid, write_mermaid};

use super::load_input;
use crate::output::{CliError, OutputMode, render, render_error};

/// Arguments for `strata export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Chain description: vertex count, then `from to probability` triples.
    pub input: PathBuf,

    /// Destination of the Mermaid diagram.
    #[arg(short, long, value_name = "PATH", default_value = "graph.mmd")]
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    path: PathBuf,
    vertices: usize,
    transitions: usize,
}

/// Execute `strata export`.
pub fn run_export(args: &ExportArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = load_input(&args.input, output)?.graph;

    if let Err(err) = write_mermaid(&args.output, &graph_to_mermaid(&graph)) {
        render_error(output, &CliError::with_code(err.to_string(), err.error_code()))?;
        return Err(err.into());
    }

    let payload = ExportOutput {
        path: args.output.clone(),
        vertices: graph.vertex_count(),
        transitions: graph.edge_count(),
    };
    render(output, &payload, render_export_human)
}

fn render_export_human(payload: &ExportOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "Mermaid diagram written to {} ({} vertices, {} transitions)",
        payload.path.display(),
        payload.vertices,
        payload.transitions
    )
}
