//! `strata show`: print the adjacency list of a chain.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_core::label::vertex_label;
use strata_core::{Edge, Graph, VertexId};

use super::load_input;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `strata show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Chain description: vertex count, then `from to probability` triples.
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    vertex_count: usize,
    edge_count: usize,
    skipped: usize,
    vertices: Vec<VertexRow>,
}

#[derive(Debug, Serialize)]
struct VertexRow {
    vertex: VertexId,
    label: String,
    out_weight: f64,
    edges: Vec<Edge>,
}

impl ShowOutput {
    fn new(graph: &Graph, skipped: usize) -> Self {
        let vertices = graph
            .vertices()
            .map(|v| VertexRow {
                vertex: v,
                label: vertex_label(v),
                out_weight: graph.out_weight(v),
                edges: graph.edges(v).to_vec(),
            })
            .collect();
        Self {
            vertex_count: graph.vertex_count(),
            edge_count: graph.edge_count(),
            skipped,
            vertices,
        }
    }
}

/// Execute `strata show`.
pub fn run_show(args: &ShowArgs, output: OutputMode) -> anyhow::Result<()> {
    let outcome = load_input(&args.input, output)?;
    let payload = ShowOutput::new(&outcome.graph, outcome.skipped);
    render_mode(output, &payload, render_show_text, render_show_pretty)
}

/// One `from to probability` line per transition, in input format.
fn render_show_text(payload: &ShowOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", payload.vertex_count)?;
    for row in &payload.vertices {
        for edge in &row.edges {
            writeln!(w, "{} {} {}", row.vertex, edge.target, edge.weight)?;
        }
    }
    Ok(())
}

fn render_show_pretty(payload: &ShowOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Adjacency list")?;
    pretty_kv(w, "Vertices", payload.vertex_count.to_string())?;
    pretty_kv(w, "Transitions", payload.edge_count.to_string())?;
    if payload.skipped > 0 {
        pretty_kv(w, "Skipped", payload.skipped.to_string())?;
    }
    writeln!(w)?;

    for row in &payload.vertices {
        write!(w, "Vertex {} ({}) :", row.vertex, row.label)?;
        if row.edges.is_empty() {
            write!(w, " (no transitions)")?;
        } else {
            write!(w, " ->")?;
            for edge in &row.edges {
                write!(w, " ({}, {:.2})", edge.target, edge.weight)?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}
