//! Mermaid flowchart export.
//!
//! Two diagrams: the weighted transition graph (one circle per vertex, one
//! labelled arrow per transition) and the Hasse diagram of the class graph
//! (one box per class listing its members). Both carry the same front matter
//! so they render with the ELK layout.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use strata_core::{Graph, error::ErrorCode, label::vertex_label};
use tracing::{info, instrument};

use crate::quotient::LinkSet;
use crate::scc::Partition;

const FRONT_MATTER: &str = "---\nconfig:\n layout: elk\n theme: neo\n look: neo\n---\n";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Write { .. } => ErrorCode::ExportWriteFailed,
        }
    }
}

/// Render the transition graph.
///
/// Vertices appear in id order, edges in insertion order with weights
/// rounded to two decimals.
#[must_use]
pub fn graph_to_mermaid(graph: &Graph) -> String {
    let mut out = String::from(FRONT_MATTER);
    out.push_str("flowchart LR\n");
    for v in graph.vertices() {
        let _ = writeln!(out, "{}(({v}))", vertex_label(v));
    }
    for (from, edge) in graph.transitions() {
        let _ = writeln!(
            out,
            "{} -->|{:.2}|{}",
            vertex_label(from),
            edge.weight,
            vertex_label(edge.target)
        );
    }
    out
}

/// Render the class graph.
///
/// Pass the reduced [`LinkSet`] to get the Hasse diagram; any link set is
/// written as given.
#[must_use]
pub fn hasse_to_mermaid(partition: &Partition, links: &LinkSet) -> String {
    let mut out = String::from(FRONT_MATTER);
    out.push_str("flowchart LR\n");
    for (index, class) in partition.iter() {
        let members = class
            .members()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "C{index}[\"{}<br>{{{members}}}\"]", class.name());
    }
    for link in links {
        let _ = writeln!(out, "C{} --> C{}", link.from, link.to);
    }
    out
}

/// Write a rendered diagram to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ExportError::Write`] if the file cannot be written.
#[instrument(skip(contents))]
pub fn write_mermaid(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(bytes = contents.len(), "mermaid diagram written");
    Ok(())
}
