//! Reader for the whitespace-separated chain description format.
//!
//! # Format
//!
//! ```text
//! 4            <- vertex count N
//! 1 1 0.95     <- from to probability
//! 1 2 0.04
//! 1 3 0.01
//! 2 2 0.9
//! ...
//! ```
//!
//! Tokens may be split across lines arbitrarily; only the order matters.
//! Transitions are appended to each vertex's edge list in file order.
//!
//! ## Validation
//!
//! - A `from` outside `1..=N` is skipped with a warning and counted in
//!   [`ReadOutcome::skipped`], whatever its `to`.
//! - Otherwise a `to` outside `1..=N` rejects the whole input: the analysis pipeline
//!   assumes every target is a valid vertex.
//! - Probabilities must be finite numbers. Range and row sums are checked
//!   later by [`crate::check`].

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::ErrorCode;
use crate::graph::{Graph, GraphError};

/// Errors raised while reading a chain description.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is empty: expected a vertex count")]
    MissingVertexCount,

    #[error("line {line}: invalid vertex count {token:?}")]
    InvalidVertexCount { line: usize, token: String },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: transition target {target} is outside 1..={vertex_count}")]
    InvalidTarget {
        line: usize,
        target: i64,
        vertex_count: usize,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ReadError {
    /// Machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::InputNotFound
            }
            Self::Io { .. } => ErrorCode::InternalUnexpected,
            Self::MissingVertexCount | Self::InvalidVertexCount { .. } | Self::Malformed { .. } => {
                ErrorCode::InputMalformed
            }
            Self::InvalidTarget { .. } => ErrorCode::VertexOutOfRange,
            Self::Graph(err) => err.error_code(),
        }
    }
}

/// A parsed graph plus bookkeeping about discarded input.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub graph: Graph,
    /// Transitions dropped because their source vertex was out of range.
    pub skipped: usize,
}

/// Read and parse the chain description at `path`.
///
/// # Errors
///
/// Returns [`ReadError::Io`] if the file cannot be read, or any parse error
/// from [`parse_graph`].
#[instrument]
pub fn read_graph(path: &Path) -> Result<ReadOutcome, ReadError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_graph(&content)
}

/// Parse a chain description from text.
///
/// # Errors
///
/// Fails on a missing or invalid vertex count, a trailing partial triple,
/// non-numeric tokens, non-finite probabilities, and out-of-range targets of
/// in-range sources.
pub fn parse_graph(input: &str) -> Result<ReadOutcome, ReadError> {
    let tokens: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| line.split_whitespace().map(move |tok| (idx + 1, tok)))
        .collect();

    let Some(&(count_line, count_token)) = tokens.first() else {
        return Err(ReadError::MissingVertexCount);
    };
    let vertex_count: usize = count_token
        .parse()
        .map_err(|_| ReadError::InvalidVertexCount {
            line: count_line,
            token: count_token.to_string(),
        })?;

    let mut graph = Graph::new(vertex_count);
    let mut skipped = 0;

    let triples = tokens[1..].chunks(3);
    for triple in triples {
        let &[(line, from), (_, to), (_, prob)] = triple else {
            let line = triple.first().map_or(count_line, |&(line, _)| line);
            return Err(ReadError::Malformed {
                line,
                reason: format!(
                    "incomplete transition: expected `from to probability`, got {} token(s)",
                    triple.len()
                ),
            });
        };

        let from = parse_int(line, from, "source vertex")?;
        let to = parse_int(line, to, "target vertex")?;
        let weight: f64 = prob.parse().map_err(|_| ReadError::Malformed {
            line,
            reason: format!("invalid probability {prob:?}"),
        })?;

        let Some(from) = vertex_in_range(from, vertex_count) else {
            warn!(line, from, vertex_count, "source vertex out of range, transition skipped");
            skipped += 1;
            continue;
        };
        let Some(to) = vertex_in_range(to, vertex_count) else {
            return Err(ReadError::InvalidTarget {
                line,
                target: to,
                vertex_count,
            });
        };

        graph.add_edge(from, to, weight)?;
    }

    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        skipped,
        "chain description parsed"
    );

    Ok(ReadOutcome { graph, skipped })
}

fn parse_int(line: usize, token: &str, what: &str) -> Result<i64, ReadError> {
    token.parse().map_err(|_| ReadError::Malformed {
        line,
        reason: format!("invalid {what} {token:?}"),
    })
}

fn vertex_in_range(raw: i64, vertex_count: usize) -> Option<usize> {
    usize::try_from(raw)
        .ok()
        .filter(|v| (1..=vertex_count).contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_count_and_triples() {
        let outcome = parse_graph("3\n1 2 1.0\n2 3 0.5\n2 2 0.5\n3 3 1\n").expect("parse");
        let g = &outcome.graph;

        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(outcome.skipped, 0);
        let targets: Vec<usize> = g.edges(2).iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![3, 2], "file order preserved");
    }

    #[test]
    fn tokens_may_span_lines() {
        let outcome = parse_graph("2 1 2\n1.0 2\n2 1.0").expect("parse");
        assert_eq!(outcome.graph.edge_count(), 2);
    }

    #[test]
    fn vertex_count_only_is_edgeless_graph() {
        let outcome = parse_graph("4\n").expect("parse");
        assert_eq!(outcome.graph.vertex_count(), 4);
        assert_eq!(outcome.graph.edge_count(), 0);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_graph("  \n\n"),
            Err(ReadError::MissingVertexCount)
        ));
    }

    #[test]
    fn bad_vertex_count_is_rejected() {
        let err = parse_graph("three\n1 1 1.0").expect_err("not a number");
        assert!(matches!(err, ReadError::InvalidVertexCount { line: 1, .. }));
        assert_eq!(err.error_code(), ErrorCode::InputMalformed);
    }

    #[test]
    fn out_of_range_source_is_skipped() {
        let outcome = parse_graph("2\n1 2 1.0\n5 1 1.0\n0 1 1.0\n2 2 1.0").expect("parse");
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.graph.edge_count(), 2);
    }

    #[test]
    fn skipped_source_hides_its_target() {
        let outcome = parse_graph("2\n1 2 1.0\n9 9 1.0\n2 2 1.0\n").expect("parse");
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.graph.edge_count(), 2);
    }

    #[test]
    fn out_of_range_target_is_rejected() {
        let err = parse_graph("2\n1 2 0.5\n1 3 0.5").expect_err("target 3 invalid");
        match err {
            ReadError::InvalidTarget {
                line,
                target,
                vertex_count,
            } => {
                assert_eq!(line, 3);
                assert_eq!(target, 3);
                assert_eq!(vertex_count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_triple_is_rejected() {
        let err = parse_graph("2\n1 2 1.0\n2 1").expect_err("partial triple");
        assert!(matches!(err, ReadError::Malformed { line: 3, .. }));
    }

    #[test]
    fn non_numeric_probability_is_rejected() {
        let err = parse_graph("1\n1 1 abc").expect_err("bad probability");
        assert!(err.to_string().contains("invalid probability"));
    }

    #[test]
    fn infinite_probability_is_rejected() {
        let err = parse_graph("1\n1 1 inf").expect_err("non-finite probability");
        assert_eq!(err.error_code(), ErrorCode::InvalidWeight);
    }

    #[test]
    fn missing_file_maps_to_not_found_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_graph(&dir.path().join("missing.txt")).expect_err("no file");
        assert_eq!(err.error_code(), ErrorCode::InputNotFound);
    }

    #[test]
    fn read_graph_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chain.txt");
        std::fs::write(&path, "2\n1 2 1.0\n2 1 1.0\n").expect("write");

        let outcome = read_graph(&path).expect("read");
        assert_eq!(outcome.graph.vertex_count(), 2);
        assert_eq!(outcome.graph.edge_count(), 2);
    }
}
