//! Weighted directed graph of a Markov chain.
//!
//! # Overview
//!
//! Vertices are numbered `1..=N`. Each vertex owns an ordered sequence of
//! outgoing [`Edge`]s `(target, weight)`. Edge order is insertion order; the
//! reader inserts transitions in file order, so iteration order (and with it
//! the class discovery order of the SCC decomposer) is reproducible from the
//! input text alone.
//!
//! Targets are validated on insertion, so every [`Graph`] handed to the
//! analysis pipeline satisfies the target-range invariant. Weights are only
//! required to be finite; whether rows are stochastic is reported by
//! [`crate::check`], never enforced here.

#![allow(clippy::module_name_repetitions)]

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::error::ErrorCode;

/// 1-based vertex identifier.
pub type VertexId = usize;

/// One outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    /// Destination vertex (1-based).
    pub target: VertexId,
    /// Transition probability as given by the input.
    pub weight: f64,
}

/// Errors raised while building a [`Graph`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// An endpoint lies outside `1..=vertex_count`.
    #[error("vertex {vertex} is outside 1..={vertex_count}")]
    VertexOutOfRange {
        vertex: VertexId,
        vertex_count: usize,
    },
    /// A weight is NaN or infinite.
    #[error("transition {from} -> {to} has non-finite weight {weight}")]
    NonFiniteWeight {
        from: VertexId,
        to: VertexId,
        weight: f64,
    },
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::VertexOutOfRange { .. } => ErrorCode::VertexOutOfRange,
            Self::NonFiniteWeight { .. } => ErrorCode::InvalidWeight,
        }
    }
}

/// A finite chain as an adjacency list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    /// Create a graph with `vertex_count` vertices and no edges.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
        }
    }

    /// Build a graph from `(from, to, weight)` triples, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphError`] raised by [`Graph::add_edge`].
    pub fn from_edges(
        vertex_count: usize,
        edges: &[(VertexId, VertexId, f64)],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(vertex_count);
        for &(from, to, weight) in edges {
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    /// Append the transition `from -> to` to `from`'s edge list.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint is outside `1..=N` or the weight is not finite.
    pub fn add_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        weight: f64,
    ) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        if !weight.is_finite() {
            return Err(GraphError::NonFiniteWeight { from, to, weight });
        }
        self.adjacency[from - 1].push(Edge { target: to, weight });
        Ok(())
    }

    fn check_vertex(&self, vertex: VertexId) -> Result<(), GraphError> {
        if self.contains(vertex) {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex,
                vertex_count: self.vertex_count(),
            })
        }
    }

    /// Number of vertices `N`.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of stored transitions.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Return `true` if the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Return `true` if `vertex` is a valid id of this graph.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        (1..=self.vertex_count()).contains(&vertex)
    }

    /// Iterate over vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        1..=self.vertex_count()
    }

    /// Outgoing edges of `vertex`, in insertion order.
    ///
    /// Returns an empty slice for ids outside `1..=N`.
    #[must_use]
    pub fn edges(&self, vertex: VertexId) -> &[Edge] {
        vertex
            .checked_sub(1)
            .and_then(|idx| self.adjacency.get(idx))
            .map_or(&[], Vec::as_slice)
    }

    /// Sum of the outgoing weights of `vertex`.
    #[must_use]
    pub fn out_weight(&self, vertex: VertexId) -> f64 {
        self.edges(vertex).iter().map(|e| e.weight).sum()
    }

    /// Iterate over every transition as `(from, edge)`.
    pub fn transitions(&self) -> impl Iterator<Item = (VertexId, &Edge)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(idx, edges)| edges.iter().map(move |edge| (idx + 1, edge)))
    }

    /// Convert to a petgraph [`DiGraph`].
    ///
    /// Node `i - 1` carries vertex id `i`; edge weights are the transition
    /// probabilities.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<VertexId, f64> {
        let mut graph = DiGraph::with_capacity(self.vertex_count(), self.edge_count());
        let nodes: Vec<NodeIndex> = self.vertices().map(|v| graph.add_node(v)).collect();
        for (from, edge) in self.transitions() {
            graph.add_edge(nodes[from - 1], nodes[edge.target - 1], edge.weight);
        }
        graph
    }
}
