//! Row-sum check for transition graphs.
//!
//! A well-formed chain has, for every vertex, outgoing weights summing to 1.
//! The analysis never normalizes rows; this check only reports where the
//! input deviates so callers can decide whether to trust the results.

use serde::Serialize;
use tracing::{instrument, warn};

use crate::graph::{Graph, VertexId};

/// Default tolerance on `|row sum - 1|`.
pub const DEFAULT_ROW_TOLERANCE: f64 = 0.01;

/// A vertex whose outgoing weights do not sum to 1 within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    pub vertex: VertexId,
    pub sum: f64,
}

/// A single transition whose weight is outside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightIssue {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: f64,
}

/// Outcome of [`check_stochastic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticReport {
    pub tolerance: f64,
    pub row_issues: Vec<RowIssue>,
    pub weight_issues: Vec<WeightIssue>,
}

impl StochasticReport {
    /// Return `true` if every row sums to 1 and every weight is a probability.
    #[must_use]
    pub fn is_markov(&self) -> bool {
        self.row_issues.is_empty() && self.weight_issues.is_empty()
    }
}

/// Check that `graph` describes a row-stochastic chain.
///
/// Each problem is logged at `warn` level and collected in the report.
#[must_use]
#[instrument(skip(graph))]
pub fn check_stochastic(graph: &Graph, tolerance: f64) -> StochasticReport {
    let mut row_issues = Vec::new();
    let mut weight_issues = Vec::new();

    for vertex in graph.vertices() {
        for edge in graph.edges(vertex) {
            if !(0.0..=1.0).contains(&edge.weight) {
                warn!(
                    from = vertex,
                    to = edge.target,
                    weight = edge.weight,
                    "weight is not a probability"
                );
                weight_issues.push(WeightIssue {
                    from: vertex,
                    to: edge.target,
                    weight: edge.weight,
                });
            }
        }

        let sum = graph.out_weight(vertex);
        if (sum - 1.0).abs() > tolerance {
            warn!(vertex, sum, "outgoing weights do not sum to 1");
            row_issues.push(RowIssue { vertex, sum });
        }
    }

    StochasticReport {
        tolerance,
        row_issues,
        weight_issues,
    }
}
