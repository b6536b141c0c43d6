//! End-to-end structural analysis of a chain.
//!
//! # Pipeline
//!
//! ```text
//! Graph
//!   ├─ check::check_stochastic ─────────────→ StochasticReport
//!   ├─ scc::decompose ──────────────────────→ Partition
//!   │     ↓ quotient::build_links
//!   │   LinkSet (class graph)
//!   │     ↓ quotient::reduce_transitive
//!   │   LinkSet (Hasse diagram) ─ classify ─→ Classification
//!   └─ Matrix::from_graph
//!         ├─ converge_powers ────────────────→ chain-level limit
//!         └─ sub_matrix per class
//!               ├─ period
//!               └─ stationary_distribution ─→ limiting mass
//! ```
//!
//! # Cross-check
//!
//! The persistent/transitive label comes from the class graph alone. The
//! limiting mass of each class comes from the matrix alone: a persistent
//! class keeps mass ≈ 1, a transitive class leaks it. Each [`ClassReport`]
//! records whether both agree; a disagreement usually means the input rows
//! are not stochastic. It is logged, never fatal.

use serde::Serialize;
use strata_core::{
    AnalysisConfig, Graph, VertexId, check::StochasticReport, check_stochastic,
    error::ErrorCode,
};
use tracing::{info, instrument, warn};

use crate::classify::{ClassKind, Classification, classify};
use crate::matrix::{
    Convergence, Matrix, MatrixError, Period, converge_powers, period, stationary_distribution,
    uniform,
};
use crate::quotient::{LinkSet, QuotientError, build_links, reduce_transitive};
use crate::scc::{ClassIndex, Partition, decompose};

/// Errors raised by [`ChainAnalysis::run`].
///
/// Both indicate a defect rather than bad input: the class graph of a valid
/// partition is acyclic, and class members always index the chain matrix.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Quotient(#[from] QuotientError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl AnalysisError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Quotient(err) => err.error_code(),
            Self::Matrix(err) => err.error_code(),
        }
    }
}

/// Everything known about one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub index: ClassIndex,
    pub name: String,
    pub members: Vec<VertexId>,
    pub kind: ClassKind,
    pub absorbing: bool,
    pub period: Period,
    /// Limiting distribution over `members` (same order), started from uniform.
    pub limiting: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Total mass of `limiting`.
    pub mass: f64,
    /// Whether `mass` agrees with `kind`.
    pub mass_agrees: bool,
}

/// Result of the full pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ChainAnalysis {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub stochastic: StochasticReport,
    pub partition: Partition,
    /// Class graph before transitive reduction.
    pub links: LinkSet,
    /// Hasse diagram: class graph after transitive reduction.
    pub hasse: LinkSet,
    pub classification: Classification,
    pub classes: Vec<ClassReport>,
    /// Powers of the full transition matrix.
    pub chain: Convergence<Matrix>,
}

impl ChainAnalysis {
    /// Run the whole pipeline on `graph`.
    ///
    /// Non-stochastic rows, non-convergence and undetermined periods are
    /// reported in the result, not as errors.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistencies (see [`AnalysisError`]).
    #[instrument(skip(graph, config), fields(vertices = graph.vertex_count()))]
    pub fn run(graph: &Graph, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let stochastic = check_stochastic(graph, config.check.row_tolerance);

        let partition = decompose(graph);
        let links = build_links(graph, &partition.vertex_to_class());
        let hasse = reduce_transitive(&links)?;
        let classification = classify(&partition, &hasse);

        let matrix = Matrix::from_graph(graph);
        let chain = converge_powers(&matrix, config.chain.epsilon, config.chain.max_iter);

        let mut classes = Vec::with_capacity(partition.len());
        for (index, class) in partition.iter() {
            let sub = matrix.sub_matrix(class.members())?;
            let class_period = period(&sub);
            let limit = stationary_distribution(
                &sub,
                &uniform(class.len()),
                config.class.epsilon,
                config.class.max_iter,
            )?;

            let label = classification.label(index);
            let kind = label.map_or(ClassKind::Transitive, |l| l.kind);
            let absorbing = label.is_some_and(|l| l.absorbing);
            let mass: f64 = limit.value.iter().sum();
            let mass_agrees = mass_agrees(kind, mass, config.check.mass_tolerance);

            if class_period == Period::Undetermined {
                warn!(class = class.name(), "no return observed, period undetermined");
            }
            if !limit.converged {
                warn!(
                    class = class.name(),
                    max_iter = config.class.max_iter,
                    "limiting distribution did not converge"
                );
            }
            if !mass_agrees {
                warn!(
                    class = class.name(),
                    kind = kind.as_str(),
                    mass,
                    "limiting mass disagrees with class label"
                );
            }

            classes.push(ClassReport {
                index,
                name: class.name().to_string(),
                members: class.members().to_vec(),
                kind,
                absorbing,
                period: class_period,
                limiting: limit.value,
                iterations: limit.iterations,
                converged: limit.converged,
                mass,
                mass_agrees,
            });
        }

        info!(
            classes = partition.len(),
            hasse_links = hasse.len(),
            irreducible = classification.irreducible,
            chain_converged = chain.converged,
            "chain analysis complete"
        );

        Ok(Self {
            vertex_count: graph.vertex_count(),
            edge_count: graph.edge_count(),
            stochastic,
            partition,
            links,
            hasse,
            classification,
            classes,
            chain,
        })
    }

    /// Return `true` if every class's limiting mass agrees with its label.
    #[must_use]
    pub fn labels_consistent(&self) -> bool {
        self.classes.iter().all(|c| c.mass_agrees)
    }

    /// Report for the class at 1-based `index`.
    #[must_use]
    pub fn class(&self, index: ClassIndex) -> Option<&ClassReport> {
        index.checked_sub(1).and_then(|i| self.classes.get(i))
    }

    /// Report for the class containing `vertex`.
    #[must_use]
    pub fn class_of(&self, vertex: VertexId) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.members.contains(&vertex))
    }
}

/// Persistent classes keep their mass; transitive classes lose some of it.
fn mass_agrees(kind: ClassKind, mass: f64, tolerance: f64) -> bool {
    match kind {
        ClassKind::Persistent => (mass - 1.0).abs() <= tolerance,
        ClassKind::Transitive => mass < 1.0 - tolerance,
    }
}
