#![forbid(unsafe_code)]
//! strata-analysis library.
//!
//! Structural analysis of a finite Markov chain: communicating classes
//! ([`scc`]), the class graph and its Hasse diagram ([`quotient`]), the
//! persistent/transitive labels ([`classify`]), the numerical side
//! ([`matrix`]), Mermaid diagrams ([`export`]) and the combined pipeline
//! ([`analysis`]).
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per module, each mapped to an
//!   [`strata_core::error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod analysis;
pub mod classify;
pub mod export;
pub mod matrix;
pub mod quotient;
pub mod scc;

pub use analysis::{AnalysisError, ChainAnalysis, ClassReport};
pub use classify::{ClassKind, ClassLabel, Classification, classify};
pub use export::{ExportError, graph_to_mermaid, hasse_to_mermaid, write_mermaid};
pub use matrix::{Convergence, Matrix, MatrixError, Period};
pub use quotient::{Link, LinkSet, QuotientError, build_links, reduce_transitive};
pub use scc::{Class, ClassIndex, Partition, VertexClassMap, decompose};
