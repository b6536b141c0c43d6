#![forbid(unsafe_code)]
//! strata-core library.
//!
//! Data model and input handling for finite discrete-time Markov chains:
//! the weighted transition [`Graph`], the text reader that builds it, the
//! row-sum check, and the analysis configuration.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library failures (each maps to an
//!   [`error::ErrorCode`]); `anyhow::Result` for configuration loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod check;
pub mod config;
pub mod error;
pub mod graph;
pub mod label;
pub mod read;

pub use check::{StochasticReport, check_stochastic};
pub use config::AnalysisConfig;
pub use graph::{Edge, Graph, GraphError, VertexId};
pub use read::{ReadError, ReadOutcome, parse_graph, read_graph};
