//! Subcommand handlers.
//!
//! Each module exposes a clap `Args` struct, a `run_*` entry point and the
//! human renderers for its report.

pub mod analyze;
pub mod check;
pub mod classes;
pub mod completions;
pub mod export;
pub mod hasse;
pub mod show;

use std::path::Path;

use strata_core::config::{PROJECT_CONFIG_FILE, load_analysis_config};
use strata_core::error::ErrorCode;
use strata_core::{AnalysisConfig, ReadOutcome, read_graph};
use tracing::warn;

use crate::output::{CliError, OutputMode, render_error};

/// Read the chain at `input`, reporting failures in the selected output mode.
pub fn load_input(input: &Path, output: OutputMode) -> anyhow::Result<ReadOutcome> {
    match read_graph(input) {
        Ok(outcome) => {
            if outcome.skipped > 0 {
                warn!(
                    skipped = outcome.skipped,
                    "transitions with an out-of-range source were ignored"
                );
            }
            Ok(outcome)
        }
        Err(err) => {
            render_error(output, &CliError::with_code(err.to_string(), err.error_code()))?;
            anyhow::bail!("failed to read {}", input.display());
        }
    }
}

/// Load the analysis settings.
///
/// An explicit `--config` path must exist; otherwise `strata.toml` in the
/// working directory is used when present.
pub fn load_config(explicit: Option<&Path>, output: OutputMode) -> anyhow::Result<AnalysisConfig> {
    let result = match explicit {
        Some(path) if !path.exists() => {
            render_error(
                output,
                &CliError::with_code(
                    format!("config file {} not found", path.display()),
                    ErrorCode::InputNotFound,
                ),
            )?;
            anyhow::bail!("config file not found");
        }
        Some(path) => load_analysis_config(path),
        None => load_analysis_config(Path::new(PROJECT_CONFIG_FILE)),
    };

    result.or_else(|err| {
        render_error(
            output,
            &CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError),
        )?;
        Err(err)
    })
}

/// Report a rejected setting in the selected output mode, then fail with it.
pub fn reject_setting<T>(output: OutputMode, err: anyhow::Error) -> anyhow::Result<T> {
    render_error(
        output,
        &CliError::with_code(format!("{err:#}"), ErrorCode::ConfigInvalid),
    )?;
    Err(err)
}
