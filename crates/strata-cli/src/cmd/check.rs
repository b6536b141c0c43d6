//! `strata check`: verify that every row of the chain sums to 1.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_core::{AnalysisConfig, StochasticReport, check_stochastic};

use super::{load_input, reject_setting};
use crate::output::{OutputMode, render_mode};

/// Arguments for `strata check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Chain description: vertex count, then `from to probability` triples.
    pub input: PathBuf,

    /// Allowed deviation of a row sum from 1 (overrides `check.row_tolerance`).
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Exit with an error when the chain is not stochastic.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    markov: bool,
    #[serde(flatten)]
    report: StochasticReport,
}

/// Execute `strata check`.
pub fn run_check(
    args: &CheckArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let tolerance = args.tolerance.unwrap_or(config.check.row_tolerance);
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return reject_setting(
            output,
            anyhow::anyhow!("--tolerance must be a positive number, got {tolerance}"),
        );
    }

    let outcome = load_input(&args.input, output)?;
    let report = check_stochastic(&outcome.graph, tolerance);
    let payload = CheckOutput {
        markov: report.is_markov(),
        report,
    };

    render_mode(output, &payload, render_check_text, render_check_pretty)?;

    if args.strict && !payload.markov {
        anyhow::bail!(
            "chain is not stochastic ({} row(s), {} weight(s) out of range)",
            payload.report.row_issues.len(),
            payload.report.weight_issues.len()
        );
    }
    Ok(())
}

fn render_check_text(payload: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "markov {}", payload.markov)?;
    for issue in &payload.report.row_issues {
        writeln!(w, "row {} {}", issue.vertex, issue.sum)?;
    }
    for issue in &payload.report.weight_issues {
        writeln!(w, "weight {} {} {}", issue.from, issue.to, issue.weight)?;
    }
    Ok(())
}

fn render_check_pretty(payload: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.markov {
        writeln!(
            w,
            "The graph is a Markov chain (row tolerance {}).",
            payload.report.tolerance
        )?;
        return Ok(());
    }

    writeln!(w, "The graph is not a Markov chain.")?;
    for issue in &payload.report.row_issues {
        writeln!(
            w,
            "  vertex {}: outgoing probabilities sum to {:.4}",
            issue.vertex, issue.sum
        )?;
    }
    for issue in &payload.report.weight_issues {
        writeln!(
            w,
            "  transition {} -> {}: weight {} is not a probability",
            issue.from, issue.to, issue.weight
        )?;
    }
    Ok(())
}
