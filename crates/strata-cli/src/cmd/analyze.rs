//! `strata analyze`: full structural and numerical report.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_analysis::{ChainAnalysis, ClassReport, Matrix};
use strata_core::AnalysisConfig;

use super::{load_input, reject_setting};
use crate::output::{
    CliError, OutputMode, fmt_members, fmt_prob, pretty_kv, pretty_section, render_error,
    render_mode,
};

/// Arguments for `strata analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Chain description: vertex count, then `from to probability` triples.
    pub input: PathBuf,

    /// Print the limit of the matrix powers.
    #[arg(long)]
    pub matrix: bool,

    /// Convergence threshold for matrix powers (overrides `chain.epsilon`).
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Iteration cap for matrix powers (overrides `chain.max_iter`).
    #[arg(long, value_name = "N")]
    pub max_iter: Option<usize>,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of the loaded settings.
    fn apply(&self, config: &AnalysisConfig) -> anyhow::Result<AnalysisConfig> {
        let mut config = config.clone();
        if let Some(epsilon) = self.epsilon {
            config.chain.epsilon = epsilon;
        }
        if let Some(max_iter) = self.max_iter {
            config.chain.max_iter = max_iter;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    #[serde(flatten)]
    analysis: ChainAnalysis,
    #[serde(skip)]
    show_matrix: bool,
}

/// Execute `strata analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let config = match args.apply(config) {
        Ok(config) => config,
        Err(err) => return reject_setting(output, err),
    };
    let graph = load_input(&args.input, output)?.graph;

    let analysis = match ChainAnalysis::run(&graph, &config) {
        Ok(analysis) => analysis,
        Err(err) => {
            render_error(output, &CliError::with_code(err.to_string(), err.error_code()))?;
            return Err(err.into());
        }
    };

    let payload = AnalyzeOutput {
        analysis,
        show_matrix: args.matrix,
    };
    render_mode(output, &payload, render_analyze_text, render_analyze_pretty)
}

fn class_kind(class: &ClassReport) -> String {
    if class.absorbing {
        format!("{} (absorbing)", class.kind.as_str())
    } else {
        class.kind.as_str().to_string()
    }
}

fn write_matrix(w: &mut dyn Write, matrix: &Matrix, indent: &str) -> std::io::Result<()> {
    for row in matrix.rows() {
        let cells = row.iter().map(|x| fmt_prob(*x)).collect::<Vec<_>>().join(" ");
        writeln!(w, "{indent}{cells}")?;
    }
    Ok(())
}

fn render_analyze_text(payload: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let a = &payload.analysis;
    writeln!(
        w,
        "vertices {} transitions {} markov {} irreducible {}",
        a.vertex_count,
        a.edge_count,
        a.stochastic.is_markov(),
        a.classification.irreducible
    )?;
    for class in &a.classes {
        let limiting = class
            .limiting
            .iter()
            .map(|x| fmt_prob(*x))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            w,
            "{} {} absorbing={} period={} mass={} iterations={} converged={} members={} limiting={}",
            class.name,
            class.kind.as_str(),
            class.absorbing,
            class.period.as_raw(),
            fmt_prob(class.mass),
            class.iterations,
            class.converged,
            fmt_members(&class.members),
            limiting
        )?;
    }
    writeln!(
        w,
        "chain converged={} iterations={} residual={}",
        a.chain.converged, a.chain.iterations, a.chain.residual
    )?;
    if payload.show_matrix {
        write_matrix(w, &a.chain.value, "")?;
    }
    Ok(())
}

fn render_analyze_pretty(payload: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let a = &payload.analysis;

    pretty_section(w, "Chain")?;
    pretty_kv(w, "Vertices", a.vertex_count.to_string())?;
    pretty_kv(w, "Transitions", a.edge_count.to_string())?;
    pretty_kv(
        w,
        "Stochastic",
        if a.stochastic.is_markov() {
            "yes".to_string()
        } else {
            format!("no ({} row(s) off)", a.stochastic.row_issues.len())
        },
    )?;
    pretty_kv(w, "Classes", a.partition.len().to_string())?;
    pretty_kv(
        w,
        "Irreducible",
        if a.classification.irreducible { "yes" } else { "no" },
    )?;
    writeln!(w)?;

    pretty_section(w, "Classes")?;
    for class in &a.classes {
        writeln!(
            w,
            "{} {}  {}",
            class.name,
            fmt_members(&class.members),
            class_kind(class)
        )?;
        writeln!(w, "  period       {}", class.period)?;
        let limiting = class
            .members
            .iter()
            .zip(&class.limiting)
            .map(|(v, p)| format!("{v}: {}", fmt_prob(*p)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(w, "  limiting     {limiting}")?;
        writeln!(w, "  mass         {}", fmt_prob(class.mass))?;
        if class.converged {
            writeln!(w, "  converged    after {} iteration(s)", class.iterations)?;
        } else {
            writeln!(
                w,
                "  converged    no, stopped after {} iteration(s)",
                class.iterations
            )?;
        }
        if !class.mass_agrees {
            writeln!(w, "  warning      limiting mass disagrees with the class label")?;
        }
    }
    writeln!(w)?;

    pretty_section(w, "Matrix powers")?;
    if a.chain.converged {
        writeln!(
            w,
            "Converged after {} iteration(s) (residual {:.2e}).",
            a.chain.iterations, a.chain.residual
        )?;
    } else {
        writeln!(
            w,
            "Did not converge within {} iteration(s) (residual {:.2e}).",
            a.chain.iterations, a.chain.residual
        )?;
    }
    if payload.show_matrix {
        writeln!(w)?;
        write_matrix(w, &a.chain.value, "  ")?;
    }
    Ok(())
}
