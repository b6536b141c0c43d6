//! `strata hasse`: links between classes, reduced to the Hasse diagram.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_analysis::{
    ClassIndex, LinkSet, Partition, build_links, decompose, hasse_to_mermaid, reduce_transitive,
    write_mermaid,
};

use super::load_input;
use crate::output::{CliError, OutputMode, render_error, render_mode};

/// Arguments for `strata hasse`.
#[derive(Args, Debug)]
pub struct HasseArgs {
    /// Chain description: vertex count, then `from to probability` triples.
    pub input: PathBuf,

    /// Show every link between classes, before transitive reduction.
    #[arg(long)]
    pub raw: bool,

    /// Also write the diagram as a Mermaid flowchart to this path.
    #[arg(long, value_name = "PATH")]
    pub mermaid: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct HasseOutput {
    reduced: bool,
    classes: Vec<ClassSummary>,
    links: Vec<LinkRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mermaid: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ClassSummary {
    index: ClassIndex,
    name: String,
    members: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct LinkRow {
    from: String,
    to: String,
}

impl HasseOutput {
    fn new(partition: &Partition, links: &LinkSet, reduced: bool) -> Self {
        let name = |idx: ClassIndex| {
            partition
                .class(idx)
                .map_or_else(|| format!("C{idx}"), |c| c.name().to_string())
        };
        Self {
            reduced,
            classes: partition
                .iter()
                .map(|(index, class)| ClassSummary {
                    index,
                    name: class.name().to_string(),
                    members: class.members().to_vec(),
                })
                .collect(),
            links: links
                .iter()
                .map(|l| LinkRow {
                    from: name(l.from),
                    to: name(l.to),
                })
                .collect(),
            mermaid: None,
        }
    }
}

/// Execute `strata hasse`.
pub fn run_hasse(args: &HasseArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = load_input(&args.input, output)?.graph;

    let partition = decompose(&graph);
    let links = build_links(&graph, &partition.vertex_to_class());
    let shown = if args.raw {
        links
    } else {
        match reduce_transitive(&links) {
            Ok(hasse) => hasse,
            Err(err) => {
                render_error(output, &CliError::with_code(err.to_string(), err.error_code()))?;
                return Err(err.into());
            }
        }
    };

    let mut payload = HasseOutput::new(&partition, &shown, !args.raw);

    if let Some(path) = &args.mermaid {
        if let Err(err) = write_mermaid(path, &hasse_to_mermaid(&partition, &shown)) {
            render_error(output, &CliError::with_code(err.to_string(), err.error_code()))?;
            return Err(err.into());
        }
        payload.mermaid = Some(path.clone());
    }

    render_mode(output, &payload, render_hasse_text, render_hasse_pretty)
}

fn render_hasse_text(payload: &HasseOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for link in &payload.links {
        writeln!(w, "{} {}", link.from, link.to)?;
    }
    Ok(())
}

fn render_hasse_pretty(payload: &HasseOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let title = if payload.reduced {
        "Hasse diagram"
    } else {
        "Links between classes"
    };
    writeln!(w, "{title} ({} link(s))", payload.links.len())?;
    if payload.links.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for link in &payload.links {
        writeln!(w, "  {} -> {}", link.from, link.to)?;
    }
    if let Some(path) = &payload.mermaid {
        writeln!(w)?;
        writeln!(w, "Mermaid diagram written to {}", path.display())?;
    }
    Ok(())
}
