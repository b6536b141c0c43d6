//! `strata classes`: communicating classes and their classification.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_analysis::{
    ClassIndex, ClassKind, Classification, Partition, build_links, classify, decompose,
    reduce_transitive,
};
use strata_core::VertexId;
use strata_core::error::ErrorCode;

use super::load_input;
use crate::output::{CliError, OutputMode, fmt_members, render_error, render_mode};

/// Arguments for `strata classes`.
#[derive(Args, Debug)]
pub struct ClassesArgs {
    /// Chain description: vertex count, then `from to probability` triples.
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
struct ClassesOutput {
    irreducible: bool,
    classes: Vec<ClassRow>,
    absorbing_states: Vec<VertexId>,
}

#[derive(Debug, Serialize)]
struct ClassRow {
    index: ClassIndex,
    name: String,
    members: Vec<VertexId>,
    kind: ClassKind,
    absorbing: bool,
}

impl ClassesOutput {
    fn new(partition: &Partition, classification: &Classification) -> Self {
        let classes = partition
            .iter()
            .map(|(index, class)| {
                let label = classification.label(index);
                ClassRow {
                    index,
                    name: class.name().to_string(),
                    members: class.members().to_vec(),
                    kind: label.map_or(ClassKind::Transitive, |l| l.kind),
                    absorbing: label.is_some_and(|l| l.absorbing),
                }
            })
            .collect();
        Self {
            irreducible: classification.irreducible,
            classes,
            absorbing_states: classification.absorbing_states(partition),
        }
    }
}

/// Execute `strata classes`.
pub fn run_classes(args: &ClassesArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = load_input(&args.input, output)?.graph;

    let partition = decompose(&graph);
    let links = build_links(&graph, &partition.vertex_to_class());
    let hasse = match reduce_transitive(&links) {
        Ok(hasse) => hasse,
        Err(err) => {
            render_error(output, &CliError::with_code(err.to_string(), err.error_code()))?;
            return Err(err.into());
        }
    };
    let classification = classify(&partition, &hasse);

    let payload = ClassesOutput::new(&partition, &classification);
    render_mode(output, &payload, render_classes_text, render_classes_pretty)
}

fn render_classes_text(payload: &ClassesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for class in &payload.classes {
        let members = class
            .members
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            w,
            "{} {} {} {}",
            class.name,
            class.kind.as_str(),
            class.absorbing,
            members
        )?;
    }
    writeln!(w, "irreducible {}", payload.irreducible)
}

fn render_classes_pretty(payload: &ClassesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.classes.is_empty() {
        writeln!(w, "The chain has no states.")?;
        return Ok(());
    }

    writeln!(w, "Communicating classes ({})", payload.classes.len())?;
    for class in &payload.classes {
        let mut kind = class.kind.as_str().to_string();
        if class.absorbing {
            kind.push_str(", absorbing");
        }
        writeln!(
            w,
            "  {:<6} {:<24} {kind}",
            class.name,
            fmt_members(&class.members)
        )?;
    }
    writeln!(w)?;

    if !payload.absorbing_states.is_empty() {
        writeln!(w, "Absorbing states: {}", fmt_members(&payload.absorbing_states))?;
    }
    if payload.irreducible {
        writeln!(w, "The chain is irreducible.")
    } else {
        writeln!(w, "The chain is not irreducible.")
    }
}
