#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use strata_core::config::load_user_config;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "strata: structural analysis of finite Markov chains",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Analysis settings file (default: ./strata.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Input",
        about = "Print the adjacency list",
        long_about = "Read a chain description and print every vertex with its outgoing transitions.",
        after_help = "EXAMPLES:\n    # List transitions\n    strata show data/chain.txt\n\n    # Emit machine-readable output\n    strata show data/chain.txt --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Input",
        about = "Check that rows sum to 1",
        long_about = "Report vertices whose outgoing probabilities do not sum to 1 and weights outside [0, 1].",
        after_help = "EXAMPLES:\n    # Report problems\n    strata check data/chain.txt\n\n    # Fail in scripts when the chain is not stochastic\n    strata check data/chain.txt --strict"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Structure",
        about = "List communicating classes",
        long_about = "Decompose the chain into communicating classes and label each as persistent or transitive.",
        after_help = "EXAMPLES:\n    # List classes\n    strata classes data/chain.txt"
    )]
    Classes(cmd::classes::ClassesArgs),

    #[command(
        next_help_heading = "Structure",
        about = "Show the Hasse diagram of the classes",
        long_about = "Print the links between classes after transitive reduction.",
        after_help = "EXAMPLES:\n    # Reduced links\n    strata hasse data/chain.txt\n\n    # All links, before reduction\n    strata hasse data/chain.txt --raw\n\n    # Write a Mermaid diagram\n    strata hasse data/chain.txt --mermaid hasse.mmd"
    )]
    Hasse(cmd::hasse::HasseArgs),

    #[command(
        next_help_heading = "Structure",
        about = "Write the chain as a Mermaid flowchart",
        after_help = "EXAMPLES:\n    # Write graph.mmd\n    strata export data/chain.txt\n\n    # Choose the destination\n    strata export data/chain.txt -o out/chain.mmd"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Full report: classes, periods, limiting distributions",
        long_about = "Run the whole pipeline: stochastic check, classes, Hasse diagram, classification, \
                      periods, per-class limiting distributions and convergence of the matrix powers.",
        after_help = "EXAMPLES:\n    # Report\n    strata analyze data/chain.txt\n\n    # Include the limit matrix\n    strata analyze data/chain.txt --matrix\n\n    # Tighter convergence\n    strata analyze data/chain.txt --epsilon 1e-4 --max-iter 100000"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    strata completions bash > /etc/bash_completion.d/strata"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Cli {
    /// Fallback log filter when `STRATA_LOG` is unset.
    fn default_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose || env::var("DEBUG").is_ok() {
            "strata=debug,info"
        } else {
            "strata=info,warn"
        }
    }

    /// Derive the output mode from flags, environment and user preferences.
    fn output_mode(&self, user_pref: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, user_pref)
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env("STRATA_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    let format = env::var("STRATA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.default_filter());

    let user = load_user_config().unwrap_or_else(|err| {
        warn!("ignoring user config: {err:#}");
        strata_core::config::UserConfig::default()
    });
    let output = cli.output_mode(user.output.as_deref());
    debug!(?output, "output mode resolved");

    match &cli.command {
        Commands::Show(args) => cmd::show::run_show(args, output),
        Commands::Check(args) => {
            let config = cmd::load_config(cli.config.as_deref(), output)?;
            cmd::check::run_check(args, &config, output)
        }
        Commands::Classes(args) => cmd::classes::run_classes(args, output),
        Commands::Hasse(args) => cmd::hasse::run_hasse(args, output),
        Commands::Export(args) => cmd::export::run_export(args, output),
        Commands::Analyze(args) => {
            let config = cmd::load_config(cli.config.as_deref(), output)?;
            cmd::analyze::run_analyze(args, &config, output)
        }
        Commands::Completions(args) => {
            cmd::completions::run_completions(args, &mut Cli::command())
        }
    }
}
