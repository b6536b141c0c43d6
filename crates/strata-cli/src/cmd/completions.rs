//! `strata completions`: shell completion scripts.

use std::io::Write;

use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `strata completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(args.shell, command, &mut out);
    out.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut clap::Command, w: &mut dyn Write) {
    generate(shell, command, "strata", w);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_subcommands() {
        let mut command = clap::Command::new("strata")
            .subcommand(clap::Command::new("analyze"))
            .subcommand(clap::Command::new("hasse"));
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut command, &mut out);

        let script = String::from_utf8(out).expect("utf8");
        assert!(script.contains("strata"));
        assert!(script.contains("analyze"));
        assert!(script.contains("hasse"));
    }
}
