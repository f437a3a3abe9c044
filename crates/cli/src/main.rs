//! mapv - multi-agent plan validator CLI
//!
//! Usage:
//!   mapv convert  --domain <d> --problem <p> [--out-dir <dir>]
//!   mapv inspect  --domain <d> --problem <p> [--json]
//!   mapv validate --domain <d> --problem <p> --plan <plan.json> [--config <file>]
//!
//! Exit status: 0 valid or done, 1 invalid plan, 2 error.

use clap::{Parser, Subcommand};
use cli::commands::{ConvertCommand, InspectCommand, ValidateCommand};
use console::style;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mapv")]
#[command(about = "Translate MA-PDDL to classical PDDL and validate multi-agent plans")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the classical translation of an MA-PDDL task
    Convert(ConvertCommand),
    /// Summarize an MA-PDDL task
    Inspect(InspectCommand),
    /// Validate a multi-agent plan
    Validate(ValidateCommand),
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Convert(cmd) => cmd.run().map(|_| true),
        Commands::Inspect(cmd) => cmd.run().map(|_| true),
        Commands::Validate(cmd) => cmd.run(),
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::from(2)
        }
    }
}
