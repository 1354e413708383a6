//! `clawlog` binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use claw_logctl::cli::{Cli, Commands};
use claw_logctl::{CliError, commands};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Write(args) => commands::write(&mut stdout, &args)?,
        Commands::Sweep(args) => commands::sweep(&mut stdout, &args)?,
        Commands::Generate { template, count } => {
            commands::generate(&mut stdout, &template, count)?;
        }
        Commands::Match { template, names } => {
            if !commands::matches(&mut stdout, &template, &names)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
