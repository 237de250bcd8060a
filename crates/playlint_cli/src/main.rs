//! playlint CLI
//!
//! Checks a project tree against a playbook profile and reports violations.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, RulesCommands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(has_failures) => {
            if has_failures {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> miette::Result<bool> {
    match &cli.command {
        Commands::Check(args) => commands::check::run_check(cli, args),
        Commands::Rules { command } => match command {
            RulesCommands::List { profile, rules } => {
                commands::rules::run_list(cli, profile.as_deref(), rules).map(|_| false)
            }
            RulesCommands::Verify { files } => {
                commands::rules::run_verify(cli, files).map(|_| false)
            }
        },
        Commands::Init { force } => commands::init::run_init(*force).map(|_| false),
    }
}
