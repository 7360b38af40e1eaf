//! CLI entry point for the url-reporter tool.

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod commands;
mod config;
mod settings;
mod terminal;

use cli::{Cli, Command, ConfigCommand};
use settings::{Settings, resolve_log_level};

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Everything found was accepted (or there was nothing to submit).
    Success,
    /// Some batches were accepted, others were not submitted or recorded.
    Partial,
    /// Candidate URLs existed but nothing was accepted.
    Failure,
}

impl ProcessExit {
    fn code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::from(1),
            Self::Partial => ExitCode::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(outcome) => outcome.code(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let loaded = config::load_default_file_config()?;
    let file_config = loaded.config.as_ref();

    let (default_level, force_cli_level) =
        resolve_log_level(&cli, file_config.and_then(|c| c.verbosity));
    terminal::init_tracing(
        default_level,
        force_cli_level,
        terminal::is_no_color_requested(cli.no_color),
    );
    debug!(?cli, "CLI arguments parsed");

    let report_args = match &cli.command {
        Command::Report(args) => Some(args),
        _ => None,
    };
    let settings = Settings::resolve(&cli, report_args, file_config);

    match &cli.command {
        Command::Report(args) => {
            let Some(path) = args.input.resolve_path() else {
                bail!("No input file. Pass a FILE argument or set INPUT_FILE");
            };
            info!("url-reporter starting");
            commands::run_report_command(&path, &settings).await
        }
        Command::Extract(input) => {
            let Some(path) = input.resolve_path() else {
                bail!("No input file. Pass a FILE argument or set INPUT_FILE");
            };
            commands::run_extract_command(&path, &settings).await?;
            Ok(ProcessExit::Success)
        }
        Command::Log(args) => {
            commands::run_log_command(*args, &settings).await?;
            Ok(ProcessExit::Success)
        }
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            commands::run_config_show_command(&loaded, &settings, default_level);
            Ok(ProcessExit::Success)
        }
    }
}
