//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default directory that `INPUT_FILE` is resolved against.
pub const DEFAULT_INPUT_DIR: &str = "/input";

/// Report phishing URLs found in screenshots and documents.
///
/// url-reporter reads an image (via OCR) or text document, extracts the URLs
/// it contains, and submits them to a phishing-intelligence report service.
#[derive(Parser, Debug)]
#[command(name = "url-reporter")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Maximum diagnostic output (trace level)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored log output (also honors NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Submission log database path
    #[arg(long, global = true, env = "URL_REPORTER_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract URLs from a file and submit them
    Report(ReportArgs),

    /// Show the URLs that would be submitted, without contacting the service
    Extract(InputArgs),

    /// Show recorded submissions
    Log(LogArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

/// Where the reported content comes from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// File to read (image or text document)
    pub file: Option<PathBuf>,

    /// File name resolved against --input-dir when FILE is not given
    #[arg(long, env = "INPUT_FILE")]
    pub input_file: Option<String>,

    /// Directory containing INPUT_FILE
    #[arg(long, env = "INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,
}

impl InputArgs {
    /// The file to read: FILE if given, otherwise `input_dir/INPUT_FILE`.
    #[must_use]
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(file) = &self.file {
            return Some(file.clone());
        }
        self.input_file
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| self.input_dir.join(name))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Reporter email sent with each submission
    #[arg(long, env = "REPORTER_EMAIL")]
    pub email: Option<String>,

    /// Report reason code
    #[arg(long)]
    pub reason: Option<String>,

    /// Report endpoint URL
    #[arg(long, env = "REPORT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Maximum URLs per request (1-1000)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub max_batch_size: Option<u16>,

    /// Batches submitted concurrently (1-16)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub batch_concurrency: Option<u8>,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct LogArgs {
    /// Maximum number of submissions to show (1-1000)
    #[arg(short = 'n', long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub limit: u32,
}
