//! Effective settings: CLI values over config file values over defaults.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reporter_core::content::{
    ContentConfig, DEFAULT_DOCUMENT_EXTENSIONS, DEFAULT_IMAGE_EXTENSIONS, DEFAULT_TESSERACT_BINARY,
};
use reporter_core::submit::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_BATCH_SIZE, DEFAULT_READ_TIMEOUT_SECS,
    DEFAULT_REASON, DEFAULT_REPORT_ENDPOINT, ReportClientConfig, SubmitConfig,
};

use crate::cli::{Cli, ReportArgs};
use crate::config::{FileConfig, VerbositySetting, default_db_path};

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub email: Option<String>,
    pub reason: String,
    pub endpoint: String,
    pub max_batch_size: NonZeroUsize,
    pub batch_concurrency: NonZeroUsize,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub db_path: PathBuf,
    pub image_extensions: Vec<String>,
    pub document_extensions: Vec<String>,
    pub tesseract_path: PathBuf,
}

impl Settings {
    /// Merges CLI flags, the config file and built-in defaults.
    pub fn resolve(cli: &Cli, report: Option<&ReportArgs>, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();

        let max_batch_size = report
            .and_then(|r| r.max_batch_size)
            .or(file.max_batch_size)
            .and_then(|n| NonZeroUsize::new(usize::from(n)))
            .unwrap_or(DEFAULT_MAX_BATCH_SIZE);
        let batch_concurrency = report
            .and_then(|r| r.batch_concurrency)
            .or(file.batch_concurrency)
            .and_then(|n| NonZeroUsize::new(usize::from(n)))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            email: report.and_then(|r| r.email.clone()).or(file.email),
            reason: report
                .and_then(|r| r.reason.clone())
                .or(file.reason)
                .unwrap_or_else(|| DEFAULT_REASON.to_string()),
            endpoint: report
                .and_then(|r| r.endpoint.clone())
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_REPORT_ENDPOINT.to_string()),
            max_batch_size,
            batch_concurrency,
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
            db_path: cli
                .db
                .clone()
                .or(file.db_path)
                .unwrap_or_else(default_db_path),
            image_extensions: file
                .image_extensions
                .unwrap_or_else(|| to_owned_list(DEFAULT_IMAGE_EXTENSIONS)),
            document_extensions: file
                .document_extensions
                .unwrap_or_else(|| to_owned_list(DEFAULT_DOCUMENT_EXTENSIONS)),
            tesseract_path: file
                .tesseract_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TESSERACT_BINARY)),
        }
    }

    /// Extension lists for the content reader.
    #[must_use]
    pub fn content_config(&self) -> ContentConfig {
        ContentConfig {
            image_extensions: self.image_extensions.clone(),
            document_extensions: self.document_extensions.clone(),
        }
    }

    /// Engine settings.
    #[must_use]
    pub fn submit_config(&self) -> SubmitConfig {
        SubmitConfig {
            max_batch_size: self.max_batch_size,
            batch_concurrency: self.batch_concurrency,
        }
    }

    /// HTTP client settings. Requires a reporter email.
    pub fn client_config(&self) -> Result<ReportClientConfig> {
        let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            bail!(
                "A reporter email is required. Pass --email, set REPORTER_EMAIL, or add `email = \"...\"` to the config file"
            );
        };
        let mut config = ReportClientConfig::with_endpoint(&self.endpoint, email)
            .context("Invalid report endpoint")?;
        config.reason.clone_from(&self.reason);
        config.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        config.read_timeout = Duration::from_secs(self.read_timeout_secs);
        Ok(config)
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Resolves the log level and whether it overrides `RUST_LOG`.
///
/// Explicit CLI flags win over `RUST_LOG`; the config file verbosity only
/// sets the default.
#[must_use]
pub fn resolve_log_level(cli: &Cli, file_verbosity: Option<VerbositySetting>) -> (&'static str, bool) {
    if cli.debug {
        return ("trace", true);
    }
    if cli.quiet {
        return ("error", true);
    }
    match cli.verbose {
        0 => {}
        1 => return ("debug", true),
        _ => return ("trace", true),
    }
    let level = match file_verbosity {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose) => "debug",
        Some(VerbositySetting::Debug) => "trace",
        Some(VerbositySetting::Default) | None => "info",
    };
    (level, false)
}

/// Human label for the effective verbosity.
#[must_use]
pub fn verbosity_label(level: &str) -> &'static str {
    let setting = match level {
        "error" => VerbositySetting::Quiet,
        "debug" => VerbositySetting::Verbose,
        "trace" => VerbositySetting::Debug,
        _ => VerbositySetting::Default,
    };
    setting.as_str()
}
