//! CLI command handlers.

mod config;
mod extract;
mod log;
mod report;

pub use config::run_config_show_command;
pub use extract::run_extract_command;
pub use log::run_log_command;
pub use report::{determine_exit_outcome, run_report_command};
