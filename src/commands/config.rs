//! Config command handlers: show effective configuration.

use crate::config::LoadedConfig;
use crate::settings::{Settings, verbosity_label};

pub fn run_config_show_command(loaded: &LoadedConfig, settings: &Settings, log_level: &str) {
    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded.loaded_from_file() {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!(
        "email = {}",
        settings.email.as_deref().unwrap_or("<unset>")
    );
    println!("reason = {}", settings.reason);
    println!("endpoint = {}", settings.endpoint);
    println!("max_batch_size = {}", settings.max_batch_size);
    println!("batch_concurrency = {}", settings.batch_concurrency);
    println!("connect_timeout_secs = {}", settings.connect_timeout_secs);
    println!("read_timeout_secs = {}", settings.read_timeout_secs);
    println!("db_path = {}", settings.db_path.display());
    println!("image_extensions = {}", settings.image_extensions.join(" "));
    println!(
        "document_extensions = {}",
        settings.document_extensions.join(" ")
    );
    println!("tesseract_path = {}", settings.tesseract_path.display());
    println!("verbosity = {}", verbosity_label(log_level));
}
