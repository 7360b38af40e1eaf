//! Extract command: show candidate URLs without submitting (dry run).

use std::path::Path;

use anyhow::{Context, Result};
use reporter_core::content::{ContentReader, TesseractCli};
use reporter_core::pipeline::extract_from_file;
use reporter_core::submit::split_batches;

use crate::settings::Settings;

pub async fn run_extract_command(path: &Path, settings: &Settings) -> Result<()> {
    let reader = ContentReader::new(
        settings.content_config(),
        TesseractCli::new(&settings.tesseract_path),
    );
    let urls = extract_from_file(path, &reader)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    if urls.is_empty() {
        println!("No URLs found; nothing to submit.");
        return Ok(());
    }

    let batches = split_batches(urls.as_slice(), settings.max_batch_size);
    println!(
        "Dry run: {} URL(s) in {} batch(es), nothing submitted.",
        urls.len(),
        batches.len()
    );
    for url in &urls {
        println!("{url}");
    }
    Ok(())
}
