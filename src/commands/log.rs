//! Log command handler: show recorded submissions.

use anyhow::{Context, Result};
use reporter_core::Database;
use reporter_core::record::SubmissionLog;

use crate::cli::LogArgs;
use crate::settings::Settings;

pub async fn run_log_command(args: LogArgs, settings: &Settings) -> Result<()> {
    if !settings.db_path.exists() {
        println!(
            "No submission history found at {}.",
            settings.db_path.display()
        );
        return Ok(());
    }

    let db = Database::new(&settings.db_path).await.with_context(|| {
        format!(
            "Failed to open submission log '{}'",
            settings.db_path.display()
        )
    })?;
    let log = SubmissionLog::new(db);
    let records = log.recent(args.limit).await?;

    if records.is_empty() {
        println!("No submissions recorded yet.");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {}  {} url(s)  batch of [{}]",
            record.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            record.tracking_id,
            record.url_count(),
            record
                .associated_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );
        for url in &record.urls {
            println!("    {url}");
        }
    }
    Ok(())
}
