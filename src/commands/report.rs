//! Report command: read content, submit its URLs, record accepted batches.

use std::path::Path;

use anyhow::{Context, Result};
use reporter_core::content::{ContentReader, TesseractCli};
use reporter_core::pipeline::{InvocationSummary, run_report};
use reporter_core::record::SubmissionLog;
use reporter_core::submit::{BatchStatus, FinalResult, ReportClient, SubmissionEngine};
use reporter_core::Database;
use tracing::info;

use crate::ProcessExit;
use crate::settings::Settings;

pub async fn run_report_command(path: &Path, settings: &Settings) -> Result<ProcessExit> {
    let client_config = settings.client_config()?;
    let client = ReportClient::new(client_config).context("Failed to build HTTP client")?;
    let engine = SubmissionEngine::new(client, settings.submit_config());
    let reader = ContentReader::new(
        settings.content_config(),
        TesseractCli::new(&settings.tesseract_path),
    );

    let db = Database::new(&settings.db_path).await.with_context(|| {
        format!(
            "Failed to open submission log '{}'",
            settings.db_path.display()
        )
    })?;
    let log = SubmissionLog::new(db.clone());

    info!(path = %path.display(), endpoint = %settings.endpoint, "Reporting file");
    let summary = run_report(path, &reader, &engine, &log)
        .await
        .with_context(|| format!("Failed to report '{}'", path.display()))?;
    db.close().await;

    print_summary(&summary);
    Ok(determine_exit_outcome(&summary))
}

fn print_summary(summary: &InvocationSummary) {
    if summary.candidates == 0 {
        println!("No URLs found; nothing to submit.");
        return;
    }

    for batch in &summary.report.batches {
        match &batch.status {
            BatchStatus::Accepted { tracking_id, urls } => {
                println!("accepted {tracking_id} ({} urls)", urls.len());
                for url in urls {
                    println!("  {url}");
                }
            }
            BatchStatus::Failed {
                failure,
                unsubmitted,
            } => {
                println!("failed: {failure} ({} urls not submitted)", unsubmitted.len());
                for url in unsubmitted {
                    println!("  {url}");
                }
            }
        }
    }
    for pruned in summary.report.pruned() {
        println!("removed {} ({})", pruned.url, pruned.message);
    }
    for failure in &summary.record_failures {
        println!(
            "warning: {} accepted but not recorded: {}",
            failure.tracking_id, failure.error
        );
    }

    match summary.final_result() {
        FinalResult::Accepted(_) => {
            println!("tracking ids: {}", summary.final_result().display_ids());
        }
        FinalResult::NothingAccepted => {
            println!("Nothing accepted by the report service.");
        }
    }
}

/// Maps an invocation summary to the process exit outcome.
///
/// No candidates is a success; candidates with nothing accepted is a failure;
/// anything left unsubmitted or unrecorded next to an accepted batch is partial.
pub fn determine_exit_outcome(summary: &InvocationSummary) -> ProcessExit {
    if summary.candidates == 0 {
        return ProcessExit::Success;
    }
    if summary.nothing_accepted() {
        return ProcessExit::Failure;
    }
    if summary.report.unsubmitted().is_empty() && summary.record_failures.is_empty() {
        ProcessExit::Success
    } else {
        ProcessExit::Partial
    }
}

#[cfg(test)]
mod tests {
    use reporter_core::record::RecordError;
    use reporter_core::pipeline::RecordFailure;
    use reporter_core::submit::{
        BatchFailure, BatchOutcome, SubmissionReport, TrackingId, WholesaleReason,
    };

    use super::*;

    fn accepted(id: &str) -> BatchOutcome {
        BatchOutcome {
            status: BatchStatus::Accepted {
                tracking_id: TrackingId::parse(id).unwrap(),
                urls: vec!["http://a".to_string()],
            },
            pruned: Vec::new(),
            diagnostics: Vec::new(),
            attempts: 1,
        }
    }

    fn failed() -> BatchOutcome {
        BatchOutcome {
            status: BatchStatus::Failed {
                failure: BatchFailure::Wholesale(WholesaleReason::Timeout),
                unsubmitted: vec!["http://b".to_string()],
            },
            pruned: Vec::new(),
            diagnostics: Vec::new(),
            attempts: 1,
        }
    }

    fn summary(batches: Vec<BatchOutcome>, candidates: usize) -> InvocationSummary {
        InvocationSummary {
            candidates,
            report: SubmissionReport { batches },
            ..InvocationSummary::default()
        }
    }

    #[test]
    fn test_exit_outcome_success_when_nothing_to_submit() {
        assert_eq!(determine_exit_outcome(&summary(vec![], 0)), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_when_all_accepted() {
        assert_eq!(
            determine_exit_outcome(&summary(vec![accepted("id-1")], 1)),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_partial_when_mixed() {
        assert_eq!(
            determine_exit_outcome(&summary(vec![accepted("id-1"), failed()], 2)),
            ProcessExit::Partial
        );
    }

    #[test]
    fn test_exit_outcome_failure_when_nothing_accepted() {
        assert_eq!(
            determine_exit_outcome(&summary(vec![failed()], 1)),
            ProcessExit::Failure
        );
    }

    #[test]
    fn test_exit_outcome_partial_when_record_failed() {
        let mut s = summary(vec![accepted("id-1")], 1);
        s.record_failures.push(RecordFailure {
            tracking_id: TrackingId::parse("id-1").unwrap(),
            error: RecordError::corrupt(1, "disk full"),
        });
        assert_eq!(determine_exit_outcome(&s), ProcessExit::Partial);
    }
}
