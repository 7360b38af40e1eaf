//! One report invocation: content → candidate URLs → submission → audit log.
//!
//! The pipeline owns no state; callers hand it the reader, engine and
//! recorder so each stage can be swapped in tests.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::content::{ContentError, ContentReader, TextRecognizer};
use crate::parser::{CandidateUrls, extract_candidate_urls};
use crate::record::{OutcomeRecorder, RecordError, SubmissionRecord};
use crate::submit::{
    FinalResult, ReportTransport, SubmissionEngine, SubmissionReport, SubmitError, TrackingId,
};

/// Errors that abort an invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be read.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Submission contract violation.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// A tracking id whose audit record could not be written.
#[derive(Debug)]
pub struct RecordFailure {
    /// Id that was accepted by the service but not recorded.
    pub tracking_id: TrackingId,
    /// Why recording failed.
    pub error: RecordError,
}

/// Everything one invocation did.
#[derive(Debug, Default)]
pub struct InvocationSummary {
    /// Distinct candidate URLs found in the content.
    pub candidates: usize,
    /// Per-batch submission results.
    pub report: SubmissionReport,
    /// Audit records written.
    pub recorded: usize,
    /// Audit records that failed to persist.
    pub record_failures: Vec<RecordFailure>,
}

impl InvocationSummary {
    /// Invocation-level classification of the submission.
    #[must_use]
    pub fn final_result(&self) -> FinalResult<'_> {
        self.report.final_result()
    }

    /// True when there were candidates but no batch was accepted.
    #[must_use]
    pub fn nothing_accepted(&self) -> bool {
        self.candidates > 0 && matches!(self.final_result(), FinalResult::NothingAccepted)
    }
}

/// Reads `path` and extracts its candidate URLs.
///
/// Unsupported file types yield an empty set.
///
/// # Errors
///
/// Returns [`ContentError`] if the file is missing, unreadable, or OCR fails.
#[instrument(skip(reader, path), fields(path = %path.display()))]
pub async fn extract_from_file<R: TextRecognizer>(
    path: &Path,
    reader: &ContentReader<R>,
) -> Result<CandidateUrls, ContentError> {
    Ok(reader
        .read(path)
        .await?
        .map(|text| extract_candidate_urls(&text))
        .unwrap_or_default())
}

/// Submits `urls` and records every accepted batch.
///
/// Recorder failures are logged and returned in the summary, never retried.
///
/// # Errors
///
/// Returns [`SubmitError`] for submission contract violations.
#[instrument(skip_all, fields(candidates = urls.len()))]
pub async fn submit_and_record<T: ReportTransport>(
    urls: &CandidateUrls,
    engine: &SubmissionEngine<T>,
    recorder: &dyn OutcomeRecorder,
) -> Result<InvocationSummary, SubmitError> {
    let report = engine.submit_all(urls).await?;
    let records = SubmissionRecord::from_final_result(&report.final_result(), Utc::now());

    let mut recorded = 0;
    let mut record_failures = Vec::new();
    for record in records {
        match recorder.record(&record).await {
            Ok(()) => recorded += 1,
            Err(error) => {
                warn!(tracking_id = %record.tracking_id, error = %error, "Failed to record submission");
                record_failures.push(RecordFailure {
                    tracking_id: record.tracking_id,
                    error,
                });
            }
        }
    }

    let summary = InvocationSummary {
        candidates: urls.len(),
        report,
        recorded,
        record_failures,
    };
    info!(
        tracking_ids = %summary.final_result().display_ids(),
        pruned = summary.report.pruned().count(),
        unsubmitted = summary.report.unsubmitted().len(),
        attempts = summary.report.attempts(),
        "Submission finished"
    );
    Ok(summary)
}

/// Runs a full invocation for the file at `path`.
///
/// # Errors
///
/// Returns [`PipelineError::Content`] if the input cannot be read and
/// [`PipelineError::Submit`] for submission contract violations.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn run_report<R: TextRecognizer, T: ReportTransport>(
    path: &Path,
    reader: &ContentReader<R>,
    engine: &SubmissionEngine<T>,
    recorder: &dyn OutcomeRecorder,
) -> Result<InvocationSummary, PipelineError> {
    let urls = extract_from_file(path, reader).await?;
    Ok(submit_and_record(&urls, engine, recorder).await?)
}
