//! Submission engine: batching, narrowing resubmission, result aggregation.
//!
//! # Overview
//!
//! [`SubmissionEngine::submit_all`] splits the candidate set into batches and
//! drives each batch through [`SubmissionEngine::submit_batch`]:
//!
//! - `Accepted` ends the batch with a tracking id.
//! - `RejectedWholesale` ends the batch as failed; nothing is retried.
//! - `PartiallyRejected` removes every URL named by a format error and
//!   resubmits the narrower batch. Duplicate and unknown errors are kept as
//!   diagnostics but never stop pruning.
//!
//! The loop only continues when the batch strictly shrank, so a batch of `n`
//! URLs costs at most `n` remote calls.
//!
//! # Example
//!
//! ```no_run
//! use reporter_core::submit::{ReportClient, ReportClientConfig, SubmissionEngine, SubmitConfig};
//! use reporter_core::CandidateUrls;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ReportClient::new(ReportClientConfig::new("abuse@example.org")?)?;
//! let engine = SubmissionEngine::new(client, SubmitConfig::default());
//! let urls = CandidateUrls::from_iter(["http://phish.example/login".to_string()]);
//! let report = engine.submit_all(&urls).await?;
//! println!("accepted batches: {}", report.accepted().count());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::num::NonZeroUsize;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument, warn};

use super::batch::{DEFAULT_MAX_BATCH_SIZE, split_batches};
use super::classify::{ErrorClass, ItemError};
use super::client::ReportTransport;
use super::error::SubmitError;
use super::outcome::{LEGACY_SENTINEL, SubmissionOutcome, TrackingId, WholesaleReason};
use crate::parser::CandidateUrls;

/// Default number of batches in flight at once.
pub const DEFAULT_BATCH_CONCURRENCY: NonZeroUsize = NonZeroUsize::MIN;

/// Engine settings.
#[derive(Debug, Clone, Copy)]
pub struct SubmitConfig {
    /// Largest batch sent in one request.
    pub max_batch_size: NonZeroUsize,
    /// How many independent batches may be in flight at once.
    pub batch_concurrency: NonZeroUsize,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

/// A URL removed from a batch because the service flagged its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedUrl {
    /// The removed URL.
    pub url: String,
    /// The service message that caused the removal.
    pub message: String,
}

/// Why a batch ended without a tracking id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchFailure {
    /// The service or transport rejected the whole batch.
    Wholesale(WholesaleReason),
    /// The service rejected the batch but named no prunable URL still in it.
    NotConverging {
        /// Errors from the final response.
        errors: Vec<ItemError>,
    },
    /// Every URL in the batch was pruned as malformed.
    Exhausted,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wholesale(reason) => write!(f, "rejected: {reason}"),
            Self::NotConverging { errors } => {
                write!(f, "rejected with {} error(s) that pruning cannot fix", errors.len())
            }
            Self::Exhausted => f.write_str("every URL was pruned as malformed"),
        }
    }
}

/// Terminal state of one batch's narrowing loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Accepted by the service.
    Accepted {
        /// Issued identifier.
        tracking_id: TrackingId,
        /// URLs the accepted request carried.
        urls: Vec<String>,
    },
    /// Ended without acceptance.
    Failed {
        /// Cause.
        failure: BatchFailure,
        /// URLs still in the batch when it stopped; never reported.
        unsubmitted: Vec<String>,
    },
}

/// Full record of one batch, including everything removed along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Terminal state.
    pub status: BatchStatus,
    /// URLs removed as malformed, in removal order.
    pub pruned: Vec<PrunedUrl>,
    /// Every per-item error seen across all calls for this batch.
    pub diagnostics: Vec<ItemError>,
    /// Number of remote calls made.
    pub attempts: usize,
}

impl BatchOutcome {
    /// Returns the tracking id if the batch was accepted.
    #[must_use]
    pub fn tracking_id(&self) -> Option<&TrackingId> {
        match &self.status {
            BatchStatus::Accepted { tracking_id, .. } => Some(tracking_id),
            BatchStatus::Failed { .. } => None,
        }
    }
}

/// An accepted `(tracking id, urls)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBatch<'a> {
    /// Issued identifier.
    pub tracking_id: &'a TrackingId,
    /// URLs carried by the accepted request.
    pub urls: &'a [String],
}

/// Invocation-level classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalResult<'a> {
    /// At least one batch was accepted; never empty.
    Accepted(Vec<AcceptedBatch<'a>>),
    /// Nothing was accepted (or there was nothing to submit).
    NothingAccepted,
}

impl FinalResult<'_> {
    /// Space-joined tracking ids, or the legacy sentinel when nothing was accepted.
    ///
    /// For display only; never persist this value.
    #[must_use]
    pub fn display_ids(&self) -> String {
        match self {
            Self::Accepted(batches) => batches
                .iter()
                .map(|b| b.tracking_id.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Self::NothingAccepted => LEGACY_SENTINEL.to_string(),
        }
    }
}

/// Aggregated outcome of every batch of one invocation, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Per-batch outcomes.
    pub batches: Vec<BatchOutcome>,
}

impl SubmissionReport {
    /// Iterates accepted `(tracking id, urls)` pairs.
    pub fn accepted(&self) -> impl Iterator<Item = AcceptedBatch<'_>> {
        self.batches.iter().filter_map(|batch| match &batch.status {
            BatchStatus::Accepted { tracking_id, urls } => Some(AcceptedBatch { tracking_id, urls }),
            BatchStatus::Failed { .. } => None,
        })
    }

    /// URLs left in failed batches.
    #[must_use]
    pub fn unsubmitted(&self) -> Vec<&str> {
        self.batches
            .iter()
            .filter_map(|batch| match &batch.status {
                BatchStatus::Failed { unsubmitted, .. } => Some(unsubmitted),
                BatchStatus::Accepted { .. } => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// URLs removed as malformed across all batches.
    pub fn pruned(&self) -> impl Iterator<Item = &PrunedUrl> {
        self.batches.iter().flat_map(|batch| batch.pruned.iter())
    }

    /// Total remote calls made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.batches.iter().map(|b| b.attempts).sum()
    }

    /// Classifies the invocation.
    #[must_use]
    pub fn final_result(&self) -> FinalResult<'_> {
        let accepted: Vec<_> = self.accepted().collect();
        if accepted.is_empty() {
            FinalResult::NothingAccepted
        } else {
            FinalResult::Accepted(accepted)
        }
    }
}

/// Drives candidate URLs to the report service.
#[derive(Debug)]
pub struct SubmissionEngine<T> {
    transport: T,
    config: SubmitConfig,
}

impl<T: ReportTransport> SubmissionEngine<T> {
    /// Creates an engine over a transport.
    #[must_use]
    pub fn new(transport: T, config: SubmitConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the engine settings.
    #[must_use]
    pub fn config(&self) -> SubmitConfig {
        self.config
    }

    /// Splits `urls` into batches and submits each one.
    ///
    /// An empty set makes no remote call and yields an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] only for contract violations surfaced by the
    /// transport. Service rejections are recorded in the report.
    #[instrument(skip(self, urls), fields(candidates = urls.len()))]
    pub async fn submit_all(&self, urls: &CandidateUrls) -> Result<SubmissionReport, SubmitError> {
        let batches = split_batches(urls.as_slice(), self.config.max_batch_size);
        if batches.is_empty() {
            info!("Nothing to submit");
            return Ok(SubmissionReport::default());
        }
        info!(
            batches = batches.len(),
            max_batch_size = self.config.max_batch_size.get(),
            "Submitting candidate URLs"
        );

        let batches: Vec<BatchOutcome> =
            stream::iter(batches.into_iter().map(|batch| self.submit_batch(batch)))
                .buffered(self.config.batch_concurrency.get())
                .try_collect()
                .await?;

        Ok(SubmissionReport { batches })
    }

    /// Runs the narrowing loop for one batch until it reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::BatchTooLarge`] if `batch` exceeds the configured
    /// maximum and [`SubmitError::EmptyBatch`] if it is empty.
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn submit_batch(&self, batch: Vec<String>) -> Result<BatchOutcome, SubmitError> {
        let max = self.config.max_batch_size.get();
        if batch.len() > max {
            return Err(SubmitError::batch_too_large(batch.len(), max));
        }
        if batch.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }

        let mut current = batch;
        let mut pruned = Vec::new();
        let mut diagnostics = Vec::new();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, urls = current.len(), "submitting batch");

            let errors = match self.transport.submit(&current).await? {
                SubmissionOutcome::Accepted { tracking_id } => {
                    info!(%tracking_id, urls = current.len(), attempts, "Batch accepted");
                    return Ok(BatchOutcome {
                        status: BatchStatus::Accepted {
                            tracking_id,
                            urls: current,
                        },
                        pruned,
                        diagnostics,
                        attempts,
                    });
                }
                SubmissionOutcome::RejectedWholesale { reason } => {
                    warn!(%reason, urls = current.len(), attempts, "Batch rejected wholesale");
                    return Ok(failed(
                        BatchFailure::Wholesale(reason),
                        current,
                        pruned,
                        diagnostics,
                        attempts,
                    ));
                }
                SubmissionOutcome::PartiallyRejected { errors } => errors,
            };

            for error in &errors {
                log_item_error(error);
            }

            let before = current.len();
            let removed = prune(&mut current, &errors);
            pruned.extend(removed);
            diagnostics.extend(errors.iter().cloned());

            if current.is_empty() {
                warn!(attempts, "All URLs in batch were malformed");
                return Ok(failed(
                    BatchFailure::Exhausted,
                    current,
                    pruned,
                    diagnostics,
                    attempts,
                ));
            }
            if current.len() == before {
                warn!(
                    errors = errors.len(),
                    urls = current.len(),
                    attempts,
                    "Batch rejected and nothing prunable; giving up"
                );
                return Ok(failed(
                    BatchFailure::NotConverging { errors },
                    current,
                    pruned,
                    diagnostics,
                    attempts,
                ));
            }

            info!(
                removed = before - current.len(),
                remaining = current.len(),
                "Resubmitting batch without malformed URLs"
            );
        }
    }
}

fn failed(
    failure: BatchFailure,
    unsubmitted: Vec<String>,
    pruned: Vec<PrunedUrl>,
    diagnostics: Vec<ItemError>,
    attempts: usize,
) -> BatchOutcome {
    BatchOutcome {
        status: BatchStatus::Failed {
            failure,
            unsubmitted,
        },
        pruned,
        diagnostics,
        attempts,
    }
}

/// Removes every URL named by a format error from `current`.
///
/// Each distinct URL is removed at most once; names not in the batch are
/// ignored.
fn prune(current: &mut Vec<String>, errors: &[ItemError]) -> Vec<PrunedUrl> {
    let mut offending: Vec<(&str, &str)> = Vec::new();
    let mut seen = HashSet::new();
    for error in errors {
        if let Some(url) = error.prunable_url()
            && seen.insert(url)
        {
            offending.push((url, error.message.as_str()));
        }
    }
    if offending.is_empty() {
        return Vec::new();
    }

    let mut removed = Vec::new();
    current.retain(|url| {
        match offending.iter().find(|(bad, _)| *bad == url.as_str()) {
            Some((_, message)) => {
                removed.push(PrunedUrl {
                    url: url.clone(),
                    message: (*message).to_string(),
                });
                false
            }
            None => true,
        }
    });
    removed
}

fn log_item_error(error: &ItemError) {
    let url = error.url.as_deref().unwrap_or("-");
    match error.class {
        ErrorClass::FormatError => {
            info!(url, message = %error.message, "URL does not match url format");
        }
        ErrorClass::Duplicate => {
            info!(url, message = %error.message, "Duplicate submission reported");
        }
        ErrorClass::Unknown => {
            warn!(url, message = %error.message, "Unclassified error from report service");
        }
    }
}
