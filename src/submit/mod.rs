//! URL submission to the phishing report service.
//!
//! This module turns a [`CandidateUrls`](crate::parser::CandidateUrls) set into
//! accepted reports:
//!
//! - [`split_batches`] partitions the set into size-bounded batches
//! - [`ReportClient`] performs one POST per batch and classifies the response
//! - [`classify_message`] maps per-item service messages to [`ErrorClass`]
//! - [`SubmissionEngine`] prunes malformed URLs, resubmits, and aggregates
//!   every batch into a [`SubmissionReport`]

mod batch;
mod classify;
mod client;
mod engine;
mod error;
mod outcome;

pub use batch::{DEFAULT_MAX_BATCH_SIZE, split_batches};
pub use classify::{ErrorClass, ItemError, classify_message};
pub use client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_REASON,
    DEFAULT_REPORT_ENDPOINT, ReportClient, ReportClientConfig, ReportTransport,
    interpret_response, parse_endpoint,
};
pub use engine::{
    AcceptedBatch, BatchFailure, BatchOutcome, BatchStatus, DEFAULT_BATCH_CONCURRENCY,
    FinalResult, PrunedUrl, SubmissionEngine, SubmissionReport, SubmitConfig,
};
pub use error::SubmitError;
pub use outcome::{LEGACY_SENTINEL, SubmissionOutcome, TrackingId, WholesaleReason};
