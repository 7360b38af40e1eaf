//! URL Reporter Core Library
//!
//! This library provides the core functionality for the url-reporter tool,
//! which turns reported content (screenshots, text documents) into phishing
//! URL reports and keeps an audit log of what was accepted.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`content`] - File type detection, text documents and OCR
//! - [`parser`] - Candidate URL extraction from free text
//! - [`submit`] - Batching, the report client, and the prune-and-resubmit engine
//! - [`record`] - Submission audit log
//! - [`db`] - Database connection and schema management
//! - [`pipeline`] - One invocation end to end

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod content;
pub mod db;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod submit;
mod user_agent;

// Re-export commonly used types
pub use content::{ContentConfig, ContentError, ContentReader, TesseractCli, TextRecognizer};
pub use db::{Database, DbError};
pub use parser::{CandidateUrls, extract_candidate_urls};
pub use pipeline::{InvocationSummary, PipelineError, run_report};
pub use record::{OutcomeRecorder, RecordError, SubmissionLog, SubmissionRecord};
pub use submit::{
    FinalResult, ReportClient, ReportClientConfig, SubmissionEngine, SubmissionOutcome,
    SubmissionReport, SubmitConfig, SubmitError, TrackingId,
};
