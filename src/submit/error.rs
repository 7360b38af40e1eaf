//! Error types for the submission module.
//!
//! Validation problems reported by the service are *not* errors here: they are
//! [`SubmissionOutcome`](super::SubmissionOutcome) values handled by the engine.
//! `SubmitError` covers caller contract violations and client setup failures.

use thiserror::Error;

/// Errors that abort a submission before any outcome can be produced.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A batch with no URLs was handed to the remote call.
    #[error("refusing to submit an empty batch")]
    EmptyBatch,

    /// A batch larger than the configured maximum was handed to the remote call.
    #[error("batch of {size} URLs exceeds the maximum batch size of {max}")]
    BatchTooLarge {
        /// Number of URLs in the offending batch.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The configured report endpoint is not a usable http(s) URL.
    #[error("invalid report endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl SubmitError {
    /// Creates a batch-too-large error.
    #[must_use]
    pub fn batch_too_large(size: usize, max: usize) -> Self {
        Self::BatchTooLarge { size, max }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
