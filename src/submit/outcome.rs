//! Outcome of a single remote submission call.

use std::fmt;

use super::classify::ItemError;

/// Placeholder older tooling stored when no tracking id was issued.
///
/// It is never a valid [`TrackingId`]; it only appears in human-facing output.
pub const LEGACY_SENTINEL: &str = "0000";

/// Identifier the report service issues for an accepted submission.
///
/// Always non-empty and never equal to [`LEGACY_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackingId(String);

impl TrackingId {
    /// Validates a raw identifier from the service.
    ///
    /// Returns `None` for empty/blank ids and for the legacy sentinel.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == LEGACY_SENTINEL {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why the service (or the transport) rejected a batch as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WholesaleReason {
    /// HTTP 429.
    RateLimited {
        /// Raw `Retry-After` header, if sent.
        retry_after: Option<String>,
    },
    /// HTTP 5xx.
    ServerError {
        /// Status code.
        status: u16,
    },
    /// Any other status the contract does not cover.
    UnexpectedStatus {
        /// Status code.
        status: u16,
    },
    /// 200 or 400 whose body did not match the documented shape.
    MalformedResponse {
        /// Status code.
        status: u16,
        /// What was wrong with the body.
        detail: String,
    },
    /// The request timed out.
    Timeout,
    /// Connection-level failure (DNS, refused, TLS, ...).
    Transport {
        /// Error text from the HTTP client.
        message: String,
    },
}

impl fmt::Display for WholesaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited {
                retry_after: Some(after),
            } => write!(f, "rate limited (HTTP 429, retry after {after})"),
            Self::RateLimited { retry_after: None } => write!(f, "rate limited (HTTP 429)"),
            Self::ServerError { status } => write!(f, "server error (HTTP {status})"),
            Self::UnexpectedStatus { status } => write!(f, "unexpected status (HTTP {status})"),
            Self::MalformedResponse { status, detail } => {
                write!(f, "malformed response (HTTP {status}): {detail}")
            }
            Self::Timeout => f.write_str("timeout"),
            Self::Transport { message } => write!(f, "transport error: {message}"),
        }
    }
}

/// Result of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The service accepted the batch.
    Accepted {
        /// Identifier issued for the batch.
        tracking_id: TrackingId,
    },
    /// The batch was rejected without per-item detail. Not retried.
    RejectedWholesale {
        /// Why.
        reason: WholesaleReason,
    },
    /// The service listed per-item validation errors.
    PartiallyRejected {
        /// Every descriptor the service returned, in order.
        errors: Vec<ItemError>,
    },
}
