//! HTTP client for the URL report endpoint.
//!
//! [`ReportClient`] performs exactly one POST per call and maps whatever comes
//! back (including transport failures) to a [`SubmissionOutcome`]. It never
//! retries; deciding what to resend is the engine's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::classify::ItemError;
use super::error::SubmitError;
use super::outcome::{SubmissionOutcome, TrackingId, WholesaleReason};
use crate::user_agent;

/// Netcraft URL report endpoint.
pub const DEFAULT_REPORT_ENDPOINT: &str = "https://report.netcraft.com/api/v3/report/urls";

/// Reason code sent with every report.
pub const DEFAULT_REASON: &str = "HMG";

/// Default HTTP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Seam between the engine and the network.
///
/// Tests drive the engine with scripted implementations; production uses
/// [`ReportClient`].
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// Submits one batch and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::EmptyBatch`] for an empty batch. Every response
    /// from the service, and every transport failure, is an `Ok` outcome.
    async fn submit(&self, urls: &[String]) -> Result<SubmissionOutcome, SubmitError>;
}

#[async_trait]
impl<'a, T: ReportTransport + ?Sized> ReportTransport for &'a T {
    async fn submit(&self, urls: &[String]) -> Result<SubmissionOutcome, SubmitError> {
        (**self).submit(urls).await
    }
}

/// Static request settings for [`ReportClient`].
#[derive(Debug, Clone)]
pub struct ReportClientConfig {
    /// Report endpoint.
    pub endpoint: Url,
    /// Reporter identity sent as `email`.
    pub email: String,
    /// Reason code sent as `reason`.
    pub reason: String,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Total request timeout.
    pub read_timeout: Duration,
}

impl ReportClientConfig {
    /// Creates a config for the default endpoint and reason code.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in endpoint; the `Result` mirrors
    /// [`with_endpoint`](Self::with_endpoint).
    pub fn new(email: impl Into<String>) -> Result<Self, SubmitError> {
        Self::with_endpoint(DEFAULT_REPORT_ENDPOINT, email)
    }

    /// Creates a config for a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::InvalidEndpoint`] if `endpoint` does not parse or
    /// is not http(s).
    pub fn with_endpoint(endpoint: &str, email: impl Into<String>) -> Result<Self, SubmitError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            email: email.into(),
            reason: DEFAULT_REASON.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        })
    }
}

/// Validates a report endpoint string.
///
/// # Errors
///
/// Returns [`SubmitError::InvalidEndpoint`] for unparseable or non-http(s) URLs.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, SubmitError> {
    let parsed =
        Url::parse(endpoint).map_err(|e| SubmitError::invalid_endpoint(endpoint, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(SubmitError::invalid_endpoint(
            endpoint,
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}

/// HTTP implementation of [`ReportTransport`].
#[derive(Debug, Clone)]
pub struct ReportClient {
    client: Client,
    config: ReportClientConfig,
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    email: &'a str,
    reason: &'a str,
    urls: Vec<ReportUrl<'a>>,
}

#[derive(Debug, Serialize)]
struct ReportUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct AcceptedBody {
    #[serde(default)]
    uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RejectedBody {
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

impl ReportClient {
    /// Builds a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::ClientBuild`] if reqwest cannot build the client.
    pub fn new(config: ReportClientConfig) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .gzip(true)
            .user_agent(user_agent::default_report_user_agent())
            .build()
            .map_err(|source| SubmitError::ClientBuild { source })?;
        Ok(Self { client, config })
    }

    /// Returns the endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    fn request_body<'a>(&'a self, urls: &'a [String]) -> ReportRequest<'a> {
        ReportRequest {
            email: &self.config.email,
            reason: &self.config.reason,
            urls: urls.iter().map(|url| ReportUrl { url }).collect(),
        }
    }
}

#[async_trait]
impl ReportTransport for ReportClient {
    #[instrument(skip(self, urls), fields(batch_size = urls.len(), endpoint = %self.config.endpoint))]
    async fn submit(&self, urls: &[String]) -> Result<SubmissionOutcome, SubmitError> {
        if urls.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }

        let response = match self
            .client
            .post(self.config.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&self.request_body(urls))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(transport_failure(&e)),
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(status = status.as_u16(), "report endpoint responded");

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Ok(transport_failure(&e)),
        };

        Ok(interpret_response(status, retry_after, &body))
    }
}

fn transport_failure(error: &reqwest::Error) -> SubmissionOutcome {
    let reason = if error.is_timeout() {
        WholesaleReason::Timeout
    } else {
        WholesaleReason::Transport {
            message: error.to_string(),
        }
    };
    warn!(%reason, "report request failed in transport");
    SubmissionOutcome::RejectedWholesale { reason }
}

/// Maps a raw HTTP response to a [`SubmissionOutcome`].
///
/// Kept free of any I/O so the mapping can be tested directly.
#[must_use]
pub fn interpret_response(
    status: StatusCode,
    retry_after: Option<String>,
    body: &str,
) -> SubmissionOutcome {
    match status {
        StatusCode::OK => interpret_accepted(body),
        StatusCode::BAD_REQUEST => interpret_rejected(body),
        StatusCode::TOO_MANY_REQUESTS => SubmissionOutcome::RejectedWholesale {
            reason: WholesaleReason::RateLimited { retry_after },
        },
        s if s.is_server_error() => SubmissionOutcome::RejectedWholesale {
            reason: WholesaleReason::ServerError { status: s.as_u16() },
        },
        s => SubmissionOutcome::RejectedWholesale {
            reason: WholesaleReason::UnexpectedStatus { status: s.as_u16() },
        },
    }
}

fn interpret_accepted(body: &str) -> SubmissionOutcome {
    let parsed: AcceptedBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return malformed(StatusCode::OK, format!("invalid JSON body: {e}")),
    };
    match parsed.uuid.as_deref().and_then(TrackingId::parse) {
        Some(tracking_id) => SubmissionOutcome::Accepted { tracking_id },
        None => malformed(StatusCode::OK, "accepted without a usable uuid"),
    }
}

fn interpret_rejected(body: &str) -> SubmissionOutcome {
    let parsed: RejectedBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return malformed(
                StatusCode::BAD_REQUEST,
                format!("missing or invalid details array: {e}"),
            );
        }
    };

    let errors = parsed
        .details
        .into_iter()
        .map(|detail| {
            let url = detail
                .input
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            ItemError::new(url, detail.message.unwrap_or_default())
        })
        .collect();

    SubmissionOutcome::PartiallyRejected { errors }
}

fn malformed(status: StatusCode, detail: impl Into<String>) -> SubmissionOutcome {
    SubmissionOutcome::RejectedWholesale {
        reason: WholesaleReason::MalformedResponse {
            status: status.as_u16(),
            detail: detail.into(),
        },
    }
}
