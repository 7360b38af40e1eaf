//! Classification of per-item validation messages returned by the report service.
//!
//! The service reports per-URL problems as free text. All knowledge of that
//! wording lives in [`classify_message`]; adding a new class means adding a
//! variant and one match arm here.

use std::fmt;

/// Marker the service uses for URLs it has already seen.
const DUPLICATE_MARKER: &str = "Duplicate";

/// Marker the service uses for malformed URL entries.
const FORMAT_ERROR_MARKER: &str = "Does not match url format";

/// Classification of a single validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The URL (or the whole submission) was already reported.
    Duplicate,
    /// The URL is not a valid URL as far as the service is concerned.
    /// These are the only entries the engine prunes.
    FormatError,
    /// Anything the taxonomy does not recognize yet.
    Unknown,
}

impl ErrorClass {
    /// Returns the stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::FormatError => "format_error",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the engine may remove the offending URL and resubmit.
    #[must_use]
    pub fn is_prunable(self) -> bool {
        matches!(self, Self::FormatError)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a raw service message to an [`ErrorClass`].
///
/// Matching is by substring. When a message carries both markers the format
/// error wins, since that is the class that lets the batch make progress.
#[must_use]
pub fn classify_message(message: &str) -> ErrorClass {
    if message.contains(FORMAT_ERROR_MARKER) {
        ErrorClass::FormatError
    } else if message.contains(DUPLICATE_MARKER) {
        ErrorClass::Duplicate
    } else {
        ErrorClass::Unknown
    }
}

/// One per-item error descriptor from a partial rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    /// Offending URL, when the service named one.
    pub url: Option<String>,
    /// Classification of `message`.
    pub class: ErrorClass,
    /// Raw message text as sent by the service.
    pub message: String,
}

impl ItemError {
    /// Builds a descriptor and classifies its message.
    #[must_use]
    pub fn new(url: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            url,
            class: classify_message(&message),
            message,
        }
    }

    /// Returns the offending URL if this descriptor allows pruning it.
    #[must_use]
    pub fn prunable_url(&self) -> Option<&str> {
        if self.class.is_prunable() {
            self.url.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "[{}] {} ({url})", self.class, self.message),
            None => write!(f, "[{}] {}", self.class, self.message),
        }
    }
}
