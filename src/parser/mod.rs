//! Candidate URL extraction from reported content.
//!
//! Reported content is free text (typed, pasted or OCR'd). This module finds
//! URL-like tokens in it and collects them into an ordered, deduplicated
//! [`CandidateUrls`] set.
//!
//! # Example
//!
//! ```
//! use reporter_core::parser::extract_candidate_urls;
//!
//! let urls = extract_candidate_urls(
//!     "Pay the fee at http://parcel.example/pay, or http://parcel.example/pay today",
//! );
//! assert_eq!(urls.len(), 1);
//! assert_eq!(urls.as_slice()[0], "http://parcel.example/pay");
//! ```

mod url;

pub use url::scan_urls;

use std::collections::HashSet;

use tracing::{debug, info};

/// Ordered, deduplicated set of candidate URLs.
///
/// Iteration order is first-seen order, so batches and logs are reproducible
/// for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateUrls {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl CandidateUrls {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `url` unless already present. Returns whether it was added.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    /// Number of distinct URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in first-seen order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    /// Iterates URLs in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.urls.iter()
    }
}

impl FromIterator<String> for CandidateUrls {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl<'a> IntoIterator for &'a CandidateUrls {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Extracts the candidate URL set from raw text.
///
/// Empty or URL-free input yields an empty set, never an error.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn extract_candidate_urls(input: &str) -> CandidateUrls {
    let found = scan_urls(input);
    let total = found.len();
    let urls: CandidateUrls = found.into_iter().map(str::to_string).collect();

    if total > urls.len() {
        debug!(duplicates = total - urls.len(), "Dropped repeated URLs");
    }
    info!(candidates = urls.len(), "Extracted candidate URLs");
    urls
}
