//! Error types for content acquisition.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading reported content.
///
/// An unsupported file type is not an error; see
/// [`ContentReader::read`](super::ContentReader::read).
#[derive(Debug, Error)]
pub enum ContentError {
    /// The input file does not exist.
    #[error("input file not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The input file exists but could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The OCR engine could not be started or exited with an error.
    #[error("OCR failed for {path}: {reason}\n  Suggestion: {suggestion}")]
    Ocr {
        /// The image being recognized.
        path: PathBuf,
        /// What went wrong.
        reason: String,
        /// How to fix it.
        suggestion: &'static str,
    },
}

impl ContentError {
    /// Creates an IO error, mapping `NotFound` to [`ContentError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Creates an OCR error.
    ///
    /// A missing binary gets an install hint; anything else points at the image.
    pub fn ocr(path: impl Into<PathBuf>, reason: impl Into<String>, binary_missing: bool) -> Self {
        let suggestion = if binary_missing {
            "Install tesseract-ocr and make sure it is on PATH."
        } else {
            "Check that the image is readable and not corrupted."
        };
        Self::Ocr {
            path: path.into(),
            reason: reason.into(),
            suggestion,
        }
    }
}
