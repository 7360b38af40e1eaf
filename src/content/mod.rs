//! Content acquisition for reported files.
//!
//! A report is a single file: either an image (screenshot of an SMS, email,
//! ...) or a text document. The file type is decided by extension:
//!
//! - image extensions go through a [`TextRecognizer`] (Tesseract by default)
//! - document extensions are read as text
//! - anything else is unsupported and yields no content
//!
//! # Example
//!
//! ```no_run
//! use reporter_core::content::{ContentConfig, ContentReader, TesseractCli};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = ContentReader::new(ContentConfig::default(), TesseractCli::default());
//! if let Some(text) = reader.read(Path::new("/input/report.png")).await? {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::ContentError;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Image extensions recognized by default.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff"];

/// Document extensions recognized by default.
pub const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] = &["txt", "csv", "doc", "rtf"];

/// Default OCR binary.
pub const DEFAULT_TESSERACT_BINARY: &str = "tesseract";

/// How a file will be turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// OCR.
    Image,
    /// Read as text.
    Document,
    /// Not handled.
    Unsupported,
}

/// Supported extension lists (lowercase, without the dot).
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Extensions treated as images.
    pub image_extensions: Vec<String>,
    /// Extensions treated as text documents.
    pub document_extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            document_extensions: DEFAULT_DOCUMENT_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl ContentConfig {
    /// Classifies `path` by its extension, case-insensitively.
    #[must_use]
    pub fn kind_of(&self, path: &Path) -> ContentKind {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return ContentKind::Unsupported;
        };
        let ext = ext.to_ascii_lowercase();
        if self.image_extensions.iter().any(|e| *e == ext) {
            ContentKind::Image
        } else if self.document_extensions.iter().any(|e| *e == ext) {
            ContentKind::Document
        } else {
            ContentKind::Unsupported
        }
    }
}

/// Turns an image into text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Returns the recognized text of the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Ocr`] if recognition fails.
    async fn recognize(&self, path: &Path) -> Result<String, ContentError>;
}

/// [`TextRecognizer`] backed by the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT_BINARY)
    }
}

impl TesseractCli {
    /// Uses the given tesseract binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn recognize(&self, path: &Path) -> Result<String, ContentError> {
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .output()
            .await
            .map_err(|e| {
                let missing = e.kind() == std::io::ErrorKind::NotFound;
                ContentError::ocr(path, format!("could not run {}: {e}", self.binary.display()), missing)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContentError::ocr(
                path,
                format!("tesseract exited with {}: {}", output.status, stderr.trim()),
                false,
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR complete");
        Ok(text)
    }
}

/// Reads reported files into text.
#[derive(Debug, Clone)]
pub struct ContentReader<R> {
    config: ContentConfig,
    recognizer: R,
}

impl<R: TextRecognizer> ContentReader<R> {
    /// Creates a reader with the given extension lists and OCR backend.
    #[must_use]
    pub fn new(config: ContentConfig, recognizer: R) -> Self {
        Self { config, recognizer }
    }

    /// Returns the extension configuration.
    #[must_use]
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Reads `path` into text.
    ///
    /// Returns `Ok(None)` for unsupported file types so callers treat them as
    /// "nothing to report".
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the file is missing, unreadable, or OCR fails.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn read(&self, path: &Path) -> Result<Option<String>, ContentError> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| ContentError::io(path, e))?
        {
            return Err(ContentError::NotFound {
                path: path.to_path_buf(),
            });
        }

        match self.config.kind_of(path) {
            ContentKind::Image => {
                info!("Running OCR on image");
                self.recognizer.recognize(path).await.map(Some)
            }
            ContentKind::Document => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| ContentError::io(path, e))?;
                info!(bytes = bytes.len(), "Read text document");
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            ContentKind::Unsupported => {
                warn!(
                    "Unable to process file: type is not stated in the file name or is not supported"
                );
                Ok(None)
            }
        }
    }
}
