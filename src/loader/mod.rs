//! Document loader
//!
//! Reads a PDF from disk and produces one [`Segment`] per page, each tagged
//! with its 1-based page number. Extraction runs on a blocking thread since
//! `pdf-extract` is synchronous.

use std::path::{Path, PathBuf};

use crate::errors::{RagError, Result};
use crate::types::Segment;

/// Loads a PDF document into page segments
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    /// Create a loader for the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract all pages as segments
    ///
    /// Fails with [`RagError::NotFound`] before touching the parser when the
    /// path does not exist, and [`RagError::Parse`] when the file is not a
    /// well-formed PDF. Pages with no extractable text are kept so page
    /// numbering stays aligned with the source document.
    pub async fn load(&self) -> Result<Vec<Segment>> {
        if !self.path.exists() {
            return Err(RagError::NotFound {
                path: self.path.clone(),
            });
        }

        let path = self.path.clone();
        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&path))
            .await
            .map_err(|e| RagError::Generic(format!("extraction task failed: {}", e)))?
            .map_err(|e| RagError::Parse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let segments = pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Segment::new(text, i + 1))
            .collect();

        Ok(segments)
    }
}
