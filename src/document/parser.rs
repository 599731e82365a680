//! PDF page text backend
//!
//! Pure Rust text extraction via pdf-extract, one page at a time. The whole
//! document is decoded on first access and pages are served from memory, so
//! walking pages 0, 1, 2... reads the file only once.

use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Source of per-page plain text.
///
/// Returns `Ok(None)` once `page_index` is past the last page.
pub trait PageSource {
    fn page_text(&mut self, path: &Path, page_index: usize) -> Result<Option<String>, ExtractError>;
}

impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn page_text(&mut self, path: &Path, page_index: usize) -> Result<Option<String>, ExtractError> {
        (**self).page_text(path, page_index)
    }
}

/// Page reader backed by pdf-extract
#[derive(Debug, Default)]
pub struct PdfPageReader {
    /// Pages of the most recently opened document
    cached: Option<(PathBuf, Vec<String>)>,
}

impl PdfPageReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(path: &Path) -> Result<Vec<String>, ExtractError> {
        tracing::debug!("[PdfReader] Decoding {}", path.display());

        let bytes = std::fs::read(path)?;

        // pdf-extract can panic on malformed fonts/glyphs
        let pages = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                tracing::warn!("[PdfReader] Extraction FAILED for {}: {}", path.display(), e);
                return Err(ExtractError::Pdf(e.to_string()));
            }
            Err(_panic) => {
                tracing::error!(
                    "[PdfReader] Extraction PANICKED for {} - likely malformed font/glyph",
                    path.display()
                );
                return Err(ExtractError::Pdf(
                    "extraction panicked - likely contains malformed fonts".to_string(),
                ));
            }
        };

        tracing::debug!(
            "[PdfReader] {} pages decoded from {}",
            pages.len(),
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        Ok(pages.iter().map(|p| clean_text(p)).collect())
    }
}

impl PageSource for PdfPageReader {
    fn page_text(&mut self, path: &Path, page_index: usize) -> Result<Option<String>, ExtractError> {
        let is_cached = matches!(&self.cached, Some((cached_path, _)) if cached_path == path);
        if !is_cached {
            let pages = Self::load(path)?;
            self.cached = Some((path.to_path_buf(), pages));
        }

        Ok(self
            .cached
            .as_ref()
            .and_then(|(_, pages)| pages.get(page_index).cloned()))
    }
}

/// Trim every line and drop blank ones
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
