//! Document text extraction
//!
//! `parser` reads page text out of PDFs; `extractor` accumulates it under a
//! token budget for the classification prompt.

pub mod extractor;
pub mod parser;

pub use extractor::{ExtractedContent, TokenBudgetedExtractor, DEFAULT_MAX_PAGES};
pub use parser::{PageSource, PdfPageReader};
