//! Token-budgeted content extraction
//!
//! Walks a PDF page by page, clamping each page to the tokens left in the
//! budget, and stops when the budget is spent, a page had to be cut, or the
//! document ends. Running past the page ceiling without spending the budget
//! is reported as `ContentNotAvailable`.

use std::path::Path;

use super::parser::PageSource;
use crate::ai::tokenizer::{clamp_text_by_tokens, TokenCounter};
use crate::error::ExtractError;

/// Default hard ceiling on pages read per document
pub const DEFAULT_MAX_PAGES: usize = 25;

/// Text pulled from the first pages of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    /// Tokens consumed, always `<= budget`
    pub tokens: usize,
    /// Pages that contributed (including empty ones)
    pub pages_read: usize,
}

impl ExtractedContent {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub struct TokenBudgetedExtractor<S, T> {
    source: S,
    counter: T,
    budget: usize,
    max_pages: usize,
}

impl<S: PageSource, T: TokenCounter> TokenBudgetedExtractor<S, T> {
    pub fn new(source: S, counter: T, budget: usize) -> Self {
        Self {
            source,
            counter,
            budget,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Extract at most `budget` tokens of text starting at page 0
    pub fn extract(&mut self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let mut text = String::new();
        let mut tokens = 0usize;

        // Reading one page past the ceiling tells a document that ends exactly there
        // apart from one that keeps going
        for page_index in 0..=self.max_pages {
            let Some(page) = self.source.page_text(path, page_index)? else {
                tracing::debug!(
                    "[Extractor] End of document after {} pages ({} tokens): {}",
                    page_index,
                    tokens,
                    path.display()
                );
                return Ok(ExtractedContent {
                    text,
                    tokens,
                    pages_read: page_index,
                });
            };
            if page_index == self.max_pages {
                break;
            }

            let clamped = clamp_text_by_tokens(&self.counter, &page, self.budget - tokens);
            tokens += clamped.tokens;
            if !clamped.text.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&clamped.text);
            }

            if tokens >= self.budget || clamped.truncated {
                tracing::debug!(
                    "[Extractor] Budget reached on page {} ({}/{} tokens): {}",
                    page_index + 1,
                    tokens,
                    self.budget,
                    path.display()
                );
                return Ok(ExtractedContent {
                    text,
                    tokens,
                    pages_read: page_index + 1,
                });
            }
        }

        tracing::warn!(
            "[Extractor] Only {} of {} tokens within {} pages: {}",
            tokens,
            self.budget,
            self.max_pages,
            path.display()
        );
        Err(ExtractError::ContentNotAvailable {
            pages: self.max_pages,
        })
    }
}
