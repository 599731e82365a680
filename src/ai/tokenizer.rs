//! Token counting and word-boundary clamping
//!
//! The clamp never splits a word: it keeps whole whitespace-delimited words
//! while the running token count stays within the budget.

use tiktoken_rs::CoreBPE;

/// Counts tokens the way the target model's tokenizer does
pub trait TokenCounter {
    fn count(&self, text: &str) -> usize;
}

impl<T: TokenCounter + ?Sized> TokenCounter for Box<T> {
    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }
}

/// BPE tokenizer for OpenAI models
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Tokenizer for `model`, falling back to `cl100k_base` for unknown names
    pub fn for_model(model: &str) -> Result<Self, String> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(e) => {
                tracing::warn!(
                    "[Tokenizer] No tokenizer for model {} ({}), using cl100k_base",
                    model,
                    e
                );
                tiktoken_rs::cl100k_base()
                    .map_err(|e| format!("Failed to load cl100k_base tokenizer: {}", e))?
            }
        };
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// One token per whitespace-delimited word. Used when no model tokenizer is
/// available and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Result of clamping one chunk of text to a token budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClampedText {
    /// Selected words joined by single spaces
    pub text: String,
    /// Exact tokens consumed by the selected words
    pub tokens: usize,
    /// True when at least one word did not fit
    pub truncated: bool,
}

/// Keep the longest whole-word prefix of `text` whose token count is
/// `<= max_tokens`. Stops at the first word that would exceed the budget.
pub fn clamp_text_by_tokens(counter: &dyn TokenCounter, text: &str, max_tokens: usize) -> ClampedText {
    let mut selected: Vec<&str> = Vec::new();
    let mut tokens = 0usize;
    let mut truncated = false;

    for word in text.split_whitespace() {
        let word_tokens = counter.count(word);
        if tokens + word_tokens > max_tokens {
            truncated = true;
            break;
        }
        tokens += word_tokens;
        selected.push(word);
    }

    ClampedText {
        text: selected.join(" "),
        tokens,
        truncated,
    }
}
