pub mod classifier;
pub mod client;
pub mod credentials;
pub mod http_client;
pub mod json_parser;
pub mod prompts;
pub mod tokenizer;

pub use classifier::{Classifier, LlmClassifier};
pub use client::{ModelBackend, OpenAiClient};
pub use credentials::*;
pub use prompts::build_classification_prompt;
pub use tokenizer::{clamp_text_by_tokens, ClampedText, TiktokenCounter, TokenCounter, WordCounter};
