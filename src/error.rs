//! Error types
//!
//! One `thiserror` enum per layer. Per-file errors (extraction, classification)
//! are turned into routing decisions by the pipeline; only `ConfigError` and
//! `OrganizerError` ever abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or incomplete configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unknown attribute '{0}' (expected one of: content_type, author, title, year, topic, subtopic)")]
    UnknownAttribute(String),

    #[error("Separator '{0}' is not allowed. Please use one of '_', '-', '.', ' '")]
    DisallowedSeparator(String),

    #[error("filenameFromAttributes must name at least one attribute")]
    EmptyFilenameAttributes,

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("No API key found. Set apiKey in the config file or the OPENAI_API_KEY environment variable")]
    MissingApiKey,
}

/// Failure to pull text out of a PDF.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Page ceiling reached before the token budget was filled.
    #[error("Content not available within the first {pages} pages")]
    ContentNotAvailable { pages: usize },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Failed to read PDF file: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport-level failure talking to the model backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode model response: {0}")]
    Decode(String),

    #[error("Model returned an empty reply")]
    EmptyReply,
}

/// Classification failures. All recoverable: the file goes to `unclassified/`.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    #[error("Invalid classification: {0}")]
    InvalidClassification(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Run-level failures that abort before any file is touched.
#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("Unsupported path {0}: not a .{1} file nor a directory")]
    UnsupportedPath(PathBuf, String),

    #[error("Output folder {0} already contains files")]
    OutputNotEmpty(PathBuf),

    #[error("Output path {0} exists and is not a directory")]
    OutputNotDirectory(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type OrganizerResult<T> = Result<T, OrganizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_not_available_message() {
        let err = ExtractError::ContentNotAvailable { pages: 25 };
        assert_eq!(err.to_string(), "Content not available within the first 25 pages");
    }

    #[test]
    fn test_backend_error_is_transparent_in_classify_error() {
        let err: ClassifyError = BackendError::EmptyReply.into();
        assert_eq!(err.to_string(), "Model returned an empty reply");
    }

    #[test]
    fn test_config_error_converts_to_organizer_error() {
        let err: OrganizerError = ConfigError::MissingApiKey.into();
        assert!(matches!(err, OrganizerError::Config(ConfigError::MissingApiKey)));
    }
}
