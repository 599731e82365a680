//! Run state and per-file outcomes
//!
//! `RunState` is owned by the pipeline and handed out as snapshots after each
//! file, so callers can display progress without touching the run itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::types::ClassificationRecord;

/// Why a file went to `unclassified/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnclassifiedReason {
    /// No text at all, typically a scanned PDF
    NoText,
    /// Page ceiling hit before the token budget filled
    ContentNotAvailable { pages: usize },
    /// The PDF could not be read
    ExtractFailed(String),
    /// Model reply unusable or the backend call failed
    ClassificationFailed(String),
    /// Classified, but the classified destination could not be written
    PlacementFailed(String),
}

impl UnclassifiedReason {
    /// Whether this routing counts as an error for the run
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ExtractFailed(_) | Self::ClassificationFailed(_) | Self::PlacementFailed(_)
        )
    }
}

impl fmt::Display for UnclassifiedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoText => write!(f, "no text extracted"),
            Self::ContentNotAvailable { pages } => {
                write!(f, "content not available within the first {} pages", pages)
            }
            Self::ExtractFailed(e) => write!(f, "{}", e),
            Self::ClassificationFailed(e) => write!(f, "{}", e),
            Self::PlacementFailed(e) => write!(f, "classified destination unavailable: {}", e),
        }
    }
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Classified {
        destination: PathBuf,
        record: ClassificationRecord,
    },
    Unclassified {
        destination: PathBuf,
        reason: UnclassifiedReason,
    },
    /// Placement failed; the source was left in place
    Failed { error: String },
}

impl FileOutcome {
    pub fn is_error(&self) -> bool {
        match self {
            Self::Classified { .. } => false,
            Self::Unclassified { reason, .. } => reason.is_failure(),
            Self::Failed { .. } => true,
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Classified { destination, .. } | Self::Unclassified { destination, .. } => {
                Some(destination)
            }
            Self::Failed { .. } => None,
        }
    }
}

/// Progress of one organize run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    /// 0-100
    pub progress: u8,
    /// Status line for the last processed file
    pub message: String,
    /// Set iff the last file's outcome was an error
    pub error: bool,
    pub total_files: usize,
    pub processed: usize,
    pub classified: usize,
    pub unclassified: usize,
    pub failed: usize,
    pub log_path: Option<PathBuf>,
}

impl RunState {
    pub fn new(total_files: usize, log_path: Option<PathBuf>) -> Self {
        let started_at = Utc::now();
        Self {
            run_id: run_id_for(&started_at),
            started_at,
            progress: 0,
            message: format!("Starting: {} files to process", total_files),
            error: false,
            total_files,
            processed: 0,
            classified: 0,
            unclassified: 0,
            failed: 0,
            log_path,
        }
    }

    /// Fold one file's outcome into the state
    pub fn record(&mut self, index: usize, file: &Path, outcome: &FileOutcome) {
        self.processed += 1;
        self.progress = progress_percent(index, self.total_files);
        self.error = outcome.is_error();

        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());

        self.message = match outcome {
            FileOutcome::Classified { destination, .. } => {
                self.classified += 1;
                format!("Classified {} -> {}", name, destination.display())
            }
            FileOutcome::Unclassified { destination, reason } => {
                self.unclassified += 1;
                format!("Unclassified {} ({}) -> {}", name, reason, destination.display())
            }
            FileOutcome::Failed { error } => {
                self.failed += 1;
                format!("Failed {}: {}", name, error)
            }
        };
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total_files
    }
}

/// `100 * (index + 1) / total`, clamped to 100
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (((index + 1) * 100) / total).min(100) as u8
}

/// `run-<UTC timestamp>`, also used for the log file name
pub fn run_id_for(time: &DateTime<Utc>) -> String {
    format!("run-{}", time.format("%Y%m%dT%H%M%SZ"))
}

/// Yielded once per processed file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// Zero-based position in the input list
    pub index: usize,
    pub file: PathBuf,
    pub outcome: FileOutcome,
    /// Snapshot after this file
    pub state: RunState,
}

/// Final report of a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub total_files: usize,
    pub classified: usize,
    pub unclassified: usize,
    pub failed: usize,
    pub elapsed_secs: i64,
    pub log_path: Option<PathBuf>,
}

impl From<&RunState> for RunSummary {
    fn from(state: &RunState) -> Self {
        Self {
            run_id: state.run_id.clone(),
            total_files: state.total_files,
            classified: state.classified,
            unclassified: state.unclassified,
            failed: state.failed,
            elapsed_secs: (Utc::now() - state.started_at).num_seconds(),
            log_path: state.log_path.clone(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} classified, {} unclassified, {} failed ({}s)",
            self.total_files, self.classified, self.unclassified, self.failed, self.elapsed_secs
        )?;
        if let Some(log) = &self.log_path {
            write!(f, "\nLog: {}", log.display())?;
        }
        Ok(())
    }
}
