//! Organizer pipeline
//!
//! Per file: extract -> build prompt -> classify -> route -> place. Every
//! per-file failure becomes a routing decision; only input resolution and the
//! output root precondition can stop a run, and both happen in `start` before
//! any file is touched.
//!
//! `start` returns an iterator that processes one file per `next()` call, so
//! the caller decides when to report progress.

use std::path::{Path, PathBuf};

use super::job::{FileOutcome, RunState, RunSummary, StepResult, UnclassifiedReason};
use super::naming::AttributePathBuilder;
use super::placement::{place_file, prepare_output_root, PlacementMode, UNCLASSIFIED_DIR};
use super::scanner::list_files;
use super::types::{Attribute, ClassificationRecord};
use crate::ai::classifier::Classifier;
use crate::ai::prompts::build_classification_prompt;
use crate::ai::tokenizer::TokenCounter;
use crate::config::OrganizerConfig;
use crate::document::extractor::TokenBudgetedExtractor;
use crate::document::parser::PageSource;
use crate::error::{ExtractError, OrganizerResult};

pub const PDF_EXTENSION: &str = "pdf";

pub struct OrganizerPipeline<S, T, C> {
    config: OrganizerConfig,
    extractor: TokenBudgetedExtractor<S, T>,
    classifier: C,
    log_path: Option<PathBuf>,
}

impl<S, T, C> OrganizerPipeline<S, T, C>
where
    S: PageSource,
    T: TokenCounter,
    C: Classifier,
{
    pub fn new(
        config: OrganizerConfig,
        extractor: TokenBudgetedExtractor<S, T>,
        classifier: C,
    ) -> Self {
        Self {
            config,
            extractor,
            classifier,
            log_path: None,
        }
    }

    /// Log file reported through `RunState::log_path`
    pub fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }

    /// Resolve the input, prepare the output root and return the run.
    pub fn start(self, input: &Path, output_root: &Path) -> OrganizerResult<OrganizerRun<S, T, C>> {
        let input = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());
        let files = list_files(&input, PDF_EXTENSION)?;
        prepare_output_root(output_root, self.config.require_empty_output)?;

        let state = RunState::new(files.len(), self.log_path.clone());
        tracing::info!(
            "[Pipeline] {} started: {} files from {} into {} ({})",
            state.run_id,
            files.len(),
            input.display(),
            output_root.display(),
            if self.config.move_instead_of_copy { "move" } else { "copy" }
        );

        Ok(OrganizerRun {
            pipeline: self,
            files,
            next_index: 0,
            output_root: output_root.to_path_buf(),
            state,
        })
    }

    /// Run one file through the whole state machine
    pub fn process_file(&mut self, file: &Path, output_root: &Path) -> FileOutcome {
        let mode = PlacementMode::from_move_flag(self.config.move_instead_of_copy);

        match self.classify_file(file) {
            Ok(record) => {
                let builder = AttributePathBuilder::new(&self.config);
                let dest_dir = output_root.join(builder.build_subdirectory(&record));
                let file_name = format!("{}.{}", builder.build_filename(&record), PDF_EXTENSION);

                match place_file(file, &dest_dir, &file_name, mode) {
                    Ok(destination) => {
                        tracing::info!(
                            "[Pipeline] Classified {} as [{}] -> {}",
                            file.display(),
                            record.describe(),
                            destination.display()
                        );
                        FileOutcome::Classified { destination, record }
                    }
                    Err(e) => {
                        let target = dest_dir.join(&file_name);
                        tracing::warn!(
                            "[Pipeline] Failed to place {} at {}: {}",
                            file.display(),
                            target.display(),
                            e
                        );
                        let reason = UnclassifiedReason::PlacementFailed(format!(
                            "{}: {}",
                            target.display(),
                            e
                        ));
                        self.place_unclassified(file, output_root, reason, mode)
                    }
                }
            }
            Err(reason) => {
                if reason.is_failure() {
                    tracing::warn!("[Pipeline] Could not classify {}: {}", file.display(), reason);
                } else {
                    tracing::info!("[Pipeline] Skipping classification of {}: {}", file.display(), reason);
                }
                self.place_unclassified(file, output_root, reason, mode)
            }
        }
    }

    /// Put `file` under `unclassified/` with its original name
    fn place_unclassified(
        &self,
        file: &Path,
        output_root: &Path,
        reason: UnclassifiedReason,
        mode: PlacementMode,
    ) -> FileOutcome {
        let dest_dir = output_root.join(UNCLASSIFIED_DIR);
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("document.{}", PDF_EXTENSION));

        match place_file(file, &dest_dir, &file_name, mode) {
            Ok(destination) => FileOutcome::Unclassified { destination, reason },
            Err(e) => placement_failed(file, &dest_dir.join(&file_name), e),
        }
    }

    fn classify_file(&mut self, file: &Path) -> Result<ClassificationRecord, UnclassifiedReason> {
        let content = match self.extractor.extract(file) {
            Ok(content) => content,
            Err(ExtractError::ContentNotAvailable { pages }) => {
                return Err(UnclassifiedReason::ContentNotAvailable { pages })
            }
            Err(e) => return Err(UnclassifiedReason::ExtractFailed(e.to_string())),
        };

        if content.is_empty() {
            return Err(UnclassifiedReason::NoText);
        }

        let prompt = build_classification_prompt(&content.text, &self.config);
        tracing::debug!(
            "[Pipeline] {}: {} tokens from {} pages, prompt {} chars",
            file.display(),
            content.tokens,
            content.pages_read,
            prompt.len()
        );

        let record = self
            .classifier
            .classify(&prompt)
            .map_err(|e| UnclassifiedReason::ClassificationFailed(e.to_string()))?;

        if let Some(content_type) = record.get(Attribute::ContentType) {
            if record.known_content_type().is_none() {
                tracing::debug!(
                    "[Pipeline] Unexpected content type '{}' for {}",
                    content_type,
                    file.display()
                );
            }
        }

        Ok(record)
    }
}

fn placement_failed(file: &Path, target: &Path, error: std::io::Error) -> FileOutcome {
    tracing::warn!(
        "[Pipeline] Failed to place {} at {}: {}",
        file.display(),
        target.display(),
        error
    );
    FileOutcome::Failed {
        error: format!("could not place file at {}: {}", target.display(), error),
    }
}

/// An organize run in progress. Each `next()` processes one file.
pub struct OrganizerRun<S, T, C> {
    pipeline: OrganizerPipeline<S, T, C>,
    files: Vec<PathBuf>,
    next_index: usize,
    output_root: PathBuf,
    state: RunState,
}

impl<S, T, C> OrganizerRun<S, T, C> {
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from(&self.state)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl<S, T, C> Iterator for OrganizerRun<S, T, C>
where
    S: PageSource,
    T: TokenCounter,
    C: Classifier,
{
    type Item = StepResult;

    fn next(&mut self) -> Option<StepResult> {
        let index = self.next_index;
        let file = self.files.get(index)?.clone();
        self.next_index += 1;

        let outcome = self.pipeline.process_file(&file, &self.output_root);
        self.state.record(index, &file, &outcome);

        if self.state.is_complete() {
            tracing::info!("[Pipeline] {} finished: {}", self.state.run_id, self.summary());
        }

        Some(StepResult {
            index,
            file,
            outcome,
            state: self.state.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.files.len() - self.next_index;
        (remaining, Some(remaining))
    }
}
