pub mod ai;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod organizer;

use std::path::Path;
use std::process;

use clap::Parser;

use ai::{
    Classifier, CredentialManager, LlmClassifier, OpenAiClient, TiktokenCounter, TokenCounter,
    WordCounter, OPENAI_PROVIDER,
};
use cli::Cli;
use config::Settings;
use document::{PageSource, PdfPageReader, TokenBudgetedExtractor};
use error::OrganizerResult;
use organizer::{FileOutcome, OrganizerPipeline};

pub fn run() {
    let cli = Cli::parse();

    if let Some(api_key) = &cli.save_api_key {
        match CredentialManager::store_api_key(OPENAI_PROVIDER, api_key) {
            Ok(()) => println!("API key saved to the system keychain"),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let (Some(input), Some(output)) = (cli.input_path.as_deref(), cli.output_folder.as_deref())
    else {
        eprintln!("Error: --input-path and --output-folder are required");
        process::exit(2);
    };

    // Nothing is logged yet, so config errors go straight to stderr
    let mut settings = match Settings::load(cli.config_file.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if cli.move_files {
        settings.organizer.move_instead_of_copy = true;
    }

    let log_path = logging::init_logging(&settings.log_level, cli.log_file.as_deref());
    match &settings.config_path {
        Some(path) => tracing::info!("[Config] Loaded {}", path.display()),
        None => tracing::info!("[Config] No config file found, using defaults"),
    }

    let counter: Box<dyn TokenCounter> = match TiktokenCounter::for_model(&settings.llm_model_name) {
        Ok(counter) => Box::new(counter),
        Err(e) => {
            tracing::warn!(
                "[Main] No tokenizer for {} ({}), counting words instead",
                settings.llm_model_name,
                e
            );
            Box::new(WordCounter)
        }
    };
    let extractor = TokenBudgetedExtractor::new(PdfPageReader::new(), counter, settings.max_num_tokens)
        .with_max_pages(settings.max_num_pages);
    let client = OpenAiClient::from_settings(&settings);
    tracing::info!(
        "[Main] Using {} with a budget of {} tokens over at most {} pages",
        client.model(),
        settings.max_num_tokens,
        settings.max_num_pages
    );
    let classifier = LlmClassifier::new(client);
    let pipeline = OrganizerPipeline::new(settings.organizer.clone(), extractor, classifier)
        .with_log_path(log_path);

    if let Err(e) = organize(pipeline, input, output) {
        tracing::error!("[Main] {}", e);
        process::exit(1);
    }
}

/// Drive the run, printing one line per file and a final summary
fn organize<S, T, C>(
    pipeline: OrganizerPipeline<S, T, C>,
    input: &Path,
    output: &Path,
) -> OrganizerResult<()>
where
    S: PageSource,
    T: TokenCounter,
    C: Classifier,
{
    let mut run = pipeline.start(input, output)?;
    if run.files().is_empty() {
        println!("No PDF files found in {}", input.display());
    }

    for step in run.by_ref() {
        let name = display_name(&step.file);
        let line = match &step.outcome {
            FileOutcome::Classified { destination, .. } => {
                format!("{} -> {}", name, destination.display())
            }
            FileOutcome::Unclassified { destination, reason } => {
                format!("{} -> {} ({})", name, destination.display(), reason)
            }
            FileOutcome::Failed { error } => format!("{} FAILED: {}", name, error),
        };
        println!("[{:>3}%] {}", step.state.progress, line);
    }

    println!("{}", run.summary());
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
