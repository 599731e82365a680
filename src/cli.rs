use clap::Parser;
use std::path::PathBuf;

/// Classify PDF documents with a language model and file them by title,
/// author, year, topic...
#[derive(Debug, Parser)]
#[command(name = "pdf-organizer", version, about)]
pub struct Cli {
    /// A PDF file or a directory of PDF files
    #[arg(long, value_name = "PATH", required_unless_present = "save_api_key")]
    pub input_path: Option<PathBuf>,

    /// Root folder for the organized files (created if missing)
    #[arg(long, value_name = "DIR", required_unless_present = "save_api_key")]
    pub output_folder: Option<PathBuf>,

    /// YAML config file (default: ./config.yaml, then the user config dir)
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log file (default: a new file per run in the user data dir)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Move files instead of copying them
    #[arg(long = "move", default_value_t = false)]
    pub move_files: bool,

    /// Store an OpenAI API key in the OS keychain and exit
    #[arg(long, value_name = "KEY", conflicts_with_all = ["input_path", "output_folder"])]
    pub save_api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::try_parse_from([
            "pdf-organizer",
            "--input-path",
            "papers",
            "--output-folder",
            "sorted",
            "--move",
        ])
        .unwrap();
        assert_eq!(cli.input_path, Some(PathBuf::from("papers")));
        assert_eq!(cli.output_folder, Some(PathBuf::from("sorted")));
        assert!(cli.move_files);
        assert!(cli.config_file.is_none());
    }

    #[test]
    fn test_output_folder_is_required() {
        assert!(Cli::try_parse_from(["pdf-organizer", "--input-path", "papers"]).is_err());
    }

    #[test]
    fn test_save_api_key_alone() {
        let cli = Cli::try_parse_from(["pdf-organizer", "--save-api-key", "sk-test"]).unwrap();
        assert_eq!(cli.save_api_key.as_deref(), Some("sk-test"));
        assert!(cli.input_path.is_none());
    }
}
