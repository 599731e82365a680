//! Configuration handling.
//!
//! Settings are read once at startup from an optional YAML file, overlaid with
//! environment variables, validated, and then passed by reference to every
//! component. Nothing reads configuration from global state afterwards.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ai::credentials::CredentialManager;
use crate::document::extractor::DEFAULT_MAX_PAGES;
use crate::error::ConfigError;
use crate::organizer::taxonomy::Taxonomy;
use crate::organizer::types::Attribute;

/// File name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const APP_DIR_NAME: &str = "pdf-organizer";

/// Extraction budget and reply `max_tokens`
pub const DEFAULT_MAX_NUM_TOKENS: usize = 1000;

const ENV_MODEL: &str = "PDF_ORGANIZER_MODEL";
const ENV_MAX_TOKENS: &str = "PDF_ORGANIZER_MAX_TOKENS";
const ENV_MAX_PAGES: &str = "PDF_ORGANIZER_MAX_PAGES";
const ENV_LOG_LEVEL: &str = "PDF_ORGANIZER_LOG_LEVEL";
const ENV_API_BASE_URL: &str = "PDF_ORGANIZER_API_BASE_URL";

/// Character used to join filename attribute values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Separator {
    Underscore,
    #[default]
    Hyphen,
    Dot,
    Space,
}

impl Separator {
    pub fn as_char(&self) -> char {
        match self {
            Self::Underscore => '_',
            Self::Hyphen => '-',
            Self::Dot => '.',
            Self::Space => ' ',
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "_" => Ok(Self::Underscore),
            "-" => Ok(Self::Hyphen),
            "." => Ok(Self::Dot),
            " " => Ok(Self::Space),
            other => Err(ConfigError::DisallowedSeparator(other.to_string())),
        }
    }
}

/// How classified files are laid out in the output folder
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizerConfig {
    /// One directory level per attribute, in order
    pub subfolder_attributes: Vec<Attribute>,
    /// Attribute values joined with `separator` to form the file stem
    pub filename_attributes: Vec<Attribute>,
    pub separator: Separator,
    pub move_instead_of_copy: bool,
    /// Refuse to run when the output folder already has content
    pub require_empty_output: bool,
    pub taxonomy: Taxonomy,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            subfolder_attributes: vec![Attribute::ContentType],
            filename_attributes: vec![Attribute::Title],
            separator: Separator::default(),
            move_instead_of_copy: false,
            require_empty_output: false,
            taxonomy: Taxonomy::default(),
        }
    }
}

impl OrganizerConfig {
    pub fn with_subfolders(mut self, attributes: Vec<Attribute>) -> Self {
        self.subfolder_attributes = attributes;
        self
    }

    pub fn with_filename(mut self, attributes: Vec<Attribute>, separator: Separator) -> Self {
        self.filename_attributes = attributes;
        self.separator = separator;
        self
    }

    pub fn with_move(mut self, move_instead_of_copy: bool) -> Self {
        self.move_instead_of_copy = move_instead_of_copy;
        self
    }

    pub fn with_require_empty_output(mut self, require: bool) -> Self {
        self.require_empty_output = require;
        self
    }

    /// True when topic or subtopic drive a path, so the model needs the taxonomy
    pub fn topics_in_scope(&self) -> bool {
        self.subfolder_attributes
            .iter()
            .chain(self.filename_attributes.iter())
            .any(Attribute::is_topical)
    }
}

/// Validated run settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub llm_model_name: String,
    /// Token budget for extracted text, also the reply `max_tokens`
    pub max_num_tokens: usize,
    /// Page ceiling for extraction
    pub max_num_pages: usize,
    pub api_base_url: String,
    pub log_level: String,
    pub organizer: OrganizerConfig,
    /// File the settings were read from, if any
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings: config file, then `.env` and process environment, then
    /// API key fallbacks.
    ///
    /// Runs before logging is set up; the chosen file is kept in `config_path`
    /// so the caller can report it.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config_path = locate_config_file(explicit_path)?;
        let mut raw = match &config_path {
            Some(path) => RawSettings::from_file(path)?,
            None => RawSettings::default(),
        };
        raw.apply_env(|key| std::env::var(key).ok());

        let api_key = CredentialManager::resolve_api_key(raw.api_key.as_deref());
        let mut settings = raw.into_settings(api_key)?;
        settings.config_path = config_path;
        Ok(settings)
    }
}

/// Resolve which config file to read, if any.
///
/// An explicit path must exist. Otherwise `./config.yaml` and then the user
/// config directory are tried.
pub fn locate_config_file(explicit_path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit_path {
        if !path.is_file() {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file()))
}

/// Settings as they appear in the YAML file, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    pub api_key: Option<String>,
    pub llm_model_name: Option<String>,
    pub max_num_tokens: Option<usize>,
    pub max_num_pages: Option<usize>,
    pub api_base_url: Option<String>,
    pub log_level: Option<String>,
    pub organizer: RawOrganizerSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOrganizerSettings {
    pub subfolders_from_attributes: Option<Vec<String>>,
    pub filename_from_attributes: Option<Vec<String>>,
    pub filename_attribute_separator: Option<String>,
    pub move_instead_of_copy: Option<bool>,
    pub require_empty_output: Option<bool>,
    pub topic_taxonomy: Option<BTreeMap<String, Vec<String>>>,
}

impl RawSettings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, String> {
        // An empty file is a valid "all defaults" config
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }

    /// Overlay environment variables on top of file values. Non-numeric
    /// budgets are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL) {
            self.llm_model_name = Some(model);
        }
        if let Some(tokens) = lookup(ENV_MAX_TOKENS) {
            match tokens.trim().parse() {
                Ok(n) => self.max_num_tokens = Some(n),
                Err(_) => tracing::warn!("[Config] Ignoring non-numeric {}={}", ENV_MAX_TOKENS, tokens),
            }
        }
        if let Some(pages) = lookup(ENV_MAX_PAGES) {
            match pages.trim().parse() {
                Ok(n) => self.max_num_pages = Some(n),
                Err(_) => tracing::warn!("[Config] Ignoring non-numeric {}={}", ENV_MAX_PAGES, pages),
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = Some(url);
        }
    }

    /// Validate into immutable settings. `api_key` is the already-resolved key.
    pub fn into_settings(self, api_key: Option<String>) -> Result<Settings, ConfigError> {
        let organizer = self.organizer.into_config()?;

        let max_num_tokens = self.max_num_tokens.unwrap_or(DEFAULT_MAX_NUM_TOKENS);
        if max_num_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "maxNumTokens",
                message: "must be greater than zero".to_string(),
            });
        }
        let max_num_pages = self.max_num_pages.unwrap_or(DEFAULT_MAX_PAGES);
        if max_num_pages == 0 {
            return Err(ConfigError::InvalidValue {
                key: "maxNumPages",
                message: "must be greater than zero".to_string(),
            });
        }

        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Settings {
            api_key,
            llm_model_name: self
                .llm_model_name
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            max_num_tokens,
            max_num_pages,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            organizer,
            config_path: None,
        })
    }
}

impl RawOrganizerSettings {
    pub fn into_config(self) -> Result<OrganizerConfig, ConfigError> {
        let defaults = OrganizerConfig::default();

        let subfolder_attributes = match self.subfolders_from_attributes {
            Some(keys) => parse_attributes(&keys)?,
            None => defaults.subfolder_attributes,
        };
        let filename_attributes = match self.filename_from_attributes {
            Some(keys) => parse_attributes(&keys)?,
            None => defaults.filename_attributes,
        };
        if filename_attributes.is_empty() {
            return Err(ConfigError::EmptyFilenameAttributes);
        }
        let separator = match self.filename_attribute_separator {
            Some(sep) => Separator::parse(&sep)?,
            None => defaults.separator,
        };
        let taxonomy = match self.topic_taxonomy {
            Some(map) if !map.is_empty() => Taxonomy::from_map(map),
            _ => defaults.taxonomy,
        };

        Ok(OrganizerConfig {
            subfolder_attributes,
            filename_attributes,
            separator,
            move_instead_of_copy: self.move_instead_of_copy.unwrap_or(false),
            require_empty_output: self.require_empty_output.unwrap_or(false),
            taxonomy,
        })
    }
}

fn parse_attributes(keys: &[String]) -> Result<Vec<Attribute>, ConfigError> {
    keys.iter().map(|k| k.parse()).collect()
}
