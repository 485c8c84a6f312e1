//! Configuration management for mdquiz.
//!
//! Parses `mdquiz.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [quiz]
//! numbering = "abc"
//! shuffle_answers = true
//! force_multi = false
//! matching_separator = ":"
//! default_grade = 1.0
//! penalty = 0.3333333
//!
//! [tags]
//! general = ["course-101"]
//! multichoice = ["choice"]
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::path::{Path, PathBuf};

use mdquiz_core::{Numbering, QuizSettings, TagSettings};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Extra tags added to every question.
    pub tags: Option<Vec<String>>,
    /// Override answer shuffling.
    pub shuffle_answers: Option<bool>,
    /// Override default numbering scheme.
    pub numbering: Option<Numbering>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdquiz.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Question defaults.
    pub quiz: QuizConfig,
    /// Tags added to questions.
    pub tags: TagsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Question defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Answer numbering of choice questions.
    pub numbering: Numbering,
    /// Shuffle answers unless a question disables it.
    pub shuffle_answers: bool,
    /// Treat single checked items as multiple choice.
    pub force_multi: bool,
    /// Separator of associative matching items.
    pub matching_separator: String,
    /// Points of a question in a quiz.
    pub default_grade: f64,
    /// Share of the grade lost per wrong try.
    pub penalty: f64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        let settings = QuizSettings::default();
        Self {
            numbering: settings.numbering,
            shuffle_answers: settings.shuffle_answers,
            force_multi: settings.force_multi,
            matching_separator: settings.matching_separator,
            default_grade: settings.default_grade,
            penalty: settings.penalty,
        }
    }
}

/// Tag lists.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Added to every question.
    pub general: Vec<String>,
    /// Added to single and multiple choice questions.
    pub multichoice: Vec<String>,
    /// Added to matching questions.
    pub matching: Vec<String>,
    /// Added to short answer questions.
    pub shortanswer: Vec<String>,
    /// Added to numerical questions.
    pub numerical: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdquiz.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Settings snapshot for a conversion.
    #[must_use]
    pub fn quiz_settings(&self) -> QuizSettings {
        QuizSettings {
            numbering: self.quiz.numbering,
            shuffle_answers: self.quiz.shuffle_answers,
            force_multi: self.quiz.force_multi,
            matching_separator: self.quiz.matching_separator.clone(),
            default_grade: self.quiz.default_grade,
            penalty: self.quiz.penalty,
            tags: TagSettings {
                general: self.tags.general.clone(),
                multichoice: self.tags.multichoice.clone(),
                matching: self.tags.matching.clone(),
                shortanswer: self.tags.shortanswer.clone(),
                numerical: self.tags.numerical.clone(),
            },
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(tags) = &settings.tags {
            self.tags.general.extend(tags.iter().cloned());
        }
        if let Some(shuffle) = settings.shuffle_answers {
            self.quiz.shuffle_answers = shuffle;
        }
        if let Some(numbering) = settings.numbering {
            self.quiz.numbering = numbering;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        discover_from(&current)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiz.matching_separator.trim().is_empty() {
            return Err(ConfigError::Validation(
                "quiz.matching_separator cannot be empty".to_owned(),
            ));
        }
        if !self.quiz.default_grade.is_finite() || self.quiz.default_grade < 0.0 {
            return Err(ConfigError::Validation(
                "quiz.default_grade must be a non-negative number".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.quiz.penalty) {
            return Err(ConfigError::Validation(
                "quiz.penalty must be between 0 and 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Search for the config file in `start` and its parents.
fn discover_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
