//! Translator configuration.
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults (`gpt-3.5-turbo`, temperature 0.7, 2000 tokens,
//!    10–20 s pause between items)
//! 2. an optional YAML file passed with `--config`
//! 3. command-line flags (the API key also via `OPENAI_API_KEY`)
//!
//! The resulting [`TranslatorConfig`] is built once in `main` and handed to
//! the translator.
//!
//! ```yaml
//! api_base: https://api.openai.com/v1
//! model: gpt-3.5-turbo
//! temperature: 0.7
//! max_tokens: 2000
//! min_pause_secs: 10
//! max_pause_secs: 20
//! title_template: prompts/title_translation.prompt
//! content_template: prompts/content_translation.prompt
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Upper bound accepted for either pause setting, in seconds.
pub const MAX_PAUSE_SECS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`.
    pub api_base: String,
    /// Only ever read from the CLI/environment, never from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub min_pause_secs: f64,
    pub max_pause_secs: f64,
    pub title_template: PathBuf,
    pub content_template: PathBuf,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            request_timeout_secs: 120,
            min_pause_secs: 10.0,
            max_pause_secs: 20.0,
            title_template: PathBuf::from("prompts/title_translation.prompt"),
            content_template: PathBuf::from("prompts/content_translation.prompt"),
        }
    }
}

impl TranslatorConfig {
    /// Parse a YAML document; missing keys take their defaults.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        for (key, value) in [
            ("min_pause_secs", config.min_pause_secs),
            ("max_pause_secs", config.max_pause_secs),
        ] {
            if !(0.0..=MAX_PAUSE_SECS).contains(&value) {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    message: format!("{key} must be between 0 and {MAX_PAUSE_SECS}, got {value}"),
                });
            }
        }
        Ok(config)
    }

    /// Layer command-line values over this configuration.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if cli.api_key.is_some() {
            self.api_key = cli.api_key.clone();
        }
        if let Some(model) = &cli.model {
            self.model = model.clone();
        }
        if let Some(path) = &cli.title_template {
            self.title_template = path.clone();
        }
        if let Some(path) = &cli.content_template {
            self.content_template = path.clone();
        }
        self
    }

    /// Pause bounds as durations, clamped to `[0, MAX_PAUSE_SECS]`.
    /// [`Pacing::new`](crate::translate::Pacing::new) puts them in order.
    pub fn pause_range(&self) -> (Duration, Duration) {
        (
            pause_duration(self.min_pause_secs),
            pause_duration(self.max_pause_secs),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn pause_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_PAUSE_SECS)).unwrap_or_default()
}

/// Load a [`TranslatorConfig`] from a YAML file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<TranslatorConfig, ConfigError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let config = TranslatorConfig::from_yaml(path, &text)?;
    if config.min_pause_secs > config.max_pause_secs {
        warn!(
            min = config.min_pause_secs,
            max = config.max_pause_secs,
            "Pause bounds are reversed; using them in order"
        );
    }
    info!(model = %config.model, api_base = %config.api_base, "Loaded configuration");
    Ok(config)
}
