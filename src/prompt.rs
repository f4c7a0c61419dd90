//! Prompt templates for the translation calls.
//!
//! Templates are plain text files containing a jinja-style `{{ text }}`
//! placeholder (whitespace inside the braces is optional). By convention
//! they ask the model to put its answer after a literal `Result:` marker.

use crate::error::{ConfigError, TranslateError};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*text\s*\}\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    name: String,
    source: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Read a template from disk, named after its file stem.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let template = Self::new(name, source);
        if !template.has_placeholder() {
            warn!(name = %template.name, "Template has no text placeholder; items using it will fail");
        }
        info!(name = %template.name, "Loaded prompt template");
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_placeholder(&self) -> bool {
        PLACEHOLDER.is_match(&self.source)
    }

    /// Substitute `text` for every placeholder.
    pub fn render(&self, text: &str) -> Result<String, TranslateError> {
        if !self.has_placeholder() {
            return Err(TranslateError::Template {
                name: self.name.clone(),
            });
        }
        Ok(PLACEHOLDER
            .replace_all(&self.source, NoExpand(text))
            .into_owned())
    }
}
