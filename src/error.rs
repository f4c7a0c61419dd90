//! Error types for the cleaning and translation stages.
//!
//! Failures are grouped by how far they are allowed to propagate:
//! - [`ApiError`]: one chat call failed; the caller degrades the field
//! - [`TranslateError`]: an item or the whole run could not proceed
//! - [`OutputError`]: a snapshot could not be written
//! - [`ConfigError`] / [`InputError`]: startup problems reported by `main`

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single chat-completion call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API credential is not set (OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API response has no choices[0].message.content")]
    MissingContent,

    #[error("API returned an empty reply")]
    EmptyReply,

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Failure writing a JSON snapshot.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure inside the translation stage.
///
/// `Api` is recovered per field. `Template` aborts one item. `Output`
/// aborts the run.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("prompt template '{name}' has no {{{{ text }}}} placeholder")]
    Template { name: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Failure loading configuration or prompt templates.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config file {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Failure loading the scraped items.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("input {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("input {} must hold a JSON array of items", .path.display())]
    NotAnArray { path: PathBuf },
}
