//! JSON snapshot files.
//!
//! A snapshot is the whole collection produced so far, written as a
//! pretty-printed JSON array with 4-space indentation and non-ASCII text
//! kept literal. Each write replaces the previous content of the file.

use crate::error::OutputError;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, instrument};

/// File name prefix of the cleaning-stage snapshot.
pub const CLEANED_PREFIX: &str = "all_cleaned_data";
/// File name prefix of the translation-stage snapshot.
pub const TRANSLATED_PREFIX: &str = "all_translated_data";

/// Path of a snapshot file: `{dir}/{prefix}_{timestamp}.json`.
pub fn snapshot_path(dir: &Path, prefix: &str, timestamp: &str) -> PathBuf {
    dir.join(format!("{prefix}_{timestamp}.json"))
}

/// Serialize `items` as a 4-space indented JSON array.
pub fn to_pretty_json<T: Serialize>(items: &[T]) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    items.serialize(&mut ser)?;
    Ok(buf)
}

/// Create `dir` (and parents) if it does not exist.
pub async fn prepare_dir(dir: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(dir).await.map_err(|source| {
        error!(path = %dir.display(), error = %source, "Failed to create output directory");
        OutputError::Io {
            path: dir.to_path_buf(),
            source,
        }
    })
}

/// Overwrite `path` with the full collection.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), count = items.len()))]
pub async fn write_snapshot<T: Serialize>(path: &Path, items: &[T]) -> Result<(), OutputError> {
    let json = to_pretty_json(items)?;
    fs::write(path, json).await.map_err(|source| {
        error!(error = %source, "Failed to write snapshot");
        OutputError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!("Wrote snapshot");
    Ok(())
}
