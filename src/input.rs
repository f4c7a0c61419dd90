//! Loading scraped items from disk.

use crate::error::InputError;
use crate::models::NewsItem;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Read a JSON array of scraped records.
///
/// Records that are not objects are logged and skipped; the rest keep
/// their input order. Known keys of the wrong JSON type load as absent
/// (see [`NewsItem`]), so such records are kept.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_items(path: &Path) -> Result<Vec<NewsItem>, InputError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let raw: Value = serde_json::from_str(&text).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Array(records) = raw else {
        return Err(InputError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    let total = records.len();
    let items: Vec<NewsItem> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            if !record.is_object() {
                warn!(index, "Skipping record that is not an object");
                return None;
            }
            match serde_json::from_value::<NewsItem>(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed record");
                    None
                }
            }
        })
        .collect();

    info!(total, loaded = items.len(), "Loaded scraped items");
    Ok(items)
}
