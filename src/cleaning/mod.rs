//! First pipeline stage: deduplicate and sanitize scraped items.
//!
//! - [`dedup`]: drops repeated links
//! - [`sanitize`]: strips boilerplate markup from each item's HTML
//!
//! [`merge_and_clean`] runs both and optionally keeps a debug snapshot of
//! the cleaned collection.

pub mod dedup;
pub mod sanitize;

use crate::error::OutputError;
use crate::models::NewsItem;
use crate::outputs::json::{CLEANED_PREFIX, prepare_dir, snapshot_path, write_snapshot};
use crate::utils::run_timestamp;
use std::path::Path;
use tracing::{info, instrument};

pub use dedup::dedup_by_link;
pub use sanitize::clean_items;

/// Deduplicate then sanitize `items`.
///
/// With `debug_snapshot` set and an `output_dir` given, the cleaned
/// collection is also written to `all_cleaned_data_<timestamp>.json`. The
/// cleaned items are returned either way; only the snapshot write can fail.
#[instrument(
    level = "info",
    skip_all,
    fields(count = items.len(), debug_snapshot = debug_snapshot)
)]
pub async fn merge_and_clean(
    items: Vec<NewsItem>,
    output_dir: Option<&Path>,
    debug_snapshot: bool,
) -> Result<Vec<NewsItem>, OutputError> {
    let unique = dedup_by_link(items);
    let cleaned = clean_items(unique);
    let executed_at = run_timestamp();

    match output_dir {
        Some(dir) if debug_snapshot => {
            prepare_dir(dir).await?;
            let path = snapshot_path(dir, CLEANED_PREFIX, &executed_at);
            write_snapshot(&path, &cleaned).await?;
            info!(path = %path.display(), count = cleaned.len(), "Cleaned data saved");
        }
        _ => info!("Debug mode is off; not saving cleaned data"),
    }

    Ok(cleaned)
}
