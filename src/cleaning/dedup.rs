//! Link-based deduplication of scraped items.

use crate::models::NewsItem;
use std::collections::HashSet;
use tracing::info;

/// Keep the first item seen for each link, preserving input order.
///
/// Items without a link (or with an empty one) are never treated as
/// duplicates.
pub fn dedup_by_link(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let total = items.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);

    let unique: Vec<NewsItem> = items
        .into_iter()
        .filter(|item| match item.link.as_deref() {
            Some(link) if !link.is_empty() => seen.insert(link.to_owned()),
            _ => true,
        })
        .collect();

    info!(
        total,
        unique = unique.len(),
        duplicates = total - unique.len(),
        "Deduplicated items by link"
    );
    unique
}
