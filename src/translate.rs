//! Second pipeline stage: translate titles and bodies item by item.
//!
//! Items are processed strictly in order. For each one the title and the
//! content are translated independently (reusing an existing translation
//! when present), a [`TranslationStatus`] is derived from what succeeded,
//! and the whole result list so far is written to the run's snapshot file.
//!
//! Failure handling:
//! - an API failure degrades one field; the item is still emitted
//! - any other failure while handling an item drops that item and the run
//!   continues
//! - failing to create the output directory or write the snapshot aborts
//!   the run with `Err`

use crate::api::AskAsync;
use crate::error::{ApiError, TranslateError};
use crate::models::{ItemId, NewsItem, TranslatedItem, TranslationStatus};
use crate::outputs::json::{TRANSLATED_PREFIX, prepare_dir, snapshot_path, write_snapshot};
use crate::prompt::PromptTemplate;
use crate::utils::{run_timestamp, truncate_for_log};
use rand::{Rng, rng};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Marker the prompts ask the model to put before its answer.
pub const RESULT_MARKER: &str = "Result:";

/// Randomized pause between items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A duration drawn uniformly from `[min, max]`.
    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rng().random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.max)
    }
}

/// The text after the first `Result:` marker, or the whole reply, trimmed.
pub fn extract_result(reply: &str) -> &str {
    let reply = reply.trim();
    match reply.split_once(RESULT_MARKER) {
        Some((_, answer)) => answer.trim(),
        None => reply,
    }
}

/// Drives translation of a collection of cleaned items.
pub struct Translator<A> {
    client: A,
    title_template: PromptTemplate,
    content_template: PromptTemplate,
    pacing: Pacing,
}

impl<A: AskAsync> Translator<A> {
    pub fn new(
        client: A,
        title_template: PromptTemplate,
        content_template: PromptTemplate,
        pacing: Pacing,
    ) -> Self {
        Self {
            client,
            title_template,
            content_template,
            pacing,
        }
    }

    /// Render `template` with `text`, ask the model once and extract the
    /// answer. An empty answer counts as a failed call.
    pub async fn translate_text(
        &self,
        text: &str,
        template: &PromptTemplate,
    ) -> Result<String, TranslateError> {
        let prompt = template.render(text)?;
        let reply = self.client.ask(&prompt).await?;
        debug!(
            template = template.name(),
            reply = %truncate_for_log(&reply, 200),
            "Model replied"
        );

        let answer = extract_result(&reply);
        if answer.is_empty() {
            return Err(ApiError::EmptyReply.into());
        }
        Ok(answer.to_string())
    }

    /// Translate one field unless a translation already exists.
    ///
    /// API failures are absorbed into `Ok(None)`; other errors abort the
    /// item.
    async fn translate_field(
        &self,
        id: &ItemId,
        field: &'static str,
        existing: Option<&str>,
        source: Option<&str>,
        template: &PromptTemplate,
    ) -> Result<Option<String>, TranslateError> {
        if let Some(done) = existing.filter(|s| !s.is_empty()) {
            debug!(%id, field, "Reusing existing translation");
            return Ok(Some(done.to_string()));
        }
        let Some(text) = source.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        match self.translate_text(text, template).await {
            Ok(translated) => Ok(Some(translated)),
            Err(TranslateError::Api(e)) => {
                warn!(%id, field, error = %e, "Translation call failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn translate_item(
        &self,
        id: ItemId,
        item: &NewsItem,
    ) -> Result<TranslatedItem, TranslateError> {
        let title_zh = self
            .translate_field(
                &id,
                "title",
                item.title_zh.as_deref(),
                item.title.as_deref(),
                &self.title_template,
            )
            .await?;
        let content_zh = self
            .translate_field(
                &id,
                "content",
                item.content_zh.as_deref(),
                item.content_html(),
                &self.content_template,
            )
            .await?;

        Ok(TranslatedItem::assemble(id, item, title_zh, content_zh))
    }

    /// Translate every item, rewriting the snapshot after each one.
    ///
    /// The snapshot path `all_translated_data_<timestamp>.json` is fixed
    /// when the run starts. Returns `Err` only for run-level failures; the
    /// caller must treat that as total failure, distinct from an empty
    /// result.
    #[instrument(level = "info", skip_all, fields(count = items.len()))]
    pub async fn fetch_and_translate(
        &self,
        items: &[NewsItem],
        output_dir: Option<&Path>,
    ) -> Result<Vec<TranslatedItem>, TranslateError> {
        match self.run(items, output_dir).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!(id = "system", error = %e, "Critical error in translation");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        items: &[NewsItem],
        output_dir: Option<&Path>,
    ) -> Result<Vec<TranslatedItem>, TranslateError> {
        let executed_at = run_timestamp();
        let snapshot = match output_dir {
            Some(dir) => {
                prepare_dir(dir).await?;
                Some(snapshot_path(dir, TRANSLATED_PREFIX, &executed_at))
            }
            None => None,
        };

        let total = items.len();
        let mut result: Vec<TranslatedItem> = Vec::with_capacity(total);

        for (i, item) in items.iter().enumerate() {
            let id = item.resolved_id(i);

            match self.translate_item(id.clone(), item).await {
                Ok(translated) => {
                    let status = translated.translation_status;
                    result.push(translated);

                    println!("[{}/{}] ✅ ID {} translated. Status: {}", i + 1, total, id, status);
                    if status == TranslationStatus::Translated {
                        info!(index = i, %id, %status, "Item translated");
                    } else {
                        warn!(index = i, %id, %status, "Item partially translated");
                    }

                    let delay = self.pacing.next_delay();
                    debug!(?delay, "Pausing before next item");
                    sleep(delay).await;
                }
                Err(e) => {
                    error!(index = i, %id, error = %e, "Translation failed for item");
                    println!("[{}/{}] ❌ ID {} failed: {}", i + 1, total, id, e);
                }
            }

            if let Some(path) = &snapshot {
                write_snapshot(path, &result).await?;
            }
        }

        info!(
            total,
            emitted = result.len(),
            snapshot = ?snapshot,
            "Translation run finished"
        );
        Ok(result)
    }
}
