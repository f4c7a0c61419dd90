//! # news_translate
//!
//! A two-stage pipeline for scraped news articles: clean the article HTML
//! and drop duplicate links, then translate each title and body through an
//! OpenAI-compatible chat-completion API.
//!
//! ## Usage
//!
//! ```sh
//! news_translate -i scraped.json -o ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Loading**: read the scraped items from a JSON array
//! 2. **Cleaning**: deduplicate by link, sanitize HTML, reset status
//! 3. **Translation**: one chat call per field, paced with random pauses
//! 4. **Output**: rewrite `all_translated_data_<timestamp>.json` after
//!    every item

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cleaning;
mod cli;
mod config;
mod error;
mod input;
mod models;
mod outputs;
mod prompt;
mod translate;
mod utils;

use api::ChatClient;
use cli::Cli;
use config::{TranslatorConfig, load_config};
use models::TranslationStatus;
use prompt::PromptTemplate;
use translate::{Pacing, Translator};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env must be loaded before clap reads OPENAI_API_KEY
    dotenv::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_translate starting up");

    let args = Cli::parse();
    debug!(input = %args.input.display(), output_dir = ?args.output_dir, debug_snapshot = args.debug, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable
    if let Some(dir) = &args.output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    // ---- Configuration ----
    let config = match &args.config {
        Some(path) => load_config(path).await?,
        None => TranslatorConfig::default(),
    }
    .apply_cli(&args);
    if config.api_key.is_none() {
        debug!("No API key configured; translation calls will fail");
    }

    // ---- Step 1: load and clean ----
    let items = input::read_items(&args.input).await?;
    let cleaned =
        cleaning::merge_and_clean(items, args.output_dir.as_deref(), args.debug).await?;
    info!(count = cleaned.len(), "Items ready for translation");

    // ---- Step 2: translate ----
    let title_template = PromptTemplate::load(&config.title_template).await?;
    let content_template = PromptTemplate::load(&config.content_template).await?;
    let client = ChatClient::new(&config)?;
    info!(endpoint = %client.endpoint(), model = %config.model, "Chat client ready");

    let (min_pause, max_pause) = config.pause_range();
    let translator = Translator::new(
        client,
        title_template,
        content_template,
        Pacing::new(min_pause, max_pause),
    );

    let translated = match translator
        .fetch_and_translate(&cleaned, args.output_dir.as_deref())
        .await
    {
        Ok(translated) => translated,
        Err(e) => {
            error!(error = %e, "Translation run failed");
            return Err(e.into());
        }
    };

    let by_status = translated.iter().counts_by(|t| t.translation_status);
    let count = |status: TranslationStatus| by_status.get(&status).copied().unwrap_or(0);
    info!(
        cleaned = cleaned.len(),
        emitted = translated.len(),
        dropped = cleaned.len() - translated.len(),
        translated = count(TranslationStatus::Translated),
        title_failed = count(TranslationStatus::TitleFailed),
        content_failed = count(TranslationStatus::ContentFailed),
        all_failed = count(TranslationStatus::AllFailed),
        "Translation summary"
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
