//! Command-line interface definitions for news_translate.
//!
//! Arguments can be provided via flags; the API credential can also come
//! from the `OPENAI_API_KEY` environment variable (or a `.env` file).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the cleaning and translation pipeline.
///
/// # Examples
///
/// ```sh
/// # Clean and translate, writing the translated snapshot to ./out
/// news_translate -i scraped.json -o ./out
///
/// # Also keep the cleaned snapshot and use model settings from a file
/// news_translate -i scraped.json -o ./out --debug -c translate.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file holding the scraped items (an array of objects)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for the snapshot files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Also write the cleaned items to all_cleaned_data_<timestamp>.json
    #[arg(short, long)]
    pub debug: bool,

    /// Optional path to a YAML file with model and pacing settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// API key for the chat-completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the model name
    #[arg(long)]
    pub model: Option<String>,

    /// Prompt template used for titles
    #[arg(long)]
    pub title_template: Option<PathBuf>,

    /// Prompt template used for article bodies
    #[arg(long)]
    pub content_template: Option<PathBuf>,
}
