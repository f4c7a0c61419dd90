//! Data models for scraped news items and their translated representations.
//!
//! This module defines the records that flow through the pipeline:
//! - [`NewsItem`]: A scraped article record, mutated by the cleaning stage
//! - [`TranslatedItem`]: The record written by the translation stage
//! - [`TranslationStatus`]: Which of title/content ended up translated
//! - [`ItemId`]: The opaque identifier carried by each record
//!
//! Field names are snake_case to match the JSON files produced by the
//! scraper, and unknown keys of a scraped record are preserved in
//! [`NewsItem::extra`] so a cleaned snapshot round-trips them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Literal written in place of a translated field that is still empty.
pub const NULL_SENTINEL: &str = "null";

/// Opaque identifier of a news item.
///
/// Scrapers emit strings or numbers, occasionally booleans; any scalar is
/// carried through unchanged so the output files keep the producer's
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl ItemId {
    /// Placeholder used for records that arrive without an id.
    pub fn placeholder(index: usize) -> Self {
        ItemId::Text(format!("debug_{index}"))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Text(s) => f.write_str(s),
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Translation progress of a news item.
///
/// Serialized with the exact labels consumed downstream, including the
/// capitalised `"All failed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum TranslationStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "translated")]
    Translated,
    #[serde(rename = "title failed")]
    TitleFailed,
    #[serde(rename = "content failed")]
    ContentFailed,
    #[serde(rename = "All failed")]
    AllFailed,
}

impl TranslationStatus {
    /// Derive the terminal status from which fields ended up translated.
    ///
    /// | title | content | status           |
    /// |-------|---------|------------------|
    /// | yes   | yes     | `translated`     |
    /// | no    | yes     | `title failed`   |
    /// | yes   | no      | `content failed` |
    /// | no    | no      | `All failed`     |
    pub fn from_outcome(title_translated: bool, content_translated: bool) -> Self {
        match (title_translated, content_translated) {
            (true, true) => TranslationStatus::Translated,
            (false, true) => TranslationStatus::TitleFailed,
            (true, false) => TranslationStatus::ContentFailed,
            (false, false) => TranslationStatus::AllFailed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStatus::Pending => "pending",
            TranslationStatus::Translated => "translated",
            TranslationStatus::TitleFailed => "title failed",
            TranslationStatus::ContentFailed => "content failed",
            TranslationStatus::AllFailed => "All failed",
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scraped news article as it moves through cleaning.
///
/// Every field is optional: scrapers differ in what they emit and the
/// pipeline only checks key presence. A known key holding a value of the
/// wrong type (a numeric title, a status label from another tool) loads
/// as absent rather than rejecting the record. `content` is kept as a raw
/// JSON value so a record whose content is not a string passes the
/// cleaning stage untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    /// Canonical article URL; the deduplication key.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Article body, normally an HTML string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content_zh: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub translation_status: Option<TranslationStatus>,
    /// Keys the pipeline does not interpret (author, date, source, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    /// The body as HTML text, if it is a string.
    pub fn content_html(&self) -> Option<&str> {
        self.content.as_ref().and_then(Value::as_str)
    }

    /// Whether the item still carries usable content.
    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(is_truthy)
    }

    /// The item's id, or the positional placeholder when it has none.
    pub fn resolved_id(&self, index: usize) -> ItemId {
        self.id.clone().unwrap_or_else(|| ItemId::placeholder(index))
    }
}

/// Deserialize an optional field, treating a value of the wrong shape as
/// absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// Truthiness of a JSON value: null, `false`, zero and empty
/// strings/arrays/objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A news item after the translation stage.
///
/// Field order matches the keys of the translated snapshot file. Absent
/// `link`/`title`/`content` serialize as JSON `null`; untranslated
/// `title_zh`/`content_zh` hold [`NULL_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TranslatedItem {
    pub id: ItemId,
    pub link: Option<String>,
    pub title: Option<String>,
    pub title_zh: String,
    pub content: Option<Value>,
    pub content_zh: String,
    pub translation_status: TranslationStatus,
}

impl TranslatedItem {
    /// Assemble the output record, substituting the sentinel for empty
    /// translations and deriving the status from what succeeded.
    pub fn assemble(
        id: ItemId,
        source: &NewsItem,
        title_zh: Option<String>,
        content_zh: Option<String>,
    ) -> Self {
        let title_zh = title_zh.filter(|s| !s.is_empty());
        let content_zh = content_zh.filter(|s| !s.is_empty());
        let translation_status =
            TranslationStatus::from_outcome(title_zh.is_some(), content_zh.is_some());

        TranslatedItem {
            id,
            link: source.link.clone(),
            title: source.title.clone(),
            title_zh: title_zh.unwrap_or_else(|| NULL_SENTINEL.to_string()),
            content: source.content.clone(),
            content_zh: content_zh.unwrap_or_else(|| NULL_SENTINEL.to_string()),
            translation_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_derivation_covers_all_cases() {
        assert_eq!(
            TranslationStatus::from_outcome(true, true),
            TranslationStatus::Translated
        );
        assert_eq!(
            TranslationStatus::from_outcome(false, true),
            TranslationStatus::TitleFailed
        );
        assert_eq!(
            TranslationStatus::from_outcome(true, false),
            TranslationStatus::ContentFailed
        );
        assert_eq!(
            TranslationStatus::from_outcome(false, false),
            TranslationStatus::AllFailed
        );
    }

    #[test]
    fn test_status_serializes_to_labels() {
        let labels: Vec<String> = [
            TranslationStatus::Pending,
            TranslationStatus::Translated,
            TranslationStatus::TitleFailed,
            TranslationStatus::ContentFailed,
            TranslationStatus::AllFailed,
        ]
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect();

        assert_eq!(
            labels,
            vec![
                "\"pending\"",
                "\"translated\"",
                "\"title failed\"",
                "\"content failed\"",
                "\"All failed\""
            ]
        );
        assert_eq!(TranslationStatus::AllFailed.to_string(), "All failed");
    }

    #[test]
    fn test_news_item_keeps_unknown_keys() {
        let raw = json!({
            "id": 42,
            "link": "https://example.com/a",
            "title": "Title",
            "content": "<p>Body</p>",
            "author": "Someone",
            "published": "2025-05-06"
        });

        let item: NewsItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.id, Some(ItemId::Number(42.into())));
        assert_eq!(item.content_html(), Some("<p>Body</p>"));
        assert_eq!(item.extra.get("author"), Some(&json!("Someone")));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["published"], json!("2025-05-06"));
        assert!(back.get("title_zh").is_none());
    }

    #[test]
    fn test_mistyped_known_keys_load_as_absent() {
        let item: NewsItem = serde_json::from_value(json!({
            "id": true,
            "link": "c",
            "title": 7,
            "title_zh": ["x"],
            "content": "<p>x</p>",
            "translation_status": "failed"
        }))
        .unwrap();

        assert_eq!(item.id, Some(ItemId::Flag(true)));
        assert_eq!(item.link.as_deref(), Some("c"));
        assert_eq!(item.title, None);
        assert_eq!(item.title_zh, None);
        assert_eq!(item.translation_status, None);
        assert_eq!(item.content_html(), Some("<p>x</p>"));
        // known keys never leak into the catch-all map
        assert!(item.extra.is_empty());
        assert_eq!(item.resolved_id(0).to_string(), "true");
    }

    #[test]
    fn test_non_scalar_id_falls_back_to_placeholder() {
        let item: NewsItem = serde_json::from_value(json!({ "id": {"k": 1} })).unwrap();
        assert_eq!(item.id, None);
        assert_eq!(item.resolved_id(3).to_string(), "debug_3");
    }

    #[test]
    fn test_non_string_content_is_not_html() {
        let item: NewsItem = serde_json::from_value(json!({ "content": ["a"] })).unwrap();
        assert_eq!(item.content_html(), None);
        assert!(item.has_content());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!(3)));
    }

    #[test]
    fn test_resolved_id_placeholder() {
        let item = NewsItem::default();
        assert_eq!(item.resolved_id(7).to_string(), "debug_7");

        let item = NewsItem {
            id: Some(ItemId::Text("abc".to_string())),
            ..Default::default()
        };
        assert_eq!(item.resolved_id(7).to_string(), "abc");
    }

    #[test]
    fn test_assemble_uses_null_sentinel() {
        let source = NewsItem {
            title: Some("Hello".to_string()),
            content: Some(json!("<p>Body</p>")),
            ..Default::default()
        };

        let out = TranslatedItem::assemble(
            ItemId::placeholder(0),
            &source,
            None,
            Some("正文".to_string()),
        );
        assert_eq!(out.title_zh, "null");
        assert_eq!(out.content_zh, "正文");
        assert_eq!(out.translation_status, TranslationStatus::TitleFailed);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["title_zh"], json!("null"));
        assert_eq!(json["link"], json!(null));
    }

    #[test]
    fn test_assemble_treats_empty_translation_as_failed() {
        let source = NewsItem::default();
        let out = TranslatedItem::assemble(
            ItemId::placeholder(1),
            &source,
            Some(String::new()),
            Some(String::new()),
        );
        assert_eq!(out.title_zh, NULL_SENTINEL);
        assert_eq!(out.content_zh, NULL_SENTINEL);
        assert_eq!(out.translation_status, TranslationStatus::AllFailed);
    }

    #[test]
    fn test_translated_item_key_order() {
        let out = TranslatedItem::assemble(
            ItemId::Text("x".to_string()),
            &NewsItem::default(),
            Some("标题".to_string()),
            Some("正文".to_string()),
        );
        let json = serde_json::to_string(&out).unwrap();
        let positions: Vec<usize> = [
            "\"id\"",
            "\"link\"",
            "\"title\"",
            "\"title_zh\"",
            "\"content\"",
            "\"content_zh\"",
            "\"translation_status\"",
        ]
        .iter()
        .map(|k| json.find(k).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
