//! Rule-based cleanup of scraped article HTML.
//!
//! Each item's `content` is parsed as an HTML fragment and mutated in
//! place on the `scraper` tree, in this order:
//!
//! 1. remove boilerplate tags with their subtrees
//! 2. remove tagged containers by class substring
//! 3. remove ad slots by id prefix / id substring
//! 4. demote `<a>` links to `<b>` holding just the link text
//! 5. strip promotional phrases from text nodes
//!
//! Removing elements can leave text nodes side by side, so the fragment is
//! serialized and re-parsed before step 5; that merges them and lets a
//! phrase interrupted by a removed element be caught. Sanitizing already
//! sanitized content is a no-op.

use crate::models::{NewsItem, TranslationStatus};
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Tags removed together with everything inside them.
pub const TAGS_TO_REMOVE: &[&str] = &[
    "span",
    "strong",
    "em",
    "section",
    "small",
    "figcaption",
    "img",
    "figure",
    "script",
    "h4",
];

/// `(tag, class substrings)`: an element is removed when its tag matches and
/// its `class` attribute contains one of the substrings.
pub const CLASS_RULES: &[(&str, &[&str])] = &[
    ("ul", &["lcp_catlist"]),
    ("div", &["tnp", "tnp-subscription", "alignright"]),
    ("p", &["text-above-ad"]),
];

/// Elements whose id starts with one of these are removed.
pub const ID_PREFIXES: &[&str] = &["article-mpu"];

/// Elements whose id contains one of these are removed.
pub const ID_FRAGMENTS: &[&str] = &["snack_dex"];

/// Promotional phrases cut out of every text node.
pub const UNWANTED_TEXTS: &[&str] = &[
    "Become a RaceFans supporter",
    "Go ad-free for just £1 per month",
    "Find out more and sign up",
];

/// Clean one HTML fragment and return the serialized result.
pub fn sanitize_html(html: &str) -> String {
    let mut fragment = Html::parse_fragment(html);

    debug!(
        has_alignright = has_alignright(&fragment),
        "Before cleaning"
    );

    let mut removed = 0;
    for tag in TAGS_TO_REMOVE {
        removed += detach_matching(&mut fragment, |el| el.name() == *tag);
    }

    for (tag, needles) in CLASS_RULES {
        for needle in *needles {
            removed += detach_matching(&mut fragment, |el| {
                el.name() == *tag && el.attr("class").is_some_and(|c| c.contains(needle))
            });
        }
    }

    for prefix in ID_PREFIXES {
        removed += detach_matching(&mut fragment, |el| {
            el.attr("id").is_some_and(|id| id.starts_with(prefix))
        });
    }
    for needle in ID_FRAGMENTS {
        removed += detach_matching(&mut fragment, |el| {
            el.attr("id").is_some_and(|id| id.contains(needle))
        });
    }

    debug!(
        has_alignright = has_alignright(&fragment),
        removed,
        "After cleaning"
    );

    demote_links(&mut fragment);

    let mut merged = Html::parse_fragment(&fragment.root_element().inner_html());
    scrub_text(&mut merged);

    merged.root_element().inner_html()
}

/// Sanitize every item, then drop the ones left without content.
///
/// Items without string content are not touched by the rules; they are
/// kept only if their content is truthy.
#[instrument(level = "info", skip_all, fields(count = items.len()))]
pub fn clean_items(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    for item in items.iter_mut() {
        clean_item(item);
    }

    let before = items.len();
    items.retain(NewsItem::has_content);
    info!(
        kept = items.len(),
        dropped = before - items.len(),
        "Cleaned items"
    );
    items
}

fn clean_item(item: &mut NewsItem) {
    let cleaned = match item.content_html() {
        Some(html) => sanitize_html(html),
        None => {
            debug!(id = ?item.id, "Content missing or not a string; left untouched");
            return;
        }
    };

    item.content = Some(Value::String(cleaned));
    item.translation_status = Some(TranslationStatus::Pending);
    item.content_zh = Some(String::new());
}

/// Detach every element under the fragment root matching `predicate`.
fn detach_matching<F>(fragment: &mut Html, predicate: F) -> usize
where
    F: Fn(&Element) -> bool,
{
    let doomed: Vec<_> = fragment
        .root_element()
        .descendants()
        .filter(|node| matches!(node.value(), Node::Element(el) if predicate(el)))
        .map(|node| node.id())
        .collect();

    let count = doomed.len();
    for node_id in doomed {
        if let Some(mut node) = fragment.tree.get_mut(node_id) {
            node.detach();
        }
    }
    count
}

fn has_alignright(fragment: &Html) -> bool {
    fragment.root_element().descendants().any(|node| {
        matches!(node.value(), Node::Element(el)
            if el.name() == "div" && el.classes().any(|c| c == "alignright"))
    })
}

/// A bare `<b>` element to clone into the tree being cleaned.
fn bold_element() -> Option<Node> {
    let template = Html::parse_fragment("<b></b>");
    template
        .root_element()
        .children()
        .find(|child| matches!(child.value(), Node::Element(el) if el.name() == "b"))
        .map(|child| child.value().clone())
}

fn demote_links(fragment: &mut Html) {
    let anchors: Vec<_> = fragment
        .root_element()
        .descendants()
        .filter_map(|node| {
            let el = ElementRef::wrap(node)?;
            (el.value().name() == "a").then(|| (node.id(), el.text().collect::<String>()))
        })
        .collect();

    if anchors.is_empty() {
        return;
    }
    let Some(bold) = bold_element() else {
        return;
    };

    for (node_id, label) in anchors {
        let Some(mut anchor) = fragment.tree.get_mut(node_id) else {
            continue;
        };
        if anchor.parent().is_none() {
            continue;
        }
        {
            let mut replacement = anchor.insert_before(bold.clone());
            if !label.is_empty() {
                replacement.append(Node::Text(Text {
                    text: label.as_str().into(),
                }));
            }
        }
        anchor.detach();
    }
}

fn scrub_text(fragment: &mut Html) {
    let hits: Vec<_> = fragment
        .root_element()
        .descendants()
        .filter(|node| {
            matches!(node.value(), Node::Text(t)
                if UNWANTED_TEXTS.iter().any(|phrase| t.text.contains(phrase)))
        })
        .map(|node| node.id())
        .collect();

    for node_id in hits {
        let Some(mut node) = fragment.tree.get_mut(node_id) else {
            continue;
        };
        if let Node::Text(text) = node.value() {
            text.text = scrub_phrases(&text.text).as_str().into();
        }
    }
}

/// Remove promotional phrases until none is left, including ones formed
/// by a removal joining the text around it.
fn scrub_phrases(text: &str) -> String {
    let mut current = text.to_string();
    while UNWANTED_TEXTS.iter().any(|phrase| current.contains(phrase)) {
        current = UNWANTED_TEXTS
            .iter()
            .fold(current, |acc, phrase| acc.replace(phrase, ""));
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(content: Value) -> NewsItem {
        NewsItem {
            link: Some("a".to_string()),
            content: Some(content),
            ..Default::default()
        }
    }

    #[test]
    fn test_tnp_div_removed_and_status_reset() {
        let items = vec![NewsItem {
            translation_status: Some(TranslationStatus::Translated),
            content_zh: Some("旧的".to_string()),
            ..item(json!("<div class='tnp'>x</div><p>keep</p>"))
        }];

        let cleaned = clean_items(items);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content_html(), Some("<p>keep</p>"));
        assert_eq!(
            cleaned[0].translation_status,
            Some(TranslationStatus::Pending)
        );
        assert_eq!(cleaned[0].content_zh.as_deref(), Some(""));
    }

    #[test]
    fn test_removes_listed_tags_with_subtrees() {
        let html = "<p>a<span>b<i>c</i></span>d</p><figure><img src='x'><figcaption>cap</figcaption></figure>\
                    <script>evil()</script><h4>Related</h4><section><p>promo</p></section>\
                    <p><em>e</em><strong>s</strong><small>f</small>g</p>";
        assert_eq!(sanitize_html(html), "<p>ad</p><p>g</p>");
    }

    #[test]
    fn test_class_rules_use_substring_match() {
        let html = "<div class='wrap tnp-subscription-box'>sub</div>\
                    <div class='alignright'>side</div>\
                    <ul class='lcp_catlist other'><li>x</li></ul>\
                    <p class='text-above-ad'>Advert</p>\
                    <p class='tnp'>p is not a tnp target</p>\
                    <div class='content'>body</div>";
        assert_eq!(
            sanitize_html(html),
            "<p class=\"tnp\">p is not a tnp target</p><div class=\"content\">body</div>"
        );
    }

    #[test]
    fn test_id_rules() {
        let html = "<div id='article-mpu-1'>ad</div>\
                    <div id='x-article-mpu'>kept</div>\
                    <div id='pre_snack_dex_post'>ad</div>\
                    <p id='body'>text</p>";
        assert_eq!(
            sanitize_html(html),
            "<div id=\"x-article-mpu\">kept</div><p id=\"body\">text</p>"
        );
    }

    #[test]
    fn test_links_become_bold_text() {
        let html = "<p>See <a href='https://example.com' class='c'>the <i>story</i></a> now</p>";
        assert_eq!(sanitize_html(html), "<p>See <b>the story</b> now</p>");
    }

    #[test]
    fn test_link_with_removed_children_keeps_remaining_text() {
        let html = "<p><a href='/x'><span>hidden</span>shown</a></p>";
        assert_eq!(sanitize_html(html), "<p><b>shown</b></p>");
    }

    #[test]
    fn test_promotional_phrases_scrubbed_from_text() {
        let html = "<p>Become a RaceFans supporter today. Go ad-free for just £1 per month</p>\
                    <p>Find out more and sign up</p>";
        assert_eq!(sanitize_html(html), "<p> today. </p><p></p>");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let html = "<div class='alignright'>x</div><p>Intro <a href='#'>link</a> \
                    Become a RaceFans supporter</p><ul class='lcp_catlist'><li>1</li></ul>\
                    <p>Caf\u{e9} &amp; <b>bold</b></p><div id='snack_dex1'></div>\
                    <p>Go ad-free <em>now</em>for just £1 per month</p>";
        let once = sanitize_html(html);
        let twice = sanitize_html(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_phrase_split_by_removed_tag_is_scrubbed() {
        let html = "<p>Become a <span>x</span>RaceFans supporter</p>";
        let once = sanitize_html(html);
        assert_eq!(once, "<p></p>");
        assert_eq!(sanitize_html(&once), once);
    }

    #[test]
    fn test_phrase_joined_by_scrubbing_is_scrubbed() {
        let html = "<p>Become a Become a RaceFans supporterRaceFans supporter!</p>";
        let once = sanitize_html(html);
        assert_eq!(once, "<p>!</p>");
        assert_eq!(sanitize_html(&once), once);
    }

    #[test]
    fn test_item_emptied_by_cleaning_is_dropped() {
        let items = vec![
            item(json!("<div class='tnp'>only an ad</div>")),
            item(json!("<p>untouched</p>")),
        ];
        let cleaned = clean_items(items);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content_html(), Some("<p>untouched</p>"));
    }

    #[test]
    fn test_malformed_items_pass_through_filter() {
        let items = vec![
            NewsItem {
                title: Some("no content".to_string()),
                ..Default::default()
            },
            item(json!(null)),
            item(json!(12)),
            item(json!("")),
        ];
        let cleaned = clean_items(items);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content, Some(json!(12)));
        // untouched: status is not reset for non-string content
        assert_eq!(cleaned[0].translation_status, None);
        assert_eq!(cleaned[0].content_zh, None);
    }
}
