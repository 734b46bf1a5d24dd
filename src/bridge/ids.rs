//! Numeric identifier extraction from platform URLs.
//!
//! The platform encodes identifiers in its URL conventions rather than in any
//! structured response: `/t123-slug` for topics, `/f45-name` for forums, a
//! trailing `#789` (or `#p789`) fragment for posts, and `start=N` for
//! pagination offsets. Legacy themes also emit `viewtopic?...&t=123` links
//! for the same topics.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

static TOPIC_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/t(\d+)-").expect("valid regex"));
static TOPIC_QUERY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]t=(\d+)").expect("valid regex"));
static TOPIC_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/t\d+-([^/?#]+)").expect("valid regex"));
static FORUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/f(\d+)-").expect("valid regex"));
static POST_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#p?(\d+)$").expect("valid regex"));
static START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]start=(\d+)").expect("valid regex"));
static CANONICAL_TOPIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/t\d+-").expect("valid regex"));
static VIEWTOPIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/viewtopic\?").expect("valid regex"));

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Identifiers recovered from one or more hrefs.
///
/// Every field is optional: a pattern that does not match simply leaves its
/// field empty. Extraction never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedIds {
    pub topic_id: Option<u32>,
    pub forum_id: Option<u32>,
    pub post_id: Option<u32>,
    pub topic_slug: Option<String>,
    /// Pagination offset (`start=N` query parameter).
    pub start: Option<u32>,
    /// The href is a canonical topic page (`/t<id>-<slug>` at path start).
    pub is_topic: bool,
    /// The href is a legacy `viewtopic?` query page.
    pub is_viewtopic: bool,
}

impl ExtractedIds {
    /// Fill fields that are still empty from another extraction.
    ///
    /// Only the optional identifier fields are merged; the page-shape flags
    /// always describe the href this value was first built from.
    pub fn merge_missing(&mut self, other: &ExtractedIds) {
        if self.topic_id.is_none() {
            self.topic_id = other.topic_id;
        }
        if self.forum_id.is_none() {
            self.forum_id = other.forum_id;
        }
        if self.post_id.is_none() {
            self.post_id = other.post_id;
        }
        if self.topic_slug.is_none() {
            self.topic_slug.clone_from(&other.topic_slug);
        }
        if self.start.is_none() {
            self.start = other.start;
        }
    }

    fn is_complete(&self) -> bool {
        self.topic_id.is_some()
            && self.forum_id.is_some()
            && self.post_id.is_some()
            && self.topic_slug.is_some()
            && self.start.is_some()
    }
}

fn capture_u32(re: &Regex, href: &str) -> Option<u32> {
    re.captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Check whether a href points at a canonical topic page (`/t<id>-<slug>`).
#[must_use]
pub fn is_canonical_topic(href: &str) -> bool {
    CANONICAL_TOPIC_RE.is_match(href)
}

/// Check whether a href is a legacy `viewtopic?` query URL.
#[must_use]
pub fn is_viewtopic(href: &str) -> bool {
    VIEWTOPIC_RE.is_match(href)
}

/// Extract identifiers from a single href.
#[must_use]
pub fn extract_from_href(href: &str) -> ExtractedIds {
    let mut ids = ExtractedIds::default();
    if href.is_empty() {
        return ids;
    }

    // Topic id from the canonical path form, or the t= parameter of a
    // legacy viewtopic URL.
    ids.topic_id = capture_u32(&TOPIC_PATH_RE, href);
    if ids.topic_id.is_none() && is_viewtopic(href) {
        ids.topic_id = capture_u32(&TOPIC_QUERY_RE, href);
    }

    ids.topic_slug = TOPIC_SLUG_RE
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    ids.forum_id = capture_u32(&FORUM_RE, href);
    ids.post_id = capture_u32(&POST_ANCHOR_RE, href);
    ids.start = capture_u32(&START_RE, href);
    ids.is_topic = is_canonical_topic(href);
    ids.is_viewtopic = is_viewtopic(href);

    ids
}

/// Collect every anchor href of a document, in document order.
#[must_use]
pub fn anchor_hrefs(doc: &Html) -> Vec<&str> {
    doc.select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|h| !h.is_empty())
        .collect()
}

/// Fill any empty fields of `seed` by scanning every anchor of the document.
///
/// Anchors are visited in document order and each field keeps the first
/// non-empty value seen for it (first-match-wins, not last-match-wins).
#[must_use]
pub fn fill_from_document(doc: &Html, mut seed: ExtractedIds) -> ExtractedIds {
    for href in anchor_hrefs(doc) {
        if seed.is_complete() {
            break;
        }
        seed.merge_missing(&extract_from_href(href));
    }
    seed
}
