//! Forum listing page statistics.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::pagination::{parse_pagination, Pagination};
use crate::bridge::ids::extract_from_href;

const DEFAULT_FORUM_PAGE_SIZE: u32 = 50;

/// Topic-row selectors across theme templates; the best populated one wins.
const TOPIC_ROW_CANDIDATES: &[&str] = &[
    "tr.topic",
    "tr.rowtopic",
    "li.topic",
    "div.topic",
    "div.topics li",
    "a.topictitle",
    ".topicslist_row.row",
];

static CANONICAL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.page-title, h1, .page-title").expect("valid selector"));
static NEW_TOPIC_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"a[href*="mode=newtopic"], a[href*="post?f="], .button-newtopic, .btn-newtopic,
           form[action*="mode=newtopic"], form[action*="/post"]"#,
    )
    .expect("valid selector")
});

/// Statistics derived from one forum listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumStats {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub href: Option<String>,
    pub pagination: Pagination,
    /// Topic rows actually counted on the current page.
    pub topics_visible: Option<u32>,
    /// Estimate over all pages, when pagination is known.
    pub topics_estimated: Option<u32>,
    /// Whether the page offers a way to open a new topic.
    pub can_post: bool,
}

impl ForumStats {
    /// Best available topic count: the pagination estimate, falling back to
    /// the visible count.
    #[must_use]
    pub fn topics_count(&self) -> Option<u32> {
        self.topics_estimated.or(self.topics_visible)
    }
}

fn count_topic_rows(doc: &Html) -> Option<u32> {
    let mut best = 0;
    for candidate in TOPIC_ROW_CANDIDATES {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        best = best.max(doc.select(&selector).count());
    }
    u32::try_from(best).ok().filter(|&n| n > 0)
}

/// Parse statistics out of a forum listing page.
#[must_use]
pub fn parse_forum_stats(doc: &Html, page_size_override: Option<u32>) -> ForumStats {
    let canonical = doc
        .select(&CANONICAL_SELECTOR)
        .next()
        .and_then(|l| l.value().attr("href"))
        .map(String::from);
    let forum_id = canonical
        .as_deref()
        .and_then(|href| extract_from_href(href).forum_id);

    let name = doc
        .select(&TITLE_SELECTOR)
        .next()
        .map(|h| h.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|n| !n.is_empty());

    let topics_visible = count_topic_rows(doc);
    let can_post = doc.select(&NEW_TOPIC_SELECTOR).next().is_some();

    let pagination = parse_pagination(doc, page_size_override, DEFAULT_FORUM_PAGE_SIZE);
    let topics_estimated = pagination.estimated_entries();

    ForumStats {
        id: forum_id,
        name,
        href: canonical,
        pagination,
        topics_visible,
        topics_estimated,
        can_post,
    }
}
