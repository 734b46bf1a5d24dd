//! Topic page statistics.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::pagination::{parse_pagination, Pagination};
use crate::bridge::ids::extract_from_href;
use crate::context::jsonld;

const DEFAULT_TOPIC_PAGE_SIZE: u32 = 25;

static CANONICAL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.page-title").expect("valid selector"));
static POST_BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".postbody").expect("valid selector"));

/// Statistics derived from one topic page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicStats {
    pub id: Option<u32>,
    pub url: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub pagination: Pagination,
    /// Posts actually counted on the current page.
    pub replies_visible: Option<u32>,
    /// Estimate over all pages, when pagination is known.
    pub replies_estimated: Option<u32>,
}

impl TopicStats {
    /// Best available reply count: the pagination estimate, falling back to
    /// the visible count.
    #[must_use]
    pub fn replies_count(&self) -> Option<u32> {
        self.replies_estimated.or(self.replies_visible)
    }
}

/// Parse statistics out of a topic page.
#[must_use]
pub fn parse_topic_stats(doc: &Html, page_size_override: Option<u32>) -> TopicStats {
    let canonical = doc
        .select(&CANONICAL_SELECTOR)
        .next()
        .and_then(|l| l.value().attr("href"))
        .map(String::from);
    let ids = canonical.as_deref().map(extract_from_href).unwrap_or_default();

    // JSON-LD headline beats the themed heading when present.
    let title = jsonld::extract_discussions(doc)
        .into_iter()
        .find_map(|d| d.headline)
        .or_else(|| {
            doc.select(&TITLE_SELECTOR).next().map(|h| {
                h.text().collect::<Vec<_>>().join(" ").trim().to_string()
            })
        })
        .filter(|t| !t.is_empty());

    let visible = u32::try_from(doc.select(&POST_BODY_SELECTOR).count()).ok();
    let replies_visible = visible.filter(|&n| n > 0);

    let pagination = parse_pagination(doc, page_size_override, DEFAULT_TOPIC_PAGE_SIZE);
    let replies_estimated = pagination.estimated_entries();

    TopicStats {
        id: ids.topic_id,
        url: canonical,
        slug: ids.topic_slug,
        title,
        pagination,
        replies_visible,
        replies_estimated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_stats_from_canonical_and_jsonld() {
        let html = r#"
            <head><link rel="canonical" href="https://x/t42-mon-sujet"></head>
            <script type="application/ld+json">
            {"@type": "DiscussionForumPosting", "headline": "Mon sujet"}
            </script>
            <div class="postbody">un</div>
            <div class="postbody">deux</div>
            <div class="pagination">Page 1 sur 4</div>
        "#;
        let doc = Html::parse_document(html);
        let stats = parse_topic_stats(&doc, None);
        assert_eq!(stats.id, Some(42));
        assert_eq!(stats.slug.as_deref(), Some("mon-sujet"));
        assert_eq!(stats.title.as_deref(), Some("Mon sujet"));
        assert_eq!(stats.replies_visible, Some(2));
        assert_eq!(stats.replies_estimated, Some(100));
        assert_eq!(stats.replies_count(), Some(100));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let html = r#"<h1 class="page-title">Titre du fil</h1>"#;
        let doc = Html::parse_document(html);
        let stats = parse_topic_stats(&doc, None);
        assert_eq!(stats.title.as_deref(), Some("Titre du fil"));
        assert_eq!(stats.id, None);
        assert_eq!(stats.replies_count(), None);
    }
}
