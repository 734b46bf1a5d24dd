//! Pagination detection for topic and forum listing pages.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static PAGER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".pagination, .pagelink, .topic-actions .pagination").expect("valid selector")
});
static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("valid selector"));
static PAGER_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

// "page 1 sur 750" (FR) or "page 1 of 750" (EN)
static PAGE_OF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"page\s+(\d+)\s+(?:sur|of)\s+(\d+)").expect("valid regex"));
// Inline pager script: start = (start - 1) * 35;
static PAGE_SIZE_SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"start\s*=\s*\(start\s*-\s*1\)\s*\*\s*(\d+)").expect("valid regex"));
static PAGED_FORUM_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/f\d+p(\d+)-").expect("valid regex"));

/// Detected pagination state of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current: Option<u32>,
    pub total: Option<u32>,
    /// Detected (or assumed) number of entries per page.
    pub page_size: u32,
}

impl Pagination {
    /// Total entry estimate: pages times page size, when the page count is
    /// known.
    #[must_use]
    pub fn estimated_entries(&self) -> Option<u32> {
        self.total.map(|pages| pages.saturating_mul(self.page_size))
    }
}

/// Parse the pagination block of a listing page.
///
/// Page size is taken from, in order: the caller's override, the pager's
/// inline offset script, the smallest positive offset among paged forum
/// links, then `default_page_size`.
#[must_use]
pub fn parse_pagination(
    doc: &Html,
    page_size_override: Option<u32>,
    default_page_size: u32,
) -> Pagination {
    let pager = doc.select(&PAGER_SELECTOR).next();

    let (current, total) = pager
        .map(|p| {
            let text = p.text().collect::<Vec<_>>().join(" ").to_lowercase();
            PAGE_OF_RE
                .captures(&text)
                .map_or((None, None), |c| {
                    (
                        c.get(1).and_then(|m| m.as_str().parse().ok()),
                        c.get(2).and_then(|m| m.as_str().parse().ok()),
                    )
                })
        })
        .unwrap_or((None, None));

    let mut page_size = page_size_override;

    if page_size.is_none() {
        if let Some(p) = pager {
            page_size = p
                .select(&SCRIPT_SELECTOR)
                .filter_map(|s| {
                    let code = s.text().collect::<String>();
                    PAGE_SIZE_SCRIPT_RE
                        .captures(&code)
                        .and_then(|c| c.get(1))
                        .and_then(|m| m.as_str().parse().ok())
                })
                .next();
        }
    }

    if page_size.is_none() {
        if let Some(p) = pager {
            // The smallest non-zero offset among paged links is usually the
            // page size itself.
            page_size = p
                .select(&PAGER_LINK_SELECTOR)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| {
                    PAGED_FORUM_LINK_RE
                        .captures(href)
                        .and_then(|c| c.get(1))
                        .and_then(|m| m.as_str().parse::<u32>().ok())
                })
                .filter(|&n| n > 0)
                .min();
        }
    }

    Pagination {
        current,
        total,
        page_size: page_size.unwrap_or(default_page_size),
    }
}
