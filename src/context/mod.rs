//! Page context detection: what page are we on, and which moderation token
//! does it carry.
//!
//! Moderation-control endpoints require a per-session token (`tid`) that the
//! platform embeds in the current page's DOM or links. The context is
//! computed from a URL plus its parsed document and cached behind an explicit
//! memoizing accessor owned by the client.

pub mod jsonld;

use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::Result;
use crate::transport::Transport;

static TOPIC_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/t\d+(p\d+)?-").expect("valid regex"));
static FORUM_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/f\d+(p\d+)?-").expect("valid regex"));
static CATEGORY_PAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/c\d+-").expect("valid regex"));
static PROFILE_PAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/u\d+").expect("valid regex"));
static MODCP_MODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/modcp\?mode=([^&]+)").expect("valid regex"));
static RESOURCE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[tfc](\d+)(?:p\d+)?-").expect("valid regex"));
static PROFILE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/u(\d+)").expect("valid regex"));
static PAGE_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[tf]\d+p(\d+)-").expect("valid regex"));
static TID_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[?&]tid=([a-z0-9]+)").expect("valid regex"));

static TID_INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[name="tid"]"#).expect("valid selector"));
static TID_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="tid="]"#).expect("valid selector"));
static META_CHARSET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[charset]").expect("valid selector"));
static META_CONTENT_TYPE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[http-equiv="Content-Type"]"#).expect("valid selector")
});
static CHARSET_IN_CONTENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)charset=([a-z0-9_-]+)").expect("valid regex"));

/// Kind of page the context URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageType {
    Topic,
    Forum,
    Category,
    Profile,
    Inbox,
    /// Moderation control panel, with its `mode` query value.
    ModCp(String),
    Other,
}

/// Everything the resource wrappers need to know about the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub url: String,
    /// Moderation token, when the page carries one.
    pub tid: Option<String>,
    pub page_type: PageType,
    /// Numeric id of the topic/forum/category/profile the page is about.
    pub resource_id: Option<u32>,
    /// Page number within a paginated topic/forum (`/t12p30-`), if any.
    pub page_num: Option<u32>,
    pub charset: String,
    /// URL fragment, without the leading `#`.
    pub anchor: Option<String>,
}

impl PageContext {
    /// Compute the context for a URL and its parsed document.
    #[must_use]
    pub fn from_page(url: &str, doc: &Html) -> Self {
        let (path_query, anchor) = match url.split_once('#') {
            Some((head, frag)) if !frag.is_empty() => (head, Some(frag.to_string())),
            Some((head, _)) => (head, None),
            None => (url, None),
        };
        let path = path_and_query(path_query);

        Self {
            url: url.to_string(),
            tid: detect_tid(doc),
            page_type: detect_page_type(&path),
            resource_id: detect_resource_id(&path),
            page_num: capture_u32(&PAGE_NUM_RE, &path),
            charset: detect_charset(doc),
            anchor,
        }
    }
}

/// Strip scheme and host if the URL is absolute, keeping path plus query.
fn path_and_query(url: &str) -> String {
    url::Url::parse(url).map_or_else(
        |_| url.to_string(),
        |u| {
            let mut s = u.path().to_string();
            if let Some(q) = u.query() {
                s.push('?');
                s.push_str(q);
            }
            s
        },
    )
}

fn capture_u32(re: &Regex, s: &str) -> Option<u32> {
    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn detect_page_type(path: &str) -> PageType {
    if TOPIC_PAGE_RE.is_match(path) {
        PageType::Topic
    } else if FORUM_PAGE_RE.is_match(path) {
        PageType::Forum
    } else if CATEGORY_PAGE_RE.is_match(path) {
        PageType::Category
    } else if PROFILE_PAGE_RE.is_match(path) {
        PageType::Profile
    } else if path.starts_with("/privmsg") {
        PageType::Inbox
    } else if let Some(mode) = MODCP_MODE_RE
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
    {
        PageType::ModCp(mode)
    } else {
        PageType::Other
    }
}

fn detect_resource_id(path: &str) -> Option<u32> {
    capture_u32(&RESOURCE_ID_RE, path).or_else(|| capture_u32(&PROFILE_ID_RE, path))
}

/// Locate the moderation token: a hidden `input[name=tid]` first, then any
/// link carrying a `tid=` parameter.
fn detect_tid(doc: &Html) -> Option<String> {
    if let Some(value) = doc
        .select(&TID_INPUT_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("value"))
        .filter(|v| !v.is_empty())
    {
        return Some(value.to_string());
    }
    doc.select(&TID_LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| {
            TID_PARAM_RE
                .captures(href)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
}

fn detect_charset(doc: &Html) -> String {
    if let Some(charset) = doc
        .select(&META_CHARSET_SELECTOR)
        .next()
        .and_then(|m| m.value().attr("charset"))
    {
        return charset.to_lowercase();
    }
    doc.select(&META_CONTENT_TYPE_SELECTOR)
        .next()
        .and_then(|m| m.value().attr("content"))
        .and_then(|content| {
            CHARSET_IN_CONTENT_RE
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_lowercase())
        })
        .unwrap_or_else(|| "utf-8".to_string())
}

/// Memoizing accessor for the page context.
///
/// Fetches and computes lazily on first use, then serves the cached value
/// until it is explicitly invalidated. Last-writer-wins; the cache exists to
/// avoid redundant recomputation, not to guarantee freshness.
pub struct ContextCache {
    page_url: String,
    cached: Mutex<Option<PageContext>>,
}

impl ContextCache {
    /// Cache a context computed from the given page.
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            cached: Mutex::new(None),
        }
    }

    /// Get the context, fetching the page on first use.
    pub async fn get(&self, transport: &dyn Transport) -> Result<PageContext> {
        if let Some(ctx) = self.peek() {
            return Ok(ctx);
        }
        let resp = transport.get(&self.page_url).await?;
        let ctx = {
            let doc = resp.document();
            PageContext::from_page(&self.page_url, &doc)
        };
        self.prime(ctx.clone());
        Ok(ctx)
    }

    /// Currently cached value, if any, without fetching.
    #[must_use]
    pub fn peek(&self) -> Option<PageContext> {
        self.cached
            .lock()
            .expect("context cache lock poisoned")
            .clone()
    }

    /// Drop the cached value so the next `get` recomputes it.
    pub fn invalidate(&self) {
        *self.cached.lock().expect("context cache lock poisoned") = None;
    }

    /// Inject a precomputed context (e.g. from a page already in hand).
    pub fn prime(&self, ctx: PageContext) {
        *self.cached.lock().expect("context cache lock poisoned") = Some(ctx);
    }
}
