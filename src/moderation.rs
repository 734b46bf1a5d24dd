//! Thread and identity resolution helpers.
//!
//! Some moderation requests need identifiers the caller does not have at
//! hand: splitting posts needs the source topic and target forum, and
//! private messages need usernames while callers usually hold numeric user
//! ids. The platform leaks each of these through an existing page — the
//! quote form of a post carries its topic id, the modcp move form carries
//! the topic's forum id, and a profile page carries the username.

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Resolve the topic a post belongs to.
///
/// An explicit id short-circuits the lookup; otherwise the post's quote form
/// is fetched and its hidden `t` field read back.
pub async fn resolve_topic_id(
    transport: &dyn Transport,
    explicit: Option<u32>,
    post_id: u32,
) -> Result<u32> {
    if let Some(topic_id) = explicit {
        return Ok(topic_id);
    }
    let url = format!("/post?p={post_id}&mode=quote");
    let form = transport.get_form(&url, r#"form[method="post"]"#).await?;
    form.get_u32("t").ok_or_else(|| {
        Error::Validation(format!("topic id not present in quote form for post {post_id}"))
    })
}

/// Resolve the forum a topic currently lives in.
///
/// An explicit id short-circuits the lookup; otherwise the modcp move form
/// for the topic is fetched and its `f` field read back. Requires the
/// moderation token.
pub async fn resolve_forum_id(
    transport: &dyn Transport,
    topic_id: u32,
    explicit: Option<u32>,
    tid: &str,
) -> Result<u32> {
    if let Some(forum_id) = explicit {
        return Ok(forum_id);
    }
    let url = format!("/modcp?mode=move&t={topic_id}&tid={tid}");
    let form = transport.get_form(&url, r#"form[method="post"]"#).await?;
    form.get_u32("f").ok_or_else(|| {
        Error::Validation(format!("forum id not present in move form for topic {topic_id}"))
    })
}

static PROFILE_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.page-title, h1, title").expect("valid selector"));
static PROFILE_TITLE_PREFIX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"(?i)^(tout à propos de|all about)\s*").expect("valid regex")
});

/// Pull the username out of a profile page heading.
///
/// Themes title the page either with the bare username or with an
/// "All about ..." / "Tout à propos de ..." prefix.
#[must_use]
pub fn username_from_profile(doc: &scraper::Html) -> Option<String> {
    doc.select(&PROFILE_TITLE_SELECTOR)
        .map(|el| {
            let text = el.text().collect::<Vec<_>>().join(" ");
            PROFILE_TITLE_PREFIX
                .replace(text.trim(), "")
                .trim()
                .to_string()
        })
        .find(|name| !name.is_empty())
}

/// Resolve a numeric user id to a username via the profile page heading.
pub async fn resolve_username(transport: &dyn Transport, user_id: u32) -> Result<String> {
    let url = format!("/u{user_id}");
    let page = transport.get(&url).await?;
    if !page.ok {
        return Err(Error::HttpStatus {
            status: page.status,
            url,
        });
    }
    let doc = page.document();
    username_from_profile(&doc).ok_or_else(|| {
        Error::Validation(format!("username not found on profile page for user {user_id}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_profile_title_prefix_is_stripped() {
        let doc = Html::parse_document(r#"<h1 class="page-title">Tout à propos de alice</h1>"#);
        assert_eq!(username_from_profile(&doc).as_deref(), Some("alice"));
    }

    #[test]
    fn test_bare_heading_is_taken_as_is() {
        let doc = Html::parse_document("<h1>bob</h1>");
        assert_eq!(username_from_profile(&doc).as_deref(), Some("bob"));
    }

    #[test]
    fn test_empty_profile_page() {
        let doc = Html::parse_document("<div></div>");
        assert_eq!(username_from_profile(&doc), None);
    }
}
