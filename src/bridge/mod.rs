//! Response bridge: turn a raw HTML response into a normalized result.
//!
//! Form submissions against the platform come back as ordinary themed pages;
//! the bridge is the heuristic classifier that decides what action the server
//! actually performed, whether it succeeded, and which identifiers the page
//! leaks about the affected object. It is a pure function over a single
//! response: malformed or unexpected markup degrades to `Unknown`/`false`/
//! empty fields, never to a panic or an error.

pub mod action;
pub mod ids;
pub mod message;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Serialize;

use crate::constants::INBOX_PATH;
use crate::transport::PageResponse;

pub use action::{classify, has_error_marker, validate, ActionKind, ActionRule, ACTION_RULES};
pub use ids::{extract_from_href, fill_from_document, is_canonical_topic, is_viewtopic, ExtractedIds};
pub use message::extract_message;

// Link resolution accepts paginated topic/forum pages (`/t12p30-`) too, not
// only the canonical first-page form.
static TOPIC_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/t\d+(?:p\d+)?-").expect("valid regex"));
static FORUM_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/f\d+(?:p\d+)?-").expect("valid regex"));

/// Salient outbound links found in the response page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Links {
    /// Href of the first anchor in the document.
    pub first: Option<String>,
    /// Best available link to the affected topic (canonical if possible).
    pub topic: Option<String>,
    /// First link to a forum page.
    pub forum: Option<String>,
}

/// Normalized payload for an identifiable created/affected object.
///
/// Decided once at bridge time so downstream code switches on the tag rather
/// than re-probing the raw response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    #[default]
    None,
    Topic(TopicEntity),
    Post(PostEntity),
    Pm(PmEntity),
}

impl Entity {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn as_topic(&self) -> Option<&TopicEntity> {
        match self {
            Self::Topic(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_post(&self) -> Option<&PostEntity> {
        match self {
            Self::Post(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pm(&self) -> Option<&PmEntity> {
        match self {
            Self::Pm(pm) => Some(pm),
            _ => None,
        }
    }
}

/// A newly created topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicEntity {
    pub id: Option<u32>,
    pub url: Option<String>,
    pub slug: Option<String>,
    pub forum_id: Option<u32>,
}

/// A newly posted reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostEntity {
    pub id: Option<u32>,
    pub topic_id: Option<u32>,
    pub url: Option<String>,
}

/// A sent private message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PmEntity {
    pub inbox_url: String,
}

/// The normalized outcome of one moderation/posting round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeResult {
    /// Whether the server is judged to have performed the action.
    pub ok: bool,
    /// HTTP status code of the response.
    pub status: u16,
    /// Classified action kind.
    pub action: ActionKind,
    /// Human-readable confirmation/error text extracted from the page.
    pub message: String,
    /// Identifiers recovered from the response's links.
    pub ids: ExtractedIds,
    /// Salient outbound links.
    pub links: Links,
    /// Action-specific normalized payload; populated only on success.
    pub entity: Entity,
    /// Raw href of the first anchor (low-level escape hatch).
    pub href: String,
    /// Original response body, retained for caller-level fallback parsing.
    pub raw: String,
}

/// Run the bridge over a transport response.
#[must_use]
pub fn parse(resp: &PageResponse) -> BridgeResult {
    let doc = resp.document();
    parse_document(&doc, resp.status, &resp.text)
}

/// Run the bridge over an already-parsed document.
#[must_use]
pub fn parse_document(doc: &Html, status: u16, raw: &str) -> BridgeResult {
    let message = extract_message(doc);
    let anchors = ids::anchor_hrefs(doc);

    let href = anchors.first().copied().unwrap_or("").to_string();
    let extracted = extract_from_href(&href);
    let extracted = fill_from_document(doc, extracted);

    let action = classify(&message);
    let ok = !has_error_marker(doc) && validate(action, &message);

    let links = Links {
        first: non_empty(&href),
        topic: resolve_topic_link(&anchors),
        forum: anchors
            .iter()
            .find(|h| FORUM_HREF_RE.is_match(h))
            .map(|h| (*h).to_string()),
    };

    let entity = if ok {
        build_entity(action, &extracted, &links, &href)
    } else {
        Entity::None
    };

    tracing::debug!(action = %action, ok, status, "bridged response");

    BridgeResult {
        ok,
        status,
        action,
        message,
        ids: extracted,
        links,
        entity,
        href,
        raw: raw.to_string(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// First topic-shaped link, upgraded to a canonical `/t<id>-` link when the
/// document offers one and the first hit was a legacy `viewtopic` URL. A
/// legacy link with no canonical counterpart is kept as-is: it still works,
/// it just is not the canonical form.
fn resolve_topic_link(anchors: &[&str]) -> Option<String> {
    let first = anchors
        .iter()
        .find(|h| TOPIC_HREF_RE.is_match(h) || is_viewtopic(h))?;
    if is_viewtopic(first) {
        if let Some(canonical) = anchors.iter().find(|h| is_canonical_topic(h)) {
            return Some((*canonical).to_string());
        }
    }
    Some((*first).to_string())
}

fn build_entity(action: ActionKind, ids: &ExtractedIds, links: &Links, href: &str) -> Entity {
    match action {
        // A reply whose first link lands on a canonical topic page means a
        // brand-new topic was created, not an ordinary reply.
        ActionKind::ForumPost => Entity::Topic(topic_entity(ids, links)),
        ActionKind::TopicPost if ids.is_topic => Entity::Topic(topic_entity(ids, links)),
        ActionKind::TopicPost => Entity::Post(PostEntity {
            id: ids.post_id,
            topic_id: ids.topic_id,
            url: links.topic.clone().or_else(|| non_empty(href)),
        }),
        ActionKind::UserPm => Entity::Pm(PmEntity {
            inbox_url: INBOX_PATH.to_string(),
        }),
        _ => Entity::None,
    }
}

fn topic_entity(ids: &ExtractedIds, links: &Links) -> TopicEntity {
    TopicEntity {
        id: ids.topic_id,
        url: links.topic.clone(),
        slug: ids.topic_slug.clone(),
        forum_id: ids.forum_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(html: &str) -> BridgeResult {
        let doc = Html::parse_document(html);
        parse_document(&doc, 200, html)
    }

    #[test]
    fn test_move_confirmation() {
        let html = r#"
            <p>Le sujet a été déplacé avec succès.</p>
            <a href="/t42-mon-sujet">Retour au sujet</a>
        "#;
        let result = bridge(html);
        assert!(result.ok);
        assert_eq!(result.action, ActionKind::TopicMove);
        assert_eq!(result.ids.topic_id, Some(42));
        assert_eq!(result.ids.topic_slug, Some("mon-sujet".to_string()));
        assert!(result.entity.is_none());
        assert_eq!(result.raw, html);
    }

    #[test]
    fn test_new_topic_confirmation() {
        let html = r#"
            <p>Votre nouveau sujet a été créé.</p>
            <a href="/t99-bienvenue">Voir le sujet</a>
            <a href="/f7-accueil">Retour au forum</a>
        "#;
        let result = bridge(html);
        assert!(result.ok);
        assert_eq!(result.action, ActionKind::ForumPost);
        let topic = result.entity.as_topic().expect("topic entity");
        assert_eq!(topic.id, Some(99));
        assert_eq!(topic.url.as_deref(), Some("/t99-bienvenue"));
        assert_eq!(topic.slug.as_deref(), Some("bienvenue"));
        assert_eq!(topic.forum_id, Some(7));
        assert_eq!(result.links.forum.as_deref(), Some("/f7-accueil"));
    }

    #[test]
    fn test_no_keyword_is_unknown() {
        let result = bridge("<p>Bienvenue sur le forum.</p>");
        assert!(!result.ok);
        assert_eq!(result.action, ActionKind::Unknown);
        assert!(result.entity.is_none());
        assert_eq!(result.links, Links::default());
    }

    #[test]
    fn test_both_lock_keywords_classify_as_unlock() {
        let result = bridge("<p>Le sujet verrouillé a été déverrouillé.</p>");
        assert!(result.ok);
        assert_eq!(result.action, ActionKind::TopicUnlock);
    }

    #[test]
    fn test_error_box_forces_failure() {
        let html = r#"
            <div class="box-content error"><p>Le sujet a été déplacé</p></div>
            <a href="/t42-mon-sujet">lien</a>
        "#;
        let result = bridge(html);
        assert!(!result.ok);
        // The classification itself still happens; only the outcome flips.
        assert_eq!(result.action, ActionKind::TopicMove);
        assert!(result.entity.is_none());
    }

    #[test]
    fn test_reply_yields_post_entity() {
        let html = r##"
            <p>Votre réponse a été enregistrée avec succès.</p>
            <a href="/viewtopic?t=12&start=30#p456">Voir le message</a>
        "##;
        let result = bridge(html);
        assert!(result.ok);
        assert_eq!(result.action, ActionKind::TopicPost);
        let post = result.entity.as_post().expect("post entity");
        assert_eq!(post.id, Some(456));
        assert_eq!(post.topic_id, Some(12));
        assert!(post.url.is_some());
    }

    #[test]
    fn test_reply_on_canonical_first_link_is_new_topic() {
        let html = r#"
            <p>Votre message a été enregistré avec succès.</p>
            <a href="/t55-nouveau-fil">Voir</a>
        "#;
        let result = bridge(html);
        assert!(result.ok);
        assert_eq!(result.action, ActionKind::TopicPost);
        let topic = result.entity.as_topic().expect("topic entity");
        assert_eq!(topic.id, Some(55));
    }

    #[test]
    fn test_viewtopic_link_upgraded_to_canonical() {
        let html = r#"
            <p>Votre réponse a été postée.</p>
            <a href="/viewtopic?t=8#p100">ancien lien</a>
            <a href="/t8-le-fil">lien canonique</a>
        "#;
        let result = bridge(html);
        assert_eq!(result.links.topic.as_deref(), Some("/t8-le-fil"));
        let post = result.entity.as_post().expect("post entity");
        assert_eq!(post.url.as_deref(), Some("/t8-le-fil"));
    }

    #[test]
    fn test_viewtopic_link_kept_without_canonical() {
        let html = r#"
            <p>Votre réponse a été postée.</p>
            <a href="/viewtopic?t=8#p100">ancien lien</a>
        "#;
        let result = bridge(html);
        assert_eq!(result.links.topic.as_deref(), Some("/viewtopic?t=8#p100"));
    }

    #[test]
    fn test_pm_entity() {
        let result = bridge("<p>Le message privé a été envoyé.</p>");
        assert!(result.ok);
        assert_eq!(result.action, ActionKind::UserPm);
        let pm = result.entity.as_pm().expect("pm entity");
        assert_eq!(pm.inbox_url, "/privmsg?folder=inbox");
    }

    #[test]
    fn test_idempotent_over_same_input() {
        let html = r#"<p>Le sujet a été déplacé.</p><a href="/t1-a">a</a>"#;
        assert_eq!(bridge(html), bridge(html));
    }

    #[test]
    fn test_empty_document_degrades() {
        let result = bridge("");
        assert!(!result.ok);
        assert_eq!(result.action, ActionKind::Unknown);
        assert_eq!(result.message, "");
        assert_eq!(result.href, "");
        assert_eq!(result.ids, ExtractedIds::default());
    }
}
