//! Action classification and outcome validation.
//!
//! The platform gives no structured signal about what a form submission did;
//! the only evidence is the prose of the confirmation page. Classification
//! maps that prose to a closed set of action kinds through an ordered table
//! of keyword rules, and validation re-checks the same keyword family to
//! decide success. Using one table for both keeps classification and
//! validation consistent by construction.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Semantic action the server is judged to have performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "topic.move")]
    TopicMove,
    #[serde(rename = "topic.lock")]
    TopicLock,
    #[serde(rename = "topic.unlock")]
    TopicUnlock,
    #[serde(rename = "topic.delete")]
    TopicDelete,
    #[serde(rename = "topic.trash")]
    TopicTrash,
    #[serde(rename = "topic.post")]
    TopicPost,
    #[serde(rename = "forum.post")]
    ForumPost,
    #[serde(rename = "user.pm")]
    UserPm,
    #[serde(rename = "user.ban")]
    UserBan,
    #[serde(rename = "user.unban")]
    UserUnban,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ActionKind {
    /// Dotted wire name of the action, e.g. `"topic.move"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopicMove => "topic.move",
            Self::TopicLock => "topic.lock",
            Self::TopicUnlock => "topic.unlock",
            Self::TopicDelete => "topic.delete",
            Self::TopicTrash => "topic.trash",
            Self::TopicPost => "topic.post",
            Self::ForumPost => "forum.post",
            Self::UserPm => "user.pm",
            Self::UserBan => "user.ban",
            Self::UserUnban => "user.unban",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification rule: the action applies when any `any` keyword is
/// present and no `none` keyword is. Keywords are lowercase substrings,
/// matched case-insensitively, with French and English forms for each
/// family (the platform renders either language depending on the board).
pub struct ActionRule {
    pub action: ActionKind,
    pub any: &'static [&'static str],
    pub none: &'static [&'static str],
}

/// Ordered rule table; the first matching rule wins.
///
/// The exclusions resolve substring collisions between keyword families:
/// "déverrouillé"/"unlocked" contain the lock root, "débanni"/"unbanned"
/// contain the ban root, and "removed" contains the move root, so the
/// colliding family must be excluded wherever its rule runs later.
pub const ACTION_RULES: &[ActionRule] = &[
    ActionRule {
        action: ActionKind::TopicMove,
        any: &["déplacé", "moved"],
        none: &["removed"],
    },
    ActionRule {
        action: ActionKind::TopicLock,
        any: &["verrouill", "locked"],
        none: &["déverrouill", "unlocked"],
    },
    ActionRule {
        action: ActionKind::TopicUnlock,
        any: &["déverrouill", "unlocked"],
        none: &[],
    },
    ActionRule {
        action: ActionKind::TopicDelete,
        any: &["supprim", "deleted", "removed"],
        none: &[],
    },
    ActionRule {
        action: ActionKind::TopicTrash,
        any: &["corbeille", "poubelle", "trash"],
        none: &[],
    },
    ActionRule {
        action: ActionKind::TopicPost,
        any: &["répon", "enregistré avec succès", "replied", "saved successfully"],
        none: &[],
    },
    ActionRule {
        action: ActionKind::ForumPost,
        any: &["nouveau sujet", "new topic"],
        none: &[],
    },
    ActionRule {
        action: ActionKind::UserPm,
        any: &["message priv", "private message"],
        none: &[],
    },
    ActionRule {
        action: ActionKind::UserBan,
        any: &["banni", "banned"],
        none: &["débanni", "unbann"],
    },
    ActionRule {
        action: ActionKind::UserUnban,
        any: &["débanni", "unbann"],
        none: &[],
    },
];

static ERROR_BOX_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#".error, .errorbox, [role="alert"]"#).expect("valid selector")
});

/// Classify the extracted message into an action kind.
///
/// Pure and total: unmatched messages yield [`ActionKind::Unknown`].
#[must_use]
pub fn classify(message: &str) -> ActionKind {
    let lower = message.to_lowercase();
    for rule in ACTION_RULES {
        if rule.any.iter().any(|kw| lower.contains(kw))
            && !rule.none.iter().any(|kw| lower.contains(kw))
        {
            return rule.action;
        }
    }
    ActionKind::Unknown
}

/// Decide success for an already-classified action.
///
/// Success requires the keyword family that classified the action to also be
/// present in the message. [`ActionKind::Unknown`] never validates.
#[must_use]
pub fn validate(action: ActionKind, message: &str) -> bool {
    let lower = message.to_lowercase();
    ACTION_RULES
        .iter()
        .find(|rule| rule.action == action)
        .is_some_and(|rule| rule.any.iter().any(|kw| lower.contains(kw)))
}

/// Check for an error-box marker element in the document.
///
/// Error markers take precedence over any keyword match: a page carrying one
/// is a failure no matter what its prose says.
#[must_use]
pub fn has_error_marker(doc: &Html) -> bool {
    doc.select(&ERROR_BOX_SELECTOR).next().is_some()
}
