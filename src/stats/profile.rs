//! Profile page field scraping.
//!
//! Profile templates differ wildly between themes. Instead of cascading
//! conditionals, each known template shape is a declarative rule (probe
//! selector + extraction mode + post-processing) evaluated in priority
//! order; every matching rule contributes fields, and the first value seen
//! for a label wins, with distinct later values appended.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// How to pull a value out of a probed element.
#[derive(Debug, Clone, Copy)]
pub enum ExtractMode {
    Text,
    InnerHtml,
    Attr(&'static str),
}

/// What a rule extracts from each element its probe matched.
#[derive(Debug, Clone, Copy)]
pub enum RuleKind {
    /// Label/value pairs: `dt` selects labels under the probed root, `dd`
    /// the value element (next sibling first, any descendant as fallback).
    Pairs { dt: &'static str, dd: &'static str },
    /// A single named field taken from the probed element itself.
    Single {
        field: &'static str,
        mode: ExtractMode,
        /// Regex pattern removed from the start of the value.
        strip_prefix: Option<&'static str>,
        normalize_whitespace: bool,
    },
}

/// One declarative extraction rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// The rule applies when this selector matches at least one element.
    pub probe: &'static str,
    pub kind: RuleKind,
}

/// Rules for the profile templates in circulation, most specific first.
pub const PROFILE_RULES: &[FieldRule] = &[
    // phpBB2-style advanced profiles
    FieldRule {
        probe: "#profile-advanced-details dl",
        kind: RuleKind::Pairs {
            dt: "dt span",
            dd: ".field_uneditable",
        },
    },
    // phpBB3 / ModernBB / AwesomeBB advanced profiles
    FieldRule {
        probe: "#profile-tab-field-profil dl",
        kind: RuleKind::Pairs {
            dt: "dt span",
            dd: ".field_uneditable",
        },
    },
    FieldRule {
        probe: ".mod-login-avatar",
        kind: RuleKind::Single {
            field: "avatar",
            mode: ExtractMode::InnerHtml,
            strip_prefix: None,
            normalize_whitespace: false,
        },
    },
    FieldRule {
        probe: "h1",
        kind: RuleKind::Single {
            field: "username",
            mode: ExtractMode::Text,
            strip_prefix: Some(r"(?i)^(tout à propos de|all about)\s*"),
            normalize_whitespace: true,
        },
    },
];

/// Scraped profile fields, keyed by normalized label, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStats {
    fields: Vec<(String, String)>,
}

impl ProfileStats {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, key: String, value: String) {
        if key.is_empty() {
            return;
        }
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            None => self.fields.push((key, value)),
            Some((_, existing)) => {
                if !value.is_empty() && !existing.contains(&value) {
                    if existing.is_empty() {
                        *existing = value;
                    } else {
                        existing.push_str(", ");
                        existing.push_str(&value);
                    }
                }
            }
        }
    }
}

/// Normalize a field label into a stable key: lowercase, alphanumeric runs
/// joined by underscores.
#[must_use]
pub fn to_key(label: &str) -> String {
    let mut key = String::new();
    let mut pending_sep = false;
    for c in label.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.push(c);
        } else {
            pending_sep = true;
        }
    }
    key
}

/// Text content of the element's direct child text nodes only.
fn direct_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// First match of the selector among the element's following siblings,
/// either the sibling itself or one of its descendants.
fn following_match<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    for sibling in el.next_siblings().filter_map(ElementRef::wrap) {
        if selector.matches(&sibling) {
            return Some(sibling);
        }
        if let Some(inner) = sibling.select(selector).next() {
            return Some(inner);
        }
    }
    None
}

/// Value element for a label: the nearest match of the selector that follows
/// the label in the document, found by climbing from the label towards the
/// probed root. Never looks before the label, so each dt pairs with its own
/// dd even when a theme packs several pairs into one `dl`.
fn value_for_label<'a>(
    label_el: ElementRef<'a>,
    root: ElementRef<'a>,
    selector: &Selector,
) -> Option<ElementRef<'a>> {
    let mut cursor = Some(label_el);
    while let Some(el) = cursor {
        if el.id() == root.id() {
            break;
        }
        if let Some(found) = following_match(el, selector) {
            return Some(found);
        }
        cursor = el.parent().and_then(ElementRef::wrap);
    }
    None
}

fn placeholder_to_empty(value: String) -> String {
    if value == "-" {
        String::new()
    } else {
        value
    }
}

fn extract_single(el: ElementRef<'_>, mode: ExtractMode) -> String {
    match mode {
        ExtractMode::Text => el.text().collect::<Vec<_>>().join(" ").trim().to_string(),
        ExtractMode::InnerHtml => el.inner_html().trim().to_string(),
        ExtractMode::Attr(name) => el.value().attr(name).unwrap_or("").trim().to_string(),
    }
}

fn apply_rule(doc: &Html, rule: &FieldRule, out: &mut ProfileStats) {
    let Ok(probe) = Selector::parse(rule.probe) else {
        return;
    };
    for root in doc.select(&probe) {
        match rule.kind {
            RuleKind::Single {
                field,
                mode,
                strip_prefix,
                normalize_whitespace,
            } => {
                let mut value = extract_single(root, mode);
                if let Some(pattern) = strip_prefix {
                    if let Ok(re) = Regex::new(pattern) {
                        value = re.replace(&value, "").to_string();
                    }
                }
                if normalize_whitespace {
                    value = value.split_whitespace().collect::<Vec<_>>().join(" ");
                }
                out.insert(to_key(field), placeholder_to_empty(value.trim().to_string()));
            }
            RuleKind::Pairs { dt, dd } => {
                let (Ok(dt_sel), Ok(dd_sel)) = (Selector::parse(dt), Selector::parse(dd)) else {
                    continue;
                };
                for label_el in root.select(&dt_sel) {
                    let key = to_key(&direct_text(label_el));
                    if key.is_empty() {
                        continue;
                    }
                    let value_el = value_for_label(label_el, root, &dd_sel);
                    let value = value_el
                        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
                        .unwrap_or_default();
                    out.insert(key, placeholder_to_empty(value));
                }
            }
        }
    }
}

/// Scrape profile fields with the built-in rule table.
#[must_use]
pub fn parse_profile_stats(doc: &Html) -> ProfileStats {
    parse_profile_stats_with(doc, &[])
}

/// Scrape profile fields with caller-supplied rules evaluated before the
/// built-in ones.
#[must_use]
pub fn parse_profile_stats_with(doc: &Html, extra_rules: &[FieldRule]) -> ProfileStats {
    let mut out = ProfileStats::default();
    for rule in extra_rules.iter().chain(PROFILE_RULES) {
        apply_rule(doc, rule, &mut out);
    }
    out
}
