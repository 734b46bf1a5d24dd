//! Structured-data (JSON-LD) reader.
//!
//! Newer platform themes embed `BreadcrumbList` and `DiscussionForumPosting`
//! blocks that carry cleaner metadata than the themed markup. Blocks that
//! fail to parse are skipped; `@graph` containers are flattened.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static LD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// One entry of a `BreadcrumbList`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub position: Option<u32>,
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Normalized `DiscussionForumPosting` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscussionPosting {
    pub headline: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub publisher: Option<String>,
    pub image: Option<String>,
    pub interaction_count: Option<u64>,
}

/// Collect every typed JSON-LD object in the document.
///
/// The root of a block may be an object, an array, or an `@graph` container;
/// all are flattened into a single list of objects carrying an `@type`.
#[must_use]
pub fn typed_objects(doc: &Html) -> Vec<Value> {
    let mut objects = Vec::new();
    for script in doc.select(&LD_SELECTOR) {
        let text = script.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let Ok(root) = serde_json::from_str::<Value>(text) else {
            continue;
        };
        let roots = match root {
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in roots {
            if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
                objects.extend(graph.iter().cloned());
            } else {
                objects.push(item);
            }
        }
    }
    objects
        .into_iter()
        .filter(|o| o.is_object() && o.get("@type").is_some())
        .collect()
}

fn type_name(obj: &Value) -> Option<&str> {
    match obj.get("@type") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(types)) => types.first().and_then(Value::as_str),
        _ => None,
    }
}

fn string_at(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn number_at(obj: &Value, key: &str) -> Option<u64> {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract every `BreadcrumbList` in the document.
#[must_use]
pub fn extract_breadcrumbs(doc: &Html) -> Vec<Vec<Breadcrumb>> {
    typed_objects(doc)
        .iter()
        .filter(|o| type_name(o) == Some("BreadcrumbList"))
        .filter_map(|o| {
            let elements = o.get("itemListElement")?.as_array()?;
            let items: Vec<Breadcrumb> = elements
                .iter()
                .filter(|li| type_name(li) == Some("ListItem"))
                .filter_map(|li| {
                    let item = li.get("item")?;
                    Some(Breadcrumb {
                        position: number_at(li, "position").and_then(|n| u32::try_from(n).ok()),
                        url: string_at(item, "@id").or_else(|| string_at(item, "url")),
                        name: string_at(item, "name"),
                    })
                })
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(items)
            }
        })
        .collect()
}

/// Extract every `DiscussionForumPosting` in the document.
#[must_use]
pub fn extract_discussions(doc: &Html) -> Vec<DiscussionPosting> {
    typed_objects(doc)
        .iter()
        .filter(|o| type_name(o) == Some("DiscussionForumPosting"))
        .map(|o| DiscussionPosting {
            headline: string_at(o, "headline"),
            name: string_at(o, "name"),
            url: string_at(o, "url"),
            date_published: string_at(o, "datePublished"),
            date_modified: string_at(o, "dateModified"),
            page_start: number_at(o, "pageStart").and_then(|n| u32::try_from(n).ok()),
            page_end: number_at(o, "pageEnd").and_then(|n| u32::try_from(n).ok()),
            author: o.get("author").and_then(|a| string_at(a, "name")),
            author_url: o.get("author").and_then(|a| string_at(a, "url")),
            publisher: o.get("publisher").and_then(|p| string_at(p, "name")),
            image: string_at(o, "image"),
            interaction_count: o
                .get("interactionStatistic")
                .and_then(|i| number_at(i, "userInteractionCount")),
        })
        .collect()
}
