//! Confirmation/error message extraction from response pages.
//!
//! The platform reports the outcome of a form submission as prose inside the
//! returned page. The extraction strategy used here is the structural one:
//! concatenate the text of every `<p>` element in document order and collapse
//! whitespace. Confirmation pages are short and keep their prose in
//! paragraphs across themes, which makes this both simpler and more stable
//! than scanning all visible text for keyword-bearing sentences.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid selector"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extract the human-readable outcome message from a response document.
///
/// Returns an empty string for documents without any paragraph text.
#[must_use]
pub fn extract_message(doc: &Html) -> String {
    let mut parts: Vec<String> = Vec::new();
    for p in doc.select(&PARAGRAPH_SELECTOR) {
        let text = p.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
    }
    WHITESPACE_RE
        .replace_all(&parts.join(" "), " ")
        .trim()
        .to_string()
}
