//! Syosetu (Narou) page parsing: work metadata from the first episode page, and the
//! per-episode transform that keeps only the heading and the novel body.
//!
//! Nothing here fails. Missing elements fall back to placeholders or are left out.

use crate::model::{WorkMetadata, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use scraper::{ElementRef, Html, Selector};

const TITLE_DELIMITER: &str = " - ";
const NUMBER_SELECTOR: &str = "div.p-novel__number";
const HEADING_SELECTOR: &str = "h1";
const BODY_SELECTOR: &str = "div.p-novel__body";
const AUTHOR_SELECTOR: &str = "meta[name=\"twitter:creator\"]";
const NBSP: char = '\u{00A0}';

/// First element matching `sel`, or None (also when the selector does not parse).
fn select_first<'a>(doc: &'a Html, sel: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(sel).ok()?;
    doc.select(&selector).next()
}

/// Each text node trimmed, then joined with no separator.
fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>()
}

/// Work title and author from an episode page.
///
/// Title is the `<title>` text up to the first `" - "` (the rest is the episode and site
/// name). Author is the `twitter:creator` meta content.
pub fn extract_metadata(html: &str) -> WorkMetadata {
    let doc = Html::parse_document(html);

    let title = select_first(&doc, "title")
        .map(|e| {
            let text = e.text().collect::<String>();
            match text.split_once(TITLE_DELIMITER) {
                Some((before, _)) => before.trim().to_string(),
                None => text.trim().to_string(),
            }
        })
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let author = select_first(&doc, AUTHOR_SELECTOR)
        .and_then(|e| e.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    WorkMetadata { title, author }
}

/// Heading element carried into the fragment: its attributes and serialized content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub attrs: Vec<(String, String)>,
    pub inner_html: String,
}

/// What survives of one episode page. Built fresh; the parsed page is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFragment {
    pub heading: Option<Heading>,
    pub body_html: Option<String>,
}

impl EpisodeFragment {
    /// Pick the heading, numbering label and body out of a parsed episode page.
    pub fn from_document(doc: &Html) -> Self {
        let label = select_first(doc, NUMBER_SELECTOR)
            .map(trimmed_text)
            .unwrap_or_default();

        let heading = select_first(doc, HEADING_SELECTOR).map(|h1| {
            let attrs = h1
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let inner_html = if label.is_empty() {
                h1.inner_html()
            } else {
                let combined = format!("{}{}{}", label, NBSP, trimmed_text(h1));
                escape_text(&combined)
            };
            Heading { attrs, inner_html }
        });

        let body_html = select_first(doc, BODY_SELECTOR).map(|body| body.html());

        Self { heading, body_html }
    }

    /// Serialize as `<div class="chapter">` holding the heading then the body.
    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<div class="chapter">"#);
        if let Some(ref h) = self.heading {
            out.push_str("<h1");
            for (name, value) in &h.attrs {
                out.push_str(&format!(r#" {}="{}""#, name, escape_attr(value)));
            }
            out.push('>');
            out.push_str(&h.inner_html);
            out.push_str("</h1>");
        }
        if let Some(ref body) = self.body_html {
            out.push_str(body);
        }
        out.push_str("</div>");
        out
    }
}

/// Reduce an episode page to its chapter fragment markup.
pub fn transform_episode(html: &str) -> String {
    let doc = Html::parse_document(html);
    EpisodeFragment::from_document(&doc).to_html()
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
