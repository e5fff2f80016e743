use std::sync::Arc;

use df_core::{Error, FieldExtractor, Result};

pub mod dates;
pub mod selector;
pub mod turkey;

pub use selector::SelectorExtractor;

/// Markup knowledge for one site: which selectors locate each field.
#[derive(Debug, Clone)]
pub struct SelectorProfile {
    pub name: &'static str,
    /// Element that must be present on every listing page.
    pub listing_container: &'static str,
    /// Anchors inside the container that may point to announcements.
    pub listing_link: &'static str,
    /// Substring an href must contain to count as an announcement.
    pub link_keyword: Option<&'static str>,
    /// Tried in order; the first non-empty match wins.
    pub title: &'static [&'static str],
    pub time: &'static str,
    /// Elements whose `class` or `id` matches this pattern may hold a date.
    pub date_hint_pattern: &'static str,
    /// Last resort for dates.
    pub date_fallback: &'static str,
    /// Tried in order; `body` is used when none has text.
    pub content: &'static [&'static str],
    /// Elements whose text never belongs in a summary.
    pub content_exclude: &'static [&'static str],
}

impl SelectorProfile {
    /// Returns a list of CLI shorthand names for this profile
    pub fn cli_names(&self) -> Vec<&str> {
        vec![self.name]
    }
}

pub fn available_profiles() -> Vec<SelectorProfile> {
    vec![turkey::titck::profile()]
}

/// Builds the extractor registered under `name`.
pub fn get_extractor(name: &str) -> Result<Arc<dyn FieldExtractor>> {
    let profile = available_profiles()
        .into_iter()
        .find(|p| p.cli_names().iter().any(|n| n.eq_ignore_ascii_case(name)))
        .ok_or_else(|| Error::Config(format!("Unknown extractor profile: {}", name)))?;
    Ok(Arc::new(SelectorExtractor::new(profile)?))
}

/// Common utilities for extractors
pub(crate) mod utils {
    use super::*;
    use scraper::{ElementRef, Selector};
    use url::Url;

    const BLOCK_ELEMENTS: &[&str] = &[
        "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
        "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
        "section", "table", "tr", "ul",
    ];

    const PARAGRAPH_BREAK: char = '\u{2029}';

    pub fn parse_url(url: &str) -> Result<Url> {
        Ok(Url::parse(url)?)
    }

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Config(format!("Invalid selector `{}`: {}", selector, e)))
    }

    pub fn normalize_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Resolves `href` against `base`, rejecting script and fragment-only
    /// links and anything that is not http(s). The fragment is dropped.
    pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.to_ascii_lowercase().starts_with("javascript:")
        {
            return None;
        }
        let mut url = base.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.set_fragment(None);
        Some(url)
    }

    /// Text of `element` with excluded subtrees dropped, whitespace
    /// collapsed and block elements separated by blank lines.
    pub fn visible_text(element: ElementRef, excluded: &[&str]) -> String {
        let mut raw = String::new();
        collect_text(element, excluded, &mut raw);
        raw.split(PARAGRAPH_BREAK)
            .map(normalize_whitespace)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn collect_text(element: ElementRef, excluded: &[&str], out: &mut String) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let name = child_element.value().name();
                if excluded.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push(PARAGRAPH_BREAK);
                }
                collect_text(child_element, excluded, out);
                if block {
                    out.push(PARAGRAPH_BREAK);
                }
            } else if let Some(text) = child.value().as_text() {
                out.push_str(text);
            }
        }
    }
}
