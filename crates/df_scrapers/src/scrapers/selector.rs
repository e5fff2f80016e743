use std::collections::HashSet;

use df_core::{AnnouncementReference, Error, ExtractedFields, FieldExtractor, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::dates::looks_like_date;
use super::utils::{normalize_whitespace, parse_selector, parse_url, resolve_link, visible_text};
use super::SelectorProfile;

/// Field extractor driven entirely by a [`SelectorProfile`].
///
/// There is no fallback when the profile's selectors stop matching: the
/// listing container going missing is a parse error, as is a detail page
/// with no title.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    profile: SelectorProfile,
    listing_container: Selector,
    listing_link: Selector,
    title: Vec<Selector>,
    time: Selector,
    date_hint_candidates: Selector,
    date_hint: Regex,
    date_fallback: Selector,
    canonical: Selector,
    content: Vec<Selector>,
    body: Selector,
}

impl SelectorExtractor {
    pub fn new(profile: SelectorProfile) -> Result<Self> {
        let date_hint = Regex::new(profile.date_hint_pattern)
            .map_err(|e| Error::Config(format!("Invalid date hint pattern: {}", e)))?;

        Ok(Self {
            listing_container: parse_selector(profile.listing_container)?,
            listing_link: parse_selector(profile.listing_link)?,
            title: profile
                .title
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
            time: parse_selector(profile.time)?,
            date_hint_candidates: parse_selector("[class], [id]")?,
            date_hint,
            date_fallback: parse_selector(profile.date_fallback)?,
            canonical: parse_selector("link[rel='canonical']")?,
            content: profile
                .content
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
            body: parse_selector("body")?,
            profile,
        })
    }

    fn find_title(&self, document: &Html) -> Option<String> {
        self.title.iter().find_map(|selector| {
            document
                .select(selector)
                .map(|el| normalize_whitespace(&el.text().collect::<String>()))
                .find(|text| !text.is_empty())
        })
    }

    fn find_published(&self, document: &Html) -> Option<String> {
        if let Some(time) = document.select(&self.time).next() {
            if let Some(datetime) = time.value().attr("datetime").map(str::trim) {
                if !datetime.is_empty() {
                    return Some(datetime.to_string());
                }
            }
            let text = normalize_whitespace(&time.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }

        let hinted = document.select(&self.date_hint_candidates).filter(|el| {
            let value = el.value();
            value.attr("class").map_or(false, |c| self.date_hint.is_match(c))
                || value.attr("id").map_or(false, |i| self.date_hint.is_match(i))
        });

        hinted
            .chain(document.select(&self.date_fallback))
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .find(|text| looks_like_date(text))
    }

    fn find_canonical(&self, document: &Html, base: &Url) -> Option<String> {
        document
            .select(&self.canonical)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| resolve_link(base, href))
            .map(String::from)
    }

    fn find_summary(&self, document: &Html) -> Option<String> {
        let excluded = self.profile.content_exclude;
        let content = self
            .content
            .iter()
            .filter_map(|selector| document.select(selector).next())
            .map(|el| visible_text(el, excluded))
            .find(|text| !text.is_empty());

        content.or_else(|| {
            document
                .select(&self.body)
                .next()
                .map(|el: ElementRef| visible_text(el, excluded))
                .filter(|text| !text.is_empty())
        })
    }
}

fn ensure_markup(page: &str, page_url: &str) -> Result<()> {
    if page.contains('<') {
        Ok(())
    } else {
        Err(Error::parse(page_url, "response is not an HTML document"))
    }
}

impl FieldExtractor for SelectorExtractor {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn extract_references(&self, page: &str, page_url: &str) -> Result<Vec<AnnouncementReference>> {
        ensure_markup(page, page_url)?;
        let base = parse_url(page_url)?;
        let document = Html::parse_document(page);

        let containers: Vec<ElementRef> = document.select(&self.listing_container).collect();
        if containers.is_empty() {
            return Err(Error::parse(
                page_url,
                format!("listing container `{}` not found", self.profile.listing_container),
            ));
        }

        let mut seen = HashSet::new();
        let mut references = Vec::new();

        let links = containers
            .iter()
            .flat_map(|container| container.select(&self.listing_link));
        for link in links {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if let Some(keyword) = self.profile.link_keyword {
                if !href.to_lowercase().contains(keyword) {
                    continue;
                }
            }
            let Some(url) = resolve_link(&base, href) else {
                continue;
            };
            // Links back to the listing itself are pagination, not announcements
            if url.host_str() == base.host_str() && url.path() == base.path() {
                continue;
            }

            let url = String::from(url);
            if seen.insert(url.clone()) {
                references.push(AnnouncementReference {
                    title: normalize_whitespace(&link.text().collect::<String>()),
                    url,
                });
            }
        }

        Ok(references)
    }

    fn extract_fields(&self, page: &str, page_url: &str) -> Result<ExtractedFields> {
        ensure_markup(page, page_url)?;
        let base = parse_url(page_url)?;
        let document = Html::parse_document(page);

        Ok(ExtractedFields {
            title: self.find_title(&document),
            published: self.find_published(&document),
            canonical_url: self.find_canonical(&document, &base),
            summary: self.find_summary(&document),
        })
    }
}
