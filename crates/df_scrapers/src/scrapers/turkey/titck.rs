//! Türkiye İlaç ve Tıbbi Cihaz Kurumu (titck.gov.tr) announcements.

use crate::scrapers::SelectorProfile;

pub const LISTING_URL: &str = "https://titck.gov.tr/duyuru?page=1";

pub fn profile() -> SelectorProfile {
    SelectorProfile {
        name: "titck",
        listing_container: "ul.list-group, div.list-group, table.table, div.duyuru-list",
        listing_link: "a[href]",
        link_keyword: Some("duyuru"),
        title: &["h1", "h2", "h3", "title"],
        time: "time",
        date_hint_pattern: r"(?i)tarih|date|posted|time",
        date_fallback: "small",
        content: &[
            "article",
            "div.duyuru-content",
            "div.content",
            "div.icerik",
            "div#content",
            "div.panel-body",
            "div.container",
            "main",
        ],
        content_exclude: &["script", "style", "noscript", "nav", "form", "footer", "header"],
    }
}
