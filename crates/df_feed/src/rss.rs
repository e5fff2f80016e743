//! RSS 2.0 serialization.

use std::io::Write;

use df_core::{AnnouncementEntry, FeedDocument, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Renders the document as an RSS 2.0 string.
///
/// Output depends only on the document: the same entries in the same order
/// give the same bytes, apart from `lastBuildDate`.
pub fn render(document: &FeedDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    let meta = &document.metadata;
    write_text_element(&mut writer, "title", &meta.title)?;
    write_text_element(&mut writer, "link", &meta.link)?;
    write_text_element(&mut writer, "description", &meta.description)?;
    if let Some(language) = &meta.language {
        write_text_element(&mut writer, "language", language)?;
    }
    if let Some(generator) = &meta.generator {
        write_text_element(&mut writer, "generator", generator)?;
    }
    write_text_element(&mut writer, "lastBuildDate", &document.built_at.to_rfc2822())?;

    for entry in document.entries() {
        write_item(&mut writer, entry)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(String::from_utf8(out)?)
}

fn write_item<W: Write>(writer: &mut Writer<W>, entry: &AnnouncementEntry) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, "title", &entry.title)?;
    write_text_element(writer, "link", &entry.url)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "true"));
    writer.write_event(Event::Start(guid))?;
    writer.write_event(Event::Text(BytesText::new(&sanitize_text(&entry.url))))?;
    writer.write_event(Event::End(BytesEnd::new("guid")))?;

    if let Some(published_at) = &entry.published_at {
        write_text_element(writer, "pubDate", &published_at.to_rfc2822())?;
    }
    write_text_element(writer, "description", &entry.summary)?;
    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&sanitize_text(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// Control characters other than tab, LF and CR are not allowed in XML 1.0.
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= '\u{20}')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};
    use df_core::FeedMetadata;
    use quick_xml::Reader;

    fn metadata() -> FeedMetadata {
        FeedMetadata {
            title: "Duyurular".to_string(),
            link: "https://example.gov.tr/duyuru?page=1".to_string(),
            description: "Test feed".to_string(),
            language: Some("tr".to_string()),
            generator: None,
        }
    }

    fn entry(title: &str, url: &str, day: Option<u32>, summary: &str) -> AnnouncementEntry {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        AnnouncementEntry {
            title: title.to_string(),
            url: url.to_string(),
            published_at: day.map(|d| offset.with_ymd_and_hms(2024, 1, d, 9, 30, 0).unwrap()),
            summary: summary.to_string(),
        }
    }

    /// Collects the unescaped text of every `tag` element nested in an item.
    fn item_texts(xml: &str, tag: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut path: Vec<String> = Vec::new();
        let mut found = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    path.push(String::from_utf8_lossy(e.name().as_ref()).to_string())
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(e) => {
                    if path.len() >= 2
                        && path[path.len() - 1] == tag
                        && path[path.len() - 2] == "item"
                    {
                        found.push(e.unescape().unwrap().into_owned());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        found
    }

    #[test]
    fn test_channel_and_items() {
        let built_at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let doc = FeedDocument::new(
            metadata(),
            vec![
                entry("First", "https://example.gov.tr/duyuru/1", Some(1), "one"),
                entry("Undated", "https://example.gov.tr/duyuru/2", None, ""),
            ],
            built_at,
        );
        let xml = render(&doc).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("<title>Duyurular</title>"));
        assert!(xml.contains("<language>tr</language>"));
        assert!(xml.contains("<lastBuildDate>Thu, 1 Feb 2024 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<pubDate>Mon, 1 Jan 2024 09:30:00 +0300</pubDate>"));
        assert!(xml.contains(
            "<guid isPermaLink=\"true\">https://example.gov.tr/duyuru/1</guid>"
        ));
        assert_eq!(xml.matches("<item>").count(), 2);
        // the undated entry has no pubDate at all
        assert_eq!(xml.matches("<pubDate>").count(), 1);
    }

    #[test]
    fn test_escaping_round_trip() {
        let title = r#"Fiyat <güncelleme> & "duyuru" 'özel'"#;
        let summary = "a < b && c > \"d\"\n\nsecond paragraph";
        let doc = FeedDocument::new(
            metadata(),
            vec![entry(title, "https://example.gov.tr/duyuru/3?a=1&b=2", Some(2), summary)],
            Utc::now(),
        );
        let xml = render(&doc).unwrap();

        assert!(!xml.contains("<güncelleme>"));
        assert_eq!(item_texts(&xml, "title"), vec![title.to_string()]);
        assert_eq!(item_texts(&xml, "description"), vec![summary.to_string()]);
        assert_eq!(
            item_texts(&xml, "link"),
            vec!["https://example.gov.tr/duyuru/3?a=1&b=2".to_string()]
        );
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(sanitize_text("a\u{0}b\u{1b}c\td\n"), "abc\td\n");
    }

    #[test]
    fn test_deterministic_apart_from_build_date() {
        let entries = vec![
            entry("A", "https://example.gov.tr/duyuru/a", Some(3), "x"),
            entry("B", "https://example.gov.tr/duyuru/b", Some(1), "y"),
        ];
        let first = render(&FeedDocument::new(
            metadata(),
            entries.clone(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        ))
        .unwrap();
        let second = render(&FeedDocument::new(
            metadata(),
            entries,
            Utc.with_ymd_and_hms(2024, 3, 2, 6, 0, 0).unwrap(),
        ))
        .unwrap();

        assert_ne!(first, second);
        let strip = |xml: &str| {
            xml.lines()
                .filter(|line| !line.contains("<lastBuildDate>"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[test]
    fn test_empty_feed_is_valid() {
        let doc = FeedDocument::new(metadata(), Vec::new(), Utc::now());
        let xml = render(&doc).unwrap();
        assert!(!xml.contains("<item>"));

        let mut reader = Reader::from_str(&xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("invalid XML: {}", e),
            }
        }
    }
}
