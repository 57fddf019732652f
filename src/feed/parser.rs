use super::entry::FeedEntry;
use super::extract::{extract_link, extract_published, extract_summary, extract_title};
use super::xml::{parse_document, Element, XmlError};

/// Local names of elements that represent one feed item.
const ENTRY_TAGS: &[&str] = &["item", "entry"];

/// Outcome of parsing one feed document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Entries that passed validation, in document order.
    pub entries: Vec<FeedEntry>,
    /// Entry-like elements that were dropped (missing title, link or date,
    /// or an excluded title prefix).
    pub skipped: usize,
}

/// Every `item`/`entry` element in the tree, the root included.
///
/// RSS nests items under `channel` while Atom puts entries directly under
/// the document root, so this is a full pre-order scan matched by local name.
pub fn entry_elements(root: &Element) -> impl Iterator<Item = &Element> + '_ {
    root.descendants()
        .filter(|element| ENTRY_TAGS.contains(&element.local_name()))
}

/// Lazily normalizes the entries of a parsed document.
///
/// Elements without a title, with a title starting with one of
/// `ignored_prefixes`, without a link, or without a parseable date are
/// dropped. Survivors are yielded in document order.
pub fn entries<'a>(
    root: &'a Element,
    source: &'a str,
    ignored_prefixes: &'a [String],
) -> impl Iterator<Item = FeedEntry> + 'a {
    entry_elements(root).filter_map(move |element| normalize_entry(element, source, ignored_prefixes))
}

/// Parses feed bytes and collects the valid entries.
///
/// # Errors
///
/// Returns [`XmlError`] if the bytes are not a well-formed XML document.
pub fn parse_feed(
    bytes: &[u8],
    source: &str,
    ignored_prefixes: &[String],
) -> Result<ParseResult, XmlError> {
    let root = parse_document(bytes)?;

    let candidates = entry_elements(&root).count();
    let entries: Vec<FeedEntry> = entries(&root, source, ignored_prefixes).collect();
    let skipped = candidates - entries.len();

    if skipped > 0 {
        tracing::debug!(feed = %source, skipped = skipped, "Entries dropped during normalization");
    }

    Ok(ParseResult { entries, skipped })
}

fn normalize_entry(element: &Element, source: &str, ignored_prefixes: &[String]) -> Option<FeedEntry> {
    let title = extract_title(element)?;
    if is_ignored(title, ignored_prefixes) {
        return None;
    }
    let link = extract_link(element)?;
    let published = extract_published(element)?;
    let summary = extract_summary(element);

    Some(FeedEntry {
        title: title.to_string(),
        link: link.to_string(),
        published,
        summary,
        source_feed: source.to_string(),
    })
}

fn is_ignored(title: &str, ignored_prefixes: &[String]) -> bool {
    ignored_prefixes
        .iter()
        .any(|prefix| title.starts_with(prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "https://example.com/feed";

    fn prefixes() -> Vec<String> {
        vec!["Show GN:".to_string(), "Ask GN:".to_string()]
    }

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>GeekNews</title>
    <link>https://news.example.com</link>
    <item>
      <title>Rust 2024 edition lands</title>
      <link>https://news.example.com/1</link>
      <pubDate>Wed, 02 Oct 2024 10:00:00 GMT</pubDate>
      <description><![CDATA[<p>Edition notes</p>]]></description>
      <content:encoded><![CDATA[<p>Full text</p>]]></content:encoded>
    </item>
    <item>
      <title>Show GN: Rust 2024 edition lands</title>
      <link>https://news.example.com/2</link>
      <pubDate>Wed, 02 Oct 2024 11:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No date here</title>
      <link>https://news.example.com/3</link>
    </item>
    <item>
      <title>No link here</title>
      <pubDate>Wed, 02 Oct 2024 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>   </title>
      <link>https://news.example.com/5</link>
      <pubDate>Wed, 02 Oct 2024 12:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <link href="https://atom.example.com/"/>
  <entry>
    <title>Ask GN: best editor?</title>
    <link href="https://atom.example.com/ask"/>
    <updated>2024-10-02T09:00:00Z</updated>
  </entry>
  <entry>
    <title type="html">Atom entry</title>
    <link rel="alternate" href="https://atom.example.com/1"/>
    <published>2024-10-02T19:00:00+09:00</published>
    <updated>2024-10-03T00:00:00Z</updated>
    <summary>Short</summary>
    <content type="html">&lt;p&gt;Long&lt;/p&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_rss_items_are_normalized() {
        let result = parse_feed(RSS.as_bytes(), SOURCE, &prefixes()).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.skipped, 4);

        let entry = &result.entries[0];
        assert_eq!(entry.title, "Rust 2024 edition lands");
        assert_eq!(entry.link, "https://news.example.com/1");
        assert_eq!(
            entry.published,
            Utc.with_ymd_and_hms(2024, 10, 2, 10, 0, 0).unwrap()
        );
        assert_eq!(entry.summary, "<p>Edition notes</p>");
        assert_eq!(entry.source_feed, SOURCE);
    }

    #[test]
    fn test_atom_entries_are_normalized() {
        let result = parse_feed(ATOM.as_bytes(), SOURCE, &prefixes()).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.skipped, 1);

        let entry = &result.entries[0];
        assert_eq!(entry.title, "Atom entry");
        assert_eq!(entry.link, "https://atom.example.com/1");
        assert_eq!(
            entry.published,
            Utc.with_ymd_and_hms(2024, 10, 2, 10, 0, 0).unwrap()
        );
        assert_eq!(entry.summary, "Short");
    }

    #[test]
    fn test_prefixed_twin_is_excluded() {
        let xml = r#"<rss><channel>
            <item><title>Show GN: Tool</title><link>https://e.com/1</link><pubDate>Wed, 02 Oct 2024 10:00:00 GMT</pubDate></item>
            <item><title>Tool</title><link>https://e.com/2</link><pubDate>Wed, 02 Oct 2024 10:00:00 GMT</pubDate></item>
        </channel></rss>"#;
        let result = parse_feed(xml.as_bytes(), SOURCE, &prefixes()).unwrap();
        let titles: Vec<&str> = result.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Tool"]);
    }

    #[test]
    fn test_no_prefixes_keeps_everything() {
        let result = parse_feed(RSS.as_bytes(), SOURCE, &[]).unwrap();
        assert_eq!(result.entries.len(), 2);
    }

    #[test]
    fn test_document_order_is_preserved() {
        let xml = r#"<rss><channel>
            <item><title>b</title><link>https://e.com/b</link><pubDate>Wed, 02 Oct 2024 09:00:00 GMT</pubDate></item>
            <item><title>a</title><link>https://e.com/a</link><pubDate>Wed, 02 Oct 2024 11:00:00 GMT</pubDate></item>
        </channel></rss>"#;
        let root = parse_document(xml.as_bytes()).unwrap();
        let prefixes = prefixes();
        let titles: Vec<String> = entries(&root, SOURCE, &prefixes).map(|e| e.title).collect();
        assert_eq!(titles, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_items_found_anywhere_in_tree() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
            <channel><title>RSS 1.0</title></channel>
            <item><title>RDF item</title><link>https://e.com/rdf</link><dc:date>2024-10-02T10:00:00Z</dc:date><pubDate>2024-10-02T10:00:00Z</pubDate></item>
        </rdf:RDF>"#;
        let result = parse_feed(xml.as_bytes(), SOURCE, &prefixes()).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].link, "https://e.com/rdf");
    }

    #[test]
    fn test_single_entry_document() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom"><title>Solo</title><link href="https://e.com/solo"/><updated>2024-10-02T10:00:00Z</updated></entry>"#;
        let result = parse_feed(xml.as_bytes(), SOURCE, &prefixes()).unwrap();
        assert_eq!(result.entries.len(), 1);
    }

    #[test]
    fn test_malformed_feed_is_error() {
        assert!(parse_feed(b"<rss><channel>", SOURCE, &prefixes()).is_err());
    }
}
