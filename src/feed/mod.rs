//! Feed reading: from RSS/Atom XML to text or JSON lines.
//!
//! The pipeline is synchronous and free of I/O:
//!
//! ```text
//! document text -> tree -> extract -> filter -> render -> lines
//! ```
//!
//! - [`tree`] - Owned element tree built with `quick-xml`
//! - [`extract`] - Channel and entry extraction, tag folding, entry limit
//! - [`mapping`] - Generic and canonical (whitelisted, ordered) mappings
//! - [`schema`] - Static whitelists and label tables
//! - [`render`](mod@render) - Text and JSON renderers
//!
//! Around it sit the [`fetcher`] (HTTP retrieval) and the [`builder`]
//! (mapping back to RSS XML).
//!
//! # Example
//!
//! ```
//! use rss_reader::feed::{render, OutputFormat};
//!
//! let xml = "<rss><channel><title>Some RSS Channel</title>\
//!            <link>https://some.rss.com</link></channel></rss>";
//! let lines = render(xml, None, OutputFormat::Text).unwrap();
//! assert_eq!(lines, ["Feed: Some RSS Channel", "Link: https://some.rss.com"]);
//! ```

pub mod builder;
pub mod extract;
pub mod fetcher;
pub mod mapping;
pub mod render;
pub mod schema;
pub mod tree;

use std::num::NonZeroUsize;

use thiserror::Error;

pub use builder::FeedBuilder;
pub use fetcher::{fetch_document, FetchError, FetchSettings};
pub use mapping::{EntryMapping, FeedMapping, FieldValue, GenericMapping, Mapping};
pub use render::OutputFormat;
pub use schema::{Channel, Entry, Field, Schema};

/// Tags that mark the feed section of a document.
const SECTION_TAGS: [&str; 2] = ["channel", "feed"];

/// Errors produced while reading, rendering or building a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The input is not well-formed XML.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The document has no `<channel>` or `<feed>` element.
    #[error("No <channel> or <feed> section found in document")]
    MissingSection,

    /// JSON output could not be produced.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// XML output could not be written.
    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// Parses a feed document into its canonical mapping.
///
/// The first `<channel>` or `<feed>` element (pre-order, root included) is
/// the feed section; any later one is ignored. With a `limit`, at most that
/// many entries are kept.
///
/// # Errors
///
/// - [`FeedError::MalformedDocument`] if `document` is not well-formed XML
/// - [`FeedError::MissingSection`] if no feed section exists
pub fn parse_feed(document: &str, limit: Option<NonZeroUsize>) -> Result<FeedMapping, FeedError> {
    let root = tree::parse_document(document)?;

    let section = root
        .find_first(|e| SECTION_TAGS.contains(&e.name.as_str()))
        .ok_or(FeedError::MissingSection)?;

    let mapping = extract::extract_channel(section, limit);
    tracing::debug!(
        section = %section.name,
        fields = mapping.len(),
        entries = mapping.entries().len(),
        "Parsed feed"
    );
    Ok(mapping)
}

/// Reads a feed document and renders it as output lines.
///
/// Joining the result with `\n` gives the printable form.
///
/// # Errors
///
/// Everything [`parse_feed`] returns, plus [`FeedError::Serialize`] in JSON
/// mode.
pub fn render(
    document: &str,
    limit: Option<NonZeroUsize>,
    format: OutputFormat,
) -> Result<Vec<String>, FeedError> {
    let mapping = parse_feed(document, limit)?;

    match format {
        OutputFormat::Text => Ok(render::render_text(&mapping)),
        OutputFormat::Json => render::render_json(&mapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_section() {
        let result = render("<rss><title>t</title></rss>", None, OutputFormat::Text);
        assert!(matches!(result, Err(FeedError::MissingSection)));
    }

    #[test]
    fn test_malformed_document() {
        let result = render("<rss><channel>", None, OutputFormat::Json);
        assert!(matches!(result, Err(FeedError::MalformedDocument(_))));
    }

    #[test]
    fn test_first_section_wins() {
        let xml = "<rss><channel><title>first</title></channel>\
                   <channel><title>second</title></channel></rss>";
        assert_eq!(
            render(xml, None, OutputFormat::Text).unwrap(),
            ["Feed: first"]
        );
    }

    #[test]
    fn test_atom_feed_root() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <entry><title>Post</title><author><name>Ann</name></author></entry>
</feed>"#;
        assert_eq!(
            render(xml, None, OutputFormat::Text).unwrap(),
            ["Feed: Atom", "", "Title: Post"]
        );
    }

    #[test]
    fn test_limit_applies_to_render() {
        let xml = "<rss><channel>\
                   <item><title>a</title></item>\
                   <item><title>b</title></item></channel></rss>";
        let lines = render(xml, NonZeroUsize::new(1), OutputFormat::Text).unwrap();
        assert_eq!(lines, ["", "Title: a"]);
    }
}
