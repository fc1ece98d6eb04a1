use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::mapping::{FeedMapping, FieldValue};
use super::FeedError;

/// Tag written for each nested entry.
const ITEM_TAG: &str = "item";

/// Serializes channel fields into an RSS 2.0 document.
///
/// Fields are written in insertion order. Scalars become one element, lists
/// one element per value under the same tag, and entries one `<item>` each
/// (whatever key they were added under). Empty values and entries with no
/// fields are skipped.
///
/// Reading the built document back with [`parse_feed`](super::parse_feed)
/// yields [`Mapping::normalized`](super::Mapping::normalized) of the mapping
/// the builder was seeded with: a one-value list reads back as a scalar.
///
/// ```
/// use rss_reader::feed::FeedBuilder;
///
/// let xml = FeedBuilder::new()
///     .field("title", "Dummy")
///     .field("category", vec!["Newspapers".to_string(), "Other".to_string()])
///     .build()
///     .unwrap();
/// assert!(xml.contains("<category>Other</category>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeedBuilder {
    fields: Vec<(String, FieldValue)>,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a builder with every field of a canonical mapping, in its
    /// normalized form.
    pub fn from_mapping(mapping: &FeedMapping) -> Self {
        mapping
            .normalized()
            .iter()
            .fold(Self::new(), |builder, (field, value)| {
                builder.field(field.key, value.clone())
            })
    }

    pub fn field(mut self, tag: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.fields.push((tag.into(), value));
        }
        self
    }

    /// Writes `<?xml ...?><rss version="2.0"><channel>...</channel></rss>`.
    pub fn build(&self) -> Result<String, FeedError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        write(&mut writer, Event::Start(rss))?;
        write(&mut writer, Event::Start(BytesStart::new("channel")))?;

        for (tag, value) in &self.fields {
            write_value(&mut writer, tag, value)?;
        }

        write(&mut writer, Event::End(BytesEnd::new("channel")))?;
        write(&mut writer, Event::End(BytesEnd::new("rss")))?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| FeedError::Write(e.to_string()))
    }
}

fn write_value(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    tag: &str,
    value: &FieldValue,
) -> Result<(), FeedError> {
    match value {
        FieldValue::Scalar(text) => write_text_element(writer, tag, text),
        FieldValue::List(values) => values
            .iter()
            .try_for_each(|text| write_text_element(writer, tag, text)),
        FieldValue::Entries(entries) => {
            for entry in entries.iter().filter(|entry| !entry.is_empty()) {
                write(writer, Event::Start(BytesStart::new(ITEM_TAG)))?;
                for (field, value) in entry.iter() {
                    write_value(writer, field.key, value)?;
                }
                write(writer, Event::End(BytesEnd::new(ITEM_TAG)))?;
            }
            Ok(())
        }
    }
}

fn write_text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    tag: &str,
    text: &str,
) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), FeedError> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Write(e.to_string()))
}
