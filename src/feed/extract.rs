use std::num::NonZeroUsize;

use super::mapping::{EntryMapping, FeedMapping, FieldValue, GenericMapping};
use super::schema::ITEMS_KEY;
use super::tree::Element;

/// How a child element is treated by the extractor.
enum ChildKind<'a> {
    /// Element with children and no text of its own: an `<item>` / `<entry>`.
    Nested,
    /// Element carrying a value. Empty elements yield an empty scalar that
    /// the filter later drops.
    Text(&'a str),
}

fn classify(element: &Element) -> ChildKind<'_> {
    match &element.text {
        Some(text) => ChildKind::Text(text),
        None if element.children.is_empty() => ChildKind::Text(""),
        None => ChildKind::Nested,
    }
}

/// Builds the canonical feed mapping from a `<channel>` / `<feed>` element.
///
/// Every text child is stored under its tag, repeated tags folded into a
/// list. Every nested child is extracted as an entry and collected, in
/// document order, under `items`. With a `limit`, entries past the limit are
/// skipped while the remaining text children are still read.
pub fn extract_channel(section: &Element, limit: Option<NonZeroUsize>) -> FeedMapping {
    let mut generic = GenericMapping::new();
    let mut entries: Vec<EntryMapping> = Vec::new();
    let mut skipped = 0usize;

    for child in &section.children {
        match classify(child) {
            ChildKind::Nested => {
                if limit.is_some_and(|limit| entries.len() >= limit.get()) {
                    skipped += 1;
                    continue;
                }
                entries.push(extract_entry(child));
            }
            ChildKind::Text(_) if child.name == ITEMS_KEY => {
                tracing::debug!("Ignoring text element named `items`");
            }
            ChildKind::Text(text) => generic.insert_text(&child.name, text.to_string()),
        }
    }

    if skipped > 0 {
        tracing::debug!(kept = entries.len(), skipped, "Entry limit reached");
    }

    if !entries.is_empty() {
        generic.insert(ITEMS_KEY, FieldValue::Entries(entries));
    }

    generic.filter()
}

/// Builds the canonical mapping of a single `<item>` / `<entry>` element.
///
/// Nested elements inside an entry are ignored.
pub fn extract_entry(element: &Element) -> EntryMapping {
    let mut generic = GenericMapping::new();

    for child in &element.children {
        match classify(child) {
            ChildKind::Nested => {
                tracing::trace!(tag = %child.name, "Ignoring element nested inside an entry");
            }
            ChildKind::Text(text) => generic.insert_text(&child.name, text.to_string()),
        }
    }

    generic.filter()
}
