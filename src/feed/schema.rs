//! Fixed field whitelists and label tables for channel and entry mappings.
//!
//! Each schema is a zero-sized marker type. [`Mapping<S>`](super::Mapping)
//! carries the marker, so a channel mapping can never be rendered with the
//! entry labels (or filtered against the entry whitelist) by accident.

use std::fmt::Debug;

/// A whitelisted field: its tag name and the prefix used in text output.
#[derive(Debug, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
}

/// Key under which nested entries are installed in a channel mapping.
pub const ITEMS_KEY: &str = "items";

static CHANNEL_FIELDS: [Field; 9] = [
    Field { key: "title", label: "Feed: " },
    Field { key: "link", label: "Link: " },
    Field { key: "lastBuildDate", label: "Last Build Date: " },
    Field { key: "pubDate", label: "Publish Date: " },
    Field { key: "language", label: "Language: " },
    Field { key: "category", label: "Categories: " },
    Field { key: "managinEditor", label: "Editor: " },
    Field { key: "description", label: "Description: " },
    Field { key: ITEMS_KEY, label: "" },
];

// The description label is a bare line break: the rendered line starts with
// an empty line before the text.
static ENTRY_FIELDS: [Field; 6] = [
    Field { key: "title", label: "Title: " },
    Field { key: "author", label: "Author: " },
    Field { key: "pubDate", label: "Published: " },
    Field { key: "link", label: "Link: " },
    Field { key: "category", label: "Categories: " },
    Field { key: "description", label: "\n" },
];

/// Binds a whitelist (in output order) to a mapping type.
pub trait Schema: Debug + Clone + PartialEq + Eq + 'static {
    /// Short name used in log output.
    const NAME: &'static str;

    /// Whitelisted fields, in the order they are emitted.
    fn fields() -> &'static [Field];

    /// Looks up a whitelisted field by tag name.
    fn field(key: &str) -> Option<&'static Field> {
        Self::fields().iter().find(|f| f.key == key)
    }
}

/// Top-level `<channel>` / `<feed>` schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {}

/// Nested `<item>` / `<entry>` schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {}

impl Schema for Channel {
    const NAME: &'static str = "channel";

    fn fields() -> &'static [Field] {
        &CHANNEL_FIELDS
    }
}

impl Schema for Entry {
    const NAME: &'static str = "entry";

    fn fields() -> &'static [Field] {
        &ENTRY_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_whitelist_order() {
        let keys: Vec<_> = Channel::fields().iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            [
                "title",
                "link",
                "lastBuildDate",
                "pubDate",
                "language",
                "category",
                "managinEditor",
                "description",
                "items"
            ]
        );
    }

    #[test]
    fn test_entry_whitelist_has_no_items() {
        assert!(Entry::field(ITEMS_KEY).is_none());
        assert_eq!(Entry::fields().len(), 6);
    }

    #[test]
    fn test_labels_differ_per_schema() {
        assert_eq!(Channel::field("title").unwrap().label, "Feed: ");
        assert_eq!(Entry::field("title").unwrap().label, "Title: ");
        assert_eq!(Channel::field("pubDate").unwrap().label, "Publish Date: ");
        assert_eq!(Entry::field("pubDate").unwrap().label, "Published: ");
        assert_eq!(Entry::field("description").unwrap().label, "\n");
    }

    #[test]
    fn test_unknown_field() {
        assert!(Channel::field("copyright").is_none());
        assert!(Entry::field("guid").is_none());
    }
}
