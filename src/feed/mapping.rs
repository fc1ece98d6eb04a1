use std::collections::HashMap;
use std::marker::PhantomData;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::schema::{Channel, Entry, Field, Schema, ITEMS_KEY};

/// Canonical top-level mapping: channel whitelist, channel labels.
pub type FeedMapping = Mapping<Channel>;

/// Canonical mapping of one `<item>` / `<entry>`.
pub type EntryMapping = Mapping<Entry>;

/// Value of a single field.
///
/// Serializes untagged: a JSON string, an array of strings, or an array of
/// entry objects.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
    Entries(Vec<EntryMapping>),
}

impl FieldValue {
    /// Empty values are dropped by [`GenericMapping::filter`].
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.is_empty(),
            FieldValue::List(values) => values.is_empty(),
            FieldValue::Entries(entries) => entries.is_empty(),
        }
    }

    /// Folds another occurrence of the same tag into this value.
    ///
    /// A scalar becomes a two-element list; a list grows by one. Entries are
    /// never folded with text and are returned unchanged.
    fn fold(self, text: String) -> FieldValue {
        match self {
            FieldValue::Scalar(previous) => FieldValue::List(vec![previous, text]),
            FieldValue::List(mut values) => {
                values.push(text);
                FieldValue::List(values)
            }
            FieldValue::Entries(entries) => {
                tracing::debug!("Ignoring text that collides with nested entries");
                FieldValue::Entries(entries)
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Scalar(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Scalar(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

impl From<Vec<EntryMapping>> for FieldValue {
    fn from(entries: Vec<EntryMapping>) -> Self {
        FieldValue::Entries(entries)
    }
}

/// Unordered, unfiltered mapping built straight from an element's children.
///
/// May hold tags outside any whitelist; those are discarded by
/// [`GenericMapping::filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericMapping {
    fields: HashMap<String, FieldValue>,
}

impl GenericMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` under `tag`, folding repeated tags into a list.
    pub fn insert_text(&mut self, tag: &str, text: String) {
        match self.fields.remove(tag) {
            Some(previous) => {
                let folded = previous.fold(text);
                self.fields.insert(tag.to_string(), folded);
            }
            None => {
                self.fields.insert(tag.to_string(), FieldValue::Scalar(text));
            }
        }
    }

    /// Stores `value` under `tag`, replacing whatever was there.
    pub fn insert(&mut self, tag: impl Into<String>, value: FieldValue) {
        self.fields.insert(tag.into(), value);
    }

    pub fn get(&self, tag: &str) -> Option<&FieldValue> {
        self.fields.get(tag)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reduces this mapping to the whitelist of `S`.
    ///
    /// The result holds only whitelisted keys, in whitelist order, and no
    /// empty values. Entries live under `items` only and `items` holds only
    /// entries; a value of the wrong shape is dropped. Applying it again to
    /// its own output is a no-op.
    pub fn filter<S: Schema>(mut self) -> Mapping<S> {
        let mut fields = Vec::with_capacity(S::fields().len());
        for field in S::fields() {
            match self.fields.remove(field.key) {
                Some(value) if value.is_empty() => {}
                Some(value) if !shape_fits(field, &value) => {
                    tracing::debug!(
                        schema = S::NAME,
                        key = field.key,
                        "Dropped field whose value has the wrong shape"
                    );
                }
                Some(value) => fields.push((field, value)),
                None => {}
            }
        }

        if !self.fields.is_empty() {
            tracing::trace!(
                schema = S::NAME,
                dropped = self.fields.len(),
                "Discarded fields outside the whitelist"
            );
        }

        Mapping {
            fields,
            schema: PhantomData,
        }
    }
}

fn shape_fits(field: &Field, value: &FieldValue) -> bool {
    matches!(value, FieldValue::Entries(_)) == (field.key == ITEMS_KEY)
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for GenericMapping {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<S: Schema> From<Mapping<S>> for GenericMapping {
    fn from(mapping: Mapping<S>) -> Self {
        mapping
            .fields
            .into_iter()
            .map(|(field, value)| (field.key, value))
            .collect()
    }
}

/// Ordered, whitelisted mapping for schema `S`.
///
/// Only [`GenericMapping::filter`] builds one, so every key is in the
/// whitelist, keys follow whitelist order, and no value is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping<S: Schema> {
    fields: Vec<(&'static Field, FieldValue)>,
    schema: PhantomData<S>,
}

impl<S: Schema> Default for Mapping<S> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            schema: PhantomData,
        }
    }
}

impl<S: Schema> Mapping<S> {
    /// Fields in whitelist order, with their table entry.
    pub fn iter(&self) -> impl Iterator<Item = (&'static Field, &FieldValue)> + '_ {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(field, _)| field.key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field.key == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The form this mapping takes after a trip through XML.
    ///
    /// A one-value list becomes a scalar and entries with no fields are
    /// removed, recursively. A field left with no entries is removed too.
    pub fn normalized(&self) -> Self {
        let fields = self
            .fields
            .iter()
            .filter_map(|(field, value)| {
                let value = match value {
                    FieldValue::List(values) if values.len() == 1 => {
                        FieldValue::Scalar(values[0].clone())
                    }
                    FieldValue::Entries(entries) => FieldValue::Entries(
                        entries
                            .iter()
                            .filter(|entry| !entry.is_empty())
                            .map(Mapping::normalized)
                            .collect(),
                    ),
                    other => other.clone(),
                };
                (!value.is_empty()).then_some((*field, value))
            })
            .collect();
        Self {
            fields,
            schema: PhantomData,
        }
    }
}

impl Mapping<Channel> {
    /// Nested entries, or an empty slice when the feed has none.
    pub fn entries(&self) -> &[EntryMapping] {
        match self.get(ITEMS_KEY) {
            Some(FieldValue::Entries(entries)) => entries,
            _ => &[],
        }
    }
}

impl<S: Schema> Serialize for Mapping<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.key, value)?;
        }
        map.end()
    }
}
