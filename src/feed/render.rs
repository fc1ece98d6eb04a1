use super::mapping::{FieldValue, Mapping};
use super::schema::Schema;
use super::FeedError;

/// Separator between the values of a list field in text output.
const LIST_SEPARATOR: &str = ", ";

/// Output flavour of [`render`](super::render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Labeled lines, e.g. `Feed: Some RSS Channel`.
    #[default]
    Text,
    /// Pretty-printed JSON, split into lines.
    Json,
}

impl From<bool> for OutputFormat {
    /// Maps a `json` flag to a format.
    fn from(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Renders a mapping as labeled text lines.
///
/// Each field becomes `label + value`. List values (including a `category`
/// that occurred once) are joined with `", "`. Each nested entry is preceded
/// by an empty line and rendered with the entry labels.
pub fn render_text<S: Schema>(mapping: &Mapping<S>) -> Vec<String> {
    let mut lines = Vec::new();

    for (field, value) in mapping.iter() {
        match value {
            FieldValue::Entries(entries) => {
                for entry in entries {
                    lines.push(String::new());
                    lines.extend(render_text(entry));
                }
            }
            FieldValue::List(values) => {
                lines.push(format!("{}{}", field.label, values.join(LIST_SEPARATOR)));
            }
            FieldValue::Scalar(value) => {
                lines.push(format!("{}{}", field.label, value));
            }
        }
    }

    lines
}

/// Renders a mapping as 2-space indented JSON, one string per line.
///
/// Keys appear in whitelist order; entries form an array of objects under
/// `"items"`.
pub fn render_json<S: Schema>(mapping: &Mapping<S>) -> Result<Vec<String>, FeedError> {
    let json = serde_json::to_string_pretty(mapping)?;
    Ok(json.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::mapping::{EntryMapping, FeedMapping, GenericMapping};
    use pretty_assertions::assert_eq;

    fn scalar(s: &str) -> FieldValue {
        FieldValue::Scalar(s.to_string())
    }

    fn list(values: &[&str]) -> FieldValue {
        FieldValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    fn entry(fields: Vec<(&str, FieldValue)>) -> EntryMapping {
        fields.into_iter().collect::<GenericMapping>().filter()
    }

    fn feed(fields: Vec<(&str, FieldValue)>) -> FeedMapping {
        fields.into_iter().collect::<GenericMapping>().filter()
    }

    #[test]
    fn test_output_format_from_flag() {
        assert_eq!(OutputFormat::from(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from(false), OutputFormat::Text);
    }

    #[test]
    fn test_text_channel_labels() {
        let mapping = feed(vec![
            ("managinEditor", scalar("ed")),
            ("title", scalar("t")),
            ("lastBuildDate", scalar("b")),
            ("pubDate", scalar("p")),
            ("language", scalar("en")),
            ("link", scalar("l")),
            ("description", scalar("d")),
        ]);
        assert_eq!(
            render_text(&mapping),
            [
                "Feed: t",
                "Link: l",
                "Last Build Date: b",
                "Publish Date: p",
                "Language: en",
                "Editor: ed",
                "Description: d",
            ]
        );
    }

    #[test]
    fn test_text_category_single_and_multiple() {
        let single = feed(vec![("category", scalar("News"))]);
        assert_eq!(render_text(&single), ["Categories: News"]);

        let multiple = feed(vec![("category", list(&["News", "Tech"]))]);
        assert_eq!(render_text(&multiple), ["Categories: News, Tech"]);
    }

    #[test]
    fn test_text_non_category_list() {
        let mapping = feed(vec![("link", list(&["a", "b"]))]);
        assert_eq!(render_text(&mapping), ["Link: a, b"]);
    }

    #[test]
    fn test_text_entries() {
        let mapping = feed(vec![
            ("title", scalar("Feed")),
            (
                "items",
                FieldValue::Entries(vec![
                    entry(vec![
                        ("description", scalar("Body")),
                        ("author", scalar("Ann")),
                        ("title", scalar("First")),
                        ("pubDate", scalar("Mon")),
                        ("link", scalar("https://a")),
                        ("category", list(&["x", "y"])),
                    ]),
                    entry(vec![("title", scalar("Second"))]),
                ]),
            ),
        ]);

        assert_eq!(
            render_text(&mapping),
            [
                "Feed: Feed",
                "",
                "Title: First",
                "Author: Ann",
                "Published: Mon",
                "Link: https://a",
                "Categories: x, y",
                "\nBody",
                "",
                "Title: Second",
            ]
        );
    }

    #[test]
    fn test_render_does_not_mutate() {
        let mapping = feed(vec![("category", scalar("one"))]);
        let before = mapping.clone();
        let _ = render_text(&mapping);
        assert_eq!(mapping, before);
    }

    #[test]
    fn test_json_lines() {
        let mapping = feed(vec![
            ("description", scalar("d")),
            ("title", scalar("t")),
            ("category", list(&["a", "b"])),
            ("items", FieldValue::Entries(vec![entry(vec![("title", scalar("e"))])])),
        ]);

        assert_eq!(
            render_json(&mapping).unwrap(),
            [
                "{",
                "  \"title\": \"t\",",
                "  \"category\": [",
                "    \"a\",",
                "    \"b\"",
                "  ],",
                "  \"description\": \"d\",",
                "  \"items\": [",
                "    {",
                "      \"title\": \"e\"",
                "    }",
                "  ]",
                "}",
            ]
        );
    }

    #[test]
    fn test_json_empty_mapping() {
        assert_eq!(render_json(&FeedMapping::default()).unwrap(), ["{}"]);
    }
}
