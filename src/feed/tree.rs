use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::FeedError;

/// Maximum element nesting accepted from a document.
const MAX_DEPTH: usize = 256;

/// An owned XML element.
///
/// Only what the extractor needs is kept: the tag name, the direct text
/// content before the first child element, and the child elements.
/// Attributes are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Text before the first child element, trimmed once the element is
    /// complete. `None` when absent or whitespace only.
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            text: None,
            children: Vec::new(),
        }
    }

    /// Depth-first, pre-order search including `self`.
    pub fn find_first<P>(&self, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_first(predicate))
    }

    /// Appends a raw text or CDATA piece. Pieces are kept untrimmed so the
    /// whitespace between them survives.
    fn push_text(&mut self, text: &str) {
        // Text after the first child is tail text and does not belong here
        if !self.children.is_empty() || text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    fn finish_text(&mut self) {
        self.text = self
            .text
            .take()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
    }
}

/// Parses `content` into an element tree rooted at the document element.
///
/// # Errors
///
/// Returns [`FeedError::MalformedDocument`] when the markup is not
/// well-formed: mismatched or unclosed tags, unknown entities, text or a
/// second element outside the root, or no root element at all.
///
/// # Security
///
/// SEC-002: `quick-xml` never expands `<!ENTITY>` declarations. A reference
/// to a declared entity fails unescaping and is reported as malformed.
pub fn parse_document(content: &str) -> Result<Element, FeedError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(&reader, e.to_string()))?;

        match event {
            Event::Start(e) => {
                ensure_single_root(&reader, &root)?;
                if stack.len() >= MAX_DEPTH {
                    return Err(malformed(
                        &reader,
                        format!("nesting depth exceeds maximum of {MAX_DEPTH} levels"),
                    ));
                }
                stack.push(Element::new(element_name(&reader, &e)?));
            }
            Event::Empty(e) => {
                ensure_single_root(&reader, &root)?;
                let element = Element::new(element_name(&reader, &e)?);
                attach(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                // quick-xml has already checked that the end tag matches
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(&reader, "unexpected closing tag".to_string()))?;
                attach(element, &mut stack, &mut root);
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| malformed(&reader, err.to_string()))?;
                match stack.last_mut() {
                    Some(current) => current.push_text(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(malformed(
                            &reader,
                            "text outside the document element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|err| malformed(&reader, err.to_string()))?;
                match stack.last_mut() {
                    Some(current) => current.push_text(text),
                    None => {
                        return Err(malformed(
                            &reader,
                            "CDATA outside the document element".to_string(),
                        ))
                    }
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DOCTYPE
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            &reader,
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or_else(|| FeedError::MalformedDocument("no element found".to_string()))
}

fn attach(mut element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    element.finish_text();
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn ensure_single_root(reader: &Reader<&[u8]>, root: &Option<Element>) -> Result<(), FeedError> {
    if root.is_some() {
        return Err(malformed(
            reader,
            "junk after document element".to_string(),
        ));
    }
    Ok(())
}

fn element_name(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<String, FeedError> {
    let name = e.name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|err| malformed(reader, err.to_string()))
}

fn malformed(reader: &Reader<&[u8]>, message: String) -> FeedError {
    FeedError::MalformedDocument(format!(
        "{} (at byte {})",
        message,
        reader.buffer_position()
    ))
}
