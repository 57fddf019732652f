//! Owned, namespace-resolved element tree for feed documents.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use thiserror::Error;

use super::tag::{local_name, matches_local};

/// SEC-003: Maximum element nesting depth accepted from a feed document.
const MAX_DEPTH: usize = 64;

/// Errors that can occur while building an [`Element`] tree.
#[derive(Debug, Error)]
pub enum XmlError {
    /// quick-xml rejected the input (unclosed tag, mismatched end tag, ...).
    #[error("XML parse error: {0}")]
    Syntax(String),

    /// The input contained no element at all.
    #[error("document has no root element")]
    NoRoot,

    /// The input ended with elements still open.
    #[error("document ended with {0} unclosed element(s)")]
    Unclosed(usize),

    /// SEC-003: nesting exceeds the safety limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// One element of a parsed feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// `{namespace-uri}localname` when bound to a namespace, bare name otherwise.
    pub tag: String,
    /// Attributes keyed by local name, values unescaped. Namespace
    /// declarations are not included.
    pub attributes: Vec<(String, String)>,
    /// Direct text and CDATA content, concatenated in document order.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// Looks up an attribute by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children whose local name is `name`, in document order.
    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.children
            .iter()
            .filter(move |child| matches_local(&child.tag, name))
    }

    /// Pre-order walk over this element and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        // Reverse so the first child is popped first (document order).
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Parses a feed document into an owned element tree.
///
/// Tags are resolved against their in-scope namespace declarations, so
/// `<content:encoded>` with `xmlns:content="http://purl.org/rss/1.0/modules/content/"`
/// becomes `{http://purl.org/rss/1.0/modules/content/}encoded`. A prefix with no
/// declaration falls back to the bare local name.
///
/// # Errors
///
/// Returns [`XmlError`] for malformed XML, empty input, unclosed elements or
/// nesting deeper than the safety limit.
pub fn parse_document(bytes: &[u8]) -> Result<Element, XmlError> {
    // SEC-002: quick-xml never expands <!ENTITY> declarations. Unknown
    // entities in text fall back to HTML entity decoding in `decode_text`.
    let mut reader = NsReader::from_reader(bytes);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                let tag = qualified_tag(ns, &e);
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::MaxDepthExceeded(MAX_DEPTH));
                }
                stack.push(open_element(tag, &e, &reader));
            }
            Ok((ns, Event::Empty(e))) => {
                let tag = qualified_tag(ns, &e);
                let element = open_element(tag, &e, &reader);
                attach(&mut stack, &mut root, element);
            }
            Ok((_, Event::End(_))) => {
                // quick-xml checks end names, so the top of the stack is the
                // element being closed.
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Ok((_, Event::Text(e))) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&decode_text(&e, reader.decoder()));
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(current) = stack.last_mut() {
                    match e.decode() {
                        Ok(text) => current.text.push_str(&text),
                        Err(_) => current.text.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(XmlError::Syntax(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlError::Unclosed(stack.len()));
    }

    root.ok_or(XmlError::NoRoot)
}

fn qualified_tag(ns: ResolveResult<'_>, e: &BytesStart<'_>) -> String {
    let name = e.name();
    let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
    match ns {
        ResolveResult::Bound(namespace) => {
            format!("{{{}}}{}", String::from_utf8_lossy(namespace.as_ref()), local)
        }
        ResolveResult::Unbound | ResolveResult::Unknown(_) => local,
    }
}

fn open_element(tag: String, e: &BytesStart<'_>, reader: &NsReader<&[u8]>) -> Element {
    let mut attributes = Vec::new();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed XML attribute");
                continue;
            }
        };
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        match attr.decode_and_unescape_value(reader.decoder()) {
            Ok(value) => attributes.push((key, value.into_owned())),
            Err(e) => {
                tracing::debug!(attribute = %key, error = %e, "Skipping undecodable XML attribute");
            }
        }
    }

    Element {
        tag,
        attributes,
        ..Element::default()
    }
}

/// Decodes and unescapes XML text in the document's declared encoding.
///
/// Feeds regularly carry HTML entities such as `&nbsp;` without declaring
/// them, which quick-xml rejects; those are decoded as HTML.
fn decode_text(e: &BytesText<'_>, decoder: Decoder) -> String {
    if let Ok(text) = e.unescape() {
        return text.into_owned();
    }
    let raw = match decoder.decode(e) {
        Ok(text) => text,
        Err(_) => String::from_utf8_lossy(e),
    };
    html_escape::decode_html_entities(&raw).into_owned()
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => tracing::debug!(tag = %element.tag, "Ignoring element after document root"),
    }
}
