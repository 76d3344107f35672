// SPDX-License-Identifier: MIT
//! Owned XML element tree with namespace resolution and source lines
//!
//! Shared by the format B codec and the OPC parts of the package
//! (`[Content_Types].xml`, relationship parts, core properties).

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use crate::error::{DecodeError, EncodeError};

/// A namespace together with the prefix used when writing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub uri: &'static str,
    /// Empty for the default namespace
    pub prefix: &'static str,
}

impl Namespace {
    pub const fn new(uri: &'static str, prefix: &'static str) -> Self {
        Self { uri, prefix }
    }

    /// `xmlns` declaration attribute for this namespace
    pub fn declaration(&self) -> (String, String) {
        let name = if self.prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", self.prefix)
        };
        (name, self.uri.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub name: String,
    /// Attributes other than namespace declarations, in document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Character data of a leaf element; empty for elements with children
    pub text: String,
    /// 1-based source line of the start tag, 0 for constructed nodes
    pub line: usize,
}

impl XmlNode {
    pub fn new(ns: Namespace, name: &str) -> Self {
        Self {
            namespace: Some(ns.uri.to_string()),
            prefix: (!ns.prefix.is_empty()).then(|| ns.prefix.to_string()),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    pub fn is(&self, ns: Namespace, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(ns.uri)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child with this name
    pub fn child(&self, ns: Namespace, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.is(ns, name))
    }

    pub fn children_named<'a>(
        &'a self,
        ns: Namespace,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.is(ns, name))
    }

    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    /// Human-readable position used in diagnostics, e.g. `aas:property on line 12`
    pub fn location(&self) -> String {
        if self.line == 0 {
            self.qualified_name()
        } else {
            format!("{} on line {}", self.qualified_name(), self.line)
        }
    }

    /// Serialize with an XML declaration and two-space indentation
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;
        write_node(&mut writer, self)?;
        Ok(writer.into_inner())
    }
}

fn xml_err(e: impl std::fmt::Display) -> EncodeError {
    EncodeError::Xml(e.to_string())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), EncodeError> {
    let name = node.qualified_name();
    let mut start = BytesStart::new(name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if node.children.is_empty() && node.text.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_err);
    }
    writer.write_event(Event::Start(start)).map_err(xml_err)?;
    if node.children.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&node.text)))
            .map_err(xml_err)?;
    } else {
        for child in &node.children {
            write_node(writer, child)?;
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(xml_err)
}

/// Counts newlines incrementally so each lookup only scans new input
struct LineCounter<'a> {
    data: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.data.len());
        if position > self.offset {
            self.line += self.data[self.offset..position]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = position;
        }
        self.line
    }
}

fn split_name(raw: &[u8]) -> (Option<String>, String) {
    let raw = String::from_utf8_lossy(raw);
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, raw.into_owned()),
    }
}

fn open_node(
    reader: &NsReader<&[u8]>,
    start: &BytesStart,
    line: usize,
) -> Result<XmlNode, DecodeError> {
    let (resolved, _) = reader.resolve_element(start.name());
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(DecodeError::syntax(format!(
                "Unknown namespace prefix {} on line {}",
                String::from_utf8_lossy(&prefix),
                line
            )))
        }
    };
    let (prefix, name) = split_name(start.name().as_ref());
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            DecodeError::syntax(format!("Malformed attribute on line {}: {}", line, e))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| DecodeError::syntax(format!("Malformed attribute on line {}: {}", line, e)))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlNode {
        namespace,
        prefix,
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
        line,
    })
}

fn close_node(stack: &mut Vec<XmlNode>, mut node: XmlNode) -> Option<XmlNode> {
    if !node.children.is_empty() {
        node.text.clear();
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            None
        }
        None => Some(node),
    }
}

/// Parse a complete document and return its root element
pub fn parse(data: &[u8]) -> Result<XmlNode, DecodeError> {
    let mut reader = NsReader::from_reader(data);
    let mut lines = LineCounter::new(data);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root = None;

    loop {
        let position = reader.buffer_position() as usize;
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            let line = lines.line_at(reader.buffer_position() as usize);
            DecodeError::syntax(format!("Invalid XML document (line {}): {}", line, e))
        })?;
        match event {
            Event::Start(start) => {
                let line = lines.line_at(position);
                let node = open_node(&reader, &start, line)?;
                stack.push(node);
            }
            Event::Empty(start) => {
                let line = lines.line_at(position);
                let node = open_node(&reader, &start, line)?;
                if let Some(done) = close_node(&mut stack, node) {
                    root = Some(done);
                }
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    if let Some(done) = close_node(&mut stack, node) {
                        root = Some(done);
                    }
                }
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| {
                        DecodeError::syntax(format!("Invalid character data: {}", e))
                    })?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(cdata) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&cdata));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DecodeError::syntax("Unexpected end of XML document"));
    }
    root.ok_or_else(|| DecodeError::syntax("XML document has no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: Namespace = Namespace::new("http://example.com/ns", "ex");

    #[test]
    fn test_parse_resolves_namespaces_and_lines() {
        let doc = b"<?xml version=\"1.0\"?>\n<ex:root xmlns:ex=\"http://example.com/ns\">\n  <ex:leaf a=\"1\">text &amp; more</ex:leaf>\n  <ex:empty/>\n</ex:root>";
        let root = parse(doc).unwrap();
        assert!(root.is(NS, "root"));
        assert_eq!(root.line, 2);
        let leaf = root.child(NS, "leaf").unwrap();
        assert_eq!(leaf.text, "text & more");
        assert_eq!(leaf.attr("a"), Some("1"));
        assert_eq!(leaf.location(), "ex:leaf on line 3");
        assert_eq!(root.child(NS, "empty").unwrap().line, 4);
        assert!(root.text.is_empty());
    }

    #[test]
    fn test_default_namespace() {
        let doc = br#"<Types xmlns="http://example.com/ns"><Default Extension="xml"/></Types>"#;
        let root = parse(doc).unwrap();
        assert!(root.is(NS, "Types"));
        assert!(root.child(NS, "Default").is_some());
        assert!(root.attributes.is_empty());
    }

    #[test]
    fn test_write_then_parse() {
        let (name, uri) = NS.declaration();
        let node = XmlNode::new(NS, "root")
            .with_attr(name, uri)
            .with_child(XmlNode::new(NS, "leaf").with_text("a < b"))
            .with_child(XmlNode::new(NS, "empty"));
        let bytes = node.to_bytes().unwrap();
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed.child(NS, "leaf").unwrap().text, "a < b");
        assert_eq!(parsed.child(NS, "empty").unwrap().text, "");
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"").is_err());
        assert!(parse(b"<p:a/>").is_err());
    }
}
