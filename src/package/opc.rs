// SPDX-License-Identifier: MIT
//! Open Packaging Conventions plumbing
//!
//! Part names are absolute (`/aasx/data.xml`); the ZIP entry of a part is
//! its name without the leading slash. Relationship parts live next to
//! their source in a `_rels` directory, package relationships in
//! `/_rels/.rels`.

use std::collections::BTreeMap;

use crate::error::{DecodeError, EncodeError};
use crate::xml::node::{self, Namespace, XmlNode};

pub const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
pub const RELATIONSHIPS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

pub const NS_CONTENT_TYPES: Namespace = Namespace::new(
    "http://schemas.openxmlformats.org/package/2006/content-types",
    "",
);
pub const NS_RELATIONSHIPS: Namespace = Namespace::new(
    "http://schemas.openxmlformats.org/package/2006/relationships",
    "",
);

/// Normalise a part name: leading slash, no empty, `.` or `..` segments
pub fn normalize_part_name(name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Resolve a relationship target or File value against its source part.
///
/// Absolute targets are only normalised; relative ones are taken relative
/// to the directory of `source` (the package root when `source` is `None`).
pub fn resolve_target(source: Option<&str>, target: &str) -> String {
    if target.starts_with('/') {
        return normalize_part_name(target);
    }
    let base = source
        .and_then(|s| s.rfind('/').map(|i| &s[..i]))
        .unwrap_or("");
    normalize_part_name(&format!("{}/{}", base, target))
}

/// Relationship part holding the relationships of `source`
pub fn relationships_part(source: Option<&str>) -> String {
    match source {
        None => "/_rels/.rels".to_string(),
        Some(source) => {
            let source = normalize_part_name(source);
            let split = source.rfind('/').unwrap_or(0);
            format!("{}/_rels/{}.rels", &source[..split], &source[split + 1..])
        }
    }
}

pub fn zip_entry_name(part_name: &str) -> &str {
    part_name.trim_start_matches('/')
}

fn extension(part_name: &str) -> Option<&str> {
    let segment = part_name.rsplit('/').next().unwrap_or(part_name);
    segment.rsplit_once('.').map(|(_, ext)| ext)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Assigned by the writer when empty
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn new(rel_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            rel_type: rel_type.into(),
            target: target.into(),
            external: false,
        }
    }
}

pub fn relationships_to_xml(relationships: &[Relationship]) -> Result<Vec<u8>, EncodeError> {
    let (xmlns, uri) = NS_RELATIONSHIPS.declaration();
    let mut root = XmlNode::new(NS_RELATIONSHIPS, "Relationships").with_attr(xmlns, uri);
    let mut next_id = 1;
    for rel in relationships {
        let id = if rel.id.is_empty() {
            let id = format!("r{}", next_id);
            next_id += 1;
            id
        } else {
            rel.id.clone()
        };
        let mut node = XmlNode::new(NS_RELATIONSHIPS, "Relationship")
            .with_attr("Type", rel.rel_type.as_str())
            .with_attr("Target", rel.target.as_str())
            .with_attr("Id", id);
        if rel.external {
            node = node.with_attr("TargetMode", "External");
        }
        root.push(node);
    }
    root.to_bytes()
}

pub fn parse_relationships(data: &[u8]) -> Result<Vec<Relationship>, DecodeError> {
    let root = node::parse(data)?;
    if !root.is(NS_RELATIONSHIPS, "Relationships") {
        return Err(DecodeError::syntax(format!(
            "Unexpected root element {} in relationship part",
            root.location()
        )));
    }
    root.children_named(NS_RELATIONSHIPS, "Relationship")
        .map(|rel| {
            let attr = |name: &str| {
                rel.attr(name).map(str::to_string).ok_or_else(|| {
                    DecodeError::missing(format!(
                        "{} has no attribute with name {}!",
                        rel.location(),
                        name
                    ))
                })
            };
            Ok(Relationship {
                id: attr("Id")?,
                rel_type: attr("Type")?,
                target: attr("Target")?,
                external: rel.attr("TargetMode") == Some("External"),
            })
        })
        .collect()
}

/// The `[Content_Types].xml` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// Lower-case extension to content type
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut types = Self::default();
        types
            .defaults
            .insert("rels".to_string(), RELATIONSHIPS_CONTENT_TYPE.to_string());
        types
    }

    pub fn get(&self, part_name: &str) -> Option<&str> {
        let part_name = normalize_part_name(part_name);
        if let Some(content_type) = self.overrides.get(&part_name) {
            return Some(content_type.as_str());
        }
        extension(&part_name)
            .and_then(|ext| self.defaults.get(&ext.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Record the content type of a new part, preferring an extension default
    pub fn register(&mut self, part_name: &str, content_type: &str) {
        let part_name = normalize_part_name(part_name);
        if let Some(ext) = extension(&part_name) {
            let ext = ext.to_ascii_lowercase();
            match self.defaults.get(&ext) {
                Some(existing) if existing == content_type => return,
                None => {
                    self.defaults.insert(ext, content_type.to_string());
                    return;
                }
                Some(_) => {}
            }
        }
        self.overrides.insert(part_name, content_type.to_string());
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, EncodeError> {
        let (xmlns, uri) = NS_CONTENT_TYPES.declaration();
        let root = XmlNode::new(NS_CONTENT_TYPES, "Types")
            .with_attr(xmlns, uri)
            .with_children(self.defaults.iter().map(|(ext, content_type)| {
                XmlNode::new(NS_CONTENT_TYPES, "Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", content_type.as_str())
            }))
            .with_children(self.overrides.iter().map(|(part, content_type)| {
                XmlNode::new(NS_CONTENT_TYPES, "Override")
                    .with_attr("PartName", part.as_str())
                    .with_attr("ContentType", content_type.as_str())
            }));
        root.to_bytes()
    }

    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let root = node::parse(data)?;
        if !root.is(NS_CONTENT_TYPES, "Types") {
            return Err(DecodeError::syntax(format!(
                "Unexpected root element {} in content types",
                root.location()
            )));
        }
        let mut types = Self::default();
        for entry in &root.children {
            let content_type = entry.attr("ContentType").unwrap_or_default().to_string();
            if entry.is(NS_CONTENT_TYPES, "Default") {
                if let Some(ext) = entry.attr("Extension") {
                    types.defaults.insert(ext.to_ascii_lowercase(), content_type);
                }
            } else if entry.is(NS_CONTENT_TYPES, "Override") {
                if let Some(part) = entry.attr("PartName") {
                    types.overrides.insert(normalize_part_name(part), content_type);
                }
            }
        }
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_part_name() {
        assert_eq!(normalize_part_name("aasx/./a/../b.xml"), "/aasx/b.xml");
        assert_eq!(normalize_part_name("//x//y"), "/x/y");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target(Some("/aasx/shell/shell.aas.xml"), "files/manual.pdf"),
            "/aasx/shell/files/manual.pdf"
        );
        assert_eq!(
            resolve_target(Some("/aasx/shell/shell.aas.xml"), "../aasx-origin"),
            "/aasx/aasx-origin"
        );
        assert_eq!(resolve_target(Some("/aasx/a.xml"), "/b.pdf"), "/b.pdf");
        assert_eq!(resolve_target(None, "aasx/aasx-origin"), "/aasx/aasx-origin");
    }

    #[test]
    fn test_relationships_part() {
        assert_eq!(relationships_part(None), "/_rels/.rels");
        assert_eq!(
            relationships_part(Some("/aasx/aasx-origin")),
            "/aasx/_rels/aasx-origin.rels"
        );
        assert_eq!(relationships_part(Some("/data.xml")), "/_rels/data.xml.rels");
    }

    #[test]
    fn test_relationships_xml() {
        let mut explicit = Relationship::new("http://example.com/b", "/b");
        explicit.id = "custom".to_string();
        let rels = vec![Relationship::new("http://example.com/a", "/a"), explicit];
        let parsed = parse_relationships(&relationships_to_xml(&rels).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, "r1");
        assert_eq!(parsed[0].target, "/a");
        assert_eq!(parsed[1].id, "custom");
        assert!(!parsed[1].external);
    }

    #[test]
    fn test_content_types_default_and_override() {
        let mut types = ContentTypes::new();
        types.register("/aasx/data.xml", "application/xml");
        types.register("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml");
        types.register("/aasx/aasx-origin", "text/plain");

        let parsed = ContentTypes::parse(&types.to_xml().unwrap()).unwrap();
        assert_eq!(parsed.get("/aasx/data.xml"), Some("application/xml"));
        assert_eq!(parsed.get("/other/DATA.XML"), Some("application/xml"));
        assert_eq!(
            parsed.get("/docProps/core.xml"),
            Some("application/vnd.openxmlformats-package.core-properties+xml")
        );
        assert_eq!(parsed.get("/aasx/aasx-origin"), Some("text/plain"));
        assert_eq!(parsed.get("/_rels/.rels"), Some(RELATIONSHIPS_CONTENT_TYPE));
        assert_eq!(parsed.get("/unknown.bin"), None);
    }
}
