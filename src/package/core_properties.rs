// SPDX-License-Identifier: MIT
//! OPC core properties (`/docProps/core.xml`)

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};
use crate::xml::node::{self, Namespace, XmlNode};

pub const CORE_PROPERTIES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.core-properties+xml";

const NS_CP: Namespace = Namespace::new(
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    "cp",
);
const NS_DC: Namespace = Namespace::new("http://purl.org/dc/elements/1.1/", "dc");
const NS_DCTERMS: Namespace = Namespace::new("http://purl.org/dc/terms/", "dcterms");
const NS_XSI: Namespace = Namespace::new("http://www.w3.org/2001/XMLSchema-instance", "xsi");

/// Package metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

fn text_element(ns: Namespace, name: &str, value: &Option<String>) -> Option<XmlNode> {
    value
        .as_ref()
        .map(|value| XmlNode::new(ns, name).with_text(value.as_str()))
}

fn date_element(name: &str, value: &Option<DateTime<Utc>>) -> Option<XmlNode> {
    value.map(|value| {
        XmlNode::new(NS_DCTERMS, name)
            .with_attr("xsi:type", "dcterms:W3CDTF")
            .with_text(value.to_rfc3339_opts(SecondsFormat::Secs, true))
    })
}

fn parse_date(node: &XmlNode) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(node.text.trim())
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| {
            DecodeError::invalid_value(format!(
                "{} is not a W3CDTF timestamp: {}",
                node.location(),
                e
            ))
        })
}

impl CoreProperties {
    pub fn to_xml(&self) -> Result<Vec<u8>, EncodeError> {
        let mut root = XmlNode::new(NS_CP, "coreProperties");
        for ns in [NS_CP, NS_DC, NS_DCTERMS, NS_XSI] {
            let (name, uri) = ns.declaration();
            root = root.with_attr(name, uri);
        }
        let children = [
            text_element(NS_CP, "category", &self.category),
            date_element("created", &self.created),
            text_element(NS_DC, "creator", &self.creator),
            text_element(NS_DC, "description", &self.description),
            text_element(NS_CP, "keywords", &self.keywords),
            text_element(NS_CP, "lastModifiedBy", &self.last_modified_by),
            date_element("modified", &self.modified),
            text_element(NS_CP, "revision", &self.revision),
            text_element(NS_DC, "subject", &self.subject),
            text_element(NS_DC, "title", &self.title),
            text_element(NS_CP, "version", &self.version),
        ];
        root.with_children(children.into_iter().flatten()).to_bytes()
    }

    /// Unknown elements are ignored
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let root = node::parse(data)?;
        if !root.is(NS_CP, "coreProperties") {
            return Err(DecodeError::syntax(format!(
                "Unexpected root element {} in core properties",
                root.location()
            )));
        }
        let text = |ns: Namespace, name: &str| root.child(ns, name).map(|c| c.text.clone());
        let date = |name: &str| root.child(NS_DCTERMS, name).map(parse_date).transpose();
        Ok(Self {
            category: text(NS_CP, "category"),
            created: date("created")?,
            creator: text(NS_DC, "creator"),
            description: text(NS_DC, "description"),
            keywords: text(NS_CP, "keywords"),
            last_modified_by: text(NS_CP, "lastModifiedBy"),
            modified: date("modified")?,
            revision: text(NS_CP, "revision"),
            subject: text(NS_DC, "subject"),
            title: text(NS_DC, "title"),
            version: text(NS_CP, "version"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_xml_round_trip() {
        let properties = CoreProperties {
            creator: Some("PyI40AAS Testing Framework".to_string()),
            title: Some("Example".to_string()),
            created: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let xml = properties.to_xml().unwrap();
        let text = String::from_utf8(xml.clone()).unwrap();
        assert!(text.contains("2020-01-01T00:00:00Z"));
        assert_eq!(CoreProperties::parse(&xml).unwrap(), properties);
    }

    #[test]
    fn test_invalid_date() {
        let xml = br#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dcterms="http://purl.org/dc/terms/"><dcterms:created>yesterday</dcterms:created></cp:coreProperties>"#;
        assert!(CoreProperties::parse(xml).is_err());
    }
}
