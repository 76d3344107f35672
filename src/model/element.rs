// SPDX-License-Identifier: MIT
//! Submodel elements
//!
//! A closed sum type over every concrete element kind. Codecs match on it
//! exhaustively in both directions, so adding a variant is a compile error
//! until every encoder and decoder handles it.

use crate::model::base::{ElementHeader, LangStringSet, Reference};
use crate::registry::{EntityType, KeyElements, WireToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub header: ElementHeader,
    pub value_type: String,
    pub value: Option<String>,
    pub value_id: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLanguageProperty {
    pub header: ElementHeader,
    pub value: LangStringSet,
    pub value_id: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub header: ElementHeader,
    pub value_type: String,
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub header: ElementHeader,
    pub mime_type: String,
    pub value: Option<Vec<u8>>,
}

/// Reference to a file by path or URI; the bytes live in a supplementary file store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub header: ElementHeader,
    pub mime_type: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceElement {
    pub header: ElementHeader,
    pub value: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipElement {
    pub header: ElementHeader,
    pub first: Reference,
    pub second: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedRelationshipElement {
    pub header: ElementHeader,
    pub first: Reference,
    pub second: Reference,
    pub annotations: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationVariable {
    pub value: SubmodelElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub header: ElementHeader,
    pub input_variables: Vec<OperationVariable>,
    pub output_variables: Vec<OperationVariable>,
    pub in_output_variables: Vec<OperationVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub header: ElementHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub header: ElementHeader,
    pub entity_type: EntityType,
    pub asset: Option<Reference>,
    pub statements: Vec<SubmodelElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicEvent {
    pub header: ElementHeader,
    pub observed: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmodelElementCollection {
    pub header: ElementHeader,
    pub ordered: bool,
    pub value: Vec<SubmodelElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmodelElement {
    Property(Property),
    MultiLanguageProperty(MultiLanguageProperty),
    Range(Range),
    Blob(Blob),
    File(File),
    ReferenceElement(ReferenceElement),
    RelationshipElement(RelationshipElement),
    AnnotatedRelationshipElement(AnnotatedRelationshipElement),
    Operation(Box<Operation>),
    Capability(Capability),
    Entity(Entity),
    BasicEvent(BasicEvent),
    SubmodelElementCollection(SubmodelElementCollection),
}

impl SubmodelElement {
    pub fn header(&self) -> &ElementHeader {
        match self {
            SubmodelElement::Property(e) => &e.header,
            SubmodelElement::MultiLanguageProperty(e) => &e.header,
            SubmodelElement::Range(e) => &e.header,
            SubmodelElement::Blob(e) => &e.header,
            SubmodelElement::File(e) => &e.header,
            SubmodelElement::ReferenceElement(e) => &e.header,
            SubmodelElement::RelationshipElement(e) => &e.header,
            SubmodelElement::AnnotatedRelationshipElement(e) => &e.header,
            SubmodelElement::Operation(e) => &e.header,
            SubmodelElement::Capability(e) => &e.header,
            SubmodelElement::Entity(e) => &e.header,
            SubmodelElement::BasicEvent(e) => &e.header,
            SubmodelElement::SubmodelElementCollection(e) => &e.header,
        }
    }

    pub fn id_short(&self) -> &str {
        &self.header().referable.id_short
    }

    /// Discriminator used by format A (`modelType.name`)
    pub fn model_type(&self) -> &'static str {
        self.key_element().token()
    }

    pub fn key_element(&self) -> KeyElements {
        match self {
            SubmodelElement::Property(_) => KeyElements::Property,
            SubmodelElement::MultiLanguageProperty(_) => KeyElements::MultiLanguageProperty,
            SubmodelElement::Range(_) => KeyElements::Range,
            SubmodelElement::Blob(_) => KeyElements::Blob,
            SubmodelElement::File(_) => KeyElements::File,
            SubmodelElement::ReferenceElement(_) => KeyElements::ReferenceElement,
            SubmodelElement::RelationshipElement(_) => KeyElements::RelationshipElement,
            SubmodelElement::AnnotatedRelationshipElement(_) => {
                KeyElements::AnnotatedRelationshipElement
            }
            SubmodelElement::Operation(_) => KeyElements::Operation,
            SubmodelElement::Capability(_) => KeyElements::Capability,
            SubmodelElement::Entity(_) => KeyElements::Entity,
            SubmodelElement::BasicEvent(_) => KeyElements::BasicEvent,
            SubmodelElement::SubmodelElementCollection(_) => {
                KeyElements::SubmodelElementCollection
            }
        }
    }

    /// Child elements nested directly inside this element
    pub fn children(&self) -> Vec<&SubmodelElement> {
        match self {
            SubmodelElement::SubmodelElementCollection(c) => c.value.iter().collect(),
            SubmodelElement::Entity(e) => e.statements.iter().collect(),
            SubmodelElement::Operation(op) => op
                .input_variables
                .iter()
                .chain(&op.output_variables)
                .chain(&op.in_output_variables)
                .map(|v| &v.value)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut SubmodelElement> {
        match self {
            SubmodelElement::SubmodelElementCollection(c) => c.value.iter_mut().collect(),
            SubmodelElement::Entity(e) => e.statements.iter_mut().collect(),
            SubmodelElement::Operation(op) => {
                let op = &mut **op;
                op.input_variables
                    .iter_mut()
                    .chain(op.output_variables.iter_mut())
                    .chain(op.in_output_variables.iter_mut())
                    .map(|v| &mut v.value)
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Depth-first visit of every element in `elements`, parents before children
pub fn walk<'a>(elements: &'a [SubmodelElement], visit: &mut dyn FnMut(&'a SubmodelElement)) {
    for element in elements {
        walk_one(element, visit);
    }
}

fn walk_one<'a>(element: &'a SubmodelElement, visit: &mut dyn FnMut(&'a SubmodelElement)) {
    visit(element);
    for child in element.children() {
        walk_one(child, visit);
    }
}

/// Mutable variant of [`walk`] restricted to File elements
pub fn walk_files_mut(elements: &mut [SubmodelElement], visit: &mut dyn FnMut(&mut File)) {
    for element in elements.iter_mut() {
        walk_files_one(element, visit);
    }
}

fn walk_files_one(element: &mut SubmodelElement, visit: &mut dyn FnMut(&mut File)) {
    if let SubmodelElement::File(file) = element {
        visit(file);
        return;
    }
    for child in element.children_mut() {
        walk_files_one(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id_short: &str) -> SubmodelElement {
        SubmodelElement::Property(Property {
            header: ElementHeader::new(id_short),
            value_type: "string".into(),
            value: Some("v".into()),
            value_id: None,
        })
    }

    fn file(id_short: &str, value: &str) -> SubmodelElement {
        SubmodelElement::File(File {
            header: ElementHeader::new(id_short),
            mime_type: "application/pdf".into(),
            value: Some(value.into()),
        })
    }

    fn nested() -> Vec<SubmodelElement> {
        vec![
            property("a"),
            SubmodelElement::SubmodelElementCollection(SubmodelElementCollection {
                header: ElementHeader::new("c"),
                ordered: false,
                value: vec![
                    file("f1", "/aasx/a.pdf"),
                    SubmodelElement::Entity(Entity {
                        header: ElementHeader::new("e"),
                        entity_type: EntityType::CoManagedEntity,
                        asset: None,
                        statements: vec![file("f2", "/aasx/b.pdf")],
                    }),
                ],
            }),
        ]
    }

    #[test]
    fn test_walk_visits_parents_first() {
        let elements = nested();
        let mut names = Vec::new();
        walk(&elements, &mut |e| names.push(e.id_short().to_string()));
        assert_eq!(names, vec!["a", "c", "f1", "e", "f2"]);
    }

    #[test]
    fn test_walk_files_mut_rewrites_nested() {
        let mut elements = nested();
        walk_files_mut(&mut elements, &mut |f| {
            f.value = f.value.as_ref().map(|v| format!("{}.x", v));
        });
        let mut values = Vec::new();
        walk(&elements, &mut |e| {
            if let SubmodelElement::File(f) = e {
                values.push(f.value.clone().unwrap());
            }
        });
        assert_eq!(values, vec!["/aasx/a.pdf.x", "/aasx/b.pdf.x"]);
    }

    #[test]
    fn test_model_type() {
        assert_eq!(property("p").model_type(), "Property");
        assert_eq!(file("f", "x").key_element(), KeyElements::File);
    }
}
