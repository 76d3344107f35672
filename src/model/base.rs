// SPDX-License-Identifier: MIT
//! Identifiers, references and the capabilities shared by most model nodes

use std::collections::BTreeMap;
use std::fmt;

use crate::registry::{IdentifierType, KeyElements, KeyType, ModelingKind};

/// Language tag to text
pub type LangStringSet = BTreeMap<String, String>;

/// Globally unique key of an Identifiable
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    pub id: String,
    pub id_type: IdentifierType,
}

impl Identifier {
    pub fn new(id: impl Into<String>, id_type: IdentifierType) -> Self {
        Self {
            id: id.into(),
            id_type,
        }
    }

    pub fn iri(id: impl Into<String>) -> Self {
        Self::new(id, IdentifierType::Iri)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id_type, self.id)
    }
}

/// One step of a reference path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub element: KeyElements,
    pub local: bool,
    pub value: String,
    pub id_type: KeyType,
}

impl Key {
    pub fn new(element: KeyElements, local: bool, value: impl Into<String>, id_type: KeyType) -> Self {
        Self {
            element,
            local,
            value: value.into(),
            id_type,
        }
    }

    /// Key addressing an Identifiable by its Identifier
    pub fn for_identifier(element: KeyElements, identifier: &Identifier) -> Self {
        Self::new(element, true, identifier.id.clone(), identifier.id_type.key_type())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id_type, self.value)
    }
}

/// Ordered key path from a root context to a target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub keys: Vec<Key>,
}

impl Reference {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    /// Single-key reference to an Identifiable
    pub fn to_identifiable(element: KeyElements, identifier: &Identifier) -> Self {
        Self::new(vec![Key::for_identifier(element, identifier)])
    }

    /// Single-key reference to something outside the model
    pub fn global(value: impl Into<String>) -> Self {
        Self::new(vec![Key::new(
            KeyElements::GlobalReference,
            false,
            value,
            KeyType::Iri,
        )])
    }

    /// Identifier named by the first key, if that key addresses an Identifiable
    pub fn identifier(&self) -> Option<Identifier> {
        let first = self.keys.first()?;
        if !first.element.is_identifiable() {
            return None;
        }
        let id_type = IdentifierType::from_key_type(first.id_type)?;
        Some(Identifier::new(first.value.clone(), id_type))
    }

    /// Whether the last key's element kind fits the declared target
    pub fn matches_target(&self, target: ReferenceTarget) -> bool {
        match self.keys.last() {
            Some(key) => target.accepts(key.element),
            None => true,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.keys.iter().map(|k| k.to_string()).collect();
        f.write_str(&keys.join(" / "))
    }
}

/// Declared target type of a model reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget {
    Asset,
    AssetAdministrationShell,
    Submodel,
    ConceptDescription,
    DataElement,
    Referable,
}

impl ReferenceTarget {
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceTarget::Asset => "Asset",
            ReferenceTarget::AssetAdministrationShell => "AssetAdministrationShell",
            ReferenceTarget::Submodel => "Submodel",
            ReferenceTarget::ConceptDescription => "ConceptDescription",
            ReferenceTarget::DataElement => "DataElement",
            ReferenceTarget::Referable => "Referable",
        }
    }

    fn accepts(&self, element: KeyElements) -> bool {
        match self {
            ReferenceTarget::Asset => element == KeyElements::Asset,
            ReferenceTarget::AssetAdministrationShell => {
                element == KeyElements::AssetAdministrationShell
            }
            ReferenceTarget::Submodel => element == KeyElements::Submodel,
            ReferenceTarget::ConceptDescription => element == KeyElements::ConceptDescription,
            ReferenceTarget::DataElement => element.is_data_element(),
            ReferenceTarget::Referable => !element.is_external(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdministrativeInformation {
    pub version: Option<String>,
    pub revision: Option<String>,
}

/// Referable capability: local name, category and description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Referable {
    pub id_short: String,
    pub category: Option<String>,
    pub description: LangStringSet,
}

impl Referable {
    pub fn new(id_short: impl Into<String>) -> Self {
        Self {
            id_short: id_short.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub qualifier_type: String,
    pub value_type: String,
    pub value: Option<String>,
    pub value_id: Option<Reference>,
    pub semantic_id: Option<Reference>,
}

impl Qualifier {
    pub fn new(qualifier_type: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            qualifier_type: qualifier_type.into(),
            value_type: value_type.into(),
            value: None,
            value_id: None,
            semantic_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formula {
    pub depends_on: Vec<Reference>,
}

/// Qualifiable capability entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Qualifier(Qualifier),
    Formula(Formula),
}

impl Constraint {
    pub fn model_type(&self) -> &'static str {
        match self {
            Constraint::Qualifier(_) => "Qualifier",
            Constraint::Formula(_) => "Formula",
        }
    }
}

/// Capabilities carried by every submodel element:
/// Referable, HasSemantics, Qualifiable and HasKind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementHeader {
    pub referable: Referable,
    pub semantic_id: Option<Reference>,
    pub qualifiers: Vec<Constraint>,
    pub kind: ModelingKind,
}

impl ElementHeader {
    pub fn new(id_short: impl Into<String>) -> Self {
        Self {
            referable: Referable::new(id_short),
            ..Default::default()
        }
    }
}
