// SPDX-License-Identifier: MIT
//! Top-level Identifiables and the non-identifiable referables they own

use crate::model::base::{
    AdministrativeInformation, Constraint, Identifier, LangStringSet, Reference, Referable,
};
use crate::model::element::SubmodelElement;
use crate::registry::{AssetKind, Iec61360DataType, Iec61360LevelType, KeyElements, ModelingKind};

/// Identifier of the IEC 61360 data specification template
pub const IEC61360_TEMPLATE_IRI: &str =
    "http://admin-shell.io/DataSpecificationTemplates/DataSpecificationIEC61360/2/0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub referable: Referable,
    pub semantic_id: Option<Reference>,
    pub contained_elements: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptDictionary {
    pub referable: Referable,
    pub concept_descriptions: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAdministrationShell {
    pub identification: Identifier,
    pub referable: Referable,
    pub administration: Option<AdministrativeInformation>,
    pub derived_from: Option<Reference>,
    pub asset: Reference,
    pub submodels: Vec<Reference>,
    pub views: Vec<View>,
    pub concept_dictionaries: Vec<ConceptDictionary>,
}

impl AssetAdministrationShell {
    pub fn new(identification: Identifier, asset: Reference) -> Self {
        Self {
            identification,
            referable: Referable::default(),
            administration: None,
            derived_from: None,
            asset,
            submodels: Vec::new(),
            views: Vec::new(),
            concept_dictionaries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub identification: Identifier,
    pub referable: Referable,
    pub administration: Option<AdministrativeInformation>,
    pub kind: AssetKind,
    pub asset_identification_model: Option<Reference>,
    pub bill_of_material: Option<Reference>,
}

impl Asset {
    pub fn new(identification: Identifier, kind: AssetKind) -> Self {
        Self {
            identification,
            referable: Referable::default(),
            administration: None,
            kind,
            asset_identification_model: None,
            bill_of_material: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodel {
    pub identification: Identifier,
    pub referable: Referable,
    pub administration: Option<AdministrativeInformation>,
    pub kind: ModelingKind,
    pub semantic_id: Option<Reference>,
    pub qualifiers: Vec<Constraint>,
    pub submodel_elements: Vec<SubmodelElement>,
}

impl Submodel {
    pub fn new(identification: Identifier) -> Self {
        Self {
            identification,
            referable: Referable::default(),
            administration: None,
            kind: ModelingKind::Instance,
            semantic_id: None,
            qualifiers: Vec::new(),
            submodel_elements: Vec::new(),
        }
    }
}

/// Embedded IEC 61360 data specification content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Iec61360Content {
    pub preferred_name: LangStringSet,
    pub short_name: Option<String>,
    pub unit: Option<String>,
    pub source_of_definition: Option<String>,
    pub symbol: Option<String>,
    pub data_type: Option<Iec61360DataType>,
    pub definition: LangStringSet,
    pub value_format: Option<String>,
    pub level_types: Vec<Iec61360LevelType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptDescription {
    pub identification: Identifier,
    pub referable: Referable,
    pub administration: Option<AdministrativeInformation>,
    pub is_case_of: Vec<Reference>,
    pub iec61360: Option<Iec61360Content>,
}

impl ConceptDescription {
    pub fn new(identification: Identifier) -> Self {
        Self {
            identification,
            referable: Referable::default(),
            administration: None,
            is_case_of: Vec::new(),
            iec61360: None,
        }
    }
}

/// Any entity that can live in an [`ObjectStore`](crate::model::ObjectStore)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifiable {
    AssetAdministrationShell(AssetAdministrationShell),
    Asset(Asset),
    Submodel(Submodel),
    ConceptDescription(ConceptDescription),
}

impl Identifiable {
    pub fn identification(&self) -> &Identifier {
        match self {
            Identifiable::AssetAdministrationShell(x) => &x.identification,
            Identifiable::Asset(x) => &x.identification,
            Identifiable::Submodel(x) => &x.identification,
            Identifiable::ConceptDescription(x) => &x.identification,
        }
    }

    pub fn referable(&self) -> &Referable {
        match self {
            Identifiable::AssetAdministrationShell(x) => &x.referable,
            Identifiable::Asset(x) => &x.referable,
            Identifiable::Submodel(x) => &x.referable,
            Identifiable::ConceptDescription(x) => &x.referable,
        }
    }

    pub fn key_element(&self) -> KeyElements {
        match self {
            Identifiable::AssetAdministrationShell(_) => KeyElements::AssetAdministrationShell,
            Identifiable::Asset(_) => KeyElements::Asset,
            Identifiable::Submodel(_) => KeyElements::Submodel,
            Identifiable::ConceptDescription(_) => KeyElements::ConceptDescription,
        }
    }

    /// Reference addressing this object
    pub fn reference(&self) -> Reference {
        Reference::to_identifiable(self.key_element(), self.identification())
    }

    pub fn as_shell(&self) -> Option<&AssetAdministrationShell> {
        match self {
            Identifiable::AssetAdministrationShell(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_submodel(&self) -> Option<&Submodel> {
        match self {
            Identifiable::Submodel(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_submodel_mut(&mut self) -> Option<&mut Submodel> {
        match self {
            Identifiable::Submodel(x) => Some(x),
            _ => None,
        }
    }
}

impl From<AssetAdministrationShell> for Identifiable {
    fn from(value: AssetAdministrationShell) -> Self {
        Identifiable::AssetAdministrationShell(value)
    }
}

impl From<Asset> for Identifiable {
    fn from(value: Asset) -> Self {
        Identifiable::Asset(value)
    }
}

impl From<Submodel> for Identifiable {
    fn from(value: Submodel) -> Self {
        Identifiable::Submodel(value)
    }
}

impl From<ConceptDescription> for Identifiable {
    fn from(value: ConceptDescription) -> Self {
        Identifiable::ConceptDescription(value)
    }
}
