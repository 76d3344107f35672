// SPDX-License-Identifier: MIT
//! Asset Administration Shell metamodel
//!
//! Capabilities (Referable, Identifiable, HasSemantics, Qualifiable, HasKind)
//! are plain fields on each concrete type rather than a class hierarchy:
//! [`Referable`] for the local name and description, [`ElementHeader`] for
//! everything a submodel element carries.

pub mod base;
pub mod element;
pub mod identifiable;
pub mod store;

pub use base::{
    AdministrativeInformation, Constraint, ElementHeader, Formula, Identifier, Key, LangStringSet,
    Qualifier, Reference, ReferenceTarget, Referable,
};
pub use element::{
    walk, walk_files_mut, AnnotatedRelationshipElement, BasicEvent, Blob, Capability, Entity, File,
    MultiLanguageProperty, Operation, OperationVariable, Property, Range, ReferenceElement,
    RelationshipElement, SubmodelElement, SubmodelElementCollection,
};
pub use identifiable::{
    Asset, AssetAdministrationShell, ConceptDescription, ConceptDictionary, Iec61360Content,
    Identifiable, Submodel, View, IEC61360_TEMPLATE_IRI,
};
pub use store::{ObjectStore, StoreError};
