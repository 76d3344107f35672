// SPDX-License-Identifier: MIT
//! # AAS Adapter
//!
//! Codecs and packaging for Asset Administration Shell (AAS) models:
//!
//! - **Format A** (`json`) and **Format B** (`xml`) documents, each with a
//!   serializer and a deserializer that runs in strict or failsafe mode.
//! - **AASX packages** (`package`): OPC/ZIP containers with document parts,
//!   split parts, supplementary files, core properties and a thumbnail.
//! - A **supplementary file store** keyed by name and deduplicated by
//!   SHA-256 content hash (`files`).
//!
//! ## Failsafe decoding
//!
//! In failsafe mode a malformed subtree is dropped where its constructor is
//! invoked. The reason is recorded once, as a chain from the offending field
//! up to the dropped construct, in a caller-owned [`Diagnostics`] value:
//!
//! ```text
//! MissingField: $.submodels[0] has no key identification
//!  -> Failed to create Identifier from $.submodels[0]!
//!  -> Failed to create Submodel from $.submodels[0]!
//! ```
//!
//! Strict mode returns the same chain as a [`DecodeError`] instead.
//!
//! ## Usage
//!
//! ```rust
//! use std::io::Cursor;
//! use aas_adapter::{
//!     DecodeOptions, Diagnostics, DocumentFormat, Identifier, InMemoryFileStore, ObjectStore,
//!     PackageReader, PackageWriter, Submodel,
//! };
//!
//! let id = Identifier::iri("https://example.com/submodel");
//! let mut store = ObjectStore::new();
//! store.add(Submodel::new(id.clone())).unwrap();
//! let files = InMemoryFileStore::new();
//!
//! // Write a package into memory
//! let mut writer = PackageWriter::new(Cursor::new(Vec::new())).unwrap();
//! writer
//!     .write_objects("/aasx/data.json", &[id.clone()], &store, &files, DocumentFormat::Json, false, Vec::new())
//!     .unwrap();
//! let package = writer.close().unwrap().into_inner();
//!
//! // Read it back
//! let mut reader = PackageReader::new(Cursor::new(package)).unwrap();
//! let mut restored = ObjectStore::new();
//! let mut restored_files = InMemoryFileStore::new();
//! let mut diags = Diagnostics::new();
//! let ids = reader
//!     .read_into(&mut restored, &mut restored_files, &DecodeOptions::failsafe(), &mut diags)
//!     .unwrap();
//! assert_eq!(ids, vec![id]);
//! assert!(diags.is_empty());
//! ```

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod files;
pub mod friendly;
pub mod hash;
pub mod json;
pub mod model;
pub mod package;
pub mod registry;
pub mod xml;

// Re-export main types
pub use codec::{
    merge_into, parse_document, read_document, write_document, DecodeOptions, DocumentFormat,
    DuplicatePolicy, Mode,
};
pub use config::CodecConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{DecodeError, DecodeErrorKind, EncodeError};
pub use files::{FileStoreError, InMemoryFileStore, SupplementaryFileStore};
pub use friendly::FriendlyNamer;
pub use hash::ContentHash;
pub use model::{
    walk, walk_files_mut, AdministrativeInformation, AnnotatedRelationshipElement, Asset,
    AssetAdministrationShell, BasicEvent, Blob, Capability, ConceptDescription, ConceptDictionary,
    Constraint, ElementHeader, Entity, File, Formula, Iec61360Content, Identifiable, Identifier,
    Key, LangStringSet, MultiLanguageProperty, ObjectStore, Operation, OperationVariable,
    Property, Qualifier, Range, Reference, ReferenceElement, ReferenceTarget, Referable,
    RelationshipElement, StoreError, Submodel, SubmodelElement, SubmodelElementCollection, View,
    IEC61360_TEMPLATE_IRI,
};
pub use package::{CoreProperties, PackageReader, PackageWriter, ReadError, WriteError};
pub use registry::{
    AssetKind, EntityType, Iec61360DataType, Iec61360LevelType, IdentifierType, KeyElements,
    KeyType, ModelingKind, UnknownToken, WireToken,
};
