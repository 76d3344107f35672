// SPDX-License-Identifier: MIT
//! AASX package writer

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tracing::{debug, error, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::core_properties::{CoreProperties, CORE_PROPERTIES_CONTENT_TYPE};
use super::opc::{self, ContentTypes, Relationship};
use super::{
    is_external_file_reference, CORE_PROPERTIES_PART, ORIGIN_PART, RELATIONSHIP_TYPE_AASX_ORIGIN,
    RELATIONSHIP_TYPE_AAS_SPEC, RELATIONSHIP_TYPE_AAS_SPEC_SPLIT, RELATIONSHIP_TYPE_AAS_SUPPL,
    RELATIONSHIP_TYPE_CORE_PROPERTIES, RELATIONSHIP_TYPE_THUMBNAIL,
};
use crate::codec::{self, DocumentFormat};
use crate::error::EncodeError;
use crate::files::{FileStoreError, SupplementaryFileStore};
use crate::friendly::FriendlyNamer;
use crate::hash::ContentHash;
use crate::model::{walk, Identifiable, Identifier, ObjectStore, SubmodelElement};

/// Errors that can occur during writing
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Supplementary file {0} has already been written with different contents")]
    NameCollision(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("No object with identifier {0} in the store")]
    UnknownIdentifier(Identifier),

    #[error("{0} does not identify an AssetAdministrationShell")]
    NotAShell(Identifier),

    #[error(transparent)]
    FileStore(#[from] FileStoreError),
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Writer for AASX packages
///
/// Parts are written as the methods are called; the origin and package
/// relationships and the content types table only at [`close`](Self::close).
/// A writer that is dropped without being closed is closed on drop and any
/// error is logged, so the archive is never left without its central
/// directory.
pub struct PackageWriter<W: Write + Seek> {
    zip: Option<ZipWriter<W>>,
    content_types: ContentTypes,
    written_parts: HashSet<String>,
    /// Document parts referenced from the origin
    spec_parts: Vec<String>,
    supplementary: BTreeMap<String, ContentHash>,
    core_properties_part: Option<String>,
    thumbnail_part: Option<String>,
    shell_names: FriendlyNamer,
}

impl PackageWriter<BufWriter<fs::File>> {
    /// Create (or truncate) the package at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, WriteError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "creating AASX package");
        Self::new(BufWriter::new(fs::File::create(path)?))
    }
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(inner: W) -> Result<Self, WriteError> {
        let mut writer = Self {
            zip: Some(ZipWriter::new(inner)),
            content_types: ContentTypes::new(),
            written_parts: HashSet::new(),
            spec_parts: Vec::new(),
            supplementary: BTreeMap::new(),
            core_properties_part: None,
            thumbnail_part: None,
            shell_names: FriendlyNamer::new(),
        };
        debug!("creating AASX origin part");
        writer.write_part(ORIGIN_PART, "text/plain", &[])?;
        Ok(writer)
    }

    fn zip(&mut self) -> Result<&mut ZipWriter<W>, WriteError> {
        self.zip
            .as_mut()
            .ok_or_else(|| WriteError::Usage("package writer has been closed".to_string()))
    }

    fn write_part(&mut self, part_name: &str, content_type: &str, data: &[u8]) -> Result<(), WriteError> {
        let part_name = opc::normalize_part_name(part_name);
        if self.written_parts.contains(&part_name) {
            return Err(WriteError::Usage(format!(
                "part {} has already been written",
                part_name
            )));
        }
        let zip = self.zip()?;
        zip.start_file(opc::zip_entry_name(&part_name), file_options())?;
        zip.write_all(data)?;
        if !part_name.ends_with(".rels") {
            self.content_types.register(&part_name, content_type);
        }
        self.written_parts.insert(part_name);
        Ok(())
    }

    fn write_relationships(
        &mut self,
        source: Option<&str>,
        relationships: &[Relationship],
    ) -> Result<(), WriteError> {
        if relationships.is_empty() {
            return Ok(());
        }
        let data = opc::relationships_to_xml(relationships)?;
        self.write_part(
            &opc::relationships_part(source),
            opc::RELATIONSHIPS_CONTENT_TYPE,
            &data,
        )
    }

    /// Write the objects named by `identifiers` into one document part.
    ///
    /// Supplementary files referenced from File elements of the written
    /// Submodels are copied from `files` and linked with `aas-suppl`
    /// relationships. Unless `split_part` is set the part is linked from the
    /// origin at close; a split part must be linked by the caller through
    /// `extra_relationships` of another part.
    #[allow(clippy::too_many_arguments)]
    pub fn write_objects(
        &mut self,
        part_name: &str,
        identifiers: &[Identifier],
        store: &ObjectStore,
        files: &dyn SupplementaryFileStore,
        format: DocumentFormat,
        split_part: bool,
        extra_relationships: Vec<Relationship>,
    ) -> Result<(), WriteError> {
        debug!(part = part_name, "writing AAS document part");
        let mut objects: Vec<&Identifiable> = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            match store.get(identifier) {
                Some(object) => objects.push(object),
                None => error!(identifier = %identifier, "could not find object in store"),
            }
        }

        let mut file_names: Vec<String> = Vec::new();
        for submodel in objects.iter().filter_map(|o| o.as_submodel()) {
            walk(&submodel.submodel_elements, &mut |element| {
                if let SubmodelElement::File(file) = element {
                    if let Some(value) = &file.value {
                        if !is_external_file_reference(value) && !file_names.contains(value) {
                            file_names.push(value.clone());
                        }
                    }
                }
            });
        }

        let part_name = opc::normalize_part_name(part_name);
        if self.written_parts.contains(&part_name) {
            return Err(WriteError::Usage(format!(
                "part {} has already been written",
                part_name
            )));
        }
        let data = codec::write_document(format, objects.iter().copied())?;

        // every target is checked before the first byte of this part is written
        let mut targets: Vec<(String, ContentHash)> = Vec::new();
        let mut pending = Vec::new();
        for name in file_names {
            if !files.contains(&name) {
                warn!(file = %name, "could not find supplementary file in file store");
                continue;
            }
            let target = opc::resolve_target(Some(&part_name), &name);
            let hash = files.hash(&name)?.clone();
            if let Some((_, planned)) = targets.iter().find(|(t, _)| *t == target) {
                if *planned != hash {
                    return Err(WriteError::NameCollision(target));
                }
                continue;
            }
            match self.supplementary.get(&target) {
                Some(existing) if *existing == hash => {}
                Some(_) => return Err(WriteError::NameCollision(target)),
                None if target == part_name || self.written_parts.contains(&target) => {
                    return Err(WriteError::NameCollision(target))
                }
                None => pending.push((name, target.clone(), hash.clone())),
            }
            targets.push((target, hash));
        }

        for (name, target, hash) in pending {
            debug!(part = %target, "writing supplementary file");
            let mut contents = Vec::new();
            files.write_contents(&name, &mut contents)?;
            let content_type = files.content_type(&name)?.to_string();
            self.write_part(&target, &content_type, &contents)?;
            self.supplementary.insert(target, hash);
        }
        self.write_part(&part_name, format.content_type(), &data)?;
        if !split_part {
            self.spec_parts.push(part_name.clone());
        }

        let mut relationships: Vec<Relationship> = targets
            .into_iter()
            .map(|(target, _)| Relationship::new(RELATIONSHIP_TYPE_AAS_SUPPL, target))
            .collect();
        relationships.extend(extra_relationships);
        self.write_relationships(Some(&part_name), &relationships)
    }

    /// Write a shell with its Asset, its Submodels and the ConceptDescriptions
    /// of its concept dictionaries, following the DotAAS part name convention.
    ///
    /// With `split_submodels` each Submodel gets a part of its own, linked
    /// from the shell part with `aas-spec-split`.
    pub fn write_shell(
        &mut self,
        identifier: &Identifier,
        store: &ObjectStore,
        files: &dyn SupplementaryFileStore,
        format: DocumentFormat,
        split_submodels: bool,
    ) -> Result<(), WriteError> {
        let shell = store
            .get(identifier)
            .ok_or_else(|| WriteError::UnknownIdentifier(identifier.clone()))?
            .as_shell()
            .ok_or_else(|| WriteError::NotAShell(identifier.clone()))?;

        let shell_name = self.shell_names.name(&identifier.id);
        let extension = format.extension();
        let mut identifiers = vec![identifier.clone()];
        let push_resolved = |identifiers: &mut Vec<Identifier>, id: Identifier| {
            if store.contains(&id) && !identifiers.contains(&id) {
                identifiers.push(id);
            }
        };

        if let Some(asset) = shell.asset.identifier() {
            push_resolved(&mut identifiers, asset);
        }
        for dictionary in &shell.concept_dictionaries {
            for reference in &dictionary.concept_descriptions {
                if let Some(id) = reference.identifier() {
                    push_resolved(&mut identifiers, id);
                }
            }
        }

        let mut submodel_names = FriendlyNamer::new();
        let mut split_relationships = Vec::new();
        for reference in &shell.submodels {
            let Some(submodel_id) = reference.identifier().filter(|id| store.contains(id)) else {
                warn!(reference = %reference, "could not find submodel, skipping it");
                continue;
            };
            if !split_submodels {
                push_resolved(&mut identifiers, submodel_id);
                continue;
            }
            let name = submodel_names.name(&submodel_id.id);
            let part = format!(
                "/aasx/{}/{}/{}.submodel.{}",
                shell_name, name, name, extension
            );
            self.write_objects(&part, &[submodel_id], store, files, format, true, Vec::new())?;
            split_relationships.push(Relationship::new(RELATIONSHIP_TYPE_AAS_SPEC_SPLIT, part));
        }

        let part = format!("/aasx/{}/{}.aas.{}", shell_name, shell_name, extension);
        self.write_objects(&part, &identifiers, store, files, format, false, split_relationships)
    }

    /// May be called once per package
    pub fn write_core_properties(&mut self, properties: &CoreProperties) -> Result<(), WriteError> {
        if self.core_properties_part.is_some() {
            return Err(WriteError::Usage(
                "core properties have already been written".to_string(),
            ));
        }
        debug!("writing core properties");
        let data = properties.to_xml()?;
        self.write_part(CORE_PROPERTIES_PART, CORE_PROPERTIES_CONTENT_TYPE, &data)?;
        self.core_properties_part = Some(CORE_PROPERTIES_PART.to_string());
        Ok(())
    }

    /// May be called once per package
    pub fn write_thumbnail(
        &mut self,
        part_name: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), WriteError> {
        if let Some(existing) = &self.thumbnail_part {
            return Err(WriteError::Usage(format!(
                "package thumbnail has already been written to {}",
                existing
            )));
        }
        self.write_part(part_name, content_type, data)?;
        self.thumbnail_part = Some(opc::normalize_part_name(part_name));
        Ok(())
    }

    /// Write the origin and package relationships and the content types,
    /// then finish the archive and hand back the underlying writer
    pub fn close(&mut self) -> Result<W, WriteError> {
        self.zip()?;
        debug!(parts = self.spec_parts.len(), "writing aas-spec relationships");
        let spec: Vec<Relationship> = self
            .spec_parts
            .iter()
            .map(|part| Relationship::new(RELATIONSHIP_TYPE_AAS_SPEC, part.as_str()))
            .collect();
        self.write_relationships(Some(ORIGIN_PART), &spec)?;

        let mut package = vec![Relationship::new(RELATIONSHIP_TYPE_AASX_ORIGIN, ORIGIN_PART)];
        if let Some(part) = &self.core_properties_part {
            package.push(Relationship::new(RELATIONSHIP_TYPE_CORE_PROPERTIES, part.as_str()));
        }
        if let Some(part) = &self.thumbnail_part {
            package.push(Relationship::new(RELATIONSHIP_TYPE_THUMBNAIL, part.as_str()));
        }
        self.write_relationships(None, &package)?;

        let content_types = self.content_types.to_xml()?;
        let mut zip = self
            .zip
            .take()
            .ok_or_else(|| WriteError::Usage("package writer has been closed".to_string()))?;
        zip.start_file(opc::CONTENT_TYPES_ENTRY, file_options())?;
        zip.write_all(&content_types)?;
        let mut inner = zip.finish()?;
        inner.flush()?;
        debug!("closed AASX package writer");
        Ok(inner)
    }
}

impl<W: Write + Seek> Drop for PackageWriter<W> {
    fn drop(&mut self) {
        if self.zip.is_some() {
            if let Err(e) = self.close() {
                error!(error = %e, "failed to close AASX package on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::files::InMemoryFileStore;
    use crate::model::{AssetAdministrationShell, Reference};
    use crate::registry::KeyElements;

    fn shell_store() -> (ObjectStore, Identifier) {
        let id = Identifier::iri("http://example.com/shell");
        let shell = AssetAdministrationShell::new(
            id.clone(),
            Reference::to_identifiable(KeyElements::Asset, &Identifier::iri("http://example.com/asset")),
        );
        let mut store = ObjectStore::new();
        store.add(shell).unwrap();
        (store, id)
    }

    #[test]
    fn test_second_core_properties_is_usage_error() {
        let mut writer = PackageWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.write_core_properties(&CoreProperties::default()).unwrap();
        let err = writer.write_core_properties(&CoreProperties::default()).unwrap_err();
        assert!(matches!(err, WriteError::Usage(_)));
    }

    #[test]
    fn test_write_after_close_is_usage_error() {
        let (store, id) = shell_store();
        let files = InMemoryFileStore::new();
        let mut writer = PackageWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.close().unwrap();
        let err = writer
            .write_shell(&id, &store, &files, DocumentFormat::Xml, true)
            .unwrap_err();
        assert!(matches!(err, WriteError::Usage(_)));
        assert!(matches!(writer.close(), Err(WriteError::Usage(_))));
    }

    #[test]
    fn test_write_shell_rejects_unknown_and_wrong_kind() {
        let (mut store, _) = shell_store();
        let files = InMemoryFileStore::new();
        let mut writer = PackageWriter::new(Cursor::new(Vec::new())).unwrap();
        let missing = Identifier::iri("http://example.com/missing");
        assert!(matches!(
            writer.write_shell(&missing, &store, &files, DocumentFormat::Json, false),
            Err(WriteError::UnknownIdentifier(_))
        ));

        let submodel_id = Identifier::iri("http://example.com/sm");
        store.add(crate::model::Submodel::new(submodel_id.clone())).unwrap();
        assert!(matches!(
            writer.write_shell(&submodel_id, &store, &files, DocumentFormat::Json, false),
            Err(WriteError::NotAShell(_))
        ));
    }

    #[test]
    fn test_duplicate_part_is_usage_error() {
        let (store, id) = shell_store();
        let files = InMemoryFileStore::new();
        let mut writer = PackageWriter::new(Cursor::new(Vec::new())).unwrap();
        let ids = [id];
        writer
            .write_objects("/aasx/data.json", &ids, &store, &files, DocumentFormat::Json, false, Vec::new())
            .unwrap();
        let err = writer
            .write_objects("/aasx/data.json", &ids, &store, &files, DocumentFormat::Json, false, Vec::new())
            .unwrap_err();
        assert!(matches!(err, WriteError::Usage(_)));
    }
}
