// SPDX-License-Identifier: MIT
//! AASX package reader

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use super::core_properties::CoreProperties;
use super::opc::{self, ContentTypes, Relationship};
use super::{
    is_external_file_reference, relationship_matches, RELATIONSHIP_TYPE_AASX_ORIGIN,
    RELATIONSHIP_TYPE_AAS_SPEC, RELATIONSHIP_TYPE_AAS_SPEC_SPLIT,
    RELATIONSHIP_TYPE_CORE_PROPERTIES, RELATIONSHIP_TYPE_THUMBNAIL,
};
use crate::codec::{self, DecodeOptions, DocumentFormat, Mode};
use crate::diagnostics::Diagnostics;
use crate::error::DecodeError;
use crate::files::{FileStoreError, SupplementaryFileStore};
use crate::model::{walk, walk_files_mut, Identifier, ObjectStore, StoreError, SubmodelElement};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors that can occur during reading
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Part not found in package: {0}")]
    UnresolvedPart(String),

    #[error("Could not determine format of part {part} (content type {content_type:?})")]
    UnsupportedFormat {
        part: String,
        content_type: Option<String>,
    },

    #[error("Failed to decode part: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    FileStore(#[from] FileStoreError),

    #[error("Usage error: {0}")]
    Usage(&'static str),
}

fn zip_error(part: &str, err: ZipError) -> ReadError {
    match err {
        ZipError::FileNotFound => ReadError::UnresolvedPart(part.to_string()),
        ZipError::Io(e) => ReadError::Io(e),
        other => ReadError::InvalidPackage(format!("{}: {}", part, other)),
    }
}

/// Reader for AASX packages
///
/// The archive is released when the reader is closed or dropped; every
/// accessor fails with [`ReadError::Usage`] after [`close`](Self::close).
pub struct PackageReader<R: Read + Seek> {
    archive: Option<ZipArchive<R>>,
    content_types: ContentTypes,
}

impl PackageReader<BufReader<fs::File>> {
    /// Open the package at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening AASX package for reading");
        Self::new(BufReader::new(fs::File::open(path)?))
    }
}

impl<R: Read + Seek> PackageReader<R> {
    pub fn new(reader: R) -> Result<Self, ReadError> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| ReadError::InvalidPackage(format!("not a ZIP archive: {}", e)))?;
        let content_types = {
            let mut entry = archive.by_name(opc::CONTENT_TYPES_ENTRY).map_err(|_| {
                ReadError::InvalidPackage(format!("{} is missing", opc::CONTENT_TYPES_ENTRY))
            })?;
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            ContentTypes::parse(&data).map_err(|e| {
                ReadError::InvalidPackage(format!("{}: {}", opc::CONTENT_TYPES_ENTRY, e))
            })?
        };
        Ok(Self {
            archive: Some(archive),
            content_types,
        })
    }

    fn archive(&mut self) -> Result<&mut ZipArchive<R>, ReadError> {
        self.archive
            .as_mut()
            .ok_or(ReadError::Usage("package reader has been closed"))
    }

    /// Declared content type of a part
    pub fn content_type(&self, part_name: &str) -> Option<&str> {
        self.content_types.get(part_name)
    }

    /// Names of all parts in the archive
    pub fn part_names(&mut self) -> Result<Vec<String>, ReadError> {
        Ok(self
            .archive()?
            .file_names()
            .filter(|name| !name.ends_with('/') && *name != opc::CONTENT_TYPES_ENTRY)
            .map(opc::normalize_part_name)
            .collect())
    }

    pub fn read_part(&mut self, part_name: &str) -> Result<Vec<u8>, ReadError> {
        let mut entry = self
            .archive()?
            .by_name(opc::zip_entry_name(part_name))
            .map_err(|e| zip_error(part_name, e))?;
        // the declared size is untrusted, so the buffer grows as data arrives
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Relationships of `source` (the package itself when `None`); a missing
    /// relationship part means no relationships
    pub fn relationships(&mut self, source: Option<&str>) -> Result<Vec<Relationship>, ReadError> {
        let rels_part = opc::relationships_part(source);
        let data = match self.read_part(&rels_part) {
            Ok(data) => data,
            Err(ReadError::UnresolvedPart(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        opc::parse_relationships(&data)
            .map_err(|e| ReadError::InvalidPackage(format!("{}: {}", rels_part, e)))
    }

    /// Resolved part names of the internal relationships of `source` with type `rel_type`
    fn related_parts(
        &mut self,
        source: Option<&str>,
        rel_type: &str,
    ) -> Result<Vec<String>, ReadError> {
        Ok(self
            .relationships(source)?
            .into_iter()
            .filter(|rel| !rel.external && relationship_matches(&rel.rel_type, rel_type))
            .map(|rel| opc::resolve_target(source, &rel.target))
            .collect())
    }

    pub fn core_properties(&mut self) -> Result<Option<CoreProperties>, ReadError> {
        let Some(part) = self
            .related_parts(None, RELATIONSHIP_TYPE_CORE_PROPERTIES)?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let data = self.read_part(&part)?;
        CoreProperties::parse(&data)
            .map(Some)
            .map_err(|e| ReadError::InvalidPackage(format!("{}: {}", part, e)))
    }

    /// Bytes of the package thumbnail, if there is one
    pub fn thumbnail(&mut self) -> Result<Option<Vec<u8>>, ReadError> {
        match self
            .related_parts(None, RELATIONSHIP_TYPE_THUMBNAIL)?
            .into_iter()
            .next()
        {
            Some(part) => self.read_part(&part).map(Some),
            None => Ok(None),
        }
    }

    /// Read every document part into `store` and every supplementary file
    /// referenced from a newly added Submodel into `files`.
    ///
    /// File elements of those Submodels are rewritten to the names `files`
    /// returned. Returns the Identifiers added to (or replaced in) `store`.
    pub fn read_into(
        &mut self,
        store: &mut ObjectStore,
        files: &mut dyn SupplementaryFileStore,
        options: &DecodeOptions,
        diags: &mut Diagnostics,
    ) -> Result<Vec<Identifier>, ReadError> {
        let origin = self
            .related_parts(None, RELATIONSHIP_TYPE_AASX_ORIGIN)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ReadError::InvalidPackage("aasx-origin relationship is missing".to_string())
            })?;

        let mut seen = HashSet::new();
        let mut added = Vec::new();
        let spec_parts = self.related_parts(Some(&origin), RELATIONSHIP_TYPE_AAS_SPEC)?;
        if spec_parts.is_empty() {
            warn!(origin = %origin, "no AAS document parts found in package");
        }
        // depth first through aas-spec-split relationships; each part is read once
        let mut visited = HashSet::new();
        let mut pending: Vec<String> = spec_parts.into_iter().rev().collect();
        while let Some(part) = pending.pop() {
            if !visited.insert(part.clone()) {
                continue;
            }
            self.read_part_into(&part, store, files, options, diags, &mut seen, &mut added)?;
            let splits = self.related_parts(Some(&part), RELATIONSHIP_TYPE_AAS_SPEC_SPLIT)?;
            pending.extend(splits.into_iter().rev());
        }
        info!(objects = added.len(), "read AASX package");
        Ok(added)
    }

    #[allow(clippy::too_many_arguments)]
    fn read_part_into(
        &mut self,
        part: &str,
        store: &mut ObjectStore,
        files: &mut dyn SupplementaryFileStore,
        options: &DecodeOptions,
        diags: &mut Diagnostics,
        seen: &mut HashSet<Identifier>,
        added: &mut Vec<Identifier>,
    ) -> Result<(), ReadError> {
        let content_type = self.content_type(part).map(str::to_string);
        let Some(format) = DocumentFormat::detect(content_type.as_deref().unwrap_or(""), part)
        else {
            let err = ReadError::UnsupportedFormat {
                part: part.to_string(),
                content_type,
            };
            if options.mode == Mode::Strict {
                return Err(err);
            }
            diags.error(err.to_string());
            return Ok(());
        };

        debug!(part, format = format.name(), "parsing AAS document part");
        let data = self.read_part(part)?;
        let mut objects = codec::parse_document(format, &data, options, diags)?;
        // an object repeated across parts of one package is read once
        objects.retain(|object| !seen.contains(object.identification()));
        seen.extend(objects.iter().map(|object| object.identification().clone()));

        for identifier in codec::merge_into(store, objects, options, diags)? {
            if let Some(submodel) = store.get_mut(&identifier).and_then(|o| o.as_submodel_mut()) {
                self.collect_supplementary_files(part, &mut submodel.submodel_elements, files)?;
            }
            added.push(identifier);
        }
        Ok(())
    }

    fn collect_supplementary_files(
        &mut self,
        part: &str,
        elements: &mut [SubmodelElement],
        files: &mut dyn SupplementaryFileStore,
    ) -> Result<(), ReadError> {
        let mut values = Vec::new();
        walk(elements, &mut |element| {
            if let SubmodelElement::File(file) = element {
                if let Some(value) = &file.value {
                    values.push(value.clone());
                }
            }
        });

        let mut stored_names = BTreeMap::new();
        for value in values {
            if stored_names.contains_key(&value) {
                continue;
            }
            if is_external_file_reference(&value) {
                info!(value = %value, "skipping supplementary file that is an absolute or network-path URI");
                continue;
            }
            let absolute = opc::resolve_target(Some(part), &value);
            let content_type = self
                .content_type(&absolute)
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string();
            debug!(part = %absolute, "reading supplementary file");
            let stored = {
                let mut entry = self
                    .archive()?
                    .by_name(opc::zip_entry_name(&absolute))
                    .map_err(|e| zip_error(&absolute, e))?;
                files.add_file(&absolute, &mut entry, &content_type)?
            };
            stored_names.insert(value, stored);
        }

        walk_files_mut(elements, &mut |file| {
            if let Some(stored) = file.value.as_ref().and_then(|v| stored_names.get(v)) {
                file.value = Some(stored.clone());
            }
        });
        Ok(())
    }

    /// Release the archive; later calls fail with [`ReadError::Usage`]
    pub fn close(&mut self) {
        if self.archive.take().is_some() {
            debug!("closed AASX package reader");
        }
    }
}
