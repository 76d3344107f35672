// SPDX-License-Identifier: MIT
//! Shared decoding machinery for both document formats
//!
//! Constructors for composite entities call [`Decoder::mandatory`] for
//! children that must exist and [`Decoder::optional`] for optional children
//! and list members. Failures are wrapped on the way up, so the error that
//! finally reaches an optional boundary carries the full path. In failsafe
//! mode that boundary drops the subtree and records exactly one diagnostic;
//! in strict mode it propagates the error unchanged.

use std::collections::HashSet;
use std::fmt;

use crate::diagnostics::Diagnostics;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::model::{Identifiable, Identifier, ObjectStore, Reference, ReferenceTarget};
use crate::{json, xml};

/// Error handling mode of the decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The first structural error aborts decoding
    Strict,
    /// Structural errors drop the affected subtree and are recorded as diagnostics
    #[default]
    Failsafe,
}

/// What to do when a decoded Identifier already exists in the destination store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    Replace,
    #[default]
    Skip,
    Error,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(DuplicatePolicy::Replace),
            "skip" => Ok(DuplicatePolicy::Skip),
            "error" => Ok(DuplicatePolicy::Error),
            _ => Err(format!("Invalid duplicate policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub mode: Mode,
    /// Skip nested element collections, keeping only the outer shell of each entity
    pub stripped: bool,
    pub duplicate_policy: DuplicatePolicy,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            mode: Mode::Strict,
            ..Default::default()
        }
    }

    pub fn failsafe() -> Self {
        Self::default()
    }

    pub fn with_stripped(mut self, stripped: bool) -> Self {
        self.stripped = stripped;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Textual document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Format A
    Json,
    /// Format B
    Xml,
}

impl DocumentFormat {
    pub fn all() -> &'static [DocumentFormat] {
        &[DocumentFormat::Json, DocumentFormat::Xml]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Xml => "xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.name()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "application/json",
            DocumentFormat::Xml => "application/xml",
        }
    }

    /// Pick the format from a declared content type, falling back to the
    /// part's extension only when no content type is declared
    pub fn detect(content_type: &str, part_name: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim();
        let extension = part_name
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .unwrap_or("");
        match mime {
            "text/xml" | "application/xml" => Some(DocumentFormat::Xml),
            "text/json" | "application/json" => Some(DocumentFormat::Json),
            "" => Self::from_extension(extension),
            _ => None,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xml" => Some(DocumentFormat::Xml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("Invalid document format: {}", s))
    }
}

/// Decoding context threaded through every constructor
pub(crate) struct Decoder<'a> {
    pub options: DecodeOptions,
    pub diags: &'a mut Diagnostics,
}

impl<'a> Decoder<'a> {
    pub fn new(options: DecodeOptions, diags: &'a mut Diagnostics) -> Self {
        Self { options, diags }
    }

    pub fn failsafe(&self) -> bool {
        self.options.mode == Mode::Failsafe
    }

    pub fn stripped(&self) -> bool {
        self.options.stripped
    }

    /// Build a child that must exist; failures are wrapped and propagated
    pub fn mandatory<T>(
        &mut self,
        type_name: &str,
        location: &str,
        build: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        build(self).map_err(|cause| {
            DecodeError::wrap(
                cause,
                format!("Failed to create {} from {}!", type_name, location),
            )
        })
    }

    /// Build an optional child or list member; in failsafe mode a failure
    /// drops it and records the whole cause chain as one diagnostic
    pub fn optional<T>(
        &mut self,
        type_name: &str,
        location: &str,
        build: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        match self.mandatory(type_name, location, build) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.recover(err)?;
                Ok(None)
            }
        }
    }

    /// Record `err` in failsafe mode, return it in strict mode
    pub fn recover(&mut self, err: DecodeError) -> Result<(), DecodeError> {
        if self.failsafe() {
            self.diags.error(err.render_chain());
            Ok(())
        } else {
            Err(err)
        }
    }

    /// A reference whose last key does not fit its declared target is kept;
    /// the mismatch is only reported
    pub fn check_target(&mut self, reference: &Reference, target: ReferenceTarget) {
        if reference.matches_target(target) {
            return;
        }
        if let Some(last) = reference.keys.last() {
            self.diags.warning(format!(
                "Type {} of last key of reference to {} does not match reference type {}",
                last.element,
                reference,
                target.name()
            ));
        }
    }

    /// Drop objects whose Identifier already occurred earlier in the same document
    pub fn dedupe_document(
        &mut self,
        objects: Vec<Identifiable>,
    ) -> Result<Vec<Identifiable>, DecodeError> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(objects.len());
        for object in objects {
            if !seen.insert(object.identification().clone()) {
                self.recover(DecodeError::new(
                    DecodeErrorKind::DuplicateIdentifier,
                    format!(
                        "Identifiable with identifier {} occurs more than once in the document",
                        object.identification()
                    ),
                ))?;
                continue;
            }
            unique.push(object);
        }
        Ok(unique)
    }
}

/// Merge decoded objects into `store`, applying the duplicate policy.
///
/// Returns the Identifiers that were added or replaced, in input order.
/// With [`DuplicatePolicy::Error`] the whole batch is checked before the
/// store is touched, so a failed merge leaves it unchanged.
pub fn merge_into(
    store: &mut ObjectStore,
    objects: Vec<Identifiable>,
    options: &DecodeOptions,
    diags: &mut Diagnostics,
) -> Result<Vec<Identifier>, DecodeError> {
    if options.duplicate_policy == DuplicatePolicy::Error {
        if let Some(existing) = objects
            .iter()
            .map(Identifiable::identification)
            .find(|id| store.contains(id))
        {
            return Err(DecodeError::new(
                DecodeErrorKind::DuplicateIdentifier,
                format!("Identifiable with identifier {} already exists in the store", existing),
            ));
        }
    }

    let mut merged = Vec::with_capacity(objects.len());
    for object in objects {
        let identifier = object.identification().clone();
        if store.contains(&identifier) {
            match options.duplicate_policy {
                DuplicatePolicy::Replace => {
                    diags.info(format!(
                        "Replacing existing object {} in the store",
                        identifier
                    ));
                }
                DuplicatePolicy::Skip | DuplicatePolicy::Error => {
                    diags.info(format!(
                        "Skipping {}, since an object with the same identifier already exists in the store",
                        identifier
                    ));
                    continue;
                }
            }
        }
        store.insert_or_replace(object);
        merged.push(identifier);
    }
    Ok(merged)
}

/// Decode a document into a list of Identifiables without merging it anywhere
pub fn parse_document(
    format: DocumentFormat,
    data: &[u8],
    options: &DecodeOptions,
    diags: &mut Diagnostics,
) -> Result<Vec<Identifiable>, DecodeError> {
    match format {
        DocumentFormat::Json => json::parse_objects(data, options, diags),
        DocumentFormat::Xml => xml::parse_objects(data, options, diags),
    }
}

/// Decode a document and merge it into `store`
pub fn read_document(
    format: DocumentFormat,
    data: &[u8],
    store: &mut ObjectStore,
    options: &DecodeOptions,
    diags: &mut Diagnostics,
) -> Result<Vec<Identifier>, DecodeError> {
    let objects = parse_document(format, data, options, diags)?;
    merge_into(store, objects, options, diags)
}

/// Encode the given objects as one document
pub fn write_document<'a>(
    format: DocumentFormat,
    objects: impl IntoIterator<Item = &'a Identifiable>,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        DocumentFormat::Json => json::to_vec(objects),
        DocumentFormat::Xml => xml::to_vec(objects),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Submodel;

    fn submodel(id: &str, id_short: &str) -> Identifiable {
        let mut sm = Submodel::new(Identifier::iri(id));
        sm.referable.id_short = id_short.into();
        sm.into()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            DocumentFormat::detect("application/xml; charset=utf-8", "/aasx/data.json"),
            Some(DocumentFormat::Xml)
        );
        assert_eq!(
            DocumentFormat::detect("text/json", "/aasx/data.xml"),
            Some(DocumentFormat::Json)
        );
        assert_eq!(DocumentFormat::detect("", "/aasx/data.xml"), Some(DocumentFormat::Xml));
        assert_eq!(DocumentFormat::detect("", "/aasx/data.json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::detect("", "/aasx/data"), None);
        assert_eq!(DocumentFormat::detect("text/plain", "/aasx/data.json"), None);
    }

    #[test]
    fn test_optional_failsafe_records_one_diagnostic() {
        let mut diags = Diagnostics::new();
        let mut decoder = Decoder::new(DecodeOptions::failsafe(), &mut diags);
        let result: Option<()> = decoder
            .optional("Submodel", "$.submodels[0]", |d| {
                d.mandatory("Identifier", "$.submodels[0].identification", |_| {
                    Err(DecodeError::missing("$.submodels[0].identification has no key id"))
                })
            })
            .unwrap();
        assert!(result.is_none());
        assert_eq!(diags.error_count(), 1);
        let message = &diags.iter().next().unwrap().message;
        assert!(message.starts_with("MissingField: $.submodels[0].identification has no key id"));
        assert!(message.ends_with("Failed to create Submodel from $.submodels[0]!"));
    }

    #[test]
    fn test_optional_strict_propagates() {
        let mut diags = Diagnostics::new();
        let mut decoder = Decoder::new(DecodeOptions::strict(), &mut diags);
        let err = decoder
            .optional::<()>("Submodel", "x", |_| Err(DecodeError::missing("inner")))
            .unwrap_err();
        assert_eq!(err.chain().count(), 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_dedupe_document() {
        let mut diags = Diagnostics::new();
        let mut decoder = Decoder::new(DecodeOptions::failsafe(), &mut diags);
        let objects = vec![
            submodel("http://example.com/sm", "first"),
            submodel("http://example.com/sm", "second"),
        ];
        let unique = decoder.dedupe_document(objects).unwrap();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].referable().id_short, "first");
        assert_eq!(diags.error_count(), 1);

        let mut diags = Diagnostics::new();
        let mut decoder = Decoder::new(DecodeOptions::strict(), &mut diags);
        let err = decoder
            .dedupe_document(vec![
                submodel("http://example.com/sm", "first"),
                submodel("http://example.com/sm", "second"),
            ])
            .unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::DuplicateIdentifier);
    }

    #[test]
    fn test_merge_policies() {
        let mut store = ObjectStore::new();
        store.add(submodel("http://example.com/sm", "old")).unwrap();
        let mut diags = Diagnostics::new();

        let options = DecodeOptions::default();
        let merged = merge_into(
            &mut store,
            vec![submodel("http://example.com/sm", "new")],
            &options,
            &mut diags,
        )
        .unwrap();
        assert!(merged.is_empty());
        let id = Identifier::iri("http://example.com/sm");
        assert_eq!(store.get(&id).unwrap().referable().id_short, "old");

        let options = DecodeOptions::default().with_duplicate_policy(DuplicatePolicy::Replace);
        let merged = merge_into(
            &mut store,
            vec![submodel("http://example.com/sm", "new")],
            &options,
            &mut diags,
        )
        .unwrap();
        assert_eq!(merged, vec![id.clone()]);
        assert_eq!(store.get(&id).unwrap().referable().id_short, "new");

        let options = DecodeOptions::default().with_duplicate_policy(DuplicatePolicy::Error);
        let err = merge_into(
            &mut store,
            vec![
                submodel("http://example.com/other", "x"),
                submodel("http://example.com/sm", "newer"),
            ],
            &options,
            &mut diags,
        )
        .unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::DuplicateIdentifier);
        assert!(!store.contains(&Identifier::iri("http://example.com/other")));
    }

    #[test]
    fn test_duplicate_policy_from_str() {
        assert_eq!("Replace".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Replace));
        assert!("overwrite".parse::<DuplicatePolicy>().is_err());
    }
}
