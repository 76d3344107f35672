// SPDX-License-Identifier: MIT
//! AASX packages
//!
//! An AASX file is an OPC (ZIP) package. The package relationships point
//! to an empty origin part; the origin's `aas-spec` relationships point to
//! the document parts, which in turn may point to further `aas-spec-split`
//! document parts and to `aas-suppl` supplementary files.
//!
//! ```text
//! /_rels/.rels ──aasx-origin──▶ /aasx/aasx-origin
//!                                   │ aas-spec
//!                                   ▼
//!                  /aasx/<shell>/<shell>.aas.xml ──aas-suppl──▶ /aasx/files/manual.pdf
//!                                   │ aas-spec-split
//!                                   ▼
//!        /aasx/<shell>/<submodel>/<submodel>.submodel.xml
//! ```

pub mod core_properties;
pub mod opc;
mod reader;
mod writer;

pub use core_properties::CoreProperties;
pub use opc::Relationship;
pub use reader::{PackageReader, ReadError};
pub use writer::{PackageWriter, WriteError};

pub const RELATIONSHIP_TYPE_AASX_ORIGIN: &str =
    "http://admin-shell.io/aasx/relationships/aasx-origin";
pub const RELATIONSHIP_TYPE_AAS_SPEC: &str = "http://admin-shell.io/aasx/relationships/aas-spec";
pub const RELATIONSHIP_TYPE_AAS_SPEC_SPLIT: &str =
    "http://admin-shell.io/aasx/relationships/aas-spec-split";
pub const RELATIONSHIP_TYPE_AAS_SUPPL: &str = "http://admin-shell.io/aasx/relationships/aas-suppl";
pub const RELATIONSHIP_TYPE_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const RELATIONSHIP_TYPE_THUMBNAIL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";

pub const ORIGIN_PART: &str = "/aasx/aasx-origin";
pub const CORE_PROPERTIES_PART: &str = "/docProps/core.xml";

/// Older packages spell the AASX relationship types with `www.`
pub(crate) fn relationship_matches(actual: &str, expected: &str) -> bool {
    actual == expected
        || expected
            .strip_prefix("http://")
            .is_some_and(|rest| actual.strip_prefix("http://www.") == Some(rest))
}

/// True for File values that point outside the package: absolute URIs and
/// network-path references
pub fn is_external_file_reference(value: &str) -> bool {
    value.starts_with("//") || value.split('/').next().is_some_and(|first| first.contains(':'))
}
