// SPDX-License-Identifier: MIT
//! Format B: XML documents
//!
//! The root element `aas:aasenv` always carries all four top-level lists,
//! even when they are empty. Collections are emitted in the iteration order
//! of the input; for unordered collections that order carries no meaning.

mod de;
pub mod node;
mod ser;

use crate::codec::DecodeOptions;
use crate::diagnostics::Diagnostics;
use crate::error::{DecodeError, EncodeError};
use crate::model::{Identifiable, Identifier, ObjectStore};

pub use de::parse_objects;
pub use node::{Namespace, XmlNode};
pub use ser::to_node;

pub const NS_AAS: Namespace = Namespace::new("http://www.admin-shell.io/aas/2/0", "aas");
pub const NS_IEC: Namespace = Namespace::new("http://www.admin-shell.io/IEC61360/2/0", "IEC");
pub const NS_ABAC: Namespace = Namespace::new(
    "http://www.admin-shell.io/aas/abac/2/0",
    "abac",
);

/// Encode objects as an indented XML document
pub fn to_vec<'a>(objects: impl IntoIterator<Item = &'a Identifiable>) -> Result<Vec<u8>, EncodeError> {
    to_node(objects).to_bytes()
}

/// Decode a document and merge it into `store`
pub fn read_into(
    data: &[u8],
    store: &mut ObjectStore,
    options: &DecodeOptions,
    diags: &mut Diagnostics,
) -> Result<Vec<Identifier>, DecodeError> {
    let objects = parse_objects(data, options, diags)?;
    crate::codec::merge_into(store, objects, options, diags)
}
