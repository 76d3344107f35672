// SPDX-License-Identifier: MIT
//! Format A: JSON documents
//!
//! Collections are emitted in the iteration order of the input; for
//! unordered collections that order carries no meaning and consumers must
//! not rely on it.

mod de;
mod ser;

use std::io::Write;

use crate::codec::DecodeOptions;
use crate::diagnostics::Diagnostics;
use crate::error::{DecodeError, EncodeError};
use crate::model::{Identifiable, Identifier, ObjectStore};

pub use de::parse_objects;
pub use ser::to_value;

/// Encode objects as a pretty-printed JSON document
pub fn to_vec<'a>(objects: impl IntoIterator<Item = &'a Identifiable>) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec_pretty(&to_value(objects))?)
}

/// Encode objects into `writer`
pub fn write<'a, W: Write>(
    writer: W,
    objects: impl IntoIterator<Item = &'a Identifiable>,
) -> Result<(), EncodeError> {
    serde_json::to_writer_pretty(writer, &to_value(objects))?;
    Ok(())
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
