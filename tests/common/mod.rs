// SPDX-License-Identifier: MIT
//! Shared helpers for the integration tests

#![allow(dead_code)]

pub mod sample;

use std::io::Cursor;

use aas_adapter::{
    parse_document, write_document, DecodeError, DecodeOptions, Diagnostics, DocumentFormat,
    File, Identifiable, Identifier, InMemoryFileStore, ObjectStore, PackageReader, ReadError,
    Submodel, SubmodelElement,
};

/// Encode every object of `store` and decode the result again
pub fn round_trip(
    format: DocumentFormat,
    store: &ObjectStore,
    options: &DecodeOptions,
) -> (Result<Vec<Identifiable>, DecodeError>, Diagnostics) {
    let data = write_document(format, store.iter()).unwrap();
    let mut diags = Diagnostics::new();
    let result = parse_document(format, &data, options, &mut diags);
    (result, diags)
}

pub fn store_of(objects: Vec<Identifiable>) -> ObjectStore {
    let mut store = ObjectStore::new();
    for object in objects {
        store.add(object).unwrap();
    }
    store
}

pub fn submodel_with_file(id: &str, value: &str) -> Submodel {
    let mut submodel = Submodel::new(Identifier::iri(id));
    submodel.referable.id_short = "Documentation".to_string();
    submodel.submodel_elements.push(SubmodelElement::File(File {
        header: aas_adapter::ElementHeader::new("Manual"),
        mime_type: "application/pdf".to_string(),
        value: Some(value.to_string()),
    }));
    submodel
}

/// Value of the first File element of `submodel`
pub fn file_value(submodel: &Submodel) -> Option<String> {
    let mut value = None;
    aas_adapter::walk(&submodel.submodel_elements, &mut |element| {
        if let SubmodelElement::File(file) = element {
            if value.is_none() {
                value = file.value.clone();
            }
        }
    });
    value
}

/// Read a whole in-memory package in failsafe mode
pub fn read_package(
    package: Vec<u8>,
) -> Result<(ObjectStore, InMemoryFileStore, Vec<Identifier>, Diagnostics), ReadError> {
    let mut reader = PackageReader::new(Cursor::new(package))?;
    let mut store = ObjectStore::new();
    let mut files = InMemoryFileStore::new();
    let mut diags = Diagnostics::new();
    let ids = reader.read_into(&mut store, &mut files, &DecodeOptions::failsafe(), &mut diags)?;
    Ok((store, files, ids, diags))
}
