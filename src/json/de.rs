// SPDX-License-Identifier: MIT
//! Format A decoder
//!
//! Walks a parsed `serde_json::Value`. Locations are JSON paths such as
//! `$.submodels[0].submodelElements[3]`.

use base64::Engine;
use serde_json::{Map, Value};

use crate::codec::{DecodeOptions, Decoder};
use crate::diagnostics::Diagnostics;
use crate::error::DecodeError;
use crate::model::{
    AdministrativeInformation, AnnotatedRelationshipElement, Asset, AssetAdministrationShell,
    BasicEvent, Blob, Capability, ConceptDescription, ConceptDictionary, Constraint,
    ElementHeader, Entity, File, Formula, Iec61360Content, Identifiable, Identifier, Key,
    LangStringSet, MultiLanguageProperty, Operation, OperationVariable, Property, Qualifier,
    Range, Reference, ReferenceElement, ReferenceTarget, Referable, RelationshipElement, Submodel,
    SubmodelElement, SubmodelElementCollection, View, IEC61360_TEMPLATE_IRI,
};
use crate::registry::{
    AssetKind, EntityType, Iec61360DataType, Iec61360LevelType, IdentifierType, KeyElements,
    KeyType, ModelingKind, WireToken,
};

type Object = Map<String, Value>;

const TOP_LEVEL_LISTS: [&str; 4] = [
    "assetAdministrationShells",
    "assets",
    "submodels",
    "conceptDescriptions",
];

/// Decode a format A document into a list of Identifiables
pub fn parse_objects(
    data: &[u8],
    options: &DecodeOptions,
    diags: &mut Diagnostics,
) -> Result<Vec<Identifiable>, DecodeError> {
    let root: Value = serde_json::from_slice(data)
        .map_err(|e| DecodeError::syntax(format!("Invalid JSON document: {}", e)))?;
    let root = match root {
        Value::Object(root) => root,
        _ => return Err(DecodeError::syntax("Top level of the JSON document is not an object")),
    };
    if let Some(unknown) = root.keys().find(|k| !TOP_LEVEL_LISTS.contains(&k.as_str())) {
        return Err(DecodeError::syntax(format!(
            "Unexpected top-level list {}",
            unknown
        )));
    }

    let mut d = Decoder::new(*options, diags);
    let mut objects = Vec::new();
    for list_name in TOP_LEVEL_LISTS {
        let entries = match root.get(list_name) {
            None => continue,
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(DecodeError::syntax(format!(
                    "Top-level list {} is not an array",
                    list_name
                )))
            }
        };
        for (i, entry) in entries.iter().enumerate() {
            let path = format!("$.{}[{}]", list_name, i);
            let type_name = expected_model_type(list_name);
            let parsed = d.optional(type_name, &path, |d| {
                let obj = object(entry, &path)?;
                check_model_type(obj, type_name, &path)?;
                top_level(d, list_name, obj, &path)
            })?;
            objects.extend(parsed);
        }
    }
    d.dedupe_document(objects)
}

fn expected_model_type(list_name: &str) -> &'static str {
    match list_name {
        "assetAdministrationShells" => "AssetAdministrationShell",
        "assets" => "Asset",
        "submodels" => "Submodel",
        _ => "ConceptDescription",
    }
}

fn top_level(
    d: &mut Decoder,
    list_name: &str,
    obj: &Object,
    path: &str,
) -> Result<Identifiable, DecodeError> {
    Ok(match list_name {
        "assetAdministrationShells" => shell(d, obj, path)?.into(),
        "assets" => asset(d, obj, path)?.into(),
        "submodels" => submodel(d, obj, path)?.into(),
        _ => concept_description(d, obj, path)?.into(),
    })
}

// Field access

fn object<'v>(value: &'v Value, path: &str) -> Result<&'v Object, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::invalid_value(format!("{} is not a JSON object", path)))
}

fn field<'v>(obj: &'v Object, key: &str, path: &str) -> Result<&'v Value, DecodeError> {
    obj.get(key)
        .ok_or_else(|| DecodeError::missing(format!("{} has no key {}", path, key)))
}

fn get_str<'v>(obj: &'v Object, key: &str, path: &str) -> Result<&'v str, DecodeError> {
    field(obj, key, path)?.as_str().ok_or_else(|| {
        DecodeError::invalid_value(format!("{}.{} is not a string", path, key))
    })
}

fn opt_str(obj: &Object, key: &str, path: &str) -> Result<Option<String>, DecodeError> {
    match obj.get(key) {
        None => Ok(None),
        Some(_) => get_str(obj, key, path).map(|s| Some(s.to_string())),
    }
}

fn get_bool(obj: &Object, key: &str, path: &str) -> Result<bool, DecodeError> {
    field(obj, key, path)?.as_bool().ok_or_else(|| {
        DecodeError::invalid_value(format!("{}.{} is not a boolean", path, key))
    })
}

fn get_array<'v>(obj: &'v Object, key: &str, path: &str) -> Result<&'v [Value], DecodeError> {
    match field(obj, key, path)? {
        Value::Array(items) => Ok(items),
        _ => Err(DecodeError::invalid_value(format!(
            "{}.{} is not an array",
            path, key
        ))),
    }
}

/// A missing list is empty
fn opt_array<'v>(obj: &'v Object, key: &str, path: &str) -> Result<&'v [Value], DecodeError> {
    match obj.get(key) {
        None => Ok(&[]),
        Some(_) => get_array(obj, key, path),
    }
}

fn get_token<T: WireToken>(obj: &Object, key: &str, path: &str) -> Result<T, DecodeError> {
    let token = get_str(obj, key, path)?;
    T::parse_token(token).map_err(|e| DecodeError::invalid_token(e, &format!("{}.{}", path, key)))
}

fn model_type<'v>(obj: &'v Object, path: &str) -> Result<&'v str, DecodeError> {
    let model_type = object(field(obj, "modelType", path)?, &format!("{}.modelType", path))?;
    get_str(model_type, "name", &format!("{}.modelType", path))
}

fn check_model_type(obj: &Object, expected: &str, path: &str) -> Result<(), DecodeError> {
    let found = model_type(obj, path)?;
    if found != expected {
        return Err(DecodeError::wrong_kind(format!(
            "{} has modelType {}, expected {}",
            path, found, expected
        )));
    }
    Ok(())
}

// Shared constructs

fn identifier(obj: &Object, path: &str) -> Result<Identifier, DecodeError> {
    let id = get_str(obj, "id", path)?;
    let id_type: IdentifierType = get_token(obj, "idType", path)?;
    Ok(Identifier::new(id, id_type))
}

fn identification(d: &mut Decoder, obj: &Object, path: &str) -> Result<Identifier, DecodeError> {
    let location = format!("{}.identification", path);
    d.mandatory("Identifier", &location, |_| {
        identifier(object(field(obj, "identification", path)?, &location)?, &location)
    })
}

fn key(value: &Value, path: &str) -> Result<Key, DecodeError> {
    let obj = object(value, path)?;
    let element: KeyElements = get_token(obj, "type", path)?;
    let id_type: KeyType = get_token(obj, "idType", path)?;
    let value = get_str(obj, "value", path)?;
    let local = get_bool(obj, "local", path)?;
    Ok(Key::new(element, local, value, id_type))
}

fn reference(d: &mut Decoder, value: &Value, path: &str) -> Result<Reference, DecodeError> {
    let obj = object(value, path)?;
    let keys = get_array(obj, "keys", path)?;
    if keys.is_empty() {
        return Err(DecodeError::missing(format!("{} has no keys", path)));
    }
    let mut result = Vec::with_capacity(keys.len());
    for (i, value) in keys.iter().enumerate() {
        let location = format!("{}.keys[{}]", path, i);
        result.push(d.mandatory("Key", &location, |_| key(value, &location))?);
    }
    Ok(Reference::new(result))
}

fn model_reference(
    d: &mut Decoder,
    value: &Value,
    path: &str,
    target: ReferenceTarget,
) -> Result<Reference, DecodeError> {
    let reference = reference(d, value, path)?;
    d.check_target(&reference, target);
    Ok(reference)
}

/// Mandatory reference field
fn reference_field(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
    target: Option<ReferenceTarget>,
) -> Result<Reference, DecodeError> {
    let location = format!("{}.{}", path, key);
    let value = field(obj, key, path)?;
    d.mandatory("Reference", &location, |d| match target {
        Some(target) => model_reference(d, value, &location, target),
        None => reference(d, value, &location),
    })
}

/// Optional reference field; a malformed one is dropped in failsafe mode
fn opt_reference(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
    target: Option<ReferenceTarget>,
) -> Result<Option<Reference>, DecodeError> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    let location = format!("{}.{}", path, key);
    d.optional("Reference", &location, |d| match target {
        Some(target) => model_reference(d, value, &location, target),
        None => reference(d, value, &location),
    })
}

fn reference_list(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
    target: Option<ReferenceTarget>,
) -> Result<Vec<Reference>, DecodeError> {
    let mut result = Vec::new();
    for (i, value) in opt_array(obj, key, path)?.iter().enumerate() {
        let location = format!("{}.{}[{}]", path, key, i);
        if let Some(reference) = d.optional("Reference", &location, |d| match target {
            Some(target) => model_reference(d, value, &location, target),
            None => reference(d, value, &location),
        })? {
            result.push(reference);
        }
    }
    Ok(result)
}

fn lang_strings(value: &Value, path: &str) -> Result<LangStringSet, DecodeError> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::invalid_value(format!("{} is not an array", path)))?;
    let mut set = LangStringSet::new();
    for (i, item) in items.iter().enumerate() {
        let location = format!("{}[{}]", path, i);
        let obj = object(item, &location)?;
        set.insert(
            get_str(obj, "language", &location)?.to_string(),
            get_str(obj, "text", &location)?.to_string(),
        );
    }
    Ok(set)
}

fn opt_lang_strings(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
) -> Result<LangStringSet, DecodeError> {
    let Some(value) = obj.get(key) else {
        return Ok(LangStringSet::new());
    };
    let location = format!("{}.{}", path, key);
    Ok(d
        .optional("LangStringSet", &location, |_| lang_strings(value, &location))?
        .unwrap_or_default())
}

fn administration(
    d: &mut Decoder,
    obj: &Object,
    path: &str,
) -> Result<Option<AdministrativeInformation>, DecodeError> {
    let Some(value) = obj.get("administration") else {
        return Ok(None);
    };
    let location = format!("{}.administration", path);
    let admin = d.optional("AdministrativeInformation", &location, |_| {
        let admin = object(value, &location)?;
        Ok(AdministrativeInformation {
            version: opt_str(admin, "version", &location)?,
            revision: opt_str(admin, "revision", &location)?,
        })
    })?;
    Ok(admin.map(|mut admin| {
        if admin.version.is_none() && admin.revision.take().is_some() {
            d.diags.warning(format!(
                "Ignoring revision of {} since no version is given",
                location
            ));
        }
        admin
    }))
}

fn referable(
    d: &mut Decoder,
    obj: &Object,
    path: &str,
    id_short_required: bool,
) -> Result<Referable, DecodeError> {
    let id_short = if id_short_required {
        get_str(obj, "idShort", path)?.to_string()
    } else {
        opt_str(obj, "idShort", path)?.unwrap_or_default()
    };
    Ok(Referable {
        id_short,
        category: opt_str(obj, "category", path)?,
        description: opt_lang_strings(d, obj, "description", path)?,
    })
}

fn kind(obj: &Object, path: &str) -> Result<ModelingKind, DecodeError> {
    match obj.get("kind") {
        None => Ok(ModelingKind::Instance),
        Some(_) => get_token(obj, "kind", path),
    }
}

fn qualifier(d: &mut Decoder, obj: &Object, path: &str) -> Result<Qualifier, DecodeError> {
    Ok(Qualifier {
        qualifier_type: get_str(obj, "type", path)?.to_string(),
        value_type: get_str(obj, "valueType", path)?.to_string(),
        value: opt_str(obj, "value", path)?,
        value_id: opt_reference(d, obj, "valueId", path, None)?,
        semantic_id: opt_reference(d, obj, "semanticId", path, None)?,
    })
}

fn constraints(d: &mut Decoder, obj: &Object, path: &str) -> Result<Vec<Constraint>, DecodeError> {
    let mut result = Vec::new();
    for (i, value) in opt_array(obj, "qualifiers", path)?.iter().enumerate() {
        let location = format!("{}.qualifiers[{}]", path, i);
        let type_name = value
            .get("modelType")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("Constraint");
        if let Some(constraint) = d.optional(type_name, &location, |d| {
            let obj = object(value, &location)?;
            match model_type(obj, &location)? {
                "Qualifier" => Ok(Constraint::Qualifier(qualifier(d, obj, &location)?)),
                "Formula" => Ok(Constraint::Formula(Formula {
                    depends_on: reference_list(d, obj, "dependsOn", &location, None)?,
                })),
                other => Err(DecodeError::wrong_kind(format!(
                    "{} has modelType {}, expected Qualifier or Formula",
                    location, other
                ))),
            }
        })? {
            result.push(constraint);
        }
    }
    Ok(result)
}

fn header(d: &mut Decoder, obj: &Object, path: &str) -> Result<ElementHeader, DecodeError> {
    Ok(ElementHeader {
        referable: referable(d, obj, path, true)?,
        semantic_id: opt_reference(d, obj, "semanticId", path, None)?,
        qualifiers: constraints(d, obj, path)?,
        kind: kind(obj, path)?,
    })
}

// Submodel elements

/// Decode every entry of an element list, dropping failed entries in failsafe mode
fn element_list(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
) -> Result<Vec<SubmodelElement>, DecodeError> {
    let mut result = Vec::new();
    for (i, value) in opt_array(obj, key, path)?.iter().enumerate() {
        let location = format!("{}.{}[{}]", path, key, i);
        let type_name = value
            .get("modelType")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("SubmodelElement");
        if let Some(element) = d.optional(type_name, &location, |d| element(d, value, &location))? {
            result.push(element);
        }
    }
    Ok(result)
}

fn operation_variables(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
) -> Result<Vec<OperationVariable>, DecodeError> {
    let mut result = Vec::new();
    for (i, value) in opt_array(obj, key, path)?.iter().enumerate() {
        let location = format!("{}.{}[{}]", path, key, i);
        if let Some(variable) = d.optional("OperationVariable", &location, |d| {
            let var = object(value, &location)?;
            let inner = field(var, "value", &location)?;
            let inner_location = format!("{}.value", location);
            let type_name = inner
                .get("modelType")
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("SubmodelElement");
            let value = d.mandatory(type_name, &inner_location, |d| {
                element(d, inner, &inner_location)
            })?;
            Ok(OperationVariable { value })
        })? {
            result.push(variable);
        }
    }
    Ok(result)
}

fn element(d: &mut Decoder, value: &Value, path: &str) -> Result<SubmodelElement, DecodeError> {
    let obj = object(value, path)?;
    let model_type = model_type(obj, path)?;
    let element = match model_type {
        "Property" => SubmodelElement::Property(Property {
            header: header(d, obj, path)?,
            value_type: get_str(obj, "valueType", path)?.to_string(),
            value: opt_str(obj, "value", path)?,
            value_id: opt_reference(d, obj, "valueId", path, None)?,
        }),
        "MultiLanguageProperty" => SubmodelElement::MultiLanguageProperty(MultiLanguageProperty {
            header: header(d, obj, path)?,
            value: opt_lang_strings(d, obj, "value", path)?,
            value_id: opt_reference(d, obj, "valueId", path, None)?,
        }),
        "Range" => SubmodelElement::Range(Range {
            header: header(d, obj, path)?,
            value_type: get_str(obj, "valueType", path)?.to_string(),
            min: opt_str(obj, "min", path)?,
            max: opt_str(obj, "max", path)?,
        }),
        "Blob" => {
            let value = match opt_str(obj, "value", path)? {
                Some(encoded) => Some(
                    base64::engine::general_purpose::STANDARD
                        .decode(encoded.as_bytes())
                        .map_err(|e| {
                            DecodeError::invalid_value(format!(
                                "{}.value is not valid base64: {}",
                                path, e
                            ))
                        })?,
                ),
                None => None,
            };
            SubmodelElement::Blob(Blob {
                header: header(d, obj, path)?,
                mime_type: get_str(obj, "mimeType", path)?.to_string(),
                value,
            })
        }
        "File" => SubmodelElement::File(File {
            header: header(d, obj, path)?,
            mime_type: get_str(obj, "mimeType", path)?.to_string(),
            value: opt_str(obj, "value", path)?,
        }),
        "ReferenceElement" => SubmodelElement::ReferenceElement(ReferenceElement {
            header: header(d, obj, path)?,
            value: opt_reference(d, obj, "value", path, Some(ReferenceTarget::Referable))?,
        }),
        "RelationshipElement" => SubmodelElement::RelationshipElement(RelationshipElement {
            header: header(d, obj, path)?,
            first: reference_field(d, obj, "first", path, Some(ReferenceTarget::Referable))?,
            second: reference_field(d, obj, "second", path, Some(ReferenceTarget::Referable))?,
        }),
        "AnnotatedRelationshipElement" => {
            SubmodelElement::AnnotatedRelationshipElement(AnnotatedRelationshipElement {
                header: header(d, obj, path)?,
                first: reference_field(d, obj, "first", path, Some(ReferenceTarget::Referable))?,
                second: reference_field(d, obj, "second", path, Some(ReferenceTarget::Referable))?,
                annotations: reference_list(
                    d,
                    obj,
                    "annotation",
                    path,
                    Some(ReferenceTarget::DataElement),
                )?,
            })
        }
        "Operation" => SubmodelElement::Operation(Box::new(Operation {
            header: header(d, obj, path)?,
            input_variables: operation_variables(d, obj, "inputVariable", path)?,
            output_variables: operation_variables(d, obj, "outputVariable", path)?,
            in_output_variables: operation_variables(d, obj, "inoutputVariable", path)?,
        })),
        "Capability" => SubmodelElement::Capability(Capability {
            header: header(d, obj, path)?,
        }),
        "Entity" => {
            let header = header(d, obj, path)?;
            let entity_type: EntityType = get_token(obj, "entityType", path)?;
            let asset = opt_reference(d, obj, "asset", path, Some(ReferenceTarget::Asset))?;
            let statements = if d.stripped() {
                Vec::new()
            } else {
                element_list(d, obj, "statements", path)?
            };
            SubmodelElement::Entity(Entity {
                header,
                entity_type,
                asset,
                statements,
            })
        }
        "BasicEvent" => SubmodelElement::BasicEvent(BasicEvent {
            header: header(d, obj, path)?,
            observed: reference_field(d, obj, "observed", path, Some(ReferenceTarget::Referable))?,
        }),
        "SubmodelElementCollection" => {
            let header = header(d, obj, path)?;
            let ordered = match obj.get("ordered") {
                None => false,
                Some(_) => get_bool(obj, "ordered", path)?,
            };
            let value = if d.stripped() {
                Vec::new()
            } else {
                element_list(d, obj, "value", path)?
            };
            SubmodelElement::SubmodelElementCollection(SubmodelElementCollection {
                header,
                ordered,
                value,
            })
        }
        other => {
            return Err(DecodeError::wrong_kind(format!(
                "{} has unknown modelType {}",
                path, other
            )))
        }
    };
    Ok(element)
}

// Identifiables

fn view(d: &mut Decoder, obj: &Object, path: &str) -> Result<View, DecodeError> {
    Ok(View {
        referable: referable(d, obj, path, true)?,
        semantic_id: opt_reference(d, obj, "semanticId", path, None)?,
        contained_elements: reference_list(
            d,
            obj,
            "containedElements",
            path,
            Some(ReferenceTarget::Referable),
        )?,
    })
}

fn concept_dictionary(
    d: &mut Decoder,
    obj: &Object,
    path: &str,
) -> Result<ConceptDictionary, DecodeError> {
    Ok(ConceptDictionary {
        referable: referable(d, obj, path, true)?,
        concept_descriptions: reference_list(
            d,
            obj,
            "conceptDescriptions",
            path,
            Some(ReferenceTarget::ConceptDescription),
        )?,
    })
}

fn nested_list<T>(
    d: &mut Decoder,
    obj: &Object,
    key: &str,
    path: &str,
    type_name: &str,
    build: fn(&mut Decoder, &Object, &str) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let mut result = Vec::new();
    for (i, value) in opt_array(obj, key, path)?.iter().enumerate() {
        let location = format!("{}.{}[{}]", path, key, i);
        if let Some(item) = d.optional(type_name, &location, |d| {
            build(d, object(value, &location)?, &location)
        })? {
            result.push(item);
        }
    }
    Ok(result)
}

fn shell(d: &mut Decoder, obj: &Object, path: &str) -> Result<AssetAdministrationShell, DecodeError> {
    let identification = identification(d, obj, path)?;
    let referable = referable(d, obj, path, false)?;
    let administration = administration(d, obj, path)?;
    let asset = reference_field(d, obj, "asset", path, Some(ReferenceTarget::Asset))?;
    let derived_from = opt_reference(
        d,
        obj,
        "derivedFrom",
        path,
        Some(ReferenceTarget::AssetAdministrationShell),
    )?;
    let submodels = if d.stripped() {
        Vec::new()
    } else {
        reference_list(d, obj, "submodels", path, Some(ReferenceTarget::Submodel))?
    };
    let views = nested_list(d, obj, "views", path, "View", view)?;
    let concept_dictionaries = nested_list(
        d,
        obj,
        "conceptDictionaries",
        path,
        "ConceptDictionary",
        concept_dictionary,
    )?;
    Ok(AssetAdministrationShell {
        identification,
        referable,
        administration,
        derived_from,
        asset,
        submodels,
        views,
        concept_dictionaries,
    })
}

fn asset(d: &mut Decoder, obj: &Object, path: &str) -> Result<Asset, DecodeError> {
    Ok(Asset {
        identification: identification(d, obj, path)?,
        referable: referable(d, obj, path, false)?,
        administration: administration(d, obj, path)?,
        kind: get_token::<AssetKind>(obj, "kind", path)?,
        asset_identification_model: opt_reference(
            d,
            obj,
            "assetIdentificationModel",
            path,
            Some(ReferenceTarget::Submodel),
        )?,
        bill_of_material: opt_reference(
            d,
            obj,
            "billOfMaterial",
            path,
            Some(ReferenceTarget::Submodel),
        )?,
    })
}

fn submodel(d: &mut Decoder, obj: &Object, path: &str) -> Result<Submodel, DecodeError> {
    let identification = identification(d, obj, path)?;
    let referable = referable(d, obj, path, false)?;
    let administration = administration(d, obj, path)?;
    let kind = kind(obj, path)?;
    let semantic_id = opt_reference(d, obj, "semanticId", path, None)?;
    let qualifiers = constraints(d, obj, path)?;
    let submodel_elements = if d.stripped() {
        Vec::new()
    } else {
        element_list(d, obj, "submodelElements", path)?
    };
    Ok(Submodel {
        identification,
        referable,
        administration,
        kind,
        semantic_id,
        qualifiers,
        submodel_elements,
    })
}

fn iec61360(d: &mut Decoder, obj: &Object, path: &str) -> Result<Iec61360Content, DecodeError> {
    let preferred_name = lang_strings(field(obj, "preferredName", path)?, &format!("{}.preferredName", path))?;
    let data_type = match obj.get("dataType") {
        None => None,
        Some(_) => Some(get_token::<Iec61360DataType>(obj, "dataType", path)?),
    };
    let mut level_types = Vec::new();
    for (i, value) in opt_array(obj, "levelType", path)?.iter().enumerate() {
        let location = format!("{}.levelType[{}]", path, i);
        let token = value
            .as_str()
            .ok_or_else(|| DecodeError::invalid_value(format!("{} is not a string", location)))?;
        level_types.push(
            Iec61360LevelType::parse_token(token)
                .map_err(|e| DecodeError::invalid_token(e, &location))?,
        );
    }
    Ok(Iec61360Content {
        preferred_name,
        short_name: opt_str(obj, "shortName", path)?,
        unit: opt_str(obj, "unit", path)?,
        source_of_definition: opt_str(obj, "sourceOfDefinition", path)?,
        symbol: opt_str(obj, "symbol", path)?,
        data_type,
        definition: opt_lang_strings(d, obj, "definition", path)?,
        value_format: opt_str(obj, "valueFormat", path)?,
        level_types,
    })
}

fn concept_description(
    d: &mut Decoder,
    obj: &Object,
    path: &str,
) -> Result<ConceptDescription, DecodeError> {
    let mut cd = ConceptDescription {
        identification: identification(d, obj, path)?,
        referable: referable(d, obj, path, false)?,
        administration: administration(d, obj, path)?,
        is_case_of: reference_list(d, obj, "isCaseOf", path, None)?,
        iec61360: None,
    };
    for (i, value) in opt_array(obj, "embeddedDataSpecifications", path)?
        .iter()
        .enumerate()
    {
        let location = format!("{}.embeddedDataSpecifications[{}]", path, i);
        let content = d.optional("DataSpecificationIEC61360", &location, |d| {
            let spec = object(value, &location)?;
            let template = reference_field(d, spec, "dataSpecification", &location, None)?;
            if template.keys.first().map(|k| k.value.as_str()) != Some(IEC61360_TEMPLATE_IRI) {
                d.diags.warning(format!(
                    "Ignoring unsupported data specification {} at {}",
                    template, location
                ));
                return Ok(None);
            }
            let content_location = format!("{}.dataSpecificationContent", location);
            let content = object(field(spec, "dataSpecificationContent", &location)?, &content_location)?;
            iec61360(d, content, &content_location).map(Some)
        })?;
        if let Some(Some(content)) = content {
            cd.iec61360 = Some(content);
        }
    }
    Ok(cd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;
    use crate::registry::IdentifierType;

    fn parse(doc: &str, options: DecodeOptions) -> (Result<Vec<Identifiable>, DecodeError>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let result = parse_objects(doc.as_bytes(), &options, &mut diags);
        (result, diags)
    }

    const SUBMODEL_WITHOUT_ID: &str = r#"{
        "submodels": [{
            "idShort": "broken",
            "modelType": {"name": "Submodel"},
            "submodelElements": []
        }]
    }"#;

    #[test]
    fn test_missing_identifier_failsafe() {
        let (result, diags) = parse(SUBMODEL_WITHOUT_ID, DecodeOptions::failsafe());
        assert!(result.unwrap().is_empty());
        assert_eq!(diags.error_count(), 1);
        let message = &diags.iter().next().unwrap().message;
        assert!(message.contains("$.submodels[0] has no key identification"));
        assert!(message.ends_with("Failed to create Submodel from $.submodels[0]!"));
    }

    #[test]
    fn test_missing_identifier_strict() {
        let (result, _) = parse(SUBMODEL_WITHOUT_ID, DecodeOptions::strict());
        let err = result.unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MissingField);
        assert_eq!(err.chain().count(), 3);
    }

    #[test]
    fn test_unknown_top_level_key_is_fatal() {
        let (result, _) = parse(r#"{"shells": []}"#, DecodeOptions::failsafe());
        assert_eq!(result.unwrap_err().kind, DecodeErrorKind::Syntax);
        let (result, _) = parse("{not json", DecodeOptions::failsafe());
        assert_eq!(result.unwrap_err().kind, DecodeErrorKind::Syntax);
    }

    #[test]
    fn test_bad_element_dropped_siblings_kept() {
        let doc = r#"{
            "submodels": [{
                "identification": {"id": "http://example.com/sm", "idType": "IRI"},
                "modelType": {"name": "Submodel"},
                "submodelElements": [
                    {"idShort": "ok", "modelType": {"name": "Property"}, "valueType": "string"},
                    {"idShort": "bad", "modelType": {"name": "Property"}},
                    {"idShort": "weird", "modelType": {"name": "Gadget"}}
                ]
            }]
        }"#;
        let (result, diags) = parse(doc, DecodeOptions::failsafe());
        let objects = result.unwrap();
        let sm = objects[0].as_submodel().unwrap();
        assert_eq!(sm.submodel_elements.len(), 1);
        assert_eq!(sm.submodel_elements[0].id_short(), "ok");
        assert_eq!(diags.error_count(), 2);
        assert_eq!(sm.identification, Identifier::new("http://example.com/sm", IdentifierType::Iri));
    }

    #[test]
    fn test_invalid_enum_token() {
        let doc = r#"{
            "assets": [{
                "identification": {"id": "http://example.com/a", "idType": "IRI"},
                "modelType": {"name": "Asset"},
                "kind": "Prototype"
            }]
        }"#;
        let (result, _) = parse(doc, DecodeOptions::strict());
        assert_eq!(result.unwrap_err().kind, DecodeErrorKind::InvalidEnumToken);
    }

    #[test]
    fn test_wrong_model_type_in_list() {
        let doc = r#"{
            "assets": [{
                "identification": {"id": "http://example.com/a", "idType": "IRI"},
                "modelType": {"name": "Submodel"}
            }]
        }"#;
        let (result, diags) = parse(doc, DecodeOptions::failsafe());
        assert!(result.unwrap().is_empty());
        assert!(diags.iter().next().unwrap().message.starts_with("WrongElementKind"));
    }

    #[test]
    fn test_revision_without_version_dropped() {
        let doc = r#"{
            "conceptDescriptions": [{
                "identification": {"id": "http://example.com/cd", "idType": "IRI"},
                "modelType": {"name": "ConceptDescription"},
                "administration": {"revision": "3"}
            }]
        }"#;
        let (result, diags) = parse(doc, DecodeOptions::failsafe());
        let objects = result.unwrap();
        match &objects[0] {
            Identifiable::ConceptDescription(cd) => {
                assert_eq!(cd.administration, Some(AdministrativeInformation::default()))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_reference_target_mismatch_is_warning() {
        let doc = r#"{
            "assetAdministrationShells": [{
                "identification": {"id": "http://example.com/aas", "idType": "IRI"},
                "modelType": {"name": "AssetAdministrationShell"},
                "asset": {"keys": [{"type": "Submodel", "idType": "IRI", "value": "http://example.com/x", "local": true}]}
            }]
        }"#;
        let (result, diags) = parse(doc, DecodeOptions::strict());
        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn test_stripped_skips_elements() {
        let doc = r#"{
            "submodels": [{
                "identification": {"id": "http://example.com/sm", "idType": "IRI"},
                "modelType": {"name": "Submodel"},
                "submodelElements": [
                    {"idShort": "p", "modelType": {"name": "Property"}, "valueType": "string"}
                ]
            }]
        }"#;
        let (result, _) = parse(doc, DecodeOptions::failsafe().with_stripped(true));
        assert!(result.unwrap()[0].as_submodel().unwrap().submodel_elements.is_empty());
    }
}
