// SPDX-License-Identifier: MIT
//! Format B decoder
//!
//! Parsing is top-down: each constructor looks up its mandatory and optional
//! children directly below its own element and hands them to the next
//! constructor through the shared [`Decoder`] wrappers. A failure in strict
//! mode reads, innermost cause first:
//!
//! ```text
//! MissingField: aas:identification on line 252 has no attribute with name idType!
//!  -> Failed to create Identifier from aas:identification on line 252!
//!  -> Failed to create ConceptDescription from aas:conceptDescription on line 247!
//! ```

use base64::Engine;

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
use crate::xml::node::{self, Namespace, XmlNode};
use crate::xml::{NS_AAS, NS_IEC};

/// Decode a format B document into a list of Identifiables
pub fn parse_objects(
    data: &[u8],
    options: &DecodeOptions,
    diags: &mut Diagnostics,
) -> Result<Vec<Identifiable>, DecodeError> {
    let root = node::parse(data)?;
    if !root.is(NS_AAS, "aasenv") {
        return Err(DecodeError::syntax(format!(
            "Unexpected root element {}!",
            root.location()
        )));
    }

    let mut d = Decoder::new(*options, diags);
    let mut objects = Vec::new();
    for list in &root.children {
        let (tag, type_name) = match list_entry(list) {
            Some(entry) => entry,
            None => {
                return Err(DecodeError::syntax(format!(
                    "Unexpected top-level list {}!",
                    list.location()
                )))
            }
        };
        for entry in expect_children(&mut d, list, tag)? {
            let parsed = d.optional(type_name, &entry.location(), |d| {
                Ok(match tag {
                    "assetAdministrationShell" => Identifiable::from(shell(d, entry)?),
                    "asset" => asset(d, entry)?.into(),
                    "submodel" => submodel(d, entry)?.into(),
                    _ => concept_description(d, entry)?.into(),
                })
            })?;
            objects.extend(parsed);
        }
    }
    d.dedupe_document(objects)
}

fn list_entry(list: &XmlNode) -> Option<(&'static str, &'static str)> {
    if list.namespace.as_deref() != Some(NS_AAS.uri) {
        return None;
    }
    match list.name.as_str() {
        "assetAdministrationShells" => Some(("assetAdministrationShell", "AssetAdministrationShell")),
        "assets" => Some(("asset", "Asset")),
        "submodels" => Some(("submodel", "Submodel")),
        "conceptDescriptions" => Some(("conceptDescription", "ConceptDescription")),
        _ => None,
    }
}

// Node access

fn child<'n>(parent: &'n XmlNode, name: &str) -> Result<&'n XmlNode, DecodeError> {
    parent.child(NS_AAS, name).ok_or_else(|| {
        DecodeError::missing(format!("{} has no child aas:{}!", parent.location(), name))
    })
}

fn opt_child<'n>(parent: &'n XmlNode, name: &str) -> Option<&'n XmlNode> {
    parent.child(NS_AAS, name)
}

/// Children of `parent` that carry the expected tag; others are skipped
/// with a warning in failsafe mode and rejected in strict mode
fn expect_children<'n>(
    d: &mut Decoder,
    parent: &'n XmlNode,
    name: &str,
) -> Result<Vec<&'n XmlNode>, DecodeError> {
    expect_children_ns(d, parent, NS_AAS, name)
}

fn expect_children_ns<'n>(
    d: &mut Decoder,
    parent: &'n XmlNode,
    ns: Namespace,
    name: &str,
) -> Result<Vec<&'n XmlNode>, DecodeError> {
    let mut result = Vec::with_capacity(parent.children.len());
    for child in &parent.children {
        if child.is(ns, name) {
            result.push(child);
            continue;
        }
        let message = format!(
            "{}, child of {}, doesn't match the expected tag {}:{}!",
            child.location(),
            parent.location(),
            ns.prefix,
            name
        );
        if !d.failsafe() {
            return Err(DecodeError::wrong_kind(message));
        }
        d.diags.warning(message);
    }
    Ok(result)
}

fn text(node: &XmlNode) -> Result<String, DecodeError> {
    if node.text.is_empty() {
        return Err(DecodeError::missing(format!("{} has no text!", node.location())));
    }
    Ok(node.text.clone())
}

/// Text of a present element whose value may legitimately be empty
fn text_or_empty(node: &XmlNode) -> String {
    node.text.clone()
}

fn child_text(parent: &XmlNode, name: &str) -> Result<String, DecodeError> {
    text(child(parent, name)?)
}

/// Text of an optional child; a present but empty child yields an empty string
fn opt_child_text(parent: &XmlNode, name: &str) -> Option<String> {
    opt_child(parent, name).map(text_or_empty)
}

fn attr<'n>(node: &'n XmlNode, name: &str) -> Result<&'n str, DecodeError> {
    node.attr(name).ok_or_else(|| {
        DecodeError::missing(format!(
            "{} has no attribute with name {}!",
            node.location(),
            name
        ))
    })
}

fn attr_token<T: WireToken>(node: &XmlNode, name: &str) -> Result<T, DecodeError> {
    T::parse_token(attr(node, name)?).map_err(|e| {
        DecodeError::invalid_token(e, &format!("Attribute {} of {}", name, node.location()))
    })
}

fn text_token<T: WireToken>(node: &XmlNode) -> Result<T, DecodeError> {
    T::parse_token(&text(node)?).map_err(|e| DecodeError::invalid_token(e, &node.location()))
}

fn child_token<T: WireToken>(parent: &XmlNode, name: &str) -> Result<T, DecodeError> {
    text_token(child(parent, name)?)
}

fn parse_bool(value: &str, location: &str) -> Result<bool, DecodeError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DecodeError::invalid_value(format!(
            "{} of {} is not a valid boolean! Only true and false are allowed.",
            value, location
        ))),
    }
}

// Construction wrappers

fn construct<T>(
    d: &mut Decoder,
    node: &XmlNode,
    type_name: &str,
    build: impl FnOnce(&mut Decoder, &XmlNode) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    d.mandatory(type_name, &node.location(), |d| build(d, node))
}

fn construct_child<T>(
    d: &mut Decoder,
    parent: &XmlNode,
    name: &str,
    type_name: &str,
    build: impl FnOnce(&mut Decoder, &XmlNode) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    construct(d, child(parent, name)?, type_name, build)
}

fn construct_opt<T>(
    d: &mut Decoder,
    node: Option<&XmlNode>,
    type_name: &str,
    build: impl FnOnce(&mut Decoder, &XmlNode) -> Result<T, DecodeError>,
) -> Result<Option<T>, DecodeError> {
    match node {
        Some(node) => d.optional(type_name, &node.location(), |d| build(d, node)),
        None => Ok(None),
    }
}

fn construct_many<'n, T>(
    d: &mut Decoder,
    nodes: impl IntoIterator<Item = &'n XmlNode>,
    type_name: &str,
    build: impl Fn(&mut Decoder, &XmlNode) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let mut result = Vec::new();
    for node in nodes {
        if let Some(value) = d.optional(type_name, &node.location(), |d| build(d, node))? {
            result.push(value);
        }
    }
    Ok(result)
}

// Shared constructs

fn identifier(_: &mut Decoder, node: &XmlNode) -> Result<Identifier, DecodeError> {
    let id_type: IdentifierType = attr_token(node, "idType")?;
    Ok(Identifier::new(text(node)?, id_type))
}

fn key(_: &mut Decoder, node: &XmlNode) -> Result<Key, DecodeError> {
    let element: KeyElements = attr_token(node, "type")?;
    let local = parse_bool(
        attr(node, "local")?,
        &format!("attribute local of {}", node.location()),
    )?;
    let id_type: KeyType = attr_token(node, "idType")?;
    Ok(Key::new(element, local, text(node)?, id_type))
}

fn reference(d: &mut Decoder, node: &XmlNode) -> Result<Reference, DecodeError> {
    let keys_node = child(node, "keys")?;
    let keys_list = expect_children(d, keys_node, "key")?;
    let keys = construct_many(d, keys_list, "Key", key)?;
    if keys.is_empty() {
        return Err(DecodeError::missing(format!(
            "{} has no keys!",
            keys_node.location()
        )));
    }
    Ok(Reference::new(keys))
}

fn model_reference(
    d: &mut Decoder,
    node: &XmlNode,
    target: ReferenceTarget,
) -> Result<Reference, DecodeError> {
    let reference = reference(d, node)?;
    d.check_target(&reference, target);
    Ok(reference)
}

fn opt_reference(
    d: &mut Decoder,
    parent: &XmlNode,
    name: &str,
    target: Option<ReferenceTarget>,
) -> Result<Option<Reference>, DecodeError> {
    construct_opt(d, opt_child(parent, name), "Reference", |d, node| match target {
        Some(target) => model_reference(d, node, target),
        None => reference(d, node),
    })
}

fn mandatory_reference(
    d: &mut Decoder,
    parent: &XmlNode,
    name: &str,
    target: ReferenceTarget,
) -> Result<Reference, DecodeError> {
    construct_child(d, parent, name, "Reference", |d, node| {
        model_reference(d, node, target)
    })
}

/// Optional wrapper element holding a list of references under `inner`
fn reference_list(
    d: &mut Decoder,
    parent: &XmlNode,
    outer: &str,
    inner: &str,
    target: Option<ReferenceTarget>,
) -> Result<Vec<Reference>, DecodeError> {
    let Some(wrapper) = opt_child(parent, outer) else {
        return Ok(Vec::new());
    };
    let nodes = expect_children(d, wrapper, inner)?;
    construct_many(d, nodes, "Reference", |d, node| match target {
        Some(target) => model_reference(d, node, target),
        None => reference(d, node),
    })
}

fn lang_strings_ns(
    d: &mut Decoder,
    node: &XmlNode,
    ns: Namespace,
) -> Result<LangStringSet, DecodeError> {
    let mut set = LangStringSet::new();
    for lang_string in expect_children_ns(d, node, ns, "langString")? {
        set.insert(attr(lang_string, "lang")?.to_string(), text_or_empty(lang_string));
    }
    Ok(set)
}

fn lang_strings(d: &mut Decoder, node: &XmlNode) -> Result<LangStringSet, DecodeError> {
    lang_strings_ns(d, node, NS_AAS)
}

fn administration(
    d: &mut Decoder,
    parent: &XmlNode,
) -> Result<Option<AdministrativeInformation>, DecodeError> {
    let admin = construct_opt(
        d,
        opt_child(parent, "administration"),
        "AdministrativeInformation",
        |_, node| {
            Ok(AdministrativeInformation {
                version: opt_child_text(node, "version"),
                revision: opt_child_text(node, "revision"),
            })
        },
    )?;
    Ok(admin.map(|mut admin| {
        if admin.version.is_none() && admin.revision.take().is_some() {
            d.diags.warning(format!(
                "Ignoring revision of aas:administration in {} since no version is given",
                parent.location()
            ));
        }
        admin
    }))
}

fn referable(
    d: &mut Decoder,
    node: &XmlNode,
    id_short_required: bool,
) -> Result<Referable, DecodeError> {
    let id_short = if id_short_required {
        child_text(node, "idShort")?
    } else {
        opt_child_text(node, "idShort").unwrap_or_default()
    };
    let description = construct_opt(d, opt_child(node, "description"), "LangStringSet", lang_strings)?
        .unwrap_or_default();
    Ok(Referable {
        id_short,
        category: opt_child_text(node, "category"),
        description,
    })
}

fn kind(node: &XmlNode) -> Result<ModelingKind, DecodeError> {
    match opt_child(node, "kind") {
        Some(kind) => text_token(kind),
        None => Ok(ModelingKind::Instance),
    }
}

fn qualifier(d: &mut Decoder, node: &XmlNode) -> Result<Qualifier, DecodeError> {
    Ok(Qualifier {
        qualifier_type: child_text(node, "type")?,
        value_type: child_text(node, "valueType")?,
        value: opt_child_text(node, "value"),
        value_id: opt_reference(d, node, "valueId", None)?,
        semantic_id: opt_reference(d, node, "semanticId", None)?,
    })
}

fn formula(d: &mut Decoder, node: &XmlNode) -> Result<Formula, DecodeError> {
    let depends_on = match opt_child(node, "dependsOnRefs") {
        Some(refs) => construct_many(d, refs.children_named(NS_AAS, "reference"), "Reference", reference)?,
        None => Vec::new(),
    };
    Ok(Formula { depends_on })
}

fn constraint(d: &mut Decoder, node: &XmlNode) -> Result<Constraint, DecodeError> {
    if node.is(NS_AAS, "qualifier") {
        return Ok(Constraint::Qualifier(qualifier(d, node)?));
    }
    if node.is(NS_AAS, "formula") {
        return Ok(Constraint::Formula(formula(d, node)?));
    }
    Err(DecodeError::wrong_kind(format!(
        "{} is not a valid constraint!",
        node.location()
    )))
}

fn constraints(d: &mut Decoder, node: &XmlNode) -> Result<Vec<Constraint>, DecodeError> {
    match opt_child(node, "qualifiers") {
        Some(qualifiers) => construct_many(d, &qualifiers.children, "Constraint", constraint),
        None => Ok(Vec::new()),
    }
}

fn header(d: &mut Decoder, node: &XmlNode) -> Result<ElementHeader, DecodeError> {
    Ok(ElementHeader {
        referable: referable(d, node, true)?,
        kind: kind(node)?,
        semantic_id: opt_reference(d, node, "semanticId", None)?,
        qualifiers: constraints(d, node)?,
    })
}

// Submodel elements

/// Type name of the element a tag stands for, used in failure messages
fn element_type_name(node: &XmlNode) -> &'static str {
    if node.namespace.as_deref() != Some(NS_AAS.uri) {
        return "SubmodelElement";
    }
    match node.name.as_str() {
        "property" => "Property",
        "multiLanguageProperty" => "MultiLanguageProperty",
        "range" => "Range",
        "blob" => "Blob",
        "file" => "File",
        "referenceElement" => "ReferenceElement",
        "relationshipElement" => "RelationshipElement",
        "annotatedRelationshipElement" => "AnnotatedRelationshipElement",
        "operation" => "Operation",
        "capability" => "Capability",
        "entity" => "Entity",
        "basicEvent" => "BasicEvent",
        "submodelElementCollection" => "SubmodelElementCollection",
        _ => "SubmodelElement",
    }
}

fn elements(d: &mut Decoder, parent: &XmlNode) -> Result<Vec<SubmodelElement>, DecodeError> {
    let mut result = Vec::new();
    for node in &parent.children {
        if let Some(value) = d.optional(element_type_name(node), &node.location(), |d| element(d, node))? {
            result.push(value);
        }
    }
    Ok(result)
}

fn operation_variable(d: &mut Decoder, node: &XmlNode) -> Result<OperationVariable, DecodeError> {
    let value = child(node, "value")?;
    let first = value.children.first().ok_or_else(|| {
        DecodeError::missing(format!("{} has no submodel element!", value.location()))
    })?;
    if value.children.len() > 1 {
        d.diags.warning(format!(
            "{} has more than one submodel element, using the first one...",
            value.location()
        ));
    }
    Ok(OperationVariable {
        value: construct(d, first, element_type_name(first), element)?,
    })
}

fn operation_variables(
    d: &mut Decoder,
    node: &XmlNode,
    name: &str,
) -> Result<Vec<OperationVariable>, DecodeError> {
    let Some(wrapper) = opt_child(node, name) else {
        return Ok(Vec::new());
    };
    let nodes = expect_children(d, wrapper, "operationVariable")?;
    construct_many(d, nodes, "OperationVariable", operation_variable)
}

fn element(d: &mut Decoder, node: &XmlNode) -> Result<SubmodelElement, DecodeError> {
    if node.namespace.as_deref() != Some(NS_AAS.uri) {
        return Err(DecodeError::wrong_kind(format!(
            "{} is not a valid submodel element!",
            node.location()
        )));
    }
    let element = match node.name.as_str() {
        "property" => SubmodelElement::Property(Property {
            header: header(d, node)?,
            value_type: child_text(node, "valueType")?,
            value: opt_child_text(node, "value"),
            value_id: opt_reference(d, node, "valueId", None)?,
        }),
        "multiLanguageProperty" => SubmodelElement::MultiLanguageProperty(MultiLanguageProperty {
            header: header(d, node)?,
            value: construct_opt(d, opt_child(node, "value"), "LangStringSet", lang_strings)?
                .unwrap_or_default(),
            value_id: opt_reference(d, node, "valueId", None)?,
        }),
        "range" => SubmodelElement::Range(Range {
            header: header(d, node)?,
            value_type: child_text(node, "valueType")?,
            min: opt_child_text(node, "min"),
            max: opt_child_text(node, "max"),
        }),
        "blob" => {
            let value = match opt_child(node, "value") {
                Some(value) => Some(
                    base64::engine::general_purpose::STANDARD
                        .decode(value.text.trim())
                        .map_err(|e| {
                            DecodeError::invalid_value(format!(
                                "{} is not valid base64: {}",
                                value.location(),
                                e
                            ))
                        })?,
                ),
                None => None,
            };
            SubmodelElement::Blob(Blob {
                header: header(d, node)?,
                mime_type: child_text(node, "mimeType")?,
                value,
            })
        }
        "file" => SubmodelElement::File(File {
            header: header(d, node)?,
            mime_type: child_text(node, "mimeType")?,
            value: opt_child_text(node, "value"),
        }),
        "referenceElement" => SubmodelElement::ReferenceElement(ReferenceElement {
            header: header(d, node)?,
            value: opt_reference(d, node, "value", Some(ReferenceTarget::Referable))?,
        }),
        "relationshipElement" => SubmodelElement::RelationshipElement(RelationshipElement {
            header: header(d, node)?,
            first: mandatory_reference(d, node, "first", ReferenceTarget::Referable)?,
            second: mandatory_reference(d, node, "second", ReferenceTarget::Referable)?,
        }),
        "annotatedRelationshipElement" => {
            let annotations = child(node, "annotations")?;
            SubmodelElement::AnnotatedRelationshipElement(AnnotatedRelationshipElement {
                header: header(d, node)?,
                first: mandatory_reference(d, node, "first", ReferenceTarget::Referable)?,
                second: mandatory_reference(d, node, "second", ReferenceTarget::Referable)?,
                annotations: construct_many(
                    d,
                    annotations.children_named(NS_AAS, "reference"),
                    "Reference",
                    |d, node| model_reference(d, node, ReferenceTarget::DataElement),
                )?,
            })
        }
        "operation" => SubmodelElement::Operation(Box::new(Operation {
            header: header(d, node)?,
            input_variables: operation_variables(d, node, "inputVariable")?,
            output_variables: operation_variables(d, node, "outputVariable")?,
            in_output_variables: operation_variables(d, node, "inoutputVariable")?,
        })),
        "capability" => SubmodelElement::Capability(Capability {
            header: header(d, node)?,
        }),
        "entity" => {
            let statements = child(node, "statements")?;
            SubmodelElement::Entity(Entity {
                header: header(d, node)?,
                entity_type: child_token::<EntityType>(node, "entityType")?,
                asset: opt_reference(d, node, "assetRef", Some(ReferenceTarget::Asset))?,
                statements: if d.stripped() {
                    Vec::new()
                } else {
                    elements(d, statements)?
                },
            })
        }
        "basicEvent" => SubmodelElement::BasicEvent(BasicEvent {
            header: header(d, node)?,
            observed: mandatory_reference(d, node, "observed", ReferenceTarget::Referable)?,
        }),
        "submodelElementCollection" => {
            let ordered_node = child(node, "ordered")?;
            let ordered = parse_bool(&ordered_node.text, &ordered_node.location())?;
            let value = child(node, "value")?;
            SubmodelElement::SubmodelElementCollection(SubmodelElementCollection {
                header: header(d, node)?,
                ordered,
                value: if d.stripped() {
                    Vec::new()
                } else {
                    elements(d, value)?
                },
            })
        }
        _ => {
            return Err(DecodeError::wrong_kind(format!(
                "{} is not a valid submodel element!",
                node.location()
            )))
        }
    };
    Ok(element)
}

// Identifiables

fn view(d: &mut Decoder, node: &XmlNode) -> Result<View, DecodeError> {
    Ok(View {
        referable: referable(d, node, true)?,
        semantic_id: opt_reference(d, node, "semanticId", None)?,
        contained_elements: reference_list(
            d,
            node,
            "containedElements",
            "containedElementRef",
            Some(ReferenceTarget::Referable),
        )?,
    })
}

fn concept_dictionary(d: &mut Decoder, node: &XmlNode) -> Result<ConceptDictionary, DecodeError> {
    Ok(ConceptDictionary {
        referable: referable(d, node, true)?,
        concept_descriptions: reference_list(
            d,
            node,
            "conceptDescriptionRefs",
            "conceptDescriptionRef",
            Some(ReferenceTarget::ConceptDescription),
        )?,
    })
}

fn nested<T>(
    d: &mut Decoder,
    parent: &XmlNode,
    outer: &str,
    inner: &str,
    type_name: &str,
    build: fn(&mut Decoder, &XmlNode) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let Some(wrapper) = opt_child(parent, outer) else {
        return Ok(Vec::new());
    };
    let nodes = expect_children(d, wrapper, inner)?;
    construct_many(d, nodes, type_name, build)
}

fn shell(d: &mut Decoder, node: &XmlNode) -> Result<AssetAdministrationShell, DecodeError> {
    let asset = mandatory_reference(d, node, "assetRef", ReferenceTarget::Asset)?;
    let identification = construct_child(d, node, "identification", "Identifier", identifier)?;
    let submodels = if d.stripped() {
        Vec::new()
    } else {
        reference_list(
            d,
            node,
            "submodelRefs",
            "submodelRef",
            Some(ReferenceTarget::Submodel),
        )?
    };
    let views = nested(d, node, "views", "view", "View", view)?;
    let concept_dictionaries = nested(
        d,
        node,
        "conceptDictionaries",
        "conceptDictionary",
        "ConceptDictionary",
        concept_dictionary,
    )?;
    let derived_from = opt_reference(
        d,
        node,
        "derivedFrom",
        Some(ReferenceTarget::AssetAdministrationShell),
    )?;
    Ok(AssetAdministrationShell {
        identification,
        referable: referable(d, node, false)?,
        administration: administration(d, node)?,
        derived_from,
        asset,
        submodels,
        views,
        concept_dictionaries,
    })
}

fn asset(d: &mut Decoder, node: &XmlNode) -> Result<Asset, DecodeError> {
    let kind: AssetKind = child_token(node, "kind")?;
    let identification = construct_child(d, node, "identification", "Identifier", identifier)?;
    Ok(Asset {
        identification,
        kind,
        asset_identification_model: opt_reference(
            d,
            node,
            "assetIdentificationModelRef",
            Some(ReferenceTarget::Submodel),
        )?,
        bill_of_material: opt_reference(
            d,
            node,
            "billOfMaterialRef",
            Some(ReferenceTarget::Submodel),
        )?,
        referable: referable(d, node, false)?,
        administration: administration(d, node)?,
    })
}

fn submodel(d: &mut Decoder, node: &XmlNode) -> Result<Submodel, DecodeError> {
    let identification = construct_child(d, node, "identification", "Identifier", identifier)?;
    let kind = kind(node)?;
    let elements_node = child(node, "submodelElements")?;
    let submodel_elements = if d.stripped() {
        Vec::new()
    } else {
        elements(d, elements_node)?
    };
    Ok(Submodel {
        identification,
        kind,
        submodel_elements,
        referable: referable(d, node, false)?,
        administration: administration(d, node)?,
        semantic_id: opt_reference(d, node, "semanticId", None)?,
        qualifiers: constraints(d, node)?,
    })
}

fn iec61360(d: &mut Decoder, node: &XmlNode) -> Result<Iec61360Content, DecodeError> {
    let iec = |name: &str| node.child(NS_IEC, name);
    let iec_text = |name: &str| iec(name).map(|c| c.text.clone());
    let preferred_name_node = iec("preferredName").ok_or_else(|| {
        DecodeError::missing(format!("{} has no child IEC:preferredName!", node.location()))
    })?;
    let preferred_name = lang_strings_ns(d, preferred_name_node, NS_IEC)?;
    let definition = match iec("definition") {
        Some(definition) => lang_strings_ns(d, definition, NS_IEC)?,
        None => LangStringSet::new(),
    };
    let data_type = match iec("dataType") {
        Some(data_type) => Some(text_token::<Iec61360DataType>(data_type)?),
        None => None,
    };
    let level_types = node
        .children_named(NS_IEC, "levelType")
        .map(text_token::<Iec61360LevelType>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Iec61360Content {
        preferred_name,
        short_name: iec_text("shortName"),
        unit: iec_text("unit"),
        source_of_definition: iec_text("sourceOfDefinition"),
        symbol: iec_text("symbol"),
        data_type,
        definition,
        value_format: iec_text("valueFormat"),
        level_types,
    })
}

fn embedded_data_specification(
    d: &mut Decoder,
    node: &XmlNode,
) -> Result<Option<Iec61360Content>, DecodeError> {
    let template = construct_child(d, node, "dataSpecification", "Reference", reference)?;
    if template.keys.first().map(|k| k.value.as_str()) != Some(IEC61360_TEMPLATE_IRI) {
        d.diags.warning(format!(
            "Ignoring unsupported data specification {} in {}",
            template,
            node.location()
        ));
        return Ok(None);
    }
    let content = child(node, "dataSpecificationContent")?;
    let iec = content
        .child(NS_AAS, "dataSpecificationIEC61360")
        .or_else(|| content.child(NS_IEC, "dataSpecificationIEC61360"))
        .ok_or_else(|| {
            DecodeError::missing(format!(
                "{} has no child aas:dataSpecificationIEC61360!",
                content.location()
            ))
        })?;
    construct(d, iec, "DataSpecificationIEC61360", iec61360).map(Some)
}

fn concept_description(d: &mut Decoder, node: &XmlNode) -> Result<ConceptDescription, DecodeError> {
    let identification = construct_child(d, node, "identification", "Identifier", identifier)?;
    let is_case_of = construct_many(
        d,
        node.children_named(NS_AAS, "isCaseOf"),
        "Reference",
        reference,
    )?;
    let mut iec61360 = None;
    for spec in construct_many(
        d,
        node.children_named(NS_AAS, "embeddedDataSpecification"),
        "EmbeddedDataSpecification",
        embedded_data_specification,
    )? {
        if spec.is_some() {
            iec61360 = spec;
        }
    }
    Ok(ConceptDescription {
        identification,
        referable: referable(d, node, false)?,
        administration: administration(d, node)?,
        is_case_of,
        iec61360,
    })
}
