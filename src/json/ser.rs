// SPDX-License-Identifier: MIT
//! Format A encoder
//!
//! Builds a `serde_json::Value` tree from the model. Optional fields are
//! omitted when absent; `kind` is only written for templates.

use base64::Engine;
use serde_json::{json, Map, Value};

use crate::model::{
    AdministrativeInformation, Asset, AssetAdministrationShell, ConceptDescription,
    ConceptDictionary, Constraint, ElementHeader, Iec61360Content, Identifiable, Identifier, Key,
    LangStringSet, OperationVariable, Reference, Referable, Submodel, SubmodelElement, View,
    IEC61360_TEMPLATE_IRI,
};
use crate::registry::{ModelingKind, WireToken};

/// Encode objects into a document value with the four top-level lists
pub fn to_value<'a>(objects: impl IntoIterator<Item = &'a Identifiable>) -> Value {
    let mut shells = Vec::new();
    let mut assets = Vec::new();
    let mut submodels = Vec::new();
    let mut concept_descriptions = Vec::new();
    for object in objects {
        match object {
            Identifiable::AssetAdministrationShell(x) => shells.push(shell(x)),
            Identifiable::Asset(x) => assets.push(asset(x)),
            Identifiable::Submodel(x) => submodels.push(submodel(x)),
            Identifiable::ConceptDescription(x) => concept_descriptions.push(concept_description(x)),
        }
    }
    json!({
        "assetAdministrationShells": shells,
        "assets": assets,
        "submodels": submodels,
        "conceptDescriptions": concept_descriptions,
    })
}

pub(crate) fn lang_strings(set: &LangStringSet) -> Value {
    Value::Array(
        set.iter()
            .map(|(language, text)| json!({ "language": language, "text": text }))
            .collect(),
    )
}

fn key(key: &Key) -> Value {
    json!({
        "type": key.element.token(),
        "idType": key.id_type.token(),
        "value": key.value,
        "local": key.local,
    })
}

pub(crate) fn reference(reference: &Reference) -> Value {
    json!({ "keys": reference.keys.iter().map(key).collect::<Vec<_>>() })
}

fn references(references: &[Reference]) -> Value {
    Value::Array(references.iter().map(reference).collect())
}

fn identifier(identifier: &Identifier) -> Value {
    json!({ "id": identifier.id, "idType": identifier.id_type.token() })
}

fn administration(admin: &AdministrativeInformation) -> Value {
    let mut map = Map::new();
    if let Some(version) = &admin.version {
        map.insert("version".into(), json!(version));
    }
    if let Some(revision) = &admin.revision {
        map.insert("revision".into(), json!(revision));
    }
    Value::Object(map)
}

fn referable(referable: &Referable, model_type: &str, identifiable: bool) -> Map<String, Value> {
    let mut map = Map::new();
    if !identifiable || !referable.id_short.is_empty() {
        map.insert("idShort".into(), json!(referable.id_short));
    }
    if let Some(category) = &referable.category {
        map.insert("category".into(), json!(category));
    }
    if !referable.description.is_empty() {
        map.insert("description".into(), lang_strings(&referable.description));
    }
    map.insert("modelType".into(), json!({ "name": model_type }));
    map
}

fn identifiable_fields(
    map: &mut Map<String, Value>,
    id: &Identifier,
    admin: &Option<AdministrativeInformation>,
) {
    map.insert("identification".into(), identifier(id));
    if let Some(admin) = admin {
        map.insert("administration".into(), administration(admin));
    }
}

fn semantics_and_kind(
    map: &mut Map<String, Value>,
    kind: ModelingKind,
    semantic_id: &Option<Reference>,
    qualifiers: &[Constraint],
) {
    if kind == ModelingKind::Template {
        map.insert("kind".into(), json!(kind.token()));
    }
    if let Some(semantic_id) = semantic_id {
        map.insert("semanticId".into(), reference(semantic_id));
    }
    if !qualifiers.is_empty() {
        map.insert(
            "qualifiers".into(),
            Value::Array(qualifiers.iter().map(constraint).collect()),
        );
    }
}

fn constraint(constraint: &Constraint) -> Value {
    let mut map = Map::new();
    map.insert("modelType".into(), json!({ "name": constraint.model_type() }));
    match constraint {
        Constraint::Qualifier(q) => {
            if let Some(semantic_id) = &q.semantic_id {
                map.insert("semanticId".into(), reference(semantic_id));
            }
            map.insert("type".into(), json!(q.qualifier_type));
            map.insert("valueType".into(), json!(q.value_type));
            if let Some(value) = &q.value {
                map.insert("value".into(), json!(value));
            }
            if let Some(value_id) = &q.value_id {
                map.insert("valueId".into(), reference(value_id));
            }
        }
        Constraint::Formula(f) => {
            if !f.depends_on.is_empty() {
                map.insert("dependsOn".into(), references(&f.depends_on));
            }
        }
    }
    Value::Object(map)
}

fn header(header: &ElementHeader, model_type: &str) -> Map<String, Value> {
    let mut map = referable(&header.referable, model_type, false);
    semantics_and_kind(&mut map, header.kind, &header.semantic_id, &header.qualifiers);
    map
}

fn elements(elements: &[SubmodelElement]) -> Value {
    Value::Array(elements.iter().map(element).collect())
}

fn operation_variables(variables: &[OperationVariable]) -> Value {
    Value::Array(
        variables
            .iter()
            .map(|v| json!({ "modelType": { "name": "OperationVariable" }, "value": element(&v.value) }))
            .collect(),
    )
}

pub(crate) fn element(element: &SubmodelElement) -> Value {
    let mut map = header(element.header(), element.model_type());
    match element {
        SubmodelElement::Property(p) => {
            if let Some(value) = &p.value {
                map.insert("value".into(), json!(value));
            }
            if let Some(value_id) = &p.value_id {
                map.insert("valueId".into(), reference(value_id));
            }
            map.insert("valueType".into(), json!(p.value_type));
        }
        SubmodelElement::MultiLanguageProperty(p) => {
            if !p.value.is_empty() {
                map.insert("value".into(), lang_strings(&p.value));
            }
            if let Some(value_id) = &p.value_id {
                map.insert("valueId".into(), reference(value_id));
            }
        }
        SubmodelElement::Range(r) => {
            map.insert("valueType".into(), json!(r.value_type));
            if let Some(min) = &r.min {
                map.insert("min".into(), json!(min));
            }
            if let Some(max) = &r.max {
                map.insert("max".into(), json!(max));
            }
        }
        SubmodelElement::Blob(b) => {
            map.insert("mimeType".into(), json!(b.mime_type));
            if let Some(value) = &b.value {
                map.insert(
                    "value".into(),
                    json!(base64::engine::general_purpose::STANDARD.encode(value)),
                );
            }
        }
        SubmodelElement::File(f) => {
            map.insert("mimeType".into(), json!(f.mime_type));
            if let Some(value) = &f.value {
                map.insert("value".into(), json!(value));
            }
        }
        SubmodelElement::ReferenceElement(r) => {
            if let Some(value) = &r.value {
                map.insert("value".into(), reference(value));
            }
        }
        SubmodelElement::RelationshipElement(r) => {
            map.insert("first".into(), reference(&r.first));
            map.insert("second".into(), reference(&r.second));
        }
        SubmodelElement::AnnotatedRelationshipElement(r) => {
            map.insert("first".into(), reference(&r.first));
            map.insert("second".into(), reference(&r.second));
            if !r.annotations.is_empty() {
                map.insert("annotation".into(), references(&r.annotations));
            }
        }
        SubmodelElement::Operation(op) => {
            if !op.input_variables.is_empty() {
                map.insert("inputVariable".into(), operation_variables(&op.input_variables));
            }
            if !op.output_variables.is_empty() {
                map.insert("outputVariable".into(), operation_variables(&op.output_variables));
            }
            if !op.in_output_variables.is_empty() {
                map.insert(
                    "inoutputVariable".into(),
                    operation_variables(&op.in_output_variables),
                );
            }
        }
        SubmodelElement::Capability(_) => {}
        SubmodelElement::Entity(e) => {
            map.insert("statements".into(), elements(&e.statements));
            map.insert("entityType".into(), json!(e.entity_type.token()));
            if let Some(asset) = &e.asset {
                map.insert("asset".into(), reference(asset));
            }
        }
        SubmodelElement::BasicEvent(e) => {
            map.insert("observed".into(), reference(&e.observed));
        }
        SubmodelElement::SubmodelElementCollection(c) => {
            map.insert("value".into(), elements(&c.value));
            map.insert("ordered".into(), json!(c.ordered));
        }
    }
    Value::Object(map)
}

fn view(view: &View) -> Value {
    let mut map = referable(&view.referable, "View", false);
    if let Some(semantic_id) = &view.semantic_id {
        map.insert("semanticId".into(), reference(semantic_id));
    }
    if !view.contained_elements.is_empty() {
        map.insert("containedElements".into(), references(&view.contained_elements));
    }
    Value::Object(map)
}

fn concept_dictionary(dictionary: &ConceptDictionary) -> Value {
    let mut map = referable(&dictionary.referable, "ConceptDictionary", false);
    if !dictionary.concept_descriptions.is_empty() {
        map.insert(
            "conceptDescriptions".into(),
            references(&dictionary.concept_descriptions),
        );
    }
    Value::Object(map)
}

fn shell(shell: &AssetAdministrationShell) -> Value {
    let mut map = referable(&shell.referable, "AssetAdministrationShell", true);
    identifiable_fields(&mut map, &shell.identification, &shell.administration);
    if let Some(derived_from) = &shell.derived_from {
        map.insert("derivedFrom".into(), reference(derived_from));
    }
    map.insert("asset".into(), reference(&shell.asset));
    if !shell.submodels.is_empty() {
        map.insert("submodels".into(), references(&shell.submodels));
    }
    if !shell.views.is_empty() {
        map.insert(
            "views".into(),
            Value::Array(shell.views.iter().map(view).collect()),
        );
    }
    if !shell.concept_dictionaries.is_empty() {
        map.insert(
            "conceptDictionaries".into(),
            Value::Array(shell.concept_dictionaries.iter().map(concept_dictionary).collect()),
        );
    }
    Value::Object(map)
}

fn asset(asset: &Asset) -> Value {
    let mut map = referable(&asset.referable, "Asset", true);
    identifiable_fields(&mut map, &asset.identification, &asset.administration);
    map.insert("kind".into(), json!(asset.kind.token()));
    if let Some(model) = &asset.asset_identification_model {
        map.insert("assetIdentificationModel".into(), reference(model));
    }
    if let Some(bom) = &asset.bill_of_material {
        map.insert("billOfMaterial".into(), reference(bom));
    }
    Value::Object(map)
}

fn submodel(submodel: &Submodel) -> Value {
    let mut map = referable(&submodel.referable, "Submodel", true);
    identifiable_fields(&mut map, &submodel.identification, &submodel.administration);
    semantics_and_kind(
        &mut map,
        submodel.kind,
        &submodel.semantic_id,
        &submodel.qualifiers,
    );
    map.insert("submodelElements".into(), elements(&submodel.submodel_elements));
    Value::Object(map)
}

fn iec61360(content: &Iec61360Content) -> Value {
    let mut map = Map::new();
    map.insert("preferredName".into(), lang_strings(&content.preferred_name));
    let optional = [
        ("shortName", &content.short_name),
        ("unit", &content.unit),
        ("sourceOfDefinition", &content.source_of_definition),
        ("symbol", &content.symbol),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            map.insert(name.into(), json!(value));
        }
    }
    if let Some(data_type) = content.data_type {
        map.insert("dataType".into(), json!(data_type.token()));
    }
    if !content.definition.is_empty() {
        map.insert("definition".into(), lang_strings(&content.definition));
    }
    if let Some(value_format) = &content.value_format {
        map.insert("valueFormat".into(), json!(value_format));
    }
    if !content.level_types.is_empty() {
        map.insert(
            "levelType".into(),
            Value::Array(content.level_types.iter().map(|l| json!(l.token())).collect()),
        );
    }
    Value::Object(map)
}

fn concept_description(cd: &ConceptDescription) -> Value {
    let mut map = referable(&cd.referable, "ConceptDescription", true);
    identifiable_fields(&mut map, &cd.identification, &cd.administration);
    if let Some(content) = &cd.iec61360 {
        map.insert(
            "embeddedDataSpecifications".into(),
            json!([{
                "dataSpecification": reference(&Reference::global(IEC61360_TEMPLATE_IRI)),
                "dataSpecificationContent": iec61360(content),
            }]),
        );
    }
    if !cd.is_case_of.is_empty() {
        map.insert("isCaseOf".into(), references(&cd.is_case_of));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Property, Qualifier};
    use crate::registry::{AssetKind, KeyElements};

    #[test]
    fn test_kind_only_written_for_templates() {
        let mut sm = Submodel::new(Identifier::iri("http://example.com/sm"));
        let value = submodel(&sm);
        assert!(value.get("kind").is_none());
        sm.kind = ModelingKind::Template;
        assert_eq!(submodel(&sm)["kind"], "Template");
    }

    #[test]
    fn test_top_level_lists_always_present() {
        let value = to_value(std::iter::empty());
        for list in ["assetAdministrationShells", "assets", "submodels", "conceptDescriptions"] {
            assert_eq!(value[list], json!([]));
        }
    }

    #[test]
    fn test_property_layout() {
        let mut header = ElementHeader::new("voltage");
        header.qualifiers.push(Constraint::Qualifier(Qualifier::new("max", "int")));
        let element = SubmodelElement::Property(Property {
            header,
            value_type: "int".into(),
            value: Some("230".into()),
            value_id: None,
        });
        let value = super::element(&element);
        assert_eq!(value["idShort"], "voltage");
        assert_eq!(value["modelType"]["name"], "Property");
        assert_eq!(value["valueType"], "int");
        assert_eq!(value["qualifiers"][0]["modelType"]["name"], "Qualifier");
        assert!(value.get("valueId").is_none());
    }

    #[test]
    fn test_asset_layout() {
        let id = Identifier::iri("http://example.com/asset");
        let value = asset(&Asset::new(id.clone(), AssetKind::Instance));
        assert_eq!(value["identification"]["idType"], "IRI");
        assert_eq!(value["kind"], "Instance");
        assert!(value.get("idShort").is_none());

        let reference_value = reference(&Reference::to_identifiable(KeyElements::Asset, &id));
        assert_eq!(reference_value["keys"][0]["local"], true);
    }
}
