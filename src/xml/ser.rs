// SPDX-License-Identifier: MIT
//! Format B encoder

use base64::Engine;

use crate::model::{
    AdministrativeInformation, Asset, AssetAdministrationShell, ConceptDescription,
    ConceptDictionary, Constraint, ElementHeader, Iec61360Content, Identifiable, Identifier,
    LangStringSet, OperationVariable, Reference, Referable, Submodel, SubmodelElement, View,
    IEC61360_TEMPLATE_IRI,
};
use crate::registry::{ModelingKind, WireToken};
use crate::xml::node::{Namespace, XmlNode};
use crate::xml::{NS_AAS, NS_ABAC, NS_IEC};

/// Build the `aas:aasenv` tree for the given objects
pub fn to_node<'a>(objects: impl IntoIterator<Item = &'a Identifiable>) -> XmlNode {
    let mut shells = aas("assetAdministrationShells");
    let mut assets = aas("assets");
    let mut submodels = aas("submodels");
    let mut concept_descriptions = aas("conceptDescriptions");
    for object in objects {
        match object {
            Identifiable::AssetAdministrationShell(x) => shells.push(shell(x)),
            Identifiable::Asset(x) => assets.push(asset(x)),
            Identifiable::Submodel(x) => submodels.push(submodel(x)),
            Identifiable::ConceptDescription(x) => concept_descriptions.push(concept_description(x)),
        }
    }
    let mut root = aas("aasenv");
    for ns in [NS_AAS, NS_ABAC, NS_IEC] {
        let (name, uri) = ns.declaration();
        root = root.with_attr(name, uri);
    }
    root.with_child(shells)
        .with_child(assets)
        .with_child(submodels)
        .with_child(concept_descriptions)
}

fn aas(name: &str) -> XmlNode {
    XmlNode::new(NS_AAS, name)
}

fn text(name: &str, value: impl Into<String>) -> XmlNode {
    aas(name).with_text(value)
}

fn lang_strings(ns: Namespace, name: &str, set: &LangStringSet) -> XmlNode {
    XmlNode::new(ns, name).with_children(set.iter().map(|(language, value)| {
        XmlNode::new(ns, "langString")
            .with_attr("lang", language.as_str())
            .with_text(value.as_str())
    }))
}

fn keys(reference: &Reference) -> XmlNode {
    aas("keys").with_children(reference.keys.iter().map(|key| {
        aas("key")
            .with_attr("type", key.element.token())
            .with_attr("local", if key.local { "true" } else { "false" })
            .with_attr("idType", key.id_type.token())
            .with_text(key.value.as_str())
    }))
}

fn reference(name: &str, reference: &Reference) -> XmlNode {
    aas(name).with_child(keys(reference))
}

fn reference_list(outer: &str, inner: &str, references: &[Reference]) -> XmlNode {
    aas(outer).with_children(references.iter().map(|r| reference(inner, r)))
}

fn push_referable(node: &mut XmlNode, referable: &Referable, identifiable: bool) {
    if !identifiable || !referable.id_short.is_empty() {
        node.push(text("idShort", referable.id_short.as_str()));
    }
    if let Some(category) = &referable.category {
        node.push(text("category", category.as_str()));
    }
    if !referable.description.is_empty() {
        node.push(lang_strings(NS_AAS, "description", &referable.description));
    }
}

fn push_identifiable(
    node: &mut XmlNode,
    identifier: &Identifier,
    administration: &Option<AdministrativeInformation>,
) {
    node.push(
        text("identification", identifier.id.as_str()).with_attr("idType", identifier.id_type.token()),
    );
    if let Some(admin) = administration {
        let mut admin_node = aas("administration");
        if let Some(version) = &admin.version {
            admin_node.push(text("version", version.as_str()));
        }
        if let Some(revision) = &admin.revision {
            admin_node.push(text("revision", revision.as_str()));
        }
        node.push(admin_node);
    }
}

fn push_semantics(
    node: &mut XmlNode,
    kind: ModelingKind,
    semantic_id: &Option<Reference>,
    qualifiers: &[Constraint],
) {
    node.push(text("kind", kind.token()));
    if let Some(semantic_id) = semantic_id {
        node.push(reference("semanticId", semantic_id));
    }
    if !qualifiers.is_empty() {
        node.push(aas("qualifiers").with_children(qualifiers.iter().map(constraint)));
    }
}

fn constraint(constraint: &Constraint) -> XmlNode {
    match constraint {
        Constraint::Qualifier(q) => {
            let mut node = aas("qualifier");
            if let Some(semantic_id) = &q.semantic_id {
                node.push(reference("semanticId", semantic_id));
            }
            node.push(text("type", q.qualifier_type.as_str()));
            node.push(text("valueType", q.value_type.as_str()));
            if let Some(value) = &q.value {
                node.push(text("value", value.as_str()));
            }
            if let Some(value_id) = &q.value_id {
                node.push(reference("valueId", value_id));
            }
            node
        }
        Constraint::Formula(f) => {
            let mut node = aas("formula");
            if !f.depends_on.is_empty() {
                node.push(reference_list("dependsOnRefs", "reference", &f.depends_on));
            }
            node
        }
    }
}

fn element_tag(element: &SubmodelElement) -> &'static str {
    match element {
        SubmodelElement::Property(_) => "property",
        SubmodelElement::MultiLanguageProperty(_) => "multiLanguageProperty",
        SubmodelElement::Range(_) => "range",
        SubmodelElement::Blob(_) => "blob",
        SubmodelElement::File(_) => "file",
        SubmodelElement::ReferenceElement(_) => "referenceElement",
        SubmodelElement::RelationshipElement(_) => "relationshipElement",
        SubmodelElement::AnnotatedRelationshipElement(_) => "annotatedRelationshipElement",
        SubmodelElement::Operation(_) => "operation",
        SubmodelElement::Capability(_) => "capability",
        SubmodelElement::Entity(_) => "entity",
        SubmodelElement::BasicEvent(_) => "basicEvent",
        SubmodelElement::SubmodelElementCollection(_) => "submodelElementCollection",
    }
}

fn header(tag: &str, header: &ElementHeader) -> XmlNode {
    let mut node = aas(tag);
    push_referable(&mut node, &header.referable, false);
    push_semantics(&mut node, header.kind, &header.semantic_id, &header.qualifiers);
    node
}

fn operation_variables(name: &str, variables: &[OperationVariable]) -> XmlNode {
    aas(name).with_children(
        variables
            .iter()
            .map(|v| aas("operationVariable").with_child(aas("value").with_child(element(&v.value)))),
    )
}

fn element(element: &SubmodelElement) -> XmlNode {
    let mut node = header(element_tag(element), element.header());
    match element {
        SubmodelElement::Property(p) => {
            node.push(text("valueType", p.value_type.as_str()));
            if let Some(value) = &p.value {
                node.push(text("value", value.as_str()));
            }
            if let Some(value_id) = &p.value_id {
                node.push(reference("valueId", value_id));
            }
        }
        SubmodelElement::MultiLanguageProperty(p) => {
            if !p.value.is_empty() {
                node.push(lang_strings(NS_AAS, "value", &p.value));
            }
            if let Some(value_id) = &p.value_id {
                node.push(reference("valueId", value_id));
            }
        }
        SubmodelElement::Range(r) => {
            node.push(text("valueType", r.value_type.as_str()));
            if let Some(min) = &r.min {
                node.push(text("min", min.as_str()));
            }
            if let Some(max) = &r.max {
                node.push(text("max", max.as_str()));
            }
        }
        SubmodelElement::Blob(b) => {
            node.push(text("mimeType", b.mime_type.as_str()));
            if let Some(value) = &b.value {
                node.push(text(
                    "value",
                    base64::engine::general_purpose::STANDARD.encode(value),
                ));
            }
        }
        SubmodelElement::File(f) => {
            node.push(text("mimeType", f.mime_type.as_str()));
            if let Some(value) = &f.value {
                node.push(text("value", value.as_str()));
            }
        }
        SubmodelElement::ReferenceElement(r) => {
            if let Some(value) = &r.value {
                node.push(reference("value", value));
            }
        }
        SubmodelElement::RelationshipElement(r) => {
            node.push(reference("first", &r.first));
            node.push(reference("second", &r.second));
        }
        SubmodelElement::AnnotatedRelationshipElement(r) => {
            node.push(reference("first", &r.first));
            node.push(reference("second", &r.second));
            node.push(reference_list("annotations", "reference", &r.annotations));
        }
        SubmodelElement::Operation(op) => {
            let groups = [
                ("inputVariable", &op.input_variables),
                ("outputVariable", &op.output_variables),
                ("inoutputVariable", &op.in_output_variables),
            ];
            for (name, variables) in groups {
                if !variables.is_empty() {
                    node.push(operation_variables(name, variables));
                }
            }
        }
        SubmodelElement::Capability(_) => {}
        SubmodelElement::Entity(e) => {
            node.push(text("entityType", e.entity_type.token()));
            if let Some(asset) = &e.asset {
                node.push(reference("assetRef", asset));
            }
            node.push(aas("statements").with_children(e.statements.iter().map(self::element)));
        }
        SubmodelElement::BasicEvent(e) => {
            node.push(reference("observed", &e.observed));
        }
        SubmodelElement::SubmodelElementCollection(c) => {
            node.push(text("ordered", if c.ordered { "true" } else { "false" }));
            node.push(aas("value").with_children(c.value.iter().map(self::element)));
        }
    }
    node
}

fn view(view: &View) -> XmlNode {
    let mut node = aas("view");
    push_referable(&mut node, &view.referable, false);
    if let Some(semantic_id) = &view.semantic_id {
        node.push(reference("semanticId", semantic_id));
    }
    if !view.contained_elements.is_empty() {
        node.push(reference_list(
            "containedElements",
            "containedElementRef",
            &view.contained_elements,
        ));
    }
    node
}

fn concept_dictionary(dictionary: &ConceptDictionary) -> XmlNode {
    let mut node = aas("conceptDictionary");
    push_referable(&mut node, &dictionary.referable, false);
    if !dictionary.concept_descriptions.is_empty() {
        node.push(reference_list(
            "conceptDescriptionRefs",
            "conceptDescriptionRef",
            &dictionary.concept_descriptions,
        ));
    }
    node
}

fn shell(shell: &AssetAdministrationShell) -> XmlNode {
    let mut node = aas("assetAdministrationShell");
    push_referable(&mut node, &shell.referable, true);
    push_identifiable(&mut node, &shell.identification, &shell.administration);
    if let Some(derived_from) = &shell.derived_from {
        node.push(reference("derivedFrom", derived_from));
    }
    node.push(reference("assetRef", &shell.asset));
    if !shell.submodels.is_empty() {
        node.push(reference_list("submodelRefs", "submodelRef", &shell.submodels));
    }
    if !shell.views.is_empty() {
        node.push(aas("views").with_children(shell.views.iter().map(view)));
    }
    if !shell.concept_dictionaries.is_empty() {
        node.push(
            aas("conceptDictionaries")
                .with_children(shell.concept_dictionaries.iter().map(concept_dictionary)),
        );
    }
    node
}

fn asset(asset: &Asset) -> XmlNode {
    let mut node = aas("asset");
    push_referable(&mut node, &asset.referable, true);
    push_identifiable(&mut node, &asset.identification, &asset.administration);
    node.push(text("kind", asset.kind.token()));
    if let Some(model) = &asset.asset_identification_model {
        node.push(reference("assetIdentificationModelRef", model));
    }
    if let Some(bom) = &asset.bill_of_material {
        node.push(reference("billOfMaterialRef", bom));
    }
    node
}

fn submodel(submodel: &Submodel) -> XmlNode {
    let mut node = aas("submodel");
    push_referable(&mut node, &submodel.referable, true);
    push_identifiable(&mut node, &submodel.identification, &submodel.administration);
    push_semantics(
        &mut node,
        submodel.kind,
        &submodel.semantic_id,
        &submodel.qualifiers,
    );
    node.push(aas("submodelElements").with_children(submodel.submodel_elements.iter().map(element)));
    node
}

fn iec61360(content: &Iec61360Content) -> XmlNode {
    let iec = |name: &str, value: &str| XmlNode::new(NS_IEC, name).with_text(value);
    let mut node = XmlNode::new(NS_IEC, "dataSpecificationIEC61360");
    node.push(lang_strings(NS_IEC, "preferredName", &content.preferred_name));
    let optional = [
        ("shortName", &content.short_name),
        ("unit", &content.unit),
        ("sourceOfDefinition", &content.source_of_definition),
        ("symbol", &content.symbol),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            node.push(iec(name, value.as_str()));
        }
    }
    if let Some(data_type) = content.data_type {
        node.push(iec("dataType", data_type.token()));
    }
    if !content.definition.is_empty() {
        node.push(lang_strings(NS_IEC, "definition", &content.definition));
    }
    if let Some(value_format) = &content.value_format {
        node.push(iec("valueFormat", value_format.as_str()));
    }
    for level in &content.level_types {
        node.push(iec("levelType", level.token()));
    }
    node
}

fn concept_description(cd: &ConceptDescription) -> XmlNode {
    let mut node = aas("conceptDescription");
    push_referable(&mut node, &cd.referable, true);
    push_identifiable(&mut node, &cd.identification, &cd.administration);
    if let Some(content) = &cd.iec61360 {
        node.push(
            aas("embeddedDataSpecification")
                .with_child(aas("dataSpecificationContent").with_child(iec61360(content)))
                .with_child(reference(
                    "dataSpecification",
                    &Reference::global(IEC61360_TEMPLATE_IRI),
                )),
        );
    }
    for is_case_of in &cd.is_case_of {
        node.push(reference("isCaseOf", is_case_of));
    }
    node
}
