// SPDX-License-Identifier: MIT
//! Example model covering every element kind
//!
//! Shared by the integration tests and the codec benchmark.

use std::collections::BTreeMap;

use aas_adapter::{
    AdministrativeInformation, AnnotatedRelationshipElement, Asset, AssetAdministrationShell,
    AssetKind, BasicEvent, Blob, Capability, ConceptDescription, ConceptDictionary, Constraint,
    ElementHeader, Entity, EntityType, File, FileStoreError, Formula, Iec61360Content,
    Iec61360DataType, Iec61360LevelType, Identifier, IdentifierType, InMemoryFileStore, Key,
    KeyElements, KeyType, LangStringSet, ModelingKind, MultiLanguageProperty, ObjectStore,
    Operation, OperationVariable, Property, Qualifier, Range, Reference, ReferenceElement,
    Referable, RelationshipElement, Submodel, SubmodelElement, SubmodelElementCollection, View,
};

pub const ASSET_ID: &str = "https://acplt.org/Test_Asset";
pub const SHELL_ID: &str = "https://acplt.org/Test_AssetAdministrationShell";
pub const IDENTIFICATION_SUBMODEL_ID: &str = "http://acplt.org/Submodels/Assets/TestAsset/Identification";
pub const BILL_OF_MATERIAL_SUBMODEL_ID: &str =
    "http://acplt.org/Submodels/Assets/TestAsset/BillOfMaterial";
pub const EXAMPLE_SUBMODEL_ID: &str = "https://acplt.org/Test_Submodel";
pub const CONCEPT_DESCRIPTION_ID: &str = "https://acplt.org/Test_ConceptDescription";

/// Value of the example File element; [`example_files`] holds its content
pub const MANUAL_PART: &str = "/aasx/files/manual.pdf";
pub const MANUAL_CONTENT: &[u8] = b"%PDF-1.4\n% example manual\n%%EOF\n";

fn lang(entries: &[(&str, &str)]) -> LangStringSet {
    entries
        .iter()
        .map(|(lang, text)| (lang.to_string(), text.to_string()))
        .collect::<BTreeMap<_, _>>()
}

fn described(id_short: &str, en: &str) -> Referable {
    Referable {
        id_short: id_short.to_string(),
        category: None,
        description: lang(&[("en-us", en)]),
    }
}

fn header(id_short: &str, category: &str, semantic_id: &str) -> ElementHeader {
    let mut header = ElementHeader::new(id_short);
    header.referable.category = Some(category.to_string());
    let en = format!("Example {} object", id_short);
    let de = format!("Beispiel {} Element", id_short);
    header.referable.description = lang(&[("en-us", en.as_str()), ("de", de.as_str())]);
    header.semantic_id = Some(Reference::global(semantic_id));
    header
}

fn example_qualifier() -> Constraint {
    let mut qualifier = Qualifier::new("http://acplt.org/Qualifier/ExampleQualifier", "string");
    qualifier.value = Some("exampleValue".to_string());
    qualifier.value_id = Some(Reference::new(vec![Key::new(
        KeyElements::GlobalReference,
        false,
        "http://acplt.org/ValueId/ExampleValueId",
        KeyType::Irdi,
    )]));
    Constraint::Qualifier(qualifier)
}

/// Reference to a submodel element of the example Submodel
fn element_reference(element: KeyElements, id_short: &str) -> Reference {
    Reference::new(vec![
        Key::for_identifier(KeyElements::Submodel, &Identifier::iri(EXAMPLE_SUBMODEL_ID)),
        Key::new(element, true, id_short, KeyType::IdShort),
    ])
}

fn example_property() -> Property {
    let mut header = header(
        "ExampleProperty",
        "CONSTANT",
        "http://acplt.org/Properties/ExampleProperty",
    );
    header.qualifiers.push(example_qualifier());
    Property {
        header,
        value_type: "string".to_string(),
        value: Some("exampleValue".to_string()),
        value_id: Some(Reference::global("http://acplt.org/ValueId/ExampleValueId")),
    }
}

fn example_operation() -> Operation {
    let variable = |id_short: &str| OperationVariable {
        value: SubmodelElement::Property(Property {
            header: ElementHeader {
                kind: ModelingKind::Template,
                ..header(id_short, "CONSTANT", "http://acplt.org/Properties/ExampleProperty")
            },
            value_type: "string".to_string(),
            value: None,
            value_id: None,
        }),
    };
    Operation {
        header: header("ExampleOperation", "PARAMETER", "http://acplt.org/Operations/ExampleOperation"),
        input_variables: vec![variable("ExampleInput")],
        output_variables: vec![variable("ExampleOutput")],
        in_output_variables: vec![variable("ExampleInOutput")],
    }
}

fn example_entity() -> Entity {
    let mut statement = example_property();
    statement.header.referable.id_short = "ExampleStatement".to_string();
    Entity {
        header: header("ExampleEntity", "PARAMETER", "http://acplt.org/Entities/ExampleEntity"),
        entity_type: EntityType::SelfManagedEntity,
        asset: Some(Reference::to_identifiable(
            KeyElements::Asset,
            &Identifier::iri(ASSET_ID),
        )),
        statements: vec![SubmodelElement::Property(statement)],
    }
}

fn example_collection() -> SubmodelElementCollection {
    let mut collection_header = header(
        "ExampleSubmodelCollectionOrdered",
        "PARAMETER",
        "http://acplt.org/SubmodelElementCollections/ExampleSubmodelElementCollectionOrdered",
    );
    collection_header.qualifiers.push(Constraint::Formula(Formula {
        depends_on: vec![element_reference(KeyElements::Property, "ExampleProperty")],
    }));
    SubmodelElementCollection {
        header: collection_header,
        ordered: true,
        value: vec![
            SubmodelElement::Range(Range {
                header: header("ExampleRange", "PARAMETER", "http://acplt.org/Ranges/ExampleRange"),
                value_type: "int".to_string(),
                min: Some("0".to_string()),
                max: Some("100".to_string()),
            }),
            SubmodelElement::MultiLanguageProperty(MultiLanguageProperty {
                header: header(
                    "ExampleMultiLanguageProperty",
                    "CONSTANT",
                    "http://acplt.org/MultiLanguageProperties/ExampleMultiLanguageProperty",
                ),
                value: lang(&[
                    ("en-us", "Example value of a MultiLanguageProperty element"),
                    ("de", "Beispielswert für ein MultiLanguageProperty-Element"),
                ]),
                value_id: None,
            }),
            SubmodelElement::SubmodelElementCollection(SubmodelElementCollection {
                header: header(
                    "ExampleSubmodelCollectionUnordered",
                    "PARAMETER",
                    "http://acplt.org/SubmodelElementCollections/ExampleSubmodelElementCollectionUnordered",
                ),
                ordered: false,
                value: vec![
                    SubmodelElement::Blob(Blob {
                        header: header("ExampleBlob", "PARAMETER", "http://acplt.org/Blobs/ExampleBlob"),
                        mime_type: "application/pdf".to_string(),
                        value: Some(vec![0x01, 0x02, 0x03, 0x04, 0x05]),
                    }),
                    SubmodelElement::File(File {
                        header: header("ExampleFile", "PARAMETER", "http://acplt.org/Files/ExampleFile"),
                        mime_type: "application/pdf".to_string(),
                        value: Some(MANUAL_PART.to_string()),
                    }),
                    SubmodelElement::ReferenceElement(ReferenceElement {
                        header: header(
                            "ExampleReferenceElement",
                            "PARAMETER",
                            "http://acplt.org/ReferenceElements/ExampleReferenceElement",
                        ),
                        value: Some(element_reference(KeyElements::Property, "ExampleProperty")),
                    }),
                ],
            }),
        ],
    }
}

/// Submodel with one element of every kind
pub fn create_example_submodel() -> Submodel {
    let first = element_reference(KeyElements::Property, "ExampleProperty");
    let second = element_reference(KeyElements::Property, "ExampleProperty2");
    let mut property2 = example_property();
    property2.header.referable.id_short = "ExampleProperty2".to_string();

    let elements = vec![
        SubmodelElement::Property(example_property()),
        SubmodelElement::Property(property2),
        SubmodelElement::RelationshipElement(RelationshipElement {
            header: header(
                "ExampleRelationshipElement",
                "PARAMETER",
                "http://acplt.org/RelationshipElements/ExampleRelationshipElement",
            ),
            first: first.clone(),
            second: second.clone(),
        }),
        SubmodelElement::AnnotatedRelationshipElement(AnnotatedRelationshipElement {
            header: header(
                "ExampleAnnotatedRelationshipElement",
                "PARAMETER",
                "http://acplt.org/RelationshipElements/ExampleAnnotatedRelationshipElement",
            ),
            first,
            second,
            annotations: vec![element_reference(KeyElements::Property, "ExampleProperty")],
        }),
        SubmodelElement::Operation(Box::new(example_operation())),
        SubmodelElement::Capability(Capability {
            header: header("ExampleCapability", "PARAMETER", "http://acplt.org/Capabilities/ExampleCapability"),
        }),
        SubmodelElement::BasicEvent(BasicEvent {
            header: header("ExampleBasicEvent", "PARAMETER", "http://acplt.org/Events/ExampleBasicEvent"),
            observed: element_reference(KeyElements::Property, "ExampleProperty"),
        }),
        SubmodelElement::Entity(example_entity()),
        SubmodelElement::SubmodelElementCollection(example_collection()),
    ];

    Submodel {
        identification: Identifier::iri(EXAMPLE_SUBMODEL_ID),
        referable: described("TestSubmodel", "An example submodel for the test application"),
        administration: Some(AdministrativeInformation {
            version: Some("0.9".to_string()),
            revision: Some("0".to_string()),
        }),
        kind: ModelingKind::Instance,
        semantic_id: Some(Reference::global(
            "http://acplt.org/SubmodelTemplates/ExampleSubmodel",
        )),
        qualifiers: Vec::new(),
        submodel_elements: elements,
    }
}

pub fn create_identification_submodel() -> Submodel {
    let mut manufacturer = example_property();
    manufacturer.header = header(
        "ManufacturerName",
        "CONSTANT",
        "0173-1#02-AAO677#002",
    );
    manufacturer.value = Some("ACPLT".to_string());

    let mut instance_id = example_property();
    instance_id.header = header(
        "InstanceId",
        "VARIABLE",
        "http://opcfoundation.org/UA/DI/1.1/DeviceType/Serialnumber",
    );
    instance_id.value = Some("978-8234-234-342".to_string());
    instance_id.value_id = Some(Reference::global("978-8234-234-342"));

    let mut submodel = Submodel::new(Identifier::iri(IDENTIFICATION_SUBMODEL_ID));
    submodel.referable = described("Identification", "An example asset identification submodel");
    submodel.semantic_id = Some(Reference::new(vec![Key::new(
        KeyElements::GlobalReference,
        false,
        "http://acplt.org/SubmodelTemplates/AssetIdentification",
        KeyType::Iri,
    )]));
    submodel.submodel_elements = vec![
        SubmodelElement::Property(manufacturer),
        SubmodelElement::Property(instance_id),
    ];
    submodel
}

pub fn create_bill_of_material_submodel() -> Submodel {
    let component = |id_short: &str, entity_type: EntityType| Entity {
        header: ElementHeader::new(id_short),
        entity_type,
        asset: match entity_type {
            EntityType::SelfManagedEntity => Some(Reference::to_identifiable(
                KeyElements::Asset,
                &Identifier::iri(ASSET_ID),
            )),
            EntityType::CoManagedEntity => None,
        },
        statements: Vec::new(),
    };

    let mut submodel = Submodel::new(Identifier::iri(BILL_OF_MATERIAL_SUBMODEL_ID));
    submodel.referable = described("BillOfMaterial", "An example bill of material submodel");
    submodel.administration = Some(AdministrativeInformation {
        version: Some("0.9".to_string()),
        revision: None,
    });
    submodel.submodel_elements = vec![
        SubmodelElement::Entity(component("ExampleEntity", EntityType::SelfManagedEntity)),
        SubmodelElement::Entity(component("ExampleEntity2", EntityType::CoManagedEntity)),
    ];
    submodel
}

pub fn create_example_asset() -> Asset {
    let mut asset = Asset::new(Identifier::iri(ASSET_ID), AssetKind::Instance);
    asset.referable = described("Test_Asset", "An example asset for the test application");
    asset.administration = Some(AdministrativeInformation {
        version: Some("0.9".to_string()),
        revision: Some("0".to_string()),
    });
    asset.asset_identification_model = Some(Reference::to_identifiable(
        KeyElements::Submodel,
        &Identifier::iri(IDENTIFICATION_SUBMODEL_ID),
    ));
    asset.bill_of_material = Some(Reference::to_identifiable(
        KeyElements::Submodel,
        &Identifier::iri(BILL_OF_MATERIAL_SUBMODEL_ID),
    ));
    asset
}

pub fn create_example_concept_description() -> ConceptDescription {
    let mut cd = ConceptDescription::new(Identifier::iri(CONCEPT_DESCRIPTION_ID));
    cd.referable = described("TestConceptDescription", "An example concept description for the test application");
    cd.administration = Some(AdministrativeInformation {
        version: Some("0.9".to_string()),
        revision: Some("0".to_string()),
    });
    cd.is_case_of = vec![Reference::global("http://acplt.org/DataSpecifications/ConceptDescriptions/TestConceptDescription")];
    cd.iec61360 = Some(Iec61360Content {
        preferred_name: lang(&[("en-us", "Test Specification"), ("de", "Test Spezifikation")]),
        short_name: Some("TestSpec".to_string()),
        unit: Some("SpaceUnit".to_string()),
        source_of_definition: Some("http://acplt.org/DataSpec/ExampleDef".to_string()),
        symbol: Some("SU".to_string()),
        data_type: Some(Iec61360DataType::RealMeasure),
        definition: lang(&[("en-us", "Dummy Definition"), ("de", "Beispiel Definition")]),
        value_format: Some("string".to_string()),
        level_types: vec![Iec61360LevelType::Min, Iec61360LevelType::Max],
    });
    cd
}

pub fn create_example_shell() -> AssetAdministrationShell {
    let mut shell = AssetAdministrationShell::new(
        Identifier::iri(SHELL_ID),
        Reference::to_identifiable(KeyElements::Asset, &Identifier::iri(ASSET_ID)),
    );
    shell.referable = described("TestAssetAdministrationShell", "An example asset administration shell for the test application");
    shell.administration = Some(AdministrativeInformation {
        version: Some("0.9".to_string()),
        revision: Some("0".to_string()),
    });
    shell.derived_from = Some(Reference::to_identifiable(
        KeyElements::AssetAdministrationShell,
        &Identifier::new("https://acplt.org/TestAssetAdministrationShell2", IdentifierType::Iri),
    ));
    shell.submodels = [
        IDENTIFICATION_SUBMODEL_ID,
        BILL_OF_MATERIAL_SUBMODEL_ID,
        EXAMPLE_SUBMODEL_ID,
    ]
    .iter()
    .map(|id| Reference::to_identifiable(KeyElements::Submodel, &Identifier::iri(*id)))
    .collect();
    shell.views = vec![View {
        referable: described("ExampleView", "An example view"),
        semantic_id: Some(Reference::global("http://acplt.org/Views/ExampleView")),
        contained_elements: vec![element_reference(KeyElements::Property, "ExampleProperty")],
    }];
    shell.concept_dictionaries = vec![ConceptDictionary {
        referable: described("TestConceptDictionary", "An example concept dictionary for the test application"),
        concept_descriptions: vec![Reference::to_identifiable(
            KeyElements::ConceptDescription,
            &Identifier::iri(CONCEPT_DESCRIPTION_ID),
        )],
    }];
    shell
}

/// Store holding the example shell, its asset, three submodels and one
/// concept description
pub fn create_example_store() -> ObjectStore {
    let mut store = ObjectStore::new();
    store.insert_or_replace(create_identification_submodel());
    store.insert_or_replace(create_bill_of_material_submodel());
    store.insert_or_replace(create_example_asset());
    store.insert_or_replace(create_example_submodel());
    store.insert_or_replace(create_example_concept_description());
    store.insert_or_replace(create_example_shell());
    store
}

/// File store holding the content of the example File element under its value
pub fn example_files() -> Result<InMemoryFileStore, FileStoreError> {
    let mut files = InMemoryFileStore::new();
    files.add_bytes(MANUAL_PART, MANUAL_CONTENT, "application/pdf")?;
    Ok(files)
}
