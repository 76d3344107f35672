// SPDX-License-Identifier: MIT
//! Enum/tag registry
//!
//! Every enumerated domain of the metamodel maps bijectively onto the wire
//! tokens used by both document formats. The forward direction
//! ([`WireToken::token`]) is total; the inverse ([`WireToken::from_token`])
//! returns `None` for tokens the format does not define, which the decoders
//! turn into an `InvalidEnumToken` error.

use std::fmt;

/// A string token could not be mapped onto an enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {domain} token: {token}")]
pub struct UnknownToken {
    pub domain: &'static str,
    pub token: String,
}

/// Bidirectional mapping between an enum and its wire tokens
pub trait WireToken: Sized + Copy + 'static {
    /// Human-readable name of the enumerated domain, used in error messages
    const DOMAIN: &'static str;

    /// All values in declaration order
    fn all() -> &'static [Self];

    /// Wire token for this value
    fn token(self) -> &'static str;

    /// Inverse of [`WireToken::token`]
    fn from_token(token: &str) -> Option<Self>;

    fn parse_token(token: &str) -> Result<Self, UnknownToken> {
        Self::from_token(token).ok_or_else(|| UnknownToken {
            domain: Self::DOMAIN,
            token: token.to_string(),
        })
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($domain:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl WireToken for $name {
            const DOMAIN: &'static str = $domain;

            fn all() -> &'static [Self] {
                &[$( $name::$variant ),+]
            }

            fn token(self) -> &'static str {
                match self {
                    $( $name::$variant => $token ),+
                }
            }

            fn from_token(token: &str) -> Option<Self> {
                match token {
                    $( $token => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as WireToken>::parse_token(s)
            }
        }
    };
}

wire_enum! {
    /// Whether an element describes a template or a concrete instance
    #[derive(Default)]
    ModelingKind ("modeling kind") {
        Template => "Template",
        #[default]
        Instance => "Instance",
    }
}

wire_enum! {
    AssetKind ("asset kind") {
        Type => "Type",
        Instance => "Instance",
    }
}

wire_enum! {
    /// Element kind named by a reference key
    KeyElements ("key element") {
        Asset => "Asset",
        AssetAdministrationShell => "AssetAdministrationShell",
        ConceptDescription => "ConceptDescription",
        Submodel => "Submodel",
        AnnotatedRelationshipElement => "AnnotatedRelationshipElement",
        BasicEvent => "BasicEvent",
        Blob => "Blob",
        Capability => "Capability",
        ConceptDictionary => "ConceptDictionary",
        DataElement => "DataElement",
        Entity => "Entity",
        Event => "Event",
        File => "File",
        MultiLanguageProperty => "MultiLanguageProperty",
        Operation => "Operation",
        Property => "Property",
        Range => "Range",
        ReferenceElement => "ReferenceElement",
        RelationshipElement => "RelationshipElement",
        SubmodelElement => "SubmodelElement",
        SubmodelElementCollection => "SubmodelElementCollection",
        View => "View",
        GlobalReference => "GlobalReference",
        FragmentReference => "FragmentReference",
    }
}

impl KeyElements {
    /// Kinds that denote a top-level Identifiable
    pub fn is_identifiable(self) -> bool {
        matches!(
            self,
            KeyElements::Asset
                | KeyElements::AssetAdministrationShell
                | KeyElements::ConceptDescription
                | KeyElements::Submodel
        )
    }

    /// Kinds that denote a data element
    pub fn is_data_element(self) -> bool {
        matches!(
            self,
            KeyElements::DataElement
                | KeyElements::Property
                | KeyElements::MultiLanguageProperty
                | KeyElements::Range
                | KeyElements::Blob
                | KeyElements::File
                | KeyElements::ReferenceElement
        )
    }

    /// Kinds that name something outside the model graph
    pub fn is_external(self) -> bool {
        matches!(
            self,
            KeyElements::GlobalReference | KeyElements::FragmentReference
        )
    }
}

wire_enum! {
    KeyType ("key type") {
        Custom => "Custom",
        Irdi => "IRDI",
        Iri => "IRI",
        IdShort => "IdShort",
        FragmentId => "FragmentId",
    }
}

wire_enum! {
    IdentifierType ("identifier type") {
        Custom => "Custom",
        Irdi => "IRDI",
        Iri => "IRI",
    }
}

impl IdentifierType {
    /// Key type used when a key points at an identifier of this kind
    pub fn key_type(self) -> KeyType {
        match self {
            IdentifierType::Custom => KeyType::Custom,
            IdentifierType::Irdi => KeyType::Irdi,
            IdentifierType::Iri => KeyType::Iri,
        }
    }

    /// Inverse of [`IdentifierType::key_type`]; local key types have no identifier kind
    pub fn from_key_type(key_type: KeyType) -> Option<Self> {
        match key_type {
            KeyType::Custom => Some(IdentifierType::Custom),
            KeyType::Irdi => Some(IdentifierType::Irdi),
            KeyType::Iri => Some(IdentifierType::Iri),
            KeyType::IdShort | KeyType::FragmentId => None,
        }
    }
}

wire_enum! {
    EntityType ("entity type") {
        CoManagedEntity => "CoManagedEntity",
        SelfManagedEntity => "SelfManagedEntity",
    }
}

wire_enum! {
    /// IEC 61360 data types of a concept description
    Iec61360DataType ("IEC 61360 data type") {
        Date => "DATE",
        String => "STRING",
        StringTranslatable => "STRING_TRANSLATABLE",
        RealMeasure => "REAL_MEASURE",
        RealCount => "REAL_COUNT",
        RealCurrency => "REAL_CURRENCY",
        Boolean => "BOOLEAN",
        Url => "URL",
        Rational => "RATIONAL",
        RationalMeasure => "RATIONAL_MEASURE",
        Time => "TIME",
        Timestamp => "TIMESTAMP",
    }
}

wire_enum! {
    Iec61360LevelType ("IEC 61360 level type") {
        Min => "Min",
        Max => "Max",
        Nom => "Nom",
        Typ => "Typ",
    }
}
