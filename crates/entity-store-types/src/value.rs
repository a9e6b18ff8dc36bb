use serde::{Deserialize, Serialize};

/// One Wikibase snak value, tagged by datatype.
///
/// This mirrors the variant set a snak's `datatype` field selects between;
/// the store treats every variant as opaque payload except where the RDF
/// serializer or the protection/CAS machinery needs to inspect a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Value {
    Entity {
        id: String,
    },
    String {
        value: String,
    },
    Time {
        value: String,
        timezone: i32,
        before: u32,
        after: u32,
        precision: u8,
        calendarmodel: String,
    },
    Quantity {
        amount: String,
        unit: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper_bound: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower_bound: Option<String>,
    },
    GlobeCoordinate {
        latitude: f64,
        longitude: f64,
        precision: f64,
        globe: String,
    },
    Monolingual {
        text: String,
        language: String,
    },
    ExternalId {
        value: String,
    },
    CommonsMedia {
        value: String,
    },
    GeoShape {
        value: String,
    },
    TabularData {
        value: String,
    },
    MusicalNotation {
        value: String,
    },
    Url {
        value: String,
    },
    Math {
        value: String,
    },
    EntitySchema {
        id: String,
    },
    NoValue,
    SomeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Preferred,
    Normal,
    Deprecated,
}

impl Default for Rank {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualifier {
    pub property: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnak {
    pub property: String,
    pub value: Value,
}

/// A statement reference, keyed by a caller-supplied 40-hex-char hash.
///
/// The hash is never recomputed by the store; it is treated as an opaque
/// caller-supplied identity used only to build the `wdref:` URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub hash: String,
    pub snaks: Vec<ReferenceSnak>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub property: String,
    pub value: Value,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub references: Vec<Reference>,
    pub statement_id: String,
}
