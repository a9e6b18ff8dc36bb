use serde::{Deserialize, Serialize};

/// The Wikibase datatype a property was declared with, as loaded from the
/// offline property-metadata catalogue. Determines which RDF predicate
/// families (direct claim, statement value, qualifier, reference) the
/// serializer emits and whether a value needs a `wdv:` value node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Datatype {
    WikibaseItem,
    WikibaseProperty,
    String,
    Time,
    Quantity,
    GlobeCoordinate,
    Monolingualtext,
    ExternalId,
    CommonsMedia,
    GeoShape,
    TabularData,
    MusicalNotation,
    Url,
    Math,
    EntitySchema,
}

impl Datatype {
    /// Whether this datatype's statement value needs a structured `wdv:`
    /// value node (as opposed to a literal emitted directly via `ps:`).
    #[must_use]
    pub const fn needs_value_node(self) -> bool {
        matches!(self, Self::Time | Self::Quantity | Self::GlobeCoordinate)
    }
}

/// One property's RDF shape: its datatype, used by the serializer to decide
/// predicate families and value-node necessity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyShape {
    pub datatype: Datatype,
}
