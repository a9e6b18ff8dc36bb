//! Shared application state handed to every handler via `Extension<Arc<AppState>>`,
//! modelled on the teacher's `StorePool`/`AuthorizationApiPool` extension pattern
//! but collapsed to the two stateless trait objects this store actually needs.

use std::{collections::HashMap, sync::Arc};

use entity_store_core::{BlobStore, MetadataIndex};
use entity_store_types::PropertyShape;

/// The offline property-metadata catalogue the RDF serializer consults to
/// pick predicate families and value-node necessity (spec §4.G). Loaded
/// once at startup; the store never infers a property's datatype from the
/// data it is attached to.
pub type PropertyShapeCatalogue = HashMap<String, PropertyShape>;

pub struct AppState {
    pub index: Arc<dyn MetadataIndex>,
    pub blob: Arc<dyn BlobStore>,
    pub property_shapes: PropertyShapeCatalogue,
    pub repository_name: String,
    pub entity_base: String,
    pub data_base: String,
}

impl AppState {
    #[must_use]
    pub fn new(
        index: Arc<dyn MetadataIndex>,
        blob: Arc<dyn BlobStore>,
        property_shapes: PropertyShapeCatalogue,
        repository_name: impl Into<String>,
        entity_base: impl Into<String>,
        data_base: impl Into<String>,
    ) -> Self {
        Self {
            index,
            blob,
            property_shapes,
            repository_name: repository_name.into(),
            entity_base: entity_base.into(),
            data_base: data_base.into(),
        }
    }
}
