//! The ID Registry (spec §4.A): the bidirectional mapping between external
//! and internal entity identifiers, physically owned by the `entity_id_mapping`
//! table inside the Metadata Index (spec §4.C groups registry operations
//! into the same store as the rest of the relational schema).

use async_trait::async_trait;
use entity_store_types::{EntityId, InternalId, RegistryError};
use error_stack::{Result, ResultExt as _};

/// Resolves and allocates the external-id ↔ internal-id mapping.
///
/// `register` must be safe to call concurrently for the same `external_id`:
/// exactly one caller's internal ID wins and is observable afterwards by
/// every caller, including the ones that raced and lost.
#[async_trait]
pub trait IdRegistry: Send + Sync {
    async fn resolve(&self, external_id: &EntityId) -> Result<Option<InternalId>, RegistryError>;

    async fn register(&self, external_id: &EntityId) -> Result<InternalId, RegistryError>;
}

/// Resolves `external_id`, registering a fresh internal ID if it is not yet
/// known. Used at the start of every write in the Revision Pipeline (§4.E
/// step 1).
#[tracing::instrument(level = "debug", skip(registry))]
pub async fn resolve_or_register(
    registry: &dyn IdRegistry,
    external_id: &EntityId,
) -> Result<(InternalId, bool), RegistryError> {
    if let Some(internal_id) = registry
        .resolve(external_id)
        .await
        .attach_printable_lazy(|| format!("resolving {external_id}"))?
    {
        return Ok((internal_id, false));
    }

    let internal_id = registry
        .register(external_id)
        .await
        .attach_printable_lazy(|| format!("registering {external_id}"))?;
    Ok((internal_id, true))
}
