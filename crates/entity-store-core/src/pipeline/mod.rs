//! The Revision Pipeline (spec §4.E): the twelve-step algorithm that turns
//! an incoming write into a durable new head revision. Grounded directly
//! on `main.py`'s `POST /entity` handler body.

use entity_store_types::{
    content_hash, EditType, EntityDocument, EntityId, EntityStoreError, HeadRow, InternalId,
    ProtectionFlags, PublicationState, RevisionRecord, CURRENT_SCHEMA_VERSION,
};
use error_stack::{Result, ResultExt as _};
use time::OffsetDateTime;

use crate::{
    blob::BlobStore,
    protection::{admit, RequestFlags},
    store::MetadataIndex,
};

/// One incoming write, already parsed into the internal entity/value model.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub document: EntityDocument,
    pub created_by: String,
    pub is_mass_edit: bool,
    pub edit_type: EditType,
    pub flags: ProtectionFlags,
    pub is_not_autoconfirmed_user: bool,
    /// Set by the Redirect & Delete Controller on soft/hard delete writes to
    /// tag the resulting revision record. Does not by itself gate reads —
    /// only `hard_delete_entity` flipping the head row does that (see
    /// [`commit_revision`]).
    pub is_deleted: bool,
    /// Set by the Redirect & Delete Controller when this write establishes
    /// (or clears) a redirect: the target's internal id (for the head row)
    /// paired with its external id (for the stored document).
    pub redirect_target: Option<(InternalId, EntityId)>,
}

impl Default for WriteRequest {
    fn default() -> Self {
        Self {
            document: EntityDocument::empty(String::new(), entity_store_types::EntityKind::Item),
            created_by: String::new(),
            is_mass_edit: false,
            edit_type: EditType::Unspecified,
            flags: ProtectionFlags::default(),
            is_not_autoconfirmed_user: false,
            is_deleted: false,
            redirect_target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityResponse {
    pub id: EntityId,
    pub revision_id: u64,
    pub data: EntityDocument,
    pub flags: ProtectionFlags,
}

/// Runs the full §4.E algorithm for `external_id`. This is the only entry
/// point the REST layer's `POST /entity` handler calls.
#[tracing::instrument(level = "info", skip(index, blob, request), fields(%external_id))]
pub async fn write(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    external_id: EntityId,
    request: WriteRequest,
) -> Result<EntityResponse, EntityStoreError> {
    // Step 1: resolve identity.
    let existing_id = index
        .resolve(&external_id)
        .await
        .change_context(EntityStoreError::io_error("resolving entity id"))?;

    let (internal_id, current_head) = match existing_id {
        Some(internal_id) => {
            let head = index
                .get_head(internal_id)
                .await
                .change_context(EntityStoreError::io_error("reading head"))?;
            (internal_id, head)
        }
        None => {
            let internal_id = index
                .register(&external_id)
                .await
                .change_context(EntityStoreError::io_error("registering entity id"))?;
            (internal_id, None)
        }
    };

    // Step 2: deletion guard.
    if let Some(head) = &current_head {
        if head.is_deleted {
            return Err(error_stack::Report::new(EntityStoreError::Gone));
        }
    }

    // Step 3: content hash.
    let document_value = serde_json::to_value(&request.document)
        .change_context(EntityStoreError::bad_request("entity document is not valid json"))?;
    let hash = content_hash(&document_value);

    // Step 4: idempotency check (blob-read failure is swallowed).
    if let Some(head) = &current_head {
        if let Ok(Some(head_record)) = blob.read(&external_id, head.head_revision_id).await {
            if head_record.content_hash == hash {
                return Ok(EntityResponse {
                    id: external_id,
                    revision_id: head.head_revision_id,
                    data: head_record.entity,
                    flags: head.flags,
                });
            }
        }
    }

    // Step 5: protection admission.
    if let Some(head) = &current_head {
        if let Some(reason) = admit(
            &head.flags,
            &RequestFlags {
                is_mass_edit: request.is_mass_edit,
                is_not_autoconfirmed_user: request.is_not_autoconfirmed_user,
            },
        ) {
            return Err(error_stack::Report::new(EntityStoreError::forbidden(reason)));
        }
    }

    commit_revision(index, blob, external_id, internal_id, current_head, request).await
}

/// Steps 6–11 of §4.E: allocate a revision id, write it, and publish it via
/// CAS. The Redirect & Delete Controller calls this directly, skipping the
/// identity-resolution, deletion-guard, idempotency and admission steps
/// above — those lifecycles run their own versions of those checks against
/// the rules of §4.F and always produce a new revision (spec §4.F: "Use E
/// steps 6–11").
#[tracing::instrument(level = "info", skip(index, blob, current_head, request), fields(%external_id))]
pub(crate) async fn commit_revision(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    external_id: EntityId,
    internal_id: InternalId,
    current_head: Option<HeadRow>,
    request: WriteRequest,
) -> Result<EntityResponse, EntityStoreError> {
    // Step 3 (recomputed here for the record; no idempotency short-circuit).
    let document_value = serde_json::to_value(&request.document)
        .change_context(EntityStoreError::bad_request("entity document is not valid json"))?;
    let hash = content_hash(&document_value);

    // Step 6: allocate revision id.
    let expected_head = current_head.as_ref().map_or(0, |head| head.head_revision_id);
    let new_revision_id = expected_head + 1;

    // Step 7: build record.
    let created_at = OffsetDateTime::now_utc();
    let record = RevisionRecord {
        schema_version: CURRENT_SCHEMA_VERSION,
        revision_id: new_revision_id,
        created_at,
        created_by: request.created_by.clone(),
        is_mass_edit: request.is_mass_edit,
        edit_type: request.edit_type.clone(),
        entity_type: request.document.kind,
        is_semi_protected: request.flags.is_semi_protected,
        is_locked: request.flags.is_locked,
        is_archived: request.flags.is_archived,
        is_dangling: request.flags.is_dangling,
        is_mass_edit_protected: request.flags.is_mass_edit_protected,
        is_deleted: request.is_deleted,
        is_redirect: request.redirect_target.is_some(),
        entity: request.document.clone(),
        content_hash: hash,
        redirects_to: request
            .redirect_target
            .as_ref()
            .map(|(_, external)| external.to_string()),
    };

    // Step 8: write pending blob.
    blob.write(&external_id, new_revision_id, &record, PublicationState::Pending)
        .await
        .change_context(EntityStoreError::io_error("writing pending revision blob"))?;

    // Step 9: insert revision metadata (idempotent).
    index
        .insert_revision(
            internal_id,
            new_revision_id,
            created_at,
            request.is_mass_edit,
            &request.edit_type,
        )
        .await
        .change_context(EntityStoreError::io_error("inserting revision metadata"))?;

    // Per spec §3/§4.F, `head_row.is_deleted` means *hard* deleted: it is
    // only ever flipped by `hard_delete_entity`. A soft delete tags the
    // revision record (`request.is_deleted`) but leaves the head, and thus
    // readability, untouched.
    let new_head = HeadRow {
        internal_id,
        head_revision_id: new_revision_id,
        flags: request.flags,
        is_deleted: current_head.as_ref().is_some_and(|head| head.is_deleted),
        is_redirect: request.redirect_target.is_some(),
        redirects_to: request.redirect_target.as_ref().map(|(id, _)| *id),
    };

    // Step 10: publish via CAS.
    let published = if current_head.is_none() {
        index
            .insert_head_with_status(&new_head)
            .await
            .change_context(EntityStoreError::io_error("inserting head row"))?
    } else {
        index
            .cas_update_head(expected_head, &new_head)
            .await
            .change_context(EntityStoreError::io_error("CAS-updating head row"))?
    };

    if !published {
        return Err(error_stack::Report::new(EntityStoreError::conflict(
            "another writer advanced the head concurrently",
        )));
    }

    // Step 11: mark blob published (best-effort).
    if let Err(error) = blob.mark_published(&external_id, new_revision_id).await {
        tracing::warn!(%error, %external_id, new_revision_id, "failed to mark revision published");
    }

    // Step 12: return.
    Ok(EntityResponse {
        id: external_id,
        revision_id: new_revision_id,
        data: record.entity,
        flags: request.flags,
    })
}

/// Reads a single entity at its current head (`GET /entity/{id}`).
#[tracing::instrument(level = "debug", skip(index, blob), fields(%external_id))]
pub async fn get(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    external_id: &EntityId,
) -> Result<EntityResponse, EntityStoreError> {
    let internal_id = index
        .resolve(external_id)
        .await
        .change_context(EntityStoreError::io_error("resolving entity id"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(external_id.as_str())))?;

    let head = index
        .get_head(internal_id)
        .await
        .change_context(EntityStoreError::io_error("reading head"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(external_id.as_str())))?;

    if head.is_deleted {
        return Err(error_stack::Report::new(EntityStoreError::Gone));
    }

    let record = blob
        .read(external_id, head.head_revision_id)
        .await
        .change_context(EntityStoreError::io_error("reading head revision blob"))?
        .ok_or_else(|| {
            error_stack::Report::new(EntityStoreError::io_error(
                "head points at a missing revision blob",
            ))
        })?;

    Ok(EntityResponse {
        id: external_id.clone(),
        revision_id: head.head_revision_id,
        data: record.entity,
        flags: head.flags,
    })
}

/// Reads one specific historical revision (`GET /entity/{id}/revision/{rev}`
/// and `/raw/{id}/{rev}`).
#[tracing::instrument(level = "debug", skip(index, blob), fields(%external_id, revision_id))]
pub async fn get_revision(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    external_id: &EntityId,
    revision_id: u64,
) -> Result<RevisionRecord, EntityStoreError> {
    index
        .resolve(external_id)
        .await
        .change_context(EntityStoreError::io_error("resolving entity id"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(external_id.as_str())))?;

    blob.read(external_id, revision_id)
        .await
        .change_context(EntityStoreError::io_error("reading revision blob"))?
        .ok_or_else(|| {
            error_stack::Report::new(EntityStoreError::not_found(format!(
                "revision {revision_id} of {external_id}"
            )))
        })
}

#[cfg(test)]
mod tests {
    use entity_store_types::EntityKind;

    use super::*;
    use crate::{ids_registry::IdRegistry, test_support::{InMemoryBlob, InMemoryIndex}};

    fn request(document: EntityDocument) -> WriteRequest {
        WriteRequest {
            document,
            created_by: "tester".to_owned(),
            ..WriteRequest::default()
        }
    }

    #[tokio::test]
    async fn first_write_creates_revision_one() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        let document = EntityDocument::empty("Q1", EntityKind::Item);

        let response = write(&index, &blob, EntityId::from("Q1"), request(document))
            .await
            .unwrap();

        assert_eq!(response.revision_id, 1);
        assert_eq!(response.id, EntityId::from("Q1"));
    }

    #[tokio::test]
    async fn identical_resubmission_is_idempotent() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        let document = EntityDocument::empty("Q1", EntityKind::Item);

        let first = write(&index, &blob, EntityId::from("Q1"), request(document.clone()))
            .await
            .unwrap();
        let second = write(&index, &blob, EntityId::from("Q1"), request(document))
            .await
            .unwrap();

        assert_eq!(first.revision_id, second.revision_id);
    }

    #[tokio::test]
    async fn changed_document_advances_the_head() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        let mut first_document = EntityDocument::empty("Q1", EntityKind::Item);
        write(&index, &blob, EntityId::from("Q1"), request(first_document.clone()))
            .await
            .unwrap();

        first_document.labels.insert("en".to_owned(), "hello".to_owned());
        let response = write(&index, &blob, EntityId::from("Q1"), request(first_document))
            .await
            .unwrap();

        assert_eq!(response.revision_id, 2);
    }

    #[tokio::test]
    async fn archived_entity_rejects_further_writes() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        let document = EntityDocument::empty("Q1", EntityKind::Item);
        write(&index, &blob, EntityId::from("Q1"), request(document.clone()))
            .await
            .unwrap();

        let internal_id = index.resolve(&EntityId::from("Q1")).await.unwrap().unwrap();
        let mut head = index.get_head(internal_id).await.unwrap().unwrap();
        head.flags.is_archived = true;
        index.cas_update_head(head.head_revision_id, &head).await.unwrap();

        let mut changed = document;
        changed.labels.insert("en".to_owned(), "hello".to_owned());
        let error = write(&index, &blob, EntityId::from("Q1"), request(changed))
            .await
            .unwrap_err();
        assert!(matches!(
            error.current_context(),
            EntityStoreError::Forbidden { reason } if reason.as_str() == "archived"
        ));
    }

    #[tokio::test]
    async fn deleted_entity_is_gone() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        let document = EntityDocument::empty("Q1", EntityKind::Item);
        write(&index, &blob, EntityId::from("Q1"), request(document.clone()))
            .await
            .unwrap();

        let internal_id = index.resolve(&EntityId::from("Q1")).await.unwrap().unwrap();
        let mut head = index.get_head(internal_id).await.unwrap().unwrap();
        head.is_deleted = true;
        index.cas_update_head(head.head_revision_id, &head).await.unwrap();

        let error = get(&index, &blob, &EntityId::from("Q1")).await.unwrap_err();
        assert_eq!(error.current_context(), &EntityStoreError::Gone);
    }

    #[tokio::test]
    async fn get_revision_reads_a_historical_body() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        let mut document = EntityDocument::empty("Q1", EntityKind::Item);
        write(&index, &blob, EntityId::from("Q1"), request(document.clone()))
            .await
            .unwrap();

        document.labels.insert("en".to_owned(), "hello".to_owned());
        write(&index, &blob, EntityId::from("Q1"), request(document))
            .await
            .unwrap();

        let historical = get_revision(&index, &blob, &EntityId::from("Q1"), 1).await.unwrap();
        assert_eq!(historical.revision_id, 1);
        assert!(historical.entity.labels.is_empty());
    }

    #[tokio::test]
    async fn unknown_entity_is_not_found() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();

        let error = get(&index, &blob, &EntityId::from("Q404")).await.unwrap_err();
        assert!(matches!(error.current_context(), EntityStoreError::NotFound { .. }));
    }
}
