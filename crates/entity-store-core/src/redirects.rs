//! The Redirect & Delete Controller (spec §4.F): specializations of the
//! Revision Pipeline for the two non-standard lifecycles. Grounded on
//! `redirects.py`'s `RedirectService.create_redirect`/`revert_redirect`.

use entity_store_types::{EditType, EntityDocument, EntityId, EntityStoreError, ProtectionFlags};
use error_stack::{Result, ResultExt as _};

use crate::{
    blob::BlobStore,
    pipeline::{self, EntityResponse, WriteRequest},
    protection::admit_redirect_target,
    store::MetadataIndex,
};

#[derive(Debug, Clone)]
pub struct CreateRedirectRequest {
    pub from: EntityId,
    pub to: EntityId,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectResponse {
    pub redirect_from_id: EntityId,
    pub redirect_to_id: EntityId,
    pub revision_id: u64,
}

/// Creates a redirect from `request.from` to `request.to`.
#[tracing::instrument(level = "info", skip(index, blob, request))]
pub async fn create_redirect(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    request: CreateRedirectRequest,
) -> Result<RedirectResponse, EntityStoreError> {
    if request.from == request.to {
        return Err(error_stack::Report::new(EntityStoreError::bad_request(
            "an entity cannot redirect to itself",
        )));
    }

    let from_internal = index
        .resolve(&request.from)
        .await
        .change_context(EntityStoreError::io_error("resolving redirect source"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.from.as_str())))?;

    let to_internal = index
        .resolve(&request.to)
        .await
        .change_context(EntityStoreError::io_error("resolving redirect target"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.to.as_str())))?;

    let from_head = index
        .get_head(from_internal)
        .await
        .change_context(EntityStoreError::io_error("reading redirect source head"))?;

    if let Some(head) = &from_head {
        if head.is_deleted {
            return Err(error_stack::Report::new(EntityStoreError::locked_like(
                "redirect source is deleted",
            )));
        }
        if head.is_redirect {
            return Err(error_stack::Report::new(EntityStoreError::conflict(
                "entity already redirects elsewhere",
            )));
        }
    }

    let to_head = index
        .get_head(to_internal)
        .await
        .change_context(EntityStoreError::io_error("reading redirect target head"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.to.as_str())))?;

    if to_head.is_deleted {
        return Err(error_stack::Report::new(EntityStoreError::locked_like(
            "redirect target is deleted",
        )));
    }
    if let Some(reason) = admit_redirect_target(&to_head.flags) {
        return Err(error_stack::Report::new(EntityStoreError::locked_like(reason)));
    }

    let write_request = WriteRequest {
        document: EntityDocument::empty(request.from.as_str(), entity_store_types::EntityKind::Item),
        created_by: request.created_by.clone(),
        edit_type: EditType::RedirectCreate,
        flags: from_head.as_ref().map_or_else(ProtectionFlags::default, |head| head.flags),
        redirect_target: Some((to_internal, request.to.clone())),
        ..WriteRequest::default()
    };

    // Per spec §4.F, redirect creation always produces a new revision: skip
    // steps 1–5 (identity/idempotency/admission already handled above) and
    // go straight to 6–11.
    let response =
        pipeline::commit_revision(index, blob, request.from.clone(), from_internal, from_head, write_request)
            .await?;

    index
        .create_redirect_edge(from_internal, to_internal, &request.created_by)
        .await
        .change_context(EntityStoreError::io_error("creating redirect edge"))?;
    index
        .set_redirect_target(from_internal, Some(to_internal))
        .await
        .change_context(EntityStoreError::io_error("setting redirect target"))?;

    Ok(RedirectResponse {
        redirect_from_id: request.from,
        redirect_to_id: request.to,
        revision_id: response.revision_id,
    })
}

#[derive(Debug, Clone)]
pub struct RevertRedirectRequest {
    pub entity: EntityId,
    pub revert_to_revision_id: u64,
    pub created_by: String,
}

/// Reverts `request.entity` from a redirect back to a standalone entity,
/// restoring the body of `revert_to_revision_id`.
#[tracing::instrument(level = "info", skip(index, blob, request))]
pub async fn revert_redirect(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    request: RevertRedirectRequest,
) -> Result<EntityResponse, EntityStoreError> {
    let internal_id = index
        .resolve(&request.entity)
        .await
        .change_context(EntityStoreError::io_error("resolving entity id"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.entity.as_str())))?;

    let head = index
        .get_head(internal_id)
        .await
        .change_context(EntityStoreError::io_error("reading head"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.entity.as_str())))?;

    if head.redirects_to.is_none() {
        return Err(error_stack::Report::new(EntityStoreError::not_found(
            "entity is not a redirect",
        )));
    }
    if head.is_deleted {
        return Err(error_stack::Report::new(EntityStoreError::locked_like(
            "entity is deleted",
        )));
    }
    if let Some(reason) = admit_redirect_target(&head.flags) {
        return Err(error_stack::Report::new(EntityStoreError::locked_like(reason)));
    }

    let historical = index
        .get_history(internal_id, u32::MAX)
        .await
        .change_context(EntityStoreError::io_error("reading history"))?;
    if !historical
        .iter()
        .any(|entry| entry.revision_id == request.revert_to_revision_id)
    {
        return Err(error_stack::Report::new(EntityStoreError::not_found(format!(
            "revision {} of {}",
            request.revert_to_revision_id, request.entity
        ))));
    }

    let target_record = blob
        .read(&request.entity, request.revert_to_revision_id)
        .await
        .change_context(EntityStoreError::io_error("reading historical revision"))?
        .ok_or_else(|| {
            error_stack::Report::new(EntityStoreError::not_found(format!(
                "revision {} of {}",
                request.revert_to_revision_id, request.entity
            )))
        })?;

    let write_request = WriteRequest {
        document: target_record.entity,
        created_by: request.created_by.clone(),
        edit_type: EditType::RedirectRevert,
        flags: head.flags,
        ..WriteRequest::default()
    };

    let response =
        pipeline::commit_revision(index, blob, request.entity.clone(), internal_id, Some(head), write_request)
            .await?;

    index
        .set_redirect_target(internal_id, None)
        .await
        .change_context(EntityStoreError::io_error("clearing redirect target"))?;

    Ok(response)
}

/// `request_flags.is_deleted` distinguishes soft vs hard delete; both reuse
/// the pipeline's normal write path with an `is_deleted=true` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteKind {
    Soft,
    Hard,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub entity: EntityId,
    pub created_by: String,
    pub kind: DeleteKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteResponse {
    pub id: EntityId,
    pub revision_id: u64,
    pub is_deleted: bool,
}

#[tracing::instrument(level = "info", skip(index, blob, request))]
pub async fn delete(
    index: &dyn MetadataIndex,
    blob: &dyn BlobStore,
    request: DeleteRequest,
) -> Result<DeleteResponse, EntityStoreError> {
    let internal_id = index
        .resolve(&request.entity)
        .await
        .change_context(EntityStoreError::io_error("resolving entity id"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.entity.as_str())))?;

    let head = index
        .get_head(internal_id)
        .await
        .change_context(EntityStoreError::io_error("reading head"))?
        .ok_or_else(|| error_stack::Report::new(EntityStoreError::not_found(request.entity.as_str())))?;

    if head.is_deleted {
        return Err(error_stack::Report::new(EntityStoreError::Gone));
    }

    let current = blob
        .read(&request.entity, head.head_revision_id)
        .await
        .change_context(EntityStoreError::io_error("reading head revision"))?
        .ok_or_else(|| {
            error_stack::Report::new(EntityStoreError::io_error(
                "head points at a missing revision blob",
            ))
        })?;

    let edit_type = match request.kind {
        DeleteKind::Soft => EditType::SoftDelete,
        DeleteKind::Hard => EditType::HardDelete,
    };

    let write_request = WriteRequest {
        document: current.entity,
        created_by: request.created_by.clone(),
        edit_type,
        flags: head.flags,
        is_deleted: true,
        ..WriteRequest::default()
    };

    let response =
        pipeline::commit_revision(index, blob, request.entity.clone(), internal_id, Some(head), write_request)
            .await?;

    let is_deleted = match request.kind {
        DeleteKind::Soft => false,
        DeleteKind::Hard => {
            index
                .hard_delete_entity(internal_id, response.revision_id)
                .await
                .change_context(EntityStoreError::io_error("hard-deleting entity"))?;
            true
        }
    };

    Ok(DeleteResponse {
        id: request.entity,
        revision_id: response.revision_id,
        is_deleted,
    })
}

#[cfg(test)]
mod tests {
    use entity_store_types::EntityKind;

    use super::*;
    use crate::{ids_registry::IdRegistry, test_support::{InMemoryBlob, InMemoryIndex}};

    /// Seeds `id` with a labelled body, distinct from the empty placeholder
    /// documents the redirect/revert paths write, so those writes aren't
    /// mistaken for idempotent resubmissions of the seeded revision.
    async fn seed(index: &InMemoryIndex, blob: &InMemoryBlob, id: &str) {
        let mut document = EntityDocument::empty(id, EntityKind::Item);
        document.labels.insert("en".to_owned(), format!("entity {id}"));
        pipeline::write(
            index,
            blob,
            EntityId::from(id),
            WriteRequest {
                document,
                created_by: "tester".to_owned(),
                ..WriteRequest::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn create_redirect_points_the_source_at_the_target() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;
        seed(&index, &blob, "Q2").await;

        let response = create_redirect(
            &index,
            &blob,
            CreateRedirectRequest {
                from: EntityId::from("Q1"),
                to: EntityId::from("Q2"),
                created_by: "tester".to_owned(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.redirect_from_id, EntityId::from("Q1"));
        assert_eq!(response.redirect_to_id, EntityId::from("Q2"));
        assert_eq!(response.revision_id, 2);

        let from_internal = index.resolve(&EntityId::from("Q1")).await.unwrap().unwrap();
        let to_internal = index.resolve(&EntityId::from("Q2")).await.unwrap().unwrap();
        let head = index.get_head(from_internal).await.unwrap().unwrap();
        assert!(head.is_redirect);
        assert_eq!(head.redirects_to, Some(to_internal));

        let incoming = index.get_incoming_redirects(to_internal).await.unwrap();
        assert_eq!(incoming, vec![from_internal]);
    }

    #[tokio::test]
    async fn create_redirect_rejects_self_redirect() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;

        let error = create_redirect(
            &index,
            &blob,
            CreateRedirectRequest {
                from: EntityId::from("Q1"),
                to: EntityId::from("Q1"),
                created_by: "tester".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error.current_context(), EntityStoreError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn create_redirect_requires_an_existing_target() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;

        let error = create_redirect(
            &index,
            &blob,
            CreateRedirectRequest {
                from: EntityId::from("Q1"),
                to: EntityId::from("Q404"),
                created_by: "tester".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error.current_context(), EntityStoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn revert_redirect_restores_the_pre_redirect_body() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;
        seed(&index, &blob, "Q2").await;

        create_redirect(
            &index,
            &blob,
            CreateRedirectRequest {
                from: EntityId::from("Q1"),
                to: EntityId::from("Q2"),
                created_by: "tester".to_owned(),
            },
        )
        .await
        .unwrap();

        let response = revert_redirect(
            &index,
            &blob,
            RevertRedirectRequest {
                entity: EntityId::from("Q1"),
                revert_to_revision_id: 1,
                created_by: "tester".to_owned(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.revision_id, 3);
        assert_eq!(response.data.id, "Q1");
        assert_eq!(response.data.labels.get("en"), Some(&"entity Q1".to_owned()));

        let internal_id = index.resolve(&EntityId::from("Q1")).await.unwrap().unwrap();
        let head = index.get_head(internal_id).await.unwrap().unwrap();
        assert!(!head.is_redirect);
        assert_eq!(head.redirects_to, None);
    }

    #[tokio::test]
    async fn revert_redirect_rejects_a_non_redirect_entity() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;

        let error = revert_redirect(
            &index,
            &blob,
            RevertRedirectRequest {
                entity: EntityId::from("Q1"),
                revert_to_revision_id: 1,
                created_by: "tester".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error.current_context(), EntityStoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn soft_delete_leaves_the_entity_readable_and_writable() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;

        let response = delete(
            &index,
            &blob,
            DeleteRequest {
                entity: EntityId::from("Q1"),
                created_by: "tester".to_owned(),
                kind: DeleteKind::Soft,
            },
        )
        .await
        .unwrap();

        assert!(!response.is_deleted);

        // Still readable: soft delete only tags the revision, it does not
        // flip the head's terminal `is_deleted` gate.
        let get_response = pipeline::get(&index, &blob, &EntityId::from("Q1")).await.unwrap();
        assert_eq!(get_response.revision_id, response.revision_id);

        // Still writable: a further write effectively undeletes.
        let mut document = get_response.data;
        document.labels.insert("en".to_owned(), "revived".to_owned());
        let write_response = pipeline::write(
            &index,
            &blob,
            EntityId::from("Q1"),
            WriteRequest {
                document,
                created_by: "tester".to_owned(),
                ..WriteRequest::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(write_response.revision_id, response.revision_id + 1);
    }

    #[tokio::test]
    async fn hard_delete_reports_is_deleted_true() {
        let index = InMemoryIndex::default();
        let blob = InMemoryBlob::default();
        seed(&index, &blob, "Q1").await;

        let response = delete(
            &index,
            &blob,
            DeleteRequest {
                entity: EntityId::from("Q1"),
                created_by: "tester".to_owned(),
                kind: DeleteKind::Hard,
            },
        )
        .await
        .unwrap();

        assert!(response.is_deleted);
    }
}
