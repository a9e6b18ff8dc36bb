//! `/entity`, `/entities`, and `/raw` routes (spec §6), grounded on
//! `main.py`'s `POST /entity` handler and the teacher's
//! `Extension<Arc<S>>` dependency-injection idiom.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use entity_store_core::pipeline::{self, WriteRequest};
use entity_store_types::{
    EditType, EntityDocument, EntityId, EntityKind, ProtectionFlags, RevisionRecord, SiteLink,
    Statement,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntityRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub descriptions: HashMap<String, String>,
    #[serde(default)]
    pub aliases: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub claims: HashMap<String, Vec<Statement>>,
    #[serde(default)]
    pub sitelinks: HashMap<String, SiteLink>,
    #[serde(default)]
    pub is_mass_edit: bool,
    #[serde(default)]
    pub edit_type: EditType,
    #[serde(default)]
    pub is_semi_protected: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_dangling: bool,
    #[serde(default)]
    pub is_mass_edit_protected: bool,
    #[serde(default)]
    pub is_not_autoconfirmed_user: bool,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntityResponseDto {
    pub id: String,
    pub revision_id: u64,
    pub data: EntityDocument,
    pub is_semi_protected: bool,
    pub is_locked: bool,
    pub is_archived: bool,
    pub is_dangling: bool,
    pub is_mass_edit_protected: bool,
}

impl From<pipeline::EntityResponse> for EntityResponseDto {
    fn from(response: pipeline::EntityResponse) -> Self {
        Self {
            id: response.id.into_string(),
            revision_id: response.revision_id,
            data: response.data,
            is_semi_protected: response.flags.is_semi_protected,
            is_locked: response.flags.is_locked,
            is_archived: response.flags.is_archived,
            is_dangling: response.flags.is_dangling,
            is_mass_edit_protected: response.flags.is_mass_edit_protected,
        }
    }
}

#[utoipa::path(
    post,
    path = "/entity",
    responses((status = 200, description = "Entity written (idempotent)"))
)]
#[tracing::instrument(level = "info", skip(state, request), fields(id = %request.id))]
pub async fn create_entity(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreateEntityRequest>,
) -> Result<Json<EntityResponseDto>, ApiError> {
    let document = EntityDocument {
        id: request.id.clone(),
        kind: request.kind,
        labels: request.labels,
        descriptions: request.descriptions,
        aliases: request.aliases,
        claims: request.claims,
        sitelinks: request.sitelinks,
    };

    let write_request = WriteRequest {
        document,
        created_by: request.created_by,
        is_mass_edit: request.is_mass_edit,
        edit_type: request.edit_type,
        flags: ProtectionFlags {
            is_semi_protected: request.is_semi_protected,
            is_locked: request.is_locked,
            is_archived: request.is_archived,
            is_dangling: request.is_dangling,
            is_mass_edit_protected: request.is_mass_edit_protected,
        },
        is_not_autoconfirmed_user: request.is_not_autoconfirmed_user,
        ..WriteRequest::default()
    };

    let response = pipeline::write(
        state.index.as_ref(),
        state.blob.as_ref(),
        EntityId::from(request.id),
        write_request,
    )
    .await?;

    Ok(Json(response.into()))
}

#[utoipa::path(
    get,
    path = "/entity/{id}",
    responses(
        (status = 200, description = "Current head revision"),
        (status = 404, description = "Entity is not registered"),
        (status = 410, description = "Entity has been hard-deleted"),
    )
)]
#[tracing::instrument(level = "debug", skip(state), fields(%id))]
pub async fn get_entity(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EntityResponseDto>, ApiError> {
    let response = pipeline::get(state.index.as_ref(), state.blob.as_ref(), &EntityId::from(id)).await?;
    Ok(Json(response.into()))
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryDto {
    pub revision_id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_mass_edit: bool,
    pub edit_type: EditType,
}

#[utoipa::path(
    get,
    path = "/entity/{id}/history",
    responses((status = 200, description = "Revision history, newest first"))
)]
#[tracing::instrument(level = "debug", skip(state), fields(%id))]
pub async fn get_history(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HistoryEntryDto>>, ApiError> {
    let external_id = EntityId::from(id);
    let internal_id = state
        .index
        .resolve(&external_id)
        .await
        .map_err(|report| report.change_context(entity_store_types::EntityStoreError::io_error("resolving entity id")))?
        .ok_or_else(|| {
            error_stack::Report::new(entity_store_types::EntityStoreError::not_found(
                external_id.as_str(),
            ))
        })?;

    let history = state
        .index
        .get_history(internal_id, u32::MAX)
        .await
        .map_err(|report| report.change_context(entity_store_types::EntityStoreError::io_error("reading history")))?;

    Ok(Json(
        history
            .into_iter()
            .map(|entry| HistoryEntryDto {
                revision_id: entry.revision_id,
                created_at: entry.created_at,
                is_mass_edit: entry.is_mass_edit,
                edit_type: entry.edit_type,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/entity/{id}/revision/{revision_id}",
    responses((status = 200, description = "Stored entity body at that revision"))
)]
#[tracing::instrument(level = "debug", skip(state), fields(%id, revision_id))]
pub async fn get_revision_body(
    Extension(state): Extension<Arc<AppState>>,
    Path((id, revision_id)): Path<(String, u64)>,
) -> Result<Json<EntityDocument>, ApiError> {
    let record = pipeline::get_revision(
        state.index.as_ref(),
        state.blob.as_ref(),
        &EntityId::from(id),
        revision_id,
    )
    .await?;
    Ok(Json(record.entity))
}

#[utoipa::path(
    get,
    path = "/raw/{id}/{revision_id}",
    responses((status = 200, description = "Full revision record"))
)]
#[tracing::instrument(level = "debug", skip(state), fields(%id, revision_id))]
pub async fn get_raw_revision(
    Extension(state): Extension<Arc<AppState>>,
    Path((id, revision_id)): Path<(String, u64)>,
) -> Result<Json<RevisionRecord>, ApiError> {
    let record = pipeline::get_revision(
        state.index.as_ref(),
        state.blob.as_ref(),
        &EntityId::from(id),
        revision_id,
    )
    .await?;
    Ok(Json(record))
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteKindDto {
    Soft,
    Hard,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteEntityRequest {
    pub delete_type: DeleteKindDto,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteEntityResponseDto {
    pub id: String,
    pub revision_id: u64,
    pub delete_type: DeleteKindDto,
    pub is_deleted: bool,
}

#[utoipa::path(
    delete,
    path = "/entity/{id}",
    request_body = DeleteEntityRequest,
    responses((status = 200, description = "Entity soft- or hard-deleted", body = DeleteEntityResponseDto))
)]
#[tracing::instrument(level = "info", skip(state, request), fields(%id))]
pub async fn delete_entity(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<DeleteEntityRequest>,
) -> Result<Json<DeleteEntityResponseDto>, ApiError> {
    let kind = match request.delete_type {
        DeleteKindDto::Soft => entity_store_core::redirects::DeleteKind::Soft,
        DeleteKindDto::Hard => entity_store_core::redirects::DeleteKind::Hard,
    };

    let response = entity_store_core::redirects::delete(
        state.index.as_ref(),
        state.blob.as_ref(),
        entity_store_core::redirects::DeleteRequest {
            entity: EntityId::from(id),
            created_by: request.created_by,
            kind,
        },
    )
    .await?;

    Ok(Json(DeleteEntityResponseDto {
        id: response.id.into_string(),
        revision_id: response.revision_id,
        delete_type: request.delete_type,
        is_deleted: response.is_deleted,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    pub status: Option<String>,
    pub edit_type: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: u32,
}

const fn default_list_limit() -> u32 {
    100
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListEntryDto {
    pub id: String,
}

#[utoipa::path(
    get,
    path = "/entities",
    params(ListQuery),
    responses((status = 200, description = "Entities matching the status/edit_type filter", body = [ListEntryDto]))
)]
#[tracing::instrument(level = "debug", skip(state))]
pub async fn list_entities(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ListEntryDto>>, ApiError> {
    let internal_ids = if let Some(status) = &query.status {
        let status = parse_status(status)?;
        let heads = state
            .index
            .list_by_status(status, query.limit)
            .await
            .map_err(|report| {
                report.change_context(entity_store_types::EntityStoreError::io_error("listing by status"))
            })?;
        heads.into_iter().map(|head| head.internal_id).collect::<Vec<_>>()
    } else if let Some(edit_type) = &query.edit_type {
        state
            .index
            .list_by_edit_type(&EditType::from_str_loose(edit_type), query.limit)
            .await
            .map_err(|report| {
                report.change_context(entity_store_types::EntityStoreError::io_error("listing by edit type"))
            })?
    } else {
        return Err(error_stack::Report::new(entity_store_types::EntityStoreError::bad_request(
            "one of `status` or `edit_type` is required",
        ))
        .into());
    };

    let mut entries = Vec::with_capacity(internal_ids.len());
    for internal_id in internal_ids {
        if let Some(external_id) = state.index.resolve_external(internal_id).await.map_err(|report| {
            report.change_context(entity_store_types::EntityStoreError::io_error("resolving external id"))
        })? {
            entries.push(ListEntryDto {
                id: external_id.into_string(),
            });
        }
    }

    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_every_known_status() {
        for (raw, expected) in [
            ("locked", entity_store_core::EntityStatus::Locked),
            ("semi_protected", entity_store_core::EntityStatus::SemiProtected),
            ("archived", entity_store_core::EntityStatus::Archived),
            ("dangling", entity_store_core::EntityStatus::Dangling),
            ("mass_edit_protected", entity_store_core::EntityStatus::MassEditProtected),
            ("deleted", entity_store_core::EntityStatus::Deleted),
        ] {
            assert_eq!(parse_status(raw).unwrap(), expected);
        }
    }

    #[test]
    fn parse_status_rejects_unknown_filter() {
        assert!(parse_status("not-a-status").is_err());
    }

    #[test]
    fn entity_response_dto_carries_protection_flags_through() {
        let response = pipeline::EntityResponse {
            id: EntityId::from("Q1"),
            revision_id: 7,
            data: EntityDocument::empty("Q1", EntityKind::Item),
            flags: ProtectionFlags {
                is_semi_protected: true,
                is_locked: false,
                is_archived: false,
                is_dangling: false,
                is_mass_edit_protected: true,
            },
        };

        let dto: EntityResponseDto = response.into();
        assert_eq!(dto.revision_id, 7);
        assert!(dto.is_semi_protected);
        assert!(dto.is_mass_edit_protected);
        assert!(!dto.is_locked);
    }
}

fn parse_status(raw: &str) -> Result<entity_store_core::EntityStatus, ApiError> {
    match raw {
        "locked" => Ok(entity_store_core::EntityStatus::Locked),
        "semi_protected" => Ok(entity_store_core::EntityStatus::SemiProtected),
        "archived" => Ok(entity_store_core::EntityStatus::Archived),
        "dangling" => Ok(entity_store_core::EntityStatus::Dangling),
        "mass_edit_protected" => Ok(entity_store_core::EntityStatus::MassEditProtected),
        "deleted" => Ok(entity_store_core::EntityStatus::Deleted),
        other => Err(error_stack::Report::new(entity_store_types::EntityStoreError::bad_request(format!(
            "unknown status filter: {other:?}"
        )))
        .into()),
    }
}
