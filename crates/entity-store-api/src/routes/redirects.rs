//! `/redirects` and `/entities/{id}/revert-redirect` routes (spec §6),
//! thin wrappers over [`entity_store_core::redirects`].

use std::sync::Arc;

use axum::{extract::Path, response::Json, Extension};
use entity_store_core::redirects::{self, CreateRedirectRequest, RevertRedirectRequest};
use entity_store_types::EntityId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    routes::entity::EntityResponseDto,
    state::AppState,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRedirectRequestDto {
    pub redirect_from_id: String,
    pub redirect_to_id: String,
    pub created_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectResponseDto {
    pub redirect_from_id: String,
    pub redirect_to_id: String,
    pub revision_id: u64,
}

#[utoipa::path(
    post,
    path = "/redirects",
    request_body = CreateRedirectRequestDto,
    responses((status = 200, description = "Redirect created", body = RedirectResponseDto))
)]
#[tracing::instrument(level = "info", skip(state, request))]
pub async fn create_redirect(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreateRedirectRequestDto>,
) -> Result<Json<RedirectResponseDto>, ApiError> {
    let response = redirects::create_redirect(
        state.index.as_ref(),
        state.blob.as_ref(),
        CreateRedirectRequest {
            from: EntityId::from(request.redirect_from_id),
            to: EntityId::from(request.redirect_to_id),
            created_by: request.created_by,
        },
    )
    .await?;

    Ok(Json(RedirectResponseDto {
        redirect_from_id: response.redirect_from_id.into_string(),
        redirect_to_id: response.redirect_to_id.into_string(),
        revision_id: response.revision_id,
    }))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RevertRedirectRequestDto {
    pub revert_to_revision_id: u64,
    /// Recorded only in the access log, not in the revision itself — the
    /// store has no dedicated free-text annotation field on a revision.
    #[serde(default)]
    pub revert_reason: String,
    pub created_by: String,
}

#[utoipa::path(
    post,
    path = "/entities/{id}/revert-redirect",
    request_body = RevertRedirectRequestDto,
    responses((status = 200, description = "Redirect reverted"))
)]
#[tracing::instrument(level = "info", skip(state, request), fields(%id, revert_reason = %request.revert_reason))]
pub async fn revert_redirect(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<RevertRedirectRequestDto>,
) -> Result<Json<EntityResponseDto>, ApiError> {
    let response = redirects::revert_redirect(
        state.index.as_ref(),
        state.blob.as_ref(),
        RevertRedirectRequest {
            entity: EntityId::from(id),
            revert_to_revision_id: request.revert_to_revision_id,
            created_by: request.created_by,
        },
    )
    .await?;

    Ok(Json(response.into()))
}
