//! `GET /health` (spec §6): a liveness probe that round-trips one cheap
//! operation against each dependency rather than only checking process
//! liveness.

use std::sync::Arc;

use axum::{response::Json, Extension};
use entity_store_types::EntityId;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentHealth {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentHealth,
    pub blob_store: ComponentHealth,
    pub metadata_index: ComponentHealth,
}

const HEALTHCHECK_SENTINEL_ID: &str = "__entity_store_healthcheck__";

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Liveness probe", body = HealthResponse))
)]
#[tracing::instrument(level = "debug", skip(state))]
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let sentinel = EntityId::from(HEALTHCHECK_SENTINEL_ID);

    let metadata_index = if state.index.resolve(&sentinel).await.is_ok() {
        ComponentHealth::Ok
    } else {
        ComponentHealth::Degraded
    };

    let blob_store = if state.blob.read(&sentinel, 0).await.is_ok() {
        ComponentHealth::Ok
    } else {
        ComponentHealth::Degraded
    };

    let status = if metadata_index == ComponentHealth::Ok && blob_store == ComponentHealth::Ok {
        ComponentHealth::Ok
    } else {
        ComponentHealth::Degraded
    };

    Json(HealthResponse {
        status,
        blob_store,
        metadata_index,
    })
}
