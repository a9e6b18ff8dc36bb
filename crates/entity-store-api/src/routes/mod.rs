pub mod entity;
pub mod health;
pub mod rdf;
pub mod redirects;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full route tree (spec §6), wired behind the teacher's
/// `Extension<Arc<AppState>>` dependency-injection pattern.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/entity", post(entity::create_entity))
        .route(
            "/entity/:id",
            get(entity::get_entity).delete(entity::delete_entity),
        )
        .route("/entity/:id/history", get(entity::get_history))
        .route("/entity/:id/revision/:revision_id", get(entity::get_revision_body))
        .route("/raw/:id/:revision_id", get(entity::get_raw_revision))
        .route("/entities", get(entity::list_entities))
        .route("/redirects", post(redirects::create_redirect))
        .route("/entities/:id/revert-redirect", post(redirects::revert_redirect))
        .route("/wiki/Special:EntityData/:id_dot_ttl", get(rdf::entity_data_ttl))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
