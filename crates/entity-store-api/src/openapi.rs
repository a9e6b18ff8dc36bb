use utoipa::OpenApi;

use crate::routes::{entity, health, rdf, redirects};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        entity::create_entity,
        entity::get_entity,
        entity::get_history,
        entity::get_revision_body,
        entity::get_raw_revision,
        entity::delete_entity,
        entity::list_entities,
        redirects::create_redirect,
        redirects::revert_redirect,
        rdf::entity_data_ttl,
    ),
    components(schemas(
        health::ComponentHealth,
        health::HealthResponse,
        entity::DeleteKindDto,
        entity::DeleteEntityRequest,
        entity::DeleteEntityResponseDto,
        entity::ListEntryDto,
        redirects::CreateRedirectRequestDto,
        redirects::RedirectResponseDto,
        redirects::RevertRedirectRequestDto,
    )),
    tags(
        (name = "entity-store", description = "Versioned entity store API"),
    )
)]
pub struct ApiDoc;
