//! `GET /wiki/Special:EntityData/{id}.ttl` (spec §6), wiring the pipeline's
//! read path and the Metadata Index's redirect-edge lookup into the Turtle
//! Serializer (spec §4.G).

use std::{collections::{BTreeSet, HashMap}, sync::Arc};

use axum::{
    extract::Path,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use entity_store_core::pipeline;
use entity_store_rdf::{serialize_entity_to_turtle, ReferencedEntityMeta, SerializerConfig};
use entity_store_types::{EntityDocument, EntityId, Value};

use crate::{error::ApiError, state::AppState};

fn referenced_entity_id(value: &Value) -> Option<&str> {
    match value {
        Value::Entity { id } | Value::EntitySchema { id } => Some(id),
        _ => None,
    }
}

fn collect_referenced_ids(document: &EntityDocument) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for statements in document.claims.values() {
        for statement in statements {
            if let Some(id) = referenced_entity_id(&statement.value) {
                ids.insert(id.to_owned());
            }
            for qualifier in &statement.qualifiers {
                if let Some(id) = referenced_entity_id(&qualifier.value) {
                    ids.insert(id.to_owned());
                }
            }
            for reference in &statement.references {
                for snak in &reference.snaks {
                    if let Some(id) = referenced_entity_id(&snak.value) {
                        ids.insert(id.to_owned());
                    }
                }
            }
        }
    }
    ids
}

fn first_label_entry(labels: &HashMap<String, String>) -> Option<(String, String)> {
    labels
        .get("en")
        .map(|text| ("en".to_owned(), text.clone()))
        .or_else(|| labels.iter().next().map(|(lang, text)| (lang.clone(), text.clone())))
}

#[utoipa::path(
    get,
    path = "/wiki/Special:EntityData/{id}.ttl",
    responses((status = 200, description = "Turtle serialization of the entity's current revision", content_type = "text/turtle"))
)]
#[tracing::instrument(level = "debug", skip(state), fields(%id_dot_ttl))]
pub async fn entity_data_ttl(
    Extension(state): Extension<Arc<AppState>>,
    Path(id_dot_ttl): Path<String>,
) -> Result<Response, ApiError> {
    let id = id_dot_ttl.strip_suffix(".ttl").unwrap_or(&id_dot_ttl).to_owned();
    let external_id = EntityId::from(id);
    let response = pipeline::get(state.index.as_ref(), state.blob.as_ref(), &external_id).await?;

    let internal_id = state
        .index
        .resolve(&external_id)
        .await
        .map_err(|report| report.change_context(entity_store_types::EntityStoreError::io_error("resolving entity id")))?
        .ok_or_else(|| {
            error_stack::Report::new(entity_store_types::EntityStoreError::not_found(external_id.as_str()))
        })?;

    let incoming_redirect_internal_ids = state
        .index
        .get_incoming_redirects(internal_id)
        .await
        .map_err(|report| {
            report.change_context(entity_store_types::EntityStoreError::io_error("reading incoming redirects"))
        })?;

    let mut incoming_redirects = Vec::with_capacity(incoming_redirect_internal_ids.len());
    for redirect_internal_id in incoming_redirect_internal_ids {
        if let Some(redirect_external_id) = state.index.resolve_external(redirect_internal_id).await.map_err(|report| {
            report.change_context(entity_store_types::EntityStoreError::io_error("resolving redirect source id"))
        })? {
            incoming_redirects.push(redirect_external_id.into_string());
        }
    }

    let mut referenced_entities = HashMap::new();
    for referenced_id in collect_referenced_ids(&response.data) {
        let referenced_external_id = EntityId::from(referenced_id.clone());
        if let Ok(referenced_response) =
            pipeline::get(state.index.as_ref(), state.blob.as_ref(), &referenced_external_id).await
        {
            referenced_entities.insert(
                referenced_id,
                ReferencedEntityMeta {
                    label: first_label_entry(&referenced_response.data.labels),
                    description: first_label_entry(&referenced_response.data.descriptions),
                },
            );
        }
    }

    let config = SerializerConfig {
        entity_base: state.entity_base.clone(),
        data_base: state.data_base.clone(),
        repository_name: state.repository_name.clone(),
    };

    let turtle = serialize_entity_to_turtle(
        &response.data,
        response.revision_id,
        &config,
        &state.property_shapes,
        &referenced_entities,
        &incoming_redirects,
    )
    .map_err(|report| {
        report.change_context(entity_store_types::EntityStoreError::io_error("serializing entity to turtle"))
    })?;

    let mut http_response = turtle.into_response();
    http_response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/turtle"));
    Ok(http_response)
}

#[cfg(test)]
mod tests {
    use entity_store_types::{EntityKind, Qualifier, Rank, Reference, ReferenceSnak, Statement};

    use super::*;

    #[test]
    fn collects_referenced_ids_from_value_qualifiers_and_references() {
        let mut document = EntityDocument::empty("Q1", EntityKind::Item);
        document.claims.insert(
            "P31".to_owned(),
            vec![Statement {
                statement_id: "Q1$a".to_owned(),
                property: "P31".to_owned(),
                value: Value::Entity { id: "Q2".to_owned() },
                rank: Rank::Normal,
                qualifiers: vec![Qualifier {
                    property: "P642".to_owned(),
                    value: Value::Entity { id: "Q3".to_owned() },
                }],
                references: vec![Reference {
                    hash: "a".repeat(40),
                    snaks: vec![ReferenceSnak {
                        property: "P248".to_owned(),
                        value: Value::Entity { id: "Q4".to_owned() },
                    }],
                }],
            }],
        );

        let ids = collect_referenced_ids(&document);
        assert_eq!(
            ids,
            ["Q2", "Q3", "Q4"].into_iter().map(str::to_owned).collect()
        );
    }

    #[test]
    fn first_label_entry_prefers_english() {
        let mut labels = HashMap::new();
        labels.insert("fr".to_owned(), "bonjour".to_owned());
        labels.insert("en".to_owned(), "hello".to_owned());

        assert_eq!(first_label_entry(&labels), Some(("en".to_owned(), "hello".to_owned())));
    }

    #[test]
    fn first_label_entry_falls_back_to_any_entry() {
        let mut labels = HashMap::new();
        labels.insert("fr".to_owned(), "bonjour".to_owned());

        assert_eq!(first_label_entry(&labels), Some(("fr".to_owned(), "bonjour".to_owned())));
    }

    #[test]
    fn first_label_entry_empty() {
        assert_eq!(first_label_entry(&HashMap::new()), None);
    }
}
