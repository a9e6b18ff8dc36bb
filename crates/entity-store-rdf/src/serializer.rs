//! The Turtle Serializer (spec §4.G), grounded on `serializer.py`'s
//! `serialize_entity_to_turtle` and its `add_*` helper functions.
//!
//! Emission order is fixed: header prefixes, entity-type triple, dataset
//! metadata, labels/descriptions/aliases/sitelinks, per-statement triples,
//! incoming-redirect triples, referenced-entity blocks, per-property
//! ontology blocks.

use std::collections::{BTreeSet, HashMap};

use entity_store_types::{
    document::SiteLink, Datatype, EntityDocument, EntityKind, EntityStoreError, PropertyShape,
    Qualifier, Rank, Reference, SerializerError, Statement, Value,
};
use error_stack::Result;

use crate::{dedupe::HashDedupeBag, prefixes::write_prefixes, uri::UriGenerator, value_hash};

/// Label/description metadata for an entity referenced from a claim but
/// not itself the entity being serialized (spec §4.G "referenced-entity
/// blocks"). Populated by the caller from whatever label cache it keeps;
/// absent entries are simply skipped.
#[derive(Debug, Clone, Default)]
pub struct ReferencedEntityMeta {
    pub label: Option<(String, String)>,
    pub description: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct SerializerConfig {
    pub entity_base: String,
    pub data_base: String,
    pub repository_name: String,
}

fn escape_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn rank_predicate(rank: Rank) -> &'static str {
    match rank {
        Rank::Preferred => "wikibase:PreferredRank",
        Rank::Normal => "wikibase:NormalRank",
        Rank::Deprecated => "wikibase:DeprecatedRank",
    }
}

/// Renders a `Value` either as a plain Turtle literal term (for datatypes
/// that don't need a value node) or, for `Time`/`Quantity`/`GlobeCoordinate`,
/// as the MD5 value-node hash plus the canonical literal to attach to the
/// node's own triples.
enum ValueTerm {
    Literal(String),
    Node { hash: String, literal_triples: Vec<(String, String)> },
}

fn render_value(value: &Value) -> ValueTerm {
    match value {
        Value::Entity { id } | Value::EntitySchema { id } => {
            ValueTerm::Literal(format!("wd:{id}"))
        }
        Value::String { value }
        | Value::ExternalId { value }
        | Value::CommonsMedia { value }
        | Value::GeoShape { value }
        | Value::TabularData { value }
        | Value::MusicalNotation { value }
        | Value::Math { value } => ValueTerm::Literal(format!("\"{}\"", escape_literal(value))),
        Value::Url { value } => ValueTerm::Literal(format!("<{value}>")),
        Value::Monolingual { text, language } => {
            ValueTerm::Literal(format!("\"{}\"@{language}", escape_literal(text)))
        }
        Value::Time {
            value,
            timezone,
            before,
            after,
            precision,
            calendarmodel,
        } => {
            let hash = value_hash::hash_time_value(value, *precision, *timezone, *before, *after, calendarmodel);
            ValueTerm::Node {
                hash,
                literal_triples: vec![
                    ("wikibase:timeValue".to_owned(), format!("\"{value}\"^^xsd:dateTime")),
                    ("wikibase:timePrecision".to_owned(), precision.to_string()),
                    ("wikibase:timeTimezone".to_owned(), timezone.to_string()),
                    ("wikibase:timeCalendarModel".to_owned(), format!("<{calendarmodel}>")),
                ],
            }
        }
        Value::Quantity {
            amount,
            unit,
            upper_bound,
            lower_bound,
        } => {
            let hash = value_hash::hash_quantity_value(
                amount,
                unit,
                upper_bound.as_deref(),
                lower_bound.as_deref(),
            );
            let mut triples = vec![
                ("wikibase:quantityAmount".to_owned(), format!("\"{amount}\"^^xsd:decimal")),
                ("wikibase:quantityUnit".to_owned(), format!("<{unit}>")),
            ];
            if let Some(upper) = upper_bound {
                triples.push(("wikibase:quantityUpperBound".to_owned(), format!("\"{upper}\"^^xsd:decimal")));
            }
            if let Some(lower) = lower_bound {
                triples.push(("wikibase:quantityLowerBound".to_owned(), format!("\"{lower}\"^^xsd:decimal")));
            }
            ValueTerm::Node { hash, literal_triples: triples }
        }
        Value::GlobeCoordinate {
            latitude,
            longitude,
            precision,
            globe,
        } => {
            let hash = value_hash::hash_globe_coordinate_value(*latitude, *longitude, *precision, globe);
            ValueTerm::Node {
                hash,
                literal_triples: vec![
                    (
                        "wikibase:geoLatitude".to_owned(),
                        format!("\"{latitude}\"^^xsd:double"),
                    ),
                    (
                        "wikibase:geoLongitude".to_owned(),
                        format!("\"{longitude}\"^^xsd:double"),
                    ),
                    (
                        "wikibase:geoPrecision".to_owned(),
                        format!("\"{precision}\"^^xsd:double"),
                    ),
                    ("wikibase:geoGlobe".to_owned(), format!("<{globe}>")),
                ],
            }
        }
        Value::NoValue => ValueTerm::Literal(String::new()),
        Value::SomeValue => ValueTerm::Literal(String::new()),
    }
}

fn referenced_entity_id(value: &Value) -> Option<&str> {
    match value {
        Value::Entity { id } | Value::EntitySchema { id } => Some(id),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_statement_value(
    out: &mut String,
    value_nodes: &mut String,
    dedupe: &mut HashDedupeBag,
    subject_predicate_prefix: &str,
    property_id: &str,
    value: &Value,
) {
    match render_value(value) {
        ValueTerm::Literal(term) => {
            if term.is_empty() {
                return;
            }
            out.push_str(&format!(
                "    {subject_predicate_prefix}:{property_id} {term} ;\n"
            ));
        }
        ValueTerm::Node { hash, literal_triples } => {
            out.push_str(&format!(
                "    {subject_predicate_prefix}v:{property_id} wdv:{hash} ;\n"
            ));
            if !dedupe.already_seen(&hash, "v:") {
                value_nodes.push_str(&format!("wdv:{hash} a wikibase:Value"));
                for (predicate, object) in literal_triples {
                    value_nodes.push_str(&format!(" ;\n    {predicate} {object}"));
                }
                value_nodes.push_str(" .\n\n");
            }
        }
    }
}

/// Renders one entity document to a complete Turtle document.
#[allow(clippy::too_many_arguments)]
pub fn serialize_entity_to_turtle(
    entity: &EntityDocument,
    head_revision_id: u64,
    config: &SerializerConfig,
    property_shapes: &HashMap<String, PropertyShape>,
    referenced_entities: &HashMap<String, ReferencedEntityMeta>,
    incoming_redirects: &[String],
) -> Result<String, SerializerError> {
    let mut out = String::new();
    let mut value_nodes = String::new();
    let mut dedupe = HashDedupeBag::new();
    let mut referenced_ids: BTreeSet<String> = BTreeSet::new();
    let mut properties_used: BTreeSet<String> = BTreeSet::new();

    write_prefixes(&mut out, &config.entity_base, &config.data_base);

    let entity_type_iri = match entity.kind {
        EntityKind::Item => "wikibase:Item",
        EntityKind::Property => "wikibase:Property",
    };
    out.push_str(&format!("wd:{} a {entity_type_iri} .\n\n", entity.id));

    out.push_str(&format!(
        "data:{} a schema:Dataset ;\n    schema:about wd:{} ;\n    schema:version \"{head_revision_id}\"^^xsd:integer .\n\n",
        entity.id, entity.id
    ));

    for (lang, text) in &entity.labels {
        out.push_str(&format!(
            "wd:{} rdfs:label \"{}\"@{lang} .\n",
            entity.id,
            escape_literal(text)
        ));
    }
    for (lang, text) in &entity.descriptions {
        out.push_str(&format!(
            "wd:{} schema:description \"{}\"@{lang} .\n",
            entity.id,
            escape_literal(text)
        ));
    }
    for (lang, aliases) in &entity.aliases {
        for alias in aliases {
            out.push_str(&format!(
                "wd:{} skos:altLabel \"{}\"@{lang} .\n",
                entity.id,
                escape_literal(alias)
            ));
        }
    }
    out.push('\n');

    for site_link in entity.sitelinks.values() {
        write_sitelink(&mut out, &entity.id, site_link);
    }
    if !entity.sitelinks.is_empty() {
        out.push('\n');
    }

    for (property_id, statements) in &entity.claims {
        properties_used.insert(property_id.clone());
        for statement in statements {
            emit_statement(
                &mut out,
                &mut value_nodes,
                &mut dedupe,
                &mut referenced_ids,
                &mut properties_used,
                &entity.id,
                property_id,
                statement,
            )
            .map_err(|error| {
                error_stack::Report::new(SerializerError).attach_printable(error.to_string())
            })?;
        }
    }
    out.push('\n');

    for from_id in incoming_redirects {
        out.push_str(&format!("wd:{from_id} owl:sameAs wd:{} .\n", entity.id));
    }
    if !incoming_redirects.is_empty() {
        out.push('\n');
    }

    out.push_str(&value_nodes);

    for referenced_id in &referenced_ids {
        if let Some(meta) = referenced_entities.get(referenced_id) {
            if let Some((lang, text)) = &meta.label {
                out.push_str(&format!(
                    "wd:{referenced_id} rdfs:label \"{}\"@{lang} .\n",
                    escape_literal(text)
                ));
            }
            if let Some((lang, text)) = &meta.description {
                out.push_str(&format!(
                    "wd:{referenced_id} schema:description \"{}\"@{lang} .\n",
                    escape_literal(text)
                ));
            }
        }
    }
    if !referenced_ids.is_empty() {
        out.push('\n');
    }

    for property_id in &properties_used {
        let datatype = property_shapes
            .get(property_id)
            .map_or(Datatype::String, |shape| shape.datatype);
        write_property_block(&mut out, property_id, datatype, &config.repository_name);
    }

    Ok(out)
}

fn write_sitelink(out: &mut String, entity_id: &str, site_link: &SiteLink) {
    out.push_str(&format!(
        "<{}> a schema:Article ;\n    schema:about wd:{entity_id} ;\n    schema:isPartOf <https://{}/> ;\n    schema:name \"{}\"@{} .\n",
        site_link.url,
        site_link.site,
        escape_literal(&site_link.title),
        wiki_group_language(&site_link.site),
    ));
}

/// The language subtag a sitelink's site key encodes, e.g. `enwiki` -> `en`.
/// Falls back to the raw site key when no `wiki` suffix is present, which
/// matches the original's treatment of non-wiki site groups.
fn wiki_group_language(site: &str) -> &str {
    site.strip_suffix("wiki").unwrap_or(site)
}

fn write_property_block(out: &mut String, property_id: &str, datatype: Datatype, repository_name: &str) {
    let datatype_str = match datatype {
        Datatype::WikibaseItem => "wikibase-item",
        Datatype::WikibaseProperty => "wikibase-property",
        Datatype::String => "string",
        Datatype::Time => "time",
        Datatype::Quantity => "quantity",
        Datatype::GlobeCoordinate => "globe-coordinate",
        Datatype::Monolingualtext => "monolingualtext",
        Datatype::ExternalId => "external-id",
        Datatype::CommonsMedia => "commonsMedia",
        Datatype::GeoShape => "geo-shape",
        Datatype::TabularData => "tabular-data",
        Datatype::MusicalNotation => "musical-notation",
        Datatype::Url => "url",
        Datatype::Math => "math",
        Datatype::EntitySchema => "entity-schema",
    };

    out.push_str(&format!(
        "wd:{property_id} a wikibase:Property ;\n    wikibase:propertyType wikibase:{} ;\n    wikibase:directClaim wdt:{property_id} ;\n    wikibase:claim p:{property_id} ;\n    wikibase:statementProperty ps:{property_id} ;\n    wikibase:qualifier pq:{property_id} ;\n    wikibase:reference pr:{property_id} .\n",
        to_pascal_case(datatype_str)
    ));

    let blank_node = value_hash::no_value_blank_node(repository_name, property_id);
    out.push_str(&format!(
        "wdno:{property_id} a owl:Class ;\n    owl:complementOf _:{blank_node} .\n\n"
    ));
}

fn to_pascal_case(kebab: &str) -> String {
    kebab
        .split(['-', ' '])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn emit_statement(
    out: &mut String,
    value_nodes: &mut String,
    dedupe: &mut HashDedupeBag,
    referenced_ids: &mut BTreeSet<String>,
    properties_used: &mut BTreeSet<String>,
    entity_id: &str,
    property_id: &str,
    statement: &Statement,
) -> std::result::Result<(), EntityStoreError> {
    let statement_node = UriGenerator::statement_local_name(&statement.statement_id);

    out.push_str(&format!("wd:{entity_id} p:{property_id} wds:{statement_node} .\n"));
    if statement.rank == Rank::Normal {
        out.push_str(&format!(
            "wds:{statement_node} a wikibase:Statement, wikibase:BestRank ;\n"
        ));
    } else {
        out.push_str(&format!("wds:{statement_node} a wikibase:Statement ;\n"));
    }
    out.push_str(&format!("    {} ;\n", rank_predicate(statement.rank)));

    if statement.rank == Rank::Normal {
        if let Some(id) = referenced_entity_id(&statement.value) {
            referenced_ids.insert(id.to_owned());
        }
        if let ValueTerm::Literal(term) = render_value(&statement.value) {
            if !term.is_empty() {
                out.push_str(&format!("wd:{entity_id} wdt:{property_id} {term} .\n"));
            }
        }
    }

    emit_statement_value(out, value_nodes, dedupe, "ps", property_id, &statement.value);

    for Qualifier { property, value } in &statement.qualifiers {
        properties_used.insert(property.clone());
        if let Some(id) = referenced_entity_id(value) {
            referenced_ids.insert(id.to_owned());
        }
        emit_statement_value(out, value_nodes, dedupe, "pq", property, value);
    }

    for Reference { hash, snaks } in &statement.references {
        if hash.len() != 40 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EntityStoreError::invalid_reference(format!(
                "reference on {} has an invalid hash: {hash:?}",
                statement.statement_id
            )));
        }
        out.push_str(&format!("wds:{statement_node} prov:wasDerivedFrom wdref:{hash} .\n"));
        for entity_store_types::ReferenceSnak { property, value } in snaks {
            properties_used.insert(property.clone());
            if let Some(id) = referenced_entity_id(value) {
                referenced_ids.insert(id.to_owned());
            }
            emit_statement_value(out, value_nodes, dedupe, "pr", property, value);
        }
    }

    out.push('\n');
    Ok(())
}

#[cfg(test)]
mod tests {
    use entity_store_types::ReferenceSnak;

    use super::*;

    fn config() -> SerializerConfig {
        SerializerConfig {
            entity_base: "http://www.wikidata.org/entity/".to_owned(),
            data_base: "http://www.wikidata.org/wiki/Special:EntityData/".to_owned(),
            repository_name: "test".to_owned(),
        }
    }

    fn statement(value: Value) -> Statement {
        Statement {
            statement_id: "Q1$a".to_owned(),
            property: "P31".to_owned(),
            value,
            rank: Rank::Normal,
            qualifiers: vec![],
            references: vec![],
        }
    }

    #[test]
    fn emits_header_entity_type_and_dataset_metadata() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        entity.labels.insert("en".to_owned(), "test item".to_owned());

        let turtle = serialize_entity_to_turtle(&entity, 7, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert!(turtle.starts_with("@prefix wd:"));
        assert!(turtle.contains("wd:Q1 a wikibase:Item .\n"));
        assert!(turtle.contains("schema:version \"7\"^^xsd:integer"));
        assert!(turtle.contains("wd:Q1 rdfs:label \"test item\"@en .\n"));
    }

    #[test]
    fn normal_rank_statement_emits_direct_claim_triple() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        entity
            .claims
            .insert("P31".to_owned(), vec![statement(Value::Entity { id: "Q2".to_owned() })]);

        let turtle = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert!(turtle.contains("wd:Q1 wdt:P31 wd:Q2 .\n"));
        assert!(turtle.contains("wd:Q1 p:P31 wds:Q1-a .\n"));
        assert!(turtle.contains("a wikibase:Statement, wikibase:BestRank ;\n"));
        assert!(turtle.contains("wikibase:NormalRank"));
    }

    #[test]
    fn preferred_rank_statement_gets_neither_best_rank_nor_the_direct_claim_triple() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        let mut stmt = statement(Value::Entity { id: "Q2".to_owned() });
        stmt.rank = Rank::Preferred;
        entity.claims.insert("P31".to_owned(), vec![stmt]);

        let turtle = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert!(!turtle.contains("wdt:P31"));
        assert!(!turtle.contains("BestRank"));
        assert!(turtle.contains("wikibase:PreferredRank"));
    }

    #[test]
    fn deprecated_rank_statement_suppresses_the_direct_claim_triple() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        let mut stmt = statement(Value::Entity { id: "Q2".to_owned() });
        stmt.rank = Rank::Deprecated;
        entity.claims.insert("P31".to_owned(), vec![stmt]);

        let turtle = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert!(!turtle.contains("wdt:P31"));
        assert!(!turtle.contains("BestRank"));
        assert!(turtle.contains("wikibase:DeprecatedRank"));
    }

    #[test]
    fn identical_quantity_values_collapse_onto_one_value_node() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        let value = Value::Quantity {
            amount: "12".to_owned(),
            unit: "1".to_owned(),
            upper_bound: None,
            lower_bound: None,
        };
        entity.claims.insert(
            "P1082".to_owned(),
            vec![statement(value.clone()), statement(value)],
        );

        let turtle = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert_eq!(turtle.matches("a wikibase:Value").count(), 1);
    }

    #[test]
    fn qualifiers_and_references_contribute_referenced_ids_to_the_property_catalogue() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        let mut stmt = statement(Value::String { value: "hello".to_owned() });
        stmt.qualifiers.push(Qualifier {
            property: "P642".to_owned(),
            value: Value::Entity { id: "Q3".to_owned() },
        });
        stmt.references.push(Reference {
            hash: "a".repeat(40),
            snaks: vec![ReferenceSnak {
                property: "P248".to_owned(),
                value: Value::Entity { id: "Q4".to_owned() },
            }],
        });
        entity.claims.insert("P31".to_owned(), vec![stmt]);

        let turtle = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert!(turtle.contains(&format!("wds:Q1-a prov:wasDerivedFrom wdref:{}", "a".repeat(40))));
        assert!(turtle.contains("wd:P642 a wikibase:Property"));
        assert!(turtle.contains("wd:P248 a wikibase:Property"));
    }

    #[test]
    fn a_reference_with_a_malformed_hash_is_rejected() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        let mut stmt = statement(Value::String { value: "hello".to_owned() });
        stmt.references.push(Reference {
            hash: "not-a-hex-hash".to_owned(),
            snaks: vec![],
        });
        entity.claims.insert("P31".to_owned(), vec![stmt]);

        let error = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap_err();
        assert!(matches!(error.current_context(), SerializerError));
    }

    #[test]
    fn a_property_with_no_known_shape_falls_back_to_string_datatype() {
        let mut entity = EntityDocument::empty("Q1", EntityKind::Item);
        entity
            .claims
            .insert("P1".to_owned(), vec![statement(Value::String { value: "x".to_owned() })]);

        let turtle = serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &[]).unwrap();

        assert!(turtle.contains("wikibase:propertyType wikibase:String"));
    }

    #[test]
    fn incoming_redirects_are_emitted_as_owl_same_as() {
        let entity = EntityDocument::empty("Q1", EntityKind::Item);
        let incoming = vec!["Q5".to_owned()];

        let turtle =
            serialize_entity_to_turtle(&entity, 1, &config(), &HashMap::new(), &HashMap::new(), &incoming).unwrap();

        assert!(turtle.contains("wd:Q5 owl:sameAs wd:Q1 .\n"));
    }
}
