//! The fixed Turtle prefix set (spec §6), grounded on `serializer.py`'s
//! namespace bindings.

/// `(prefix, uri)` pairs emitted at the top of every Turtle document, in
/// this fixed order.
#[must_use]
pub fn prefix_table(entity_base: &str, data_base: &str) -> Vec<(&'static str, String)> {
    vec![
        ("wd", entity_base.to_owned()),
        ("wds", format!("{entity_base}statement/")),
        ("wdv", format!("{entity_base}value/")),
        ("wdref", format!("{entity_base}reference/")),
        ("wdt", format!("{entity_base}prop/direct/")),
        ("wdtn", format!("{entity_base}prop/direct-normalized/")),
        ("wdno", format!("{entity_base}prop/novalue/")),
        ("p", format!("{entity_base}prop/")),
        ("ps", format!("{entity_base}prop/statement/")),
        ("psv", format!("{entity_base}prop/statement/value/")),
        ("psn", format!("{entity_base}prop/statement/value-normalized/")),
        ("pq", format!("{entity_base}prop/qualifier/")),
        ("pqv", format!("{entity_base}prop/qualifier/value/")),
        ("pqn", format!("{entity_base}prop/qualifier/value-normalized/")),
        ("pr", format!("{entity_base}prop/reference/")),
        ("prv", format!("{entity_base}prop/reference/value/")),
        ("prn", format!("{entity_base}prop/reference/value-normalized/")),
        ("wikibase", "http://wikiba.se/ontology#".to_owned()),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#".to_owned()),
        ("schema", "http://schema.org/".to_owned()),
        ("skos", "http://www.w3.org/2004/02/skos/core#".to_owned()),
        ("owl", "http://www.w3.org/2002/07/owl#".to_owned()),
        ("xsd", "http://www.w3.org/2001/XMLSchema#".to_owned()),
        ("geo", "http://www.opengis.net/ont/geosparql#".to_owned()),
        ("prov", "http://www.w3.org/ns/prov#".to_owned()),
        ("cc", "http://creativecommons.org/ns#".to_owned()),
        ("data", data_base.to_owned()),
    ]
}

pub fn write_prefixes(out: &mut String, entity_base: &str, data_base: &str) {
    for (prefix, uri) in prefix_table(entity_base, data_base) {
        out.push_str(&format!("@prefix {prefix}: <{uri}> .\n"));
    }
    out.push('\n');
}
