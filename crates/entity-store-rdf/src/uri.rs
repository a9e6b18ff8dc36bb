//! URI construction, grounded on `uri_generator.py`'s `URIGenerator`.

/// Builds the `wd:`/`wds:`/`data:`/`wdref:` URIs for one repository's
/// namespace. Stateless beyond the two base URLs, so a single instance is
/// shared across an entire serialization run.
#[derive(Debug, Clone)]
pub struct UriGenerator {
    entity_base: String,
    data_base: String,
}

impl UriGenerator {
    #[must_use]
    pub fn new(entity_base: impl Into<String>, data_base: impl Into<String>) -> Self {
        Self {
            entity_base: entity_base.into(),
            data_base: data_base.into(),
        }
    }

    #[must_use]
    pub fn entity_uri(&self, entity_id: &str) -> String {
        format!("{}{}", self.entity_base, entity_id)
    }

    #[must_use]
    pub fn entity_prefixed(&self, entity_id: &str) -> String {
        format!("wd:{entity_id}")
    }

    #[must_use]
    pub fn data_uri(&self, entity_id: &str) -> String {
        format!("{}{}", self.data_base, entity_id)
    }

    #[must_use]
    pub fn data_prefixed(&self, entity_id: &str) -> String {
        format!("data:{entity_id}")
    }

    /// The `wds:` local name for a statement, built by replacing the `$`
    /// separator in a caller-supplied GUID with `-` (statement ids look
    /// like `Q42$5627445f-...`).
    #[must_use]
    pub fn statement_local_name(statement_id: &str) -> String {
        statement_id.replace('$', "-")
    }

    #[must_use]
    pub fn statement_prefixed(statement_id: &str) -> String {
        format!("wds:{}", Self::statement_local_name(statement_id))
    }

    /// The `wdref:<hash>#ref` URI pattern used when more than one
    /// reference shares a statement; mirrors the zero-padded index suffix
    /// the original generator appends (`f"{stmt_uri}-{idx:09d}#ref"`), kept
    /// here for the reference-hash variant that has no natural collision
    /// risk since the hash is already globally unique.
    #[must_use]
    pub fn reference_prefixed(reference_hash: &str) -> String {
        format!("wdref:{reference_hash}")
    }

    #[must_use]
    pub fn value_node_prefixed(value_hash: &str) -> String {
        format!("wdv:{value_hash}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_local_name_replaces_dollar() {
        assert_eq!(
            UriGenerator::statement_local_name("Q42$5627445f-61c4-49d6-901e"),
            "Q42-5627445f-61c4-49d6-901e"
        );
    }

    #[test]
    fn entity_uri_concatenates_base_and_id() {
        let gen = UriGenerator::new("http://www.wikidata.org/entity/", "http://www.wikidata.org/wiki/Special:EntityData/");
        assert_eq!(gen.entity_uri("Q42"), "http://www.wikidata.org/entity/Q42");
        assert_eq!(gen.entity_prefixed("Q42"), "wd:Q42");
    }
}
