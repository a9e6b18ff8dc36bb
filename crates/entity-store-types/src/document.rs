use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLink {
    pub site: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub badges: Vec<String>,
}

/// The full JSON shape of an entity document, as produced by the upstream
/// parser and stored verbatim (plus envelope metadata) in a revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
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
}

impl EntityDocument {
    /// Builds the empty placeholder body used for redirect-create revisions.
    #[must_use]
    pub fn empty(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            labels: HashMap::new(),
            descriptions: HashMap::new(),
            aliases: HashMap::new(),
            claims: HashMap::new(),
            sitelinks: HashMap::new(),
        }
    }
}
