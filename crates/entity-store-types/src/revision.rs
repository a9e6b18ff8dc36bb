use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{document::EntityDocument, edit_type::EditType};

/// The publication state tag carried alongside a blob-store object.
///
/// `Pending` marks a freshly written revision that no head yet references;
/// `Published` marks one that is (or may be) referenced by a head. Readers
/// must tolerate either state — the CAS against the metadata index, not
/// this tag, is what makes a revision visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Pending,
    Published,
}

impl PublicationState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Published => "published",
        }
    }
}

/// The full record written to the blob store for one revision.
///
/// This is the unit of idempotency comparison (`content_hash`) and the
/// unit of historical read (`/raw/{id}/{rev}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub schema_version: u32,
    pub revision_id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: String,
    pub is_mass_edit: bool,
    pub edit_type: EditType,
    pub entity_type: crate::document::EntityKind,
    pub is_semi_protected: bool,
    pub is_locked: bool,
    pub is_archived: bool,
    pub is_dangling: bool,
    pub is_mass_edit_protected: bool,
    pub is_deleted: bool,
    pub is_redirect: bool,
    pub entity: EntityDocument,
    pub content_hash: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirects_to: Option<String>,
}

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
