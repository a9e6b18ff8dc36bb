use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{edit_type::EditType, ids::InternalId};

/// Per-entity protection/lifecycle flags, carried on the head row so that
/// read-path protection checks never need an extra blob fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtectionFlags {
    pub is_semi_protected: bool,
    pub is_locked: bool,
    pub is_archived: bool,
    pub is_dangling: bool,
    pub is_mass_edit_protected: bool,
}

/// The mutable head pointer for one internal ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRow {
    pub internal_id: InternalId,
    pub head_revision_id: u64,
    pub flags: ProtectionFlags,
    pub is_deleted: bool,
    pub is_redirect: bool,
    pub redirects_to: Option<InternalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionListRow {
    pub internal_id: InternalId,
    pub revision_id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_mass_edit: bool,
    pub edit_type: EditType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEdgeRow {
    pub id: i64,
    pub from_internal_id: InternalId,
    pub to_internal_id: InternalId,
}
