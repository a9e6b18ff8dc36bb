//! The Metadata Index (spec §4.C): the relational store backing the ID
//! Registry plus the four tables of §3 (`entity_id_mapping`, `entity_head`,
//! `entity_revisions`, `entity_redirects`). Grounded on `vitess_client.py`'s
//! table DDL and method set, translated through `store/postgres.rs`'s
//! SQL-error-to-domain-error mapping idiom.

pub mod postgres;

use async_trait::async_trait;
use entity_store_types::{EditType, EntityId, HeadRow, InternalId, MetadataIndexError};
use time::OffsetDateTime;

use crate::ids_registry::IdRegistry;

pub use self::postgres::PostgresMetadataIndex;

/// Selects which protection/lifecycle dimension `list_by_status` scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStatus {
    Locked,
    SemiProtected,
    Archived,
    Dangling,
    MassEditProtected,
    Deleted,
}

/// A revision row in `entity_revisions` as returned by [`MetadataIndex::get_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub revision_id: u64,
    pub created_at: OffsetDateTime,
    pub is_mass_edit: bool,
    pub edit_type: EditType,
}

#[async_trait]
pub trait MetadataIndex: IdRegistry {
    async fn get_head(&self, internal_id: InternalId)
        -> error_stack::Result<Option<HeadRow>, MetadataIndexError>;

    /// The reverse of [`crate::ids_registry::IdRegistry::resolve`], used by
    /// listing endpoints that only have an internal id on hand (incoming
    /// redirects, `list_by_status`/`list_by_edit_type`).
    async fn resolve_external(
        &self,
        internal_id: InternalId,
    ) -> error_stack::Result<Option<EntityId>, MetadataIndexError>;

    /// Idempotent: a second call for the same `(internal_id, revision_id)`
    /// is a no-op, not an error (spec §4.C).
    async fn insert_revision(
        &self,
        internal_id: InternalId,
        revision_id: u64,
        created_at: OffsetDateTime,
        is_mass_edit: bool,
        edit_type: &EditType,
    ) -> error_stack::Result<(), MetadataIndexError>;

    /// Inserts the first head row for a newly-registered entity. Returns
    /// `false` (not an error) if a head row already exists — the caller
    /// raced another writer and lost.
    async fn insert_head_with_status(
        &self,
        head: &HeadRow,
    ) -> error_stack::Result<bool, MetadataIndexError>;

    /// The CAS linearisation point of a write (spec §4.E step 10).
    /// Returns `false` if `expected_head` no longer matches the stored head.
    async fn cas_update_head(
        &self,
        expected_head: u64,
        new_head: &HeadRow,
    ) -> error_stack::Result<bool, MetadataIndexError>;

    async fn hard_delete_entity(
        &self,
        internal_id: InternalId,
        new_head_revision_id: u64,
    ) -> error_stack::Result<(), MetadataIndexError>;

    async fn create_redirect_edge(
        &self,
        from: InternalId,
        to: InternalId,
        created_by: &str,
    ) -> error_stack::Result<(), MetadataIndexError>;

    async fn set_redirect_target(
        &self,
        from: InternalId,
        to: Option<InternalId>,
    ) -> error_stack::Result<(), MetadataIndexError>;

    async fn get_incoming_redirects(
        &self,
        internal_id: InternalId,
    ) -> error_stack::Result<Vec<InternalId>, MetadataIndexError>;

    async fn get_history(
        &self,
        internal_id: InternalId,
        limit: u32,
    ) -> error_stack::Result<Vec<HistoryEntry>, MetadataIndexError>;

    async fn list_by_status(
        &self,
        status: EntityStatus,
        limit: u32,
    ) -> error_stack::Result<Vec<HeadRow>, MetadataIndexError>;

    async fn list_by_edit_type(
        &self,
        edit_type: &EditType,
        limit: u32,
    ) -> error_stack::Result<Vec<InternalId>, MetadataIndexError>;
}
