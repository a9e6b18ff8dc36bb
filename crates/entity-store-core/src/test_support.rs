//! In-memory [`MetadataIndex`]/[`BlobStore`] fakes used to exercise the
//! Revision Pipeline and Redirect & Delete Controller without a Postgres/S3
//! backend. Test-only; never compiled into the published crate.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use async_trait::async_trait;
use entity_store_types::{
    EditType, EntityId, HeadRow, InternalId, MetadataIndexError, RegistryError, RevisionRecord,
};
use error_stack::Result;
use time::OffsetDateTime;

use crate::{
    blob::BlobStore,
    ids_registry::IdRegistry,
    store::{EntityStatus, HistoryEntry, MetadataIndex},
};

#[derive(Default)]
pub(crate) struct InMemoryIndex {
    by_external: Mutex<HashMap<EntityId, InternalId>>,
    by_internal: Mutex<HashMap<InternalId, EntityId>>,
    heads: Mutex<HashMap<InternalId, HeadRow>>,
    history: Mutex<HashMap<InternalId, Vec<HistoryEntry>>>,
    incoming_redirects: Mutex<HashMap<InternalId, Vec<InternalId>>>,
}

#[async_trait]
impl IdRegistry for InMemoryIndex {
    async fn resolve(&self, external_id: &EntityId) -> Result<Option<InternalId>, RegistryError> {
        Ok(self.by_external.lock().unwrap().get(external_id).copied())
    }

    async fn register(&self, external_id: &EntityId) -> Result<InternalId, RegistryError> {
        let mut by_external = self.by_external.lock().unwrap();
        if let Some(existing) = by_external.get(external_id) {
            return Ok(*existing);
        }
        let internal_id = InternalId::generate();
        by_external.insert(external_id.clone(), internal_id);
        self.by_internal
            .lock()
            .unwrap()
            .insert(internal_id, external_id.clone());
        Ok(internal_id)
    }
}

#[async_trait]
impl MetadataIndex for InMemoryIndex {
    async fn get_head(&self, internal_id: InternalId) -> Result<Option<HeadRow>, MetadataIndexError> {
        Ok(self.heads.lock().unwrap().get(&internal_id).copied())
    }

    async fn resolve_external(&self, internal_id: InternalId) -> Result<Option<EntityId>, MetadataIndexError> {
        Ok(self.by_internal.lock().unwrap().get(&internal_id).cloned())
    }

    async fn insert_revision(
        &self,
        internal_id: InternalId,
        revision_id: u64,
        created_at: OffsetDateTime,
        is_mass_edit: bool,
        edit_type: &EditType,
    ) -> Result<(), MetadataIndexError> {
        let mut history = self.history.lock().unwrap();
        let entries = history.entry(internal_id).or_default();
        if entries.iter().any(|entry| entry.revision_id == revision_id) {
            return Ok(());
        }
        entries.push(HistoryEntry {
            revision_id,
            created_at,
            is_mass_edit,
            edit_type: edit_type.clone(),
        });
        Ok(())
    }

    async fn insert_head_with_status(&self, head: &HeadRow) -> Result<bool, MetadataIndexError> {
        let mut heads = self.heads.lock().unwrap();
        if heads.contains_key(&head.internal_id) {
            return Ok(false);
        }
        heads.insert(head.internal_id, *head);
        Ok(true)
    }

    async fn cas_update_head(
        &self,
        expected_head: u64,
        new_head: &HeadRow,
    ) -> Result<bool, MetadataIndexError> {
        let mut heads = self.heads.lock().unwrap();
        match heads.get(&new_head.internal_id) {
            Some(current) if current.head_revision_id == expected_head => {
                heads.insert(new_head.internal_id, *new_head);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn hard_delete_entity(
        &self,
        internal_id: InternalId,
        new_head_revision_id: u64,
    ) -> Result<(), MetadataIndexError> {
        let mut heads = self.heads.lock().unwrap();
        if let Some(head) = heads.get_mut(&internal_id) {
            head.head_revision_id = new_head_revision_id;
            head.is_deleted = true;
        }
        Ok(())
    }

    async fn create_redirect_edge(
        &self,
        from: InternalId,
        to: InternalId,
        _created_by: &str,
    ) -> Result<(), MetadataIndexError> {
        self.incoming_redirects.lock().unwrap().entry(to).or_default().push(from);
        Ok(())
    }

    async fn set_redirect_target(
        &self,
        from: InternalId,
        to: Option<InternalId>,
    ) -> Result<(), MetadataIndexError> {
        if let Some(head) = self.heads.lock().unwrap().get_mut(&from) {
            head.redirects_to = to;
            head.is_redirect = to.is_some();
        }
        Ok(())
    }

    async fn get_incoming_redirects(&self, internal_id: InternalId) -> Result<Vec<InternalId>, MetadataIndexError> {
        Ok(self
            .incoming_redirects
            .lock()
            .unwrap()
            .get(&internal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_history(&self, internal_id: InternalId, limit: u32) -> Result<Vec<HistoryEntry>, MetadataIndexError> {
        let mut entries = self
            .history
            .lock()
            .unwrap()
            .get(&internal_id)
            .cloned()
            .unwrap_or_default();
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn list_by_status(&self, status: EntityStatus, limit: u32) -> Result<Vec<HeadRow>, MetadataIndexError> {
        let matches = |head: &HeadRow| match status {
            EntityStatus::Locked => head.flags.is_locked,
            EntityStatus::SemiProtected => head.flags.is_semi_protected,
            EntityStatus::Archived => head.flags.is_archived,
            EntityStatus::Dangling => head.flags.is_dangling,
            EntityStatus::MassEditProtected => head.flags.is_mass_edit_protected,
            EntityStatus::Deleted => head.is_deleted,
        };
        let mut rows: Vec<HeadRow> = self.heads.lock().unwrap().values().filter(|head| matches(head)).copied().collect();
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn list_by_edit_type(&self, edit_type: &EditType, limit: u32) -> Result<Vec<InternalId>, MetadataIndexError> {
        let mut ids: Vec<InternalId> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, entries)| entries.iter().any(|entry| &entry.edit_type == edit_type))
            .map(|(internal_id, _)| *internal_id)
            .collect();
        ids.truncate(limit as usize);
        Ok(ids)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryBlob {
    objects: Mutex<HashMap<(EntityId, u64), RevisionRecord>>,
}

#[async_trait]
impl BlobStore for InMemoryBlob {
    async fn write(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
        record: &RevisionRecord,
        _publication_state: entity_store_types::PublicationState,
    ) -> Result<(), entity_store_types::BlobStoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert((entity_id.clone(), revision_id), record.clone());
        Ok(())
    }

    async fn read(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
    ) -> Result<Option<RevisionRecord>, entity_store_types::BlobStoreError> {
        Ok(self.objects.lock().unwrap().get(&(entity_id.clone(), revision_id)).cloned())
    }

    async fn mark_published(
        &self,
        _entity_id: &EntityId,
        _revision_id: u64,
    ) -> Result<(), entity_store_types::BlobStoreError> {
        Ok(())
    }
}
