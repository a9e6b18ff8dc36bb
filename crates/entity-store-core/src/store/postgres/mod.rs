//! Postgres-backed [`MetadataIndex`]/[`IdRegistry`] implementation,
//! grounded on `store/postgres.rs`'s pattern of running a parameterized
//! query and mapping `SqlState` codes (in particular `UNIQUE_VIOLATION`)
//! onto domain-level outcomes rather than raw Postgres errors.

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use entity_store_types::{
    EditType, EntityId, HeadRow, InternalId, MetadataIndexError, ProtectionFlags, RegistryError,
};
use error_stack::{Report, Result, ResultExt as _};
use time::OffsetDateTime;
use tokio_postgres::{error::SqlState, NoTls};

use super::{EntityStatus, HistoryEntry, MetadataIndex};
use crate::{config::PostgresConnectionInfo, ids_registry::IdRegistry};

pub struct PostgresMetadataIndex {
    pool: Pool,
}

impl PostgresMetadataIndex {
    /// Builds a connection pool from `info`. Does not run migrations —
    /// see [`crate::migrations::run`] for that.
    pub fn connect(info: &PostgresConnectionInfo) -> Result<Self, MetadataIndexError> {
        let mut config = PoolConfig::new();
        config.host = Some(info.host.clone());
        config.port = Some(info.port);
        config.user = Some(info.user.clone());
        config.password = Some(info.password.clone());
        config.dbname = Some(info.database.clone());

        let pool = config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .change_context(MetadataIndexError)
            .attach_printable("building the postgres connection pool")?;

        Ok(Self { pool })
    }

    /// Exposes the pool for [`crate::migrations::run`], which needs a raw
    /// client rather than the higher-level trait methods.
    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn client(
        &self,
    ) -> Result<deadpool_postgres::Client, MetadataIndexError> {
        self.pool
            .get()
            .await
            .change_context(MetadataIndexError)
            .attach_printable("acquiring a pooled connection")
    }
}

fn row_to_head(row: &tokio_postgres::Row) -> HeadRow {
    HeadRow {
        internal_id: InternalId::new(row.get("internal_id")),
        head_revision_id: row.get::<_, i64>("head_revision_id") as u64,
        flags: ProtectionFlags {
            is_semi_protected: row.get("is_semi_protected"),
            is_locked: row.get("is_locked"),
            is_archived: row.get("is_archived"),
            is_dangling: row.get("is_dangling"),
            is_mass_edit_protected: row.get("is_mass_edit_protected"),
        },
        is_deleted: row.get("is_deleted"),
        is_redirect: row.get("is_redirect"),
        redirects_to: row
            .get::<_, Option<i64>>("redirects_to")
            .map(InternalId::new),
    }
}

#[async_trait]
impl IdRegistry for PostgresMetadataIndex {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn resolve(&self, external_id: &EntityId) -> Result<Option<InternalId>, RegistryError> {
        let client = self
            .client()
            .await
            .change_context(RegistryError)
            .attach_printable("acquiring connection to resolve an id")?;

        let row = client
            .query_opt(
                "SELECT internal_id FROM entity_id_mapping WHERE external_id = $1",
                &[&external_id.as_str()],
            )
            .await
            .change_context(RegistryError)
            .attach_printable_lazy(|| format!("resolving {external_id}"))?;

        Ok(row.map(|row| InternalId::new(row.get("internal_id"))))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn register(&self, external_id: &EntityId) -> Result<InternalId, RegistryError> {
        let client = self
            .client()
            .await
            .change_context(RegistryError)
            .attach_printable("acquiring connection to register an id")?;

        // Retry a handful of times on a racing UNIQUE_VIOLATION of the
        // generated internal id (astronomically unlikely) or of the
        // external id itself (expected when two writers race to register
        // the same brand-new entity).
        for _ in 0..5 {
            let candidate = InternalId::generate();
            let result = client
                .execute(
                    "INSERT INTO entity_id_mapping (external_id, internal_id) VALUES ($1, $2) \
                     ON CONFLICT (external_id) DO NOTHING",
                    &[&external_id.as_str(), &candidate.as_i64()],
                )
                .await;

            match result {
                Ok(1) => return Ok(candidate),
                Ok(_) => {
                    // Someone else registered it first; read back the winner.
                    let row = client
                        .query_one(
                            "SELECT internal_id FROM entity_id_mapping WHERE external_id = $1",
                            &[&external_id.as_str()],
                        )
                        .await
                        .change_context(RegistryError)
                        .attach_printable_lazy(|| {
                            format!("reading back the winning registration of {external_id}")
                        })?;
                    return Ok(InternalId::new(row.get("internal_id")));
                }
                Err(error) => {
                    if error.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                        continue;
                    }
                    return Err(Report::new(error)
                        .change_context(RegistryError)
                        .attach_printable_lazy(|| format!("registering {external_id}")));
                }
            }
        }

        Err(Report::new(RegistryError)
            .attach_printable_lazy(|| format!("exhausted retries registering {external_id}")))
    }
}

#[async_trait]
impl MetadataIndex for PostgresMetadataIndex {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_head(
        &self,
        internal_id: InternalId,
    ) -> Result<Option<HeadRow>, MetadataIndexError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT internal_id, head_revision_id, is_semi_protected, is_locked, \
                 is_archived, is_dangling, is_mass_edit_protected, is_deleted, is_redirect, \
                 redirects_to FROM entity_head WHERE internal_id = $1",
                &[&internal_id.as_i64()],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("reading head for {internal_id}"))?;

        Ok(row.as_ref().map(row_to_head))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn resolve_external(
        &self,
        internal_id: InternalId,
    ) -> Result<Option<EntityId>, MetadataIndexError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT external_id FROM entity_id_mapping WHERE internal_id = $1",
                &[&internal_id.as_i64()],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("resolving external id for {internal_id}"))?;

        Ok(row.map(|row| EntityId::from(row.get::<_, String>("external_id"))))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn insert_revision(
        &self,
        internal_id: InternalId,
        revision_id: u64,
        created_at: OffsetDateTime,
        is_mass_edit: bool,
        edit_type: &EditType,
    ) -> Result<(), MetadataIndexError> {
        let client = self.client().await?;
        client
            .execute(
                "INSERT INTO entity_revisions (internal_id, revision_id, created_at, \
                 is_mass_edit, edit_type) VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (internal_id, revision_id) DO NOTHING",
                &[
                    &internal_id.as_i64(),
                    &(revision_id as i64),
                    &created_at,
                    &is_mass_edit,
                    &edit_type.as_str(),
                ],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| {
                format!("inserting revision {revision_id} for {internal_id}")
            })?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, head))]
    async fn insert_head_with_status(&self, head: &HeadRow) -> Result<bool, MetadataIndexError> {
        let client = self.client().await?;
        let outcome = client
            .execute(
                "INSERT INTO entity_head (internal_id, head_revision_id, is_semi_protected, \
                 is_locked, is_archived, is_dangling, is_mass_edit_protected, is_deleted, \
                 is_redirect, redirects_to) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 ON CONFLICT (internal_id) DO NOTHING",
                &[
                    &head.internal_id.as_i64(),
                    &(head.head_revision_id as i64),
                    &head.flags.is_semi_protected,
                    &head.flags.is_locked,
                    &head.flags.is_archived,
                    &head.flags.is_dangling,
                    &head.flags.is_mass_edit_protected,
                    &head.is_deleted,
                    &head.is_redirect,
                    &head.redirects_to.map(InternalId::as_i64),
                ],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("inserting head row for {}", head.internal_id))?;

        Ok(outcome == 1)
    }

    #[tracing::instrument(level = "debug", skip(self, new_head))]
    async fn cas_update_head(
        &self,
        expected_head: u64,
        new_head: &HeadRow,
    ) -> Result<bool, MetadataIndexError> {
        let client = self.client().await?;
        let outcome = client
            .execute(
                "UPDATE entity_head SET head_revision_id = $1, is_semi_protected = $2, \
                 is_locked = $3, is_archived = $4, is_dangling = $5, is_mass_edit_protected = $6, \
                 is_deleted = $7, is_redirect = $8, redirects_to = $9 \
                 WHERE internal_id = $10 AND head_revision_id = $11",
                &[
                    &(new_head.head_revision_id as i64),
                    &new_head.flags.is_semi_protected,
                    &new_head.flags.is_locked,
                    &new_head.flags.is_archived,
                    &new_head.flags.is_dangling,
                    &new_head.flags.is_mass_edit_protected,
                    &new_head.is_deleted,
                    &new_head.is_redirect,
                    &new_head.redirects_to.map(InternalId::as_i64),
                    &new_head.internal_id.as_i64(),
                    &(expected_head as i64),
                ],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| {
                format!("CAS-updating head for {}", new_head.internal_id)
            })?;

        Ok(outcome == 1)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn hard_delete_entity(
        &self,
        internal_id: InternalId,
        new_head_revision_id: u64,
    ) -> Result<(), MetadataIndexError> {
        let client = self.client().await?;
        client
            .execute(
                "UPDATE entity_head SET is_deleted = TRUE, head_revision_id = $1 \
                 WHERE internal_id = $2",
                &[&(new_head_revision_id as i64), &internal_id.as_i64()],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("hard-deleting {internal_id}"))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_redirect_edge(
        &self,
        from: InternalId,
        to: InternalId,
        created_by: &str,
    ) -> Result<(), MetadataIndexError> {
        let client = self.client().await?;
        client
            .execute(
                "INSERT INTO entity_redirects (from_internal_id, to_internal_id, created_at, \
                 created_by) VALUES ($1, $2, now(), $3)",
                &[&from.as_i64(), &to.as_i64(), &created_by],
            )
            .await
            .map_err(|error| {
                if error.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    Report::new(error)
                        .change_context(MetadataIndexError)
                        .attach_printable("redirect edge already exists")
                } else {
                    Report::new(error).change_context(MetadataIndexError)
                }
            })
            .attach_printable_lazy(|| format!("creating redirect edge {from} -> {to}"))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn set_redirect_target(
        &self,
        from: InternalId,
        to: Option<InternalId>,
    ) -> Result<(), MetadataIndexError> {
        let client = self.client().await?;
        client
            .execute(
                "UPDATE entity_head SET is_redirect = $1, redirects_to = $2 \
                 WHERE internal_id = $3",
                &[&to.is_some(), &to.map(InternalId::as_i64), &from.as_i64()],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("setting redirect target for {from}"))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_incoming_redirects(
        &self,
        internal_id: InternalId,
    ) -> Result<Vec<InternalId>, MetadataIndexError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT from_internal_id FROM entity_redirects WHERE to_internal_id = $1",
                &[&internal_id.as_i64()],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("reading incoming redirects for {internal_id}"))?;

        Ok(rows
            .iter()
            .map(|row| InternalId::new(row.get("from_internal_id")))
            .collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_history(
        &self,
        internal_id: InternalId,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, MetadataIndexError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT revision_id, created_at, is_mass_edit, edit_type FROM entity_revisions \
                 WHERE internal_id = $1 ORDER BY created_at DESC LIMIT $2",
                &[&internal_id.as_i64(), &i64::from(limit)],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("reading history for {internal_id}"))?;

        Ok(rows
            .iter()
            .map(|row| HistoryEntry {
                revision_id: row.get::<_, i64>("revision_id") as u64,
                created_at: row.get("created_at"),
                is_mass_edit: row.get("is_mass_edit"),
                edit_type: EditType::from_str_loose(row.get::<_, &str>("edit_type")),
            })
            .collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_by_status(
        &self,
        status: EntityStatus,
        limit: u32,
    ) -> Result<Vec<HeadRow>, MetadataIndexError> {
        let column = match status {
            EntityStatus::Locked => "is_locked",
            EntityStatus::SemiProtected => "is_semi_protected",
            EntityStatus::Archived => "is_archived",
            EntityStatus::Dangling => "is_dangling",
            EntityStatus::MassEditProtected => "is_mass_edit_protected",
            EntityStatus::Deleted => "is_deleted",
        };

        let client = self.client().await?;
        let query = format!(
            "SELECT internal_id, head_revision_id, is_semi_protected, is_locked, is_archived, \
             is_dangling, is_mass_edit_protected, is_deleted, is_redirect, redirects_to \
             FROM entity_head WHERE {column} = TRUE LIMIT $1"
        );
        let rows = client
            .query(&query, &[&i64::from(limit)])
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("listing entities by status {status:?}"))?;

        Ok(rows.iter().map(row_to_head).collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_by_edit_type(
        &self,
        edit_type: &EditType,
        limit: u32,
    ) -> Result<Vec<InternalId>, MetadataIndexError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT DISTINCT internal_id FROM entity_revisions WHERE edit_type = $1 LIMIT $2",
                &[&edit_type.as_str(), &i64::from(limit)],
            )
            .await
            .change_context(MetadataIndexError)
            .attach_printable_lazy(|| format!("listing entities by edit type {edit_type}"))?;

        Ok(rows
            .iter()
            .map(|row| InternalId::new(row.get("internal_id")))
            .collect())
    }
}
