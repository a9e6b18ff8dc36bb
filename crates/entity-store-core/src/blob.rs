//! The Blob Store (spec §4.B): content-addressed-by-`(entity_id,
//! revision_id)` storage of full revision documents, tagged with a
//! publication state. Grounded on `s3_client.py`'s `write_revision`/
//! `read_revision`/`mark_published`/`_ensure_bucket_exists`.

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client};
use entity_store_types::{BlobStoreError, EntityId, PublicationState, RevisionRecord};
use error_stack::{Report, Result, ResultExt as _};

use crate::config::BlobStoreConnectionInfo;

fn object_key(entity_id: &EntityId, revision_id: u64) -> String {
    format!("{entity_id}/r{revision_id}.json")
}

const PUBLICATION_STATE_KEY: &str = "publication_state";

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn write(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
        record: &RevisionRecord,
        publication_state: PublicationState,
    ) -> Result<(), BlobStoreError>;

    async fn read(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
    ) -> Result<Option<RevisionRecord>, BlobStoreError>;

    async fn mark_published(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
    ) -> Result<(), BlobStoreError>;
}

/// An `aws-sdk-s3`-backed [`BlobStore`], usable against AWS S3 itself or
/// any S3-compatible endpoint (MinIO, LocalStack) via
/// [`BlobStoreConnectionInfo::endpoint`].
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Builds the client and ensures the configured bucket exists,
    /// creating it if it does not (mirrors `_ensure_bucket_exists`).
    pub async fn connect(info: &BlobStoreConnectionInfo) -> Result<Self, BlobStoreError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(info.region.clone()));
        if let Some(endpoint) = &info.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&info.access_key_id, &info.secret_access_key)
        {
            loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "entity-store-static",
            ));
        }
        let sdk_config = loader.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if info.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }
        let client = Client::from_conf(s3_config_builder.build());

        let store = Self {
            client,
            bucket: info.bucket.clone(),
        };
        store.ensure_bucket_exists().await?;
        Ok(store)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn ensure_bucket_exists(&self) -> Result<(), BlobStoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(_) => self
                .client
                .create_bucket()
                .bucket(&self.bucket)
                .send()
                .await
                .map(|_| ())
                .or_else(|error| {
                    // Another process may have created it between the head
                    // and create calls; treat that race as success.
                    if format!("{error:?}").contains("BucketAlreadyOwnedByYou") {
                        Ok(())
                    } else {
                        Err(Report::new(BlobStoreError)
                            .attach_printable(format!("failed to create bucket: {error}")))
                    }
                }),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[tracing::instrument(level = "debug", skip(self, record))]
    async fn write(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
        record: &RevisionRecord,
        publication_state: PublicationState,
    ) -> Result<(), BlobStoreError> {
        let body =
            serde_json::to_vec(record).change_context(BlobStoreError).attach_printable_lazy(
                || format!("serializing revision {revision_id} of {entity_id}"),
            )?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key(entity_id, revision_id))
            .body(ByteStream::from(body))
            .content_type("application/json")
            .metadata(PUBLICATION_STATE_KEY, publication_state.as_str())
            .send()
            .await
            .change_context(BlobStoreError)
            .attach_printable_lazy(|| format!("writing revision {revision_id} of {entity_id}"))?;

        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn read(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
    ) -> Result<Option<RevisionRecord>, BlobStoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key(entity_id, revision_id))
            .send()
            .await
        {
            Ok(output) => output,
            Err(error) => {
                if format!("{error:?}").contains("NoSuchKey") {
                    return Ok(None);
                }
                return Err(Report::new(BlobStoreError)
                    .attach_printable(format!("reading revision {revision_id} of {entity_id}: {error}")));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .change_context(BlobStoreError)
            .attach_printable("reading object body")?
            .into_bytes();

        let record = serde_json::from_slice(&bytes)
            .change_context(BlobStoreError)
            .attach_printable_lazy(|| {
                format!("deserializing revision {revision_id} of {entity_id}")
            })?;

        Ok(Some(record))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn mark_published(
        &self,
        entity_id: &EntityId,
        revision_id: u64,
    ) -> Result<(), BlobStoreError> {
        let key = object_key(entity_id, revision_id);
        let copy_source = format!("{}/{}", self.bucket, key);

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .key(&key)
            .copy_source(copy_source)
            .metadata(PUBLICATION_STATE_KEY, PublicationState::Published.as_str())
            .metadata_directive(aws_sdk_s3::types::MetadataDirective::Replace)
            .send()
            .await
            .change_context(BlobStoreError)
            .attach_printable_lazy(|| format!("marking revision {revision_id} of {entity_id} published"))?;

        Ok(())
    }
}
