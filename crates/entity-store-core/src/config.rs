//! Connection configuration for the Metadata Index and Blob Store,
//! modelled on `graph::store::config::DatabaseConnectionInfo`: `clap`
//! derive structs with `env` fallbacks and password-masking `Display`
//! impls so secrets never leak into logs.

use std::fmt;

use clap::Parser;

/// Connection parameters for the Postgres-backed Metadata Index.
#[derive(Debug, Clone, Parser)]
pub struct PostgresConnectionInfo {
    #[clap(long, env = "ENTITY_STORE_PG_USER", default_value = "postgres")]
    pub user: String,

    #[clap(long, env = "ENTITY_STORE_PG_PASSWORD", default_value = "postgres")]
    pub password: String,

    #[clap(long, env = "ENTITY_STORE_PG_HOST", default_value = "localhost")]
    pub host: String,

    #[clap(long, env = "ENTITY_STORE_PG_PORT", default_value_t = 5432)]
    pub port: u16,

    #[clap(long, env = "ENTITY_STORE_PG_DATABASE", default_value = "entity_store")]
    pub database: String,

    #[clap(long, env = "ENTITY_STORE_PG_POOL_MAX_SIZE", default_value_t = 16)]
    pub max_pool_size: usize,
}

impl PostgresConnectionInfo {
    /// Builds a `postgres://` connection URL suitable for `tokio_postgres::Config`.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

impl fmt::Display for PostgresConnectionInfo {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "postgres://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Connection parameters for the S3-compatible Blob Store.
#[derive(Debug, Clone, Parser)]
pub struct BlobStoreConnectionInfo {
    #[clap(long, env = "ENTITY_STORE_S3_BUCKET", default_value = "entity-revisions")]
    pub bucket: String,

    /// Overrides the default AWS endpoint resolution, e.g. for MinIO or
    /// LocalStack during development.
    #[clap(long, env = "ENTITY_STORE_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    #[clap(long, env = "ENTITY_STORE_S3_REGION", default_value = "us-east-1")]
    pub region: String,

    #[clap(long, env = "ENTITY_STORE_S3_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    #[clap(long, env = "ENTITY_STORE_S3_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,

    #[clap(long, env = "ENTITY_STORE_S3_FORCE_PATH_STYLE")]
    pub force_path_style: bool,
}

impl fmt::Display for BlobStoreConnectionInfo {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "s3://{}@{}",
            self.bucket,
            self.endpoint.as_deref().unwrap_or(&self.region)
        )
    }
}
