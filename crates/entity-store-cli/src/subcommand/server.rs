use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use entity_store_api::{router, AppState, PropertyShapeCatalogue};
use entity_store_core::{
    config::{BlobStoreConnectionInfo, PostgresConnectionInfo},
    PostgresMetadataIndex, S3BlobStore,
};
use error_stack::{Result, ResultExt as _};
use reqwest::Client;
use tokio::time::timeout;

use crate::{
    error::{CliError, HealthcheckError},
    subcommand::wait_healthcheck,
};

#[derive(Debug, Clone, Parser)]
pub struct ApiAddress {
    #[clap(long, default_value = "127.0.0.1", env = "ENTITY_STORE_API_HOST")]
    pub api_host: String,

    #[clap(long, default_value_t = 4100, env = "ENTITY_STORE_API_PORT")]
    pub api_port: u16,
}

impl fmt::Display for ApiAddress {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, Parser)]
pub struct ServerArgs {
    #[clap(flatten)]
    pub db_info: PostgresConnectionInfo,

    #[clap(flatten)]
    pub blob_info: BlobStoreConnectionInfo,

    #[clap(flatten)]
    pub api_address: ApiAddress,

    /// Path to the offline property-shape catalogue (spec §4.G), a JSON
    /// object mapping property id to `{"datatype": "..."}`. Loading this
    /// file's own fetch logic is out of scope; only its resulting shape
    /// is used.
    #[clap(long, env = "ENTITY_STORE_PROPERTY_SHAPES")]
    pub property_shapes: std::path::PathBuf,

    #[clap(long, env = "ENTITY_STORE_REPOSITORY_NAME", default_value = "entitystore")]
    pub repository_name: String,

    #[clap(long, env = "ENTITY_STORE_ENTITY_BASE", default_value = "http://www.entitystore.org/entity/")]
    pub entity_base: String,

    #[clap(long, env = "ENTITY_STORE_DATA_BASE", default_value = "http://www.entitystore.org/wiki/Special:EntityData/")]
    pub data_base: String,

    /// Runs the healthcheck for the REST server.
    #[clap(long, default_value_t = false)]
    pub healthcheck: bool,

    #[clap(long, default_value_t = false, requires = "healthcheck")]
    pub wait: bool,

    #[clap(long, requires = "wait")]
    pub timeout: Option<u64>,
}

pub async fn server(args: ServerArgs) -> Result<(), CliError> {
    if args.healthcheck {
        return wait_healthcheck(
            || healthcheck(args.api_address.clone()),
            args.wait,
            args.timeout.map(Duration::from_secs),
        )
        .await
        .change_context(CliError);
    }

    let property_shapes = load_property_shapes(&args.property_shapes)
        .attach_printable("loading the property-shape catalogue")?;

    let index = PostgresMetadataIndex::connect(&args.db_info)
        .change_context(CliError)
        .attach_printable("connecting to the metadata index")?;
    let blob = S3BlobStore::connect(&args.blob_info)
        .await
        .change_context(CliError)
        .attach_printable("connecting to the blob store")?;

    let state = Arc::new(AppState::new(
        Arc::new(index),
        Arc::new(blob),
        property_shapes,
        args.repository_name,
        args.entity_base,
        args.data_base,
    ));

    let router = router(state);

    let address: SocketAddr = args
        .api_address
        .to_string()
        .parse()
        .change_context(CliError)
        .attach_printable("parsing the listen address")?;

    tracing::info!("listening on {address}");
    axum::Server::bind(&address)
        .serve(router.into_make_service())
        .await
        .change_context(CliError)
        .attach_printable("serving requests")?;

    Ok(())
}

fn load_property_shapes(path: &std::path::Path) -> Result<PropertyShapeCatalogue, CliError> {
    let raw = std::fs::read_to_string(path)
        .change_context(CliError)
        .attach_printable_lazy(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw)
        .change_context(CliError)
        .attach_printable_lazy(|| format!("parsing {} as a property-shape catalogue", path.display()))
}

pub async fn healthcheck(address: ApiAddress) -> Result<(), HealthcheckError> {
    let request_url = format!("http://{address}/health");

    timeout(Duration::from_secs(10), Client::new().get(&request_url).send())
        .await
        .change_context(HealthcheckError::Timeout)?
        .change_context(HealthcheckError::NotHealthy)?;

    Ok(())
}
