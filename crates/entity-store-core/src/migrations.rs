//! Schema migration runner, grounded on the `hash-graph` CLI's `migrate`
//! subcommand, which applies an embedded, ordered set of SQL files via
//! `refinery`.

use entity_store_types::MetadataIndexError;
use error_stack::{Result, ResultExt as _};
use tokio_postgres::NoTls;

use crate::config::PostgresConnectionInfo;

mod embedded {
    refinery::embed_migrations!("../../migrations");
}

/// Opens a dedicated (non-pooled) connection and applies all pending
/// migrations. Migrations run on their own connection rather than one
/// borrowed from the application pool, since `refinery` needs exclusive
/// `&mut` access to run its tracking queries.
#[tracing::instrument(level = "info", skip(info))]
pub async fn run(info: &PostgresConnectionInfo) -> Result<(), MetadataIndexError> {
    let config: tokio_postgres::Config = info
        .url()
        .parse()
        .change_context(MetadataIndexError)
        .attach_printable("parsing the postgres connection url")?;

    let (mut client, connection) = config
        .connect(NoTls)
        .await
        .change_context(MetadataIndexError)
        .attach_printable("connecting to postgres to run migrations")?;

    tokio::spawn(async move {
        if let Err(error) = connection.await {
            tracing::error!(%error, "migration connection terminated with an error");
        }
    });

    let report = embedded::migrations::runner()
        .run_async(&mut client)
        .await
        .change_context(MetadataIndexError)
        .attach_printable("running embedded migrations")?;

    for migration in report.applied_migrations() {
        tracing::info!(
            name = migration.name(),
            version = migration.version(),
            "applied migration"
        );
    }

    Ok(())
}
