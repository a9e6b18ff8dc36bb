use clap::Parser;
use entity_store_core::{config::PostgresConnectionInfo, migrations};
use error_stack::{Result, ResultExt as _};

use crate::error::CliError;

#[derive(Debug, Parser)]
#[clap(version, author, about, long_about = None)]
pub struct MigrateArgs {
    #[clap(flatten)]
    pub db_info: PostgresConnectionInfo,
}

pub async fn migrate(args: MigrateArgs) -> Result<(), CliError> {
    migrations::run(&args.db_info)
        .await
        .change_context(CliError)
        .attach_printable("running database migrations")
}
