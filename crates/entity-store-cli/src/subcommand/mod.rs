mod completions;
mod migrate;
mod server;

use core::time::Duration;
use std::future::Future;

use entity_store_core::logging::LoggingArgs;
use error_stack::{ensure, Result};
use tokio::time::sleep;

pub use self::{
    completions::{completions, CompletionsArgs},
    migrate::{migrate, MigrateArgs},
    server::{server, ServerArgs},
};
use crate::error::{CliError, HealthcheckError};

/// Subcommand for the program.
#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Run the entity store's REST webserver.
    Server(ServerArgs),
    /// Run database migrations required by the metadata index.
    Migrate(MigrateArgs),
    /// Generate a completion script for the given shell and print it to stdout.
    Completions(CompletionsArgs),
}

fn block_on(future: impl Future<Output = Result<(), CliError>>, logging: LoggingArgs) -> Result<(), CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create runtime")
        .block_on(async {
            let _log_guard = entity_store_core::logging::init_logger(&logging);

            future.await
        })
}

impl Subcommand {
    pub(crate) fn execute(self, logging: LoggingArgs) -> Result<(), CliError> {
        match self {
            Self::Server(args) => block_on(server(args), logging),
            Self::Migrate(args) => block_on(migrate(args), logging),
            Self::Completions(ref args) => {
                completions(args);
                Ok(())
            }
        }
    }
}

pub async fn wait_healthcheck<F, Ret>(func: F, wait: bool, wait_timeout: Option<Duration>) -> Result<(), HealthcheckError>
where
    F: Fn() -> Ret + Send,
    Ret: Future<Output = Result<(), HealthcheckError>> + Send,
{
    let expected_end_time = wait_timeout.map(|timeout| std::time::Instant::now() + timeout);

    loop {
        if func().await.is_ok() {
            return Ok(());
        }
        ensure!(wait, HealthcheckError::NotHealthy);
        if let Some(end_time) = expected_end_time {
            if std::time::Instant::now() > end_time {
                return Err(HealthcheckError::Timeout.into());
            }
        }
        sleep(Duration::from_secs(1)).await;
    }
}
