use clap::Parser;
use entity_store_core::logging::LoggingArgs;

use crate::subcommand::Subcommand;

/// Arguments passed to the program.
#[derive(Debug, Parser)]
#[clap(version, author, about, long_about = None)]
pub struct Args {
    #[clap(flatten)]
    pub logging: LoggingArgs,

    /// Specify a subcommand to run.
    #[command(subcommand)]
    pub subcommand: Subcommand,
}

impl Args {
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
