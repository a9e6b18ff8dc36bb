mod args;
mod error;
mod subcommand;

use error_stack::Result;

use self::{args::Args, error::CliError};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<(), CliError> {
    // Best-effort: a missing `.env` is the normal case in production.
    drop(dotenvy::dotenv());

    let Args { logging, subcommand } = Args::parse_args();

    subcommand.execute(logging)
}
