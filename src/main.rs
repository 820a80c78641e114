//! DRCS - disaster response coordination server.

use anyhow::Result;
use drcs::cli::Cli;
use drcs::config::init_logging_with;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging_with(cli.log_level().as_deref())?;

    cli.run().await
}
