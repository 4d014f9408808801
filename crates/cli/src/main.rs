mod cli;
mod commands;
mod errors;
mod logging;

use crate::cli::Cli;
use crate::logging::TracingConfig;
use appstore_core::Config;
use clap::Parser;
use tracing::Instrument;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

async fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        filter: None,
    })?;

    let config = Config::load_or_default(cli.config.as_deref())?;
    let span = logging::command_span(cli.command.name());
    commands::execute(cli, config).instrument(span).await
}
