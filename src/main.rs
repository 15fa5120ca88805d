mod cli;
mod error;
mod executor;
mod logger;
mod managers;
mod workflow;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use executor::SystemRunner;
use std::process::ExitCode;
use tracing::debug;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logger::init(cli.log_level());

    let managers = managers::registry();
    let outcome = workflow::execute_upgrade(&managers, &SystemRunner::default())
        .context("upgrade aborted by an unexpected error")?;

    debug!("{outcome}");
    Ok(outcome.into())
}
