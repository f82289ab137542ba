mod cli;
mod commands;
mod platform;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    platform::logging::initialize(cli.log, cli.verbose);
    commands::run(cli).await
}
