//! readlater CLI: save links and query your reading list from the terminal.
//!
//! Drives the same message entry point a chat front end would, one message
//! per `send` or one per line in `chat`.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
