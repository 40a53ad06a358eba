//! EventPages CLI: turns an event feed into static accommodation landing pages.
//!
//! Fetches the feed, writes one HTML page per event and a sitemap listing
//! exactly the pages of the run.

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
