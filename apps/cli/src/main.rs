//! docmirror CLI: mirror repository markdown docs into a static-site tree.
//!
//! Lists the configured GitHub repositories, fetches every eligible markdown
//! file, rewrites paths and links for the site layout and replaces the local
//! output directory.

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
