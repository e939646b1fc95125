//! mddocset CLI: Markdown API documentation to offline docset bundles.
//!
//! Renders a tree of Markdown pages to HTML, builds the `docSet.dsidx`
//! search index, and writes the bundle's `Info.plist`.

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
