//! FreeWipe: overwrites the free space of a volume with filler files.
//!
//! Thin binary entry point. All logic lives in the `freewipe-core`
//! and `freewipe-cli` crates.

use clap::Parser;
use freewipe_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json output.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("FreeWipe starting");

    freewipe_cli::run(cli)
}
