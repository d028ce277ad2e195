//! Binary crate for the `skycast` terminal app.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive session loop and its state machine
//! - Human-friendly output formatting
//! - Voice capture & spoken feedback

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod controller;
mod render;
mod session;
mod voice;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so they never interleave with the rendered UI.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
