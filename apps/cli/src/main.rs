//! fieldpress CLI — one-shot CRM-to-static-site publisher.
//!
//! Extracts curated content records from the CRM, resolves their
//! relationships, and presses them into Jekyll collection files.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
