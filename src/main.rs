use anyhow::Result;
use clap::Parser;

use rendimento::cli::Cli;
use rendimento::dispatcher::{dispatch_command, RunContext};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = RunContext {
        db_path: cli.db,
        json: cli.json,
    };

    dispatch_command(cli.command, &ctx)
}
