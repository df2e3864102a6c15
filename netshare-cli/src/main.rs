//! `netshare` - drive a network filesystem volume driver from the command line.

mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.global.init_tracing();

    match cli.command {
        Commands::Backends => commands::backends::execute(),
        Commands::Serve(args) => commands::serve::execute(args, &cli.global).await,
    }
}
