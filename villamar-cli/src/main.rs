mod cmd;
mod config;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = Command::new("villamar")
        .about("Marketing site server for Villamar Estates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::check::make_subcommand());

    match app.get_matches().subcommand() {
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("check", args)) => cmd::check::execute(args).await,
        _ => unreachable!("subcommand is required"),
    }
}
