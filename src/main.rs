//! issue-sync CLI entry point.

use clap::Parser;

use issue_sync::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Sync(args) => issue_sync::cli::commands::sync::execute(args, config, cli.json).await,
        Commands::Check(args) => {
            issue_sync::cli::commands::check::execute(args, config, cli.json).await
        }
    };

    if let Err(err) = result {
        issue_sync::cli::handle_error(err, cli.json);
    }
}
