//! Amber CLI entry point.

use clap::Parser;

use amber::cli::{Cli, Commands};
use amber::infrastructure::config::ConfigLoader;
use amber::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging is best-effort; a bad config surfaces again through the command.
    let log_config = ConfigLoader::load()
        .ok()
        .and_then(|config| LogConfig::try_from(&config.logging).ok())
        .unwrap_or_default();
    let _logger = LoggerImpl::init(&log_config);

    let result = match cli.command {
        Commands::Tools(args) => amber::cli::commands::tools::execute(args, cli.json).await,
        Commands::Run(args) => amber::cli::commands::run::execute(args, cli.json).await,
        Commands::Config(args) => amber::cli::commands::config::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        amber::cli::handle_error(err, cli.json);
    }
}
