//! Blockaudit CLI entry point.

use clap::Parser;

use blockaudit::cli::commands::{analyze, cache, patterns};
use blockaudit::cli::{handle_error, Cli, Commands};
use blockaudit::infrastructure::config::ConfigLoader;
use blockaudit::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load_with(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging).with_verbosity(cli.verbose)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Analyze(args) => analyze::execute(args, &config, cli.json).await,
        Commands::Cache(args) => cache::execute(args, &config, cli.json).await,
        Commands::Patterns(args) => patterns::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
