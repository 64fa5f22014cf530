//! secops-mcp entry point.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;

use secops_mcp::cli::{commands, handle_error, Cli, Commands};
use secops_mcp::infrastructure::config::ConfigLoader;
use secops_mcp::infrastructure::logging::LoggerImpl;
use secops_mcp::services::registry_from_config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = config.unwrap_or_else(|err| handle_error(err, cli.json));

    let _logger = LoggerImpl::init(&config.logging)
        .context("Failed to initialize logging")
        .unwrap_or_else(|err| handle_error(err, cli.json));

    let registry = registry_from_config(&config)
        .context("Failed to build operation registry")
        .unwrap_or_else(|err| handle_error(err, cli.json));

    let result = match cli.command() {
        Commands::Serve => commands::serve::execute(registry).await.map(|()| true),
        Commands::Tools => commands::tools::execute(&registry, cli.json).map(|()| true),
        Commands::Call { operation, args } => {
            commands::call::execute(&registry, &operation, &args, cli.json).await
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => handle_error(err, cli.json),
    }
}
